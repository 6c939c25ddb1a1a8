use super::pipeline::{recompute, Views};
use super::store::{Snapshot, SnapshotStore};
use crate::article::{ArticleRecord, EditableField, Ingested};
use crate::error::SessionError;
use crate::filter::YearRange;
use crate::scoring::{explain, is_valid_weighting, ScoreResult, DEFAULT_WEIGHTING_PERCENT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SESSION_DATA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Empty,
    Loaded,
    Edited,
    Saved,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Empty => "empty",
            SessionState::Loaded => "loaded",
            SessionState::Edited => "edited",
            SessionState::Saved => "saved",
        };
        f.write_str(label)
    }
}

/// Result of an operation that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Nothing to do; the session is unchanged
    NoOp(&'static str),
    /// Applied in memory, but the durable store could not follow
    Degraded(String),
}

/// Everything an edit session owns, in a form that can be written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub version: u32,
    pub state: SessionState,
    #[serde(default)]
    pub person_name: String,
    pub original: Vec<ArticleRecord>,
    pub working: Vec<ArticleRecord>,
    pub saved: Vec<ArticleRecord>,
    /// Year range captured by the last save
    #[serde(default)]
    pub saved_range: YearRange,
    #[serde(default)]
    pub year_range: YearRange,
    pub weighting_percent: f64,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionData {
    pub fn empty(weighting_percent: f64) -> Self {
        Self {
            version: SESSION_DATA_VERSION,
            state: SessionState::Empty,
            person_name: String::new(),
            original: Vec::new(),
            working: Vec::new(),
            saved: Vec::new(),
            saved_range: YearRange::unbounded(),
            year_range: YearRange::unbounded(),
            weighting_percent,
            saved_at: None,
        }
    }
}

/// Editable working copy of one researcher's articles.
///
/// Holds the snapshot taken at load (`original`), the user's working copy and
/// the last explicit save, and recomputes both views synchronously at the end
/// of every operation that changes them. Callers must serialize access; put
/// the whole session behind one `Mutex` if it is shared between threads.
pub struct EditSession<S: SnapshotStore> {
    store: S,
    data: SessionData,
    views: Views,
    default_weighting: f64,
}

impl<S: SnapshotStore> EditSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_default_weighting(store, DEFAULT_WEIGHTING_PERCENT)
    }

    /// Empty session whose weighting (and reset-all target) is `weighting_percent`
    pub fn with_default_weighting(store: S, weighting_percent: f64) -> Self {
        let default_weighting = if is_valid_weighting(weighting_percent) {
            weighting_percent
        } else {
            DEFAULT_WEIGHTING_PERCENT
        };
        Self {
            store,
            data: SessionData::empty(default_weighting),
            views: Views::default(),
            default_weighting,
        }
    }

    /// Cold start from the durable store. A snapshot found there becomes a
    /// saved session; a missing or unreadable one leaves the session empty.
    pub fn resume(store: S, default_weighting: f64) -> Self {
        let mut session = Self::with_default_weighting(store, default_weighting);
        match session.store.load_snapshot() {
            Ok(Some(snapshot)) if !snapshot.working.is_empty() => {
                let Snapshot {
                    working,
                    original,
                    year_range,
                } = snapshot;
                let data = &mut session.data;
                data.original = if original.is_empty() {
                    working.clone()
                } else {
                    original
                };
                data.saved = working.clone();
                data.working = working;
                data.year_range = year_range;
                data.saved_range = year_range;
                data.state = SessionState::Saved;
                tracing::info!(articles = data.working.len(), "resumed saved snapshot");
                session.refresh();
            }
            Ok(_) => tracing::debug!("no saved snapshot, starting empty"),
            Err(e) => tracing::warn!(error = %e, "could not read saved snapshot, starting empty"),
        }
        session
    }

    /// Rebuild a session from previously exported data (the CLI workspace)
    pub fn from_data(store: S, data: SessionData, default_weighting: f64) -> Self {
        let mut session = Self::with_default_weighting(store, default_weighting);
        session.data = data;
        session.refresh();
        session
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn state(&self) -> SessionState {
        self.data.state
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn person_name(&self) -> &str {
        &self.data.person_name
    }

    pub fn original(&self) -> &[ArticleRecord] {
        &self.data.original
    }

    pub fn working(&self) -> &[ArticleRecord] {
        &self.data.working
    }

    pub fn saved(&self) -> &[ArticleRecord] {
        &self.data.saved
    }

    pub fn year_range(&self) -> YearRange {
        self.data.year_range
    }

    pub fn weighting_percent(&self) -> f64 {
        self.data.weighting_percent
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.data.saved_at
    }

    /// Replace the session contents with freshly ingested articles.
    ///
    /// Any previous save is discarded, including its durable copy. An empty
    /// article list is rejected and leaves the session untouched.
    pub fn load(&mut self, records: Vec<ArticleRecord>) -> Result<Outcome, SessionError> {
        if records.is_empty() {
            tracing::warn!("refusing to load an empty article list");
            return Err(SessionError::NoArticles);
        }

        self.data.original = records.clone();
        self.data.working = records;
        self.data.person_name.clear();
        self.data.saved.clear();
        self.data.saved_range = YearRange::unbounded();
        self.data.saved_at = None;
        self.data.state = SessionState::Loaded;
        self.refresh();
        tracing::info!(articles = self.data.working.len(), "loaded articles");

        match self.store.clear_snapshot() {
            Ok(()) => Ok(Outcome::Applied),
            Err(e) => {
                tracing::warn!(error = %e, "could not discard previous saved snapshot");
                Ok(Outcome::Degraded(format!(
                    "loaded, but the previous saved snapshot could not be discarded: {}",
                    e
                )))
            }
        }
    }

    /// [`load`](Self::load) plus the researcher's name from the same response
    pub fn load_ingested(&mut self, ingested: Ingested) -> Result<Outcome, SessionError> {
        let outcome = self.load(ingested.articles)?;
        self.data.person_name = ingested.person_name;
        Ok(outcome)
    }

    /// Set one collaboration count of a working article from user text.
    /// Text that is not a count becomes 0.
    pub fn edit(
        &mut self,
        index: usize,
        field: EditableField,
        value: &str,
    ) -> Result<Outcome, SessionError> {
        let len = self.data.working.len();
        if len == 0 {
            return Err(SessionError::NoData);
        }
        let record = self
            .data
            .working
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange { index, len })?;

        record.set_count(field, value);
        tracing::debug!(index, %field, value = record.count(field), "edited article");
        self.data.state = SessionState::Edited;
        self.refresh();
        Ok(Outcome::Applied)
    }

    /// Snapshot the working copy and persist it. A store failure keeps the
    /// in-memory save and is reported as [`Outcome::Degraded`].
    pub fn save(&mut self) -> Result<Outcome, SessionError> {
        if self.data.working.is_empty() {
            return Ok(Outcome::NoOp("no working data to save"));
        }

        self.data.saved = self.data.working.clone();
        self.data.saved_range = self.data.year_range;
        self.data.saved_at = Some(Utc::now());
        self.data.state = SessionState::Saved;
        tracing::info!(articles = self.data.saved.len(), "saved working snapshot");

        let snapshot = Snapshot {
            working: self.data.saved.clone(),
            original: self.data.original.clone(),
            year_range: self.data.saved_range,
        };
        match self.store.save_snapshot(&snapshot) {
            Ok(()) => Ok(Outcome::Applied),
            Err(e) => {
                tracing::warn!(error = %e, "could not persist saved snapshot");
                Ok(Outcome::Degraded(format!(
                    "saved in this session, but not persisted: {}",
                    e
                )))
            }
        }
    }

    /// Throw away unsaved edits: back to the last save, or to the loaded
    /// articles when nothing was saved.
    pub fn reset_edit(&mut self) -> Result<Outcome, SessionError> {
        if !self.data.saved.is_empty() {
            self.data.working = self.data.saved.clone();
            self.data.year_range = self.data.saved_range;
            tracing::info!("restored working copy from saved snapshot");
        } else if !self.data.original.is_empty() {
            self.data.working = self.data.original.clone();
            tracing::info!("restored working copy from original load");
        } else {
            return Ok(Outcome::NoOp("nothing to restore"));
        }

        self.data.state = SessionState::Loaded;
        self.refresh();
        Ok(Outcome::Applied)
    }

    /// Forget everything, including the durable copy
    pub fn reset_all(&mut self) -> Result<Outcome, SessionError> {
        self.data = SessionData::empty(self.default_weighting);
        self.views = Views::default();
        tracing::info!("reset session");

        match self.store.clear_snapshot() {
            Ok(()) => Ok(Outcome::Applied),
            Err(e) => {
                tracing::warn!(error = %e, "could not erase saved snapshot");
                Ok(Outcome::Degraded(format!(
                    "session cleared, but the saved snapshot could not be erased: {}",
                    e
                )))
            }
        }
    }

    /// Change the student weighting. Does not change the state label.
    pub fn set_weighting(&mut self, percent: f64) -> Result<Outcome, SessionError> {
        if !is_valid_weighting(percent) {
            return Err(SessionError::InvalidWeighting(percent));
        }
        self.data.weighting_percent = percent;
        self.refresh();
        Ok(Outcome::Applied)
    }

    /// Change the year filter. Does not change the state label.
    pub fn set_year_range(&mut self, range: YearRange) -> Result<Outcome, SessionError> {
        self.data.year_range = range;
        self.refresh();
        Ok(Outcome::Applied)
    }

    /// Score breakdown of one working article under the current weighting
    pub fn explain(&self, index: usize) -> Result<ScoreResult, SessionError> {
        let len = self.data.working.len();
        if len == 0 {
            return Err(SessionError::NoData);
        }
        self.data
            .working
            .get(index)
            .map(|record| explain(record, self.data.weighting_percent))
            .ok_or(SessionError::IndexOutOfRange { index, len })
    }

    fn refresh(&mut self) {
        self.views = recompute(
            &self.data.working,
            &self.data.year_range,
            self.data.weighting_percent,
        );
    }
}
