pub mod ingest;
pub mod types;

pub use ingest::{format_doi, format_issn, parse_response, read_response, Ingested};
pub use types::{coerce_count, coerce_flag, ArticleRecord, EditableField, QualisTier, MISSING_DISPLAY};
