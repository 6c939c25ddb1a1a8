//! Qualis-tier scoring, per-year PQD1 aggregation and an editable session
//! over one researcher's articles.

pub mod aggregate;
pub mod article;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod scoring;
pub mod session;
