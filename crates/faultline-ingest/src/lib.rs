//! Faultline Ingest - Bulletin acquisition and parsing
//!
//! Boundary collaborators of the enrichment engine: a per-month bulletin
//! downloader with a local file cache, and the XML parser that turns raw
//! bulletins into the flat event table the core consumes.

pub mod download;
pub mod error;
pub mod parse;

pub use download::BulletinStore;
pub use error::{IngestError, Result};
pub use parse::{parse_bulletin, parse_bulletins, ParsedBulletins};
