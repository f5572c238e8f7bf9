//! # dsn-bind
//!
//! Declarative DSN parsing: bind a connection string to a strongly-typed
//! record by declaring a pattern template for the record type.
//!
//! This crate provides:
//! - A small template grammar: `$Variable` captures, `(http|https)` and
//!   `http(s)` alternations, and `[...]` optional groups
//! - A matcher that extracts named fragments from an input string
//! - Query-string extraction into a raw key/value map, keys kept verbatim
//! - Typed binding with string/int/bool coercion and per-field defaults
//! - A process-wide cache of compiled schemas keyed by record type
//!
//! ## Example
//!
//! ```rust,ignore
//! use dsn_bind::{DsnRecord, QueryMap, RecordSchema, parse_dsn};
//!
//! #[derive(Default)]
//! struct FtpConn {
//!     host: String,
//!     port: i64,
//!     params: QueryMap,
//! }
//!
//! impl DsnRecord for FtpConn {
//!     fn dsn_schema() -> RecordSchema<Self> {
//!         RecordSchema::builder("ftp://$Host[:$Port]")
//!             .string("Host", |r, v| r.host = v)
//!             .int_or("Port", "21", |r, v| r.port = v)
//!             .params("Params", |r, v| r.params = v)
//!             .build()
//!     }
//! }
//!
//! let mut conn = FtpConn::default();
//! parse_dsn("ftp://example.com?Passive=true", &mut conn)?;
//! assert_eq!(conn.port, 21);
//! ```

mod bind;
pub mod cache;
pub mod error;
mod parse;
pub mod pattern;
pub mod query;
pub mod schema;

pub use cache::{CacheStats, cache_stats};
pub use error::{DsnError, DsnResult, Stage};
pub use parse::parse_dsn;
pub use pattern::{CaptureSet, Pattern, Segment};
pub use query::{QueryMap, split_query};
pub use schema::{DsnRecord, FieldDescriptor, FieldKind, FieldRole, RecordSchema, RecordSchemaBuilder};
