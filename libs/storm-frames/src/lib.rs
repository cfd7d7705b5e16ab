//! Turns Storm query results into typed, row-aligned tables.
//!
//! Two response shapes are handled: the streaming `/api/v1/storm` endpoint,
//! which yields tagged messages ending in `fini`, and `/api/v1/storm/call`,
//! which returns one JSON document. Both end up as a [`Table`] whose columns
//! are typed by inspecting every value in them.

pub use error::Error;
pub use query::{PreparedQuery, decode_response, prepare};
pub use request::{Endpoint, Options, QueryRequest};
pub use table::{Column, ColumnValues, Table};
pub use time_vars::TimeRange;

pub mod arrow;
pub mod call;
pub mod classify;
pub mod config;
mod error;
pub mod flatten;
pub mod node;
pub mod print;
pub mod query;
pub mod request;
pub mod stream;
pub mod table;
pub mod time_vars;
pub mod timestamp;
