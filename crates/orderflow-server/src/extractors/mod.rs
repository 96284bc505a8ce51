//! Request extractors.

pub mod path;
pub mod query;

pub use path::OrderPath;
pub use query::LimitQuery;
