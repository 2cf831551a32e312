/*! Core types shared across the query engine. */

mod error;
mod ids;
mod report;

pub use error::{ProviderError, ProviderResult, QueryError, QueryResult};
pub use ids::{ElementId, ProcessId};
pub use report::{Diagnostic, Diagnostics, SearchReport};
