//! Filtering and aggregation over a table of research publications.
//!
//! A [`RecordTable`] is loaded once by [`store::load`] and never mutated.
//! Each interaction builds a [`FilterCriteria`], narrows the table with
//! [`filter::filter`] and feeds the result to the functions in
//! [`aggregate`], one call per chart.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod models;
pub mod report;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use error::{DataLoadError, QueryError};
pub use models::{Aggregate, Column, FilterCriteria, NoDataReason, Record, RecordTable};
