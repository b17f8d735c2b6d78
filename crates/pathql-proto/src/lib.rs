//! PathQL request surface types.
//!
//! This crate defines the values and raw expressions that the request layer
//! hands to the planner. Everything is `serde`-serialisable so requests and
//! operands can travel as JSON.
//!
//! # Modules
//!
//! - [`value`] - Runtime value types for filter operands and coerced results
//! - [`query`] - Filter operators, raw filter parameters and query requests
//! - [`error`] - Protocol error types

pub mod error;
pub mod query;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use query::{Arity, FilterOp, FilterParam, QueryRequest};
pub use value::Value;

/// Name of the query parameter carrying the sort expression.
pub const SORT_PARAM: &str = "sort";

/// Prefix shared by legacy filter query parameters.
pub const FILTER_PARAM_PREFIX: &str = "filter[";
