//! Quote engine for a block-world courier service.
//!
//! Parses coordinates, grades the route between them and prices the job.
//! [`QuoteService`] is the entry point for callers that want caching.

pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{
    analyze_route, calculate_price, parse_coordinates, validate_coordinates, Quote, QuoteOptions,
};
pub use infra::{QuoteError, QuoteService};
