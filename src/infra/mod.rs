//! Caching and the quote façade.

pub mod cache;
pub mod quote_service;

pub use cache::{Clock, ManualClock, SystemClock};
pub use quote_service::{
    Endpoint, Estimator, QuoteError, QuoteService, StandardEstimator, DEFAULT_QUOTE_TTL,
};
