//! Quote façade: parse, analyze, price, and remember recent answers.
//!
//! - Results are cached per exact (pickup, delivery, options) input.
//! - Entries are deleted five minutes after they were stored.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, SystemTime},
};

use thiserror::Error;
use time::OffsetDateTime;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info};

use crate::domain::{
    analyze_route, calculate_price, parse_coordinates, Coordinates, PricingBreakdown,
    PricingFactors, Quote, QuoteOptions, RouteAnalysis, FORMAT_HINT,
};
use crate::infra::cache::{Clock, SystemClock, TtlCache};

pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Pickup,
    Delivery,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pickup => f.write_str("pickup"),
            Self::Delivery => f.write_str("delivery"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("invalid {endpoint} coordinates '{input}'. {hint}")]
    InvalidCoordinates {
        endpoint: Endpoint,
        input: String,
        hint: &'static str,
    },
}

impl QuoteError {
    fn invalid(endpoint: Endpoint, input: &str) -> Self {
        Self::InvalidCoordinates {
            endpoint,
            input: input.to_string(),
            hint: FORMAT_HINT,
        }
    }
}

/// The calculations behind a quote.
pub trait Estimator: Send + Sync {
    fn analyze_route(&self, pickup: &Coordinates, delivery: &Coordinates) -> RouteAnalysis;
    fn calculate_price(&self, factors: &PricingFactors) -> PricingBreakdown;
}

/// Uses the standard route analysis and price table.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardEstimator;

impl Estimator for StandardEstimator {
    fn analyze_route(&self, pickup: &Coordinates, delivery: &Coordinates) -> RouteAnalysis {
        analyze_route(pickup, delivery)
    }

    fn calculate_price(&self, factors: &PricingFactors) -> PricingBreakdown {
        calculate_price(factors)
    }
}

#[derive(Clone)]
pub struct QuoteService {
    cache: Arc<Mutex<TtlCache<Quote>>>,
    clock: Arc<dyn Clock>,
    estimator: Arc<dyn Estimator>,
}

impl Default for QuoteService {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteService {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(TtlCache::new(DEFAULT_QUOTE_TTL))),
            clock: Arc::new(SystemClock),
            estimator: Arc::new(StandardEstimator),
        }
    }

    /// Replaces the cache, so call this before the first quote.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(Mutex::new(TtlCache::new(ttl)));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_estimator(mut self, estimator: impl Estimator + 'static) -> Self {
        self.estimator = Arc::new(estimator);
        self
    }

    pub async fn get_quote(
        &self,
        pickup: &str,
        delivery: &str,
        options: &QuoteOptions,
    ) -> Result<Quote, QuoteError> {
        let key = cache_key(pickup, delivery, options);

        {
            let mut cache = self.cache.lock().await;
            let now = self.clock.now();
            let evicted = cache.purge_expired(now);
            if evicted > 0 {
                info!(evicted, "Evicted expired quotes");
            }
            if let Some(entry) = cache.get(&key, now) {
                debug!(
                    pickup,
                    delivery,
                    age = %entry.age_string(now),
                    "Serving cached quote"
                );
                return Ok(entry.value.clone());
            }
        }

        let now = self.clock.now();
        let quote = self.compute(pickup, delivery, options, now)?;
        debug!(
            pickup,
            delivery,
            distance = quote.distance,
            price = quote.price,
            "Computed quote"
        );

        let mut cache = self.cache.lock().await;
        cache.insert(key, quote.clone(), now);
        Ok(quote)
    }

    /// Delete expired quotes now. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let evicted = self.cache.lock().await.purge_expired(now);
        if evicted > 0 {
            info!(evicted, "Evicted expired quotes");
        }
        evicted
    }

    /// Run [`purge_expired`](Self::purge_expired) every `period` until the
    /// returned task is aborted.
    pub fn spawn_eviction(&self, period: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                service.purge_expired().await;
            }
        })
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    fn compute(
        &self,
        pickup_text: &str,
        delivery_text: &str,
        options: &QuoteOptions,
        now: SystemTime,
    ) -> Result<Quote, QuoteError> {
        let pickup = parse_coordinates(pickup_text)
            .ok_or_else(|| QuoteError::invalid(Endpoint::Pickup, pickup_text))?;
        let delivery = parse_coordinates(delivery_text)
            .ok_or_else(|| QuoteError::invalid(Endpoint::Delivery, delivery_text))?;

        let route = self.estimator.analyze_route(&pickup, &delivery);
        let breakdown = self.estimator.calculate_price(&PricingFactors {
            distance: route.distance,
            urgency: options.urgency,
            insurance: options.insurance_tier(),
            danger_level: route.danger_level,
            service_type: options.service_type,
        });

        Ok(Quote {
            distance: route.distance,
            price: breakdown.total_price,
            estimated_time: route.estimated_time,
            danger_level: route.danger_level,
            difficulty: route.difficulty,
            special_notes: route.special_notes,
            breakdown,
            quoted_at: OffsetDateTime::from(now),
        })
    }
}

fn cache_key(pickup: &str, delivery: &str, options: &QuoteOptions) -> String {
    let options = serde_json::to_string(options).unwrap_or_else(|_| format!("{options:?}"));
    format!("{pickup}|{delivery}|{options}")
}
