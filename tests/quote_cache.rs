use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, SystemTime};

use delivery_quote::domain::{
    analyze_route, calculate_price, Coordinates, PricingBreakdown, PricingFactors, QuoteOptions,
    RouteAnalysis, Urgency, Weather,
};
use delivery_quote::infra::{Clock, Estimator, ManualClock, QuoteService, DEFAULT_QUOTE_TTL};
use time::OffsetDateTime;

/// Counts calls into the real calculations.
#[derive(Clone, Default)]
struct CountingEstimator {
    routes: Arc<AtomicUsize>,
    prices: Arc<AtomicUsize>,
}

impl CountingEstimator {
    fn routes(&self) -> usize {
        self.routes.load(Ordering::SeqCst)
    }

    fn prices(&self) -> usize {
        self.prices.load(Ordering::SeqCst)
    }
}

impl Estimator for CountingEstimator {
    fn analyze_route(&self, pickup: &Coordinates, delivery: &Coordinates) -> RouteAnalysis {
        self.routes.fetch_add(1, Ordering::SeqCst);
        analyze_route(pickup, delivery)
    }

    fn calculate_price(&self, factors: &PricingFactors) -> PricingBreakdown {
        self.prices.fetch_add(1, Ordering::SeqCst);
        calculate_price(factors)
    }
}

fn service() -> (QuoteService, ManualClock, CountingEstimator) {
    let clock = ManualClock::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000));
    let estimator = CountingEstimator::default();
    let service = QuoteService::new()
        .with_clock(clock.clone())
        .with_estimator(estimator.clone());
    (service, clock, estimator)
}

const PICKUP: &str = "100, 64, -200";
const DELIVERY: &str = "300, 64, 150";

#[tokio::test]
async fn repeat_call_is_served_from_cache() {
    let (service, clock, estimator) = service();
    let options = QuoteOptions::default();

    let first = service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    clock.advance(Duration::from_secs(60));
    let second = service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        second.quoted_at,
        OffsetDateTime::from(clock.now() - Duration::from_secs(60))
    );
    assert_eq!(estimator.routes(), 1);
    assert_eq!(estimator.prices(), 1);
    assert_eq!(service.cached_len().await, 1);
}

#[tokio::test]
async fn expired_entry_is_recomputed() {
    let (service, clock, estimator) = service();
    let options = QuoteOptions::default();

    service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    assert_eq!(estimator.routes(), 1);

    clock.advance(DEFAULT_QUOTE_TTL);
    let third = service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();

    assert_eq!(estimator.routes(), 2);
    assert_eq!(third.quoted_at, OffsetDateTime::from(clock.now()));
    assert_eq!(service.cached_len().await, 1);
}

#[tokio::test]
async fn reads_do_not_extend_lifetime() {
    let (service, clock, estimator) = service();
    let options = QuoteOptions::default();

    service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    for _ in 0..4 {
        clock.advance(Duration::from_secs(70));
        service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    }
    // 280s: still the original entry
    assert_eq!(estimator.routes(), 1);

    clock.advance(Duration::from_secs(20));
    service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    assert_eq!(estimator.routes(), 2);
}

#[tokio::test]
async fn different_inputs_get_their_own_entries() {
    let (service, _clock, estimator) = service();
    let soon = QuoteOptions::default();
    let urgent = QuoteOptions {
        urgency: Urgency::Urgent,
        ..QuoteOptions::default()
    };
    let stormy = QuoteOptions {
        weather: Some(Weather::Thunderstorm),
        ..QuoteOptions::default()
    };

    let a = service.get_quote(PICKUP, DELIVERY, &soon).await.unwrap();
    let b = service.get_quote(PICKUP, DELIVERY, &urgent).await.unwrap();
    let c = service.get_quote(PICKUP, DELIVERY, &stormy).await.unwrap();
    service.get_quote("100 64 -200", DELIVERY, &soon).await.unwrap();

    assert_eq!(estimator.routes(), 4);
    assert_eq!(service.cached_len().await, 4);
    assert_eq!(b.price, a.price + 5);
    // weather is recorded but not priced
    assert_eq!(c.price, a.price);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let (service, _clock, estimator) = service();
    let options = QuoteOptions::default();

    assert!(service.get_quote("nowhere", DELIVERY, &options).await.is_err());
    assert!(service.get_quote("nowhere", DELIVERY, &options).await.is_err());

    assert_eq!(estimator.routes(), 0);
    assert_eq!(service.cached_len().await, 0);
}

#[tokio::test]
async fn purge_removes_only_expired_entries() {
    let (service, clock, _estimator) = service();
    let options = QuoteOptions::default();

    service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    clock.advance(Duration::from_secs(200));
    service.get_quote("0 64 0", "10 64 10", &options).await.unwrap();
    clock.advance(Duration::from_secs(100));

    assert_eq!(service.purge_expired().await, 1);
    assert_eq!(service.cached_len().await, 1);

    service.clear_cache().await;
    assert_eq!(service.cached_len().await, 0);
}

#[tokio::test]
async fn background_eviction_empties_cache() {
    let (service, clock, _estimator) = service();
    service
        .get_quote(PICKUP, DELIVERY, &QuoteOptions::default())
        .await
        .unwrap();
    clock.advance(DEFAULT_QUOTE_TTL + Duration::from_secs(1));

    let janitor = service.spawn_eviction(Duration::from_millis(5));
    for _ in 0..100 {
        if service.cached_len().await == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    janitor.abort();

    assert_eq!(service.cached_len().await, 0);
}

#[tokio::test]
async fn custom_ttl_is_respected() {
    let (service, clock, estimator) = service();
    let service = service.with_ttl(Duration::from_secs(10));
    let options = QuoteOptions::default();

    service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    clock.advance(Duration::from_secs(9));
    service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    assert_eq!(estimator.routes(), 1);

    clock.advance(Duration::from_secs(1));
    service.get_quote(PICKUP, DELIVERY, &options).await.unwrap();
    assert_eq!(estimator.routes(), 2);
}
