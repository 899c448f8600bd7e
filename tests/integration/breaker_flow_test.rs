//! End-to-end breaker behavior through the public API

use lighter_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
use std::cell::Cell;
use std::thread::sleep;
use std::time::Duration;

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("upstream unavailable")]
struct Upstream;

fn breaker(max_failures: u32, reset_timeout: Duration) -> CircuitBreaker {
    CircuitBreaker::with_config(
        "upstream",
        CircuitBreakerConfig::default()
            .with_max_failures(max_failures)
            .with_reset_timeout(reset_timeout),
    )
}

fn outcome(cb: &CircuitBreaker, fail: bool, invoked: &Cell<u32>) -> Result<(), CircuitBreakerError<Upstream>> {
    cb.call(|| {
        invoked.set(invoked.get() + 1);
        if fail { Err(Upstream) } else { Ok(()) }
    })
}

#[test]
fn test_threshold_trip_refuses_next_call() {
    for n in 1..=5 {
        let cb = breaker(n, Duration::from_secs(60));
        let invoked = Cell::new(0);

        for _ in 0..n {
            let result = outcome(&cb, true, &invoked);
            assert_eq!(result.unwrap_err().into_inner(), Some(Upstream));
        }

        let result = outcome(&cb, false, &invoked);
        assert!(result.unwrap_err().is_open(), "n = {}", n);
        assert_eq!(invoked.get(), n, "operation must not run while open");
    }
}

#[test]
fn test_sub_threshold_failures_keep_calls_flowing() {
    let cb = breaker(5, Duration::from_secs(60));
    let invoked = Cell::new(0);

    for count in 1..5 {
        let _ = outcome(&cb, true, &invoked);
        assert!(cb.is_allowed());
        assert_eq!(cb.failures(), count);
    }
    assert_eq!(cb.state(), CircuitState::Closed);
}

#[test]
fn test_success_neither_trips_nor_clears_count() {
    let cb = breaker(2, Duration::from_secs(60));
    let invoked = Cell::new(0);

    let _ = outcome(&cb, true, &invoked);
    for _ in 0..10 {
        assert!(outcome(&cb, false, &invoked).is_ok());
    }
    assert_eq!(cb.state(), CircuitState::Closed);
    assert_eq!(cb.failures(), 1);

    // fail, success, fail: the count is not consecutive-reset by the success
    let _ = outcome(&cb, true, &invoked);
    assert_eq!(cb.state(), CircuitState::Open);
}

#[test]
fn test_cooldown_recovery_admits_regardless_of_outcome() {
    let cb = breaker(1, Duration::from_millis(100));
    let invoked = Cell::new(0);

    let _ = outcome(&cb, true, &invoked);
    assert!(outcome(&cb, false, &invoked).unwrap_err().is_open());

    sleep(Duration::from_millis(150));

    // Admitted even though this attempt fails and re-trips
    let result = outcome(&cb, true, &invoked);
    assert_eq!(result.unwrap_err().into_inner(), Some(Upstream));
    assert_eq!(invoked.get(), 2);
    assert_eq!(cb.state(), CircuitState::Open);
    assert_eq!(cb.stats().times_opened, 2);
}

#[test]
fn test_reconfiguration_shortens_open_period() {
    let cb = breaker(1, Duration::from_secs(3600));
    let invoked = Cell::new(0);

    let _ = outcome(&cb, true, &invoked);
    assert!(!cb.is_allowed());

    cb.set_reset_timeout(Duration::from_millis(50));
    sleep(Duration::from_millis(80));

    assert!(outcome(&cb, false, &invoked).is_ok());
    assert_eq!(cb.failures(), 0);
}

#[test]
fn test_reconfiguration_lengthens_open_period() {
    let cb = breaker(1, Duration::from_millis(50));
    let invoked = Cell::new(0);

    let _ = outcome(&cb, true, &invoked);
    cb.set_reset_timeout(Duration::from_secs(3600));
    sleep(Duration::from_millis(80));

    assert!(outcome(&cb, false, &invoked).unwrap_err().is_open());
    assert_eq!(invoked.get(), 1);
}

/// max_failures = 2, reset_timeout = 2s; fail at 0s, fail at 0.1s, fail at 0.2s,
/// succeed at 2.5s.
#[test]
fn test_scenario_trip_refuse_recover() {
    let cb = breaker(2, Duration::from_secs(2));
    let invoked = Cell::new(0);

    let first = outcome(&cb, true, &invoked);
    assert!(matches!(first, Err(CircuitBreakerError::Inner(Upstream))));
    assert_eq!(cb.failures(), 1);
    assert_eq!(cb.state(), CircuitState::Closed);

    sleep(Duration::from_millis(100));
    let second = outcome(&cb, true, &invoked);
    assert!(matches!(second, Err(CircuitBreakerError::Inner(Upstream))));
    assert_eq!(cb.failures(), 2);
    assert_eq!(cb.state(), CircuitState::Open);

    sleep(Duration::from_millis(100));
    let third = outcome(&cb, true, &invoked);
    assert!(matches!(third, Err(CircuitBreakerError::Open { .. })));
    assert_eq!(invoked.get(), 2);

    sleep(Duration::from_millis(2300));
    let fourth = outcome(&cb, false, &invoked);
    assert!(fourth.is_ok());
    assert_eq!(invoked.get(), 3);
    assert_eq!(cb.failures(), 0);
    assert_eq!(cb.state(), CircuitState::Closed);

    let stats = cb.stats();
    assert_eq!(stats.total_calls, 3);
    assert_eq!(stats.total_failures, 2);
    assert_eq!(stats.rejected_calls, 1);
    assert_eq!(stats.times_opened, 1);
}
