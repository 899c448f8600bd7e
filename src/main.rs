#![deny(warnings)]

use std::thread;
use std::time::Duration;

use lighter_breaker::config;
use lighter_breaker::observability;
use lighter_breaker::{CircuitBreakerError, CircuitState};

const REQUESTS: usize = 13;
const PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
#[error("simulated failure")]
struct SimulatedFailure;

fn main() -> anyhow::Result<()> {
    let config = config::load()?;
    observability::init(&config.observability)?;

    let cb = config.resilience.circuit_breaker.build(config.app.name.as_str());

    tracing::info!(
        open = cb.state() == CircuitState::Open,
        failures = cb.failures(),
        max_failures = cb.max_failures(),
        reset_timeout_ms = cb.reset_timeout().as_millis() as u64,
        "Initial circuit state"
    );

    for i in 0..REQUESTS {
        let request = i + 1;

        // Every other request fails
        let result = cb.call(|| {
            if i % 2 == 0 {
                return Err(SimulatedFailure);
            }
            Ok(())
        });

        match result {
            Ok(()) => tracing::info!(request, "Request succeeded"),
            Err(CircuitBreakerError::Open { name }) => {
                tracing::info!(request, circuit_breaker = %name, "Request refused, circuit is open")
            }
            Err(CircuitBreakerError::Inner(e)) => {
                tracing::info!(request, error = %e, "Request failed")
            }
        }

        tracing::info!(
            request,
            open = !cb.is_allowed(),
            failures = cb.failures(),
            "Circuit state"
        );

        thread::sleep(PAUSE);
    }

    let stats = cb.stats();
    tracing::info!(
        total_calls = stats.total_calls,
        total_failures = stats.total_failures,
        rejected_calls = stats.rejected_calls,
        times_opened = stats.times_opened,
        "Done"
    );

    Ok(())
}
