//! Timer-driven token refresh scheduling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

use crate::sessions::SessionStore;

/// Runs the periodic refresh loop until shutdown.
///
/// The first tick fires immediately, so the fleet is refreshed once at
/// startup; subsequent ticks fire every `period` on the wall clock with
/// no jitter, backoff, or skip-if-still-running logic. A tick that
/// overlaps a still-in-flight previous cycle is safe because each
/// enclosure's refresh is single-flight.
pub async fn run_refresh_scheduler(
    store: Arc<SessionStore>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);

    info!(period_secs = period.as_secs(), "Refresh scheduler started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                store.refresh_all();
            }
            _ = shutdown.recv() => {
                info!("Refresh scheduler stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use secrecy::SecretString;

    use chassis_client::{ClientError, EnclosureApi};
    use chassis_common::{EnclosureDescriptor, ProxyRequest};

    use super::*;

    struct CountingApi {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl EnclosureApi for CountingApi {
        async fn authenticate(
            &self,
            _enclosure: &EnclosureDescriptor,
        ) -> Result<SecretString, ClientError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(SecretString::from("tok"))
        }

        async fn forward(
            &self,
            _enclosure: &EnclosureDescriptor,
            _token: &SecretString,
            _request: &ProxyRequest,
        ) -> Result<String, ClientError> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_scheduler_fires_immediately_and_periodically() {
        let api = Arc::new(CountingApi {
            attempts: AtomicUsize::new(0),
        });
        let store = Arc::new(SessionStore::new(
            vec![EnclosureDescriptor::new(
                "e1", "E1", "10.0.0.1", "admin", "pw",
            )],
            Arc::clone(&api) as _,
        ));

        let (shutdown_tx, _) = broadcast::channel(1);
        let scheduler = tokio::spawn(run_refresh_scheduler(
            Arc::clone(&store),
            Duration::from_millis(50),
            shutdown_tx.subscribe(),
        ));

        // First cycle fires immediately, further cycles every period.
        tokio::time::sleep(Duration::from_millis(180)).await;
        shutdown_tx.send(()).unwrap();
        scheduler.await.unwrap();

        let attempts = api.attempts.load(Ordering::SeqCst);
        assert!(attempts >= 2, "expected repeated cycles, saw {attempts}");
    }

    #[tokio::test]
    async fn test_scheduler_stops_on_shutdown() {
        let api = Arc::new(CountingApi {
            attempts: AtomicUsize::new(0),
        });
        let store = Arc::new(SessionStore::new(vec![], Arc::clone(&api) as _));

        let (shutdown_tx, _) = broadcast::channel(1);
        let scheduler = tokio::spawn(run_refresh_scheduler(
            store,
            Duration::from_secs(600),
            shutdown_tx.subscribe(),
        ));

        shutdown_tx.send(()).unwrap();
        scheduler.await.unwrap();
    }
}
