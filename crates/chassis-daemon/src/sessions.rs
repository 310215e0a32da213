//! Per-enclosure session state and token refreshing.
//!
//! One [`SessionStore`] owns the mapping from enclosure id to its current
//! bearer token and refresh status. The key set is fixed at construction;
//! only the per-entry fields are ever mutated, so entries carry their own
//! locks and refreshes of different enclosures never contend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use chassis_client::EnclosureApi;
use chassis_common::{EnclosureDescriptor, SessionStatus};

/// Mutable session fields, committed as a unit under the entry lock.
///
/// A reader holding the lock sees either the state before a refresh
/// landed or the state after; never a half-updated pair.
#[derive(Default)]
struct Session {
    token: Option<SecretString>,
    last_updated: Option<DateTime<Utc>>,
}

/// One enclosure's slot in the store.
struct EnclosureEntry {
    descriptor: Arc<EnclosureDescriptor>,
    session: RwLock<Session>,
    /// Single-flight guard: true while a refresh attempt is in flight.
    refreshing: AtomicBool,
}

/// A point-in-time view of one session, taken under the entry lock.
///
/// The token may go stale moments after the snapshot; that race is
/// accepted, not corrected.
pub struct SessionView {
    /// The enclosure this session belongs to.
    pub descriptor: Arc<EnclosureDescriptor>,
    /// The committed token at snapshot time, if any.
    pub token: Option<SecretString>,
    /// Time of the last successful refresh, if any.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Credential store and refresher for the enclosure fleet.
///
/// Sessions are created once at construction with no token and are never
/// destroyed while the process runs. [`SessionStore::refresh_token`] is
/// the only mutator.
pub struct SessionStore {
    entries: DashMap<String, Arc<EnclosureEntry>>,
    api: Arc<dyn EnclosureApi>,
}

impl SessionStore {
    /// Builds the store from the configured descriptors.
    ///
    /// Duplicate ids are last-write-wins at this level; configuration
    /// validation rejects them before the store is built.
    pub fn new(descriptors: Vec<EnclosureDescriptor>, api: Arc<dyn EnclosureApi>) -> Self {
        let entries = DashMap::new();
        for descriptor in descriptors {
            entries.insert(
                descriptor.id.clone(),
                Arc::new(EnclosureEntry {
                    descriptor: Arc::new(descriptor),
                    session: RwLock::new(Session::default()),
                    refreshing: AtomicBool::new(false),
                }),
            );
        }

        Self { entries, api }
    }

    /// Number of managed enclosures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store manages no enclosures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Refreshes the token for one enclosure.
    ///
    /// A no-op when the id is unknown or a refresh for this enclosure is
    /// already in flight (single-flight; the second attempt is dropped,
    /// not queued). On success the token and `last_updated` are committed
    /// together; on any failure the previous token is discarded rather
    /// than left silently usable past its assumed freshness window.
    ///
    /// Never returns an error: failures are terminal to the single
    /// attempt and observable only as an absent token.
    #[instrument(skip(self), fields(enclosure = %id))]
    pub async fn refresh_token(&self, id: &str) {
        let Some(entry) = self.entries.get(id).map(|e| Arc::clone(e.value())) else {
            warn!("Refresh requested for unknown enclosure");
            return;
        };

        if entry
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(
                name = %entry.descriptor.name,
                "Refresh already in flight, skipping"
            );
            return;
        }

        debug!(name = %entry.descriptor.name, "Refreshing token");

        match self.api.authenticate(&entry.descriptor).await {
            Ok(token) => {
                let mut session = entry.session.write().await;
                session.token = Some(token);
                session.last_updated = Some(Utc::now());
                info!(name = %entry.descriptor.name, "Token refreshed");
            }
            Err(error) => {
                let mut session = entry.session.write().await;
                session.token = None;
                warn!(
                    name = %entry.descriptor.name,
                    error = %error,
                    "Token refresh failed, session invalidated"
                );
            }
        }

        entry.refreshing.store(false, Ordering::Release);
    }

    /// Triggers one refresh attempt per known enclosure.
    ///
    /// Each attempt runs as an independent task; this returns without
    /// waiting for any of them. One enclosure's slowness or failure never
    /// blocks another's refresh.
    pub fn refresh_all(self: &Arc<Self>) {
        info!(enclosures = self.entries.len(), "Starting refresh cycle");

        for entry in self.entries.iter() {
            let store = Arc::clone(self);
            let id = entry.key().clone();
            tokio::spawn(async move {
                store.refresh_token(&id).await;
            });
        }
    }

    /// Snapshot of one session, or `None` for an unknown id.
    pub async fn session_view(&self, id: &str) -> Option<SessionView> {
        let entry = self.entries.get(id).map(|e| Arc::clone(e.value()))?;
        let session = entry.session.read().await;

        Some(SessionView {
            descriptor: Arc::clone(&entry.descriptor),
            token: session.token.clone(),
            last_updated: session.last_updated,
        })
    }

    /// Diagnostic snapshot of every session. Carries no token material.
    pub async fn statuses(&self) -> Vec<SessionStatus> {
        // Collect the entries first so no map shard guard is held across
        // an await.
        let entries: Vec<Arc<EnclosureEntry>> = self
            .entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut statuses = Vec::with_capacity(entries.len());
        for entry in entries {
            let session = entry.session.read().await;
            statuses.push(SessionStatus {
                id: entry.descriptor.id.clone(),
                name: entry.descriptor.name.clone(),
                has_token: session.token.is_some(),
                last_updated: session.last_updated,
            });
        }

        statuses
    }
}
