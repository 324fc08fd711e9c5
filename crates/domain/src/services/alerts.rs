//! Alert dispatcher: turns zone transitions and low-battery readings into
//! deduplicated, cooldown-respecting alert records.
//!
//! Dispatch is fire-and-forget from the pipeline's point of view: the
//! location was already durably recorded, so a failed alert write is logged
//! and counted as a degraded-mode signal rather than failing the ingestion.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::alert::{Alert, AlertKind, NewAlert};
use crate::services::geofence::{Membership, ZoneTransition};

/// Storage seam for the alert outbox. The delivery transport (push/SMS)
/// drains it externally.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persists a new alert and returns the stored record.
    async fn insert(&self, alert: &NewAlert) -> Result<Alert, StorageError>;

    /// Whether an alert with the given dedupe key `(pet_id, kind, zone_id)`
    /// was created at or after `since`.
    async fn exists_since(
        &self,
        pet_id: Uuid,
        kind: AlertKind,
        zone_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Alerts for a pet, newest first, optionally bounded below by `since`.
    async fn list_for_pet(
        &self,
        pet_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Alert>, StorageError>;
}

/// Creates alerts from transition events and battery readings.
pub struct AlertDispatcher {
    store: Arc<dyn AlertStore>,
    cooldown: Duration,
    low_battery_threshold: i32,
}

impl AlertDispatcher {
    pub fn new(store: Arc<dyn AlertStore>, cooldown_secs: i64, low_battery_threshold: i32) -> Self {
        Self {
            store,
            cooldown: Duration::seconds(cooldown_secs),
            low_battery_threshold,
        }
    }

    /// Converts confirmed zone transitions into alerts, suppressing any whose
    /// dedupe key fired within the cooldown window. Returns the alerts that
    /// were actually created.
    pub async fn dispatch_transitions(
        &self,
        pet_id: Uuid,
        transitions: &[ZoneTransition],
    ) -> Vec<Alert> {
        let mut created = Vec::new();

        for transition in transitions {
            let kind = match (transition.from, transition.to) {
                (Membership::Inside, Membership::Outside) => AlertKind::ZoneExit,
                (Membership::Outside, Membership::Inside) => AlertKind::ZoneEnter,
                // The evaluator never confirms a transition involving Unknown.
                _ => continue,
            };

            if let Some(alert) = self
                .create_deduplicated(pet_id, kind, Some(transition.zone_id))
                .await
            {
                created.push(alert);
            }
        }

        created
    }

    /// Creates a low-battery alert when the reading is below the threshold
    /// and none was created within the cooldown window. A ping without a
    /// battery reading never alerts.
    pub async fn dispatch_battery(&self, pet_id: Uuid, battery: Option<i32>) -> Option<Alert> {
        let level = battery?;
        if level >= self.low_battery_threshold {
            return None;
        }
        self.create_deduplicated(pet_id, AlertKind::LowBattery, None)
            .await
    }

    /// Cooldown check followed by insert. Safe from duplicate alerts because
    /// the caller holds the pet's pipeline lock.
    async fn create_deduplicated(
        &self,
        pet_id: Uuid,
        kind: AlertKind,
        zone_id: Option<Uuid>,
    ) -> Option<Alert> {
        let window_start = Utc::now() - self.cooldown;

        match self
            .store
            .exists_since(pet_id, kind, zone_id, window_start)
            .await
        {
            Ok(true) => {
                debug!(
                    pet_id = %pet_id,
                    kind = kind.as_str(),
                    "Alert suppressed by cooldown"
                );
                return None;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(
                    pet_id = %pet_id,
                    kind = kind.as_str(),
                    error = %e,
                    "Alert cooldown lookup failed; skipping alert"
                );
                counter!("alert_persist_failures_total").increment(1);
                return None;
            }
        }

        let new_alert = NewAlert {
            pet_id,
            kind,
            zone_id,
        };

        match self.store.insert(&new_alert).await {
            Ok(alert) => {
                counter!("alerts_created_total", "kind" => kind.as_str()).increment(1);
                Some(alert)
            }
            Err(e) => {
                warn!(
                    pet_id = %pet_id,
                    kind = kind.as_str(),
                    error = %e,
                    "Failed to persist alert; ingestion continues degraded"
                );
                counter!("alert_persist_failures_total").increment(1);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory alert outbox; `fail` makes every call return a storage error.
    struct MemoryAlertStore {
        alerts: Mutex<Vec<Alert>>,
        fail: bool,
    }

    impl MemoryAlertStore {
        fn new() -> Self {
            Self {
                alerts: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                alerts: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl AlertStore for MemoryAlertStore {
        async fn insert(&self, alert: &NewAlert) -> Result<Alert, StorageError> {
            if self.fail {
                return Err(StorageError::Unavailable("down".into()));
            }
            let mut alerts = self.alerts.lock().unwrap();
            let stored = Alert {
                id: alerts.len() as i64 + 1,
                alert_id: Uuid::new_v4(),
                pet_id: alert.pet_id,
                kind: alert.kind,
                zone_id: alert.zone_id,
                created_at: Utc::now(),
            };
            alerts.push(stored.clone());
            Ok(stored)
        }

        async fn exists_since(
            &self,
            pet_id: Uuid,
            kind: AlertKind,
            zone_id: Option<Uuid>,
            since: DateTime<Utc>,
        ) -> Result<bool, StorageError> {
            if self.fail {
                return Err(StorageError::Unavailable("down".into()));
            }
            Ok(self.alerts.lock().unwrap().iter().any(|a| {
                a.pet_id == pet_id && a.kind == kind && a.zone_id == zone_id && a.created_at >= since
            }))
        }

        async fn list_for_pet(
            &self,
            pet_id: Uuid,
            since: Option<DateTime<Utc>>,
            limit: i64,
        ) -> Result<Vec<Alert>, StorageError> {
            let mut alerts: Vec<Alert> = self
                .alerts
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.pet_id == pet_id && since.map_or(true, |s| a.created_at >= s))
                .cloned()
                .collect();
            alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            alerts.truncate(limit as usize);
            Ok(alerts)
        }
    }

    fn exit_transition(zone_id: Uuid) -> ZoneTransition {
        ZoneTransition {
            zone_id,
            from: Membership::Inside,
            to: Membership::Outside,
        }
    }

    #[tokio::test]
    async fn test_exit_transition_creates_zone_exit_alert() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store.clone(), 300, 15);
        let pet_id = Uuid::new_v4();
        let zone_id = Uuid::new_v4();

        let created = dispatcher
            .dispatch_transitions(pet_id, &[exit_transition(zone_id)])
            .await;

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].kind, AlertKind::ZoneExit);
        assert_eq!(created[0].zone_id, Some(zone_id));
    }

    #[tokio::test]
    async fn test_enter_transition_creates_zone_enter_alert() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store, 300, 15);
        let pet_id = Uuid::new_v4();
        let zone_id = Uuid::new_v4();

        let created = dispatcher
            .dispatch_transitions(
                pet_id,
                &[ZoneTransition {
                    zone_id,
                    from: Membership::Outside,
                    to: Membership::Inside,
                }],
            )
            .await;

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].kind, AlertKind::ZoneEnter);
    }

    #[tokio::test]
    async fn test_cooldown_suppresses_duplicate() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store.clone(), 300, 15);
        let pet_id = Uuid::new_v4();
        let zone_id = Uuid::new_v4();

        let first = dispatcher
            .dispatch_transitions(pet_id, &[exit_transition(zone_id)])
            .await;
        let second = dispatcher
            .dispatch_transitions(pet_id, &[exit_transition(zone_id)])
            .await;

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(store.alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_cooldown_allows_repeat() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store.clone(), 0, 15);
        let pet_id = Uuid::new_v4();
        let zone_id = Uuid::new_v4();

        dispatcher
            .dispatch_transitions(pet_id, &[exit_transition(zone_id)])
            .await;
        // With no cooldown the window start is "now", so an alert created
        // strictly earlier no longer suppresses.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = dispatcher
            .dispatch_transitions(pet_id, &[exit_transition(zone_id)])
            .await;

        assert_eq!(second.len(), 1);
        assert_eq!(store.alerts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_different_zones_do_not_share_dedupe_key() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store.clone(), 300, 15);
        let pet_id = Uuid::new_v4();

        let created = dispatcher
            .dispatch_transitions(
                pet_id,
                &[
                    exit_transition(Uuid::new_v4()),
                    exit_transition(Uuid::new_v4()),
                ],
            )
            .await;

        assert_eq!(created.len(), 2);
    }

    #[tokio::test]
    async fn test_low_battery_alert() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store, 300, 15);
        let pet_id = Uuid::new_v4();

        let alert = dispatcher.dispatch_battery(pet_id, Some(10)).await;
        assert!(alert.is_some());
        let alert = alert.unwrap();
        assert_eq!(alert.kind, AlertKind::LowBattery);
        assert_eq!(alert.zone_id, None);
    }

    #[tokio::test]
    async fn test_battery_at_threshold_does_not_alert() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store, 300, 15);

        assert!(dispatcher
            .dispatch_battery(Uuid::new_v4(), Some(15))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_missing_battery_reading_does_not_alert() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store, 300, 15);

        assert!(dispatcher.dispatch_battery(Uuid::new_v4(), None).await.is_none());
    }

    #[tokio::test]
    async fn test_low_battery_cooldown() {
        let store = Arc::new(MemoryAlertStore::new());
        let dispatcher = AlertDispatcher::new(store.clone(), 300, 15);
        let pet_id = Uuid::new_v4();

        assert!(dispatcher.dispatch_battery(pet_id, Some(5)).await.is_some());
        assert!(dispatcher.dispatch_battery(pet_id, Some(4)).await.is_none());
        assert_eq!(store.alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed() {
        let store = Arc::new(MemoryAlertStore::failing());
        let dispatcher = AlertDispatcher::new(store, 300, 15);
        let pet_id = Uuid::new_v4();

        // No panic, no error: dispatch degrades to producing nothing.
        let created = dispatcher
            .dispatch_transitions(pet_id, &[exit_transition(Uuid::new_v4())])
            .await;
        assert!(created.is_empty());

        assert!(dispatcher.dispatch_battery(pet_id, Some(1)).await.is_none());
    }
}
