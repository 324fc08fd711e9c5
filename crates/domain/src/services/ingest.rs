//! Location ingest service: the entry point of the engine.
//!
//! A submitted ping flows validate -> authorize -> persist -> evaluate ->
//! dispatch. For a single pet that pipeline is mutually exclusive: the
//! per-zone debounce counters and the sequence assignment are per-pet mutable
//! state with no locking of their own, so the service serializes access per
//! pet. Pets never share a lock; unrelated pets proceed fully in parallel.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::counter;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{validation_message, IngestError, StorageError};
use crate::models::alert::{Alert, ListAlertsQuery};
use crate::models::location::{GetHistoryQuery, LocationLog, LocationLogInput, SubmitPingRequest};
use crate::models::safe_zone::{GeoPoint, SafeZone};
use crate::services::access::{PetDirectory, PlanAccessGate, PlanResolver};
use crate::services::alerts::{AlertDispatcher, AlertStore};
use crate::services::geofence::{GeofenceEvaluator, PetZoneState};

/// Storage seam for the append-only location history.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Appends a log. Idempotent on `(pet_id, sequence)`: re-appending an
    /// already-seen sequence returns the previously stored row instead of
    /// erroring, to tolerate at-least-once delivery upstream.
    async fn append(&self, input: &LocationLogInput) -> Result<LocationLog, StorageError>;

    /// Latest known log for a pet, by `(recorded_at, sequence)`.
    async fn latest(&self, pet_id: Uuid) -> Result<Option<LocationLog>, StorageError>;

    /// A page of logs ascending by `(recorded_at, sequence)`, plus a flag
    /// indicating whether more rows exist beyond the page.
    async fn range(&self, query: &HistoryQuery) -> Result<(Vec<LocationLog>, bool), StorageError>;
}

/// Read-only view of a pet's safe zones, owned by the external CRUD system.
/// The active set may change between calls.
#[async_trait]
pub trait SafeZoneRegistry: Send + Sync {
    async fn list_active_zones(&self, pet_id: Uuid) -> Result<Vec<SafeZone>, StorageError>;
}

/// Resolved storage-level history query.
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    pub pet_id: Uuid,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Exclusive keyset cursor: rows strictly after `(recorded_at, sequence)`.
    pub cursor: Option<(DateTime<Utc>, i64)>,
    pub limit: i64,
}

/// One page of location history.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub logs: Vec<LocationLog>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Engine tuning knobs. The defaults are design choices, not laws: deployments
/// override them through configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Consecutive agreeing pings required to confirm a zone transition.
    pub confirmation_pings: u32,
    /// Minimum seconds between two alerts sharing a dedupe key.
    pub alert_cooldown_secs: i64,
    /// Battery percentage strictly below which a low-battery alert fires.
    pub low_battery_threshold: i32,
    /// When true, client timestamps earlier than the pet's last recorded
    /// timestamp are rejected with `OutOfOrder` instead of being clamped.
    pub strict_ordering: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            confirmation_pings: 2,
            alert_cooldown_secs: 300,
            low_battery_threshold: 15,
            strict_ordering: false,
        }
    }
}

/// Per-pet pipeline state, guarded by that pet's pipeline lock.
struct PetState {
    /// Lazily seeded from the store's latest row on first use.
    seeded: bool,
    next_sequence: i64,
    last_recorded_at: Option<DateTime<Utc>>,
    zones: PetZoneState,
}

impl PetState {
    fn new() -> Self {
        Self {
            seeded: false,
            next_sequence: 1,
            last_recorded_at: None,
            zones: PetZoneState::default(),
        }
    }
}

/// Validates, sequences, persists, and evaluates location pings.
pub struct LocationIngestService {
    store: Arc<dyn LocationStore>,
    zones: Arc<dyn SafeZoneRegistry>,
    alerts: Arc<dyn AlertStore>,
    gate: PlanAccessGate,
    evaluator: GeofenceEvaluator,
    dispatcher: AlertDispatcher,
    strict_ordering: bool,
    /// One lock per pet; entries are created on demand and never shared
    /// between pets.
    pipelines: RwLock<HashMap<Uuid, Arc<AsyncMutex<PetState>>>>,
    /// Latest-known-location cache for fast reads; read-through on miss.
    latest: RwLock<HashMap<Uuid, LocationLog>>,
}

impl LocationIngestService {
    pub fn new(
        store: Arc<dyn LocationStore>,
        zones: Arc<dyn SafeZoneRegistry>,
        alerts: Arc<dyn AlertStore>,
        pets: Arc<dyn PetDirectory>,
        plans: Arc<dyn PlanResolver>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            zones,
            alerts: alerts.clone(),
            gate: PlanAccessGate::new(pets, plans),
            evaluator: GeofenceEvaluator::new(config.confirmation_pings),
            dispatcher: AlertDispatcher::new(
                alerts,
                config.alert_cooldown_secs,
                config.low_battery_threshold,
            ),
            strict_ordering: config.strict_ordering,
            pipelines: RwLock::new(HashMap::new()),
            latest: RwLock::new(HashMap::new()),
        }
    }

    /// Submits one ping. Returns the persisted log, or fails with no side
    /// effects on validation/authorization errors. A storage failure during
    /// append aborts the pipeline before evaluation; the client may retry.
    pub async fn submit(
        &self,
        user_id: Uuid,
        request: SubmitPingRequest,
    ) -> Result<LocationLog, IngestError> {
        request
            .validate()
            .map_err(|e| IngestError::Validation(validation_message(&e)))?;

        let client_timestamp = request
            .timestamp
            .map(|ms| {
                Utc.timestamp_millis_opt(ms)
                    .single()
                    .ok_or_else(|| IngestError::Validation(format!("Invalid timestamp: {}", ms)))
            })
            .transpose()?;

        // Authorization before any side effect; a denial leaves no trace.
        self.gate.authorize(request.pet_id, user_id).await?;

        let pet_id = request.pet_id;
        let pipeline = self.pipeline_entry(pet_id);
        let mut state = pipeline.lock().await;

        self.seed_state(pet_id, &mut state).await?;

        if self.strict_ordering {
            if let (Some(client_ts), Some(last)) = (client_timestamp, state.last_recorded_at) {
                if client_ts < last {
                    return Err(IngestError::OutOfOrder(format!(
                        "Client timestamp {} precedes last recorded {}",
                        client_ts, last
                    )));
                }
            }
        }

        // Server timestamp is authoritative and non-decreasing per pet even
        // when client clocks are skewed.
        let now = Utc::now();
        let recorded_at = match state.last_recorded_at {
            Some(last) if last > now => last,
            _ => now,
        };

        let input = LocationLogInput {
            pet_id,
            latitude: request.latitude,
            longitude: request.longitude,
            accuracy: request.accuracy,
            battery: request.battery,
            recorded_at,
            sequence: state.next_sequence,
        };

        let log = self.store.append(&input).await?;

        state.next_sequence = log.sequence + 1;
        state.last_recorded_at = Some(log.recorded_at);
        self.cache_latest(&log);

        counter!("pings_ingested_total").increment(1);

        // The log is durable; everything past this point degrades rather than
        // failing the submission.
        let point = GeoPoint::new(log.latitude, log.longitude);
        let transitions = match self.zones.list_active_zones(pet_id).await {
            Ok(zones) => self
                .evaluator
                .evaluate(&mut state.zones, &point, &zones, log.recorded_at),
            Err(e) => {
                warn!(
                    pet_id = %pet_id,
                    error = %e,
                    "Safe zone lookup failed; skipping geofence evaluation for this ping"
                );
                Vec::new()
            }
        };

        if !transitions.is_empty() {
            counter!("zone_transitions_total").increment(transitions.len() as u64);
            info!(
                pet_id = %pet_id,
                transitions = transitions.len(),
                "Zone transitions confirmed"
            );
        }

        self.dispatcher
            .dispatch_transitions(pet_id, &transitions)
            .await;
        self.dispatcher.dispatch_battery(pet_id, log.battery).await;

        Ok(log)
    }

    /// Latest known location for a pet.
    pub async fn get_latest(&self, user_id: Uuid, pet_id: Uuid) -> Result<LocationLog, IngestError> {
        self.gate.authorize(pet_id, user_id).await?;

        if let Some(log) = self.latest.read().unwrap().get(&pet_id).cloned() {
            return Ok(log);
        }

        match self.store.latest(pet_id).await? {
            Some(log) => {
                self.cache_latest(&log);
                Ok(log)
            }
            None => Err(IngestError::NotFound(format!(
                "No location recorded for pet {}",
                pet_id
            ))),
        }
    }

    /// A page of location history ascending by `(recorded_at, sequence)`.
    pub async fn get_history(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        query: &GetHistoryQuery,
    ) -> Result<HistoryPage, IngestError> {
        self.gate.authorize(pet_id, user_id).await?;

        let cursor = query
            .cursor
            .as_deref()
            .map(|c| {
                shared::pagination::decode_cursor(c)
                    .map_err(|_| IngestError::Validation("Invalid cursor format".to_string()))
            })
            .transpose()?;

        let history_query = HistoryQuery {
            pet_id,
            from: query.from.map(timestamp_from_millis).transpose()?,
            to: query.to.map(timestamp_from_millis).transpose()?,
            cursor,
            limit: query.effective_limit(),
        };

        let (logs, has_more) = self.store.range(&history_query).await?;

        let next_cursor = if has_more {
            logs.last()
                .map(|log| shared::pagination::encode_cursor(log.recorded_at, log.sequence))
        } else {
            None
        };

        Ok(HistoryPage {
            logs,
            next_cursor,
            has_more,
        })
    }

    /// Alerts for a pet, newest first.
    pub async fn list_alerts(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        query: &ListAlertsQuery,
    ) -> Result<Vec<Alert>, IngestError> {
        self.gate.authorize(pet_id, user_id).await?;

        let since = query.since.map(timestamp_from_millis).transpose()?;
        let alerts = self
            .alerts
            .list_for_pet(pet_id, since, query.effective_limit())
            .await?;
        Ok(alerts)
    }

    /// Updates the latest-location cache, keeping whichever row is newer by
    /// `(recorded_at, sequence)`. The read-through in `get_latest` runs
    /// outside the pet's pipeline lock, so its store row can lose a race
    /// against a concurrent submit and must not clobber the fresher entry.
    fn cache_latest(&self, log: &LocationLog) {
        let mut latest = self.latest.write().unwrap();
        let stale = latest
            .get(&log.pet_id)
            .is_some_and(|cached| !newer_than(log, cached));
        if !stale {
            latest.insert(log.pet_id, log.clone());
        }
    }

    /// Gets or creates the pipeline lock for a pet (double-checked so the
    /// common path takes only the read lock).
    fn pipeline_entry(&self, pet_id: Uuid) -> Arc<AsyncMutex<PetState>> {
        {
            let pipelines = self.pipelines.read().unwrap();
            if let Some(entry) = pipelines.get(&pet_id) {
                return entry.clone();
            }
        }

        let mut pipelines = self.pipelines.write().unwrap();
        if let Some(entry) = pipelines.get(&pet_id) {
            return entry.clone();
        }

        let entry = Arc::new(AsyncMutex::new(PetState::new()));
        pipelines.insert(pet_id, entry.clone());
        entry
    }

    /// Seeds sequence/timestamp state from the store on the pet's first
    /// pipeline run after startup.
    async fn seed_state(&self, pet_id: Uuid, state: &mut PetState) -> Result<(), StorageError> {
        if state.seeded {
            return Ok(());
        }
        if let Some(last) = self.store.latest(pet_id).await? {
            state.next_sequence = last.sequence + 1;
            state.last_recorded_at = Some(last.recorded_at);
        }
        state.seeded = true;
        Ok(())
    }
}

/// Whether `candidate` is strictly newer than `cached` in the total order on
/// `(recorded_at, sequence)`.
fn newer_than(candidate: &LocationLog, cached: &LocationLog) -> bool {
    (candidate.recorded_at, candidate.sequence) > (cached.recorded_at, cached.sequence)
}

/// Converts a millisecond epoch timestamp into a `DateTime`, rejecting
/// out-of-range values.
fn timestamp_from_millis(ms: i64) -> Result<DateTime<Utc>, IngestError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| IngestError::Validation(format!("Invalid timestamp: {}", ms)))
}
