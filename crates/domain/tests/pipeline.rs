//! End-to-end pipeline tests for the location ingest service, running the
//! full validate -> authorize -> persist -> evaluate -> dispatch flow against
//! in-memory stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use domain::error::{AccessDeniedReason, IngestError, StorageError};
use domain::models::alert::ListAlertsQuery;
use domain::models::location::{GetHistoryQuery, SubmitPingRequest};
use domain::models::{
    Alert, AlertKind, GeoPoint, LocationLog, LocationLogInput, NewAlert, Pet, PlanTier, SafeZone,
    ZoneShape,
};
use domain::services::{
    AlertStore, HistoryQuery, IngestConfig, LocationIngestService, LocationStore, PetDirectory,
    PlanResolver, SafeZoneRegistry,
};

// Degrees of latitude per meter under the same spherical approximation the
// geometry kernel uses.
const DEG_PER_METER: f64 = 1.0 / (6_371_000.0 * std::f64::consts::PI / 180.0);

struct MemoryLocationStore {
    rows: Mutex<Vec<LocationLog>>,
    next_id: AtomicI64,
    fail: AtomicBool,
}

impl MemoryLocationStore {
    fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn append(&self, input: &LocationLogInput) -> Result<LocationLog, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("append failed".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows
            .iter()
            .find(|r| r.pet_id == input.pet_id && r.sequence == input.sequence)
        {
            return Ok(existing.clone());
        }
        let log = LocationLog {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            pet_id: input.pet_id,
            latitude: input.latitude,
            longitude: input.longitude,
            accuracy: input.accuracy,
            battery: input.battery,
            recorded_at: input.recorded_at,
            sequence: input.sequence,
        };
        rows.push(log.clone());
        Ok(log)
    }

    async fn latest(&self, pet_id: Uuid) -> Result<Option<LocationLog>, StorageError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.pet_id == pet_id)
            .max_by_key(|r| (r.recorded_at, r.sequence))
            .cloned())
    }

    async fn range(&self, query: &HistoryQuery) -> Result<(Vec<LocationLog>, bool), StorageError> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<LocationLog> = rows
            .iter()
            .filter(|r| r.pet_id == query.pet_id)
            .filter(|r| query.from.is_none_or(|from| r.recorded_at >= from))
            .filter(|r| query.to.is_none_or(|to| r.recorded_at <= to))
            .filter(|r| {
                query
                    .cursor
                    .is_none_or(|(ts, seq)| (r.recorded_at, r.sequence) > (ts, seq))
            })
            .cloned()
            .collect();
        matched.sort_by_key(|r| (r.recorded_at, r.sequence));
        let has_more = matched.len() as i64 > query.limit;
        matched.truncate(query.limit as usize);
        Ok((matched, has_more))
    }
}

struct MemoryZoneRegistry {
    zones: Vec<SafeZone>,
    fail: AtomicBool,
}

impl MemoryZoneRegistry {
    fn new(zones: Vec<SafeZone>) -> Self {
        Self {
            zones,
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SafeZoneRegistry for MemoryZoneRegistry {
    async fn list_active_zones(&self, pet_id: Uuid) -> Result<Vec<SafeZone>, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("zone lookup failed".to_string()));
        }
        Ok(self
            .zones
            .iter()
            .filter(|z| z.pet_id == pet_id && z.active)
            .cloned()
            .collect())
    }
}

struct MemoryAlertStore {
    alerts: Mutex<Vec<Alert>>,
    next_id: AtomicI64,
}

impl MemoryAlertStore {
    fn new() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn count_kind(&self, kind: AlertKind) -> usize {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.kind == kind)
            .count()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn insert(&self, alert: &NewAlert) -> Result<Alert, StorageError> {
        let stored = Alert {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            alert_id: Uuid::new_v4(),
            pet_id: alert.pet_id,
            kind: alert.kind,
            zone_id: alert.zone_id,
            created_at: Utc::now(),
        };
        self.alerts.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn exists_since(
        &self,
        pet_id: Uuid,
        kind: AlertKind,
        zone_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
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
        let mut matched: Vec<Alert> = self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.pet_id == pet_id)
            .filter(|a| since.is_none_or(|s| a.created_at >= s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matched.truncate(limit as usize);
        Ok(matched)
    }
}

struct MemoryDirectory {
    pets: Vec<Pet>,
}

#[async_trait]
impl PetDirectory for MemoryDirectory {
    async fn find_pet(&self, pet_id: Uuid) -> Result<Option<Pet>, StorageError> {
        Ok(self.pets.iter().find(|p| p.pet_id == pet_id).cloned())
    }
}

struct MemoryPlans {
    plans: HashMap<Uuid, PlanTier>,
}

#[async_trait]
impl PlanResolver for MemoryPlans {
    async fn resolve_user_plan(&self, user_id: Uuid) -> Result<Option<PlanTier>, StorageError> {
        Ok(self.plans.get(&user_id).copied())
    }
}

struct Harness {
    service: Arc<LocationIngestService>,
    store: Arc<MemoryLocationStore>,
    zones: Arc<MemoryZoneRegistry>,
    alerts: Arc<MemoryAlertStore>,
    user_id: Uuid,
    pet_id: Uuid,
}

impl Harness {
    fn ping(&self, latitude: f64, longitude: f64) -> SubmitPingRequest {
        SubmitPingRequest {
            pet_id: self.pet_id,
            latitude,
            longitude,
            accuracy: Some(8.0),
            battery: Some(80),
            timestamp: None,
        }
    }
}

fn circle_zone(pet_id: Uuid, center: GeoPoint, radius_meters: f64) -> SafeZone {
    SafeZone {
        id: 1,
        zone_id: Uuid::new_v4(),
        pet_id,
        name: "Backyard".to_string(),
        shape: ZoneShape::Circle {
            center,
            radius_meters,
        },
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn setup(plan: PlanTier, zones: Vec<SafeZone>, config: IngestConfig) -> Harness {
    let user_id = Uuid::new_v4();
    let pet_id = zones
        .first()
        .map(|z| z.pet_id)
        .unwrap_or_else(Uuid::new_v4);

    let store = Arc::new(MemoryLocationStore::new());
    let zones = Arc::new(MemoryZoneRegistry::new(zones));
    let alerts = Arc::new(MemoryAlertStore::new());
    let pets = Arc::new(MemoryDirectory {
        pets: vec![Pet {
            id: 1,
            pet_id,
            owner_user_id: user_id,
            name: "Luna".to_string(),
            created_at: Utc::now(),
        }],
    });
    let plans = Arc::new(MemoryPlans {
        plans: HashMap::from([(user_id, plan)]),
    });

    let service = Arc::new(LocationIngestService::new(
        store.clone(),
        zones.clone(),
        alerts.clone(),
        pets,
        plans,
        config,
    ));

    Harness {
        service,
        store,
        zones,
        alerts,
        user_id,
        pet_id,
    }
}

#[tokio::test]
async fn test_submit_persists_log_with_sequence() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let log = h
        .service
        .submit(h.user_id, h.ping(-17.7833, -63.1821))
        .await
        .unwrap();

    assert_eq!(log.pet_id, h.pet_id);
    assert_eq!(log.sequence, 1);
    assert_eq!(log.battery, Some(80));
    assert_eq!(h.store.row_count(), 1);

    let next = h
        .service
        .submit(h.user_id, h.ping(-17.7834, -63.1821))
        .await
        .unwrap();
    assert_eq!(next.sequence, 2);
    assert!(next.recorded_at >= log.recorded_at);
}

#[tokio::test]
async fn test_backdated_client_timestamp_is_clamped() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let first = h
        .service
        .submit(h.user_id, h.ping(-17.7833, -63.1821))
        .await
        .unwrap();

    let mut backdated = h.ping(-17.7834, -63.1821);
    backdated.timestamp = Some((first.recorded_at.timestamp_millis()) - 60_000);
    let second = h.service.submit(h.user_id, backdated).await.unwrap();

    assert!(second.recorded_at >= first.recorded_at);
    assert!(second.sequence > first.sequence);
}

#[tokio::test]
async fn test_strict_ordering_rejects_backdated_timestamp() {
    let config = IngestConfig {
        strict_ordering: true,
        ..IngestConfig::default()
    };
    let h = setup(PlanTier::Premium, Vec::new(), config);

    let first = h
        .service
        .submit(h.user_id, h.ping(-17.7833, -63.1821))
        .await
        .unwrap();

    let mut backdated = h.ping(-17.7834, -63.1821);
    backdated.timestamp = Some(first.recorded_at.timestamp_millis() - 60_000);
    let result = h.service.submit(h.user_id, backdated).await;

    assert!(matches!(result, Err(IngestError::OutOfOrder(_))));
    assert_eq!(h.store.row_count(), 1);
}

#[tokio::test]
async fn test_free_tier_rejected_without_side_effects() {
    let h = setup(PlanTier::Free, Vec::new(), IngestConfig::default());

    let result = h.service.submit(h.user_id, h.ping(-17.7833, -63.1821)).await;

    assert!(matches!(
        result,
        Err(IngestError::AccessDenied(AccessDeniedReason::PlanRequired))
    ));
    assert_eq!(h.store.row_count(), 0);
    assert_eq!(h.alerts.alerts.lock().unwrap().len(), 0);
}

#[tokio::test]
async fn test_non_owner_rejected() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let result = h
        .service
        .submit(Uuid::new_v4(), h.ping(-17.7833, -63.1821))
        .await;

    assert!(matches!(
        result,
        Err(IngestError::AccessDenied(AccessDeniedReason::NotOwner))
    ));
    assert_eq!(h.store.row_count(), 0);
}

#[tokio::test]
async fn test_unknown_pet_not_found() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let mut request = h.ping(-17.7833, -63.1821);
    request.pet_id = Uuid::new_v4();
    let result = h.service.submit(h.user_id, request).await;

    assert!(matches!(result, Err(IngestError::NotFound(_))));
}

#[tokio::test]
async fn test_out_of_range_coordinates_rejected() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let result = h.service.submit(h.user_id, h.ping(95.0, -63.1821)).await;

    assert!(matches!(result, Err(IngestError::Validation(_))));
    assert_eq!(h.store.row_count(), 0);
}

#[tokio::test]
async fn test_zone_exit_requires_two_confirming_pings() {
    let center = GeoPoint::new(-17.7833, -63.1821);
    let pet_id = Uuid::new_v4();
    let h = setup(
        PlanTier::Premium,
        vec![circle_zone(pet_id, center, 200.0)],
        IngestConfig::default(),
    );

    // First ping inside the zone establishes membership without alerting.
    h.service
        .submit(h.user_id, h.ping(center.latitude, center.longitude))
        .await
        .unwrap();
    assert_eq!(h.alerts.count_kind(AlertKind::ZoneExit), 0);

    // One ping outside is not yet a confirmed exit.
    let outside_lat = center.latitude + 500.0 * DEG_PER_METER;
    h.service
        .submit(h.user_id, h.ping(outside_lat, center.longitude))
        .await
        .unwrap();
    assert_eq!(h.alerts.count_kind(AlertKind::ZoneExit), 0);

    // The second confirms it and produces exactly one alert.
    h.service
        .submit(h.user_id, h.ping(outside_lat, center.longitude))
        .await
        .unwrap();
    assert_eq!(h.alerts.count_kind(AlertKind::ZoneExit), 1);
}

#[tokio::test]
async fn test_single_gps_excursion_produces_no_alert() {
    let center = GeoPoint::new(-17.7833, -63.1821);
    let pet_id = Uuid::new_v4();
    let h = setup(
        PlanTier::Premium,
        vec![circle_zone(pet_id, center, 200.0)],
        IngestConfig::default(),
    );

    let outside_lat = center.latitude + 500.0 * DEG_PER_METER;
    h.service
        .submit(h.user_id, h.ping(center.latitude, center.longitude))
        .await
        .unwrap();
    h.service
        .submit(h.user_id, h.ping(outside_lat, center.longitude))
        .await
        .unwrap();
    // Back inside: the pending exit is discarded.
    h.service
        .submit(h.user_id, h.ping(center.latitude, center.longitude))
        .await
        .unwrap();
    h.service
        .submit(h.user_id, h.ping(center.latitude, center.longitude))
        .await
        .unwrap();

    assert!(h.alerts.alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_exit_within_cooldown_deduplicated() {
    let center = GeoPoint::new(-17.7833, -63.1821);
    let pet_id = Uuid::new_v4();
    let h = setup(
        PlanTier::Premium,
        vec![circle_zone(pet_id, center, 200.0)],
        IngestConfig::default(),
    );

    let outside_lat = center.latitude + 500.0 * DEG_PER_METER;
    let inside = h.ping(center.latitude, center.longitude);
    let outside = h.ping(outside_lat, center.longitude);

    // Establish inside, confirm an exit, come back in, exit again at once.
    h.service.submit(h.user_id, inside.clone()).await.unwrap();
    for _ in 0..2 {
        h.service.submit(h.user_id, outside.clone()).await.unwrap();
    }
    for _ in 0..2 {
        h.service.submit(h.user_id, inside.clone()).await.unwrap();
    }
    for _ in 0..2 {
        h.service.submit(h.user_id, outside.clone()).await.unwrap();
    }

    // The second exit falls inside the five minute cooldown.
    assert_eq!(h.alerts.count_kind(AlertKind::ZoneExit), 1);
    assert_eq!(h.alerts.count_kind(AlertKind::ZoneEnter), 1);
}

#[tokio::test]
async fn test_low_battery_alert_once_per_cooldown() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let mut low = h.ping(-17.7833, -63.1821);
    low.battery = Some(10);
    h.service.submit(h.user_id, low.clone()).await.unwrap();
    h.service.submit(h.user_id, low).await.unwrap();

    assert_eq!(h.alerts.count_kind(AlertKind::LowBattery), 1);
}

#[tokio::test]
async fn test_zone_lookup_failure_does_not_fail_ingestion() {
    let center = GeoPoint::new(-17.7833, -63.1821);
    let pet_id = Uuid::new_v4();
    let h = setup(
        PlanTier::Premium,
        vec![circle_zone(pet_id, center, 200.0)],
        IngestConfig::default(),
    );

    h.zones.fail.store(true, Ordering::SeqCst);
    let log = h
        .service
        .submit(h.user_id, h.ping(center.latitude, center.longitude))
        .await
        .unwrap();

    assert_eq!(log.sequence, 1);
    assert!(h.alerts.alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_append_does_not_consume_sequence() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    h.service
        .submit(h.user_id, h.ping(-17.7833, -63.1821))
        .await
        .unwrap();

    h.store.set_failing(true);
    let result = h.service.submit(h.user_id, h.ping(-17.7834, -63.1821)).await;
    assert!(matches!(result, Err(IngestError::StorageUnavailable(_))));

    h.store.set_failing(false);
    let retried = h
        .service
        .submit(h.user_id, h.ping(-17.7834, -63.1821))
        .await
        .unwrap();
    assert_eq!(retried.sequence, 2);
}

#[tokio::test]
async fn test_duplicate_sequence_append_returns_original_row() {
    let store = MemoryLocationStore::new();
    let pet_id = Uuid::new_v4();
    let input = LocationLogInput {
        pet_id,
        latitude: -17.7833,
        longitude: -63.1821,
        accuracy: Some(5.0),
        battery: Some(80),
        recorded_at: Utc::now(),
        sequence: 1,
    };

    let first = store.append(&input).await.unwrap();

    // A delivery retry replays the same (pet_id, sequence) with drifted
    // coordinates; the stored row must win.
    let replay = LocationLogInput {
        latitude: -17.9000,
        longitude: -63.0000,
        ..input
    };
    let second = store.append(&replay).await.unwrap();

    assert_eq!(store.row_count(), 1);
    assert_eq!(second.id, first.id);
    assert_eq!(second.latitude, first.latitude);
    assert_eq!(second.longitude, first.longitude);
    assert_eq!(store.latest(pet_id).await.unwrap().unwrap().id, first.id);
}

#[tokio::test]
async fn test_get_latest_reads_through_to_store() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let submitted = h
        .service
        .submit(h.user_id, h.ping(-17.7833, -63.1821))
        .await
        .unwrap();

    let latest = h.service.get_latest(h.user_id, h.pet_id).await.unwrap();
    assert_eq!(latest.sequence, submitted.sequence);

    // A fresh service over the same store starts with a cold cache.
    let fresh = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());
    let missing = fresh.service.get_latest(fresh.user_id, fresh.pet_id).await;
    assert!(matches!(missing, Err(IngestError::NotFound(_))));
}

#[tokio::test]
async fn test_history_pages_cover_all_logs_without_overlap() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    for i in 0..5 {
        h.service
            .submit(h.user_id, h.ping(-17.7833 + i as f64 * 0.0001, -63.1821))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let query = GetHistoryQuery {
            cursor: cursor.clone(),
            limit: Some(2),
            from: None,
            to: None,
        };
        let page = h.service.get_history(h.user_id, h.pet_id, &query).await.unwrap();
        seen.extend(page.logs.iter().map(|l| l.sequence));
        if !page.has_more {
            assert!(page.next_cursor.is_none());
            break;
        }
        cursor = page.next_cursor;
        assert!(cursor.is_some());
    }

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_history_range_filters_inclusive() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let mut logs = Vec::new();
    for _ in 0..3 {
        logs.push(
            h.service
                .submit(h.user_id, h.ping(-17.7833, -63.1821))
                .await
                .unwrap(),
        );
    }

    let query = GetHistoryQuery {
        cursor: None,
        limit: None,
        from: Some(logs[1].recorded_at.timestamp_millis()),
        to: Some(logs[2].recorded_at.timestamp_millis()),
    };
    let page = h.service.get_history(h.user_id, h.pet_id, &query).await.unwrap();

    assert!(page.logs.iter().all(|l| l.sequence >= logs[1].sequence));
}

#[tokio::test]
async fn test_invalid_cursor_rejected() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let query = GetHistoryQuery {
        cursor: Some("not-a-cursor".to_string()),
        limit: None,
        from: None,
        to: None,
    };
    let result = h.service.get_history(h.user_id, h.pet_id, &query).await;

    assert!(matches!(result, Err(IngestError::Validation(_))));
}

#[tokio::test]
async fn test_list_alerts_newest_first() {
    let center = GeoPoint::new(-17.7833, -63.1821);
    let pet_id = Uuid::new_v4();
    let h = setup(
        PlanTier::Premium,
        vec![circle_zone(pet_id, center, 200.0)],
        IngestConfig::default(),
    );

    let outside_lat = center.latitude + 500.0 * DEG_PER_METER;
    h.service
        .submit(h.user_id, h.ping(center.latitude, center.longitude))
        .await
        .unwrap();
    for _ in 0..2 {
        h.service
            .submit(h.user_id, h.ping(outside_lat, center.longitude))
            .await
            .unwrap();
    }
    let mut low = h.ping(outside_lat, center.longitude);
    low.battery = Some(5);
    h.service.submit(h.user_id, low).await.unwrap();

    let query = ListAlertsQuery {
        since: None,
        limit: None,
    };
    let alerts = h.service.list_alerts(h.user_id, h.pet_id, &query).await.unwrap();

    assert_eq!(alerts.len(), 2);
    assert!(alerts[0].created_at >= alerts[1].created_at);
    assert_eq!(alerts[1].kind, AlertKind::ZoneExit);
}

#[tokio::test]
async fn test_concurrent_submissions_for_one_pet_are_serialized() {
    let h = setup(PlanTier::Premium, Vec::new(), IngestConfig::default());

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = h.service.clone();
        let user_id = h.user_id;
        let request = h.ping(-17.7833, -63.1821);
        handles.push(tokio::spawn(async move {
            service.submit(user_id, request).await.unwrap()
        }));
    }

    let mut sequences: Vec<i64> = Vec::new();
    for handle in handles {
        sequences.push(handle.await.unwrap().sequence);
    }
    sequences.sort_unstable();

    assert_eq!(sequences, (1..=20).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_tracked_pet_in_premium_household_full_scenario() {
    // A premium owner tracks Luna with a 200 m safe zone around home.
    let center = GeoPoint::new(-17.7833, -63.1821);
    let pet_id = Uuid::new_v4();
    let h = setup(
        PlanTier::Premium,
        vec![circle_zone(pet_id, center, 200.0)],
        IngestConfig::default(),
    );

    // A ping at the center records but does not alert.
    let log = h
        .service
        .submit(h.user_id, h.ping(center.latitude, center.longitude))
        .await
        .unwrap();
    assert_eq!(log.sequence, 1);
    assert!(h.alerts.alerts.lock().unwrap().is_empty());

    // Two pings 500 m away confirm the exit; exactly one alert fires.
    let away_lat = center.latitude + 500.0 * DEG_PER_METER;
    for _ in 0..2 {
        h.service
            .submit(h.user_id, h.ping(away_lat, center.longitude))
            .await
            .unwrap();
    }
    assert_eq!(h.alerts.count_kind(AlertKind::ZoneExit), 1);

    // A ping with a 10 percent battery adds a low battery alert.
    let mut low = h.ping(away_lat, center.longitude);
    low.battery = Some(10);
    h.service.submit(h.user_id, low).await.unwrap();
    assert_eq!(h.alerts.count_kind(AlertKind::LowBattery), 1);

    // The owner's alert feed shows both.
    let alerts = h
        .service
        .list_alerts(
            h.user_id,
            h.pet_id,
            &ListAlertsQuery {
                since: None,
                limit: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(alerts.len(), 2);
}
