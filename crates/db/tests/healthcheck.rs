//! Integration tests for the health check repository.
//!
//! - Name uniqueness under concurrent creates
//! - Update semantics (self-rename, conflicting rename, type change)
//! - Delete and NotFound behaviour
//! - Prober sharding

use assert_matches::assert_matches;
use sqlx::PgPool;
use vigil_core::error::CoreError;
use vigil_core::healthcheck::{
    DnsDefinition, Healthcheck, HealthcheckDefinition, HealthcheckSpec, TcpDefinition,
};
use vigil_core::types::Labels;
use vigil_db::repositories::HealthcheckRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dns_spec(name: &str) -> HealthcheckSpec {
    HealthcheckSpec {
        name: name.to_string(),
        description: Some("resolve the public domain".to_string()),
        labels: Some(Labels::from([("env".to_string(), "prod".to_string())])),
        interval: "100s".to_string(),
        timeout: "3s".to_string(),
        enabled: true,
        definition: HealthcheckDefinition::Dns(DnsDefinition {
            domain: "example.com".to_string(),
            expected_ips: None,
        }),
    }
}

fn tcp_definition() -> HealthcheckDefinition {
    HealthcheckDefinition::Tcp(TcpDefinition {
        target: "10.0.0.1".to_string(),
        port: 5432,
        should_fail: false,
    })
}

// ---------------------------------------------------------------------------
// Create / get
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_get(pool: PgPool) {
    let check = Healthcheck::new(dns_spec("dns1"));
    HealthcheckRepo::create(&pool, &check).await.unwrap();

    let by_id = HealthcheckRepo::get(&pool, check.id).await.unwrap();
    assert_eq!(by_id.name, "dns1");
    assert_eq!(by_id.random_id, check.random_id);
    assert_eq!(by_id.definition, check.definition);
    assert_eq!(by_id.labels, check.labels);

    let by_name = HealthcheckRepo::get_by_name(&pool, "dns1").await.unwrap();
    assert_eq!(by_name.id, check.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_absent_labels_round_trip_as_none(pool: PgPool) {
    let mut spec = dns_spec("no-labels");
    spec.labels = None;
    let check = Healthcheck::new(spec);
    HealthcheckRepo::create(&pool, &check).await.unwrap();

    let stored = HealthcheckRepo::get(&pool, check.id).await.unwrap();
    assert_eq!(stored.labels, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_name_conflicts(pool: PgPool) {
    HealthcheckRepo::create(&pool, &Healthcheck::new(dns_spec("dns1")))
        .await
        .unwrap();

    let err = HealthcheckRepo::create(&pool, &Healthcheck::new(dns_spec("dns1")))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(ref msg) if msg.contains("already exists"));
    assert_eq!(HealthcheckRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_creates_yield_one_winner(pool: PgPool) {
    let first = Healthcheck::new(dns_spec("race"));
    let second = Healthcheck::new(dns_spec("race"));

    let (a, b) = tokio::join!(
        HealthcheckRepo::create(&pool, &first),
        HealthcheckRepo::create(&pool, &second),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(CoreError::Conflict(_))))
            .count(),
        1
    );
    assert_eq!(HealthcheckRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_missing_is_not_found(pool: PgPool) {
    let err = HealthcheckRepo::get(&pool, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "healthcheck", .. });

    let err = HealthcheckRepo::get_by_name(&pool, "ghost").await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_keeping_own_name(pool: PgPool) {
    let check = Healthcheck::new(dns_spec("dns1"));
    HealthcheckRepo::create(&pool, &check).await.unwrap();

    let mut spec = dns_spec("dns1");
    spec.interval = "2m".to_string();
    spec.enabled = false;
    let updated = check.clone().with_spec(spec);
    HealthcheckRepo::update(&pool, &updated).await.unwrap();

    let stored = HealthcheckRepo::get(&pool, check.id).await.unwrap();
    assert_eq!(stored.interval, "2m");
    assert!(!stored.enabled);
    assert_eq!(stored.random_id, check.random_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rename_onto_taken_name_conflicts(pool: PgPool) {
    let first = Healthcheck::new(dns_spec("dns1"));
    let second = Healthcheck::new(dns_spec("dns2"));
    HealthcheckRepo::create(&pool, &first).await.unwrap();
    HealthcheckRepo::create(&pool, &second).await.unwrap();

    let renamed = second.clone().with_spec(dns_spec("dns1"));
    let err = HealthcheckRepo::update(&pool, &renamed).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    let stored = HealthcheckRepo::get(&pool, second.id).await.unwrap();
    assert_eq!(stored.name, "dns2");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_type_change_is_rejected(pool: PgPool) {
    let check = Healthcheck::new(dns_spec("dns1"));
    HealthcheckRepo::create(&pool, &check).await.unwrap();

    let mut spec = dns_spec("dns1");
    spec.definition = tcp_definition();
    let err = HealthcheckRepo::update(&pool, &check.with_spec(spec))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::BadRequest(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_is_not_found(pool: PgPool) {
    let check = Healthcheck::new(dns_spec("never-created"));
    let err = HealthcheckRepo::update(&pool, &check).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}

// ---------------------------------------------------------------------------
// Delete / list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_twice(pool: PgPool) {
    let check = Healthcheck::new(dns_spec("dns1"));
    HealthcheckRepo::create(&pool, &check).await.unwrap();

    HealthcheckRepo::delete(&pool, check.id).await.unwrap();
    let err = HealthcheckRepo::delete(&pool, check.id).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_on_enabled(pool: PgPool) {
    let mut disabled = dns_spec("b-disabled");
    disabled.enabled = false;
    HealthcheckRepo::create(&pool, &Healthcheck::new(disabled))
        .await
        .unwrap();
    HealthcheckRepo::create(&pool, &Healthcheck::new(dns_spec("a-enabled")))
        .await
        .unwrap();

    let all = HealthcheckRepo::list(&pool, None).await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["a-enabled", "b-disabled"]);

    let enabled = HealthcheckRepo::list(&pool, Some(true)).await.unwrap();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].name, "a-enabled");

    let disabled = HealthcheckRepo::list(&pool, Some(false)).await.unwrap();
    assert_eq!(disabled.len(), 1);
    assert_eq!(disabled[0].name, "b-disabled");
}

// ---------------------------------------------------------------------------
// Sharding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_prober_slices_partition_enabled_checks(pool: PgPool) {
    for i in 0..12 {
        let mut spec = dns_spec(&format!("check-{i:02}"));
        spec.enabled = i % 4 != 0;
        HealthcheckRepo::create(&pool, &Healthcheck::new(spec))
            .await
            .unwrap();
    }
    let enabled = HealthcheckRepo::list(&pool, Some(true)).await.unwrap();

    let mut seen = Vec::new();
    for prober in 0..3 {
        let slice = HealthcheckRepo::list_for_prober(&pool, prober, 3)
            .await
            .unwrap();
        for check in &slice {
            assert!(check.enabled);
            assert_eq!(check.random_id % 3, prober as i32);
        }
        seen.extend(slice.into_iter().map(|c| c.id));
    }

    seen.sort();
    let mut expected: Vec<_> = enabled.iter().map(|c| c.id).collect();
    expected.sort();
    assert_eq!(seen, expected);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_prober_out_of_range(pool: PgPool) {
    let err = HealthcheckRepo::list_for_prober(&pool, 3, 3)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::BadRequest(_));
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_conflict_delete_scenario(pool: PgPool) {
    let first = Healthcheck::new(dns_spec("dns1"));
    HealthcheckRepo::create(&pool, &first).await.unwrap();

    let err = HealthcheckRepo::create(&pool, &Healthcheck::new(dns_spec("dns1")))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    HealthcheckRepo::delete(&pool, first.id).await.unwrap();
    let err = HealthcheckRepo::get(&pool, first.id).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}
