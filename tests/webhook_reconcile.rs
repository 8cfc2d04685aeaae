#![allow(clippy::expect_used, clippy::unwrap_used)]

use bookings::config::EngineConfig;
use bookings::types::PaymentStatus;
use bookings::webhook::{parse_notification, reconcile};
use sqlx::{
    Connection, SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::fs;
use tempfile::NamedTempFile;

struct TestDb {
    pool: SqlitePool,
    _db_file: NamedTempFile,
}

async fn setup_db() -> TestDb {
    let db_file = NamedTempFile::new().expect("create temp sqlite file");
    let options = SqliteConnectOptions::new()
        .filename(db_file.path())
        .create_if_missing(true)
        .busy_timeout(std::time::Duration::from_millis(500));

    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .expect("connect sqlite for migrations");
    run_migrations_on_conn(&mut conn)
        .await
        .expect("run migrations");
    conn.close().await.expect("close migration conn");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect sqlite file");

    TestDb {
        pool,
        _db_file: db_file,
    }
}

async fn run_migrations_on_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let mut entries: Vec<_> = fs::read_dir("migrations")
        .map_err(sqlx::Error::Io)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("sql"))
        .collect();

    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let contents = fs::read_to_string(entry.path()).map_err(sqlx::Error::Io)?;
        for statement in contents.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(&mut *conn).await?;
        }
    }

    Ok(())
}

async fn seed_booking(pool: &SqlitePool, booking_id: &str, status: &str) {
    sqlx::query(
        r#"
        INSERT INTO bookings (
            booking_id, name, email, phone, program, accommodation,
            occupancy, amount, payment_status, created_at
        )
        VALUES (?, 'Asha', 'asha@example.com', '9876543210', 'Weekend Retreat',
                'Cottage', 'double', 5000.0, ?, '2025-01-01T00:00:00Z')
        "#,
    )
    .bind(booking_id)
    .bind(status)
    .execute(pool)
    .await
    .expect("seed booking");
}

async fn ledger_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM payment_transactions")
        .fetch_one(pool)
        .await
        .expect("count ledger rows")
}

async fn booking_status(pool: &SqlitePool, booking_id: &str) -> (String, Option<String>) {
    sqlx::query_as(
        "SELECT payment_status, transaction_id FROM bookings WHERE booking_id = ?",
    )
    .bind(booking_id)
    .fetch_one(pool)
    .await
    .expect("fetch booking status")
}

fn engine(synthesize_missing: bool, ordering_guard: bool) -> EngineConfig {
    EngineConfig {
        synthesize_missing,
        ordering_guard,
    }
}

#[tokio::test]
async fn nested_paid_payload_updates_booking_and_appends_ledger() {
    let db = setup_db().await;
    seed_booking(&db.pool, "YR202501011234", "pending").await;

    let raw = br#"{
        "type": "PAYMENT_FORM_ORDER_WEBHOOK",
        "data": {
            "order": {
                "order_id": "YR202501011234",
                "order_status": "PAID",
                "order_amount": 5000,
                "transaction_id": "cf_901"
            }
        }
    }"#;
    let note = parse_notification(raw).expect("parse nested payload");
    let outcome = reconcile(
        &db.pool,
        &engine(false, false),
        &note,
        &String::from_utf8_lossy(raw),
    )
    .await
    .expect("reconcile");

    assert_eq!(outcome.status, PaymentStatus::Success);
    assert!(outcome.transitioned);

    let (status, transaction_id) = booking_status(&db.pool, "YR202501011234").await;
    assert_eq!(status, "success");
    assert_eq!(transaction_id.as_deref(), Some("cf_901"));

    assert_eq!(ledger_count(&db.pool).await, 1);
    let (ledger_status, response): (String, String) = sqlx::query_as(
        "SELECT status, gateway_response FROM payment_transactions WHERE booking_id = ?",
    )
    .bind("YR202501011234")
    .fetch_one(&db.pool)
    .await
    .expect("fetch ledger row");
    assert_eq!(ledger_status, "success");
    assert!(response.contains("PAYMENT_FORM_ORDER_WEBHOOK"));
}

#[tokio::test]
async fn flat_failed_payload_transitions_booking() {
    let db = setup_db().await;
    seed_booking(&db.pool, "YR202501011234", "pending").await;

    let raw = br#"{"order_id":"YR202501011234","payment_status":"failed","amount":5000}"#;
    let note = parse_notification(raw).expect("parse flat payload");
    let outcome = reconcile(
        &db.pool,
        &engine(false, false),
        &note,
        &String::from_utf8_lossy(raw),
    )
    .await
    .expect("reconcile");

    assert_eq!(outcome.status, PaymentStatus::Failed);
    assert!(outcome.transitioned);
    assert_eq!(outcome.amount, 5000.0);

    let (status, _) = booking_status(&db.pool, "YR202501011234").await;
    assert_eq!(status, "failed");
}

#[tokio::test]
async fn replay_appends_ledger_but_booking_reflects_last_delivery() {
    let db = setup_db().await;
    seed_booking(&db.pool, "YR1", "pending").await;

    let paid = br#"{"order_id":"YR1","payment_status":"paid","amount":100}"#;
    let failed = br#"{"order_id":"YR1","payment_status":"failed","amount":100}"#;
    let config = engine(false, false);

    for raw in [&paid[..], &failed[..]] {
        let note = parse_notification(raw).expect("parse");
        reconcile(&db.pool, &config, &note, &String::from_utf8_lossy(raw))
            .await
            .expect("reconcile");
    }

    // Last write wins without the ordering guard; both deliveries audited.
    let (status, _) = booking_status(&db.pool, "YR1").await;
    assert_eq!(status, "failed");
    assert_eq!(ledger_count(&db.pool).await, 2);
}

#[tokio::test]
async fn repeated_identical_delivery_is_not_a_transition() {
    let db = setup_db().await;
    seed_booking(&db.pool, "YR1", "pending").await;

    let raw = br#"{"order_id":"YR1","payment_status":"paid","amount":100}"#;
    let note = parse_notification(raw).expect("parse");
    let config = engine(false, false);

    let first = reconcile(&db.pool, &config, &note, &String::from_utf8_lossy(raw))
        .await
        .expect("first");
    let second = reconcile(&db.pool, &config, &note, &String::from_utf8_lossy(raw))
        .await
        .expect("second");

    assert!(first.transitioned);
    assert!(!second.transitioned);
    assert_eq!(ledger_count(&db.pool).await, 2);
}

#[tokio::test]
async fn ordering_guard_refuses_to_overwrite_settled_status() {
    let db = setup_db().await;
    seed_booking(&db.pool, "YR1", "success").await;

    let raw = br#"{"order_id":"YR1","payment_status":"failed","amount":100}"#;
    let note = parse_notification(raw).expect("parse");
    let outcome = reconcile(&db.pool, &engine(false, true), &note, &String::from_utf8_lossy(raw))
        .await
        .expect("reconcile");

    assert!(!outcome.transitioned);
    let (status, _) = booking_status(&db.pool, "YR1").await;
    assert_eq!(status, "success");
    // The delivery is still audited even though the booking was untouched.
    assert_eq!(ledger_count(&db.pool).await, 1);
}

#[tokio::test]
async fn unknown_booking_still_appends_ledger_when_fallback_disabled() {
    let db = setup_db().await;

    let raw = br#"{"order_id":"YR404","payment_status":"paid","amount":100}"#;
    let note = parse_notification(raw).expect("parse");
    let outcome = reconcile(&db.pool, &engine(false, false), &note, &String::from_utf8_lossy(raw))
        .await
        .expect("reconcile");

    assert!(outcome.booking.is_none());
    assert!(!outcome.transitioned);

    let bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&db.pool)
        .await
        .expect("count bookings");
    assert_eq!(bookings, 0);
    assert_eq!(ledger_count(&db.pool).await, 1);
}

#[tokio::test]
async fn sandbox_fallback_synthesizes_placeholder_booking() {
    let db = setup_db().await;

    let raw = br#"{
        "type": "PAYMENT_FORM_ORDER_WEBHOOK",
        "data": {
            "order": {
                "order_id": "YR404",
                "order_status": "PAID",
                "order_amount": 750,
                "transaction_id": "cf_1",
                "customer_details": {
                    "customer_name": "Ravi",
                    "customer_email": "ravi@example.com",
                    "customer_phone": "8888888888"
                }
            }
        }
    }"#;
    let note = parse_notification(raw).expect("parse");
    let outcome = reconcile(&db.pool, &engine(true, false), &note, &String::from_utf8_lossy(raw))
        .await
        .expect("reconcile");

    assert!(outcome.transitioned);
    let booking = outcome.booking.expect("synthesized booking");
    assert_eq!(booking.name, "Ravi");
    assert_eq!(booking.email, "ravi@example.com");

    let (name, program): (String, String) =
        sqlx::query_as("SELECT name, program FROM bookings WHERE booking_id = ?")
            .bind("YR404")
            .fetch_one(&db.pool)
            .await
            .expect("fetch synthesized booking");
    assert_eq!(name, "Ravi");
    assert_eq!(program, "Test Program");
}

#[tokio::test]
async fn sandbox_fallback_defaults_without_customer_details() {
    let db = setup_db().await;

    let raw = br#"{"order_id":"YR404","payment_status":"paid","amount":100}"#;
    let note = parse_notification(raw).expect("parse");
    reconcile(&db.pool, &engine(true, false), &note, &String::from_utf8_lossy(raw))
        .await
        .expect("reconcile");

    let (name, email): (String, String) =
        sqlx::query_as("SELECT name, email FROM bookings WHERE booking_id = ?")
            .bind("YR404")
            .fetch_one(&db.pool)
            .await
            .expect("fetch synthesized booking");
    assert_eq!(name, "Test User");
    assert_eq!(email, "test@example.com");
}
