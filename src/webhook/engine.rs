use chrono::Utc;
use sqlx::SqlitePool;

use crate::booking::store::{fetch_booking, format_utc};
use crate::config::EngineConfig;
use crate::types::{Booking, PaymentStatus};
use crate::webhook::payload::PaymentNotification;
use crate::webhook::status::map_raw_status;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Parse(String),
}

/// What one delivery did to persisted state, reported after commit so the
/// caller can drive notifications without holding the transaction open.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub order_id: String,
    pub status: PaymentStatus,
    pub amount: f64,
    /// Booking as committed, when one was found or synthesized.
    pub booking: Option<Booking>,
    /// True when the booking's payment status actually changed; the only
    /// case that may dispatch notifications.
    pub transitioned: bool,
}

/// Apply one payment notification: booking upsert and ledger append commit
/// as a single atomic unit, or not at all. The ledger row is written for
/// every delivery, whether or not the booking exists.
pub async fn reconcile(
    pool: &SqlitePool,
    config: &EngineConfig,
    note: &PaymentNotification,
    raw_payload: &str,
) -> Result<Reconciliation, EngineError> {
    let status = map_raw_status(&note.raw_status);
    let now = format_utc(Utc::now());

    let mut tx = pool.begin().await?;

    let existing = fetch_booking(&mut tx, &note.order_id).await?;

    let mut booking = None;
    let mut transitioned = false;

    match existing {
        Some(row) => {
            let current = row.into_booking().map_err(EngineError::Parse)?;
            let previous = current.payment_status;

            if config.ordering_guard && previous.is_terminal() && previous != status {
                tracing::warn!(
                    order_id = %note.order_id,
                    previous = previous.as_str(),
                    incoming = status.as_str(),
                    "ordering guard: refusing to overwrite settled status"
                );
                booking = Some(current);
            } else {
                sqlx::query(
                    r#"
                    UPDATE bookings
                    SET payment_status = ?,
                        transaction_id = ?,
                        payment_date = ?
                    WHERE booking_id = ?
                    "#,
                )
                .bind(status.as_str())
                .bind(&note.transaction_id)
                .bind(&now)
                .bind(&note.order_id)
                .execute(&mut *tx)
                .await?;

                transitioned = previous != status;
                let mut updated = current;
                updated.payment_status = status;
                updated.transaction_id = Some(note.transaction_id.clone());
                updated.payment_date = Some(now.clone());
                booking = Some(updated);
            }
        }
        None if config.synthesize_missing => {
            let synthesized = synthesize_booking(note, status, &now);
            sqlx::query(
                r#"
                INSERT INTO bookings (
                    booking_id,
                    name,
                    email,
                    phone,
                    program,
                    accommodation,
                    occupancy,
                    amount,
                    payment_status,
                    transaction_id,
                    payment_date,
                    created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&synthesized.booking_id)
            .bind(&synthesized.name)
            .bind(&synthesized.email)
            .bind(&synthesized.phone)
            .bind(&synthesized.program)
            .bind(&synthesized.accommodation)
            .bind(&synthesized.occupancy)
            .bind(synthesized.amount)
            .bind(status.as_str())
            .bind(&note.transaction_id)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

            tracing::info!(
                order_id = %note.order_id,
                customer = %synthesized.name,
                "synthesized placeholder booking for sandbox delivery"
            );
            transitioned = status.is_terminal();
            booking = Some(synthesized);
        }
        None => {
            tracing::warn!(
                order_id = %note.order_id,
                "delivery references unknown booking; ledger row appended anyway"
            );
        }
    }

    sqlx::query(
        r#"
        INSERT INTO payment_transactions (
            booking_id,
            transaction_id,
            payment_method,
            amount,
            status,
            gateway_response,
            created_at
        )
        VALUES (?, ?, 'online', ?, ?, ?, ?)
        "#,
    )
    .bind(&note.order_id)
    .bind(&note.transaction_id)
    .bind(note.amount)
    .bind(status.as_str())
    .bind(raw_payload)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        order_id = %note.order_id,
        mapped_status = status.as_str(),
        amount = note.amount,
        transitioned,
        "webhook delivery reconciled"
    );

    Ok(Reconciliation {
        order_id: note.order_id.clone(),
        status,
        amount: note.amount,
        booking,
        transitioned,
    })
}

// Placeholder values match the gateway-sandbox fallback: real customer
// details from the payload win when present.
fn synthesize_booking(note: &PaymentNotification, status: PaymentStatus, now: &str) -> Booking {
    let customer = note.customer.as_ref();

    Booking {
        booking_id: note.order_id.clone(),
        name: customer
            .and_then(|c| c.name.clone())
            .unwrap_or_else(|| "Test User".to_string()),
        email: customer
            .and_then(|c| c.email.clone())
            .unwrap_or_else(|| "test@example.com".to_string()),
        phone: customer
            .and_then(|c| c.phone.clone())
            .unwrap_or_else(|| "9999999999".to_string()),
        program: "Test Program".to_string(),
        accommodation: "Test Accommodation".to_string(),
        occupancy: "single".to_string(),
        amount: note.amount,
        payment_status: status,
        transaction_id: Some(note.transaction_id.clone()),
        payment_link: None,
        payment_date: Some(now.to_string()),
        created_at: now.to_string(),
        check_in_date: None,
        check_out_date: None,
        special_requirements: None,
        emergency_contact: None,
    }
}
