use chrono::{SecondsFormat, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use url::Url;

use crate::config::GatewayConfig;
use crate::types::{
    Booking, CreateBookingRequest, LedgerEntry, PaymentStatus, UpdatePaymentStatusRequest,
};

#[derive(Debug)]
pub enum StoreError {
    Db(sqlx::Error),
    Validation(String),
    NotFound(String),
    Parse(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err)
    }
}

const BOOKING_COLUMNS: &str = "\
    booking_id, name, email, phone, program, accommodation, occupancy, amount, \
    payment_status, transaction_id, payment_link, payment_date, created_at, \
    check_in_date, check_out_date, special_requirements, emergency_contact";

/// Validate, persist, and return a new pending booking with its payment link.
pub async fn create_booking(
    pool: &SqlitePool,
    gateway: &GatewayConfig,
    req: &CreateBookingRequest,
) -> Result<Booking, StoreError> {
    let name = required(&req.name, "name")?;
    let email = required(&req.email, "email")?;
    let phone = required(&req.phone, "phone")?;
    let program = required(&req.program, "program")?;
    let accommodation = required(&req.accommodation, "accommodation")?;
    let occupancy = required(&req.occupancy, "occupancy")?;
    let amount = match req.amount {
        Some(amount) if amount > 0.0 => amount,
        _ => return Err(StoreError::Validation("Field amount is required".to_string())),
    };

    let booking_id = generate_booking_id();
    let payment_link = build_payment_link(gateway, amount, &booking_id, name, email)?;
    let created_at = format_utc(Utc::now());

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
            payment_link,
            created_at,
            check_in_date,
            check_out_date,
            special_requirements,
            emergency_contact
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&booking_id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(program)
    .bind(accommodation)
    .bind(occupancy)
    .bind(amount)
    .bind(&payment_link)
    .bind(&created_at)
    .bind(req.check_in_date.as_deref())
    .bind(req.check_out_date.as_deref())
    .bind(req.special_requirements.as_deref())
    .bind(req.emergency_contact.as_deref())
    .execute(pool)
    .await?;

    Ok(Booking {
        booking_id,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        program: program.to_string(),
        accommodation: accommodation.to_string(),
        occupancy: occupancy.to_string(),
        amount,
        payment_status: PaymentStatus::Pending,
        transaction_id: None,
        payment_link: Some(payment_link),
        payment_date: None,
        created_at,
        check_in_date: req.check_in_date.clone(),
        check_out_date: req.check_out_date.clone(),
        special_requirements: req.special_requirements.clone(),
        emergency_contact: req.emergency_contact.clone(),
    })
}

/// Manual status update (admin flow). Returns the updated booking and
/// whether the status actually changed.
pub async fn update_payment_status(
    pool: &SqlitePool,
    req: &UpdatePaymentStatusRequest,
) -> Result<(Booking, bool), StoreError> {
    let booking_id = req.booking_id.trim();
    if booking_id.is_empty() {
        return Err(StoreError::Validation(
            "Booking ID and status are required".to_string(),
        ));
    }
    let status = PaymentStatus::parse(req.status.trim()).ok_or_else(|| {
        StoreError::Validation("status must be one of pending, success, failed".to_string())
    })?;

    let now = format_utc(Utc::now());
    let mut tx = pool.begin().await?;

    let row = fetch_booking(&mut tx, booking_id)
        .await?
        .ok_or_else(|| StoreError::NotFound("booking not found".to_string()))?;

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
    .bind(req.transaction_id.as_deref())
    .bind(&now)
    .bind(booking_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let mut booking = row.into_booking().map_err(StoreError::Parse)?;
    let transitioned = booking.payment_status != status;
    booking.payment_status = status;
    booking.transaction_id = req.transaction_id.clone();
    booking.payment_date = Some(now);

    Ok((booking, transitioned))
}

/// List bookings newest-first, optionally filtered by payment status.
pub async fn list_bookings(
    pool: &SqlitePool,
    filter: Option<PaymentStatus>,
) -> Result<Vec<Booking>, StoreError> {
    let rows: Vec<BookingRow> = match filter {
        Some(status) => {
            sqlx::query_as(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings \
                 WHERE payment_status = ? ORDER BY created_at DESC"
            ))
            .bind(status.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };

    rows.into_iter()
        .map(|row| row.into_booking().map_err(StoreError::Parse))
        .collect()
}

/// Audit trail for one booking: every reconciled delivery in arrival order.
pub async fn list_transactions(
    pool: &SqlitePool,
    booking_id: &str,
) -> Result<Vec<LedgerEntry>, StoreError> {
    let rows: Vec<LedgerRow> = sqlx::query_as(
        r#"
        SELECT id, booking_id, transaction_id, payment_method, amount, status,
               gateway_response, created_at
        FROM payment_transactions
        WHERE booking_id = ?
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(LedgerRow::try_into).collect()
}

pub(crate) async fn fetch_booking(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    booking_id: &str,
) -> Result<Option<BookingRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_id = ?"
    ))
    .bind(booking_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Fixed prefix, calendar date, random 4-digit suffix. Collisions are
/// possible; the PK constraint surfaces them as a persistence error.
pub fn generate_booking_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
    format!("YR{}{}", Utc::now().format("%Y%m%d"), suffix)
}

pub fn build_payment_link(
    gateway: &GatewayConfig,
    amount: f64,
    booking_id: &str,
    name: &str,
    email: &str,
) -> Result<String, StoreError> {
    let mut url = Url::parse(&gateway.link_base_url)
        .map_err(|err| StoreError::Parse(format!("invalid payment link base URL: {err}")))?;
    url.query_pairs_mut()
        .append_pair("amount", &format_amount(amount))
        .append_pair("order_id", booking_id)
        .append_pair("customer_name", name)
        .append_pair("customer_email", email)
        .append_pair("return_url", &gateway.return_url)
        .append_pair("notify_url", &gateway.notify_url);
    Ok(url.into())
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        amount.to_string()
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, StoreError> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(StoreError::Validation(format!("Field {field} is required"))),
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookingRow {
    booking_id: String,
    name: String,
    email: String,
    phone: String,
    program: String,
    accommodation: String,
    occupancy: String,
    amount: f64,
    payment_status: String,
    transaction_id: Option<String>,
    payment_link: Option<String>,
    payment_date: Option<String>,
    created_at: String,
    check_in_date: Option<String>,
    check_out_date: Option<String>,
    special_requirements: Option<String>,
    emergency_contact: Option<String>,
}

impl BookingRow {
    pub(crate) fn into_booking(self) -> Result<Booking, String> {
        let payment_status = PaymentStatus::parse(&self.payment_status)
            .ok_or_else(|| format!("unknown payment status: {}", self.payment_status))?;

        Ok(Booking {
            booking_id: self.booking_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            program: self.program,
            accommodation: self.accommodation,
            occupancy: self.occupancy,
            amount: self.amount,
            payment_status,
            transaction_id: self.transaction_id,
            payment_link: self.payment_link,
            payment_date: self.payment_date,
            created_at: self.created_at,
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
            special_requirements: self.special_requirements,
            emergency_contact: self.emergency_contact,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LedgerRow {
    id: i64,
    booking_id: String,
    transaction_id: Option<String>,
    payment_method: String,
    amount: f64,
    status: String,
    gateway_response: String,
    created_at: String,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = StoreError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let status = PaymentStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Parse(format!("unknown ledger status: {}", row.status)))?;

        Ok(LedgerEntry {
            id: row.id,
            booking_id: row.booking_id,
            transaction_id: row.transaction_id,
            payment_method: row.payment_method,
            amount: row.amount,
            status,
            gateway_response: row.gateway_response,
            created_at: row.created_at,
        })
    }
}

pub(crate) fn format_utc(dt: chrono::DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
