use chrono::Utc;
use sqlx::SqlitePool;

use crate::booking::store::format_utc;
use crate::config::MailConfig;
use crate::types::{Booking, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    BookingCreated,
    PaymentSuccess,
    PaymentFailure,
    OwnerNewBooking,
    OwnerPaymentUpdate,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::BookingCreated => "booking_created",
            NotificationKind::PaymentSuccess => "payment_success",
            NotificationKind::PaymentFailure => "payment_failure",
            NotificationKind::OwnerNewBooking => "owner_new_booking",
            NotificationKind::OwnerPaymentUpdate => "owner_payment_update",
        }
    }
}

/// One rendered transactional message, ready for the relay.
#[derive(Debug, Clone)]
pub struct Email {
    pub kind: NotificationKind,
    pub booking_id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
#[error("mail relay error: {0}")]
pub struct MailError(pub String);

/// Outbound mail channel. SMTP delivery is an external collaborator, so the
/// seam is a trait: production wires a relay, tests record sends.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Logs each send instead of speaking SMTP; stands in for the relay.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        tracing::info!(
            kind = email.kind.as_str(),
            booking_id = %email.booking_id,
            to = %email.to,
            subject = %email.subject,
            "notification sent"
        );
        Ok(())
    }
}

/// Best-effort dispatch: record an audit row, hand the message to the relay,
/// log and swallow every failure. Committed financial state must never
/// depend on mail delivery, so this returns nothing.
pub async fn dispatch(pool: &SqlitePool, mailer: &dyn Mailer, emails: Vec<Email>) {
    for email in emails {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (booking_id, type, recipient_email, subject, message, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&email.booking_id)
        .bind(email.kind.as_str())
        .bind(&email.to)
        .bind(&email.subject)
        .bind(&email.body)
        .bind(format_utc(Utc::now()))
        .execute(pool)
        .await;

        if let Err(err) = result {
            tracing::warn!(
                kind = email.kind.as_str(),
                booking_id = %email.booking_id,
                error = %err,
                "failed to record notification"
            );
        }

        if let Err(err) = mailer.send(&email) {
            tracing::warn!(
                kind = email.kind.as_str(),
                booking_id = %email.booking_id,
                to = %email.to,
                error = %err,
                "failed to send notification"
            );
        }
    }
}

/// Messages owed for a settled payment status: customer plus owner for
/// success and failure, nothing while pending.
pub fn for_transition(mail: &MailConfig, booking: &Booking, status: PaymentStatus) -> Vec<Email> {
    match status {
        PaymentStatus::Success => vec![
            payment_success(booking),
            owner_payment_update(mail, booking, status),
        ],
        PaymentStatus::Failed => vec![
            payment_failure(booking),
            owner_payment_update(mail, booking, status),
        ],
        PaymentStatus::Pending => Vec::new(),
    }
}

pub fn booking_created(booking: &Booking) -> Email {
    let payment_link = booking.payment_link.as_deref().unwrap_or_default();
    Email {
        kind: NotificationKind::BookingCreated,
        booking_id: booking.booking_id.clone(),
        to: booking.email.clone(),
        subject: "Booking Confirmation - Natureland YogChetna".to_string(),
        body: format!(
            "Dear Guest,\n\n\
             Thank you for booking with Natureland YogChetna!\n\n\
             Booking ID: {}\n\n\
             To complete your booking, please make the payment using the link below:\n\
             {payment_link}\n\n\
             Best regards,\nNatureland YogChetna Team\n",
            booking.booking_id
        ),
    }
}

pub fn owner_new_booking(mail: &MailConfig, booking: &Booking) -> Email {
    Email {
        kind: NotificationKind::OwnerNewBooking,
        booking_id: booking.booking_id.clone(),
        to: mail.owner_email.clone(),
        subject: format!("New Booking Received - {}", booking.booking_id),
        body: format!(
            "New Booking Alert\n\n\
             Booking ID: {}\n\
             Guest Name: {}\n\
             Program: {}\n\
             Status: Payment Pending\n\n\
             Please check the admin panel for full details.\n",
            booking.booking_id, booking.name, booking.program
        ),
    }
}

pub fn payment_success(booking: &Booking) -> Email {
    Email {
        kind: NotificationKind::PaymentSuccess,
        booking_id: booking.booking_id.clone(),
        to: booking.email.clone(),
        subject: "Payment Successful - Booking Confirmed".to_string(),
        body: format!(
            "Dear {},\n\n\
             Your payment has been successfully processed.\n\n\
             Booking ID: {}\n\
             Status: Confirmed\n\n\
             We look forward to welcoming you to Natureland YogChetna!\n\n\
             Best regards,\nNatureland YogChetna Team\n",
            booking.name, booking.booking_id
        ),
    }
}

pub fn payment_failure(booking: &Booking) -> Email {
    Email {
        kind: NotificationKind::PaymentFailure,
        booking_id: booking.booking_id.clone(),
        to: booking.email.clone(),
        subject: "Payment Failed - Please Try Again".to_string(),
        body: format!(
            "Dear {},\n\n\
             Unfortunately, your payment could not be processed.\n\n\
             Booking ID: {}\n\n\
             Please try again or contact us for assistance.\n\n\
             Best regards,\nNatureland YogChetna Team\n",
            booking.name, booking.booking_id
        ),
    }
}

pub fn owner_payment_update(
    mail: &MailConfig,
    booking: &Booking,
    status: PaymentStatus,
) -> Email {
    Email {
        kind: NotificationKind::OwnerPaymentUpdate,
        booking_id: booking.booking_id.clone(),
        to: mail.owner_email.clone(),
        subject: format!("Payment Update - {}", booking.booking_id),
        body: format!(
            "Payment Status Update\n\n\
             Booking ID: {}\n\
             Guest Name: {}\n\
             Program: {}\n\
             Amount: {}\n\
             Payment Status: {}\n",
            booking.booking_id,
            booking.name,
            booking.program,
            booking.amount,
            status.as_str()
        ),
    }
}
