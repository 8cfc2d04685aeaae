use serde::{Deserialize, Serialize};

use crate::types::{Booking, LedgerEntry, PaymentStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub program: Option<String>,
    pub accommodation: Option<String>,
    pub occupancy: Option<String>,
    pub amount: Option<f64>,

    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub special_requirements: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub success: bool,
    pub booking_id: String,
    pub payment_link: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub booking_id: String,
    pub status: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePaymentStatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListBookingsQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBookingsResponse {
    pub success: bool,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTransactionsResponse {
    pub success: bool,
    pub transactions: Vec<LedgerEntry>,
}

/// Acknowledgement returned to the gateway after a delivery is reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
    pub message: String,
    pub order_id: String,
    pub payment_status: PaymentStatus,
    pub amount: f64,
}

/// Liveness payload for the `?test=1` probe; never touches the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookProbe {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub method: String,
}
