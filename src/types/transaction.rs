use serde::{Deserialize, Serialize};

use crate::types::PaymentStatus;

/// Append-only audit row: one per webhook delivery, written whether or not
/// the referenced booking exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub booking_id: String,
    pub transaction_id: Option<String>,
    pub payment_method: String,
    pub amount: f64,
    pub status: PaymentStatus,
    /// Raw gateway payload, kept verbatim for audit and debugging.
    pub gateway_response: String,
    pub created_at: String,
}
