use serde::{Deserialize, Serialize};

/// One reservation record, created by the intake flow with a pending status
/// and mutated only by payment reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub program: String,
    pub accommodation: String,
    pub occupancy: String,
    pub amount: f64,

    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub payment_link: Option<String>,
    pub payment_date: Option<String>,

    pub created_at: String,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub special_requirements: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "success" => Some(PaymentStatus::Success),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    /// Settled either way; the ordering guard refuses to overwrite these.
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }
}
