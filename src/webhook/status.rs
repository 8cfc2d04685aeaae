use crate::types::PaymentStatus;

/// Map the gateway's raw status vocabulary onto the internal tri-state.
/// Unknown and empty values fall open to pending so an unrecognized
/// delivery never errors out of the pipeline.
pub fn map_raw_status(raw: &str) -> PaymentStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "paid" | "success" | "completed" => PaymentStatus::Success,
        "failed" | "cancelled" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_vocabulary() {
        for raw in ["paid", "success", "completed", "PAID", "Success"] {
            assert_eq!(map_raw_status(raw), PaymentStatus::Success, "{raw}");
        }
    }

    #[test]
    fn failure_vocabulary() {
        for raw in ["failed", "cancelled", "FAILED", "Cancelled"] {
            assert_eq!(map_raw_status(raw), PaymentStatus::Failed, "{raw}");
        }
    }

    #[test]
    fn pending_and_unknown_fall_open() {
        for raw in ["pending", "created", "", "  ", "refunded", "whatever"] {
            assert_eq!(map_raw_status(raw), PaymentStatus::Pending, "{raw:?}");
        }
    }
}
