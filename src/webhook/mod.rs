pub mod engine;
pub mod payload;
pub mod status;

pub use engine::{EngineError, Reconciliation, reconcile};
pub use payload::{CustomerDetails, PaymentNotification, PayloadError, parse_notification};
pub use status::map_raw_status;
