pub mod api;
pub mod booking;
pub mod transaction;

pub use api::{
    CreateBookingRequest, CreateBookingResponse, ListBookingsQuery, ListBookingsResponse,
    ListTransactionsResponse, UpdatePaymentStatusRequest, UpdatePaymentStatusResponse, WebhookAck,
    WebhookProbe,
};
pub use booking::{Booking, PaymentStatus};
pub use transaction::LedgerEntry;
