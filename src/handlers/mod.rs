pub mod booking;
pub mod webhook;

pub use booking::{
    create_booking_handler, list_bookings_handler, list_transactions_handler,
    update_payment_status_handler,
};
pub use webhook::{payment_return_handler, webhook_handler};
