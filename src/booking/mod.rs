pub mod store;

pub use store::{
    StoreError, create_booking, list_bookings, list_transactions, update_payment_status,
};
