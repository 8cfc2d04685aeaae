use axum::{Json, extract::State};

use crate::{
    booking::{StoreError, create_booking, list_bookings, list_transactions, update_payment_status},
    error::ApiError,
    extractors::{ValidJson, ValidPath, ValidQuery},
    notify,
    state::AppState,
    types::{
        CreateBookingRequest, CreateBookingResponse, ListBookingsQuery, ListBookingsResponse,
        ListTransactionsResponse, PaymentStatus, UpdatePaymentStatusRequest,
        UpdatePaymentStatusResponse,
    },
};

pub async fn create_booking_handler(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, ApiError> {
    let booking = create_booking(&state.pool, &state.config.gateway, &req)
        .await
        .map_err(map_store_error)?;

    // Fire-and-forget; intake mail ships disabled by default.
    if state.config.mail.on_booking {
        let emails = vec![
            notify::booking_created(&booking),
            notify::owner_new_booking(&state.config.mail, &booking),
        ];
        notify::dispatch(&state.pool, state.mailer.as_ref(), emails).await;
    }

    let payment_link = booking.payment_link.clone().unwrap_or_default();
    Ok(Json(CreateBookingResponse {
        success: true,
        booking_id: booking.booking_id,
        payment_link,
        message: "Booking created successfully".to_string(),
    }))
}

pub async fn update_payment_status_handler(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<UpdatePaymentStatusRequest>,
) -> Result<Json<UpdatePaymentStatusResponse>, ApiError> {
    let (booking, transitioned) = update_payment_status(&state.pool, &req)
        .await
        .map_err(map_store_error)?;

    if transitioned {
        let emails = notify::for_transition(&state.config.mail, &booking, booking.payment_status);
        notify::dispatch(&state.pool, state.mailer.as_ref(), emails).await;
    }

    Ok(Json(UpdatePaymentStatusResponse {
        success: true,
        message: "Payment status updated successfully".to_string(),
    }))
}

pub async fn list_bookings_handler(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListBookingsQuery>,
) -> Result<Json<ListBookingsResponse>, ApiError> {
    let filter = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(value) => Some(PaymentStatus::parse(value).ok_or_else(|| {
            ApiError::validation("status must be all or one of pending, success, failed")
        })?),
    };

    let bookings = list_bookings(&state.pool, filter)
        .await
        .map_err(map_store_error)?;

    Ok(Json(ListBookingsResponse {
        success: true,
        bookings,
    }))
}

pub async fn list_transactions_handler(
    State(state): State<AppState>,
    ValidPath(booking_id): ValidPath<String>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    let transactions = list_transactions(&state.pool, &booking_id)
        .await
        .map_err(map_store_error)?;

    Ok(Json(ListTransactionsResponse {
        success: true,
        transactions,
    }))
}

fn map_store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::Validation(message) => ApiError::Validation(message),
        StoreError::NotFound(message) => ApiError::NotFound(message),
        StoreError::Db(db) => ApiError::Db(db),
        StoreError::Parse(message) => ApiError::Internal(message),
    }
}
