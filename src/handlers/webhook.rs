use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::{
    auth::{SIGNATURE_HEADER, verify_signature},
    error::ApiError,
    notify,
    state::AppState,
    types::{WebhookAck, WebhookProbe},
    webhook::{self, EngineError, PayloadError},
};

/// Payment gateway callback. Signature check (when configured) happens
/// before the body is even parsed; notifications go out strictly after the
/// reconciliation transaction commits.
pub async fn webhook_handler(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if params.get("test").map(String::as_str) == Some("1") {
        return Ok(Json(WebhookProbe {
            status: "ok".to_string(),
            message: "Webhook endpoint is accessible".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            method: method.to_string(),
        })
        .into_response());
    }

    let delivery_id = Uuid::new_v4();
    tracing::debug!(
        delivery_id = %delivery_id,
        payload_len = body.len(),
        "webhook delivery received"
    );

    if let Some(secret) = &state.config.webhook_secret {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing webhook signature"))?;
        if !verify_signature(secret, &body, provided) {
            tracing::warn!(delivery_id = %delivery_id, "webhook signature mismatch");
            return Err(ApiError::unauthorized("invalid webhook signature"));
        }
    }

    let note = webhook::parse_notification(&body).map_err(|err| match err {
        PayloadError::Malformed(cause) => {
            tracing::warn!(delivery_id = %delivery_id, error = %cause, "undecodable payload");
            ApiError::MalformedPayload("Invalid JSON payload".to_string())
        }
        PayloadError::MissingOrderReference => ApiError::MissingOrderReference,
    })?;

    let raw_payload = String::from_utf8_lossy(&body);
    let outcome = webhook::reconcile(&state.pool, &state.config.engine, &note, &raw_payload)
        .await
        .map_err(|err| match err {
            EngineError::Db(db) => ApiError::Db(db),
            EngineError::Parse(message) => ApiError::Internal(message),
        })?;

    // Post-commit, best-effort: a mail failure never fails the delivery.
    if outcome.transitioned
        && let Some(booking) = &outcome.booking
    {
        let emails = notify::for_transition(&state.config.mail, booking, outcome.status);
        notify::dispatch(&state.pool, state.mailer.as_ref(), emails).await;
    }

    Ok(Json(WebhookAck {
        status: "success".to_string(),
        message: "Webhook processed successfully".to_string(),
        order_id: outcome.order_id,
        payment_status: outcome.status,
        amount: outcome.amount,
    })
    .into_response())
}

/// Pure glue: map the gateway's return query params to an internal redirect.
pub async fn payment_return_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Redirect {
    let booking_id = first(&params, &["order_id", "booking_id"]);
    let amount = first(&params, &["order_amount", "amount"]);
    let raw_status =
        first(&params, &["payment_status", "status"]).unwrap_or_else(|| "success".to_string());
    let transaction_id = first(&params, &["cf_payment_id", "transaction_id", "payment_id"]);

    let gateway = &state.config.gateway;
    let lowered = raw_status.to_ascii_lowercase();
    let target = if lowered == "success" || lowered == "paid" {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("booking_id", booking_id.as_deref().unwrap_or_default())
            .append_pair("amount", amount.as_deref().unwrap_or_default())
            .append_pair(
                "transaction_id",
                transaction_id.as_deref().unwrap_or_default(),
            )
            .append_pair("status", "success");
        format!("{}?{}", gateway.success_redirect, query.finish())
    } else {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("booking_id", booking_id.as_deref().unwrap_or_default())
            .append_pair("status", &raw_status);
        format!("{}?{}", gateway.failure_redirect, query.finish())
    };

    Redirect::to(&target)
}

fn first(params: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| params.get(*key))
        .filter(|value| !value.is_empty())
        .cloned()
}
