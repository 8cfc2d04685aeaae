use serde_json::Value;

/// Discriminator value the gateway sets on payment-form order webhooks.
const ORDER_FORM_TYPE: &str = "PAYMENT_FORM_ORDER_WEBHOOK";

/// The delivery fields the engine needs, resolved from whichever payload
/// shape matched.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentNotification {
    pub order_id: String,
    pub raw_status: String,
    pub amount: f64,
    pub transaction_id: String,
    pub customer: Option<CustomerDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid JSON payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("missing order_id")]
    MissingOrderReference,
}

/// Decode a raw delivery body and resolve it to a notification.
///
/// Extraction strategies are tried in order: the nested payment-form order
/// shape first, then the flat shape. A strategy either resolves fully
/// (order_id present) or is skipped; a payload with no resolvable order_id
/// under any shape fails before any persistence happens.
pub fn parse_notification(raw: &[u8]) -> Result<PaymentNotification, PayloadError> {
    let value: Value = serde_json::from_slice(raw)?;
    extract_order_form(&value)
        .or_else(|| extract_flat(&value))
        .ok_or(PayloadError::MissingOrderReference)
}

fn extract_order_form(value: &Value) -> Option<PaymentNotification> {
    if value.get("type").and_then(Value::as_str) != Some(ORDER_FORM_TYPE) {
        return None;
    }
    let order = value.get("data")?.get("order")?;
    let order_id = field_str(order, "order_id")?;

    Some(PaymentNotification {
        order_id,
        raw_status: field_str(order, "order_status").unwrap_or_default(),
        amount: first_amount(order, &["order_amount"]),
        transaction_id: field_str(order, "transaction_id").unwrap_or_default(),
        customer: order.get("customer_details").map(|details| CustomerDetails {
            name: field_str(details, "customer_name"),
            email: field_str(details, "customer_email"),
            phone: field_str(details, "customer_phone"),
        }),
    })
}

fn extract_flat(value: &Value) -> Option<PaymentNotification> {
    let order_id = field_str(value, "order_id")?;

    Some(PaymentNotification {
        order_id,
        raw_status: first_str(value, &["payment_status", "status"]).unwrap_or_default(),
        amount: first_amount(value, &["order_amount", "amount"]),
        transaction_id: first_str(value, &["transaction_id", "cf_payment_id"])
            .unwrap_or_default(),
        customer: None,
    })
}

fn field_str(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| field_str(value, key))
}

// The gateway sends amounts both as JSON numbers and as numeric strings.
fn first_amount(value: &Value, keys: &[&str]) -> f64 {
    for key in keys {
        match value.get(key) {
            Some(Value::Number(n)) => return n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => {
                if let Ok(parsed) = s.parse::<f64>() {
                    return parsed;
                }
            }
            _ => {}
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn nested_order_form_shape() {
        let raw = br#"{
            "type": "PAYMENT_FORM_ORDER_WEBHOOK",
            "data": {
                "order": {
                    "order_id": "YR202501011234",
                    "order_status": "PAID",
                    "order_amount": 5000,
                    "transaction_id": "cf_123",
                    "customer_details": {
                        "customer_name": "Asha",
                        "customer_email": "asha@example.com",
                        "customer_phone": "9999999999"
                    }
                }
            }
        }"#;

        let note = parse_notification(raw).unwrap();
        assert_eq!(note.order_id, "YR202501011234");
        assert_eq!(note.raw_status, "PAID");
        assert_eq!(note.amount, 5000.0);
        assert_eq!(note.transaction_id, "cf_123");
        let customer = note.customer.unwrap();
        assert_eq!(customer.name.as_deref(), Some("Asha"));
        assert_eq!(customer.email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn flat_shape_with_aliases() {
        let raw = br#"{"order_id":"YR1","status":"failed","amount":"2500.50","cf_payment_id":"p9"}"#;
        let note = parse_notification(raw).unwrap();
        assert_eq!(note.order_id, "YR1");
        assert_eq!(note.raw_status, "failed");
        assert_eq!(note.amount, 2500.5);
        assert_eq!(note.transaction_id, "p9");
        assert!(note.customer.is_none());
    }

    #[test]
    fn flat_shape_prefers_payment_status_over_status() {
        let raw = br#"{"order_id":"YR1","payment_status":"paid","status":"failed"}"#;
        let note = parse_notification(raw).unwrap();
        assert_eq!(note.raw_status, "paid");
    }

    #[test]
    fn order_form_without_order_id_falls_back_to_flat() {
        let raw = br#"{
            "type": "PAYMENT_FORM_ORDER_WEBHOOK",
            "data": {"order": {"order_status": "PAID"}},
            "order_id": "YR77",
            "payment_status": "paid"
        }"#;
        let note = parse_notification(raw).unwrap();
        assert_eq!(note.order_id, "YR77");
        assert_eq!(note.raw_status, "paid");
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            parse_notification(b"not json"),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn decodable_but_no_order_id_under_any_shape() {
        assert!(matches!(
            parse_notification(br#"{"payment_status":"paid","amount":100}"#),
            Err(PayloadError::MissingOrderReference)
        ));
    }

    #[test]
    fn missing_optional_fields_default() {
        let note = parse_notification(br#"{"order_id":"YR1"}"#).unwrap();
        assert_eq!(note.raw_status, "");
        assert_eq!(note.amount, 0.0);
        assert_eq!(note.transaction_id, "");
    }
}
