/// Environment-sourced configuration, parsed once at startup. Core logic
/// receives plain config values and never reads the environment itself.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub mail: MailConfig,
    pub engine: EngineConfig,
    /// Shared secret for webhook signature verification. None disables the
    /// verifier (sandbox mode); this must be an explicit choice, not a
    /// silent default in the engine.
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub app_id: String,
    pub client_secret: String,
    pub pg_secret: String,
    pub environment: String,
    /// Hosted checkout form the payment link points at.
    pub link_base_url: String,
    pub return_url: String,
    pub notify_url: String,
    pub success_redirect: String,
    pub failure_redirect: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from_email: String,
    pub owner_email: String,
    /// Booking-created mail on intake; ships disabled.
    pub on_booking: bool,
}

/// Reconciliation toggles. Both default to the observed gateway behavior:
/// no placeholder bookings, last write wins.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Synthesize a placeholder booking when a delivery references an
    /// unknown order_id (gateway sandbox behavior).
    pub synthesize_missing: bool,
    /// Refuse to overwrite a settled payment status with a different one.
    pub ordering_guard: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            gateway: GatewayConfig::from_env(),
            mail: MailConfig::from_env(),
            engine: EngineConfig::from_env(),
            webhook_secret: env_opt("WEBHOOK_SECRET"),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(value) = env_opt("CASHFREE_APP_ID") {
            config.app_id = value;
        }
        if let Some(value) = env_opt("CASHFREE_CLIENT_SECRET") {
            config.client_secret = value;
        }
        if let Some(value) = env_opt("CASHFREE_PG_SECRET") {
            config.pg_secret = value;
        }
        if let Some(value) = env_opt("APP_ENV") {
            config.environment = value;
        }
        if let Some(value) = env_opt("PAYMENT_LINK_BASE_URL") {
            config.link_base_url = value;
        }
        if let Some(value) = env_opt("PAYMENT_RETURN_URL") {
            config.return_url = value;
        }
        if let Some(value) = env_opt("PAYMENT_NOTIFY_URL") {
            config.notify_url = value;
        }
        if let Some(value) = env_opt("PAYMENT_SUCCESS_REDIRECT") {
            config.success_redirect = value;
        }
        if let Some(value) = env_opt("PAYMENT_FAILURE_REDIRECT") {
            config.failure_redirect = value;
        }

        config
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            client_secret: String::new(),
            pg_secret: String::new(),
            environment: "production".to_string(),
            link_base_url: "https://payments-test.cashfree.com/forms/sh4dow".to_string(),
            return_url: "https://yourwebsite.com/payment/return".to_string(),
            notify_url: "https://yourwebsite.com/webhook/payment".to_string(),
            success_redirect: "/payment-success.html".to_string(),
            failure_redirect: "/payment-failed.html".to_string(),
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(value) = env_opt("SMTP_HOST") {
            config.smtp_host = value;
        }
        if let Ok(value) = std::env::var("SMTP_PORT")
            && let Ok(parsed) = value.parse::<u16>()
        {
            config.smtp_port = parsed;
        }
        if let Some(value) = env_opt("SMTP_USER") {
            config.smtp_user = value;
        }
        if let Some(value) = env_opt("SMTP_PASS") {
            config.smtp_pass = value;
        }
        if let Some(value) = env_opt("FROM_EMAIL") {
            config.from_email = value;
        }
        if let Some(value) = env_opt("OWNER_EMAIL") {
            config.owner_email = value;
        }
        if let Some(value) = env_opt("MAIL_ON_BOOKING") {
            config.on_booking = parse_bool(&value);
        }

        config
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            from_email: "bookings@example.com".to_string(),
            owner_email: "owner@example.com".to_string(),
            on_booking: false,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(value) = env_opt("WEBHOOK_SYNTH_MISSING") {
            config.synthesize_missing = parse_bool(&value);
        }
        if let Some(value) = env_opt("WEBHOOK_ORDERING_GUARD") {
            config.ordering_guard = parse_bool(&value);
        }

        config
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            synthesize_missing: false,
            ordering_guard: false,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "yes" | "on")
}
