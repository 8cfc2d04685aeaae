use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::notify::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}
