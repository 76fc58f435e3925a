use std::sync::Arc;

use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::notify::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}
