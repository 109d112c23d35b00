use std::sync::Arc;

use sqlx::SqlitePool;

use crate::email::EmailSender;
use crate::services::InstructorLogic;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub logic: Arc<dyn InstructorLogic>,
    pub emails: Arc<dyn EmailSender>,
    pub base_url: String,
}
