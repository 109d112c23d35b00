use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peerfeedback::api::router;
use peerfeedback::email::{EmailSender, HttpEmailSender, MailerConfig, NoopEmailSender};
use peerfeedback::services::SqlInstructorLogic;
use peerfeedback::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "peerfeedback=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://peerfeedback.db".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let emails: Arc<dyn EmailSender> = match MailerConfig::new_from_env() {
        Ok(config) => Arc::new(HttpEmailSender::new(config)?),
        Err(e) => {
            warn!("mailer disabled: {}", e);
            Arc::new(NoopEmailSender)
        }
    };

    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let state = AppState {
        db: pool.clone(),
        logic: Arc::new(SqlInstructorLogic::new(pool)),
        emails,
        base_url,
    };

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
