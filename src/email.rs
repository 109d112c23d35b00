use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::error::AppError;
use crate::models::{Course, FeedbackSession, Instructor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Outbound mail seam. Dispatch failures are reported, never panicked on;
/// callers decide whether a failure is fatal.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

#[derive(Clone, Debug)]
pub struct MailerConfig {
    pub api_url: String,
    pub api_token: String,
    pub sender: String,
}

impl MailerConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let api_url = env::var("MAILER_API_URL")
            .map_err(|_| AppError::BadRequest("MAILER_API_URL is not set".to_string()))?;
        let api_token = env::var("MAILER_API_TOKEN")
            .map_err(|_| AppError::BadRequest("MAILER_API_TOKEN is not set".to_string()))?;
        let sender = env::var("MAILER_SENDER")
            .map_err(|_| AppError::BadRequest("MAILER_SENDER is not set".to_string()))?;

        Ok(Self {
            api_url,
            api_token,
            sender,
        })
    }
}

/// Sends mail through an HTTP provider API.
pub struct HttpEmailSender {
    client: Client,
    config: MailerConfig,
}

impl HttpEmailSender {
    pub fn new(config: MailerConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        let payload = json!({
            "from": self.config.sender,
            "to": message.recipient,
            "subject": message.subject,
            "text": message.body,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Mail provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Mail provider error {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}

/// Logs instead of sending; used when no mailer is configured.
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        info!(
            "mailer not configured, dropping email to {}: {}",
            message.recipient, message.subject
        );
        Ok(())
    }
}

/// Summary email sent after an instructor's registration key has been
/// regenerated: one join link per feedback session, carrying the new key.
pub fn course_links_regenerated_email(
    base_url: &str,
    course: &Course,
    instructor: &Instructor,
    sessions: &[FeedbackSession],
) -> EmailMessage {
    let subject = format!(
        "Your session links for the course {} [{}] have been updated",
        course.name(),
        course.id()
    );

    let mut body = format!(
        "Hello {},\n\n\
         The registration key for your instructor role in {} [{}] has been regenerated. \
         Links sent to you earlier no longer work. Your updated session links:\n\n",
        instructor.name(),
        course.name(),
        course.id()
    );
    if sessions.is_empty() {
        body.push_str("This course currently has no feedback sessions.\n");
    } else {
        for session in sessions {
            body.push_str(&format!(
                "- {}: {}/sessions/{}/{}?key={}\n",
                session.name(),
                base_url,
                course.id(),
                session.id(),
                instructor.registration_key()
            ));
        }
    }

    EmailMessage {
        recipient: instructor.email().to_string(),
        subject,
        body,
    }
}
