use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marks a notification as read by an account; owned by the account and
/// deleted with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadNotification {
    id: Uuid,
    account_id: Uuid,
    notification_id: Uuid,
    created_at: DateTime<Utc>,
}

impl ReadNotification {
    pub fn new(account_id: Uuid, notification_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            notification_id,
            created_at: Utc::now(),
        }
    }

    pub fn from_storage(
        id: Uuid,
        account_id: Uuid,
        notification_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            notification_id,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn notification_id(&self) -> Uuid {
        self.notification_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
