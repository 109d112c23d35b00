use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ReadNotification;
use crate::sanitize;

/// A registered user account, looked up by Google ID at login. Instructor
/// roles link to an account once their owner has registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: Uuid,
    google_id: String,
    name: String,
    email: String,
    read_notifications: Vec<ReadNotification>,
    created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(google_id: &str, name: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            google_id: sanitize::sanitize_google_id(google_id),
            name: sanitize::sanitize_name(name),
            email: sanitize::sanitize_email(email),
            read_notifications: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn from_storage(
        id: Uuid,
        google_id: &str,
        name: &str,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut account = Self::new(google_id, name, email);
        account.id = id;
        account.created_at = created_at;
        account
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn google_id(&self) -> &str {
        &self.google_id
    }

    pub fn set_google_id(&mut self, google_id: &str) {
        self.google_id = sanitize::sanitize_google_id(google_id);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = sanitize::sanitize_name(name);
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = sanitize::sanitize_email(email);
    }

    pub fn read_notifications(&self) -> &[ReadNotification] {
        &self.read_notifications
    }

    pub fn add_read_notification(&mut self, read_notification: ReadNotification) {
        self.read_notifications.push(read_notification);
    }

    /// Replaces the whole collection; no partial updates.
    pub fn set_read_notifications(&mut self, read_notifications: Vec<ReadNotification>) {
        self.read_notifications.clear();
        self.read_notifications.extend(read_notifications);
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn invalidity_info(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(sanitize::invalidity_for_google_id(&self.google_id));
        errors.extend(sanitize::invalidity_for_person_name(&self.name));
        errors.extend(sanitize::invalidity_for_email(&self.email));
        errors
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_sanitizes_google_id_and_email() {
        let account = Account::new(" ada.lovelace@gmail.com ", " Ada  Lovelace ", " ADA@Example.COM ");
        assert_eq!(account.google_id(), "ada.lovelace");
        assert_eq!(account.name(), "Ada Lovelace");
        assert_eq!(account.email(), "ada@example.com");
        assert!(account.invalidity_info().is_empty());
    }

    #[test]
    fn invalidity_info_flags_each_bad_field() {
        let account = Account::new("", "", "not-an-email");
        let errors = account.invalidity_info();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("Google ID"));
        assert!(errors[1].contains("person name"));
        assert!(errors[2].contains("email"));
    }

    #[test]
    fn read_notification_setter_replaces_wholesale() {
        let mut account = Account::new("gid-a", "Ada", "ada@example.com");
        account.add_read_notification(ReadNotification::new(account.id(), Uuid::new_v4()));
        account.add_read_notification(ReadNotification::new(account.id(), Uuid::new_v4()));
        assert_eq!(account.read_notifications().len(), 2);

        let only = ReadNotification::new(account.id(), Uuid::new_v4());
        account.set_read_notifications(vec![only.clone()]);
        assert_eq!(account.read_notifications(), &[only]);
    }

    #[test]
    fn equality_is_by_id() {
        let a = Account::new("gid-a", "Ada", "ada@example.com");
        let mut b = a.clone();
        b.set_name("Renamed");
        b.set_email("other@example.com");
        assert_eq!(a, b);
        assert_ne!(a, Account::new("gid-a", "Ada", "ada@example.com"));
    }
}
