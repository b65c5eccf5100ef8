//! User - ユーザーの識別情報

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{Id, IdMarker};
use super::record::Record;

/// Identifier of a User.
pub type UserId = Id<User>;

/// The identity of a user.
///
/// `id` が None のまま create すると Store が採番します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }
}

impl IdMarker for User {
    fn prefix() -> &'static str {
        "user-"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCriteria {
    ById(UserId),
}

/// first_name / last_name の部分更新
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserChanges {
    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }
}

impl Record for User {
    type Criteria = UserCriteria;
    type Changes = UserChanges;

    const KIND: &'static str = "user";

    fn id(&self) -> Option<UserId> {
        self.id
    }

    fn by_id(id: UserId) -> UserCriteria {
        UserCriteria::ById(id)
    }

    fn matches(&self, criteria: &UserCriteria) -> bool {
        match criteria {
            UserCriteria::ById(id) => self.id == Some(*id),
        }
    }

    fn apply(&mut self, changes: &UserChanges) {
        if let Some(first_name) = &changes.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            self.last_name = last_name.clone();
        }
    }

    fn set_id(&mut self, id: UserId) {
        self.id = Some(id);
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }

    fn stamp_updated(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_only_touch_supplied_fields() {
        let mut user = User::new("Kenny", "Bastani").with_id(UserId::new(1));
        user.apply(&UserChanges::default().last_name("Smith"));

        assert_eq!(user.first_name, "Kenny");
        assert_eq!(user.last_name, "Smith");
    }

    #[test]
    fn user_serializes_with_camel_case_fields() {
        let user = User::new("Jane", "Doe").with_id(UserId::new(3));
        let v = serde_json::to_value(&user).unwrap();

        assert_eq!(v["id"], 3);
        assert_eq!(v["firstName"], "Jane");
        assert_eq!(v["lastName"], "Doe");
        assert!(v.get("createdAt").is_none());
    }

    #[test]
    fn users_have_no_foreign_references() {
        let user = User::new("Jane", "Doe");
        assert!(user.references().is_empty());
        assert!(user.validate().is_ok());
    }
}
