use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::collections::BTreeSet;
use thiserror::Error;
use time::UtcDateTime;

pub const USER_HANDLE_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 100;
pub const DISPLAY_NAME_MAX_LEN: usize = 100;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AccountMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Account {
    pub id: Id<AccountMarker>,
    pub handle: UserHandle,
    pub email: Email,
    pub display_name: String,
    pub bio: String,
    /// Avatar URL, empty when none was uploaded.
    pub avatar: String,
    pub followers: BTreeSet<Id<AccountMarker>>,
    pub following: BTreeSet<Id<AccountMarker>>,
    #[serde(with = "crate::model::timestamp")]
    pub created_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CreateAccount {
    pub handle: UserHandle,
    pub email: Email,
    pub display_name: String,
    pub bio: String,
    pub avatar: String,
}

/// Profile fields that may change after registration. `None` leaves a field as is.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct UpdateAccount {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl Account {
    #[must_use]
    pub fn create(id: Id<AccountMarker>, account: CreateAccount, created_at: UtcDateTime) -> Self {
        Self {
            id,
            handle: account.handle,
            email: account.email,
            display_name: account.display_name,
            bio: account.bio,
            avatar: account.avatar,
            followers: BTreeSet::new(),
            following: BTreeSet::new(),
            created_at,
        }
    }

    pub fn apply_update(&mut self, update: UpdateAccount) {
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct UserHandle(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The user handle is invalid: {0}")]
pub struct InvalidUserHandleError(String);

impl UserHandle {
    pub fn new(handle: String) -> Result<Self, InvalidUserHandleError> {
        let length = handle.chars().count();
        if (1..=USER_HANDLE_MAX_LEN).contains(&length) && !handle.contains(char::is_whitespace) {
            Ok(UserHandle(handle))
        } else {
            Err(InvalidUserHandleError(handle))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for UserHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        UserHandle::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"UserHandle"))
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The email address is invalid: {0}")]
pub struct InvalidEmailError(String);

impl Email {
    pub fn new(email: String) -> Result<Self, InvalidEmailError> {
        let valid = email.chars().count() <= EMAIL_MAX_LEN
            && email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());

        if valid {
            Ok(Email(email))
        } else {
            Err(InvalidEmailError(email))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Email::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Email"))
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The display name must be between 1 and {DISPLAY_NAME_MAX_LEN} characters: {0:?}")]
pub struct InvalidDisplayNameError(String);

pub fn validate_display_name(display_name: &str) -> Result<(), InvalidDisplayNameError> {
    let trimmed_length = display_name.trim().chars().count();
    if trimmed_length == 0 || display_name.chars().count() > DISPLAY_NAME_MAX_LEN {
        return Err(InvalidDisplayNameError(display_name.to_owned()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::model::account::{
        Account, CreateAccount, Email, UpdateAccount, UserHandle, validate_display_name,
    };
    use time::macros::utc_datetime;

    #[test]
    fn user_handle_bounds() {
        assert!(UserHandle::new("john_doe".to_owned()).is_ok());
        assert!(UserHandle::new("x".repeat(50)).is_ok());

        assert!(UserHandle::new(String::new()).is_err());
        assert!(UserHandle::new("x".repeat(51)).is_err());
        assert!(UserHandle::new("john doe".to_owned()).is_err());
    }

    #[test]
    fn email_needs_both_sides_of_the_at() {
        assert!(Email::new("john@example.com".to_owned()).is_ok());

        assert!(Email::new("john.example.com".to_owned()).is_err());
        assert!(Email::new("@example.com".to_owned()).is_err());
        assert!(Email::new("john@".to_owned()).is_err());
    }

    #[test]
    fn invalid_handle_is_rejected_when_deserializing() {
        let result = serde_json::from_str::<UserHandle>("\"has space\"");
        assert!(result.is_err());
    }

    #[test]
    fn display_name_must_not_be_blank() {
        assert!(validate_display_name("Jane Smith").is_ok());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"n".repeat(101)).is_err());
    }

    #[test]
    fn update_only_touches_given_fields() {
        let mut account = Account::create(
            "7".into(),
            CreateAccount {
                handle: UserHandle::new("mike".to_owned()).unwrap(),
                email: Email::new("mike@example.com".to_owned()).unwrap(),
                display_name: "Mike".to_owned(),
                bio: "Travel".to_owned(),
                avatar: String::new(),
            },
            utc_datetime!(2024-01-01 00:00),
        );

        account.apply_update(UpdateAccount {
            avatar: Some("https://example.com/mike.png".to_owned()),
            ..UpdateAccount::default()
        });

        assert_eq!(account.display_name, "Mike");
        assert_eq!(account.bio, "Travel");
        assert_eq!(account.avatar, "https://example.com/mike.png");
        assert!(account.followers.is_empty());
    }
}
