use crate::model::{
    Id,
    account::{Account, AccountMarker},
};
use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_STANDARD};
use std::{
    fmt::{Debug, Formatter},
    str::FromStr,
};
use thiserror::Error;
use time::UtcDateTime;

pub const AUTH_TOKEN_CORE_LEN: usize = 24;
pub const AUTH_TOKEN_SALT_LEN: usize = 18;
pub const SESSION_TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

/// The one password every demo account accepts.
pub const DEMO_PASSWORD: &str = "password";
pub const PASSWORD_MIN_LEN: usize = 6;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing auth token failed: {0}")]
pub struct AuthTokenHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AuthTokenDecodeError {
    #[error("Not enough parts separated by ':'")]
    NotEnoughParts,
    #[error("The account id part is empty")]
    EmptyAccountId,
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the core part is incorrect")]
    InvalidCoreLength,
    #[error("The length of the salt part is incorrect")]
    InvalidSaltLength,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum InvalidPasswordError {
    #[error("Passwords do not match")]
    Mismatch,
    #[error("Password must be at least {PASSWORD_MIN_LEN} characters long")]
    TooShort,
}

/// Bearer token handed out on login. Only its hash is ever stored.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthToken {
    pub account_id: Id<AccountMarker>,
    pub core: [u8; AUTH_TOKEN_CORE_LEN],
    pub salt: [u8; AUTH_TOKEN_SALT_LEN],
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionTokenHash(pub Box<[u8; SESSION_TOKEN_HASH_LEN]>);

/// A logged-in account. Sessions do not expire; they end on logout.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Session {
    pub account: Id<AccountMarker>,
    pub token_hash: SessionTokenHash,
    pub created_at: UtcDateTime,
}

impl AuthToken {
    #[must_use]
    pub fn generate_random(account_id: Id<AccountMarker>) -> Self {
        let core = rand::random();
        let salt = rand::random();

        Self {
            account_id,
            core,
            salt,
        }
    }

    #[must_use]
    pub fn as_token_str(&self) -> String {
        let account_id = &self.account_id;
        let encoded_core = Base64Display::new(&self.core, &BASE64_STANDARD);
        let encoded_salt = Base64Display::new(&self.salt, &BASE64_STANDARD);

        format!("{account_id}:{encoded_core}:{encoded_salt}")
    }

    pub fn hash(&self) -> Result<SessionTokenHash, AuthTokenHashError> {
        let argon2 = Argon2::default();

        let mut hash = Box::new([0; SESSION_TOKEN_HASH_LEN]);
        argon2
            .hash_password_into(&self.core, &self.salt, &mut *hash)
            .map_err(AuthTokenHashError)?;

        Ok(SessionTokenHash(hash))
    }
}

impl FromStr for AuthToken {
    type Err = AuthTokenDecodeError;

    // Split from the right: base64 never contains ':', account ids might.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');

        let salt_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let core_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let account_id_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;

        if account_id_part.is_empty() {
            return Err(Self::Err::EmptyAccountId);
        }

        let core = BASE64_STANDARD
            .decode(core_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidCoreLength)?;
        let salt = BASE64_STANDARD
            .decode(salt_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSaltLength)?;

        Ok(Self {
            account_id: account_id_part.into(),
            core,
            salt,
        })
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("account_id", &self.account_id)
            .field("core", &"[redacted]")
            .field("salt", &"[redacted]")
            .finish()
    }
}

impl Debug for SessionTokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionTokenHash").field(&"[redacted]").finish()
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The session token hash had an invalid length")]
pub struct InvalidSessionTokenHashError;

impl TryFrom<Box<[u8]>> for SessionTokenHash {
    type Error = InvalidSessionTokenHashError;

    fn try_from(value: Box<[u8]>) -> Result<Self, Self::Error> {
        Ok(Self(
            value.try_into().map_err(|_| InvalidSessionTokenHashError)?,
        ))
    }
}

#[must_use]
pub fn password_matches(password: &str) -> bool {
    !password.is_empty() && password == DEMO_PASSWORD
}

/// Finds the account with exactly this email and checks the demo password.
pub fn authenticate<'a>(
    accounts: impl IntoIterator<Item = &'a Account>,
    email: &str,
    password: &str,
) -> Option<&'a Account> {
    if !password_matches(password) {
        return None;
    }

    accounts
        .into_iter()
        .find(|account| account.email.get() == email)
}

/// Registration-time checks on a chosen password and its confirmation.
pub fn validate_new_password(
    password: &str,
    confirmation: &str,
) -> Result<(), InvalidPasswordError> {
    if password != confirmation {
        return Err(InvalidPasswordError::Mismatch);
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(InvalidPasswordError::TooShort);
    }

    Ok(())
}
