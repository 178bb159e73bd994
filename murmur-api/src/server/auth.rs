use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use murmur_common::model::{
    Id,
    account::AccountMarker,
    auth::{AuthToken, Session, SessionTokenHash},
};
use murmur_db::Store;
use std::sync::Arc;
use time::UtcDateTime;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// The account behind the request's bearer token.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedAccount {
    id: Id<AccountMarker>,
    token_hash: SessionTokenHash,
}

impl AuthenticatedAccount {
    #[must_use]
    pub fn account_id(&self) -> &Id<AccountMarker> {
        &self.id
    }

    #[must_use]
    pub fn token_hash(&self) -> &SessionTokenHash {
        &self.token_hash
    }
}

impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    Arc<dyn Store>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let request_token: AuthToken = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?
            .token()
            .parse()?;

        let token_hash = request_token.hash()?;

        let session = Arc::<dyn Store>::from_ref(state)
            .fetch_session(&token_hash)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        if session.account != request_token.account_id {
            return Err(ServerError::InvalidToken);
        }

        Ok(Self {
            id: session.account,
            token_hash,
        })
    }
}

/// Starts a session for `account_id` and returns the bearer token for it.
pub async fn issue_token(
    store: &dyn Store,
    account_id: Id<AccountMarker>,
) -> Result<String, ServerError> {
    let token = AuthToken::generate_random(account_id);

    store
        .create_session(Session {
            account: token.account_id.clone(),
            token_hash: token.hash()?,
            created_at: UtcDateTime::now(),
        })
        .await?;

    Ok(token.as_token_str())
}
