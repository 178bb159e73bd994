use crate::server::{
    Result, ServerError, ServerRouter,
    auth::{AuthenticatedAccount, issue_token},
    extract::Json,
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use murmur_common::model::{
    ModelValidationError,
    account::{Account, CreateAccount, Email, UserHandle, validate_display_name},
    auth::{authenticate, validate_new_password},
};
use murmur_db::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(register)
        .typed_post(login)
        .typed_post(logout)
        .typed_get(current_account)
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct RegisterRequest {
    handle: UserHandle,
    email: Email,
    password: String,
    confirm_password: String,
    display_name: String,
    #[serde(default)]
    bio: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct SessionResponse {
    account: Account,
    token: String,
}

#[derive(TypedPath)]
#[typed_path("/auth/register")]
struct RegisterPath;

async fn register(
    RegisterPath: RegisterPath,
    State(store): State<Arc<dyn Store>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    validate_new_password(&request.password, &request.confirm_password)
        .map_err(ModelValidationError::from)?;
    validate_display_name(&request.display_name).map_err(ModelValidationError::from)?;

    let account = store
        .create_account(CreateAccount {
            handle: request.handle,
            email: request.email,
            display_name: request.display_name,
            bio: request.bio,
            avatar: String::new(),
        })
        .await?;
    let token = issue_token(store.as_ref(), account.id.clone()).await?;

    info!(account_id = %account.id, "Registered account");
    Ok((StatusCode::CREATED, Json(SessionResponse { account, token })))
}

#[derive(TypedPath)]
#[typed_path("/auth/login")]
struct LoginPath;

async fn login(
    LoginPath: LoginPath,
    State(store): State<Arc<dyn Store>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let candidate = store.fetch_account_by_email(&request.email).await?;
    let account = authenticate(candidate.iter(), &request.email, &request.password)
        .ok_or(ServerError::InvalidCredentials)?
        .clone();
    let token = issue_token(store.as_ref(), account.id.clone()).await?;

    info!(account_id = %account.id, "Logged in");
    Ok(Json(SessionResponse { account, token }))
}

#[derive(TypedPath)]
#[typed_path("/auth/logout")]
struct LogoutPath;

async fn logout(
    LogoutPath: LogoutPath,
    State(store): State<Arc<dyn Store>>,
    account: AuthenticatedAccount,
) -> Result<StatusCode> {
    store.delete_session(account.token_hash()).await?;

    info!(account_id = %account.account_id(), "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(TypedPath)]
#[typed_path("/auth/me")]
struct CurrentAccountPath;

async fn current_account(
    CurrentAccountPath: CurrentAccountPath,
    State(store): State<Arc<dyn Store>>,
    account: AuthenticatedAccount,
) -> Result<Json<Account>> {
    let account_id = account.account_id();
    let account = store
        .fetch_account(account_id)
        .await?
        .ok_or_else(|| ServerError::AccountByIdNotFound(account_id.clone()))?;

    Ok(Json(account))
}
