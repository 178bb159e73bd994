use crate::server::{
    Result, ServerError, ServerRouter, auth::AuthenticatedAccount, extract::Json,
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use murmur_common::model::{
    Id, ModelValidationError,
    account::{Account, AccountMarker, UpdateAccount, validate_display_name},
    media::MediaUpload,
    post::Post,
};
use murmur_db::Store;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_accounts)
        .typed_get(get_account)
        .typed_get(get_account_posts)
        .typed_patch(update_profile)
}

#[derive(TypedPath)]
#[typed_path("/accounts")]
struct ListAccountsPath;

async fn list_accounts(
    ListAccountsPath: ListAccountsPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<Account>>> {
    Ok(Json(store.list_accounts().await?))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/accounts/{id}", rejection(ServerError))]
struct GetAccountPath {
    id: Id<AccountMarker>,
}

async fn get_account(
    GetAccountPath { id }: GetAccountPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Account>> {
    let account = store
        .fetch_account(&id)
        .await?
        .ok_or(ServerError::AccountByIdNotFound(id))?;

    Ok(Json(account))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/accounts/{id}/posts", rejection(ServerError))]
struct GetAccountPostsPath {
    id: Id<AccountMarker>,
}

async fn get_account_posts(
    GetAccountPostsPath { id }: GetAccountPostsPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<Post>>> {
    let posts = store
        .fetch_account_posts(&id)
        .await?
        .ok_or(ServerError::AccountByIdNotFound(id))?;

    Ok(Json(posts))
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
struct UpdateProfileRequest {
    display_name: Option<String>,
    bio: Option<String>,
    avatar: Option<MediaUpload>,
}

impl TryFrom<UpdateProfileRequest> for UpdateAccount {
    type Error = ModelValidationError;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        if let Some(display_name) = &value.display_name {
            validate_display_name(display_name)?;
        }

        Ok(Self {
            display_name: value.display_name,
            bio: value.bio,
            avatar: value.avatar.map(MediaUpload::into_avatar_url).transpose()?,
        })
    }
}

#[derive(TypedPath)]
#[typed_path("/accounts/me")]
struct UpdateProfilePath;

async fn update_profile(
    UpdateProfilePath: UpdateProfilePath,
    State(store): State<Arc<dyn Store>>,
    account: AuthenticatedAccount,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Account>> {
    let update = UpdateAccount::try_from(request)?;
    let account = store.update_account(account.account_id(), update).await?;

    Ok(Json(account))
}
