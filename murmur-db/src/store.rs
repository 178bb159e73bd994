use async_trait::async_trait;
use murmur_common::model::{
    Id, ModelValidationError,
    account::{Account, AccountMarker, CreateAccount, UpdateAccount},
    auth::{Session, SessionTokenHash},
    post::{Comment, CreatePost, Post, PostMarker},
};
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Account with id {0} was not found.")]
    AccountNotFound(Id<AccountMarker>),
    #[error("Post with id {0} was not found.")]
    PostNotFound(Id<PostMarker>),
    #[error("The {0} is already taken.")]
    Conflict(&'static str),
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Storage for every record the service knows about.
///
/// Lookups return `Ok(None)` when nothing matches. Mutations that name a
/// missing post or author fail with [`StoreError::PostNotFound`] or
/// [`StoreError::AccountNotFound`]. Liking does not check that the liking
/// account exists.
#[async_trait]
pub trait Store: Send + Sync {
    /// Oldest first, in the order the accounts were created.
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    async fn fetch_account(&self, account_id: &Id<AccountMarker>) -> Result<Option<Account>>;

    async fn fetch_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn fetch_account_by_handle(&self, handle: &str) -> Result<Option<Account>>;

    /// Fails with [`StoreError::Conflict`] if the handle or email is in use.
    async fn create_account(&self, account: CreateAccount) -> Result<Account>;

    async fn update_account(
        &self,
        account_id: &Id<AccountMarker>,
        update: UpdateAccount,
    ) -> Result<Account>;

    /// Newest first.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn fetch_post(&self, post_id: &Id<PostMarker>) -> Result<Option<Post>>;

    /// Newest first, or `None` if the account does not exist.
    async fn fetch_account_posts(
        &self,
        account_id: &Id<AccountMarker>,
    ) -> Result<Option<Vec<Post>>>;

    async fn create_post(&self, post: CreatePost) -> Result<Post>;

    async fn like_post(
        &self,
        post_id: &Id<PostMarker>,
        account: &Id<AccountMarker>,
    ) -> Result<Post>;

    async fn unlike_post(
        &self,
        post_id: &Id<PostMarker>,
        account: &Id<AccountMarker>,
    ) -> Result<Post>;

    async fn add_comment(
        &self,
        post_id: &Id<PostMarker>,
        author: &Id<AccountMarker>,
        body: String,
    ) -> Result<Comment>;

    /// Oldest first, or `None` if the post does not exist.
    async fn fetch_comments(&self, post_id: &Id<PostMarker>) -> Result<Option<Vec<Comment>>>;

    async fn create_session(&self, session: Session) -> Result<()>;

    async fn fetch_session(&self, token_hash: &SessionTokenHash) -> Result<Option<Session>>;

    /// Returns whether a session was removed.
    async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<bool>;
}
