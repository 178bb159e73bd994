use crate::{
    seed,
    store::{Result, Store, StoreError},
};
use async_trait::async_trait;
use murmur_common::{
    content::{add_comment, apply_like, apply_unlike},
    model::{
        Id, ModelValidationError,
        account::{Account, AccountMarker, CreateAccount, UpdateAccount},
        auth::{Session, SessionTokenHash},
        post::{Comment, CreatePost, Post, PostMarker},
    },
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use time::UtcDateTime;
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    accounts: Vec<Account>,
    /// Newest first.
    posts: Vec<Post>,
    sessions: Vec<Session>,
}

/// Keeps every record in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `posts` must already be ordered newest first.
    #[must_use]
    pub fn from_records(accounts: Vec<Account>, posts: Vec<Post>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                accounts,
                posts,
                sessions: Vec::new(),
            }),
        }
    }

    pub fn with_demo_data() -> Result<Self, ModelValidationError> {
        Ok(Self::from_records(seed::demo_accounts()?, seed::demo_posts()))
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryState {
    fn account(&self, account_id: &Id<AccountMarker>) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| &account.id == account_id)
    }

    fn post_mut(&mut self, post_id: &Id<PostMarker>) -> Result<&mut Post> {
        self.posts
            .iter_mut()
            .find(|post| &post.id == post_id)
            .ok_or_else(|| StoreError::PostNotFound(post_id.clone()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.state().accounts.clone())
    }

    async fn fetch_account(&self, account_id: &Id<AccountMarker>) -> Result<Option<Account>> {
        Ok(self.state().account(account_id).cloned())
    }

    async fn fetch_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let state = self.state();
        let account = state
            .accounts
            .iter()
            .find(|account| account.email.get() == email);

        Ok(account.cloned())
    }

    async fn fetch_account_by_handle(&self, handle: &str) -> Result<Option<Account>> {
        let state = self.state();
        let account = state
            .accounts
            .iter()
            .find(|account| account.handle.get() == handle);

        Ok(account.cloned())
    }

    async fn create_account(&self, account: CreateAccount) -> Result<Account> {
        let mut state = self.state();

        if state.accounts.iter().any(|other| other.handle == account.handle) {
            return Err(StoreError::Conflict("handle"));
        }
        if state.accounts.iter().any(|other| other.email == account.email) {
            return Err(StoreError::Conflict("email"));
        }

        let account = Account::create(Id::generate(), account, UtcDateTime::now());
        debug!(account_id = %account.id, handle = account.handle.get(), "Creating account");
        state.accounts.push(account.clone());

        Ok(account)
    }

    async fn update_account(
        &self,
        account_id: &Id<AccountMarker>,
        update: UpdateAccount,
    ) -> Result<Account> {
        let mut state = self.state();
        let account = state
            .accounts
            .iter_mut()
            .find(|account| &account.id == account_id)
            .ok_or_else(|| StoreError::AccountNotFound(account_id.clone()))?;

        account.apply_update(update);
        debug!(%account_id, "Updated account");

        Ok(account.clone())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.state().posts.clone())
    }

    async fn fetch_post(&self, post_id: &Id<PostMarker>) -> Result<Option<Post>> {
        let state = self.state();
        let post = state.posts.iter().find(|post| &post.id == post_id);

        Ok(post.cloned())
    }

    async fn fetch_account_posts(
        &self,
        account_id: &Id<AccountMarker>,
    ) -> Result<Option<Vec<Post>>> {
        let state = self.state();
        if state.account(account_id).is_none() {
            return Ok(None);
        }

        let posts = state
            .posts
            .iter()
            .filter(|post| &post.author == account_id)
            .cloned()
            .collect();

        Ok(Some(posts))
    }

    async fn create_post(&self, post: CreatePost) -> Result<Post> {
        let mut state = self.state();
        if state.account(&post.author).is_none() {
            return Err(StoreError::AccountNotFound(post.author));
        }

        let post = Post::create(Id::generate(), post, UtcDateTime::now());
        debug!(post_id = %post.id, author = %post.author, tags = ?post.tags, "Creating post");
        state.posts.insert(0, post.clone());

        Ok(post)
    }

    async fn like_post(
        &self,
        post_id: &Id<PostMarker>,
        account: &Id<AccountMarker>,
    ) -> Result<Post> {
        let mut state = self.state();
        let post = state.post_mut(post_id)?;

        if apply_like(post, account.clone()) {
            debug!(%post_id, %account, "Liked post");
        }

        Ok(post.clone())
    }

    async fn unlike_post(
        &self,
        post_id: &Id<PostMarker>,
        account: &Id<AccountMarker>,
    ) -> Result<Post> {
        let mut state = self.state();
        let post = state.post_mut(post_id)?;

        if apply_unlike(post, account) {
            debug!(%post_id, %account, "Unliked post");
        }

        Ok(post.clone())
    }

    async fn add_comment(
        &self,
        post_id: &Id<PostMarker>,
        author: &Id<AccountMarker>,
        body: String,
    ) -> Result<Comment> {
        let mut state = self.state();
        if state.account(author).is_none() {
            return Err(StoreError::AccountNotFound(author.clone()));
        }

        let post = state.post_mut(post_id)?;
        let comment = add_comment(post, author.clone(), body).clone();
        debug!(%post_id, comment_id = %comment.id, "Added comment");

        Ok(comment)
    }

    async fn fetch_comments(&self, post_id: &Id<PostMarker>) -> Result<Option<Vec<Comment>>> {
        let state = self.state();
        let comments = state
            .posts
            .iter()
            .find(|post| &post.id == post_id)
            .map(|post| post.comments.clone());

        Ok(comments)
    }

    async fn create_session(&self, session: Session) -> Result<()> {
        let mut state = self.state();
        if state.account(&session.account).is_none() {
            return Err(StoreError::AccountNotFound(session.account));
        }

        state.sessions.push(session);
        Ok(())
    }

    async fn fetch_session(&self, token_hash: &SessionTokenHash) -> Result<Option<Session>> {
        let state = self.state();
        let session = state
            .sessions
            .iter()
            .find(|session| &session.token_hash == token_hash);

        Ok(session.cloned())
    }

    async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<bool> {
        let mut state = self.state();
        let before = state.sessions.len();
        state
            .sessions
            .retain(|session| &session.token_hash != token_hash);

        Ok(state.sessions.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use crate::{MemoryStore, Store, StoreError};
    use murmur_common::model::{
        Id,
        account::{CreateAccount, Email, UpdateAccount, UserHandle},
        auth::{AuthToken, Session},
        media::Media,
        post::CreatePost,
    };
    use time::UtcDateTime;

    fn demo_store() -> MemoryStore {
        MemoryStore::with_demo_data().unwrap()
    }

    fn new_account(handle: &str, email: &str) -> CreateAccount {
        CreateAccount {
            handle: UserHandle::new(handle.to_owned()).unwrap(),
            email: Email::new(email.to_owned()).unwrap(),
            display_name: handle.to_owned(),
            bio: String::new(),
            avatar: String::new(),
        }
    }

    #[tokio::test]
    async fn demo_data_is_loaded() {
        let store = demo_store();

        assert_eq!(store.list_accounts().await.unwrap().len(), 3);
        assert_eq!(store.list_posts().await.unwrap().len(), 3);

        let jane = store
            .fetch_account_by_email("jane@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(jane.id, Id::from("2"));
        assert_eq!(
            store
                .fetch_account_by_handle("mike_wilson")
                .await
                .unwrap()
                .map(|account| account.id),
            Some(Id::from("3"))
        );
    }

    #[tokio::test]
    async fn handle_and_email_are_unique() {
        let store = demo_store();

        let taken_handle = store
            .create_account(new_account("john_doe", "other@example.com"))
            .await;
        assert!(matches!(taken_handle, Err(StoreError::Conflict("handle"))));

        let taken_email = store
            .create_account(new_account("johnny", "john@example.com"))
            .await;
        assert!(matches!(taken_email, Err(StoreError::Conflict("email"))));

        let created = store
            .create_account(new_account("johnny", "johnny@example.com"))
            .await
            .unwrap();
        assert!(created.followers.is_empty());
        assert_eq!(store.fetch_account(&created.id).await.unwrap(), Some(created.clone()));

        let ids: Vec<_> = store
            .list_accounts()
            .await
            .unwrap()
            .into_iter()
            .map(|account| account.id)
            .collect();
        assert_eq!(ids, [Id::from("1"), Id::from("2"), Id::from("3"), created.id]);
    }

    #[tokio::test]
    async fn update_account_changes_profile() {
        let store = demo_store();
        let updated = store
            .update_account(
                &"3".into(),
                UpdateAccount {
                    bio: Some("Now in Lisbon".to_owned()),
                    ..UpdateAccount::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio, "Now in Lisbon");
        assert_eq!(updated.display_name, "Mike Wilson");

        let missing = store
            .update_account(&"404".into(), UpdateAccount::default())
            .await;
        assert!(matches!(missing, Err(StoreError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn new_posts_come_first_with_derived_tags() {
        let store = demo_store();

        let post = store
            .create_post(CreatePost {
                author: "2".into(),
                content: "Hello #World, #world!".to_owned(),
                media: Media::None,
            })
            .await
            .unwrap();
        assert_eq!(post.tags, ["World", "world"]);

        let posts = store.list_posts().await.unwrap();
        assert_eq!(posts.len(), 4);
        assert_eq!(posts[0].id, post.id);

        let janes = store.fetch_account_posts(&"2".into()).await.unwrap().unwrap();
        assert_eq!(janes.len(), 2);
        assert_eq!(janes[0].id, post.id);
    }

    #[tokio::test]
    async fn posts_need_an_existing_author() {
        let store = demo_store();
        let result = store
            .create_post(CreatePost {
                author: "404".into(),
                content: "ghost".to_owned(),
                media: Media::None,
            })
            .await;

        assert!(matches!(result, Err(StoreError::AccountNotFound(_))));
        assert_eq!(store.fetch_account_posts(&"404".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn like_scenario() {
        let store = demo_store();
        let post = store
            .create_post(CreatePost {
                author: "1".into(),
                content: "Hello #World, #world!".to_owned(),
                media: Media::None,
            })
            .await
            .unwrap();

        store.like_post(&post.id, &"2".into()).await.unwrap();
        let liked = store.like_post(&post.id, &"2".into()).await.unwrap();
        assert_eq!(liked.likes.into_inner(), [Id::from("2")]);

        let unliked = store.unlike_post(&post.id, &"3".into()).await.unwrap();
        assert_eq!(unliked.likes.into_inner(), [Id::from("2")]);

        let stored = store.fetch_post(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.like_count(), 1);
    }

    #[tokio::test]
    async fn liking_a_missing_post_fails() {
        let store = demo_store();
        let result = store.like_post(&"404".into(), &"1".into()).await;

        assert!(matches!(result, Err(StoreError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn comments_append_to_the_post() {
        let store = demo_store();

        let comment = store
            .add_comment(&"3".into(), &"1".into(), "Stunning colours".to_owned())
            .await
            .unwrap();
        assert_eq!(comment.post, Id::from("3"));

        let comments = store.fetch_comments(&"3".into()).await.unwrap().unwrap();
        assert_eq!(comments, [comment]);

        let on_first = store.fetch_comments(&"1".into()).await.unwrap().unwrap();
        assert_eq!(on_first.len(), 2);
        assert!(on_first[0].created_at < on_first[1].created_at);

        assert_eq!(store.fetch_comments(&"404".into()).await.unwrap(), None);
        let by_ghost = store
            .add_comment(&"3".into(), &"404".into(), "boo".to_owned())
            .await;
        assert!(matches!(by_ghost, Err(StoreError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn sessions_live_until_deleted() {
        let store = demo_store();
        let token_hash = AuthToken::generate_random("1".into()).hash().unwrap();

        store
            .create_session(Session {
                account: "1".into(),
                token_hash: token_hash.clone(),
                created_at: UtcDateTime::now(),
            })
            .await
            .unwrap();

        let session = store.fetch_session(&token_hash).await.unwrap().unwrap();
        assert_eq!(session.account, Id::from("1"));

        assert!(store.delete_session(&token_hash).await.unwrap());
        assert!(!store.delete_session(&token_hash).await.unwrap());
        assert_eq!(store.fetch_session(&token_hash).await.unwrap(), None);
    }
}
