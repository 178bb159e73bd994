use crate::{
    record::{
        AccountRecord, CommentRecord, PostRecord, SessionRecord, column_precision, to_column,
    },
    store::{Result, Store, StoreError},
};
use async_trait::async_trait;
use murmur_common::{
    content::{add_comment, apply_like, apply_unlike},
    model::{
        Id,
        account::{Account, AccountMarker, CreateAccount, UpdateAccount},
        auth::{Session, SessionTokenHash},
        post::{Comment, CreatePost, Post, PostMarker},
    },
};
use sqlx::{PgPool, postgres::PgPoolOptions, query, query_as, query_scalar, raw_sql};
use std::collections::HashMap;
use time::UtcDateTime;
use tracing::{debug, info};

const SCHEMA: &str = include_str!("../schema.sql");

const ACCOUNT_COLUMNS: &str = "
    account_id, handle, email, display_name, bio, avatar, followers, following, created_at
";

const POST_COLUMNS: &str = "
    post_id, account_id, content, media_type, media_url, tags, likes, created_at
";

/// Stores records in `PostgreSQL`.
///
/// Every call takes one pooled connection per statement and none of them run
/// in a transaction. Liking and unliking read the liker list and write it back,
/// so two concurrent likes on the same post can lose one of them.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

fn unique_violation(err: &sqlx::Error) -> Option<&'static str> {
    if let sqlx::Error::Database(db_err) = err
        && db_err.is_unique_violation()
    {
        let field = if db_err.constraint().is_some_and(|name| name.contains("email")) {
            "email"
        } else {
            "handle"
        };
        return Some(field);
    }
    None
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Creates any missing tables and indexes.
    pub async fn init_schema(&self) -> Result<()> {
        raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("Database schema is ready");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn posts_with_comments(&self, records: Vec<PostRecord>) -> Result<Vec<Post>> {
        let post_ids: Vec<String> = records.iter().map(|record| record.post_id.clone()).collect();

        let comment_records = query_as::<_, CommentRecord>(
            "
            SELECT comment_id, post_id, account_id, content, created_at
            FROM comments
            WHERE post_id = ANY($1)
            ORDER BY created_at ASC, comment_id ASC
            ",
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut comments_by_post: HashMap<String, Vec<Comment>> = HashMap::new();
        for record in comment_records {
            comments_by_post
                .entry(record.post_id.clone())
                .or_default()
                .push(record.into());
        }

        let posts = records
            .into_iter()
            .map(|record| {
                let comments = comments_by_post.remove(&record.post_id).unwrap_or_default();
                record.into_post(comments)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    async fn write_likes(&self, post: &Post) -> Result<()> {
        let likes: Vec<String> = post
            .likes
            .iter()
            .map(|account| account.as_str().to_owned())
            .collect();

        query("UPDATE posts SET likes = $2 WHERE post_id = $1")
            .bind(post.id.as_str())
            .bind(likes)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn require_post(&self, post_id: &Id<PostMarker>) -> Result<Post> {
        self.fetch_post(post_id)
            .await?
            .ok_or_else(|| StoreError::PostNotFound(post_id.clone()))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let records = query_as::<_, AccountRecord>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at ASC, account_id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let accounts = records
            .into_iter()
            .map(Account::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    async fn fetch_account(&self, account_id: &Id<AccountMarker>) -> Result<Option<Account>> {
        let record = query_as::<_, AccountRecord>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1"
        ))
        .bind(account_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let account = record.map(Account::try_from).transpose()?;
        Ok(account)
    }

    async fn fetch_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let record = query_as::<_, AccountRecord>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let account = record.map(Account::try_from).transpose()?;
        Ok(account)
    }

    async fn fetch_account_by_handle(&self, handle: &str) -> Result<Option<Account>> {
        let record = query_as::<_, AccountRecord>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE handle = $1"
        ))
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;

        let account = record.map(Account::try_from).transpose()?;
        Ok(account)
    }

    async fn create_account(&self, account: CreateAccount) -> Result<Account> {
        let created_at = column_precision(UtcDateTime::now());
        let account = Account::create(Id::generate(), account, created_at);

        query(
            "
            INSERT INTO accounts (account_id, handle, email, display_name, bio, avatar, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(account.id.as_str())
        .bind(account.handle.get())
        .bind(account.email.get())
        .bind(&account.display_name)
        .bind(&account.bio)
        .bind(&account.avatar)
        .bind(to_column(account.created_at))
        .execute(&self.pool)
        .await
        .map_err(|err| match unique_violation(&err) {
            Some(field) => StoreError::Conflict(field),
            None => StoreError::Sqlx(err),
        })?;

        debug!(account_id = %account.id, handle = account.handle.get(), "Created account");
        Ok(account)
    }

    async fn update_account(
        &self,
        account_id: &Id<AccountMarker>,
        update: UpdateAccount,
    ) -> Result<Account> {
        let record = query_as::<_, AccountRecord>(&format!(
            "
            UPDATE accounts SET
                display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                avatar = COALESCE($4, avatar)
            WHERE account_id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(account_id.as_str())
        .bind(update.display_name)
        .bind(update.bio)
        .bind(update.avatar)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::AccountNotFound(account_id.clone()))?;

        debug!(%account_id, "Updated account");
        Ok(Account::try_from(record)?)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.posts_with_comments(records).await
    }

    async fn fetch_post(&self, post_id: &Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE post_id = $1"
        ))
        .bind(post_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => Ok(self.posts_with_comments(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn fetch_account_posts(
        &self,
        account_id: &Id<AccountMarker>,
    ) -> Result<Option<Vec<Post>>> {
        let account_exists: bool =
            query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE account_id = $1)")
                .bind(account_id.as_str())
                .fetch_one(&self.pool)
                .await?;
        if !account_exists {
            return Ok(None);
        }

        let records = query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE account_id = $1 ORDER BY created_at DESC"
        ))
        .bind(account_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(self.posts_with_comments(records).await?))
    }

    async fn create_post(&self, post: CreatePost) -> Result<Post> {
        let created_at = column_precision(UtcDateTime::now());
        let post = Post::create(Id::generate(), post, created_at);

        query(
            "
            INSERT INTO posts (post_id, account_id, content, media_type, media_url, tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(post.id.as_str())
        .bind(post.author.as_str())
        .bind(&post.content)
        .bind(post.media.kind().map(|kind| kind.as_str()))
        .bind(post.media.url())
        .bind(post.tags.clone())
        .bind(to_column(post.created_at))
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                StoreError::AccountNotFound(post.author.clone())
            } else {
                StoreError::Sqlx(err)
            }
        })?;

        debug!(post_id = %post.id, author = %post.author, tags = ?post.tags, "Created post");
        Ok(post)
    }

    async fn like_post(
        &self,
        post_id: &Id<PostMarker>,
        account: &Id<AccountMarker>,
    ) -> Result<Post> {
        let mut post = self.require_post(post_id).await?;

        if apply_like(&mut post, account.clone()) {
            self.write_likes(&post).await?;
            debug!(%post_id, %account, "Liked post");
        }

        Ok(post)
    }

    async fn unlike_post(
        &self,
        post_id: &Id<PostMarker>,
        account: &Id<AccountMarker>,
    ) -> Result<Post> {
        let mut post = self.require_post(post_id).await?;

        if apply_unlike(&mut post, account) {
            self.write_likes(&post).await?;
            debug!(%post_id, %account, "Unliked post");
        }

        Ok(post)
    }

    async fn add_comment(
        &self,
        post_id: &Id<PostMarker>,
        author: &Id<AccountMarker>,
        body: String,
    ) -> Result<Comment> {
        let mut post = self.require_post(post_id).await?;
        let mut comment = add_comment(&mut post, author.clone(), body).clone();
        comment.created_at = column_precision(comment.created_at);

        query(
            "
            INSERT INTO comments (comment_id, post_id, account_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(comment.id.as_str())
        .bind(comment.post.as_str())
        .bind(comment.author.as_str())
        .bind(&comment.content)
        .bind(to_column(comment.created_at))
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                StoreError::AccountNotFound(author.clone())
            } else {
                StoreError::Sqlx(err)
            }
        })?;

        debug!(%post_id, comment_id = %comment.id, "Added comment");
        Ok(comment)
    }

    async fn fetch_comments(&self, post_id: &Id<PostMarker>) -> Result<Option<Vec<Comment>>> {
        Ok(self.fetch_post(post_id).await?.map(|post| post.comments))
    }

    async fn create_session(&self, session: Session) -> Result<()> {
        query("INSERT INTO sessions (token_hash, account_id, created_at) VALUES ($1, $2, $3)")
            .bind(&session.token_hash.0[..])
            .bind(session.account.as_str())
            .bind(to_column(session.created_at))
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    StoreError::AccountNotFound(session.account.clone())
                } else {
                    StoreError::Sqlx(err)
                }
            })?;

        Ok(())
    }

    async fn fetch_session(&self, token_hash: &SessionTokenHash) -> Result<Option<Session>> {
        let record = query_as::<_, SessionRecord>(
            "SELECT token_hash, account_id, created_at FROM sessions WHERE token_hash = $1",
        )
        .bind(&token_hash.0[..])
        .fetch_optional(&self.pool)
        .await?;

        let session = record.map(Session::try_from).transpose()?;
        Ok(session)
    }

    async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<bool> {
        let result = query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(&token_hash.0[..])
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
