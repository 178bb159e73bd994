use murmur_common::model::{
    ModelValidationError,
    account::{Account, Email, UserHandle},
    auth::Session,
    media::Media,
    post::{Comment, Post},
};
use sqlx::FromRow;
use time::{Duration, PrimitiveDateTime, UtcDateTime};

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct AccountRecord {
    pub account_id: String,
    pub handle: String,
    pub email: String,
    pub display_name: String,
    pub bio: String,
    pub avatar: String,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub created_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub post_id: String,
    pub account_id: String,
    pub content: String,
    pub media_type: Option<String>,
    pub media_url: Option<String>,
    pub tags: Vec<String>,
    pub likes: Vec<String>,
    pub created_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct CommentRecord {
    pub comment_id: String,
    pub post_id: String,
    pub account_id: String,
    pub content: String,
    pub created_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct SessionRecord {
    pub token_hash: Vec<u8>,
    pub account_id: String,
    pub created_at: PrimitiveDateTime,
}

/// Drops the nanoseconds a `TIMESTAMP` column cannot hold, so a record
/// written now reads back unchanged.
pub(crate) fn column_precision(time: UtcDateTime) -> UtcDateTime {
    time - Duration::nanoseconds(i64::from(time.nanosecond() % 1_000))
}

/// Timestamps are stored as `TIMESTAMP` columns holding UTC.
pub(crate) fn to_column(time: UtcDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(time.date(), time.time())
}

fn from_column(time: PrimitiveDateTime) -> UtcDateTime {
    UtcDateTime::new(time.date(), time.time())
}

impl TryFrom<AccountRecord> for Account {
    type Error = ModelValidationError;

    fn try_from(value: AccountRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.account_id.into(),
            handle: UserHandle::new(value.handle)?,
            email: Email::new(value.email)?,
            display_name: value.display_name,
            bio: value.bio,
            avatar: value.avatar,
            followers: value.followers.into_iter().map(Into::into).collect(),
            following: value.following.into_iter().map(Into::into).collect(),
            created_at: from_column(value.created_at),
        })
    }
}

impl From<CommentRecord> for Comment {
    fn from(value: CommentRecord) -> Self {
        Self {
            id: value.comment_id.into(),
            post: value.post_id.into(),
            author: value.account_id.into(),
            content: value.content,
            created_at: from_column(value.created_at),
        }
    }
}

impl PostRecord {
    /// `comments` must belong to this post and be ordered oldest first.
    pub fn into_post(self, comments: Vec<Comment>) -> Result<Post, ModelValidationError> {
        Ok(Post {
            id: self.post_id.into(),
            author: self.account_id.into(),
            content: self.content,
            media: Media::from_columns(self.media_type.as_deref(), self.media_url)?,
            tags: self.tags,
            likes: self.likes.into_iter().map(Into::into).collect(),
            comments,
            created_at: from_column(self.created_at),
        })
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = ModelValidationError;

    fn try_from(value: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            account: value.account_id.into(),
            token_hash: value.token_hash.into_boxed_slice().try_into()?,
            created_at: from_column(value.created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::{PostRecord, column_precision, from_column, to_column};
    use murmur_common::model::{Id, media::Media};
    use time::macros::{datetime, utc_datetime};

    #[test]
    fn timestamps_survive_the_column_type() {
        let time = utc_datetime!(2024-01-15 10:30:12.5);
        assert_eq!(from_column(to_column(time)), time);
    }

    #[test]
    fn column_precision_keeps_microseconds() {
        let time = utc_datetime!(2024-01-15 10:30:12.123456789);
        assert_eq!(column_precision(time), utc_datetime!(2024-01-15 10:30:12.123456));

        let whole = utc_datetime!(2024-01-15 10:30:12.5);
        assert_eq!(column_precision(whole), whole);
        assert_eq!(from_column(to_column(column_precision(time))), column_precision(time));
    }

    #[test]
    fn post_record_rebuilds_media_and_likes() {
        let record = PostRecord {
            post_id: "p".to_owned(),
            account_id: "1".to_owned(),
            content: "clip #video".to_owned(),
            media_type: Some("video".to_owned()),
            media_url: Some("https://example.com/v.mp4".to_owned()),
            tags: vec!["video".to_owned()],
            likes: vec!["2".to_owned(), "2".to_owned()],
            created_at: datetime!(2024-01-15 09:00),
        };

        let post = record.into_post(Vec::new()).unwrap();
        assert_eq!(post.media.url(), Some("https://example.com/v.mp4"));
        assert!(matches!(post.media, Media::Video { .. }));
        assert_eq!(post.likes.into_inner(), [Id::from("2")]);
    }
}
