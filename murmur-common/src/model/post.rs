use crate::{
    content::extract_tags,
    model::{Id, account::AccountMarker, media::Media},
};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: Id<AccountMarker>,
    pub content: String,
    pub media: Media,
    /// The hashtags of `content` at creation time, `#` stripped.
    pub tags: Vec<String>,
    pub likes: Likes,
    /// Oldest first.
    pub comments: Vec<Comment>,
    #[serde(with = "crate::model::timestamp")]
    pub created_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CreatePost {
    pub author: Id<AccountMarker>,
    pub content: String,
    pub media: Media,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub post: Id<PostMarker>,
    pub author: Id<AccountMarker>,
    pub content: String,
    #[serde(with = "crate::model::timestamp")]
    pub created_at: UtcDateTime,
}

/// Accounts that liked a post. Holds each account at most once, in the order they liked.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Likes(Vec<Id<AccountMarker>>);

impl Post {
    /// Builds a fresh post, deriving its tags from the content.
    #[must_use]
    pub fn create(id: Id<PostMarker>, post: CreatePost, created_at: UtcDateTime) -> Self {
        let tags = extract_tags(&post.content);

        Self {
            id,
            author: post.author,
            content: post.content,
            media: post.media,
            tags,
            likes: Likes::default(),
            comments: Vec::new(),
            created_at,
        }
    }

    #[must_use]
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    #[must_use]
    pub fn is_liked_by(&self, account: &Id<AccountMarker>) -> bool {
        self.likes.contains(account)
    }
}

impl Likes {
    #[must_use]
    pub fn contains(&self, account: &Id<AccountMarker>) -> bool {
        self.0.contains(account)
    }

    /// Returns whether the account was newly added.
    pub fn insert(&mut self, account: Id<AccountMarker>) -> bool {
        if self.contains(&account) {
            return false;
        }
        self.0.push(account);
        true
    }

    /// Returns whether the account was present.
    pub fn remove(&mut self, account: &Id<AccountMarker>) -> bool {
        let before = self.0.len();
        self.0.retain(|liker| liker != account);
        self.0.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Id<AccountMarker>> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Id<AccountMarker>> {
        self.0
    }
}

impl FromIterator<Id<AccountMarker>> for Likes {
    fn from_iter<T: IntoIterator<Item = Id<AccountMarker>>>(iter: T) -> Self {
        let mut likes = Likes::default();
        for account in iter {
            likes.insert(account);
        }
        likes
    }
}

impl<'de> Deserialize<'de> for Likes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Id<AccountMarker>>::deserialize(deserializer).map(Likes::from_iter)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        media::Media,
        post::{Comment, CreatePost, Likes, Post},
    };
    use time::macros::utc_datetime;

    #[test]
    fn create_derives_tags_and_starts_empty() {
        let post = Post::create(
            "p1".into(),
            CreatePost {
                author: "1".into(),
                content: "Sunset #photography #nature".to_owned(),
                media: Media::None,
            },
            utc_datetime!(2024-01-13 18:30),
        );

        assert_eq!(post.tags, ["photography", "nature"]);
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
        assert_eq!(post.like_count(), 0);
    }

    #[test]
    fn timestamps_serialize_as_rfc3339_strings() {
        let mut post = Post::create(
            "p1".into(),
            CreatePost {
                author: "1".into(),
                content: "Morning".to_owned(),
                media: Media::None,
            },
            utc_datetime!(2024-01-15 09:00),
        );
        post.comments.push(Comment {
            id: "c1".into(),
            post: post.id.clone(),
            author: "2".into(),
            content: "Hi".to_owned(),
            created_at: utc_datetime!(2024-01-15 10:30),
        });

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["created_at"], "2024-01-15T09:00:00Z");
        assert_eq!(json["comments"][0]["created_at"], "2024-01-15T10:30:00Z");

        let back: Post = serde_json::from_value(json).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn likes_collapse_duplicates() {
        let likes: Likes = ["1", "2", "1"].into_iter().map(Id::from).collect();
        assert_eq!(likes.len(), 2);

        let from_json: Likes = serde_json::from_str(r#"["3","3"]"#).unwrap();
        assert_eq!(from_json.into_inner(), [Id::from("3")]);
    }
}
