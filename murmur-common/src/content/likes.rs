use crate::model::{Id, account::AccountMarker, post::Post};

/// Adds `account` to the post's likers unless it is already there.
///
/// The account is not checked against any store. Returns whether the likes changed.
pub fn apply_like(post: &mut Post, account: Id<AccountMarker>) -> bool {
    post.likes.insert(account)
}

/// Removes `account` from the post's likers if present. Returns whether the likes changed.
pub fn apply_unlike(post: &mut Post, account: &Id<AccountMarker>) -> bool {
    post.likes.remove(account)
}

#[cfg(test)]
mod tests {
    use super::{apply_like, apply_unlike};
    use crate::model::{
        Id,
        media::Media,
        post::{CreatePost, Post},
    };
    use time::macros::utc_datetime;

    fn post(content: &str) -> Post {
        Post::create(
            "p".into(),
            CreatePost {
                author: "1".into(),
                content: content.to_owned(),
                media: Media::None,
            },
            utc_datetime!(2024-01-15 09:00),
        )
    }

    #[test]
    fn like_is_idempotent() {
        let mut once = post("hi");
        apply_like(&mut once, "2".into());

        let mut twice = post("hi");
        assert!(apply_like(&mut twice, "2".into()));
        assert!(!apply_like(&mut twice, "2".into()));

        assert_eq!(once.likes, twice.likes);
        assert_eq!(twice.like_count(), 1);
    }

    #[test]
    fn unlike_of_absent_account_is_a_no_op() {
        let mut post = post("hi");
        apply_like(&mut post, "2".into());
        let before = post.likes.clone();

        assert!(!apply_unlike(&mut post, &"3".into()));
        assert_eq!(post.likes, before);
    }

    #[test]
    fn unlike_removes_only_that_account() {
        let mut post = post("hi");
        apply_like(&mut post, "1".into());
        apply_like(&mut post, "2".into());

        assert!(apply_unlike(&mut post, &"1".into()));
        assert!(!post.is_liked_by(&"1".into()));
        assert!(post.is_liked_by(&"2".into()));
    }

    #[test]
    fn hello_world_scenario() {
        let mut post = post("Hello #World, #world!");
        assert_eq!(post.tags, ["World", "world"]);

        apply_like(&mut post, "2".into());
        apply_like(&mut post, "2".into());
        assert_eq!(post.likes.iter().cloned().collect::<Vec<_>>(), [Id::from("2")]);

        apply_unlike(&mut post, &"3".into());
        assert_eq!(post.likes.iter().cloned().collect::<Vec<_>>(), [Id::from("2")]);
    }
}
