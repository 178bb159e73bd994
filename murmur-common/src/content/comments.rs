use crate::model::{
    Id,
    account::AccountMarker,
    post::{Comment, Post},
};
use time::UtcDateTime;

/// Appends a new comment by `author` to the end of the post's comments.
///
/// The body is taken as is; rejecting empty submissions is the caller's job.
pub fn add_comment(post: &mut Post, author: Id<AccountMarker>, body: String) -> &Comment {
    let index = post.comments.len();
    post.comments.push(Comment {
        id: Id::generate(),
        post: post.id.clone(),
        author,
        content: body,
        created_at: UtcDateTime::now(),
    });

    &post.comments[index]
}

#[cfg(test)]
mod tests {
    use super::add_comment;
    use crate::model::{
        Id,
        media::Media,
        post::{CreatePost, Post},
    };
    use time::macros::utc_datetime;

    #[test]
    fn comments_are_appended_in_call_order() {
        let mut post = Post::create(
            "p1".into(),
            CreatePost {
                author: "1".into(),
                content: "Just finished building this app".to_owned(),
                media: Media::None,
            },
            utc_datetime!(2024-01-15 09:00),
        );

        let inputs = [("2", "This looks amazing!"), ("3", "So clean"), ("2", "")];
        for (author, body) in inputs {
            let comment = add_comment(&mut post, author.into(), body.to_owned());
            assert_eq!(comment.content, body);
        }

        assert_eq!(post.comments.len(), inputs.len());
        for (comment, (author, body)) in post.comments.iter().zip(inputs) {
            assert_eq!(comment.post, Id::from("p1"));
            assert_eq!(comment.author, Id::from(author));
            assert_eq!(comment.content, body);
        }
        assert_ne!(post.comments[0].id, post.comments[1].id);
        assert!(post.comments[0].created_at <= post.comments[2].created_at);
    }
}
