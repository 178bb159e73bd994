use crate::model::post::Post;

/// Keeps the posts whose content or one of whose tags contains `query`,
/// ignoring case. Input order is preserved.
///
/// An empty query matches everything; callers that want "no filter" for a
/// blank search box should skip the call instead.
pub fn search<'a>(query: &str, posts: impl IntoIterator<Item = &'a Post>) -> Vec<&'a Post> {
    let query = query.to_lowercase();

    posts
        .into_iter()
        .filter(|post| {
            post.content.to_lowercase().contains(&query)
                || post
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&query))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::search;
    use crate::model::{
        Id,
        media::Media,
        post::{CreatePost, Post},
    };
    use time::macros::utc_datetime;

    fn posts() -> Vec<Post> {
        [
            ("1", "Just finished building this app! #coding #react"),
            ("2", "Working on digital art pieces #digitalart #creativity"),
            ("3", "Beautiful sunset. Nature never fails to amaze me. #photography"),
        ]
        .into_iter()
        .map(|(id, content)| {
            Post::create(
                id.into(),
                CreatePost {
                    author: id.into(),
                    content: content.to_owned(),
                    media: Media::None,
                },
                utc_datetime!(2024-01-14 15:00),
            )
        })
        .collect()
    }

    fn ids(found: &[&Post]) -> Vec<Id<crate::model::post::PostMarker>> {
        found.iter().map(|post| post.id.clone()).collect()
    }

    #[test]
    fn body_match_ignores_case() {
        let posts = posts();
        assert_eq!(ids(&search("nature", &posts)), [Id::from("3")]);
        assert_eq!(ids(&search("NATURE", &posts)), [Id::from("3")]);
    }

    #[test]
    fn tag_substring_matches() {
        let mut posts = posts();
        // A tag that no longer appears in the body still counts.
        posts[0].tags.push("Rustacean".to_owned());

        assert_eq!(ids(&search("rustace", &posts)), [Id::from("1")]);
    }

    #[test]
    fn order_follows_input() {
        let posts = posts();
        let reversed: Vec<&Post> = posts.iter().rev().collect();

        assert_eq!(
            ids(&search("#", reversed.iter().copied())),
            [Id::from("3"), Id::from("2"), Id::from("1")]
        );
    }

    #[test]
    fn no_match_is_empty() {
        assert!(search("kubernetes", &posts()).is_empty());
    }
}
