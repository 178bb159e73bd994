//! The demo accounts and posts a fresh [`MemoryStore`](crate::MemoryStore) starts with.

use murmur_common::model::{
    Id, ModelValidationError,
    account::{Account, AccountMarker, CreateAccount, Email, UserHandle},
    media::Media,
    post::{Comment, CreatePost, Post},
};
use std::collections::BTreeSet;
use time::{UtcDateTime, macros::utc_datetime};

fn ids(ids: &[&str]) -> BTreeSet<Id<AccountMarker>> {
    ids.iter().copied().map(Id::from).collect()
}

fn account(
    id: &str,
    handle: &str,
    email: &str,
    display_name: &str,
    bio: &str,
    avatar: &str,
    created_at: UtcDateTime,
) -> Result<Account, ModelValidationError> {
    Ok(Account::create(
        id.into(),
        CreateAccount {
            handle: UserHandle::new(handle.to_owned())?,
            email: Email::new(email.to_owned())?,
            display_name: display_name.to_owned(),
            bio: bio.to_owned(),
            avatar: avatar.to_owned(),
        },
        created_at,
    ))
}

pub fn demo_accounts() -> Result<Vec<Account>, ModelValidationError> {
    let mut john = account(
        "1",
        "john_doe",
        "john@example.com",
        "John Doe",
        "Software developer and tech enthusiast",
        "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face",
        utc_datetime!(2023-01-15 00:00),
    )?;
    john.followers = ids(&["2", "3"]);
    john.following = ids(&["2", "3"]);

    let mut jane = account(
        "2",
        "jane_smith",
        "jane@example.com",
        "Jane Smith",
        "Digital artist and creative designer",
        "https://images.unsplash.com/photo-1494790108755-2616b612b786?w=150&h=150&fit=crop&crop=face",
        utc_datetime!(2023-02-20 00:00),
    )?;
    jane.followers = ids(&["1", "3"]);
    jane.following = ids(&["1"]);

    let mut mike = account(
        "3",
        "mike_wilson",
        "mike@example.com",
        "Mike Wilson",
        "Photography lover and travel blogger",
        "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face",
        utc_datetime!(2023-03-10 00:00),
    )?;
    mike.followers = ids(&["1", "2"]);
    mike.following = ids(&["1", "2"]);

    Ok(vec![john, jane, mike])
}

fn post(id: &str, author: &str, content: &str, image_url: &str, created_at: UtcDateTime) -> Post {
    Post::create(
        id.into(),
        CreatePost {
            author: author.into(),
            content: content.to_owned(),
            media: Media::Image {
                url: image_url.to_owned(),
            },
        },
        created_at,
    )
}

fn comment(id: &str, post: &Post, author: &str, content: &str, created_at: UtcDateTime) -> Comment {
    Comment {
        id: id.into(),
        post: post.id.clone(),
        author: author.into(),
        content: content.to_owned(),
        created_at,
    }
}

/// Newest first, the order the feed shows them in.
#[must_use]
pub fn demo_posts() -> Vec<Post> {
    let mut launch = post(
        "1",
        "1",
        "Just finished building this amazing social media app! 🚀 The features include user \
         profiles, posts, likes, comments, and media uploads. What do you think? \
         #coding #react #typescript",
        "https://images.unsplash.com/photo-1461749280684-dccba630e2f6?w=600&h=400&fit=crop",
        utc_datetime!(2024-01-15 09:00),
    );
    launch.likes = ["2", "3"].into_iter().map(Id::from).collect();
    launch.comments = vec![
        comment(
            "1",
            &launch,
            "2",
            "This looks amazing! Great work! 👏",
            utc_datetime!(2024-01-15 10:30),
        ),
        comment(
            "2",
            &launch,
            "3",
            "The UI is so clean and modern!",
            utc_datetime!(2024-01-15 11:15),
        ),
    ];

    let mut art = post(
        "2",
        "2",
        "Working on some new digital art pieces today. The creative process is always so \
         fulfilling! 🎨 #digitalart #creativity",
        "https://images.unsplash.com/photo-1541961017774-22349e4a1262?w=600&h=400&fit=crop",
        utc_datetime!(2024-01-14 15:00),
    );
    art.likes = ["1", "3"].into_iter().map(Id::from).collect();
    art.comments = vec![comment(
        "3",
        &art,
        "1",
        "Your art is always so inspiring!",
        utc_datetime!(2024-01-14 16:20),
    )];

    let mut sunset = post(
        "3",
        "3",
        "Beautiful sunset at the beach today! Nature never fails to amaze me. 🌅 \
         #photography #nature #sunset",
        "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=600&h=400&fit=crop",
        utc_datetime!(2024-01-13 18:30),
    );
    sunset.likes = ["1", "2"].into_iter().map(Id::from).collect();

    vec![launch, art, sunset]
}
