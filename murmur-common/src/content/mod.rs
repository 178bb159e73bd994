//! Operations over posts: hashtag extraction, likes, comments and search.
//!
//! All of them are plain functions over the records in [`crate::model`];
//! persisting the result is up to the store that calls them.

mod comments;
mod likes;
mod search;
mod tags;

pub use comments::add_comment;
pub use likes::{apply_like, apply_unlike};
pub use search::search;
pub use tags::extract_tags;
