use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedAccount,
    extract::{Json, Query},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use murmur_common::{
    content::search,
    model::{
        Id, ModelValidationError,
        media::{Media, MediaUpload},
        post::{Comment, CreatePost, Post, PostMarker},
    },
};
use murmur_db::Store;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_feed)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_post(like_post)
        .typed_delete(unlike_post)
        .typed_get(get_comments)
        .typed_post(create_comment)
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
struct FeedQuery {
    q: Option<String>,
}

#[derive(TypedPath)]
#[typed_path("/posts")]
struct FeedPath;

/// All posts newest first, narrowed by `q` unless it is blank.
async fn get_feed(
    FeedPath: FeedPath,
    State(store): State<Arc<dyn Store>>,
    Query(FeedQuery { q }): Query<FeedQuery>,
) -> Result<Json<Vec<Post>>> {
    let posts = store.list_posts().await?;

    let posts = match q.filter(|query| !query.trim().is_empty()) {
        Some(query) => search(&query, &posts).into_iter().cloned().collect(),
        None => posts,
    };

    Ok(Json(posts))
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
struct CreatePostRequest {
    #[serde(default)]
    content: String,
    media: Option<MediaUpload>,
}

#[derive(TypedPath)]
#[typed_path("/posts/create")]
struct CreatePostPath;

async fn create_post(
    CreatePostPath: CreatePostPath,
    State(store): State<Arc<dyn Store>>,
    author: AuthenticatedAccount,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    let content = request.content.trim().to_owned();
    let media = request
        .media
        .map(MediaUpload::into_media)
        .transpose()
        .map_err(ModelValidationError::from)?
        .unwrap_or(Media::None);

    if content.is_empty() && media.is_none() {
        return Err(ServerError::EmptyPost);
    }

    let post = store
        .create_post(CreatePost {
            author: author.account_id().clone(),
            content,
            media,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct GetPostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    GetPostPath { id }: GetPostPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Post>> {
    let post = store
        .fetch_post(&id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/like", rejection(ServerError))]
struct LikePath {
    id: Id<PostMarker>,
}

async fn like_post(
    LikePath { id }: LikePath,
    State(store): State<Arc<dyn Store>>,
    account: AuthenticatedAccount,
) -> Result<Json<Post>> {
    let post = store.like_post(&id, account.account_id()).await?;

    Ok(Json(post))
}

async fn unlike_post(
    LikePath { id }: LikePath,
    State(store): State<Arc<dyn Store>>,
    account: AuthenticatedAccount,
) -> Result<Json<Post>> {
    let post = store.unlike_post(&id, account.account_id()).await?;

    Ok(Json(post))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comments", rejection(ServerError))]
struct CommentsPath {
    id: Id<PostMarker>,
}

async fn get_comments(
    CommentsPath { id }: CommentsPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<Comment>>> {
    let comments = store
        .fetch_comments(&id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(comments))
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct CreateCommentRequest {
    content: String,
}

async fn create_comment(
    CommentsPath { id }: CommentsPath,
    State(store): State<Arc<dyn Store>>,
    author: AuthenticatedAccount,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(ServerError::EmptyComment);
    }

    let comment = store
        .add_comment(&id, author.account_id(), content.to_owned())
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
