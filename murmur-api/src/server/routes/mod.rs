use crate::server::ServerRouter;
use axum::Router;

mod accounts;
mod auth;
mod posts;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(auth::routes())
        .merge(accounts::routes())
        .merge(posts::routes())
}
