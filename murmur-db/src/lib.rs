//! Entity storage for accounts, posts, comments and sessions.
//!
//! [`Store`] is the seam the HTTP layer talks to. Two implementations exist:
//! [`MemoryStore`], an owned in-process store usually seeded with demo data,
//! and [`PgStore`], backed by `PostgreSQL`.

pub mod memory;
pub mod postgres;
mod record;
pub mod seed;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Result, Store, StoreError};
