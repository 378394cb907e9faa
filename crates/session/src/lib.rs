//! Opaque session tokens backed by a key-value store
//!
//! The broker never hands provider tokens to the browser. Instead each login
//! produces an opaque token that keys a field group in the session store;
//! the provider's access/refresh tokens live server-side in that group. This
//! crate owns the token lifecycle: issue on login, resolve on every request,
//! rotate on refresh (with a grace overlap for in-flight requests), revoke
//! on logout.
//!
//! The store is the single source of truth. There is no in-process session
//! cache, so there is no invalidation to get wrong.

pub mod error;
pub mod manager;
pub mod record;
pub mod redis_store;
pub mod store;

pub use error::{Error, Result};
pub use manager::{ROTATION_GRACE, SessionManager};
pub use record::SessionRecord;
pub use redis_store::RedisSessionStore;
pub use store::{MemoryStore, SessionStore};
