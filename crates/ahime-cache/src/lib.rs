//! Typed key-value storage for the Ahimè storefront.
//!
//! Values are serialized to JSON and kept in a [`KvBackend`]: either in
//! memory or in a directory on disk. [`Session`] layers versioned,
//! per-visitor records on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use ahime_cache::{Cache, Session, SessionId};
//!
//! let cache = Cache::open_dir(".ahime/sessions")?;
//! cache.set("cart:sess_abc", &cart)?;
//! let cart: Option<Cart> = cache.get("cart:sess_abc")?;
//!
//! let sessions = Session::<Snapshot>::new(cache);
//! sessions.update(&SessionId::from("sess_abc"), |s| s.touch())?;
//! ```

mod backend;
mod error;
mod kv;
mod session;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;
pub use session::{Session, SessionData, SessionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KvBackend, Session, SessionId};
}
