// Copyright 2025 The MakerRepo Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The session store is the only durable state of the client.
//!
//! It's a plain key/value store, shaped like browser local storage, holding
//! two keys: [`TOKEN_KEY`] with the raw bearer token and [`USER_KEY`] with
//! the JSON-serialized [`UserProfile`]. Every write replaces the whole value
//! of a key.
//!
//! The [`SessionStoreExt`] trait, implemented for every store, adds the
//! session-level operations on top of the raw key/value access.

use std::{fmt, io, sync::Arc};

use async_trait::async_trait;
use tracing::warn;

use crate::session::{Session, UserProfile};

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// The key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// The key holding the JSON-serialized user profile.
pub const USER_KEY: &str = "user";

/// Session store specific error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An error happened in the underlying storage backend.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
    /// An IO error happened while reading or writing a stored value.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error happened while serializing some data.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a new [`Backend`][Self::Backend] error.
    #[inline]
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(error))
    }
}

/// A `SessionStore` specific result type.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// An abstract key/value store the client keeps its session in.
#[async_trait]
pub trait SessionStore: fmt::Debug + Send + Sync {
    /// Get the value stored under `key`, if any.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> Result<()>;

    /// Remove the value stored under `key`. Removing a missing key is not an
    /// error.
    async fn remove_item(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key).await
    }
}

/// A type-erased [`SessionStore`].
pub type DynSessionStore = dyn SessionStore;

/// Session-level operations, available on every [`SessionStore`].
#[async_trait]
pub trait SessionStoreExt: SessionStore {
    /// Persist a session.
    ///
    /// This is two sequential writes, the token first, without rollback if
    /// the second one fails.
    async fn set_session(&self, token: &str, user: &UserProfile) -> Result<()> {
        let user = serde_json::to_string(user)?;
        self.set_item(TOKEN_KEY, token.to_owned()).await?;
        self.set_item(USER_KEY, user).await
    }

    /// Replace only the stored user profile.
    async fn set_user(&self, user: &UserProfile) -> Result<()> {
        self.set_item(USER_KEY, serde_json::to_string(user)?).await
    }

    /// Get the stored token.
    ///
    /// An empty token counts as no token.
    async fn get_token(&self) -> Result<Option<String>> {
        Ok(self.get_item(TOKEN_KEY).await?.filter(|t| !t.is_empty()))
    }

    /// Get the stored user profile.
    ///
    /// Returns `None` when there is no profile or when the stored value
    /// can't be parsed; the parse error is logged and otherwise swallowed.
    async fn get_user(&self) -> Result<Option<UserProfile>> {
        let Some(raw) = self.get_item(USER_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(error) => {
                warn!(?error, "Ignoring a malformed user profile in the session store");
                Ok(None)
            }
        }
    }

    /// Get the full session, if both the token and a valid profile are
    /// stored.
    async fn get_session(&self) -> Result<Option<Session>> {
        let Some(token) = self.get_token().await? else {
            return Ok(None);
        };

        Ok(self.get_user().await?.map(|user| Session { token, user }))
    }

    /// Remove both the token and the user profile.
    async fn clear_session(&self) -> Result<()> {
        self.remove_item(TOKEN_KEY).await?;
        self.remove_item(USER_KEY).await
    }
}

impl<T: SessionStore + ?Sized> SessionStoreExt for T {}
