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

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument};

use super::{Result, SessionStore, StoreError};

/// A `SessionStore` keeping every key in its own file inside a directory.
///
/// A write goes to a temporary file first which is then renamed over the
/// previous value, so a reader sees either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store located at `path`, creating the directory if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        fs::create_dir_all(&path).await?;
        debug!(path = %path.display(), "Opened the session store");

        Ok(Self { path })
    }

    /// The directory this store lives in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn item_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !valid {
            return Err(StoreError::backend(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid session store key: {key:?}"),
            )));
        }

        Ok(self.path.join(key))
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.item_path(key)?).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value))]
    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let target = self.item_path(key)?;
        let tmp = self.path.join(format!(".{key}.tmp"));

        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &target).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.item_path(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
