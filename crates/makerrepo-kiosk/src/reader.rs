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

use std::{fmt, sync::Mutex};

use futures_util::stream::{self, BoxStream, StreamExt};
use makerrepo_sdk::rfid::{NfcReader, RfidError};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

/// A card reader that types the serial of each tapped card followed by a
/// newline, like most USB readers in keyboard emulation mode do.
///
/// Blank lines are skipped. The reader can only be scanned once.
pub struct LineNfcReader<R> {
    input: Mutex<Option<R>>,
}

impl LineNfcReader<BufReader<Stdin>> {
    /// A reader typing into the standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R> LineNfcReader<R> {
    /// A reader typing into `input`.
    pub fn new(input: R) -> Self {
        Self { input: Mutex::new(Some(input)) }
    }
}

impl<R> fmt::Debug for LineNfcReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineNfcReader").finish_non_exhaustive()
    }
}

impl<R> NfcReader for LineNfcReader<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn is_supported(&self) -> bool {
        true
    }

    fn scan(&self) -> Result<BoxStream<'static, String>, RfidError> {
        let input = self
            .input
            .lock()
            .map_err(|_| RfidError::ScanFailed("the reader is poisoned".to_owned()))?
            .take()
            .ok_or_else(|| RfidError::ScanFailed("the reader is already scanning".to_owned()))?;

        let lines = stream::unfold(input.lines(), |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((line, lines)),
                Ok(None) => None,
                Err(error) => {
                    warn!(?error, "Couldn't read from the card reader");
                    None
                }
            }
        });

        Ok(lines.filter(|line| futures_util::future::ready(!line.trim().is_empty())).boxed())
    }
}
