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

//! Testing utilities - DO NOT USE IN PRODUCTION.

#![allow(dead_code)]

use std::sync::Mutex;

use futures_util::stream::{self, BoxStream, StreamExt};
use makerrepo_base::{MemoryStore, Role, SessionStoreExt, UserProfile};
use tokio::sync::mpsc;

use crate::{
    config::Environment,
    rfid::{NfcReader, RfidError},
    AuthState, Client, ClientBuilder,
};

/// The token of the session [`logged_in_client`] starts with.
pub const TEST_TOKEN: &str = "1234";

/// The staff member [`logged_in_client`] is logged in as.
pub fn test_user() -> UserProfile {
    let mut user = UserProfile::new(42, "alice");
    user.name = "Alice Liddell".to_owned();
    user.email = "alice@example.org".to_owned();
    user.role = Role::Staff;
    user
}

/// A [`ClientBuilder`] fit for testing, using the given `base_url` (or
/// localhost:1234) and an in-memory session store.
pub fn test_client_builder(base_url: Option<String>) -> ClientBuilder {
    Client::builder()
        .environment(Environment::Development)
        .base_url(base_url.as_deref().unwrap_or("http://localhost:1234"))
        .session_store(MemoryStore::new())
}

/// A [`Client`] using the given `base_url` (or localhost:1234), without a
/// session.
pub fn test_client(base_url: Option<String>) -> Client {
    test_client_builder(base_url).build().unwrap()
}

/// Persist the hardcoded session of [`test_user`] in the client's store and
/// mark it authenticated.
pub async fn set_client_session(client: &Client) {
    let user = test_user();
    client.session_store().set_session(TEST_TOKEN, &user).await.unwrap();
    client.inner.auth_state.set(AuthState::Authenticated(user));
}

/// A [`Client`] using the given `base_url` (or localhost:1234), already
/// logged in as [`test_user`] with [`TEST_TOKEN`].
pub async fn logged_in_client(base_url: Option<String>) -> Client {
    let client = test_client(base_url);
    set_client_session(&client).await;
    client
}

/// Like [`test_client`], but with a mocked server too.
pub async fn test_client_with_server() -> (Client, wiremock::MockServer) {
    let server = wiremock::MockServer::start().await;
    let client = test_client(Some(server.uri()));
    (client, server)
}

/// Like [`logged_in_client`], but with a mocked server too.
pub async fn logged_in_client_with_server() -> (Client, wiremock::MockServer) {
    let server = wiremock::MockServer::start().await;
    let client = logged_in_client(Some(server.uri())).await;
    (client, server)
}

/// A card reader fed by hand.
///
/// Every serial sent into the channel returned by [`MockNfcReader::new`] is
/// a tap; the stream ends once the sender is dropped.
#[derive(Debug)]
pub struct MockNfcReader {
    supported: bool,
    taps: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl MockNfcReader {
    /// Create a reader and the sender feeding it.
    pub fn new(supported: bool) -> (Self, mpsc::UnboundedSender<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { supported, taps: Mutex::new(Some(receiver)) }, sender)
    }
}

impl NfcReader for MockNfcReader {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn scan(&self) -> Result<BoxStream<'static, String>, RfidError> {
        let receiver = self
            .taps
            .lock()
            .map_err(|_| RfidError::ScanFailed("poisoned".to_owned()))?
            .take()
            .ok_or_else(|| RfidError::ScanFailed("already scanning".to_owned()))?;

        Ok(stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|serial| (serial, receiver))
        })
        .boxed())
    }
}
