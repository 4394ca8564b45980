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

use std::{fmt, sync::Arc};

use makerrepo_base::{DynSessionStore, MemoryStore, SessionStore};
use tracing::{debug, instrument};
use url::Url;

use super::{Client, ClientInner};
use crate::{
    config::{Environment, RequestConfig},
    error::ClientBuildError,
    http_client::HttpClient,
    HttpError,
};

/// Builder that allows creating and configuring various parts of a [`Client`].
///
/// When setting the `SessionStore` it is up to the user to open the storage
/// backend before client creation.
///
/// # Examples
///
/// ```
/// use makerrepo_sdk::{config::Environment, Client};
///
/// let client = Client::builder()
///     .environment(Environment::Production)
///     .user_agent("front-desk-kiosk/1.0")
///     .build()?;
/// # anyhow::Ok(())
/// ```
///
/// # Example for using a custom http client
///
/// Note: setting a custom http client will ignore `user_agent`, you'd need to
/// set it yourself if you want it.
///
/// ```
/// use makerrepo_sdk::Client;
///
/// let reqwest_builder = reqwest::ClientBuilder::new().https_only(true).user_agent("MyApp/v3.0");
///
/// let client_builder = Client::builder().http_client(reqwest_builder.build()?);
/// # anyhow::Ok(())
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct ClientBuilder {
    environment: Environment,
    base_url: Option<String>,
    session_store: Option<Arc<DynSessionStore>>,
    request_config: RequestConfig,
    http_cfg: HttpConfig,
}

#[derive(Clone)]
enum HttpConfig {
    Settings { user_agent: Option<String> },
    Custom(reqwest::Client),
}

impl fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settings { user_agent } => {
                f.debug_struct("Settings").field("user_agent", user_agent).finish()
            }
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl ClientBuilder {
    pub(crate) fn new() -> Self {
        Self {
            environment: Environment::current(),
            base_url: None,
            session_store: None,
            request_config: Default::default(),
            http_cfg: HttpConfig::Settings { user_agent: None },
        }
    }

    /// Set the environment the client talks to.
    ///
    /// Defaults to [`Environment::current()`]. The base URL of the
    /// environment is used unless [`base_url()`][Self::base_url] is set.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override the base URL every route is resolved against.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Self {
        self.base_url = Some(url.as_ref().to_owned());
        self
    }

    /// Set the store the session is persisted in.
    ///
    /// Defaults to a [`MemoryStore`], which forgets the session when the
    /// client is dropped.
    pub fn session_store(mut self, store: impl SessionStore + 'static) -> Self {
        self.session_store = Some(Arc::new(store));
        self
    }

    /// Set the default timeout and concurrency limit of the requests.
    pub fn request_config(mut self, request_config: RequestConfig) -> Self {
        self.request_config = request_config;
        self
    }

    /// Set the value of the `User-Agent` header.
    ///
    /// Ignored when a custom [`http_client()`][Self::http_client] is set.
    pub fn user_agent(mut self, user_agent: impl AsRef<str>) -> Self {
        match &mut self.http_cfg {
            HttpConfig::Settings { user_agent: slot } => {
                *slot = Some(user_agent.as_ref().to_owned());
            }
            HttpConfig::Custom(_) => {}
        }
        self
    }

    /// Use the given [`reqwest::Client`] to send the requests.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_cfg = HttpConfig::Custom(client);
        self
    }

    /// Create a [`Client`] with the options set on this builder.
    ///
    /// # Errors
    ///
    /// This method can fail for two reasons:
    ///
    /// 1. The base URL is not a valid absolute `http(s)` URL.
    /// 2. The HTTP client couldn't be built.
    #[instrument(skip_all, fields(environment = %self.environment))]
    pub fn build(self) -> Result<Client, ClientBuildError> {
        let base_url = match &self.base_url {
            Some(url) => url.as_str(),
            None => self.environment.base_url(),
        };
        let base_url = normalize_base_url(base_url)?;

        let inner = match self.http_cfg {
            HttpConfig::Settings { user_agent } => {
                let user_agent = user_agent.unwrap_or_else(|| {
                    format!("makerrepo-sdk/{}", env!("CARGO_PKG_VERSION"))
                });
                reqwest::Client::builder().user_agent(user_agent).build().map_err(HttpError::from)?
            }
            HttpConfig::Custom(client) => client,
        };

        let session_store =
            self.session_store.unwrap_or_else(|| Arc::new(MemoryStore::new()));

        debug!(%base_url, "Built the client");

        Ok(Client {
            inner: ClientInner::new(
                self.environment,
                base_url,
                HttpClient::new(inner, self.request_config),
                session_store,
            ),
        })
    }
}

/// Parse `url` and make sure it ends with a slash, so that joining a route
/// appends to the path instead of replacing its last segment.
fn normalize_base_url(url: &str) -> Result<Url, ClientBuildError> {
    let mut base_url = Url::parse(url)?;

    if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
        return Err(ClientBuildError::InvalidBaseUrl(url.to_owned()));
    }

    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    Ok(base_url)
}
