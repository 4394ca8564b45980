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
    fmt::{self, Debug},
    sync::{atomic::AtomicU64, Arc, Mutex as StdMutex},
};

use eyeball::SharedObservable;
use http::Method;
use makerrepo_base::{DynSessionStore, SessionStoreExt};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{
    authentication::AuthState,
    config::{Environment, RequestConfig},
    deduplicating_handler::DeduplicatingHandler,
    http_client::HttpClient,
    staff_dashboard::SpaceRoster,
    Account, HttpError, Printers, Result, RfidTapHandler, RouteGuard, Shifts, StaffDashboard,
    TrainingSessions,
};

mod builder;

pub use self::builder::ClientBuilder;

/// A request body serializing to `{}`.
#[derive(Debug, Serialize)]
pub(crate) struct EmptyObject {}

/// An async/await enabled MakerRepo client.
///
/// All of the state is held in an `Arc` so the `Client` can be cloned
/// freely.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    environment: Environment,
    /// The URL every route is joined to. Always ends with a slash.
    base_url: Url,
    http_client: HttpClient,
    session_store: Arc<DynSessionStore>,
    /// The outcome of the latest session check, login or logout.
    pub(crate) auth_state: SharedObservable<AuthState>,
    /// Concurrent session checks share a single request.
    pub(crate) session_check: DeduplicatingHandler<(), AuthState>,
    /// The latest roster of the staff member's current space.
    pub(crate) roster: SharedObservable<Option<SpaceRoster>>,
    /// Concurrent roster refreshes share a single request.
    pub(crate) roster_refresh: DeduplicatingHandler<(), SpaceRoster>,
    /// The number of the next roster fetch.
    pub(crate) roster_fetches: AtomicU64,
    /// One past the number of the fetch the cached roster came from.
    pub(crate) roster_cached_from: StdMutex<u64>,
}

impl ClientInner {
    fn new(
        environment: Environment,
        base_url: Url,
        http_client: HttpClient,
        session_store: Arc<DynSessionStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            environment,
            base_url,
            http_client,
            session_store,
            auth_state: SharedObservable::new(AuthState::Unchecked),
            session_check: DeduplicatingHandler::default(),
            roster: SharedObservable::new(None),
            roster_refresh: DeduplicatingHandler::default(),
            roster_fetches: AtomicU64::new(0),
            roster_cached_from: StdMutex::new(0),
        })
    }
}

#[cfg(not(tarpaulin_include))]
impl Debug for Client {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Client")
            .field("environment", &self.inner.environment)
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new [`Client`] for the given environment with the default
    /// configuration.
    ///
    /// The session lives in memory only; use [`Client::builder()`] to
    /// persist it.
    pub fn new(environment: Environment) -> Result<Self, crate::ClientBuildError> {
        Self::builder().environment(environment).build()
    }

    /// Create a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The environment this client was built for.
    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    /// The URL every route is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The store the session is persisted in.
    pub fn session_store(&self) -> &DynSessionStore {
        &*self.inner.session_store
    }

    /// The request configuration used when none is given explicitly.
    pub fn request_config(&self) -> RequestConfig {
        self.inner.http_client.request_config
    }

    /// Resolve `route` against the base URL.
    ///
    /// A single leading slash is stripped, so `/hours` and `hours` resolve
    /// to the same URL. The route may carry a query string.
    pub fn endpoint(&self, route: &str) -> Result<Url, HttpError> {
        let route = route.strip_prefix('/').unwrap_or(route);
        Ok(self.inner.base_url.join(route)?)
    }

    /// Send a `GET` request to `route` and decode the JSON response.
    pub async fn get<R: DeserializeOwned>(&self, route: &str) -> Result<R> {
        self.send::<(), R>(Method::GET, route, None, None).await
    }

    /// Send a `PUT` request to `route` with a JSON body.
    pub async fn put<B, R>(&self, route: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        self.send(Method::PUT, route, Some(body), None).await
    }

    /// Send a `POST` request to `route` with a JSON body.
    pub async fn post<B, R>(&self, route: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        self.send(Method::POST, route, Some(body), None).await
    }

    /// Send a `PATCH` request to `route` with a JSON body.
    pub async fn patch<B, R>(&self, route: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        self.send(Method::PATCH, route, Some(body), None).await
    }

    /// Send an arbitrary request to `route`.
    ///
    /// The bearer token is read from the session store right before the
    /// request goes out and the `Authorization` header is left out when
    /// there is none. `config` overrides the client's [`RequestConfig`] for
    /// this request only.
    pub async fn send<B, R>(
        &self,
        method: Method,
        route: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(route)?;
        self.send_to(method, url, body, config).await
    }

    pub(crate) async fn send_to<B, R>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let access_token = self.session_store().get_token().await?;

        Ok(self
            .inner
            .http_client
            .send(method, url, body, access_token.as_deref(), config)
            .await?)
    }

    /// Get the [`RouteGuard`] deciding which views may be shown.
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.clone())
    }

    /// Get the staff dashboard of the logged in staff member.
    pub fn staff_dashboard(&self) -> StaffDashboard {
        StaffDashboard::new(self.clone())
    }

    /// Get the training sessions handle.
    pub fn training_sessions(&self) -> TrainingSessions {
        TrainingSessions::new(self.clone())
    }

    /// Get the shift schedules handle.
    pub fn shifts(&self) -> Shifts {
        Shifts::new(self.clone())
    }

    /// Get the printers handle.
    pub fn printers(&self) -> Printers {
        Printers::new(self.clone())
    }

    /// Get the account handle, for profiles, hours and support requests.
    pub fn account(&self) -> Account {
        Account::new(self.clone())
    }

    /// Create a handler signing people in and out of the space `space_id`
    /// with their RFID cards.
    pub fn rfid(&self, space_id: u64) -> RfidTapHandler {
        RfidTapHandler::new(self.clone(), space_id)
    }
}
