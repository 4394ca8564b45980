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
    fmt::Debug,
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use http::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, field::debug, instrument};
use url::Url;

use crate::{config::RequestConfig, error::HttpError};

pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone, Debug)]
struct MaybeSemaphore(Arc<Option<Semaphore>>);

#[allow(dead_code)] // false-positive lint: we never use it but only hold it for the drop
struct MaybeSemaphorePermit<'a>(Option<SemaphorePermit<'a>>);

impl MaybeSemaphore {
    fn new(max: Option<NonZeroUsize>) -> Self {
        let inner = max.map(|i| Semaphore::new(i.into()));
        MaybeSemaphore(Arc::new(inner))
    }

    async fn acquire(&self) -> MaybeSemaphorePermit<'_> {
        match self.0.as_ref() {
            // The semaphore is never closed, so acquiring can't fail.
            Some(inner) => MaybeSemaphorePermit(inner.acquire().await.ok()),
            None => MaybeSemaphorePermit(None),
        }
    }
}

/// The JSON-over-HTTP transport of the client.
///
/// It knows nothing about sessions: the caller hands in the bearer token of
/// every request, read fresh from the session store.
#[derive(Clone, Debug)]
pub(crate) struct HttpClient {
    pub(crate) inner: reqwest::Client,
    pub(crate) request_config: RequestConfig,
    concurrent_request_semaphore: MaybeSemaphore,
    next_request_id: Arc<AtomicU64>,
}

impl HttpClient {
    pub(crate) fn new(inner: reqwest::Client, request_config: RequestConfig) -> Self {
        HttpClient {
            inner,
            request_config,
            concurrent_request_semaphore: MaybeSemaphore::new(
                request_config.max_concurrent_requests,
            ),
            next_request_id: AtomicU64::new(0).into(),
        }
    }

    fn get_request_id(&self) -> String {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        format!("REQ-{request_id}")
    }

    /// Send a JSON request and decode the JSON response.
    ///
    /// Every request carries `Accept` and `Content-Type` set to JSON, and an
    /// `Authorization: Bearer` header when `access_token` is set. An empty
    /// successful body decodes as JSON `null`.
    #[instrument(
        skip(self, method, url, body, config, access_token),
        fields(config, uri = %url, method = %method, request_id, status)
    )]
    pub(crate) async fn send<B, R>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        access_token: Option<&str>,
        config: Option<RequestConfig>,
    ) -> Result<R, HttpError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let config = config.unwrap_or(self.request_config);

        let request = {
            let request_id = self.get_request_id();
            let span = tracing::Span::current();
            span.record("config", debug(config)).record("request_id", request_id);

            let mut request = self
                .inner
                .request(method, url)
                .timeout(config.timeout)
                .header(ACCEPT, JSON_CONTENT_TYPE)
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

            if let Some(token) = access_token {
                request = request.bearer_auth(token);
            }

            if let Some(body) = body {
                request = request.body(serde_json::to_vec(body).map_err(HttpError::IntoHttp)?);
            }

            request
        };

        // will be automatically dropped at the end of this function
        let _handle = self.concurrent_request_semaphore.acquire().await;

        match self.send_request(request).await {
            Ok(response) => {
                debug!("Got response");
                Ok(response)
            }
            Err(e) => {
                debug!("Error while sending request: {e:?}");
                Err(e)
            }
        }
    }

    async fn send_request<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<R, HttpError> {
        let response = request.send().await?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());

        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(HttpError::Api {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        serde_json::from_slice(body).map_err(HttpError::Deserialization)
    }
}
