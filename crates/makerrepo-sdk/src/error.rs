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

//! Error conditions.

use as_variant::as_variant;
use http::StatusCode;
use makerrepo_base::StoreError;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

/// Result type of the makerrepo-sdk.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Result type of a pure HTTP request.
pub type HttpResult<T> = std::result::Result<T, HttpError>;

/// An HTTP error, representing either a connection error, a non-successful
/// response of the server or a body we couldn't make sense of.
#[derive(Error, Debug)]
pub enum HttpError {
    /// An error at the HTTP layer: the server couldn't be reached, the
    /// request timed out or the connection dropped.
    #[error(transparent)]
    Reqwest(#[from] ReqwestError),

    /// The server answered with a status outside of the 2xx range.
    #[error("the server responded with {status}: {body}")]
    Api {
        /// The status code of the response.
        status: StatusCode,
        /// The raw body of the response, lossily decoded as UTF-8.
        body: String,
    },

    /// The request body couldn't be serialized.
    #[error("couldn't serialize the request body: {0}")]
    IntoHttp(#[source] JsonError),

    /// A successful response had a body that didn't match the expected
    /// shape.
    #[error("couldn't deserialize the response body: {0}")]
    Deserialization(#[source] JsonError),

    /// The route couldn't be joined to the base URL.
    #[error(transparent)]
    Url(#[from] UrlParseError),
}

impl HttpError {
    /// The status code of the response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Reqwest(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the server refused the credentials of the request.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN))
    }
}

/// Internal representation of errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error doing an HTTP request.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The operation needs a logged in session but there is none.
    #[error("the operation requires authentication but there is no session")]
    AuthenticationRequired,

    /// The server accepted the request but handed out a session without a
    /// token.
    #[error("the server returned a session without a token")]
    MissingToken,

    /// A form was submitted with required fields left empty.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// An error happened while reading or writing the session store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A concurrent request to a deduplicated request has failed.
    #[error("a concurrent request failed; see logs for details")]
    ConcurrentRequestFailed,
}

impl Error {
    /// If `self` is `Http(e)`, returns `Some(e)`.
    ///
    /// Otherwise, returns `None`.
    pub fn as_http_error(&self) -> Option<&HttpError> {
        as_variant!(self, Self::Http)
    }

    /// The status code of the failed response, if the error came from the
    /// server.
    pub fn status(&self) -> Option<StatusCode> {
        self.as_http_error().and_then(HttpError::status)
    }

    /// Whether this is the server turning down a login attempt.
    pub fn is_invalid_credentials(&self) -> bool {
        self.as_http_error().is_some_and(HttpError::is_unauthorized)
    }
}

/// Errors that can happen in [`ClientBuilder::build`][crate::ClientBuilder::build].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The base URL is not a valid URL.
    #[error(transparent)]
    Url(#[from] UrlParseError),

    /// The base URL can't be used as a base for the API routes.
    #[error("`{0}` can't be used as a base URL")]
    InvalidBaseUrl(String),

    /// Error building the HTTP client.
    #[error(transparent)]
    Http(#[from] HttpError),
}
