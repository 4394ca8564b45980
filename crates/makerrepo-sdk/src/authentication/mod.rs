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

//! Session bootstrap, login and logout.
//!
//! The client starts out [`AuthState::Unchecked`]. [`Client::bootstrap()`]
//! validates a stored token with the server once, and login and logout move
//! the state afterwards. Subscribers of [`Client::subscribe_auth_state()`]
//! see every transition.

use eyeball::Subscriber;
use makerrepo_base::{Session, SessionStoreExt, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};

use crate::{Client, Error, Result};

mod route_guard;

pub use route_guard::{HomeView, Navigation, Route, RouteGuard};

/// Where the client stands with respect to the user's session.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthState {
    /// The stored session wasn't looked at yet.
    Unchecked,
    /// The stored token is being validated with the server.
    Checking,
    /// The user is logged in with the given profile.
    Authenticated(UserProfile),
    /// There is no valid session.
    Unauthenticated,
}

impl AuthState {
    /// Whether the session check is over, one way or the other.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Unauthenticated)
    }

    /// Whether the user is logged in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The profile of the logged in user.
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username_email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: String,
    user: UserProfile,
}

/// The answer of the server to a session check.
#[derive(Clone, Debug, Deserialize)]
pub struct WhoamiResponse {
    /// A fresh token to replace the stored one, if the server rotated it.
    #[serde(default)]
    pub token: Option<String>,
    /// The current profile of the user.
    pub user: UserProfile,
}

impl Client {
    /// The current authentication state.
    pub fn auth_state(&self) -> AuthState {
        self.inner.auth_state.get()
    }

    /// Subscribe to the changes of the authentication state.
    pub fn subscribe_auth_state(&self) -> Subscriber<AuthState> {
        self.inner.auth_state.subscribe()
    }

    /// Wait until the session check is over and return its outcome.
    ///
    /// This doesn't start a check; something else has to call
    /// [`bootstrap()`][Self::bootstrap].
    pub async fn resolved_auth_state(&self) -> AuthState {
        let mut subscriber = self.subscribe_auth_state();

        loop {
            let state = subscriber.get();
            if state.is_resolved() {
                return state;
            }

            if subscriber.next().await.is_none() {
                return self.auth_state();
            }
        }
    }

    /// Whether a session token is stored.
    ///
    /// This is what protected views are gated on, see [`RouteGuard`].
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.session_store().get_token().await?.is_some())
    }

    /// The profile of the logged in user, as of the latest session check or
    /// login.
    pub fn user(&self) -> Option<UserProfile> {
        self.auth_state().user().cloned()
    }

    /// The session persisted in the session store.
    pub async fn session(&self) -> Result<Option<Session>> {
        Ok(self.session_store().get_session().await?)
    }

    /// Ask the server who the stored token belongs to.
    pub async fn whoami(&self) -> Result<WhoamiResponse> {
        self.get("check_signed_in").await
    }

    /// Validate the stored session with the server.
    ///
    /// Without a stored token no request is made and the state becomes
    /// [`AuthState::Unauthenticated`]. Otherwise the state is
    /// [`AuthState::Checking`] while the server is asked; on success the
    /// stored profile is replaced (and the token, if the server handed out a
    /// new one), on any failure the session is cleared.
    ///
    /// If the session store fails, the error is returned and the state goes
    /// back to [`AuthState::Unchecked`] as long as a token is still stored.
    ///
    /// Concurrent calls share a single check. This can be called again later,
    /// for example after the app comes back from the background.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Result<AuthState> {
        self.inner
            .session_check
            .run((), async {
                let result = self.check_session().await;

                let state = match &result {
                    Ok(state) => state.clone(),
                    // The store failed; only claim there's no session if no
                    // token is left behind.
                    Err(_) => match self.session_store().get_token().await {
                        Ok(None) => AuthState::Unauthenticated,
                        _ => AuthState::Unchecked,
                    },
                };
                self.inner.auth_state.set(state);

                result
            })
            .await
    }

    async fn check_session(&self) -> Result<AuthState> {
        let store = self.session_store();

        let Some(token) = store.get_token().await? else {
            debug!("No stored session");
            return Ok(AuthState::Unauthenticated);
        };

        self.inner.auth_state.set(AuthState::Checking);

        match self.whoami().await {
            Ok(WhoamiResponse { token: new_token, user }) => {
                let token = new_token.filter(|t| !t.is_empty()).unwrap_or(token);
                store.set_session(&token, &user).await?;

                info!(user_id = user.id, "Restored the session");
                Ok(AuthState::Authenticated(user))
            }
            Err(error) => {
                warn!(?error, "The stored session is invalid, clearing it");
                store.clear_session().await?;
                self.inner.roster.set(None);

                Ok(AuthState::Unauthenticated)
            }
        }
    }

    /// Log in with a username or email address and a password.
    ///
    /// On success the session is persisted and the state becomes
    /// [`AuthState::Authenticated`]. On failure nothing is persisted; use
    /// [`Error::is_invalid_credentials()`] to tell wrong credentials apart
    /// from other failures.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username_email: &str, password: &str) -> Result<UserProfile> {
        let request = LoginRequest { username_email, password };

        let response = match self.post::<_, LoginResponse>("login_authentication", &request).await
        {
            Ok(response) if response.token.is_empty() => Err(Error::MissingToken),
            other => other,
        };

        match response {
            Ok(LoginResponse { token, user }) => {
                self.session_store().set_session(&token, &user).await?;
                self.inner.auth_state.set(AuthState::Authenticated(user.clone()));

                info!(user_id = user.id, "Logged in");
                Ok(user)
            }
            Err(error) => {
                warn!(?error, "Login failed");

                if !self.is_authenticated().await? {
                    self.inner.auth_state.set(AuthState::Unauthenticated);
                }

                Err(error)
            }
        }
    }

    /// Log out.
    ///
    /// The session is only cleared once the server confirmed the logout;
    /// if the request fails the client stays logged in.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        if !self.is_authenticated().await? {
            return Err(Error::AuthenticationRequired);
        }

        let _: JsonValue = self.get("logout").await?;

        self.session_store().clear_session().await?;
        self.inner.roster.set(None);
        self.inner.auth_state.set(AuthState::Unauthenticated);

        info!("Logged out");
        Ok(())
    }
}
