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

use std::fmt;

use makerrepo_base::{Role, SessionStoreExt};
use tracing::debug;

use crate::{AuthState, Client, Result};

/// A view of the app.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// The login form.
    Login,
    /// The help and support form.
    Help,
    /// The landing view, see [`HomeView`].
    Home,
    /// The profile of the user with the given username.
    Profile(String),
}

impl Route {
    /// Whether the view may be shown without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Help)
    }

    /// The path of the view.
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_owned(),
            Self::Help => "/help".to_owned(),
            Self::Home => "/".to_owned(),
            Self::Profile(username) => format!("/profile/{username}"),
        }
    }

    /// Parse a path produced by [`Route::path()`].
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');

        match path {
            "" => Some(Self::Home),
            "/login" => Some(Self::Login),
            "/help" => Some(Self::Help),
            _ => path
                .strip_prefix("/profile/")
                .filter(|username| !username.is_empty() && !username.contains('/'))
                .map(|username| Self::Profile(username.to_owned())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// The outcome of a navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested view.
    Render(Route),
    /// Show this view instead of the requested one.
    Redirect(Route),
}

/// What the home view shows, depending on the role of the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomeView {
    /// The roster of the current space, for admins and staff.
    SpaceDashboard,
    /// The opening hours of the spaces, for everybody else.
    SpaceHours,
}

impl HomeView {
    /// The home view for a user with the given role.
    pub fn for_role(role: &Role) -> Self {
        if role.is_staff_or_admin() {
            Self::SpaceDashboard
        } else {
            Self::SpaceHours
        }
    }
}

/// Decides whether a view may be shown.
///
/// Protected views need a stored session token. The token alone is the
/// signal: a token that the server will reject still renders, and the view's
/// own requests fail instead.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    client: Client,
}

impl RouteGuard {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Check `route` against the current contents of the session store.
    pub async fn check(&self, route: Route) -> Result<Navigation> {
        if route.is_public() || self.client.session_store().get_token().await?.is_some() {
            return Ok(Navigation::Render(route));
        }

        debug!(%route, "No session, redirecting to the login view");
        Ok(Navigation::Redirect(Route::Login))
    }

    /// Like [`check()`][Self::check], but for protected views first make sure
    /// the session check of [`Client::bootstrap()`] is over, so that a session
    /// being invalidated doesn't briefly render.
    ///
    /// If the session wasn't checked yet, the check is started here; a check
    /// already running is joined instead of repeated.
    pub async fn resolve(&self, route: Route) -> Result<Navigation> {
        if !route.is_public() && !self.client.auth_state().is_resolved() {
            self.client.bootstrap().await?;
        }

        self.check(route).await
    }

    /// What the home view shows for the logged in user, `None` without a
    /// resolved session.
    pub fn home_view(&self) -> Option<HomeView> {
        match self.client.auth_state() {
            AuthState::Authenticated(user) => Some(HomeView::for_role(&user.role)),
            _ => None,
        }
    }
}
