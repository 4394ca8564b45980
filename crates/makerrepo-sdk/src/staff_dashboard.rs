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

//! The staff dashboard: who is in the space, signing people in and out by
//! hand, and managing RFID cards.

use std::sync::atomic::Ordering;

use eyeball::Subscriber;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};
use url::Url;

use crate::{client::EmptyObject, Client, Result};

/// A makerspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// The identifier of the space.
    pub id: u64,
    /// The display name of the space.
    pub name: String,
}

/// An entry of the list of spaces a staff member can switch to.
///
/// On the wire this is a `[name, id]` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, u64)", into = "(String, u64)")]
pub struct SpaceChoice {
    /// The display name of the space.
    pub name: String,
    /// The identifier of the space.
    pub id: u64,
}

impl From<(String, u64)> for SpaceChoice {
    fn from((name, id): (String, u64)) -> Self {
        Self { name, id }
    }
}

impl From<SpaceChoice> for (String, u64) {
    fn from(choice: SpaceChoice) -> Self {
        (choice.name, choice.id)
    }
}

/// A person currently signed into the space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUser {
    /// The user's identifier.
    pub id: u64,
    /// The user's full name.
    #[serde(default)]
    pub name: String,
    /// The user's username.
    pub username: String,
    /// The user's email address.
    #[serde(default)]
    pub email: String,
    /// Whether staff flagged the user.
    #[serde(default)]
    pub flagged: bool,
}

/// The state of the staff member's current space.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRoster {
    /// The space the staff member is working in.
    #[serde(default)]
    pub space: Option<Space>,
    /// The spaces the staff member can switch to.
    #[serde(default)]
    pub space_list: Vec<SpaceChoice>,
    /// The people signed into the space.
    #[serde(default)]
    pub space_users: Vec<RosterUser>,
}

impl SpaceRoster {
    /// Whether the user with the given username is signed in.
    pub fn contains(&self, username: &str) -> bool {
        self.space_users.iter().any(|u| u.username == username)
    }
}

/// A user matching a typeahead search.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UserSuggestion {
    /// The user's full name.
    pub name: String,
    /// The user's username.
    pub username: String,
}

#[derive(Deserialize)]
struct PopulateUsersResponse {
    #[serde(default)]
    users: Vec<UserSuggestion>,
}

/// A card that was tapped but isn't linked to anybody yet.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UnsetRfid {
    /// The card number.
    pub card_number: String,
    /// When the card was first tapped.
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Serialize)]
struct LinkRfidRequest<'a> {
    card_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<u64>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Option<String>,
}

impl StatusResponse {
    fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("OK")
    }
}

/// The staff dashboard of the logged in staff member.
///
/// The latest roster is cached in the [`Client`]; every mutation fetches it
/// again so the cache follows the server.
#[derive(Debug, Clone)]
pub struct StaffDashboard {
    client: Client,
}

impl StaffDashboard {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    fn endpoint(&self, route: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.client.endpoint(route)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn put_without_body(&self, url: Url) -> Result<()> {
        let _: JsonValue = self.client.send_to(Method::PUT, url, Some(&EmptyObject {}), None).await?;
        Ok(())
    }

    /// Fetch the roster of the current space and cache it.
    ///
    /// Concurrent calls share a single request.
    #[instrument(skip(self))]
    pub async fn roster(&self) -> Result<SpaceRoster> {
        self.client.inner.roster_refresh.run((), self.fetch_roster()).await
    }

    /// Fetch the roster without joining a fetch that is already in flight,
    /// which may predate a change.
    ///
    /// The answer is only cached if no fetch that started later got cached
    /// first.
    async fn fetch_roster(&self) -> Result<SpaceRoster> {
        let inner = &self.client.inner;
        let fetch = inner.roster_fetches.fetch_add(1, Ordering::SeqCst);

        let roster: SpaceRoster = self.client.get("staff_dashboard").await?;
        debug!(fetch, users = roster.space_users.len(), "Fetched the roster");

        let mut cached_from = inner.roster_cached_from.lock().unwrap();
        if *cached_from <= fetch {
            *cached_from = fetch + 1;
            inner.roster.set(Some(roster.clone()));
        } else {
            debug!(fetch, "A newer roster is already cached");
        }

        Ok(roster)
    }

    /// The roster as of the latest fetch.
    pub fn cached_roster(&self) -> Option<SpaceRoster> {
        self.client.inner.roster.get()
    }

    /// Subscribe to the changes of the cached roster.
    pub fn subscribe_roster(&self) -> Subscriber<Option<SpaceRoster>> {
        self.client.inner.roster.subscribe()
    }

    /// Switch to another space and return its roster.
    #[instrument(skip(self))]
    pub async fn change_space(&self, space_id: u64) -> Result<SpaceRoster> {
        let space_id = space_id.to_string();
        let url = self.endpoint("staff_dashboard/change_space", &[("space_id", &space_id)])?;
        self.put_without_body(url).await?;
        self.fetch_roster().await
    }

    /// Sign a user into the space by hand and return the new roster.
    #[instrument(skip(self))]
    pub async fn sign_in_user(&self, username: &str) -> Result<SpaceRoster> {
        let url = self.endpoint("staff_dashboard/add_users", &[("added_users", username)])?;
        self.put_without_body(url).await?;
        self.fetch_roster().await
    }

    /// Sign users out of the space by hand and return the new roster.
    #[instrument(skip(self))]
    pub async fn sign_out_users(&self, usernames: &[&str]) -> Result<SpaceRoster> {
        let query: Vec<_> = usernames.iter().map(|u| ("dropped_users[]", *u)).collect();
        let url = self.endpoint("staff_dashboard/remove_users", &query)?;
        self.put_without_body(url).await?;
        self.fetch_roster().await
    }

    /// Users whose name or username matches `search`, for typeaheads.
    pub async fn populate_users(&self, search: &str) -> Result<Vec<UserSuggestion>> {
        let url = self.endpoint("staff_dashboard/populate_users", &[("search", search)])?;
        let response: PopulateUsersResponse =
            self.client.send_to::<(), _>(Method::GET, url, None, None).await?;
        Ok(response.users)
    }

    /// Full-text user search.
    pub async fn search(&self, query: &str) -> Result<JsonValue> {
        let url = self.endpoint("staff_dashboard/search", &[("query", query)])?;
        self.client.send_to::<(), _>(Method::GET, url, None, None).await
    }

    /// Cards that were tapped but aren't linked to anybody.
    pub async fn unset_rfids(&self) -> Result<Vec<UnsetRfid>> {
        self.client.get("rfid/get_unset_rfids").await
    }

    /// Link a card to a user. Returns whether the server accepted it.
    #[instrument(skip(self))]
    pub async fn link_rfid(&self, card_number: &str, user_id: u64) -> Result<bool> {
        let request = LinkRfidRequest { card_number, user_id: Some(user_id) };
        let response: StatusResponse = self.client.put("staff_dashboard/link_rfid", &request).await?;
        Ok(response.is_ok())
    }

    /// Unlink a card from its owner. Returns whether the server accepted it.
    #[instrument(skip(self))]
    pub async fn unlink_rfid(&self, card_number: &str) -> Result<bool> {
        let request = LinkRfidRequest { card_number, user_id: None };
        let response: StatusResponse =
            self.client.put("staff_dashboard/unlink_rfid", &request).await?;
        Ok(response.is_ok())
    }
}
