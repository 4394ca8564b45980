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

//! User sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The role of a MakerRepo account.
///
/// Roles the client doesn't know about are kept verbatim in
/// [`Role::Other`] instead of failing deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    /// Administrator, can change roles and programs of other users.
    Admin,
    /// Makerspace staff, has access to the space dashboard.
    Staff,
    /// A regular member.
    #[default]
    RegularUser,
    /// A role string this version of the client doesn't know.
    Other(String),
}

impl Role {
    /// The wire representation of this role.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::RegularUser => "regular_user",
            Role::Other(s) => s,
        }
    }

    /// Whether this role gives access to the staff dashboard.
    pub fn is_staff_or_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "staff" => Role::Staff,
            "regular_user" => Role::RegularUser,
            other => Role::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Role::from(s.as_str()))
    }
}

/// An RFID card linked to an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedRfid {
    /// The normalized card number.
    pub card_number: String,
}

/// The profile of a MakerRepo user, as returned by the login and whoami
/// endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The numeric id of the account.
    pub id: u64,
    /// The unique username.
    pub username: String,
    /// The display name.
    #[serde(default)]
    pub name: String,
    /// The e-mail address.
    #[serde(default)]
    pub email: String,
    /// The role of the account.
    #[serde(default)]
    pub role: Role,
    /// Faculty, as entered by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    /// Study program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Year of study; the server sends either a number or a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_of_study: Option<JsonValue>,
    /// The card linked to this account, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfid: Option<LinkedRfid>,
    /// Any other field the server sent, kept so that storing and reloading a
    /// profile doesn't lose data.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl UserProfile {
    /// Create a profile with only the mandatory fields set.
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            name: String::new(),
            email: String::new(),
            role: Role::default(),
            faculty: None,
            program: None,
            year_of_study: None,
            rfid: None,
            extra: Map::new(),
        }
    }
}

/// A user session: the opaque bearer token and the profile of the account it
/// was issued for.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The bearer token sent with every request.
    pub token: String,
    /// The user the token was issued for.
    pub user: UserProfile,
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.user.username)
            .field("role", &self.user.role)
            .finish_non_exhaustive()
    }
}
