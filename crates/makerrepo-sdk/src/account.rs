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

//! Profiles, roles and programs, opening hours and support requests.

use makerrepo_base::{Role, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, instrument};

use crate::{
    config::{APP_RELEASE_TYPE, APP_VERSION},
    Client, Error, HttpError, Result,
};

/// The name of the volunteer program.
pub const VOLUNTEER_PROGRAM: &str = "Volunteer Program";
/// The name of the development program.
pub const DEVELOPMENT_PROGRAM: &str = "Development Program";

/// Shown in place of a missing value.
pub const NOT_AVAILABLE: &str = "Not Available";

/// A user's profile page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Profile {
    /// The user.
    pub user: UserProfile,
    /// The programs the user takes part in.
    #[serde(default)]
    pub programs: Vec<String>,
    /// The certifications the user holds.
    #[serde(default)]
    pub certifications: Vec<JsonValue>,
    /// The trainings the user can still take.
    #[serde(default)]
    pub remaining_trainings: Vec<JsonValue>,
}

impl Profile {
    /// Whether the user is a volunteer.
    pub fn is_volunteer(&self) -> bool {
        self.programs.iter().any(|p| p == VOLUNTEER_PROGRAM)
    }

    /// Whether the user is in the development program.
    pub fn is_in_development_program(&self) -> bool {
        self.programs.iter().any(|p| p == DEVELOPMENT_PROGRAM)
    }
}

/// When a space is open. The values are HTML snippets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct OpeningHours {
    /// The hours for students.
    #[serde(default)]
    pub students: Option<String>,
    /// The hours for the public.
    #[serde(default)]
    pub public: Option<String>,
    /// The summer hours.
    #[serde(default)]
    pub summer: Option<String>,
}

/// The contact details and opening hours of a space.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SpaceHours {
    /// The name of the space.
    #[serde(default)]
    pub name: Option<String>,
    /// The contact address of the space.
    #[serde(default)]
    pub email: Option<String>,
    /// Where the space is.
    #[serde(default)]
    pub address: Option<String>,
    /// The phone number of the space.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// When the space is open.
    #[serde(default)]
    pub opening_hour: OpeningHours,
}

/// `value`, or [`NOT_AVAILABLE`] if it's missing or blank.
pub fn or_not_available(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(NOT_AVAILABLE)
}

/// A request for help sent to the makerspace staff.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportRequest {
    /// Who is asking.
    pub name: String,
    /// Where to send the answer.
    pub email: String,
    /// What it's about.
    pub subject: String,
    /// The question.
    pub comments: String,
}

impl SupportRequest {
    /// The names of the fields that are left empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("comments", &self.comments),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    comments: &'a str,
    app_version: String,
}

#[derive(Serialize)]
struct SetRoleRequest<'a> {
    id: u64,
    role: &'a Role,
}

#[derive(Serialize)]
struct ChangeProgramsRequest {
    user_id: u64,
    dev_program: bool,
    volunteer: bool,
}

/// Profiles and other user-facing endpoints.
#[derive(Debug, Clone)]
pub struct Account {
    client: Client,
}

impl Account {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get the profile of the user with the given username.
    pub async fn profile(&self, username: &str) -> Result<Profile> {
        let mut url = self.client.endpoint("")?;
        url.path_segments_mut()
            .map_err(|()| HttpError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(username);

        self.client.send_to::<(), _>(http::Method::GET, url, None, None).await
    }

    /// Change the role of a user. Only admins may do this.
    #[instrument(skip(self))]
    pub async fn set_role(&self, user_id: u64, role: &Role) -> Result<()> {
        let _: JsonValue =
            self.client.patch("admin/users/set_role", &SetRoleRequest { id: user_id, role }).await?;

        info!("Changed the role");
        Ok(())
    }

    /// Set which programs a user takes part in.
    #[instrument(skip(self))]
    pub async fn change_programs(
        &self,
        user_id: u64,
        dev_program: bool,
        volunteer: bool,
    ) -> Result<()> {
        let request = ChangeProgramsRequest { user_id, dev_program, volunteer };
        let _: JsonValue = self.client.patch("change_programs", &request).await?;
        Ok(())
    }

    /// Get the contact details and opening hours of the spaces.
    pub async fn space_hours(&self) -> Result<Vec<SpaceHours>> {
        self.client.get("hours").await
    }

    /// Send a support request.
    ///
    /// Fails with [`Error::MissingFields`] without contacting the server if a
    /// field is empty.
    #[instrument(skip_all)]
    pub async fn send_support_request(&self, request: &SupportRequest) -> Result<()> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }

        let body = SendEmailRequest {
            name: &request.name,
            email: &request.email,
            subject: &request.subject,
            comments: &request.comments,
            app_version: format!("{APP_VERSION} {APP_RELEASE_TYPE}"),
        };
        let _: JsonValue = self.client.put("send_email", &body).await?;

        info!("Sent a support request");
        Ok(())
    }
}
