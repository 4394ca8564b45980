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

//! Training sessions run by staff members.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, instrument};

use crate::{client::EmptyObject, staff_dashboard::Space, Client, Result};

/// A training a session can be about.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Training {
    /// The identifier of the training.
    pub id: u64,
    /// The name of the training.
    pub name: String,
}

/// A training session of the logged in staff member.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TrainingSession {
    /// The identifier of the session.
    pub id: u64,
    /// When the session was last changed.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// The course the session is part of.
    #[serde(default)]
    pub course: Option<String>,
    /// The level of the training.
    #[serde(default)]
    pub level: Option<String>,
    /// What the session trains for.
    pub training: Training,
    /// Where the session takes place.
    pub space: Space,
    /// The certifications handed out at the end of the session.
    #[serde(default)]
    pub certifications: Vec<JsonValue>,
}

impl TrainingSession {
    /// Whether the trainees were certified.
    pub fn is_completed(&self) -> bool {
        !self.certifications.is_empty()
    }
}

/// The choices offered when creating a training session.
///
/// The `(id, name)` pairs are `[id, name]` arrays on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewTrainingSessionForm {
    /// The trainings of the current space.
    #[serde(default)]
    pub trainings: Vec<(u64, String)>,
    /// The training levels.
    #[serde(default)]
    pub level: Vec<String>,
    /// The courses a session can be part of.
    #[serde(default)]
    pub course_names: Vec<String>,
    /// The people who can run a session.
    #[serde(default)]
    pub admins: Vec<(u64, String)>,
    /// The people who can take part in a session.
    #[serde(default)]
    pub users: Vec<(u64, String)>,
}

/// A training session to create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTrainingSession {
    /// The space the session takes place in.
    pub space_id: u64,
    /// What the session trains for.
    pub training_id: u64,
    /// The level of the training.
    pub level: String,
    /// The course the session is part of.
    pub course: String,
    /// Who runs the session.
    pub instructor_id: u64,
    /// Who takes part.
    pub trainee_ids: Vec<u64>,
}

#[derive(Serialize)]
struct SpaceRef {
    space_id: u64,
}

#[derive(Serialize)]
struct CreateTrainingSessionRequest<'a> {
    training_session: SpaceRef,
    training_id: u64,
    level: &'a str,
    course: &'a str,
    user_id: u64,
    /// The server expects the trainee ids as strings.
    training_session_users: Vec<String>,
}

impl<'a> From<&'a NewTrainingSession> for CreateTrainingSessionRequest<'a> {
    fn from(session: &'a NewTrainingSession) -> Self {
        Self {
            training_session: SpaceRef { space_id: session.space_id },
            training_id: session.training_id,
            level: &session.level,
            course: &session.course,
            user_id: session.instructor_id,
            training_session_users: session.trainee_ids.iter().map(u64::to_string).collect(),
        }
    }
}

#[derive(Deserialize)]
struct CreatedResponse {
    #[serde(default)]
    created: bool,
}

#[derive(Deserialize)]
struct CertifiedResponse {
    #[serde(default)]
    certified: bool,
}

/// The training sessions of the logged in staff member.
#[derive(Debug, Clone)]
pub struct TrainingSessions {
    client: Client,
}

impl TrainingSessions {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List the sessions.
    pub async fn list(&self) -> Result<Vec<TrainingSession>> {
        self.client.get("staff/training_sessions").await
    }

    /// Get the choices for a new session.
    pub async fn new_session_form(&self) -> Result<NewTrainingSessionForm> {
        self.client.get("staff/training_sessions/new").await
    }

    /// Create a session. Returns whether the server created it.
    #[instrument(skip_all, fields(training_id = session.training_id))]
    pub async fn create(&self, session: &NewTrainingSession) -> Result<bool> {
        let request = CreateTrainingSessionRequest::from(session);
        let response: CreatedResponse =
            self.client.post("staff/training_sessions", &request).await?;

        info!(created = response.created, "Requested a new training session");
        Ok(response.created)
    }

    /// Certify the trainees of a session. Returns whether every trainee got
    /// the certification.
    #[instrument(skip(self))]
    pub async fn certify_trainees(&self, session_id: u64) -> Result<bool> {
        let route = format!("staff/training_sessions/{session_id}/certify_trainees");
        let response: CertifiedResponse = self.client.post(&route, &EmptyObject {}).await?;
        Ok(response.certified)
    }
}
