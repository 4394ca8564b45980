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

//! The shift schedule of the staff of a space.

use chrono::{DateTime, Months, SecondsFormat, Utc};
use http::Method;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::{Client, Result};

/// The color of a shift whose calendar entry doesn't carry one.
pub const DEFAULT_SHIFT_COLOR: &str = "#3788d8";

/// How far [`Shifts::list()`] looks into the past and the future.
pub const SHIFT_WINDOW: Months = Months::new(3);

/// A shift on the staff calendar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shift {
    /// The identifier of the calendar entry.
    pub id: Option<String>,
    /// The title shown on the calendar, usually who is working.
    pub title: String,
    /// When the shift starts, as sent by the server.
    pub start: String,
    /// When the shift ends, as sent by the server.
    pub end: String,
    /// Whether the shift spans whole days.
    pub all_day: bool,
    /// The `#rrggbb` color of the shift.
    pub color: String,
    /// Why the shift was scheduled.
    pub description: Option<String>,
    /// The training given during the shift.
    pub training: Option<String>,
    /// The course the shift is for.
    pub course: Option<String>,
    /// The language the shift is held in.
    pub language: Option<String>,
    /// Whether the shift is only a draft.
    pub draft: bool,
    /// Whether the user the schedule was asked for works this shift.
    pub has_current_user: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarEvent {
    #[serde(default)]
    id: Option<JsonValue>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default)]
    all_day: bool,
    #[serde(default)]
    extended_props: EventDetails,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDetails {
    event_type: Option<String>,
    background: Option<String>,
    description: Option<String>,
    training: Option<String>,
    course: Option<String>,
    language: Option<String>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    has_current_user: bool,
}

impl CalendarEvent {
    fn into_shift(self) -> Option<Shift> {
        let details = self.extended_props;
        if details.event_type.as_deref() != Some("shift") {
            return None;
        }

        let id = match self.id {
            Some(JsonValue::String(id)) => Some(id),
            Some(JsonValue::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Some(Shift {
            id,
            title: self.title,
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            color: color_from_background(details.background.as_deref()),
            description: details.description,
            training: details.training,
            course: details.course,
            language: details.language,
            draft: details.draft,
            has_current_user: details.has_current_user,
        })
    }
}

/// The first `#rrggbb` color in a CSS background, or
/// [`DEFAULT_SHIFT_COLOR`].
pub fn color_from_background(background: Option<&str>) -> String {
    background
        .and_then(|background| {
            background.match_indices('#').find_map(|(i, _)| {
                let color = background.get(i..i + 7)?;
                color[1..].chars().all(|c| c.is_ascii_hexdigit()).then(|| color.to_owned())
            })
        })
        .unwrap_or_else(|| DEFAULT_SHIFT_COLOR.to_owned())
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The shift schedules of the spaces.
#[derive(Debug, Clone)]
pub struct Shifts {
    client: Client,
}

impl Shifts {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// The shifts of the space `space_id` from [`SHIFT_WINDOW`] ago until
    /// [`SHIFT_WINDOW`] from now, only those of `user_id` if given.
    pub async fn list(&self, space_id: u64, user_id: Option<u64>) -> Result<Vec<Shift>> {
        let now = Utc::now();
        let start = now.checked_sub_months(SHIFT_WINDOW).unwrap_or(now);
        let end = now.checked_add_months(SHIFT_WINDOW).unwrap_or(now);

        self.list_between(space_id, user_id, start, end).await
    }

    /// The shifts of the space `space_id` between `start` and `end`, only
    /// those of `user_id` if given.
    ///
    /// Entries of the calendar that aren't shifts are left out.
    #[instrument(skip(self))]
    pub async fn list_between(
        &self,
        space_id: u64,
        user_id: Option<u64>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Shift>> {
        let mut url = self.client.endpoint(&format!("staff/my_calendar/json/{space_id}"))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("event_type", "shift")
                .append_pair("start", &timestamp(start))
                .append_pair("end", &timestamp(end));

            if let Some(user_id) = user_id {
                query.append_pair("user_id", &user_id.to_string());
            }
        }

        let events: Vec<CalendarEvent> =
            self.client.send_to::<(), _>(Method::GET, url, None, None).await?;
        let total = events.len();

        let shifts: Vec<_> = events.into_iter().filter_map(CalendarEvent::into_shift).collect();
        debug!(total, shifts = shifts.len(), "Fetched the calendar");

        Ok(shifts)
    }
}
