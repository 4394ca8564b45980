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

//! Signing people in and out of a space with their RFID cards.
//!
//! A [`RfidTapHandler`] is bound to one space. Each tap posts the card
//! number to the server, which toggles the card owner's presence in the
//! space and reports which way it went. The outcome of the latest tap is
//! published as a [`TapStatus`] for the UI to show.

use std::sync::Arc;

use eyeball::{SharedObservable, Subscriber};
use futures_util::{future, stream::BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::Client;

mod reader;

pub use reader::{normalize_card_number, NfcReader};

/// The `success` value the server answers with when it signed the card
/// owner out.
pub const SIGN_OUT_SENTINEL: &str = "RFID sign out";

/// The message shown when a tap couldn't be processed.
pub const TAP_ERROR_MESSAGE: &str =
    "An error has occurred... Please make sure the card is registered";

/// Errors of the card reader.
#[derive(Debug, thiserror::Error)]
pub enum RfidError {
    /// The device has no card reader.
    #[error("NFC is not supported on this device")]
    Unsupported,

    /// The reader failed to start listening for taps.
    #[error("couldn't start scanning: {0}")]
    ScanFailed(String),
}

/// What the server did with a tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapAction {
    /// The card owner is now in the space.
    SignedIn,
    /// The card owner left the space.
    SignedOut,
    /// The tap wasn't processed, the card is most likely not registered.
    Error,
}

/// How a [`TapStatus`] should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Positive feedback.
    Success,
    /// Neutral feedback that stands out.
    Warning,
    /// Something went wrong.
    Error,
}

/// The outcome of the latest processed tap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapStatus {
    /// What the server did.
    pub action: TapAction,
    /// The normalized number of the tapped card.
    pub card_number: String,
}

impl TapStatus {
    /// How the status should be presented.
    pub fn severity(&self) -> Severity {
        match self.action {
            TapAction::SignedIn => Severity::Success,
            TapAction::SignedOut => Severity::Warning,
            TapAction::Error => Severity::Error,
        }
    }

    /// The message to show.
    pub fn message(&self) -> &'static str {
        match self.action {
            TapAction::SignedIn => "Signed In!",
            TapAction::SignedOut => "Signed Out!",
            TapAction::Error => TAP_ERROR_MESSAGE,
        }
    }
}

/// The result of [`RfidTapHandler::handle_tap()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// The tap was sent to the server.
    Processed(TapStatus),
    /// Another tap was still being processed; this one was dropped.
    Busy,
    /// The serial didn't contain a card number.
    InvalidCard,
}

#[derive(Serialize)]
struct TapRequest<'a> {
    rfid: &'a str,
    space_id: u64,
}

/// The answer of the server to a tap.
///
/// Newer servers say what happened in `action`. Older ones only send
/// `success`, which is truthy if the tap was processed and equal to
/// [`SIGN_OUT_SENTINEL`] if it signed the owner out.
#[derive(Debug, Default, Deserialize)]
pub struct TapResponse {
    /// The explicit outcome.
    #[serde(default)]
    pub action: Option<TapAction>,
    /// The legacy outcome.
    #[serde(default)]
    pub success: JsonValue,
}

impl TapResponse {
    /// What the server did with the tap.
    pub fn action(&self) -> TapAction {
        if let Some(action) = self.action {
            return action;
        }

        match &self.success {
            JsonValue::String(s) if s == SIGN_OUT_SENTINEL => TapAction::SignedOut,
            value if is_truthy(value) => TapAction::SignedIn,
            _ => TapAction::Error,
        }
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Signs card owners in and out of one space.
///
/// Only one tap is processed at a time: taps arriving while a request is in
/// flight are dropped with [`TapOutcome::Busy`], so a card lingering on the
/// reader doesn't toggle its owner twice. Clones share the in-flight guard
/// and the status.
#[derive(Clone, Debug)]
pub struct RfidTapHandler {
    client: Client,
    space_id: u64,
    in_flight: Arc<Mutex<()>>,
    status: SharedObservable<Option<TapStatus>>,
}

impl RfidTapHandler {
    pub(crate) fn new(client: Client, space_id: u64) -> Self {
        Self {
            client,
            space_id,
            in_flight: Default::default(),
            status: SharedObservable::new(None),
        }
    }

    /// The space taps sign people in and out of.
    pub fn space_id(&self) -> u64 {
        self.space_id
    }

    /// The outcome of the latest processed tap.
    pub fn status(&self) -> Option<TapStatus> {
        self.status.get()
    }

    /// Subscribe to the outcomes of the processed taps.
    pub fn subscribe(&self) -> Subscriber<Option<TapStatus>> {
        self.status.subscribe()
    }

    /// Process a single tap of the card with the given serial.
    ///
    /// Any failure of the request, or an answer the server didn't accept,
    /// is reported as [`TapAction::Error`].
    #[instrument(skip(self), fields(space_id = self.space_id))]
    pub async fn handle_tap(&self, serial: &str) -> TapOutcome {
        let Some(card_number) = normalize_card_number(serial) else {
            warn!("Ignoring a tap without a card number");
            return TapOutcome::InvalidCard;
        };

        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!(%card_number, "A tap is already being processed, ignoring this one");
            return TapOutcome::Busy;
        };

        let request = TapRequest { rfid: &card_number, space_id: self.space_id };
        let action = match self.client.post::<_, TapResponse>("rfid/card_number", &request).await
        {
            Ok(response) => response.action(),
            Err(error) => {
                warn!(?error, %card_number, "Couldn't process the tap");
                TapAction::Error
            }
        };

        info!(%card_number, ?action, "Processed a tap");

        let status = TapStatus { action, card_number };
        self.status.set(Some(status.clone()));

        TapOutcome::Processed(status)
    }

    /// Process the taps of `reader` as they come in, yielding each raw
    /// serial with its outcome, dropped taps included.
    ///
    /// A tap arriving while another one is in flight is dropped rather than
    /// queued, so outcomes may arrive out of order.
    pub fn process_taps(
        &self,
        reader: &dyn NfcReader,
    ) -> Result<BoxStream<'_, (String, TapOutcome)>, RfidError> {
        if !reader.is_supported() {
            return Err(RfidError::Unsupported);
        }

        let taps = reader.scan()?;
        info!(space_id = self.space_id, "Waiting for card taps");

        Ok(taps
            .map(move |serial| async move {
                let outcome = self.handle_tap(&serial).await;
                (serial, outcome)
            })
            .buffer_unordered(usize::MAX)
            .boxed())
    }

    /// Process the taps of `reader` until it stops.
    ///
    /// The outcomes are only published through [`status()`][Self::status];
    /// use [`process_taps()`][Self::process_taps] to see every one of them.
    pub async fn start_scanning(&self, reader: &dyn NfcReader) -> Result<(), RfidError> {
        self.process_taps(reader)?.for_each(|_| future::ready(())).await;

        debug!("The card reader stopped");
        Ok(())
    }
}
