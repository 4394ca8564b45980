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

use std::fmt::Debug;

use futures_util::stream::BoxStream;

use super::RfidError;

/// A source of RFID/NFC card taps.
///
/// Implementations wrap whatever hardware or platform API reads the cards.
/// Every tap yields the serial number of the card, in whatever format the
/// reader produces; it's normalized before being sent to the server.
pub trait NfcReader: Debug + Send + Sync {
    /// Whether this device can read cards at all.
    fn is_supported(&self) -> bool;

    /// Start listening for taps.
    ///
    /// The stream ends when the reader stops.
    fn scan(&self) -> Result<BoxStream<'static, String>, RfidError>;
}

/// Normalize a card serial as reported by a reader, for example
/// `04:a1:b2:c3`, to the form the server knows the card by: `04A1B2C3`.
///
/// Separators (`:`, `-` and whitespace) are removed and hex digits are
/// uppercased. Returns `None` if nothing is left.
pub fn normalize_card_number(serial: &str) -> Option<String> {
    let card_number: String = serial
        .chars()
        .filter(|c| *c != ':' && *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    (!card_number.is_empty()).then_some(card_number)
}
