//! Canned responses of the MakerRepo server.
//!
//! Exporting each static gives every test crate a single source of truth for
//! the shape of the server responses.

use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};

pub mod dashboard;

pub use dashboard::{
    NEW_TRAINING_SESSION, POPULATE_USERS, PRINTER_DATA, PRINTER_ISSUES, PROFILE, ROSTER,
    ROSTER_AFTER_SIGN_IN, SEARCH, SHIFTS, SPACE_HOURS, TRAINING_SESSIONS, UNSET_RFIDS,
};

/// An empty response.
pub static EMPTY: Lazy<JsonValue> = Lazy::new(|| json!({}));

/// The profile of a staff member.
pub static STAFF_USER: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "id": 42,
        "username": "alice",
        "name": "Alice Liddell",
        "email": "alice@example.org",
        "role": "staff",
        "faculty": "Engineering",
        "program": "Mechanical Engineering",
        "year_of_study": 3,
        "identity": "undergrad",
    })
});

/// The profile of a regular member.
pub static REGULAR_USER: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "id": 7,
        "username": "bob",
        "name": "Bob Builder",
        "email": "bob@example.org",
        "role": "regular_user",
        "rfid": { "card_number": "04A1B2C3" },
    })
});

/// `POST /login_authentication`
pub static LOGIN: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "token": crate::TEST_TOKEN,
        "user": *STAFF_USER,
    })
});

/// `POST /login_authentication` with bad credentials.
pub static LOGIN_ERROR: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "error": "Invalid username or password",
    })
});

/// `GET /check_signed_in`, rotating the token.
pub static CHECK_SIGNED_IN: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "token": crate::ROTATED_TOKEN,
        "user": *STAFF_USER,
    })
});

/// `GET /check_signed_in`, without a new token.
pub static CHECK_SIGNED_IN_NO_TOKEN: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "user": *REGULAR_USER,
    })
});

/// `GET /check_signed_in` answering with something that isn't a session.
pub static CHECK_SIGNED_IN_MALFORMED: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "logged_in": true,
    })
});

/// `POST /rfid/card_number` signing the card owner in.
pub static RFID_SIGN_IN: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "success": "RFID sign in",
    })
});

/// `POST /rfid/card_number` signing the card owner out, legacy sentinel.
pub static RFID_SIGN_OUT: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "success": "RFID sign out",
    })
});

/// `POST /rfid/card_number` with an unknown card.
pub static RFID_UNKNOWN_CARD: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "success": false,
        "error": "Temporary RFID created",
    })
});

/// `POST /rfid/card_number` with the explicit action field.
pub static RFID_ACTION_SIGNED_OUT: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "action": "signed_out",
        "success": "RFID sign out",
    })
});
