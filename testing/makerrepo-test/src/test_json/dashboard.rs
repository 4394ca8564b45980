//! Responses of the staff dashboard, training, printer and profile endpoints.

use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};

/// `GET /staff_dashboard`
pub static ROSTER: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "space": { "id": 1, "name": "MakerSpace" },
        "space_list": [["MakerSpace", 1], ["Brunsfield Centre", 2], ["JMTS", 3]],
        "space_users": [
            {
                "id": 7,
                "name": "Bob Builder",
                "username": "bob",
                "email": "bob@example.org",
                "flagged": false,
            },
            {
                "id": 9,
                "name": "Carol Danvers",
                "username": "carol",
                "email": "carol@example.org",
                "flagged": true,
            },
        ],
    })
});

/// `GET /staff_dashboard` once `dave` signed in.
pub static ROSTER_AFTER_SIGN_IN: Lazy<JsonValue> = Lazy::new(|| {
    let mut roster = ROSTER.clone();
    roster["space_users"].as_array_mut().expect("the roster has users").push(json!({
        "id": 11,
        "name": "Dave Grohl",
        "username": "dave",
        "email": "dave@example.org",
        "flagged": false,
    }));
    roster
});

/// `GET /staff_dashboard/populate_users?search=`
pub static POPULATE_USERS: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "users": [
            { "name": "Dave Grohl", "username": "dave" },
            { "name": "David Bowie", "username": "dbowie" },
        ],
    })
});

/// `GET /staff_dashboard/search?query=`
pub static SEARCH: Lazy<JsonValue> = Lazy::new(|| {
    json!([
        {
            "id": 11,
            "name": "Dave Grohl",
            "username": "dave",
            "email": "dave@example.org",
        },
    ])
});

/// `GET /rfid/get_unset_rfids`
pub static UNSET_RFIDS: Lazy<JsonValue> = Lazy::new(|| {
    json!([
        { "card_number": "0A0B0C0D", "created_at": "2023-09-12T14:03:00.000-04:00" },
        { "card_number": "DEADBEEF", "created_at": "2023-09-12T15:44:00.000-04:00" },
    ])
});

/// `GET /staff/training_sessions`
pub static TRAINING_SESSIONS: Lazy<JsonValue> = Lazy::new(|| {
    json!([
        {
            "id": 31,
            "updated_at": "2023-10-01T10:00:00.000-04:00",
            "course": "GNG2101",
            "level": "Beginner",
            "training": { "id": 2, "name": "Laser Cutter" },
            "space": { "id": 1, "name": "MakerSpace" },
            "certifications": [],
        },
        {
            "id": 32,
            "updated_at": "2023-10-02T10:00:00.000-04:00",
            "course": "no course",
            "level": "Intermediate",
            "training": { "id": 3, "name": "3D Printing" },
            "space": { "id": 1, "name": "MakerSpace" },
            "certifications": [{ "id": 400 }],
        },
    ])
});

/// `GET /staff/training_sessions/new`
pub static NEW_TRAINING_SESSION: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "trainings": [[2, "Laser Cutter"], [3, "3D Printing"]],
        "level": ["Beginner", "Intermediate", "Advanced"],
        "course_names": ["no course", "GNG2101"],
        "admins": [[42, "Alice Liddell"]],
        "users": [[7, "Bob Builder"], [9, "Carol Danvers"]],
    })
});

/// `GET /printers/printer_data`
pub static PRINTER_DATA: Lazy<JsonValue> = Lazy::new(|| {
    json!([
        {
            "id": 1,
            "name": "Ultimaker 2+",
            "short_form": "UM2P",
            "available": true,
            "printers": [
                { "id": 10, "number": "1", "maintenance": false, "has_issues": false },
                { "id": 11, "number": "2", "maintenance": true, "has_issues": true },
            ],
        },
    ])
});

/// `GET /printer_issues`
pub static PRINTER_ISSUES: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "issues": [
            {
                "id": 5,
                "printer_id": 11,
                "summary": "Nozzle clogged",
                "description": "Filament doesn't extrude",
                "active": true,
                "created_at": "2023-10-03T09:00:00.000-04:00",
            },
        ],
    })
});

/// `GET /{username}`
pub static PROFILE: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "user": *crate::test_json::REGULAR_USER,
        "programs": ["Volunteer Program"],
        "certifications": [{ "id": 400, "training": "3D Printing" }],
        "remaining_trainings": [{ "id": 2, "name": "Laser Cutter" }],
    })
});

/// `GET /hours`
pub static SPACE_HOURS: Lazy<JsonValue> = Lazy::new(|| {
    json!([
        {
            "name": "MakerSpace",
            "email": "makerspace@example.org",
            "address": "800 King Edward Ave",
            "phone_number": "613-555-0100",
            "opening_hour": {
                "students": "<p>Mon-Fri 9:00-17:00</p>",
                "public": "<p>Sat 10:00-14:00</p>",
                "summer": null,
            },
        },
    ])
});

/// `GET /staff/my_calendar/json/{space_id}`
pub static SHIFTS: Lazy<JsonValue> = Lazy::new(|| {
    json!([
        {
            "id": 71,
            "title": "Alice Liddell",
            "start": "2024-02-05T09:00:00.000-05:00",
            "end": "2024-02-05T13:00:00.000-05:00",
            "allDay": false,
            "extendedProps": {
                "eventType": "shift",
                "background": "linear-gradient(to right, #aa3377 50%, #3388cc 50%)",
                "language": "English",
                "hasCurrentUser": true,
            },
        },
        {
            "id": "t-12",
            "title": "Laser Cutter training",
            "start": "2024-02-06T10:00:00.000-05:00",
            "end": "2024-02-06T11:00:00.000-05:00",
            "extendedProps": {
                "eventType": "training",
                "training": "Laser Cutter",
            },
        },
        {
            "id": "s-3",
            "title": "Bob Builder",
            "start": "2024-02-07T13:00:00.000-05:00",
            "end": "2024-02-07T17:00:00.000-05:00",
            "extendedProps": {
                "eventType": "shift",
                "draft": true,
            },
        },
    ])
});
