use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use makerrepo_sdk::{shifts::DEFAULT_SHIFT_COLOR, staff_dashboard::SpaceRoster, HttpError};
use makerrepo_test::{async_test, test_json};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path, query_param, query_param_is_missing},
    Mock, ResponseTemplate,
};

use crate::stored_session_client_with_server;

#[async_test]
async fn test_roster_is_cached() {
    let (client, server) = stored_session_client_with_server().await;
    let dashboard = client.staff_dashboard();

    Mock::given(method("GET"))
        .and(path("/staff_dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::ROSTER))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(dashboard.cached_roster(), None);

    let roster = dashboard.roster().await.unwrap();

    assert_eq!(roster.space_users.len(), 2);
    assert_eq!(client.staff_dashboard().cached_roster(), Some(roster));
}

#[async_test]
async fn test_concurrent_roster_fetches_are_deduplicated() {
    let (client, server) = stored_session_client_with_server().await;
    let dashboard = client.staff_dashboard();

    Mock::given(method("GET"))
        .and(path("/staff_dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&*test_json::ROSTER)
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (first, second) = tokio::join!(dashboard.roster(), dashboard.roster());

    assert_eq!(first.unwrap(), second.unwrap());
}

#[async_test]
async fn test_cancelled_roster_fetch_does_not_block_later_ones() {
    let (client, server) = stored_session_client_with_server().await;
    let dashboard = client.staff_dashboard();

    Mock::given(method("GET"))
        .and(path("/staff_dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&*test_json::ROSTER)
                .set_delay(Duration::from_millis(500)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/staff_dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::ROSTER_AFTER_SIGN_IN))
        .mount(&server)
        .await;

    let timed_out = tokio::time::timeout(Duration::from_millis(50), dashboard.roster()).await;
    assert!(timed_out.is_err());

    let roster = dashboard.roster().await.unwrap();
    assert!(roster.contains("dave"));
    assert_eq!(dashboard.cached_roster(), Some(roster));
}

#[async_test]
async fn test_sign_in_during_a_refresh_gets_a_fresh_roster() {
    let (client, server) = stored_session_client_with_server().await;
    let dashboard = client.staff_dashboard();

    // The refresh started before the sign-in answers last, with the old
    // roster.
    Mock::given(method("GET"))
        .and(path("/staff_dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&*test_json::ROSTER)
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/staff_dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::ROSTER_AFTER_SIGN_IN))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/staff_dashboard/add_users"))
        .and(query_param("added_users", "dave"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (refreshed, signed_in) = tokio::join!(dashboard.roster(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        dashboard.sign_in_user("dave").await
    });

    assert!(!refreshed.unwrap().contains("dave"));
    assert!(signed_in.unwrap().contains("dave"));
    assert!(dashboard.cached_roster().unwrap().contains("dave"));
}

#[async_test]
async fn test_sign_in_user_refetches_the_roster() {
    let (client, server) = stored_session_client_with_server().await;
    let dashboard = client.staff_dashboard();

    Mock::given(method("PUT"))
        .and(path("/staff_dashboard/add_users"))
        .and(query_param("added_users", "dave"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/staff_dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::ROSTER_AFTER_SIGN_IN))
        .expect(1)
        .mount(&server)
        .await;

    let mut updates = dashboard.subscribe_roster();
    let roster = dashboard.sign_in_user("dave").await.unwrap();

    assert!(roster.contains("dave"));
    assert_eq!(updates.next().await.flatten(), Some(roster));
}

#[async_test]
async fn test_sign_out_users_and_change_space() {
    let (client, server) = stored_session_client_with_server().await;
    let dashboard = client.staff_dashboard();

    Mock::given(method("PUT"))
        .and(path("/staff_dashboard/remove_users"))
        .and(query_param("dropped_users[]", "carol"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::EMPTY))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/staff_dashboard/change_space"))
        .and(query_param("space_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::EMPTY))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/staff_dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::ROSTER))
        .expect(2)
        .mount(&server)
        .await;

    dashboard.sign_out_users(&["carol"]).await.unwrap();
    let roster: SpaceRoster = dashboard.change_space(2).await.unwrap();

    assert_eq!(roster.space_list.len(), 3);
}

#[async_test]
async fn test_search_values_are_encoded() {
    let (client, server) = stored_session_client_with_server().await;
    let dashboard = client.staff_dashboard();

    Mock::given(method("GET"))
        .and(path("/staff_dashboard/populate_users"))
        .and(query_param("search", "da&ve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::POPULATE_USERS))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/staff_dashboard/search"))
        .and(query_param("query", "dave grohl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::SEARCH))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = dashboard.populate_users("da&ve").await.unwrap();
    assert_eq!(suggestions[1].username, "dbowie");

    let results = dashboard.search("dave grohl").await.unwrap();
    assert_eq!(results[0]["username"], "dave");
}

#[async_test]
async fn test_rfid_cards() {
    let (client, server) = stored_session_client_with_server().await;
    let dashboard = client.staff_dashboard();

    Mock::given(method("GET"))
        .and(path("/rfid/get_unset_rfids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::UNSET_RFIDS))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/staff_dashboard/link_rfid"))
        .and(body_json(json!({ "card_number": "DEADBEEF", "user_id": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "OK" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/staff_dashboard/unlink_rfid"))
        .and(body_json(json!({ "card_number": "04A1B2C3" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "error" })))
        .expect(1)
        .mount(&server)
        .await;

    let cards = dashboard.unset_rfids().await.unwrap();
    assert_eq!(cards[1].card_number, "DEADBEEF");

    assert!(dashboard.link_rfid("DEADBEEF", 7).await.unwrap());
    assert!(!dashboard.unlink_rfid("04A1B2C3").await.unwrap());
}

#[async_test]
async fn test_shifts_of_a_user() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/staff/my_calendar/json/1"))
        .and(query_param("event_type", "shift"))
        .and(query_param("start", "2023-11-05T00:00:00.000Z"))
        .and(query_param("end", "2024-05-05T00:00:00.000Z"))
        .and(query_param("user_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::SHIFTS))
        .expect(1)
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2023, 11, 5, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, 5, 0, 0, 0).unwrap();
    let shifts = client.shifts().list_between(1, Some(42), start, end).await.unwrap();

    // The training on the calendar isn't a shift.
    assert_eq!(shifts.len(), 2);

    assert_eq!(shifts[0].id.as_deref(), Some("71"));
    assert_eq!(shifts[0].title, "Alice Liddell");
    assert_eq!(shifts[0].color, "#aa3377");
    assert_eq!(shifts[0].language.as_deref(), Some("English"));
    assert!(shifts[0].has_current_user);

    assert_eq!(shifts[1].id.as_deref(), Some("s-3"));
    assert_eq!(shifts[1].color, DEFAULT_SHIFT_COLOR);
    assert!(shifts[1].draft);
}

#[async_test]
async fn test_shifts_of_everybody() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/staff/my_calendar/json/2"))
        .and(query_param("event_type", "shift"))
        .and(query_param_is_missing("user_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.shifts().list(2, None).await.unwrap().is_empty());
}

#[async_test]
async fn test_shifts_need_a_list() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/staff/my_calendar/json/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "nope" })))
        .mount(&server)
        .await;

    let error = client.shifts().list(1, None).await.unwrap_err();
    assert_matches!(error.as_http_error(), Some(HttpError::Deserialization(_)));
}
