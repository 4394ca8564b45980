use std::time::Duration;

use assert_matches::assert_matches;
use makerrepo_sdk::{
    rfid::{RfidError, Severity, TapAction},
    test_utils::MockNfcReader,
    TapOutcome,
};
use makerrepo_test::{async_test, test_json};
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, ResponseTemplate,
};

use crate::stored_session_client_with_server;

#[async_test]
async fn test_tap_classification() {
    let cases = [
        (&*test_json::RFID_SIGN_IN, TapAction::SignedIn, "Signed In!", Severity::Success),
        (&*test_json::RFID_SIGN_OUT, TapAction::SignedOut, "Signed Out!", Severity::Warning),
        (
            &*test_json::RFID_UNKNOWN_CARD,
            TapAction::Error,
            "An error has occurred... Please make sure the card is registered",
            Severity::Error,
        ),
        (&*test_json::RFID_ACTION_SIGNED_OUT, TapAction::SignedOut, "Signed Out!", Severity::Warning),
    ];

    for (response, action, message, severity) in cases {
        let (client, server) = stored_session_client_with_server().await;

        Mock::given(method("POST"))
            .and(path("/rfid/card_number"))
            .and(header("authorization", "Bearer 1234"))
            .and(body_json(json!({ "rfid": "04A1B2C3", "space_id": 3 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client.rfid(3).handle_tap("04:a1:b2:c3").await;

        assert_matches!(outcome, TapOutcome::Processed(status) => {
            assert_eq!(status.action, action);
            assert_eq!(status.message(), message);
            assert_eq!(status.severity(), severity);
        });
    }
}

#[async_test]
async fn test_unreachable_server_is_an_error_status() {
    let (client, server) = stored_session_client_with_server().await;
    drop(server);

    let handler = client.rfid(1);
    assert_matches!(
        handler.handle_tap("04A1B2C3").await,
        TapOutcome::Processed(status) if status.action == TapAction::Error
    );
}

#[async_test]
async fn test_scanning_publishes_statuses() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("POST"))
        .and(path("/rfid/card_number"))
        .and(body_json(json!({ "rfid": "DEADBEEF", "space_id": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::RFID_SIGN_OUT))
        .expect(1)
        .mount(&server)
        .await;

    let handler = client.rfid(1);
    let mut statuses = handler.subscribe();
    let (reader, taps) = MockNfcReader::new(true);

    let scanning = tokio::spawn({
        let handler = handler.clone();
        async move { handler.start_scanning(&reader).await }
    });

    taps.send("de:ad:be:ef".to_owned()).unwrap();

    let status = statuses.next().await.flatten().unwrap();
    assert_eq!(status.action, TapAction::SignedOut);
    assert_eq!(status.card_number, "DEADBEEF");

    drop(taps);
    scanning.await.unwrap().unwrap();
}

#[async_test]
async fn test_double_tap_sends_one_request() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("POST"))
        .and(path("/rfid/card_number"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&*test_json::RFID_SIGN_IN)
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let handler = client.rfid(1);
    let (reader, taps) = MockNfcReader::new(true);

    taps.send("04A1B2C3".to_owned()).unwrap();
    taps.send("04A1B2C3".to_owned()).unwrap();
    drop(taps);

    handler.start_scanning(&reader).await.unwrap();

    assert_eq!(handler.status().map(|s| s.action), Some(TapAction::SignedIn));
}

#[async_test]
async fn test_reader_can_only_scan_once() {
    let (client, _server) = stored_session_client_with_server().await;
    let (reader, taps) = MockNfcReader::new(true);
    drop(taps);

    let handler = client.rfid(1);
    handler.start_scanning(&reader).await.unwrap();

    assert_matches!(handler.start_scanning(&reader).await, Err(RfidError::ScanFailed(_)));
}
