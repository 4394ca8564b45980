use makerrepo_sdk::{config::Environment, Client, MemoryStore, SessionStoreExt, UserProfile};
use makerrepo_test::{test_json, TEST_TOKEN};
use wiremock::MockServer;

mod account;
mod authentication;
mod rfid;
mod staff_dashboard;

makerrepo_test::init_tracing_for_tests!();

/// A client talking to a fresh mock server, without a session.
async fn test_client_with_server() -> (Client, MockServer) {
    let server = MockServer::start().await;
    let client = Client::builder()
        .environment(Environment::Development)
        .base_url(server.uri())
        .session_store(MemoryStore::new())
        .build()
        .unwrap();

    (client, server)
}

/// A client talking to a fresh mock server, with the session of the staff
/// fixture user stored but not yet checked.
async fn stored_session_client_with_server() -> (Client, MockServer) {
    let (client, server) = test_client_with_server().await;
    client.session_store().set_session(TEST_TOKEN, &staff_user()).await.unwrap();

    (client, server)
}

fn staff_user() -> UserProfile {
    serde_json::from_value(test_json::STAFF_USER.clone()).unwrap()
}
