use std::io;

use assert_matches::assert_matches;
use makerrepo_sdk::{
    async_trait, config::Environment, AuthState, Client, Error, MemoryStore, Role, SessionStore,
    SessionStoreExt, StoreError,
};
use makerrepo_test::{async_test, test_json, ROTATED_TOKEN, TEST_TOKEN};
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::{staff_user, stored_session_client_with_server, test_client_with_server};

#[async_test]
async fn test_bootstrap_without_token_makes_no_request() {
    let (client, server) = test_client_with_server().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::CHECK_SIGNED_IN))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(client.auth_state(), AuthState::Unchecked);
    assert_eq!(client.bootstrap().await.unwrap(), AuthState::Unauthenticated);
    assert_eq!(client.auth_state(), AuthState::Unauthenticated);
}

#[async_test]
async fn test_bootstrap_empty_token_counts_as_none() {
    let (client, server) = test_client_with_server().await;
    client.session_store().set_item("token", String::new()).await.unwrap();

    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    assert_eq!(client.bootstrap().await.unwrap(), AuthState::Unauthenticated);
}

#[async_test]
async fn test_bootstrap_rotates_token() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/check_signed_in"))
        .and(header("authorization", "Bearer 1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::CHECK_SIGNED_IN))
        .expect(1)
        .mount(&server)
        .await;

    let state = client.bootstrap().await.unwrap();

    assert_eq!(state, AuthState::Authenticated(staff_user()));
    assert_eq!(client.session_store().get_token().await.unwrap().as_deref(), Some(ROTATED_TOKEN));
    assert_eq!(client.user().map(|u| u.role), Some(Role::Staff));
}

#[async_test]
async fn test_bootstrap_keeps_token_and_replaces_user() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/check_signed_in"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&*test_json::CHECK_SIGNED_IN_NO_TOKEN),
        )
        .mount(&server)
        .await;

    let state = client.bootstrap().await.unwrap();

    assert_matches!(state, AuthState::Authenticated(user) if user.username == "bob");
    assert_eq!(client.session_store().get_token().await.unwrap().as_deref(), Some(TEST_TOKEN));
    assert_eq!(
        client.session_store().get_user().await.unwrap().map(|u| u.username),
        Some("bob".to_owned())
    );
}

/// The authenticated flag equals "token present and the check succeeded",
/// and every failed check clears the session.
#[async_test]
async fn test_bootstrap_truth_table() {
    let failures = [
        ResponseTemplate::new(401).set_body_json(json!({ "error": "expired" })),
        ResponseTemplate::new(500),
        ResponseTemplate::new(200).set_body_json(&*test_json::CHECK_SIGNED_IN_MALFORMED),
        ResponseTemplate::new(200).set_body_string("not json"),
    ];

    for response in failures {
        let (client, server) = stored_session_client_with_server().await;
        Mock::given(method("GET"))
            .and(path("/check_signed_in"))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client.bootstrap().await.unwrap(), AuthState::Unauthenticated);
        assert!(!client.is_authenticated().await.unwrap());
        assert_matches!(client.session().await, Ok(None));
        assert_matches!(client.session_store().get_item("user").await, Ok(None));
    }

    let (client, server) = stored_session_client_with_server().await;
    Mock::given(method("GET"))
        .and(path("/check_signed_in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::CHECK_SIGNED_IN))
        .mount(&server)
        .await;

    assert!(client.bootstrap().await.unwrap().is_authenticated());
    assert!(client.is_authenticated().await.unwrap());
}

#[async_test]
async fn test_bootstrap_transport_failure_clears_session() {
    let (client, server) = stored_session_client_with_server().await;
    drop(server);

    assert_eq!(client.bootstrap().await.unwrap(), AuthState::Unauthenticated);
    assert_matches!(client.session_store().get_token().await, Ok(None));
}

/// A store that can be read and written, but not cleaned up.
#[derive(Debug, Default)]
struct StickyStore(MemoryStore);

#[async_trait]
impl SessionStore for StickyStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.0.set_item(key, value).await
    }

    async fn remove_item(&self, _key: &str) -> Result<(), StoreError> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into())
    }
}

#[async_test]
async fn test_bootstrap_failing_to_clear_keeps_the_state_honest() {
    let server = MockServer::start().await;
    let client = Client::builder()
        .environment(Environment::Development)
        .base_url(server.uri())
        .session_store(StickyStore::default())
        .build()
        .unwrap();
    client.session_store().set_session(TEST_TOKEN, &staff_user()).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/check_signed_in"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    assert_matches!(client.bootstrap().await, Err(Error::Store(_)));

    // The token couldn't be removed, so the client doesn't claim to be logged
    // out either.
    assert!(client.is_authenticated().await.unwrap());
    assert_eq!(client.auth_state(), AuthState::Unchecked);
}

#[async_test]
async fn test_bootstrap_can_run_again() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/check_signed_in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::CHECK_SIGNED_IN))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check_signed_in"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.bootstrap().await.unwrap().is_authenticated());
    assert_eq!(client.bootstrap().await.unwrap(), AuthState::Unauthenticated);
}

#[async_test]
async fn test_subscribers_see_checking() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/check_signed_in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::CHECK_SIGNED_IN))
        .mount(&server)
        .await;

    let mut subscriber = client.subscribe_auth_state();
    let bootstrap = tokio::spawn({
        let client = client.clone();
        async move { client.bootstrap().await }
    });

    assert_eq!(subscriber.next().await, Some(AuthState::Checking));
    assert!(bootstrap.await.unwrap().unwrap().is_authenticated());
    assert!(client.resolved_auth_state().await.is_authenticated());
}

#[async_test]
async fn test_login() {
    let (client, server) = test_client_with_server().await;

    Mock::given(method("POST"))
        .and(path("/login_authentication"))
        .and(body_json(json!({ "username_email": "alice@example.org", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::LOGIN))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.login("alice@example.org", "hunter2").await.unwrap();

    assert_eq!(user, staff_user());
    assert_eq!(client.auth_state(), AuthState::Authenticated(staff_user()));

    let session = client.session().await.unwrap().unwrap();
    assert_eq!(session.token, TEST_TOKEN);
    assert_eq!(session.user, staff_user());
}

#[async_test]
async fn test_login_invalid_credentials() {
    let (client, server) = test_client_with_server().await;

    Mock::given(method("POST"))
        .and(path("/login_authentication"))
        .respond_with(ResponseTemplate::new(401).set_body_json(&*test_json::LOGIN_ERROR))
        .mount(&server)
        .await;

    let error = client.login("alice@example.org", "wrong").await.unwrap_err();

    assert!(error.is_invalid_credentials());
    assert_eq!(client.auth_state(), AuthState::Unauthenticated);
    assert_matches!(client.session().await, Ok(None));
}

#[async_test]
async fn test_login_without_token_is_refused() {
    let (client, server) = test_client_with_server().await;

    Mock::given(method("POST"))
        .and(path("/login_authentication"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "user": *test_json::STAFF_USER })),
        )
        .mount(&server)
        .await;

    assert_matches!(client.login("alice", "hunter2").await, Err(Error::MissingToken));
    assert!(!client.is_authenticated().await.unwrap());
}

#[async_test]
async fn test_logout() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/logout"))
        .and(header("authorization", "Bearer 1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::EMPTY))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();

    assert_eq!(client.auth_state(), AuthState::Unauthenticated);
    assert!(!client.is_authenticated().await.unwrap());
}

#[async_test]
async fn test_failed_logout_keeps_session() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_matches!(client.logout().await, Err(Error::Http(_)));
    assert!(client.is_authenticated().await.unwrap());
}

#[async_test]
async fn test_logout_without_session() {
    let (client, server) = test_client_with_server().await;

    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    assert_matches!(client.logout().await, Err(Error::AuthenticationRequired));
}

#[async_test]
async fn test_malformed_stored_user() {
    let (client, _server) = test_client_with_server().await;
    let store = client.session_store();

    store.set_item("token", TEST_TOKEN.to_owned()).await.unwrap();
    store.set_item("user", "{not json".to_owned()).await.unwrap();

    assert_matches!(store.get_user().await, Ok(None));
    assert_matches!(client.session().await, Ok(None));
    assert!(client.is_authenticated().await.unwrap());
}
