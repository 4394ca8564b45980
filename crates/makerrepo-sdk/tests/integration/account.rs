use assert_matches::assert_matches;
use makerrepo_sdk::{
    account::SupportRequest, printers::PrinterStats, training::NewTrainingSession, Error, Role,
};
use makerrepo_test::{async_test, test_json};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, ResponseTemplate,
};

use crate::stored_session_client_with_server;

#[async_test]
async fn test_profile_and_admin_changes() {
    let (client, server) = stored_session_client_with_server().await;
    let account = client.account();

    Mock::given(method("GET"))
        .and(path("/bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::PROFILE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/admin/users/set_role"))
        .and(body_json(json!({ "id": 7, "role": "staff" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/change_programs"))
        .and(body_json(json!({ "user_id": 7, "dev_program": true, "volunteer": false })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let profile = account.profile("bob").await.unwrap();
    assert_eq!(profile.user.rfid.as_ref().map(|r| r.card_number.as_str()), Some("04A1B2C3"));
    assert!(profile.is_volunteer());

    account.set_role(7, &Role::Staff).await.unwrap();
    account.change_programs(7, true, false).await.unwrap();
}

#[async_test]
async fn test_profile_username_is_one_segment() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::PROFILE))
        .expect(1)
        .mount(&server)
        .await;

    client.account().profile("a/b").await.unwrap();
}

#[async_test]
async fn test_support_request() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("PUT"))
        .and(path("/send_email"))
        .and(body_json(json!({
            "name": "Bob",
            "email": "bob@example.org",
            "subject": "Laser cutter",
            "comments": "It's on fire",
            "app_version": "1.0.0 Beta",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::EMPTY))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = SupportRequest {
        name: "Bob".to_owned(),
        email: "bob@example.org".to_owned(),
        subject: "Laser cutter".to_owned(),
        comments: String::new(),
    };

    assert_matches!(
        client.account().send_support_request(&request).await,
        Err(Error::MissingFields(fields)) if fields == ["comments"]
    );

    request.comments = "It's on fire".to_owned();
    client.account().send_support_request(&request).await.unwrap();
}

#[async_test]
async fn test_space_hours() {
    let (client, server) = stored_session_client_with_server().await;

    Mock::given(method("GET"))
        .and(path("/hours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::SPACE_HOURS))
        .mount(&server)
        .await;

    let hours = client.account().space_hours().await.unwrap();
    assert_eq!(hours[0].name.as_deref(), Some("MakerSpace"));
}

#[async_test]
async fn test_training_sessions() {
    let (client, server) = stored_session_client_with_server().await;
    let training = client.training_sessions();

    Mock::given(method("GET"))
        .and(path("/staff/training_sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::TRAINING_SESSIONS))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/staff/training_sessions/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::NEW_TRAINING_SESSION))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/staff/training_sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "created": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/staff/training_sessions/31/certify_trainees"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "certified": false })))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = training.list().await.unwrap();
    assert_eq!(sessions.iter().filter(|s| s.is_completed()).count(), 1);

    let form = training.new_session_form().await.unwrap();
    let session = NewTrainingSession {
        space_id: 1,
        training_id: form.trainings[0].0,
        level: form.level[0].clone(),
        course: form.course_names[0].clone(),
        instructor_id: form.admins[0].0,
        trainee_ids: form.users.iter().map(|(id, _)| *id).collect(),
    };

    assert!(training.create(&session).await.unwrap());
    assert!(!training.certify_trainees(31).await.unwrap());
}

#[async_test]
async fn test_printers() {
    let (client, server) = stored_session_client_with_server().await;
    let printers = client.printers();

    Mock::given(method("GET"))
        .and(path("/printers/printer_data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::PRINTER_DATA))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/printer_issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*test_json::PRINTER_ISSUES))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/printers/link_printer_to_user"))
        .and(body_json(json!({ "printer": { "user_id": 7, "printer_id": 10 } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let types = printers.printer_data().await.unwrap();
    let issues = printers.issues().await.unwrap();

    assert_eq!(PrinterStats::new(&types, &issues).available, 1);
    printers.link_to_user(10, 7).await.unwrap();
}
