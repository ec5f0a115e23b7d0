use std::time::Duration;

use aeos_chat_client::{ChatApi, ClientError, HttpChatApi};
use httpmock::prelude::*;
use serde_json::json;

fn api(server: &MockServer) -> HttpChatApi {
    HttpChatApi::new(server.base_url(), Duration::from_secs(5))
        .expect("client")
        .with_token("token-123")
}

#[tokio::test]
async fn login_keeps_the_token_for_later_calls() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .json_body(json!({ "email": "ada@example.com", "password": "hunter2hunter2" }));
            then.status(200).json_body(json!({
                "token": "fresh-token",
                "expires_at": "2030-01-01T00:00:00+00:00",
                "user": { "id": "u1", "email": "ada@example.com", "display_name": null }
            }));
        })
        .await;
    let teams = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/get-teams")
                .header("authorization", "Bearer fresh-token");
            then.status(200).json_body(json!({ "teams": [] }));
        })
        .await;

    let mut api = HttpChatApi::new(server.base_url(), Duration::from_secs(5)).expect("client");
    let session = api
        .login("ada@example.com", "hunter2hunter2")
        .await
        .expect("login");

    assert_eq!(session.token, "fresh-token");
    assert_eq!(api.token(), Some("fresh-token"));
    assert!(api.get_teams().await.expect("teams").is_empty());
    login.assert_async().await;
    teams.assert_async().await;
}

#[tokio::test]
async fn teams_are_read_from_the_envelope() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/get-teams")
                .header("authorization", "Bearer token-123");
            then.status(200).json_body(json!({
                "teams": [
                    { "teamId": 1, "teamName": "Core", "balance_credits": 7, "token": "abc" }
                ]
            }));
        })
        .await;

    let teams = api(&server).get_teams().await.expect("teams");

    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].team_id, 1);
    assert_eq!(teams[0].team_name, "Core");
    assert_eq!(teams[0].balance_credits, 7);
}

#[tokio::test]
async fn ai_response_returns_the_stored_exchange() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/api/get-ai-response/5/");
            then.status(200).json_body(json!({
                "conversation": {
                    "id": 3,
                    "session_id": 5,
                    "user_prompt": "hello",
                    "generated_result": "hi there",
                    "created_at": "2024-01-01T00:00:00Z"
                },
                "remaining_credits": 9
            }));
        })
        .await;

    let record = api(&server)
        .get_ai_response(5, "hello")
        .await
        .expect("response");

    assert_eq!(record.generated_result, "hi there");
    assert_eq!(record.session_id, 5);
    mock.assert_async().await;
}

#[tokio::test]
async fn error_bodies_become_status_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/get-sessions/4");
            then.status(403).json_body(json!({ "error": "Not a member of this team" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/send-invitation");
            then.status(401).json_body(json!({
                "message": "Max number of users in a single team is reached"
            }));
        })
        .await;

    let api = api(&server);

    match api.get_sessions(4).await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Not a member of this team");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    match api.send_invitation(4, "bob@example.com").await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Max number of users in a single team is reached");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn create_session_posts_team_and_title() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/create-session")
                .json_body(json!({ "teamId": 2, "title": "Roadmap" }));
            then.status(200).json_body(json!({
                "session": { "id": 11, "team_id": 2, "title": "Roadmap", "created_at": "now" }
            }));
        })
        .await;

    let session = api(&server)
        .create_session(2, "Roadmap")
        .await
        .expect("session");

    assert_eq!(session.id, 11);
    mock.assert_async().await;
}
