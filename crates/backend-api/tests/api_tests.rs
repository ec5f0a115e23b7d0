use std::sync::Arc;

use aeos_assistant::testing::EchoProvider;
use aeos_auth::Authenticator;
use aeos_backend_api::{build_router, ApiSettings, AppState};
use aeos_config::AuthConfig;
use aeos_database::{test_support::TestDatabase, PetRepository, Team, User};
use aeos_mailer::testing::RecordingMailer;
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
        Method, Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

type TestResult<T = ()> = anyhow::Result<T>;

const PASSWORD: &str = "correct horse battery";

struct TestContext {
    db: TestDatabase,
    mailer: RecordingMailer,
    assistant: EchoProvider,
    state: AppState,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        Self::with_assistant(EchoProvider::new("Aeos says: ")).await
    }

    async fn with_assistant(assistant: EchoProvider) -> TestResult<Self> {
        let db = TestDatabase::new().await?;
        let mailer = RecordingMailer::new();
        let authenticator = Authenticator::new(db.pool().clone(), AuthConfig::default());
        let settings = ApiSettings {
            accept_base_url: "https://aeos.test/accept-invitation".into(),
            ..ApiSettings::default()
        };

        let state = AppState::new(
            db.pool().clone(),
            authenticator,
            Arc::new(mailer.clone()),
            Some(Arc::new(assistant.clone())),
            settings,
        );

        Ok(Self {
            db,
            mailer,
            assistant,
            state,
        })
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Register a password account and log it in, returning the user row and token.
    async fn signed_in(&self, email: &str, name: &str) -> TestResult<(i64, String)> {
        let authenticator = self.state.authenticator();
        let user = authenticator
            .register_with_password(email, PASSWORD, Some(name))
            .await?;
        let (_, session) = authenticator.login_with_password(email, PASSWORD).await?;
        Ok((user.id, session.token))
    }

    async fn team_with_members(&self, owner_id: i64, extra: usize) -> TestResult<Team> {
        let team = self.db.team("Rockets", owner_id, 10).await?;
        for i in 0..extra {
            let user = self
                .db
                .user(&format!("member{i}@example.com"), &format!("Member {i}"))
                .await?;
            self.db.add_member(team.id, user.id).await?;
        }
        Ok(team)
    }

    async fn invitee(&self) -> TestResult<User> {
        self.db.user("bob@example.com", "Bob").await
    }

    async fn send(&self, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
        let response = self.router().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_check_reports_ok() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx.send(get("/health", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn add_row_inserts_exactly_one_row() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx
        .send(get("/api/add-row?petName=Rex&ownerName=Ana", None))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let pets = PetRepository::new(ctx.db.pool().clone()).list().await?;
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].name, "Rex");
    assert_eq!(pets[0].owner, "Ana");
    Ok(())
}

#[tokio::test]
async fn add_row_requires_both_names() -> TestResult {
    let ctx = TestContext::new().await?;

    for uri in [
        "/api/add-row",
        "/api/add-row?petName=Rex",
        "/api/add-row?ownerName=Ana",
        "/api/add-row?petName=&ownerName=Ana",
    ] {
        let (status, body) = ctx.send(get(uri, None)).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({ "error": "Pet and owner names required" }));
    }

    let pets = PetRepository::new(ctx.db.pool().clone()).list().await?;
    assert!(pets.is_empty());
    Ok(())
}

#[tokio::test]
async fn send_invitation_rejects_other_methods() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, _) = ctx.send(get("/api/send-invitation", None)).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn send_invitation_requires_session() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx
        .send(post_json(
            "/api/send-invitation",
            None,
            json!({ "email": "bob@example.com", "teamId": 1 }),
        ))
        .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Unauthorized" }));
    assert!(ctx.mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn session_is_checked_before_the_body() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx
        .send(post_json(
            "/api/send-invitation",
            None,
            json!({ "email": "x@y" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Unauthorized" }));

    for uri in ["/api/create-team", "/api/create-session"] {
        let (status, body) = ctx.send(post_json(uri, None, json!({}))).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body, json!({ "error": "Unauthorized" }), "{uri}");
    }

    let (_, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let (status, body) = ctx
        .send(post_json(
            "/api/send-invitation",
            Some(&token),
            json!({ "email": "x@y" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].is_string());
    assert!(ctx.mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn send_invitation_rejects_full_team_without_email() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.team_with_members(owner_id, 4).await?;
    ctx.invitee().await?;

    let (status, body) = ctx
        .send(post_json(
            "/api/send-invitation",
            Some(&token),
            json!({ "email": "bob@example.com", "teamId": team.id }),
        ))
        .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "message": "Max number of users in a single team is reached" })
    );
    assert!(ctx.mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn send_invitation_sends_exactly_one_email() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.team_with_members(owner_id, 3).await?;
    let invitee = ctx.invitee().await?;

    let (status, body) = ctx
        .send(post_json(
            "/api/send-invitation",
            Some(&token),
            json!({ "email": "Bob@Example.com", "teamId": team.id }),
        ))
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.to, "bob@example.com");
    assert!(email.subject.contains("Rockets"));
    assert!(email.body.contains("Hello Bob"));
    assert!(email.body.contains("by Alice"));
    assert!(email.body.contains(&format!(
        "https://aeos.test/accept-invitation/{}?userId={}",
        team.token, invitee.id
    )));
    Ok(())
}

#[tokio::test]
async fn send_invitation_accepts_session_cookie() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;
    ctx.invitee().await?;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/send-invitation")
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, format!("aeos_session={token}"))
        .body(Body::from(
            json!({ "email": "bob@example.com", "teamId": team.id }).to_string(),
        ))?;

    let (status, _) = ctx.send(request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.mailer.sent().len(), 1);
    Ok(())
}

#[tokio::test]
async fn send_invitation_unknown_invitee_sends_nothing() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;

    let (status, body) = ctx
        .send(post_json(
            "/api/send-invitation",
            Some(&token),
            json!({ "email": "ghost@example.com", "teamId": team.id }),
        ))
        .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "User not found" }));
    assert!(ctx.mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn send_invitation_unknown_team_is_not_found() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    ctx.invitee().await?;

    let (status, _) = ctx
        .send(post_json(
            "/api/send-invitation",
            Some(&token),
            json!({ "email": "bob@example.com", "teamId": 999 }),
        ))
        .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(ctx.mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn send_invitation_requires_sender_membership() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, _) = ctx.signed_in("alice@example.com", "Alice").await?;
    let (_, outsider_token) = ctx.signed_in("eve@example.com", "Eve").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;
    ctx.invitee().await?;

    let (status, _) = ctx
        .send(post_json(
            "/api/send-invitation",
            Some(&outsider_token),
            json!({ "email": "bob@example.com", "teamId": team.id }),
        ))
        .await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(ctx.mailer.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn send_invitation_surfaces_delivery_failure() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;
    ctx.invitee().await?;
    ctx.mailer.set_failure(Some("relay refused"));

    let (status, body) = ctx
        .send(post_json(
            "/api/send-invitation",
            Some(&token),
            json!({ "email": "bob@example.com", "teamId": team.id }),
        ))
        .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Internal server error" }));
    assert_eq!(ctx.mailer.sent().len(), 1);
    Ok(())
}

#[tokio::test]
async fn accept_invitation_joins_once() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, _) = ctx.signed_in("alice@example.com", "Alice").await?;
    let (bob_id, bob_token) = ctx.signed_in("bob@example.com", "Bob").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;
    let uri = format!("/api/accept-invitation/{}?userId={bob_id}", team.token);

    let (status, body) = ctx.send(post_json(&uri, Some(&bob_token), json!({}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["membership"]["team_id"], team.id);
    assert_eq!(body["membership"]["user_id"], bob_id);

    let (status, again) = ctx.send(post_json(&uri, Some(&bob_token), json!({}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["membership"]["id"], body["membership"]["id"]);
    Ok(())
}

#[tokio::test]
async fn accept_invitation_rejects_full_team() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, _) = ctx.signed_in("alice@example.com", "Alice").await?;
    let (bob_id, bob_token) = ctx.signed_in("bob@example.com", "Bob").await?;
    let team = ctx.team_with_members(owner_id, 4).await?;

    let uri = format!("/api/accept-invitation/{}?userId={bob_id}", team.token);
    let (status, _) = ctx.send(post_json(&uri, Some(&bob_token), json!({}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn accept_invitation_checks_token_and_caller() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, owner_token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let (bob_id, bob_token) = ctx.signed_in("bob@example.com", "Bob").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;

    let unknown = format!("/api/accept-invitation/not-a-token?userId={bob_id}");
    let (status, _) = ctx.send(post_json(&unknown, Some(&bob_token), json!({}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let someone_else = format!("/api/accept-invitation/{}?userId={bob_id}", team.token);
    let (status, _) = ctx
        .send(post_json(&someone_else, Some(&owner_token), json!({})))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn register_and_login_set_session_cookie() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx
        .send(post_json(
            "/api/auth/register",
            None,
            json!({ "email": "carol@example.com", "password": PASSWORD, "name": "Carol" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["display_name"], "Carol");

    let response = ctx
        .router()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "email": "carol@example.com", "password": PASSWORD }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("aeos_session="));
    assert!(cookie.contains("HttpOnly"));

    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    let token = body["token"].as_str().unwrap_or_default().to_string();
    assert!(cookie.contains(&token));

    let (status, me) = ctx.send(get("/api/auth/me", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "carol@example.com");
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_password_and_logout_revokes() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx.signed_in("dave@example.com", "Dave").await?;

    let (status, _) = ctx
        .send(post_json(
            "/api/auth/login",
            None,
            json!({ "email": "dave@example.com", "password": "wrong password" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(post_json("/api/auth/logout", Some(&token), json!({})))
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send(get("/api/get-teams", Some(&token))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn teams_and_sessions_flow() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx.signed_in("alice@example.com", "Alice").await?;

    let (status, created) = ctx
        .send(post_json(
            "/api/create-team",
            Some(&token),
            json!({ "name": "Rockets" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let team_id = created["team"]["teamId"].as_i64().unwrap_or_default();
    assert_eq!(created["team"]["balance_credits"], 100);

    let (status, teams) = ctx.send(get("/api/get-teams", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teams["teams"][0]["teamName"], "Rockets");

    let (status, _) = ctx
        .send(post_json(
            "/api/create-session",
            Some(&token),
            json!({ "teamId": team_id, "title": "   " }),
        ))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, session) = ctx
        .send(post_json(
            "/api/create-session",
            Some(&token),
            json!({ "teamId": team_id, "title": "Planning" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["session"]["title"], "Planning");

    let (status, sessions) = ctx
        .send(get(&format!("/api/get-sessions/{team_id}"), Some(&token)))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sessions["sessions"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn sessions_are_private_to_members() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, _) = ctx.signed_in("alice@example.com", "Alice").await?;
    let (_, outsider) = ctx.signed_in("eve@example.com", "Eve").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;

    let (status, _) = ctx
        .send(get(&format!("/api/get-sessions/{}", team.id), Some(&outsider)))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send(get("/api/get-sessions/999", Some(&outsider))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

async fn create_session(ctx: &TestContext, token: &str, team_id: i64) -> TestResult<i64> {
    let (_, session) = ctx
        .send(post_json(
            "/api/create-session",
            Some(token),
            json!({ "teamId": team_id, "title": "Planning" }),
        ))
        .await?;
    Ok(session["session"]["id"].as_i64().unwrap_or_default())
}

#[tokio::test]
async fn ai_response_is_stored_and_charged() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;
    let session_id = create_session(&ctx, &token, team.id).await?;

    let (status, first) = ctx
        .send(get(
            &format!("/api/get-ai-response/{session_id}/hello%20there"),
            Some(&token),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["conversation"]["user_prompt"], "hello there");
    assert_eq!(first["conversation"]["generated_result"], "Aeos says: hello there");
    assert_eq!(first["remaining_credits"], 9);

    let (status, _) = ctx
        .send(get(
            &format!("/api/get-ai-response/{session_id}/what%2Fnext%3F"),
            Some(&token),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let requests = ctx.assistant.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].prompt, "what/next?");
    assert_eq!(requests[1].history.len(), 1);
    assert_eq!(requests[1].history[0].prompt, "hello there");

    let (status, history) = ctx
        .send(get(
            &format!("/api/get-conversations/{session_id}"),
            Some(&token),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let conversations = history["conversations"].as_array().cloned().unwrap_or_default();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0]["user_prompt"], "hello there");
    assert_eq!(conversations[1]["user_prompt"], "what/next?");
    Ok(())
}

#[tokio::test]
async fn ai_response_requires_credits() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.db.team("Broke", owner_id, 0).await?;
    let session_id = create_session(&ctx, &token, team.id).await?;

    let (status, _) = ctx
        .send(get(
            &format!("/api/get-ai-response/{session_id}/hello"),
            Some(&token),
        ))
        .await?;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(ctx.assistant.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn ai_backend_failure_is_bad_gateway() -> TestResult {
    let ctx = TestContext::with_assistant(EchoProvider::failing()).await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;
    let session_id = create_session(&ctx, &token, team.id).await?;

    let (status, _) = ctx
        .send(get(
            &format!("/api/get-ai-response/{session_id}/hello"),
            Some(&token),
        ))
        .await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, history) = ctx
        .send(get(
            &format!("/api/get-conversations/{session_id}"),
            Some(&token),
        ))
        .await?;
    assert_eq!(history["conversations"], json!([]));
    Ok(())
}

#[tokio::test]
async fn ai_response_rejects_blank_message() -> TestResult {
    let ctx = TestContext::new().await?;
    let (owner_id, token) = ctx.signed_in("alice@example.com", "Alice").await?;
    let team = ctx.team_with_members(owner_id, 0).await?;
    let session_id = create_session(&ctx, &token, team.id).await?;

    let (status, _) = ctx
        .send(get(
            &format!("/api/get-ai-response/{session_id}/%20%20"),
            Some(&token),
        ))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx.send(get("/api-docs/openapi.json", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/send-invitation"].is_object());
    Ok(())
}
