use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::{ChatSessionSummary, ClientError, ConversationRecord, TeamSummary};

/// Backend operations the chat view depends on.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn get_teams(&self) -> Result<Vec<TeamSummary>, ClientError>;
    async fn get_sessions(&self, team_id: i64) -> Result<Vec<ChatSessionSummary>, ClientError>;
    async fn get_conversations(
        &self,
        session_id: i64,
    ) -> Result<Vec<ConversationRecord>, ClientError>;
    async fn get_ai_response(
        &self,
        session_id: i64,
        message: &str,
    ) -> Result<ConversationRecord, ClientError>;
    async fn create_session(
        &self,
        team_id: i64,
        title: &str,
    ) -> Result<ChatSessionSummary, ClientError>;
    async fn send_invitation(&self, team_id: i64, email: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginSession {
    pub token: String,
    pub expires_at: String,
}

#[derive(Deserialize)]
struct TeamsBody {
    teams: Vec<TeamSummary>,
}

#[derive(Deserialize)]
struct SessionsBody {
    sessions: Vec<ChatSessionSummary>,
}

#[derive(Deserialize)]
struct SessionBody {
    session: ChatSessionSummary,
}

#[derive(Deserialize)]
struct ConversationsBody {
    conversations: Vec<ConversationRecord>,
}

#[derive(Deserialize)]
struct ConversationBody {
    conversation: ConversationRecord,
}

/// [`ChatApi`] over the backend's JSON routes, authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpChatApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<(), ClientError> {
        let request = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "email": email, "password": password, "name": name }));
        let _: Value = read_json(request.send().await?).await?;
        Ok(())
    }

    /// Sign in and keep the returned token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginSession, ClientError> {
        let request = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        let session: LoginSession = read_json(request.send().await?).await?;
        debug!(expires_at = %session.expires_at, "signed in");
        self.token = Some(session.token.clone());
        Ok(session)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.authorized(self.client.get(self.url(path)))?;
        read_json(request.send().await?).await
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn get_teams(&self) -> Result<Vec<TeamSummary>, ClientError> {
        let body: TeamsBody = self.get_json("/api/get-teams").await?;
        Ok(body.teams)
    }

    async fn get_sessions(&self, team_id: i64) -> Result<Vec<ChatSessionSummary>, ClientError> {
        let body: SessionsBody = self
            .get_json(&format!("/api/get-sessions/{team_id}"))
            .await?;
        Ok(body.sessions)
    }

    async fn get_conversations(
        &self,
        session_id: i64,
    ) -> Result<Vec<ConversationRecord>, ClientError> {
        let body: ConversationsBody = self
            .get_json(&format!("/api/get-conversations/{session_id}"))
            .await?;
        Ok(body.conversations)
    }

    async fn get_ai_response(
        &self,
        session_id: i64,
        message: &str,
    ) -> Result<ConversationRecord, ClientError> {
        let body: ConversationBody = self
            .get_json(&ai_response_path(session_id, message))
            .await?;
        Ok(body.conversation)
    }

    async fn create_session(
        &self,
        team_id: i64,
        title: &str,
    ) -> Result<ChatSessionSummary, ClientError> {
        let request = self.authorized(
            self.client
                .post(self.url("/api/create-session"))
                .json(&json!({ "teamId": team_id, "title": title })),
        )?;
        let body: SessionBody = read_json(request.send().await?).await?;
        Ok(body.session)
    }

    async fn send_invitation(&self, team_id: i64, email: &str) -> Result<(), ClientError> {
        let request = self.authorized(
            self.client
                .post(self.url("/api/send-invitation"))
                .json(&json!({ "email": email, "teamId": team_id })),
        )?;
        check_status(request.send().await?).await?;
        Ok(())
    }
}

/// The message travels as a single path segment, so it is percent-encoded.
fn ai_response_path(session_id: i64, message: &str) -> String {
    format!(
        "/api/get-ai-response/{session_id}/{}",
        urlencoding::encode(message)
    )
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Turn a non-success response into [`ClientError::Status`], taking the
/// message from an `{"error"}` or `{"message"}` body when there is one.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            body.get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or(text);

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
