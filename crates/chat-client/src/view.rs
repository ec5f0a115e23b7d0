use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::{
    store::{SelectionStore, SELECTED_SESSION_KEY, SELECTED_TEAM_KEY},
    ChatSessionSummary, ClientError, ConversationRecord, TeamSummary,
};

/// The only text users ever see for a failure.
pub const GENERIC_ERROR: &str = "Something went wrong!";
pub const USER_SENDER: &str = "User";
pub const AI_SENDER: &str = "Aeos";

/// Identifies one issued request. A result is applied only while its ticket is
/// still the one the view is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadTeams {
        ticket: Ticket,
    },
    LoadSessions {
        ticket: Ticket,
        team_id: i64,
    },
    LoadConversations {
        ticket: Ticket,
        session_id: i64,
    },
    RequestAiResponse {
        ticket: Ticket,
        session_id: i64,
        message: String,
    },
    CreateSession {
        ticket: Ticket,
        team_id: i64,
        title: String,
    },
    SendInvitation {
        ticket: Ticket,
        team_id: i64,
        email: String,
    },
}

#[derive(Debug)]
pub enum Event {
    TeamsLoaded {
        ticket: Ticket,
        result: Result<Vec<TeamSummary>, ClientError>,
    },
    SessionsLoaded {
        ticket: Ticket,
        result: Result<Vec<ChatSessionSummary>, ClientError>,
    },
    ConversationsLoaded {
        ticket: Ticket,
        result: Result<Vec<ConversationRecord>, ClientError>,
    },
    AiResponded {
        ticket: Ticket,
        result: Result<ConversationRecord, ClientError>,
    },
    SessionCreated {
        ticket: Ticket,
        result: Result<ChatSessionSummary, ClientError>,
    },
    InvitationSent {
        ticket: Ticket,
        result: Result<(), ClientError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageModel {
    pub message: String,
    pub sender: String,
    pub direction: Direction,
}

impl MessageModel {
    fn outgoing(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sender: USER_SENDER.to_string(),
            direction: Direction::Outgoing,
        }
    }

    fn incoming(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sender: AI_SENDER.to_string(),
            direction: Direction::Incoming,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoTeam,
    TeamSelected,
    LoadingConversation,
    Conversation,
    AwaitingResponse,
}

#[derive(Debug, Default)]
struct Pending {
    teams: Option<Ticket>,
    sessions: Option<Ticket>,
    conversations: Option<Ticket>,
    reply: Option<Ticket>,
    create_session: Option<Ticket>,
}

pub struct ChatView<S> {
    store: S,
    teams: Vec<TeamSummary>,
    selected_team: Option<TeamSummary>,
    sessions: Vec<ChatSessionSummary>,
    selected_session: Option<ChatSessionSummary>,
    messages: Vec<MessageModel>,
    typing: bool,
    /// Outgoing text shown while its reply is outstanding.
    awaiting_prompt: Option<String>,
    toasts: Vec<Toast>,
    pending: Pending,
    next_ticket: u64,
}

impl<S: SelectionStore> ChatView<S> {
    /// Build the view, restoring the last selection from `store`. A stored
    /// session that does not belong to the stored team is ignored.
    pub fn new(store: S) -> Self {
        let selected_team: Option<TeamSummary> = read(&store, SELECTED_TEAM_KEY);
        let selected_session = read::<ChatSessionSummary>(&store, SELECTED_SESSION_KEY)
            .filter(|session| {
                selected_team
                    .as_ref()
                    .is_some_and(|team| team.team_id == session.team_id)
            });

        Self {
            store,
            teams: Vec::new(),
            selected_team,
            sessions: Vec::new(),
            selected_session,
            messages: Vec::new(),
            typing: false,
            awaiting_prompt: None,
            toasts: Vec::new(),
            pending: Pending::default(),
            next_ticket: 0,
        }
    }

    pub fn teams(&self) -> &[TeamSummary] {
        &self.teams
    }

    pub fn selected_team(&self) -> Option<&TeamSummary> {
        self.selected_team.as_ref()
    }

    pub fn sessions(&self) -> &[ChatSessionSummary] {
        &self.sessions
    }

    pub fn selected_session(&self) -> Option<&ChatSessionSummary> {
        self.selected_session.as_ref()
    }

    pub fn messages(&self) -> &[MessageModel] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        match (&self.selected_team, &self.selected_session) {
            (None, _) => Phase::NoTeam,
            (Some(_), None) => Phase::TeamSelected,
            (Some(_), Some(_)) if self.typing => Phase::AwaitingResponse,
            (Some(_), Some(_)) if self.pending.conversations.is_some() => {
                Phase::LoadingConversation
            }
            (Some(_), Some(_)) => Phase::Conversation,
        }
    }

    /// Drain the notifications raised since the last call.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// Initial fetches once the client is signed in: the team list, plus the
    /// sessions and history of any restored selection.
    pub fn start(&mut self) -> Vec<Command> {
        let mut commands = vec![self.load_teams()];
        if let Some(team_id) = self.selected_team.as_ref().map(|team| team.team_id) {
            commands.push(self.load_sessions(team_id));
        }
        if let Some(session_id) = self.selected_session.as_ref().map(|session| session.id) {
            commands.push(self.load_conversations(session_id));
        }
        commands
    }

    pub fn load_teams(&mut self) -> Command {
        let ticket = self.issue();
        self.pending.teams = Some(ticket);
        Command::LoadTeams { ticket }
    }

    /// Select `team`. Re-selecting the current team does nothing.
    pub fn select_team(&mut self, team: TeamSummary) -> Vec<Command> {
        if self
            .selected_team
            .as_ref()
            .is_some_and(|current| current.team_id == team.team_id)
        {
            return Vec::new();
        }

        self.persist(SELECTED_TEAM_KEY, &team);
        self.forget(SELECTED_SESSION_KEY);

        let team_id = team.team_id;
        self.selected_team = Some(team);
        self.selected_session = None;
        self.sessions.clear();
        self.reset_conversation();
        self.pending.create_session = None;

        vec![self.load_sessions(team_id)]
    }

    /// Select `session`. Re-selecting the current session does nothing.
    pub fn select_session(&mut self, session: ChatSessionSummary) -> Vec<Command> {
        if self
            .selected_session
            .as_ref()
            .is_some_and(|current| current.id == session.id)
        {
            return Vec::new();
        }

        self.persist(SELECTED_SESSION_KEY, &session);

        let session_id = session.id;
        self.selected_session = Some(session);
        self.reset_conversation();

        vec![self.load_conversations(session_id)]
    }

    /// Ask the assistant about `text` in the selected session. Ignored while
    /// a previous message is still being answered.
    pub fn send_message(&mut self, text: &str) -> Vec<Command> {
        let text = text.trim();
        if text.is_empty() || self.typing {
            return Vec::new();
        }
        let Some(session_id) = self.selected_session.as_ref().map(|session| session.id) else {
            return Vec::new();
        };

        self.typing = true;
        self.messages.push(MessageModel::outgoing(text));
        self.awaiting_prompt = Some(text.to_string());

        let ticket = self.issue();
        self.pending.reply = Some(ticket);
        vec![Command::RequestAiResponse {
            ticket,
            session_id,
            message: text.to_string(),
        }]
    }

    pub fn create_session(&mut self, title: &str) -> Vec<Command> {
        let title = title.trim();
        let Some(team_id) = self.selected_team.as_ref().map(|team| team.team_id) else {
            return Vec::new();
        };
        if title.is_empty() {
            return Vec::new();
        }

        let ticket = self.issue();
        self.pending.create_session = Some(ticket);
        vec![Command::CreateSession {
            ticket,
            team_id,
            title: title.to_string(),
        }]
    }

    pub fn invite(&mut self, email: &str) -> Vec<Command> {
        let email = email.trim();
        let Some(team_id) = self.selected_team.as_ref().map(|team| team.team_id) else {
            return Vec::new();
        };
        if email.is_empty() {
            return Vec::new();
        }

        vec![Command::SendInvitation {
            ticket: self.issue(),
            team_id,
            email: email.to_string(),
        }]
    }

    /// Feed back the result of a command. Returns any follow-up commands.
    pub fn apply(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::TeamsLoaded { ticket, result } => {
                if !claim(&mut self.pending.teams, ticket) {
                    return Vec::new();
                }
                match result {
                    Ok(teams) => self.on_teams(teams),
                    Err(error) => self.fail("load teams", &error),
                }
                Vec::new()
            }
            Event::SessionsLoaded { ticket, result } => {
                if !claim(&mut self.pending.sessions, ticket) {
                    return Vec::new();
                }
                match result {
                    Ok(sessions) => self.on_sessions(sessions),
                    Err(error) => self.fail("load sessions", &error),
                }
                Vec::new()
            }
            Event::ConversationsLoaded { ticket, result } => {
                if !claim(&mut self.pending.conversations, ticket) {
                    return Vec::new();
                }
                match result {
                    Ok(records) => {
                        self.messages = to_messages(&records);
                        if let Some(prompt) = &self.awaiting_prompt {
                            self.messages.push(MessageModel::outgoing(prompt.clone()));
                        }
                    }
                    Err(error) => self.fail("load conversation", &error),
                }
                if self.pending.reply.is_none() {
                    self.typing = false;
                }
                Vec::new()
            }
            Event::AiResponded { ticket, result } => {
                if !claim(&mut self.pending.reply, ticket) {
                    return Vec::new();
                }
                let prompt = self.awaiting_prompt.take();
                match (result, self.selected_session.as_ref().map(|s| s.id)) {
                    (Ok(_), Some(session_id)) => vec![self.load_conversations(session_id)],
                    (Ok(_), None) => {
                        self.typing = false;
                        Vec::new()
                    }
                    (Err(error), _) => {
                        self.typing = false;
                        if self.messages.last().is_some_and(|m| {
                            m.direction == Direction::Outgoing
                                && Some(&m.message) == prompt.as_ref()
                        }) {
                            self.messages.pop();
                        }
                        self.fail("get AI response", &error);
                        Vec::new()
                    }
                }
            }
            Event::SessionCreated { ticket, result } => {
                if !claim(&mut self.pending.create_session, ticket) {
                    return Vec::new();
                }
                match result {
                    Ok(session) => {
                        self.sessions.retain(|existing| existing.id != session.id);
                        self.sessions.insert(0, session.clone());
                        self.select_session(session)
                    }
                    Err(error) => {
                        self.fail("create session", &error);
                        Vec::new()
                    }
                }
            }
            Event::InvitationSent { result, .. } => {
                match result {
                    Ok(()) => self.toasts.push(Toast {
                        kind: ToastKind::Info,
                        text: "Invitation sent".to_string(),
                    }),
                    Err(error) => self.fail("send invitation", &error),
                }
                Vec::new()
            }
        }
    }

    fn on_teams(&mut self, teams: Vec<TeamSummary>) {
        if let Some(selected) = &self.selected_team {
            match teams.iter().find(|team| team.team_id == selected.team_id) {
                Some(fresh) => self.selected_team = Some(fresh.clone()),
                None => {
                    debug!(team_id = selected.team_id, "selected team no longer listed");
                    self.selected_team = None;
                    self.selected_session = None;
                    self.sessions.clear();
                    self.reset_conversation();
                    self.pending.sessions = None;
                    self.pending.create_session = None;
                    self.forget(SELECTED_TEAM_KEY);
                    self.forget(SELECTED_SESSION_KEY);
                }
            }
        }
        self.teams = teams;
    }

    fn on_sessions(&mut self, sessions: Vec<ChatSessionSummary>) {
        if let Some(selected) = &self.selected_session {
            if !sessions.iter().any(|session| session.id == selected.id) {
                debug!(session_id = selected.id, "selected session no longer listed");
                self.selected_session = None;
                self.reset_conversation();
                self.forget(SELECTED_SESSION_KEY);
            }
        }
        self.sessions = sessions;
    }

    fn load_sessions(&mut self, team_id: i64) -> Command {
        let ticket = self.issue();
        self.pending.sessions = Some(ticket);
        Command::LoadSessions { ticket, team_id }
    }

    fn load_conversations(&mut self, session_id: i64) -> Command {
        let ticket = self.issue();
        self.pending.conversations = Some(ticket);
        Command::LoadConversations { ticket, session_id }
    }

    fn reset_conversation(&mut self) {
        self.messages.clear();
        self.typing = false;
        self.awaiting_prompt = None;
        self.pending.conversations = None;
        self.pending.reply = None;
    }

    fn issue(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn fail(&mut self, action: &str, error: &ClientError) {
        warn!(action, %error, "chat view request failed");
        self.toasts.push(Toast {
            kind: ToastKind::Error,
            text: GENERIC_ERROR.to_string(),
        });
    }

    fn persist<T: Serialize>(&mut self, key: &str, value: &T) {
        let result = serde_json::to_value(value)
            .map_err(ClientError::from)
            .and_then(|value| self.store.set(key, value));
        if let Err(error) = result {
            warn!(key, %error, "failed to persist selection");
        }
    }

    fn forget(&mut self, key: &str) {
        if let Err(error) = self.store.remove(key) {
            warn!(key, %error, "failed to clear persisted selection");
        }
    }
}

/// True when `ticket` is the one awaited in `slot`; the slot is then cleared.
fn claim(slot: &mut Option<Ticket>, ticket: Ticket) -> bool {
    if *slot == Some(ticket) {
        *slot = None;
        true
    } else {
        debug!(?ticket, awaited = ?slot, "discarding stale response");
        false
    }
}

fn read<T: DeserializeOwned>(store: &impl SelectionStore, key: &str) -> Option<T> {
    store
        .get(key)
        .and_then(|value| serde_json::from_value(value).ok())
}

fn to_messages(records: &[ConversationRecord]) -> Vec<MessageModel> {
    records
        .iter()
        .flat_map(|record| {
            [
                MessageModel::outgoing(record.user_prompt.clone()),
                MessageModel::incoming(record.generated_result.clone()),
            ]
        })
        .collect()
}
