use std::collections::VecDeque;

use tracing::debug;

use crate::{
    ChatApi, ChatSessionSummary, ChatView, Command, Event, SelectionStore, TeamSummary,
};

/// Run one command against the backend and wrap the outcome as an [`Event`].
pub async fn perform<A: ChatApi + ?Sized>(api: &A, command: Command) -> Event {
    debug!(?command, "performing chat command");
    match command {
        Command::LoadTeams { ticket } => Event::TeamsLoaded {
            ticket,
            result: api.get_teams().await,
        },
        Command::LoadSessions { ticket, team_id } => Event::SessionsLoaded {
            ticket,
            result: api.get_sessions(team_id).await,
        },
        Command::LoadConversations { ticket, session_id } => Event::ConversationsLoaded {
            ticket,
            result: api.get_conversations(session_id).await,
        },
        Command::RequestAiResponse {
            ticket,
            session_id,
            message,
        } => Event::AiResponded {
            ticket,
            result: api.get_ai_response(session_id, &message).await,
        },
        Command::CreateSession {
            ticket,
            team_id,
            title,
        } => Event::SessionCreated {
            ticket,
            result: api.create_session(team_id, &title).await,
        },
        Command::SendInvitation {
            ticket,
            team_id,
            email,
        } => Event::InvitationSent {
            ticket,
            result: api.send_invitation(team_id, &email).await,
        },
    }
}

/// Drives a [`ChatView`] against a [`ChatApi`], running each action's commands
/// and their follow-ups to completion before returning.
pub struct ChatClient<A, S> {
    api: A,
    view: ChatView<S>,
}

impl<A: ChatApi, S: SelectionStore> ChatClient<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            view: ChatView::new(store),
        }
    }

    pub fn view(&self) -> &ChatView<S> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ChatView<S> {
        &mut self.view
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn start(&mut self) {
        let commands = self.view.start();
        self.run(commands).await;
    }

    pub async fn refresh_teams(&mut self) {
        let command = self.view.load_teams();
        self.run(vec![command]).await;
    }

    pub async fn select_team(&mut self, team: TeamSummary) {
        let commands = self.view.select_team(team);
        self.run(commands).await;
    }

    pub async fn select_session(&mut self, session: ChatSessionSummary) {
        let commands = self.view.select_session(session);
        self.run(commands).await;
    }

    pub async fn send_message(&mut self, text: &str) {
        let commands = self.view.send_message(text);
        self.run(commands).await;
    }

    pub async fn create_session(&mut self, title: &str) {
        let commands = self.view.create_session(title);
        self.run(commands).await;
    }

    pub async fn invite(&mut self, email: &str) {
        let commands = self.view.invite(email);
        self.run(commands).await;
    }

    async fn run(&mut self, commands: Vec<Command>) {
        let mut queue: VecDeque<Command> = commands.into();
        while let Some(command) = queue.pop_front() {
            let event = perform(&self.api, command).await;
            queue.extend(self.view.apply(event));
        }
    }
}
