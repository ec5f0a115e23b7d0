use std::{path::PathBuf, time::Duration};

use aeos_chat_client::{
    ChatClient, Direction, HttpChatApi, JsonFileStore, Phase, ToastKind,
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aeos-chat")]
#[command(about = "Chat with your team's assistant from the terminal")]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:7070")]
    server: String,

    #[arg(long, env = "AEOS_EMAIL")]
    email: String,

    #[arg(long, env = "AEOS_PASSWORD", hide_env_values = true)]
    password: String,

    /// Where the last selected team and session are remembered
    #[arg(long, default_value = ".aeos-chat.json")]
    state_file: PathBuf,

    #[arg(long, default_value_t = 60)]
    timeout_seconds: u64,
}

type Client = ChatClient<HttpChatApi, JsonFileStore>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut api = HttpChatApi::new(&cli.server, Duration::from_secs(cli.timeout_seconds))
        .context("failed to build HTTP client")?;
    let session = api
        .login(&cli.email, &cli.password)
        .await
        .with_context(|| format!("failed to sign in to {}", cli.server))?;
    debug!(server = %cli.server, expires_at = %session.expires_at, "signed in");

    let store = JsonFileStore::open(&cli.state_file).with_context(|| {
        format!("failed to open state file {}", cli.state_file.display())
    })?;

    let mut client = ChatClient::new(api, store);
    client.start().await;

    println!("{} signed in as {}", "AeosGPT".bold(), cli.email.green());
    print_help();
    print_status(&client);
    flush_toasts(&mut client);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, argument) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/teams" => {
                client.refresh_teams().await;
                print_teams(&client);
            }
            "/team" => match parse_id(argument) {
                Some(id) => match client.view().teams().iter().find(|t| t.team_id == id) {
                    Some(team) => {
                        let team = team.clone();
                        client.select_team(team).await;
                        print_sessions(&client);
                    }
                    None => println!("{}", "No such team, try /teams".yellow()),
                },
                None => println!("{}", "Usage: /team <id>".yellow()),
            },
            "/sessions" => print_sessions(&client),
            "/session" => match parse_id(argument) {
                Some(id) => match client.view().sessions().iter().find(|s| s.id == id) {
                    Some(session) => {
                        let session = session.clone();
                        client.select_session(session).await;
                        print_messages(&client);
                    }
                    None => println!("{}", "No such session, try /sessions".yellow()),
                },
                None => println!("{}", "Usage: /session <id>".yellow()),
            },
            "/new" => {
                client.create_session(argument).await;
                print_status(&client);
            }
            "/invite" => client.invite(argument).await,
            _ if command.starts_with('/') => {
                println!("{}", format!("Unknown command {command}").yellow())
            }
            _ => {
                if client.view().phase() == Phase::TeamSelected
                    || client.view().phase() == Phase::NoTeam
                {
                    println!("{}", "Pick a session first with /session <id>".yellow());
                } else {
                    let before = client.view().messages().len();
                    client.send_message(line).await;
                    print_new_messages(&client, before);
                }
            }
        }

        flush_toasts(&mut client);
    }

    Ok(())
}

fn parse_id(argument: &str) -> Option<i64> {
    argument.parse().ok()
}

fn print_help() {
    println!(
        "{}",
        "Commands: /teams, /team <id>, /sessions, /session <id>, /new <title>, /invite <email>, /quit"
            .dimmed()
    );
}

fn print_status(client: &Client) {
    let view = client.view();
    match (view.selected_team(), view.selected_session()) {
        (None, _) => {
            print_teams(client);
            println!("{}", "Select a team with /team <id>".dimmed());
        }
        (Some(team), None) => {
            println!("Team {} ({} credits)", team.team_name.cyan(), team.balance_credits);
            print_sessions(client);
        }
        (Some(team), Some(session)) => {
            println!(
                "Team {} ({} credits), session {}",
                team.team_name.cyan(),
                team.balance_credits,
                session.title.cyan()
            );
            print_messages(client);
        }
    }
}

fn print_teams(client: &Client) {
    let teams = client.view().teams();
    if teams.is_empty() {
        println!("{}", "You are not a member of any team yet".dimmed());
    }
    for team in teams {
        println!(
            "  [{}] {} ({} credits)",
            team.team_id.to_string().yellow(),
            team.team_name,
            team.balance_credits
        );
    }
}

fn print_sessions(client: &Client) {
    let sessions = client.view().sessions();
    if sessions.is_empty() {
        println!("{}", "No sessions yet, start one with /new <title>".dimmed());
    }
    for session in sessions {
        println!(
            "  [{}] {}",
            session.id.to_string().yellow(),
            session.title
        );
    }
}

fn print_messages(client: &Client) {
    print_new_messages(client, 0);
}

fn print_new_messages(client: &Client, from: usize) {
    for message in client.view().messages().iter().skip(from) {
        match message.direction {
            Direction::Outgoing => {
                println!("{} {}", format!("{}:", message.sender).blue().bold(), message.message)
            }
            Direction::Incoming => {
                println!("{} {}", format!("{}:", message.sender).green().bold(), message.message)
            }
        }
    }
}

fn flush_toasts(client: &mut Client) {
    for toast in client.view_mut().take_toasts() {
        match toast.kind {
            ToastKind::Info => println!("{}", toast.text.green()),
            ToastKind::Error => println!("{}", toast.text.red()),
        }
    }
}
