use anyhow::Context;
use aeos_backend_api::{build_router, ApiSettings, AppState};
use aeos_backend_runtime::{telemetry, BackendServices};
use aeos_config::{load as load_config, AppConfig};
use aeos_database::{
    ChatSessionRepository, CreateChatSessionRequest, CreateTeamRequest, MembershipRepository,
    PetRepository, TeamRepository,
};
use clap::{Parser, Subcommand};
use sqlx::Row;
use tokio::net::TcpListener;
use tracing::info;

const SEED_PASSWORD: &str = "aeos-demo-password";

#[derive(Parser)]
#[command(name = "aeos-backend")]
#[command(about = "AeosGPT backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a demo team with two password accounts and a chat session
    Seed,
    /// Print teams, their members and the pet registry
    Dump,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Seed => seed_data(config).await,
        Commands::Dump => dump_data(config).await,
    }
}

async fn initialise(config: &AppConfig) -> anyhow::Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    info!("starting AeosGPT backend");

    let services = initialise(&config).await?;

    let state = AppState::new(
        services.db_pool.clone(),
        services.authenticator.clone(),
        services.mailer.clone(),
        services.assistant.clone(),
        ApiSettings::from_config(&config),
    );
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(aeos_backend_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_data(config: AppConfig) -> anyhow::Result<()> {
    info!("seeding database with demo data");

    let services = initialise(&config).await?;
    let pool = services.db_pool.clone();

    let owner = services
        .authenticator
        .register_with_password("owner@aeos.local", SEED_PASSWORD, Some("Demo Owner"))
        .await
        .context("failed to register demo owner")?;
    let guest = services
        .authenticator
        .register_with_password("guest@aeos.local", SEED_PASSWORD, Some("Demo Guest"))
        .await
        .context("failed to register demo guest")?;

    let team = TeamRepository::new(pool.clone())
        .create(&CreateTeamRequest {
            name: "Demo Team".to_string(),
            owner_id: owner.id,
            balance_credits: config.teams.default_credits,
        })
        .await
        .context("failed to create demo team")?;

    let session = ChatSessionRepository::new(pool.clone())
        .create(&CreateChatSessionRequest {
            team_id: team.id,
            title: "Getting started".to_string(),
        })
        .await
        .context("failed to create demo chat session")?;

    PetRepository::new(pool)
        .insert("Biscuit", "Demo Owner")
        .await
        .context("failed to insert demo pet")?;

    println!("Database seeded with demo data:");
    println!("- team {} (id {}, token {})", team.name, team.id, team.token);
    println!("- owner@aeos.local / {SEED_PASSWORD} (member)");
    println!("- guest@aeos.local / {SEED_PASSWORD} (not a member, id {})", guest.id);
    println!("- chat session \"{}\" (id {})", session.title, session.id);
    println!("Run 'dump' to see the inserted data");

    Ok(())
}

async fn dump_data(config: AppConfig) -> anyhow::Result<()> {
    let services = initialise(&config).await?;
    let pool = services.db_pool.clone();

    let teams = sqlx::query(
        r#"
        SELECT id, name, token, balance_credits
        FROM teams
        ORDER BY id ASC
        "#,
    )
    .fetch_all(&pool)
    .await
    .context("failed to fetch teams")?;
    let memberships = MembershipRepository::new(pool.clone());

    println!("=== TEAMS ===");
    if teams.is_empty() {
        println!("No teams found in database");
    } else {
        println!("{:<5} {:<30} {:<34} {:<8} {:<8}", "ID", "Name", "Token", "Credits", "Members");
        println!("{}", "-".repeat(90));
        for team in teams {
            let id: i64 = team.get("id");
            let name: String = team.get("name");
            let token: String = team.get("token");
            let credits: i64 = team.get("balance_credits");
            let members = memberships
                .count_for_team(id)
                .await
                .context("failed to count members")?;
            println!("{id:<5} {name:<30} {token:<34} {credits:<8} {members:<8}");
        }
    }

    println!("\n=== PETS ===");
    let pets = PetRepository::new(pool)
        .list()
        .await
        .context("failed to fetch pets")?;
    if pets.is_empty() {
        println!("No pets found in database");
    } else {
        for pet in pets {
            println!("{:<5} {:<20} owner: {}", pet.id, pet.name, pet.owner);
        }
    }

    Ok(())
}
