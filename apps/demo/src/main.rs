//! Smoke-test CLI for the GameLink core: boots config + database and walks
//! the main flows so a developer can eyeball the logs and results.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gamelink_config::load as load_config;
use gamelink_database::{
    CreateGameRequest, CreateInviteRequest, CreateMessageRequest, CreateSessionRequest,
};
use gamelink_social::types::LoggingSink;
use gamelink_social::{
    CatalogClient, CatalogSearch, ConnectionService, LibraryService, MessageService, SessionService,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "gamelink-demo")]
#[command(about = "Walk the GameLink core flows against a local database")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed two libraries and print their compatibility report
    Compare,
    /// Schedule a session, run the invite flow, and chat
    Session,
    /// Exercise the friend graph
    Connections,
    /// Query the external game catalog
    Search {
        /// Free-text query, e.g. "portal"
        query: String,
    },
    /// Run every local demo in sequence (skips the network-backed search)
    RunAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let cli = Cli::parse();

    info!("starting GameLink demo");

    let config = load_config().context("failed to load configuration")?;
    let pool = gamelink_database::initialize_database(&config.database)
        .await
        .context("failed to initialize database")?;

    match cli.command {
        Commands::Compare => run_compare(&pool).await?,
        Commands::Session => run_session(&pool, &config).await?,
        Commands::Connections => run_connections(&pool).await?,
        Commands::Search { query } => run_search(&config, &query).await?,
        Commands::RunAll => {
            run_compare(&pool).await?;
            run_session(&pool, &config).await?;
            run_connections(&pool).await?;
        }
    }

    Ok(())
}

const ALICE: i64 = 1;
const BOB: i64 = 2;

fn game(external_id: i64, name: &str, platform: &str, genres: &[&str], rating: Option<i64>) -> CreateGameRequest {
    CreateGameRequest {
        external_id: Some(external_id),
        name: name.to_string(),
        platform: platform.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        ownership: None,
        rating,
        favorite: rating.map_or(false, |r| r >= 9),
    }
}

async fn run_compare(pool: &sqlx::SqlitePool) -> Result<()> {
    let library = LibraryService::new(pool.clone());

    for request in [
        game(3498, "Grand Theft Auto V", "pc", &["Action"], Some(8)),
        game(3328, "The Witcher 3", "pc", &["RPG"], Some(10)),
        game(4200, "Portal 2", "pc", &["Puzzle"], Some(9)),
    ] {
        if let Err(e) = library.add_game(ALICE, &request).await {
            info!(error = %e, "skipping game already in Alice's library");
        }
    }

    for request in [
        game(3328, "The Witcher 3", "playstation", &["RPG"], Some(9)),
        game(5286, "Elden Ring", "playstation", &["RPG", "Souls-like"], Some(10)),
    ] {
        if let Err(e) = library.add_game(BOB, &request).await {
            info!(error = %e, "skipping game already in Bob's library");
        }
    }

    let report = library.compare_libraries(ALICE, BOB).await?;

    println!("Compatibility: {} ({})", report.score, report.rating.label());
    println!(
        "  shared: {}, unique to Alice: {}, unique to Bob: {}",
        report.shared_games.len(),
        report.unique_to_first.len(),
        report.unique_to_second.len()
    );
    for rec in &report.recommendations {
        println!("  try: {} on {}", rec.name, rec.platform);
    }

    Ok(())
}

async fn run_session(pool: &sqlx::SqlitePool, config: &gamelink_config::AppConfig) -> Result<()> {
    let sink = Arc::new(LoggingSink);
    let sessions = SessionService::with_sink(pool.clone(), config.sessions.clone(), sink.clone());
    let messages = MessageService::with_sink(pool.clone(), sink);

    let session = sessions
        .create_session(
            ALICE,
            &CreateSessionRequest {
                title: "Co-op evening".to_string(),
                game_name: "Deep Rock Galactic".to_string(),
                platform: Some("pc".to_string()),
                scheduled_at: (chrono::Utc::now() + chrono::Duration::hours(2)).to_rfc3339(),
                max_participants: Some(4),
                privacy: Some("invite_only".to_string()),
                invited_user_ids: vec![],
            },
        )
        .await?;
    println!("Session scheduled: {} ({})", session.title, session.public_id);

    let invite = sessions
        .invite_user(
            &session.public_id,
            ALICE,
            &CreateInviteRequest {
                invited_user_id: BOB,
                message: Some("Bring your driller build".to_string()),
            },
        )
        .await?;

    sessions.accept_invite(&invite.public_id, BOB).await?;
    println!(
        "Bob joined; participants: {}",
        sessions.list_participants(&session.public_id).await?.len()
    );

    messages
        .post_message(
            &session.public_id,
            BOB,
            &CreateMessageRequest {
                body: "ready when you are".to_string(),
                kind: None,
            },
        )
        .await?;

    let cancelled = sessions.cancel_session(&session.public_id, ALICE).await?;
    println!("Session {} is now {:?}", cancelled.public_id, cancelled.status);

    Ok(())
}

async fn run_search(config: &gamelink_config::AppConfig, query: &str) -> Result<()> {
    let client = match CatalogClient::new(config.catalog.clone()) {
        Ok(client) => client,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    match client.search(query).await {
        Ok(entries) => {
            println!("Catalog results for \"{query}\":");
            for entry in entries.iter().take(10) {
                println!(
                    "  [{}] {} ({})",
                    entry.external_id,
                    entry.name,
                    entry.release_date.as_deref().unwrap_or("unreleased")
                );
            }
        }
        // Transport and decode failures all collapse into one message
        Err(e) => println!("{e}"),
    }

    Ok(())
}

async fn run_connections(pool: &sqlx::SqlitePool) -> Result<()> {
    let connections = ConnectionService::new(pool.clone());

    let edge = match connections.request(ALICE, BOB, Some("nice runs".to_string())).await {
        Ok(edge) => edge,
        Err(e) => {
            println!("Connection request skipped: {e}");
            return Ok(());
        }
    };

    connections.accept(edge.id, BOB).await?;
    println!("Alice's friends: {:?}", connections.friend_ids(ALICE).await?);

    Ok(())
}
