//! Maintenance commands against the configured database.

use anyhow::Context;
use clap::{Parser, Subcommand};
use db::{DBService, models::post::CreatePost, schema};
use server::config::DatabaseConfig;
use services::services::{
    auth::{AuthError, AuthService, LoginRequest, RegisterRequest},
    database_validator::DatabaseValidator,
    social::SocialService,
};
use tracing::info;
use utils::logging::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "admin", about = "Inspect, reset or seed the database")]
struct Cli {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that every table exists and print row counts.
    Check,
    /// Delete all rows from every table.
    Clear {
        /// Required; clearing cannot be undone.
        #[arg(long)]
        yes: bool,
    },
    /// Create the demo account (or log into it) and add one post.
    Seed,
}

const DEMO_USERNAME: &str = "agent_test";
const DEMO_EMAIL: &str = "agent@test.com";
const DEMO_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("warn,admin=info");

    let cli = Cli::parse();
    let db = DBService::new(
        &cli.database.database_url,
        cli.database.db_max_connections,
    )
    .await
    .with_context(|| format!("opening {}", cli.database.database_url))?;

    let outcome = run(&db, cli.command).await;
    db.close().await;
    outcome
}

async fn run(db: &DBService, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Check => {
            let result = DatabaseValidator::new(db.pool.clone()).validate().await?;
            for table in &result.tables {
                println!("{:<14} {:>8}", table.name, table.rows);
            }
            println!("{}", result.summary());
            if !result.is_ok() {
                anyhow::bail!("database check failed");
            }
        }
        Command::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear the database without --yes");
            }
            let removed = schema::clear_all(&db.pool).await?;
            println!("Removed {} rows", removed);
        }
        Command::Seed => {
            // The issued token is discarded, so any secret will do.
            let auth = AuthService::new("admin-seed", chrono::Duration::hours(1));
            let post_id = seed_demo(db, &auth).await?;
            println!("Seeded post {} for {}", post_id, DEMO_USERNAME);
        }
    }
    Ok(())
}

/// Logs into the demo account, registering it first when it is missing,
/// then posts as it. Returns the new post id.
async fn seed_demo(db: &DBService, auth: &AuthService) -> anyhow::Result<i64> {
    let login = LoginRequest {
        email: DEMO_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
    };
    let session = match auth.login(&db.pool, login).await {
        Ok(session) => {
            info!("Demo user already exists, logged in");
            session
        }
        Err(AuthError::UserNotFound) => {
            let session = auth
                .register(
                    &db.pool,
                    RegisterRequest {
                        email: DEMO_EMAIL.to_string(),
                        username: DEMO_USERNAME.to_string(),
                        password: DEMO_PASSWORD.to_string(),
                        full_name: Some("Agent Test".to_string()),
                    },
                )
                .await?;
            info!(user_id = session.user.id, "Registered demo user");
            session
        }
        Err(e) => return Err(e.into()),
    };

    let post = SocialService::create_post(
        &db.pool,
        session.user.id,
        &CreatePost {
            content: Some("Hello World! This is an automated test post.".to_string()),
            image_url: Some("https://via.placeholder.com/600".to_string()),
            location: Some("Test Lab".to_string()),
        },
    )
    .await?;
    Ok(post.id)
}
