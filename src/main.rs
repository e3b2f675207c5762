use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

mod db;
mod feed;
mod matching;
mod models;
mod recommend;
mod trending;

use feed::{FeedFilter, FeedSort};
use models::MatchResult;

#[derive(Parser)]
#[command(name = "discovery-ranking")]
#[command(about = "Trending, matching and recommendation core for the project discovery platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import catalog projects from a CSV file
    ImportProjects {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Recompute trending scores for recent approved posts
    UpdateTrending {
        #[arg(long, default_value_t = trending::TRENDING_WINDOW_DAYS)]
        window_days: i64,
    },
    /// Score one catalog project against a user profile
    Match {
        #[arg(long)]
        email: String,
        #[arg(long)]
        project: Uuid,
    },
    /// Rank catalog projects similar to a reference project
    Recommend {
        #[arg(long)]
        email: String,
        #[arg(long)]
        project: Uuid,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Browse the community feed with filters and pagination
    Feed {
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        post_type: Option<String>,
        #[arg(long, default_value = "latest")]
        sort: String,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::ImportProjects { csv } => {
            let inserted = db::import_projects(&pool, &csv).await?;
            println!("Inserted {inserted} projects from {}.", csv.display());
        }
        Commands::UpdateTrending { window_days } => {
            let outcome = trending::update_all(&pool, window_days).await?;
            let payload = serde_json::json!({
                "success": true,
                "updated": outcome.updated,
                "failed": outcome.failed,
                "timestamp": Utc::now().to_rfc3339(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Match { email, project } => {
            let profile = db::fetch_profile(&pool, &email).await?;
            let project = db::fetch_project(&pool, project).await?;
            // Missing profile or project soft-fails to the zero result.
            let result = match (profile, project) {
                (Some(profile), Some(project)) => matching::match_profile(&profile, &project),
                _ => MatchResult::zero(),
            };
            let label = matching::match_label(result.match_percentage);
            let mut payload = serde_json::to_value(&result)?;
            payload["label"] = serde_json::Value::String(label.to_string());
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Recommend {
            email,
            project,
            limit,
        } => {
            let ranked = recommend::recommend(&pool, &email, project, limit).await?;
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }
        Commands::Feed {
            domain,
            difficulty,
            post_type,
            sort,
            page,
            limit,
        } => {
            let sort = FeedSort::parse(&sort)
                .with_context(|| format!("unknown sort key '{sort}', expected latest, trending or popular"))?;
            let filter = FeedFilter {
                domain,
                difficulty,
                post_type,
                sort,
                page,
                limit,
            };
            let page = feed::fetch(&pool, &filter).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
    }

    Ok(())
}
