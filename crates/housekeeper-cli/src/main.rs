use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use housekeeper_core::{
    content::{Selection, StateFilter},
    scheduler::{Action, HousekeepingTask},
    storage::Database,
    AppConfig,
};

mod commands;

#[derive(Parser)]
#[command(name = "housekeeper")]
#[command(author, version, about = "Scheduled bulk maintenance for a content database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move stale articles to another category
    Move {
        /// Destination category id
        #[arg(short, long)]
        target: i64,
        #[command(flatten)]
        selector: SelectorArgs,
    },
    /// Archive stale articles
    Archive {
        #[command(flatten)]
        selector: SelectorArgs,
    },
    /// Unpublish stale articles
    Unpublish {
        #[command(flatten)]
        selector: SelectorArgs,
    },
    /// Change the access level of stale articles
    SetAccess {
        /// New access level
        #[arg(short, long)]
        level: i64,
        #[command(flatten)]
        selector: SelectorArgs,
    },
    /// Run all configured housekeeping tasks once
    Run,
    /// Background daemon that runs the configured tasks on a schedule
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

#[derive(Subcommand)]
enum DaemonAction {
    /// Start the background daemon
    Start,
    /// Stop the background daemon
    Stop,
    /// Check daemon status
    Status,
}

/// Article selection flags shared by the one-shot commands
#[derive(Args)]
struct SelectorArgs {
    /// Restrict to this category id (0 = all categories)
    #[arg(short, long, default_value_t = 0)]
    category: i64,

    /// Also match articles in subcategories
    #[arg(long)]
    include_subcategories: bool,

    /// Only match articles older than this many days
    #[arg(short, long, default_value_t = 30)]
    age_days: u32,

    /// Date column the age applies to: created, modified or publish_up
    #[arg(long, default_value = "publish_up")]
    date_field: String,

    /// Only match this publication state code ("*" for any)
    #[arg(short, long, default_value = "1")]
    state: String,

    /// Apply the changes instead of previewing them
    #[arg(long)]
    execute: bool,
}

impl SelectorArgs {
    fn selection(&self) -> Result<Selection> {
        let state_filter = StateFilter::parse(&self.state)
            .ok_or_else(|| anyhow::anyhow!("invalid state filter: {}", self.state))?;

        Ok(Selection {
            source_category: self.category,
            include_subcategories: self.include_subcategories,
            age_days: self.age_days,
            date_field: self.date_field.parse().unwrap_or_default(),
            state_filter,
        })
    }

    fn task(&self, name: &str, action: Action) -> Result<HousekeepingTask> {
        Ok(HousekeepingTask {
            name: name.to_string(),
            selection: self.selection()?,
            action,
            dry_run: !self.execute,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Open the content database
    let db = Arc::new(Database::new(&config).await?);

    match cli.command {
        Commands::Move { target, selector } => {
            let task = selector.task("move", Action::Move { target_category: target })?;
            commands::apply::run(&db, task).await
        }
        Commands::Archive { selector } => {
            let task = selector.task("archive", Action::Archive)?;
            commands::apply::run(&db, task).await
        }
        Commands::Unpublish { selector } => {
            let task = selector.task("unpublish", Action::Unpublish)?;
            commands::apply::run(&db, task).await
        }
        Commands::SetAccess { level, selector } => {
            let task = selector.task("set-access", Action::SetAccess { target_access: level })?;
            commands::apply::run(&db, task).await
        }
        Commands::Run => commands::run::run(&db, &config).await,
        Commands::Daemon { action } => match action {
            DaemonAction::Start => commands::daemon::start(db, config).await,
            DaemonAction::Stop => commands::daemon::stop().await,
            DaemonAction::Status => commands::daemon::status().await,
        },
    }
}
