//! Command-line front end for the capsule engine.
//!
//! # Responsibility
//! - Run one engine use-case per invocation against a migrated database.
//! - Print results as JSON on stdout and failures as JSON on stderr.

use anyhow::Context;
use capsule_core::db::{open_db, Connection};
use capsule_core::{
    default_log_level, init_logging, parse_id, parse_id_list, ContentError, EngineConfig,
    NavigationService, PreferenceService, RankLevel, RecommendationService, SampleRequest,
    SaveStateService, SqliteFolderRepository, SqliteHierarchyRepository,
    SqlitePreferenceRepository, TrendingService,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "capsule_cli", version, about = "Capsule navigation and recommendation engine")]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    #[arg(long)]
    db: PathBuf,

    /// JSON engine config; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the capsule that follows the given one.
    Next { capsule_id: String },
    /// Sample capsules matching intents or themes.
    Recommend {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "")]
        intents: String,
        #[arg(long, default_value = "")]
        themes: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Report whether a capsule sits in one of the user's own folders.
    Saved {
        #[arg(long)]
        user: String,
        #[arg(long)]
        capsule: String,
    },
    /// Most-saved capsules the user has not saved yet.
    Suggested {
        #[arg(long)]
        user: String,
    },
    /// Rank a hierarchy level by summed save counts.
    Top {
        #[arg(value_enum)]
        level: TopLevel,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Merge intents/themes into the user's stored preference.
    Preferences {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "")]
        intents: String,
        #[arg(long, default_value = "")]
        themes: String,
    },
    /// Print engine version info.
    Ping,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TopLevel {
    Sets,
    Subjects,
    Themes,
}

impl From<TopLevel> for RankLevel {
    fn from(value: TopLevel) -> Self {
        match value {
            TopLevel::Sets => RankLevel::Set,
            TopLevel::Subjects => RankLevel::Subject,
            TopLevel::Themes => RankLevel::Theme,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err
                .downcast_ref::<ContentError>()
                .map_or("INTERNAL_ERROR", ContentError::code);
            eprintln!("{}", json!({ "error": code, "message": format!("{err:#}") }));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level().as_str(), log_dir).context("init logging")?;
    }
    let config = match cli.config.as_deref() {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };

    let value = execute(&cli.db, config, cli.command)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn connect(db: &Path) -> anyhow::Result<Connection> {
    open_db(db).with_context(|| format!("open database `{}`", db.display()))
}

/// Runs one command; only database commands open `db`.
fn execute(
    db: &Path,
    config: EngineConfig,
    command: Command,
) -> anyhow::Result<serde_json::Value> {
    let value = match command {
        Command::Next { capsule_id } => {
            let capsule_id = parse_id("capsuleId", &capsule_id)?;
            let conn = &connect(db)?;
            let service = NavigationService::new(SqliteHierarchyRepository::try_new(conn)?);
            serde_json::to_value(service.resolve_next_detailed(capsule_id)?)?
        }
        Command::Recommend {
            user,
            intents,
            themes,
            page,
            page_size,
        } => {
            let request = SampleRequest::for_user(parse_id("userId", &user)?)
                .intents(parse_id_list("intentIds", &intents)?)
                .themes(parse_id_list("themeIds", &themes)?)
                .page(page, page_size);
            let conn = &connect(db)?;
            let service = RecommendationService::new(
                SqliteHierarchyRepository::try_new(conn)?,
                SqliteFolderRepository::try_new(conn)?,
                config,
            );
            serde_json::to_value(service.sample(&request)?)?
        }
        Command::Saved { user, capsule } => {
            let user_id = parse_id("userId", &user)?;
            let capsule_id = parse_id("capsuleId", &capsule)?;
            let conn = &connect(db)?;
            let service = SaveStateService::new(SqliteFolderRepository::try_new(conn)?);
            json!({ "isSaved": service.is_saved(user_id, capsule_id)? })
        }
        Command::Suggested { user } => {
            let user_id = parse_id("userId", &user)?;
            let conn = &connect(db)?;
            let service = TrendingService::new(
                SqliteHierarchyRepository::try_new(conn)?,
                SqliteFolderRepository::try_new(conn)?,
                config,
            );
            serde_json::to_value(service.suggested_capsules(user_id)?)?
        }
        Command::Top {
            level,
            page,
            page_size,
        } => {
            let conn = &connect(db)?;
            let service = TrendingService::new(
                SqliteHierarchyRepository::try_new(conn)?,
                SqliteFolderRepository::try_new(conn)?,
                config,
            );
            serde_json::to_value(service.top(level.into(), page, page_size)?)?
        }
        Command::Preferences {
            user,
            intents,
            themes,
        } => {
            let user_id = parse_id("userId", &user)?;
            let conn = &connect(db)?;
            let service = PreferenceService::new(SqlitePreferenceRepository::try_new(conn)?);
            let saved = service.save_preferences(
                user_id,
                parse_id_list("intentIds", &intents)?,
                parse_id_list("themeIds", &themes)?,
            )?;
            json!({ "created": saved.created, "preference": saved.preference })
        }
        Command::Ping => json!({
            "ping": capsule_core::ping(),
            "version": capsule_core::core_version(),
        }),
    };
    Ok(value)
}
