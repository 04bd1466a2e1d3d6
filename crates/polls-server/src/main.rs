use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use polls_core::admin::NewQuestion;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_tracing(args.json_logs);

    let config = config::Config::load(&args.config)?;
    ensure_database_dir(&config.database.url);

    let db = polls_db::create_pool(&config.database.url, config.database.max_connections).await?;
    polls_db::run_migrations(&db).await?;

    match args.command.unwrap_or(cli::Command::Serve) {
        cli::Command::Serve => serve(config, db).await,
        cli::Command::CreateQuestion {
            text,
            days,
            choices,
        } => {
            let created = polls_core::admin::create_question(
                &db,
                NewQuestion {
                    question_text: text,
                    pub_date: Some(offset_by_days(Utc::now(), days)?),
                    choices,
                },
            )
            .await?;
            println!(
                "Created question {} \"{}\" with {} choices",
                created.question.id,
                created.question.question_text,
                created.choices.len()
            );
            Ok(())
        }
    }
}

fn offset_by_days(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| anyhow::anyhow!("--days {days} is out of range"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("polls=info,tower_http=debug"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn serve(config: config::Config, db: polls_db::DbPool) -> Result<()> {
    let app_config = config.app_config();
    let state = polls_core::AppState {
        db,
        config: app_config.clone(),
    };
    let app = polls_api::build_router(&app_config).with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!("Listening on http://{}", config.server.bind_address);
    tracing::info!("Database: {}", config.database.url);
    if app_config.admin_enabled {
        tracing::info!("Admin: http://{}/admin/", config.server.bind_address);
    }

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutting down...");
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_database_dir(database_url: &str) {
    let Some(db_path) = database_url
        .strip_prefix("sqlite://")
        .and_then(|s| s.split('?').next())
    else {
        return;
    };
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Could not create directory '{}': {}", parent.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ensure_database_dir, offset_by_days};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn creates_parent_dir_for_file_databases() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("polls.db");
        ensure_database_dir(&format!("sqlite://{}?mode=rwc", nested.display()));
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn offsets_publication_by_whole_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(offset_by_days(now, -30).unwrap(), now - Duration::days(30));
        assert_eq!(offset_by_days(now, 0).unwrap(), now);
    }

    #[test]
    fn huge_day_offsets_are_errors() {
        let now = Utc::now();
        assert!(offset_by_days(now, i64::MAX).is_err());
        assert!(offset_by_days(now, 400_000_000).is_err());
    }

    #[test]
    fn ignores_in_memory_databases() {
        ensure_database_dir("sqlite::memory:");
    }
}
