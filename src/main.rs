use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_hound::infrastructure::AppState;
use book_hound::services::branch_service;
use book_hound::{config, db, server};

const USAGE: &str = "usage: book-hound [serve | import <file.csv> | branches]";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_hound=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    let state = AppState::new(db, &config).expect("Failed to build catalogue client");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => {
            let app = server::build_router(state, &config.cors_allowed_origins);
            server::serve(app, config.port)
                .await
                .map_err(|e| format!("Server error: {}", e))
        }
        ["import", path] => run_import(&state, path).await,
        ["branches"] => run_branches(&state).await,
        _ => Err(USAGE.to_string()),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// Import and enrich a CSV export without the browser UI
async fn run_import(state: &AppState, path: &str) -> Result<(), String> {
    let content = std::fs::read(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);

    let controller = &state.controller;
    controller.select_file(name, &content).map_err(|e| e.to_string())?;

    let handle = controller.process().await.map_err(|e| e.to_string())?;
    handle
        .await
        .map_err(|e| format!("Enrichment task failed: {}", e))?;

    let snapshot = controller.snapshot();
    if let Some(report) = &snapshot.last_report {
        println!(
            "{}",
            serde_json::to_string_pretty(report).map_err(|e| e.to_string())?
        );
    }
    match snapshot.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Refresh branches from the catalogue and print the open ones
async fn run_branches(state: &AppState) -> Result<(), String> {
    branch_service::refresh_branches(state.catalogue.as_ref(), state.branch_repo.as_ref())
        .await
        .map_err(|e| e.to_string())?;

    let open = branch_service::list_open(state.branch_repo.as_ref())
        .await
        .map_err(|e| e.to_string())?;
    for branch in &open {
        println!("{}\t{}", branch.branch_code, branch.branch_name);
    }
    Ok(())
}
