use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_builder::cli::{renderer_chain, Cli, Commands, StrategyArg};
use resume_builder::config::Config;
use resume_builder::errors::{AppError, Notification};
use resume_builder::export::{DirectorySink, DownloadSink, PdfExporter};
use resume_builder::layout::a4_geometry;
use resume_builder::state::{exported_notification, AppState};
use resume_builder::store::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-builder v{}", env!("CARGO_PKG_VERSION"));

    let (strategy, snapshot) = match &cli.command {
        Commands::ExportPdf { strategy, snapshot } => (*strategy, snapshot.clone()),
        _ => (StrategyArg::Direct, None),
    };
    let downloads: Arc<dyn DownloadSink> = Arc::new(DirectorySink::new(&config.output_dir));
    let geometry = a4_geometry(config.page_margin_mm);
    info!(
        margin_mm = geometry.margin_mm,
        scale = config.snapshot_scale,
        "Page geometry: A4"
    );
    let exporter = Arc::new(PdfExporter::new(
        renderer_chain(strategy, snapshot, config.snapshot_scale),
        geometry,
        downloads.clone(),
    ));

    let mut state = AppState::open(config, exporter, downloads)?;
    let outcome = run(&mut state, cli.command).await;
    state.shutdown().await;

    match outcome {
        Ok(Some(notification)) => {
            println!("{}", notification.message);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            eprintln!("{}", e.notification().message);
            std::process::exit(1);
        }
    }
}

async fn run(state: &mut AppState, command: Commands) -> Result<Option<Notification>, AppError> {
    match command {
        Commands::Show => {
            let json = serde_json::to_string_pretty(state.record())
                .map_err(|e| AppError::Internal(e.into()))?;
            println!("{json}");
            Ok(None)
        }
        Commands::Import { path } => state.import_file(&path).await.map(Some),
        Commands::ExportJson => {
            let path = state.export_json().await?;
            Ok(Some(Notification::success(format!(
                "Resume exported to {}",
                path.display()
            ))))
        }
        Commands::ExportPdf { .. } => {
            let today = chrono::Local::now().date_naive();
            let exported = state.export_pdf(today).await?;
            info!(path = %exported.path.display(), "PDF written");
            Ok(Some(exported_notification(&exported)))
        }
        Commands::Reset => {
            state.reset();
            Ok(Some(Notification::success("Resume reset to the blank template")))
        }
        Commands::AddSkill { skill } => {
            let added = state.dispatch(Action::AddSkill(skill.clone()));
            let message = if added {
                format!("Added skill '{}'", skill.trim())
            } else {
                format!("Skill '{}' not added", skill.trim())
            };
            Ok(Some(Notification::success(message)))
        }
        Commands::RemoveSkill { skill } => {
            let removed = state.dispatch(Action::RemoveSkill(skill.clone()));
            let message = if removed {
                format!("Removed skill '{skill}'")
            } else {
                format!("Skill '{skill}' is not listed")
            };
            Ok(Some(Notification::success(message)))
        }
    }
}
