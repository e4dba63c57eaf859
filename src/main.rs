use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};

use engagement_wizard::config::{AppConfig, ConfigOrigin, PersistenceBackend};
use engagement_wizard::core::logging;
use engagement_wizard::core::project::{
    describe_snapshot, open_project_wizard, CreateProjectHandler, ProjectDraft, ProjectRegistry,
    ProjectService,
};
use engagement_wizard::core::wizard::{
    FileSnapshotStore, MemorySnapshotStore, SnapshotSlot, SnapshotStore,
};
use engagement_wizard::tui::{self, views::{ProjectWizardView, WizardOutcome}};

const USAGE: &str = "usage: engagement-wizard [list]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, origin) = AppConfig::load();
    let command = std::env::args().nth(1);

    match command.as_deref() {
        None => run_wizard(&config, &origin).await,
        Some("list") => list(&config, &origin).await,
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => bail!("unknown command {other:?}\n{USAGE}"),
    }
}

fn snapshot_store(config: &AppConfig) -> Arc<dyn SnapshotStore> {
    match config.wizard.persistence {
        PersistenceBackend::File => Arc::new(FileSnapshotStore::new(config.snapshot_dir())),
        PersistenceBackend::Memory => Arc::new(MemorySnapshotStore::new()),
    }
}

async fn run_wizard(config: &AppConfig, origin: &ConfigOrigin) -> anyhow::Result<()> {
    // The TUI owns the terminal, so logs only go to the file
    let _log_guard = logging::init_tui(&config.data_dir());
    origin.log();
    log::info!("{} v{} starting", engagement_wizard::NAME, engagement_wizard::VERSION);

    let registry = Arc::new(ProjectRegistry::new(config.projects_path()));
    let handler = Arc::new(CreateProjectHandler::new(registry));
    let wizard = open_project_wizard(
        handler.clone(),
        Some((config.wizard.persistence_key.clone(), snapshot_store(config))),
        config.wizard.resume,
    )?;

    let view = ProjectWizardView::new(wizard, handler);
    let outcome = tui::app::run(view, Duration::from_millis(config.tui.tick_rate_ms))
        .await
        .context("Terminal UI failed")?;

    if let Some(warning) = origin.warning() {
        eprintln!("{warning}");
    }
    match outcome {
        WizardOutcome::Created(project) => {
            println!(
                "Created project {:?} for {} ({})",
                project.details.name, project.details.client, project.id
            );
        }
        WizardOutcome::Cancelled => {
            println!("Wizard closed. Progress is kept and resumes on the next start.");
        }
    }
    Ok(())
}

/// Print resumable wizards and created projects.
async fn list(config: &AppConfig, origin: &ConfigOrigin) -> anyhow::Result<()> {
    let _log_guard = logging::init(&config.data_dir());
    origin.log();

    let store = snapshot_store(config);
    let keys = store.keys().context("Failed to list wizard snapshots")?;
    println!("Resumable wizards ({}):", keys.len());
    for key in keys {
        let slot = SnapshotSlot::new(key.clone(), store.clone());
        match slot.load::<ProjectDraft>() {
            Some(snapshot) => println!("  {key}: {}", describe_snapshot(&snapshot)),
            None => println!("  {key}: unreadable"),
        }
    }

    let registry = ProjectRegistry::new(config.projects_path());
    let projects = registry
        .list_projects()
        .await
        .context("Failed to read projects")?;
    println!("Projects ({}):", projects.len());
    for project in projects {
        println!(
            "  {} {:<30} {} [{}]",
            project.created_at.format("%Y-%m-%d"),
            project.details.name,
            project.details.client,
            project.details.engagement_type.label()
        );
    }
    Ok(())
}
