use anyhow::{Context, Result};

use tasks::Storage;
use tui::App;

mod config;
mod logging;
mod tasks;
mod timer;
mod tui;
mod wheel;

fn main() -> Result<()> {
    let config = config::load_config()?;
    let _guard = logging::init(&config.log_dir)?;
    tracing::info!(
        database = %config.database.display(),
        config_file = ?config::get_config_path().ok(),
        "taskwheel starting"
    );

    if let Some(parent) = config.database.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let storage = Storage::open(&config.database)
        .with_context(|| format!("opening {}", config.database.display()))?;
    if let Some(at) = storage.last_updated(tasks::storage::TASKS_KEY)? {
        tracing::info!(%at, "task list last saved");
    }
    let mut app = App::new(storage, config.frame())?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    let app_result = app.run(&mut terminal);
    ratatui::restore();

    if let Err(e) = &app_result {
        tracing::error!(error = %e, "taskwheel exited with error");
    }
    app_result
}
