mod app;
mod app_state;
mod config;
mod errors;
mod event_handlers;
mod logging;
mod rendering;
mod workbench;

use app::App;
use config::Config;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = Config::load()?;
    if let Some(log_path) = config.log_path() {
        logging::init_logging(&log_path)?;
    }
    tracing::info!(?config, "configuration loaded");

    let terminal = ratatui::init();
    let result = App::new(config).run(terminal).await;
    ratatui::restore();
    result
}
