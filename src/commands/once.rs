//! Implementation of the --once command.
//!
//! Runs a single automation evaluation for the current time, applies the
//! selected wallpaper, reports when the next change would happen, and exits.
//! Useful from cron jobs or compositor startup hooks instead of the daemon.

use anyhow::Result;
use chrono::Local;

use crate::automation::AutomationController;
use crate::backend::create_backend;
use crate::commands::{log_evaluation, refresh_library};
use crate::config::Config;
use crate::logger::Log;

/// Handle the --once command.
pub fn handle_once_command() -> Result<()> {
    Log::log_version();

    let config_path = Config::get_config_path()?;
    let config = Config::load()?;
    config.log_config(&config_path);

    let library = refresh_library(&config.library_path(&config_path))?;
    let mut backend = create_backend(&config)?;

    let now = Local::now().naive_local();
    let mut controller = AutomationController::new(config.automation_settings()?, now);
    let evaluation = controller.check_and_update(now, &library, backend.as_mut());
    log_evaluation(&controller, &evaluation, now);

    Log::log_end();

    match evaluation.backend_error {
        Some(e) => Err(e.context("Failed to apply wallpaper")),
        None => Ok(()),
    }
}
