use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime};
use std::path::{Path, PathBuf};

use lumawall::args::{CliAction, ParsedArgs, display_help, display_version_info};
use lumawall::automation::{AutomationController, Evaluation, Schedule};
use lumawall::autostart::sync_autostart;
use lumawall::backend::{WallpaperBackend, create_backend};
use lumawall::commands::{self, log_evaluation, refresh_library};
use lumawall::config::Config;
use lumawall::constants::*;
use lumawall::library::Library;
use lumawall::lock::InstanceLock;
use lumawall::logger::Log;
use lumawall::signals::{SignalMessage, setup_signal_handler};

fn main() -> Result<()> {
    let parsed = ParsedArgs::from_env();

    match parsed.action {
        CliAction::ShowVersion => display_version_info(),
        CliAction::ShowHelp => display_help(),
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Once { debug_enabled } => {
            Log::set_debug(debug_enabled);
            commands::once::handle_once_command()?;
        }
        CliAction::Preview {
            debug_enabled,
            time,
        } => {
            Log::set_debug(debug_enabled);
            commands::preview::handle_preview_command(time)?;
        }
        CliAction::List { debug_enabled } => {
            Log::set_debug(debug_enabled);
            commands::list::handle_list_command()?;
        }
        CliAction::Add {
            debug_enabled,
            path,
            brightness,
        } => {
            Log::set_debug(debug_enabled);
            commands::add::handle_add_command(&path, brightness)?;
        }
        CliAction::Remove {
            debug_enabled,
            path,
        } => {
            Log::set_debug(debug_enabled);
            commands::remove::handle_remove_command(&path)?;
        }
        CliAction::SetEnabled {
            debug_enabled,
            path,
            enabled,
        } => {
            Log::set_debug(debug_enabled);
            commands::toggle::handle_toggle_command(&path, enabled)?;
        }
        CliAction::Set {
            debug_enabled,
            path,
        } => {
            Log::set_debug(debug_enabled);
            commands::set::handle_set_command(&path)?;
        }
        CliAction::Run { debug_enabled } => {
            Log::set_debug(debug_enabled);
            run_automation()?;
        }
    }

    Ok(())
}

/// Everything the daemon reloads on SIGHUP/SIGUSR2.
struct Session {
    config_path: PathBuf,
    config: Config,
    library_path: PathBuf,
    backend: Box<dyn WallpaperBackend>,
}

impl Session {
    fn load() -> Result<Self> {
        let config_path = Config::get_config_path()?;
        let config = Config::load()?;
        config.log_config(&config_path);

        let backend = create_backend(&config)?;

        if let Err(e) = sync_autostart(config.starts_on_startup.unwrap_or(DEFAULT_STARTS_ON_STARTUP)) {
            Log::log_warning(&format!("Could not update login startup: {}", e));
        }

        Ok(Self {
            library_path: config.library_path(&config_path),
            config_path,
            config,
            backend,
        })
    }
}

/// Load the library for one evaluation, keeping the previous one if the file is unreadable.
fn load_library(path: &Path, previous: &Library) -> Library {
    match refresh_library(path) {
        Ok(library) => library,
        Err(e) => {
            Log::log_warning(&format!("{:#}", e));
            Log::log_decorated("Keeping the previously loaded library");
            previous.clone()
        }
    }
}

/// Wall-clock time of the next evaluation.
fn wake_time(evaluation: &Evaluation, controller: &AutomationController, now: NaiveDateTime) -> NaiveDateTime {
    match evaluation.schedule {
        Schedule::Scheduled(next) => next,
        // Nothing will change on its own; look again after one interval in
        // case the library file was edited
        Schedule::Idle => now + controller.state().check_interval,
    }
}

/// Run automation until a shutdown signal arrives.
fn run_automation() -> Result<()> {
    Log::log_version();

    let signal_state = setup_signal_handler()?;

    let lock_path = InstanceLock::default_path();
    let Some(lock) = InstanceLock::acquire(&lock_path)? else {
        let owner = InstanceLock::owner_pid(&lock_path)
            .map(|pid| format!(" (PID: {})", pid))
            .unwrap_or_default();
        Log::log_error(&format!(
            "Another instance of lumawall is already running{}.\n\
            • Stop it before starting a new one, or send it SIGHUP to reload.",
            owner
        ));
        std::process::exit(EXIT_FAILURE);
    };
    Log::log_decorated("Lock acquired, starting lumawall...");

    let mut session = Session::load()?;
    let mut library = load_library(&session.library_path, &Library::new());

    let now = Local::now().naive_local();
    let settings = session
        .config
        .automation_settings()
        .context("Failed to read automation settings")?;
    let mut controller = AutomationController::new(settings, now);
    let mut reload_requested = false;
    let mut last_check = now;

    while signal_state.is_running() {
        let now = Local::now().naive_local();

        // Detect large time jumps (system sleep/resume scenarios)
        if now - last_check > Duration::seconds(SLEEP_DETECTION_THRESHOLD_SECS) {
            Log::log_decorated(&format!(
                "Large time jump detected ({} minutes). System may have resumed from sleep.",
                (now - last_check).num_minutes()
            ));
        }
        last_check = now;

        library = load_library(&session.library_path, &library);

        let evaluation = if std::mem::take(&mut reload_requested) {
            reload(&mut session, &mut controller, &library, now)
        } else {
            controller.check_and_update(now, &library, session.backend.as_mut())
        };
        log_evaluation(&controller, &evaluation, now);

        let target = wake_time(&evaluation, &controller, now);
        match signal_state.wait_until(target, || Local::now().naive_local()) {
            Some(SignalMessage::Reload) => reload_requested = true,
            Some(SignalMessage::Shutdown) => break,
            None => {}
        }
    }

    Log::log_block_start("Shutting down lumawall...");
    drop(lock);
    Log::log_end();

    Ok(())
}

/// Re-read the configuration and hand the new settings to automation.
///
/// A broken config keeps the running session and only re-evaluates.
fn reload(
    session: &mut Session,
    controller: &mut AutomationController,
    library: &Library,
    now: NaiveDateTime,
) -> Evaluation {
    Log::log_block_start("Reloading configuration...");

    let reloaded = Session::load().and_then(|new_session| {
        let settings = new_session.config.automation_settings()?;
        Ok((new_session, settings))
    });

    match reloaded {
        Ok((new_session, settings)) => {
            *session = new_session;
            let library = load_library(&session.library_path, library);
            controller.apply_settings(settings, now, &library, session.backend.as_mut())
        }
        Err(e) => {
            Log::log_error(&format!("Reload failed, keeping current settings: {:#}", e));
            Log::log_decorated(&format!(
                "Fix {} and send the reload signal again",
                lumawall::utils::path_for_display(&session.config_path)
            ));
            controller.check_and_update(now, library, session.backend.as_mut())
        }
    }
}
