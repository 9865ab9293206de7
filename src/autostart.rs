//! Start-on-login registration.
//!
//! Mirrors the `starts_on_startup` setting into the platform's login
//! mechanism: an XDG autostart `.desktop` entry on Unix desktops, or a value
//! under the current user's `Run` registry key on Windows. Syncing is
//! idempotent and only touches the system when the registration differs.

use anyhow::{Context, Result};
#[cfg(unix)]
use std::fs;
use std::path::Path;

use crate::constants::AUTOSTART_ENTRY_NAME;
use crate::logger::Log;

/// Make the login registration match `enabled`.
pub fn sync_autostart(enabled: bool) -> Result<()> {
    let exe = std::env::current_exe().context("Could not determine lumawall executable path")?;

    #[cfg(unix)]
    let changed = {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        sync_desktop_entry(&config_dir.join("autostart"), &exe, enabled)?
    };

    #[cfg(windows)]
    let changed = sync_run_key(&exe, enabled)?;

    #[cfg(not(any(unix, windows)))]
    let changed = {
        let _ = &exe;
        false
    };

    if changed {
        Log::log_decorated(if enabled {
            "Registered lumawall to start on login"
        } else {
            "Removed lumawall from login startup"
        });
    }
    Ok(())
}

/// Contents of the XDG autostart entry launching `exe`.
pub fn desktop_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=lumawall\n\
         Comment={}\n\
         Exec=\"{}\"\n\
         Terminal=false\n\
         X-GNOME-Autostart-enabled=true\n",
        env!("CARGO_PKG_DESCRIPTION"),
        exe.display()
    )
}

/// Create or remove `<autostart_dir>/lumawall.desktop`.
///
/// Returns whether anything on disk changed.
#[cfg(unix)]
pub fn sync_desktop_entry(autostart_dir: &Path, exe: &Path, enabled: bool) -> Result<bool> {
    let entry_path = autostart_dir.join(format!("{}.desktop", AUTOSTART_ENTRY_NAME));

    if enabled {
        let content = desktop_entry(exe);
        if fs::read_to_string(&entry_path).is_ok_and(|existing| existing == content) {
            return Ok(false);
        }
        fs::create_dir_all(autostart_dir).with_context(|| {
            format!("Failed to create autostart directory {}", autostart_dir.display())
        })?;
        fs::write(&entry_path, content)
            .with_context(|| format!("Failed to write {}", entry_path.display()))?;
        Ok(true)
    } else if entry_path.exists() {
        fs::remove_file(&entry_path)
            .with_context(|| format!("Failed to remove {}", entry_path.display()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Set or delete the `HKCU\...\Run` value for lumawall.
#[cfg(windows)]
fn sync_run_key(exe: &Path, enabled: bool) -> Result<bool> {
    use winreg::RegKey;
    use winreg::enums::{HKEY_CURRENT_USER, KEY_READ, KEY_SET_VALUE};

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let run = hkcu
        .open_subkey_with_flags(
            r"Software\Microsoft\Windows\CurrentVersion\Run",
            KEY_READ | KEY_SET_VALUE,
        )
        .context("Failed to open the Run registry key")?;

    let command = format!("\"{}\"", exe.display());
    let existing: Option<String> = run.get_value(AUTOSTART_ENTRY_NAME).ok();

    match (enabled, existing) {
        (true, Some(current)) if current == command => Ok(false),
        (true, _) => {
            run.set_value(AUTOSTART_ENTRY_NAME, &command)
                .context("Failed to register lumawall in the Run registry key")?;
            Ok(true)
        }
        (false, Some(_)) => {
            run.delete_value(AUTOSTART_ENTRY_NAME)
                .context("Failed to remove lumawall from the Run registry key")?;
            Ok(true)
        }
        (false, None) => Ok(false),
    }
}
