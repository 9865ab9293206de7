//! External command backend.
//!
//! Runs a user-configured command for every wallpaper change. The template is
//! split on whitespace and each argument may contain the placeholders
//! `{path}` (the image path) and `{style}` (the wallpaper style name):
//!
//! ```toml
//! wallpaper_command = "swww img {path}"
//! wallpaper_command = "feh --bg-{style} {path}"
//! ```
//!
//! Arguments are passed to the program directly, so paths containing spaces
//! stay intact without any shell quoting.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

use super::{WallpaperBackend, WallpaperStyle};
use crate::logger::Log;

const PATH_PLACEHOLDER: &str = "{path}";
const STYLE_PLACEHOLDER: &str = "{style}";

pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    /// Parse a command template.
    ///
    /// The template must name a program and mention `{path}` somewhere,
    /// otherwise the command could never receive the image.
    pub fn new(template: &str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .context("wallpaper_command is empty")?;
        let args: Vec<String> = parts.collect();

        if !program.contains(PATH_PLACEHOLDER) && !args.iter().any(|a| a.contains(PATH_PLACEHOLDER)) {
            anyhow::bail!(
                "wallpaper_command must contain the {} placeholder (got \"{}\")",
                PATH_PLACEHOLDER,
                template
            );
        }

        Ok(Self { program, args })
    }

    /// Expand the placeholders for one invocation.
    pub fn render(&self, image: &Path, style: WallpaperStyle) -> (String, Vec<String>) {
        let path = image.to_string_lossy();
        let expand = |part: &String| {
            part.replace(PATH_PLACEHOLDER, &path)
                .replace(STYLE_PLACEHOLDER, style.as_str())
        };
        (expand(&self.program), self.args.iter().map(expand).collect())
    }
}

impl WallpaperBackend for CommandBackend {
    fn set_wallpaper(&mut self, image: &Path, style: WallpaperStyle) -> Result<()> {
        let (program, args) = self.render(image, style);
        Log::log_debug(&format!("Running: {} {}", program, args.join(" ")));

        let output = Command::new(&program)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to run wallpaper command '{}'", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "Wallpaper command '{}' exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            );
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Command"
    }
}
