//! Route Fixer - force-dynamic marker for Next.js API routes
//!
//! A one-shot CLI tool that scans the API routes directory for route
//! handler files and inserts the force-dynamic directive after any
//! leading comments in each file that does not already declare it.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use route_fixer::{Cli, Config, PatchStatus, Patcher};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Console output styling
    //!
    //! Uniform colors and formatting for command-line output.

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// Width of separator rules and titles
    pub const RULE_WIDTH: usize = 70;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        /// Success color (green)
        pub const SUCCESS: Color = Color::Green;
        /// Warning color (yellow)
        pub const WARNING: Color = Color::Yellow;
        /// Error color (red)
        pub const ERROR: Color = Color::Red;
        /// Hint color (dark grey)
        pub const HINT: Color = Color::DarkGrey;
        /// Accent color (cyan)
        pub const ACCENT: Color = Color::Cyan;
    }

    /// Print a separator rule
    pub fn print_separator() {
        let _ = stdout().execute(Print(&format!("{}\n", "─".repeat(RULE_WIDTH))));
    }

    /// Print a centered title
    pub fn print_title(title: &str) {
        let padding = (RULE_WIDTH - title.len()) / 2;
        let left_pad = " ".repeat(padding.saturating_sub(1));

        let _ = stdout().execute(Print(&format!(
            "{}{} {}{}\n",
            left_pad,
            "╔".bold().stylize(),
            title.bold().stylize(),
            "╗".bold().stylize(),
        )));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print an error message
    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print a hint message
    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print a statistics entry
    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print a per-file result line
    pub fn print_result(status_icon: &str, status_color: Color, path: &str, msg: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let path_styled = style(path).italic();
        let msg_styled = style(msg).with(CliTheme::HINT);

        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(path_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(msg_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print the log file path
    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print("\n"));
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style("Log file: ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    /// Print a blank line
    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    // No arguments beyond --help/--version; parsing still validates the invocation
    let _cli = Cli::parse();

    // Get the executable directory for the Log directory
    let exe_dir = get_executable_dir()?;
    let log_path = get_log_path(&exe_dir);

    // Setup logging
    let _guard = setup_logging(&log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Route Fixer starting");
    info!(log_file = %log_path.display(), "Log file location");

    let config = Config::default();

    // Missing routes directory halts before any file is touched; still exits 0
    if !config.routes_dir.exists() {
        cli_output::print_error(&format!(
            "Routes directory not found: {}",
            config.routes_dir.display()
        ));
        error!(
            routes_dir = %config.routes_dir.display(),
            "Routes directory not found, nothing to do"
        );
        return Ok(());
    }

    let mut patcher = Patcher::new(config);
    let outcomes = patcher.run();

    use cli_output::*;

    print_hint(&format!("Found {} route files", outcomes.len()));
    print_blank();

    for outcome in &outcomes {
        match outcome.status {
            PatchStatus::Fixed => {
                print_result(
                    "✓",
                    CliTheme::SUCCESS,
                    &outcome.path.display().to_string(),
                    "marker inserted",
                );
            }
            PatchStatus::Error => {
                let msg = outcome.error.as_deref().unwrap_or("unknown error");
                print_result(
                    "✗",
                    CliTheme::ERROR,
                    &outcome.path.display().to_string(),
                    msg,
                );
            }
            // Skipped files produce no per-file line
            PatchStatus::Skipped => {}
        }
    }

    // Print summary block
    let stats = patcher.stats();
    print_separator();
    print_title("Route Fix Complete");
    print_separator();
    print_blank();
    print_stat("Fixed", &stats.fixed.to_string(), CliTheme::SUCCESS);
    print_stat("Skipped", &stats.skipped.to_string(), CliTheme::WARNING);
    print_stat("Errors", &stats.errors.to_string(), CliTheme::ERROR);
    print_blank();
    print_separator();
    print_log_path(&log_path.display().to_string());

    info!(log_file = %log_path.display(), "Run complete. Log saved to");

    Ok(())
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path for this run
fn get_log_path(exe_dir: &Path) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("RouteFix_{}.log", timestamp))
}

/// Setup logging (file + console)
fn setup_logging(log_path: &Path) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(Some(guard))
}
