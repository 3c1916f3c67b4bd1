// file: src/utils/logging.rs
// description: Tracing subscriber construction with optional ANSI coloring

use colored::*;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the subscriber for the current thread; logging stops when the guard drops.
pub fn init_logger(colored_output: bool, verbose: bool) -> DefaultGuard {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::new(level);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .set_default()
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_helpers_keep_message() {
        colored::control::set_override(false);
        assert_eq!(format_success("done"), "✓ done");
        assert_eq!(format_error("boom"), "✗ boom");
        assert_eq!(format_info("sha256: ab"), "ℹ sha256: ab");
    }

    #[test]
    fn test_guard_scopes_subscriber() {
        let guard = init_logger(false, true);
        tracing::debug!("visible while the guard is alive");
        drop(guard);
    }
}
