//! Command line arguments
//!
//! Everything set here overrides the corresponding configuration file value.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "modlife")]
#[command(about = "Replay module events through the component lifecycle tracker")]
#[command(version = crate::core::version::long_version())]
pub struct Args {
    /// Host configuration file (defaults to <config dir>/modlife/modlife.toml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Process type used to filter component types
    #[arg(short = 'p', long = "process-type", value_name = "TYPE")]
    pub process_type: Option<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue, conflicts_with = "color")]
    pub no_color: bool,

    /// Leave modules loaded instead of replaying their removal
    #[arg(short = 'k', long = "keep-loaded", action = ArgAction::SetTrue)]
    pub keep_loaded: bool,
}

impl Args {
    /// Log file to write to, treating `none` as no file
    pub fn log_file(&self) -> Option<&str> {
        self.log_file
            .as_deref()
            .and_then(|path| path.to_str())
            .filter(|path| !path.eq_ignore_ascii_case("none"))
    }

    /// Colour decision: `--no-color` wins, then `--color`, then terminal detection
    pub fn use_color(&self, is_terminal: bool) -> bool {
        !self.no_color && (self.color || is_terminal)
    }
}
