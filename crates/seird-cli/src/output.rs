//! Output modes and rendering helpers shared by every command.
//!
//! Reports go to stdout in one of three shapes: framed sections for a person
//! at a terminal, `key=value` lines for scripts, or pretty-printed JSON.
//! Errors go to stderr in the same mode.
//!
//! The mode comes from `--format` (or the hidden `--json`), then the `FORMAT`
//! environment variable, then whether stdout is a terminal.

use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use seird_core::ConfigError;
use serde::Serialize;

const RULE_WIDTH: usize = 72;
const KEY_WIDTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Framed sections and aligned tables.
    Pretty,
    /// One `key=value` record per line.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputMode {
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Pick a mode from the explicit flag, the `FORMAT` value and whether
    /// stdout is a terminal. Unrecognised `FORMAT` values are ignored.
    fn pick(flag: Option<Self>, json_alias: bool, env: Option<&str>, tty: bool) -> Self {
        if let Some(mode) = flag {
            return mode;
        }
        if json_alias {
            return Self::Json;
        }
        let from_env = env.and_then(|value| <Self as ValueEnum>::from_str(value.trim(), true).ok());
        from_env.unwrap_or(if tty { Self::Pretty } else { Self::Text })
    }
}

/// Resolve the mode for this process.
#[must_use]
pub fn resolve_output_mode(flag: Option<OutputMode>, json_alias: bool) -> OutputMode {
    let env = std::env::var("FORMAT").ok();
    OutputMode::pick(flag, json_alias, env.as_deref(), io::stdout().is_terminal())
}

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

/// Heading line underlined with a rule.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// `Key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let label = format!("{key}:");
    writeln!(w, "{label:<KEY_WIDTH$} {}", value.as_ref())
}

/// Write `value` to stdout: serialized in JSON mode, otherwise through the
/// renderer for the mode.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(value, &mut out)?,
        OutputMode::Pretty => pretty(value, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

/// An error as shown to the user.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `ConfigError` code such as `E2001`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    fn write_plain(&self, w: &mut dyn Write) -> io::Result<()> {
        let tag = self
            .error_code
            .as_ref()
            .map_or_else(|| "error".to_string(), |code| format!("error[{code}]"));
        writeln!(w, "{tag}: {}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            writeln!(w, "  suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl From<&ConfigError> for CliError {
    fn from(err: &ConfigError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.hint().map(str::to_string),
            error_code: Some(err.code().to_string()),
        }
    }
}

/// Write `error` to stderr. JSON mode wraps it as `{"error": {...}}`.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut out, &serde_json::json!({ "error": error }))?;
        writeln!(out)?;
    } else {
        error.write_plain(&mut out)?;
    }
    Ok(())
}
