//! REPL command parsing.

use aparat_core::session::DetailModule;
use std::path::PathBuf;

/// Slash commands offered for completion and hints.
pub const COMMANDS: &[&str] = &[
    "/start", "/upload", "/detail", "/close", "/back", "/reset", "/export", "/status",
    "/modules", "/help",
];

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Start,
    Upload(PathBuf),
    Detail(DetailModule),
    Close,
    Back,
    Reset,
    Export,
    Status,
    Modules,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parses a trimmed, non-empty input line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head {
            "quit" | "exit" | "/quit" | "/exit" => Ok(ReplCommand::Quit),
            "/start" | "/hub" => Ok(ReplCommand::Start),
            "/upload" => {
                if rest.is_empty() {
                    Err("Usage: /upload <path>".to_string())
                } else {
                    Ok(ReplCommand::Upload(PathBuf::from(unquote(rest))))
                }
            }
            "/detail" => {
                if rest.is_empty() {
                    return Err("Usage: /detail <module> (see /modules)".to_string());
                }
                rest.parse::<DetailModule>()
                    .map(ReplCommand::Detail)
                    .map_err(|e| e.to_string())
            }
            "/close" => Ok(ReplCommand::Close),
            "/back" => Ok(ReplCommand::Back),
            "/reset" => Ok(ReplCommand::Reset),
            "/export" => Ok(ReplCommand::Export),
            "/status" => Ok(ReplCommand::Status),
            "/modules" => Ok(ReplCommand::Modules),
            "/help" | "help" => Ok(ReplCommand::Help),
            other => Err(format!("Unknown command: {other} (try /help)")),
        }
    }
}

/// Strips one pair of matching quotes, as left by drag-and-drop into a terminal.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
