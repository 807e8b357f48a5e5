//! Interactive studio session on top of rustyline.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use aparat_application::SessionUseCase;
use aparat_core::session::{DetailModule, Screen};
use aparat_infrastructure::FsAssetSource;

use crate::commands::{COMMANDS, ReplCommand};
use crate::context::AppContext;
use crate::display;

/// Completion, highlighting and hints for slash commands and module ids.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
    modules: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
            modules: DetailModule::ALL
                .iter()
                .map(|m| m.id().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if let Some(arg) = line.strip_prefix("/detail ") {
            let start = pos - arg.len();
            let candidates = self
                .modules
                .iter()
                .filter(|m| m.starts_with(&arg.to_ascii_lowercase()))
                .map(|m| Pair {
                    display: m.clone(),
                    replacement: m.clone(),
                })
                .collect();
            return Ok((start, candidates));
        }

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn prompt(screen: Screen) -> &'static str {
    match screen {
        Screen::Landing => "aparat> ",
        Screen::Hub => "hub> ",
        Screen::Result => "result> ",
    }
}

pub async fn run(ctx: &AppContext, uc: Arc<SessionUseCase>) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    display::banner(uc.gateway_name(), uc.is_simulated());
    display::session(&uc.snapshot().await);

    loop {
        let screen = uc.snapshot().await.screen;
        match rl.readline(prompt(screen)) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match ReplCommand::parse(trimmed) {
                    Ok(ReplCommand::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Ok(command) => execute(ctx, &uc, command).await,
                    Err(message) => println!("{}", message.yellow()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

async fn execute(ctx: &AppContext, uc: &SessionUseCase, command: ReplCommand) {
    match command {
        ReplCommand::Start => match uc.start().await {
            Ok(session) => display::session(&session),
            Err(e) => display::failure(&e),
        },
        ReplCommand::Upload(path) => {
            let source = FsAssetSource::new(path);
            display::info(&format!("Rendering {} ...", source.path().display()));
            match uc.submit(&source).await {
                Ok(result) => {
                    display::success("Render complete.");
                    display::summary(&result);
                    display::info("Use /export to save it, /back for the hub.");
                }
                Err(e) => display::failure(&e),
            }
        }
        ReplCommand::Detail(module) => {
            uc.open_detail(module).await;
            display::detail(module);
        }
        ReplCommand::Close => {
            uc.close_detail().await;
            display::info("Overlay closed.");
        }
        ReplCommand::Back => match uc.return_to_hub().await {
            Ok(session) => display::session(&session),
            Err(e) => display::failure(&e),
        },
        ReplCommand::Reset => match uc.reset().await {
            Ok(session) => {
                display::success("System reset. One credit restored.");
                display::session(&session);
            }
            Err(e) => display::failure(&e),
        },
        ReplCommand::Export => match uc.snapshot().await.result {
            Some(result) => match ctx.exporter.export(&result).await {
                Ok(path) => display::success(&format!("Saved {}", path.display())),
                Err(e) => display::failure(&e),
            },
            None => println!("{}", "Nothing to export yet.".yellow()),
        },
        ReplCommand::Status => {
            display::session(&uc.snapshot().await);
            match uc.is_persistently_locked().await {
                Ok(locked) => display::lock(locked),
                Err(e) => display::failure(&e),
            }
        }
        ReplCommand::Modules => display::modules(),
        ReplCommand::Help => display::help(),
        ReplCommand::Quit => {}
    }
}
