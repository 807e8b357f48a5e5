//! Colored terminal output.

use colored::Colorize;

use aparat_core::error::AparatError;
use aparat_core::generation::GenerationResult;
use aparat_core::session::{DetailModule, Screen, Session};

pub fn banner(gateway: &str, simulated: bool) {
    println!("{}", "=== APARAT // product studio ===".bright_magenta().bold());
    let mode = if simulated {
        format!("gateway: {gateway} (demo mode)").yellow()
    } else {
        format!("gateway: {gateway}").bright_black()
    };
    println!("{mode}");
    println!(
        "{}",
        "Type '/start' to enter the hub, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();
}

pub fn help() {
    let rows = [
        ("/start", "Enter the mission hub"),
        ("/upload <path>", "Render a product photo (uses the credit)"),
        ("/detail <module>", "Open a module overlay"),
        ("/close", "Close the overlay"),
        ("/back", "Leave the result and return to the hub"),
        ("/reset", "Clear the lock and start over"),
        ("/export", "Write the current render to disk"),
        ("/status", "Show the session"),
        ("/modules", "List module overlays"),
        ("quit", "Exit"),
    ];
    for (cmd, text) in rows {
        println!("  {:<18} {}", cmd.bright_cyan(), text);
    }
}

pub fn session(session: &Session) {
    let screen = match session.screen {
        Screen::Landing => "LANDING".bright_white(),
        Screen::Hub => "MISSION HUB".bright_cyan(),
        Screen::Result => "RESULT".bright_green(),
    };
    let credits = if session.has_allowance() {
        format!("{} credit", session.credits).green()
    } else {
        "locked".red()
    };

    println!("{} {}  [{}]", "screen:".bright_black(), screen.bold(), credits);
    if session.is_generating {
        println!("{}", "  rendering in progress...".yellow());
    } else if session.accepts_generation() {
        println!("{}", "  ready: /upload <path>".bright_black());
    }
    if let Some(module) = session.active_detail {
        println!("{} {}", "  overlay:".bright_black(), module.title());
    }
    if let Some(result) = &session.result {
        summary(result);
    }
}

/// The durable lock, which outlives the session.
pub fn lock(locked: bool) {
    let state = if locked { "locked".red() } else { "open".green() };
    println!("{} {}", "  lock:".bright_black(), state);
}

pub fn summary(result: &GenerationResult) {
    let badge = if result.is_simulated {
        format!("{} (simulated)", result.label).yellow()
    } else {
        result.label.bright_green()
    };
    println!(
        "  {} {}  {} {} bytes  {} {} bytes",
        badge.bold(),
        result.generated_image.mime_type().bright_black(),
        "render".bright_black(),
        result.generated_image.decoded_len(),
        "source".bright_black(),
        result.source_image.decoded_len()
    );
}

pub fn modules() {
    for module in DetailModule::ALL {
        println!(
            "  {:<12} {} {}",
            module.id().bright_cyan(),
            module.title().bold(),
            format!("[{}]", module.status()).bright_black()
        );
    }
}

pub fn detail(module: DetailModule) {
    println!("{}", format!("== {} ==", module.title()).bright_magenta().bold());
    println!("{}", module.status().bright_black());
    for line in module.description().lines() {
        println!("{line}");
    }
}

pub fn info(message: &str) {
    println!("{}", message.bright_black());
}

pub fn success(message: &str) {
    println!("{}", message.bright_green());
}

pub fn failure(err: &AparatError) {
    let text = match err {
        AparatError::Exhausted => {
            "System locked: the credit is spent. Use /reset to start over.".to_string()
        }
        AparatError::Busy => "A render is already in progress.".to_string(),
        AparatError::Gateway(_) | AparatError::Timeout { .. } => {
            format!("Signal lost: {err}. Your credit was not used.")
        }
        other => other.to_string(),
    };
    if err.is_rejection() {
        println!("{}", text.yellow());
    } else {
        eprintln!("{}", text.red());
    }
}
