//! Interactive read-eval loop over a `Gatekeeper`

use std::io;

use super::console::{ApprovalChoice, Console};
use crate::approval::ResolutionOutcome;
use crate::service::Gatekeeper;

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Exit,
    Help,
    Pending,
    Approve(String),
    Reject(String),
    /// `approve` or `reject` without an id
    MissingId(&'static str),
    /// Anything else is handed to the classifier
    Query(String),
    Empty,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ConsoleCommand::Empty;
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_lowercase();
        let rest: Vec<&str> = words.collect();

        match (head.as_str(), rest.as_slice()) {
            ("exit" | "quit", []) => ConsoleCommand::Exit,
            ("help" | "?", []) => ConsoleCommand::Help,
            ("pending", []) => ConsoleCommand::Pending,
            ("approve", []) => ConsoleCommand::MissingId("approve"),
            ("reject", []) => ConsoleCommand::MissingId("reject"),
            ("approve", [id]) => ConsoleCommand::Approve(id.to_string()),
            ("reject", [id]) => ConsoleCommand::Reject(id.to_string()),
            _ => ConsoleCommand::Query(line.to_string()),
        }
    }
}

/// Run the console until `exit` or end of input
pub fn run_console(gatekeeper: &Gatekeeper, console: &Console, actor: &str) -> io::Result<()> {
    console.print_banner();
    tracing::info!(actor, "Console session started");

    while let Some(line) = console.read_input()? {
        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Empty => continue,
            ConsoleCommand::Exit => break,
            ConsoleCommand::Help => console.print_help(),
            ConsoleCommand::Pending => console.print_pending(&gatekeeper.list_pending()),
            ConsoleCommand::Approve(id) => resolve(gatekeeper, console, &id, true),
            ConsoleCommand::Reject(id) => resolve(gatekeeper, console, &id, false),
            ConsoleCommand::MissingId(verb) => {
                console.print_error(&format!("usage: {} <request id>", verb));
            }
            ConsoleCommand::Query(command) => handle_query(gatekeeper, console, &command, actor)?,
        }
        console.print_separator();
    }

    tracing::info!(actor, pending = gatekeeper.pending_count(), "Console session ended");
    console.print_system("Goodbye!");
    Ok(())
}

fn handle_query(gatekeeper: &Gatekeeper, console: &Console, command: &str, actor: &str) -> io::Result<()> {
    let outcome = match gatekeeper.handle_command(command, actor) {
        Ok(outcome) => outcome,
        Err(err) => {
            console.print_error(&err.to_string());
            return Ok(());
        }
    };

    if !outcome.requires_approval {
        match &outcome.results {
            Some(results) => {
                console.print_bot(&format!("{} ({} found)", outcome.summary, results.len()));
                console.print_results(results);
            }
            None => console.print_bot(&outcome.response_text),
        }
        return Ok(());
    }

    let Some(id) = outcome.approval_id.clone() else {
        return Ok(());
    };
    match console.ask_approval(&outcome)? {
        ApprovalChoice::Approve => resolve(gatekeeper, console, &id, true),
        ApprovalChoice::Reject => resolve(gatekeeper, console, &id, false),
        ApprovalChoice::Later => {
            console.print_system(&format!("Request {} left pending. Use 'approve {}' later.", id, id));
        }
    }
    Ok(())
}

fn resolve(gatekeeper: &Gatekeeper, console: &Console, id: &str, approved: bool) {
    let outcome = ResolutionOutcome::from_result(id, gatekeeper.resolve(id, approved));
    console.print_resolution(&outcome);
}
