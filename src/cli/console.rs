use colored::*;
use std::io::{self, Write};

use crate::approval::{PendingSummary, ResolutionOutcome, SubmitOutcome};
use crate::core::HELP_TEXT;
use crate::store::Entity;

/// Longest response line printed before truncating
const MAX_DISPLAY: usize = 500;

/// Answer to an approval prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalChoice {
    Approve,
    Reject,
    /// Leave the request pending for a later `approve`/`reject`
    Later,
}

impl ApprovalChoice {
    /// Parse a prompt answer; anything unrecognised is `None`
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(ApprovalChoice::Approve),
            "n" | "no" => Some(ApprovalChoice::Reject),
            "l" | "later" | "" => Some(ApprovalChoice::Later),
            _ => None,
        }
    }
}

/// Console handles all terminal I/O with colored formatting
pub struct Console {
    user_color: Color,
    bot_color: Color,
    approval_color: Color,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            user_color: Color::Cyan,
            bot_color: Color::Green,
            approval_color: Color::Yellow,
        }
    }

    pub fn print_bot(&self, message: &str) {
        println!(
            "{} {}",
            "Gatekeeper:".color(self.bot_color).bold(),
            truncate(message).color(self.bot_color)
        );
    }

    /// Print a system message (errors, info, etc.)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Read a line of input; `None` on end of input
    pub fn read_input(&self) -> io::Result<Option<String>> {
        print!("{} ", ">".color(self.user_color).bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }

    pub fn print_banner(&self) {
        println!("{}", "=".repeat(60).bright_blue());
        println!("{}", "  Gatekeeper - approval-gated data assistant".bright_blue().bold());
        println!("{}", "=".repeat(60).bright_blue());
        println!();
        println!("Type a command and press Enter. Type 'help' for examples, 'exit' to quit.");
        println!();
    }

    pub fn print_help(&self) {
        println!("{}", HELP_TEXT);
        println!();
        println!("{}", "Console commands:".bold());
        println!("  pending        list requests awaiting approval");
        println!("  approve <id>   approve a pending request");
        println!("  reject <id>    reject a pending request");
        println!("  help           show this message");
        println!("  exit | quit    leave the console");
    }

    pub fn print_separator(&self) {
        println!("{}", "-".repeat(60).bright_black());
    }

    /// Print the rows returned by a read
    pub fn print_results(&self, results: &[Entity]) {
        if results.is_empty() {
            println!("{}", "  (no matching records)".bright_black());
            return;
        }
        for entity in results {
            let line = entity
                .iter()
                .map(|(key, value)| match value {
                    serde_json::Value::String(s) => format!("{}={}", key, s),
                    other => format!("{}={}", key, other),
                })
                .collect::<Vec<_>>()
                .join("  ");
            println!("  {}", line);
        }
    }

    /// Ask whether to approve a freshly parked request
    pub fn ask_approval(&self, outcome: &SubmitOutcome) -> io::Result<ApprovalChoice> {
        println!();
        println!("{}", "─".repeat(60).color(self.approval_color));
        println!(
            "{} {} on {}",
            "⚠️ Approval Required".color(self.approval_color).bold(),
            outcome.operation.as_str().to_uppercase().bold(),
            outcome.target_collection
        );
        println!();
        println!("  {}", outcome.summary);
        if let Some(id) = &outcome.approval_id {
            println!("  {}", format!("Request ID: {}", id).bright_black());
        }
        println!();
        println!("{}", "Options:".color(self.approval_color));
        println!("  [y] Approve and run now");
        println!("  [n] Reject");
        println!("  [l] Decide later");
        println!("{}", "─".repeat(60).color(self.approval_color));

        loop {
            print!("{} ", "Your choice (y/n/l):".color(self.approval_color).bold());
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                return Ok(ApprovalChoice::Later);
            }
            match ApprovalChoice::parse(&input) {
                Some(choice) => return Ok(choice),
                None => println!("{}", "Please answer y, n or l.".red()),
            }
        }
    }

    pub fn print_resolution(&self, outcome: &ResolutionOutcome) {
        if outcome.status.is_success() {
            let mark = match outcome.entity {
                Some(_) => "✓".green(),
                None => "✗".red(),
            };
            println!("{} {}", mark, truncate(&outcome.message));
        } else {
            self.print_error(&outcome.message);
        }
    }

    pub fn print_pending(&self, pending: &[PendingSummary]) {
        if pending.is_empty() {
            self.print_system("No pending approvals.");
            return;
        }
        println!("{}", format!("{} pending approval(s):", pending.len()).bold());
        for item in pending {
            println!(
                "  {}  {:<6} {:<8} {}  {}",
                item.id.color(self.approval_color),
                item.operation.as_str(),
                item.target_collection.as_str(),
                item.summary,
                format!("by {} at {}", item.created_by, item.created_at.format("%H:%M:%S")).bright_black()
            );
        }
    }
}

fn truncate(message: &str) -> String {
    if message.len() <= MAX_DISPLAY {
        return message.to_string();
    }
    let mut end = MAX_DISPLAY;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_choice_parse() {
        assert_eq!(ApprovalChoice::parse("y"), Some(ApprovalChoice::Approve));
        assert_eq!(ApprovalChoice::parse(" YES\n"), Some(ApprovalChoice::Approve));
        assert_eq!(ApprovalChoice::parse("n"), Some(ApprovalChoice::Reject));
        assert_eq!(ApprovalChoice::parse("later"), Some(ApprovalChoice::Later));
        assert_eq!(ApprovalChoice::parse(""), Some(ApprovalChoice::Later));
        assert_eq!(ApprovalChoice::parse("maybe"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");

        let long = "é".repeat(400);
        let cut = truncate(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= MAX_DISPLAY + 3);
    }
}
