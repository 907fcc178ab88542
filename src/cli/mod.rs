//! Terminal front end
//!
//! `Console` owns colored output and prompts; `run_console` drives the
//! submit / approve loop over a shared `Gatekeeper`.

mod console;
mod repl;

pub use console::{ApprovalChoice, Console};
pub use repl::{run_console, ConsoleCommand};
