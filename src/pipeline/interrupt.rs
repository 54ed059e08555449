//! Interrupt watcher: line-oriented cancellation input.
//!
//! The only path that sets the stop flag in normal operation. Reads lines
//! from the provided input (stdin in production) and, on an interrupt
//! keyword, flips the stop flag and releases the camera if it is open.

use crate::session::SharedSession;
use std::io::BufRead;

/// Typed commands that end the session, matched case-insensitively.
pub const INTERRUPT_KEYWORDS: [&str; 4] = ["stop", "exit", "quit", "end"];

/// Whether a line of user input requests shutdown.
pub fn is_interrupt(line: &str) -> bool {
    let normalized = line.trim().to_ascii_lowercase();
    INTERRUPT_KEYWORDS.contains(&normalized.as_str())
}

/// Block on line input until an interrupt keyword arrives or the input
/// ends. EOF and read errors also stop the session, so a closed stdin
/// cannot strand the other loops.
pub fn run_interrupt_watcher<R: BufRead>(session: &SharedSession, input: R) {
    for line in input.lines() {
        if session.stop_requested() {
            return;
        }
        let Ok(line) = line else {
            break;
        };
        if is_interrupt(&line) {
            tracing::info!("user interrupted the conversation");
            session.request_stop();
            session.camera().close();
            return;
        }
    }

    if !session.stop_requested() {
        tracing::info!("input closed, ending the conversation");
        session.request_stop();
        session.camera().close();
    }
}
