use std::time::Duration;

use console::{style, Term};
use deep_research::models::interaction::{InteractionHandle, InteractionStatus};
use deep_research::poller::Progress;

/// Prints the interaction id, then one dot per pending poll.
pub struct ConsoleProgress {
    term: Term,
    line_open: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::with_term(Term::stdout())
    }

    pub fn with_term(term: Term) -> Self {
        Self {
            term,
            line_open: false,
        }
    }

    /// Ends the dot line so later output starts on a fresh one.
    pub fn finish(&mut self) {
        if self.line_open {
            self.emit("\n");
            self.line_open = false;
        }
    }

    /// Progress output is observational; a failed write never stops a run.
    fn emit(&self, text: &str) {
        if let Err(err) = self.term.write_str(text).and_then(|()| self.term.flush()) {
            tracing::debug!("Failed to write progress: {}", err);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ConsoleProgress {
    fn submitted(&mut self, handle: &InteractionHandle) {
        self.emit(&format!(
            "Interaction ID: {}\nPolling for results",
            style(handle).cyan()
        ));
        self.line_open = true;
    }

    fn waiting(&mut self, _status: &InteractionStatus, _elapsed: Duration) {
        self.emit(".");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_closes_the_dot_line_once() {
        let mut progress = ConsoleProgress::with_term(Term::buffered_stdout());
        assert!(!progress.line_open);

        progress.submitted(&InteractionHandle::new("interactions/abc123"));
        progress.waiting(
            &InteractionStatus::from_label("in_progress"),
            Duration::from_secs(10),
        );
        assert!(progress.line_open);

        progress.finish();
        assert!(!progress.line_open);
        progress.finish();
        assert!(!progress.line_open);
    }
}
