//! Lets the Ctrl-C handler tell whether the user is being asked about a rename.

use std::sync::atomic::{AtomicBool, Ordering};

static AWAITING_ANSWER: AtomicBool = AtomicBool::new(false);

/// Held by a prompt while it blocks on input. Dropping it clears the flag,
/// also when reading fails.
pub(crate) struct AwaitingAnswer;

impl AwaitingAnswer {
    pub(crate) fn start() -> Self {
        AWAITING_ANSWER.store(true, Ordering::SeqCst);
        Self
    }
}

impl Drop for AwaitingAnswer {
    fn drop(&mut self) {
        AWAITING_ANSWER.store(false, Ordering::SeqCst);
    }
}

/// Whether a rename prompt is waiting for input right now.
///
/// Answers are all collected before the first rename, so a run stopped at
/// this point has changed nothing.
pub fn awaiting_answer() -> bool {
    AWAITING_ANSWER.load(Ordering::SeqCst)
}

