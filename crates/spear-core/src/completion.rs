//! One-shot completion slot.

use std::fmt;

use spear_contracts::status::MissionStatus;

use crate::traits::CompletionCallback;

/// Holds a state's completion callback until it fires.
///
/// Firing moves the callback out of the slot, so a state cannot report twice
/// no matter how many terminal events reach it.
#[derive(Default)]
pub struct Completion {
    callback: Option<CompletionCallback>,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `callback`, replacing any unfired one.
    pub fn arm(&mut self, callback: CompletionCallback) {
        self.callback = Some(callback);
    }

    /// True while a callback is registered and has not fired.
    pub fn is_armed(&self) -> bool {
        self.callback.is_some()
    }

    /// Invoke the callback with `status`.
    ///
    /// Returns `false` (and does nothing) if the slot is empty.
    pub fn fire(&mut self, status: MissionStatus) -> bool {
        match self.callback.take() {
            Some(callback) => {
                callback(status);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("armed", &self.is_armed())
            .finish()
    }
}
