//! App-wide error slot shown to the user.
//!
//! Holds only the most recent failure: a new one overwrites, nothing queues.
//! Services route every backend failure here instead of returning it.

use std::cell::RefCell;
use std::fmt::Display;

#[derive(Debug, Default)]
pub struct ErrorChannel {
    current: RefCell<Option<String>>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface `err`. Failures without a message leave the slot untouched.
    pub fn handle<E: Display>(&self, err: E) {
        let message = err.to_string();
        if message.is_empty() {
            return;
        }
        log::warn!("{message}");
        *self.current.borrow_mut() = Some(message);
    }

    pub fn clear(&self) {
        self.current.borrow_mut().take();
    }

    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.current.borrow().is_none()
    }
}
