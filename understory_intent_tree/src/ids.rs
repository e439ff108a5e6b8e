// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Request-scoped identifier generation.

use hashbrown::HashSet;

/// Counter handing out `prefix0`, `prefix1`, ...
///
/// Each request owns its own generator, so the ids a run produces depend only on its input.
#[derive(Clone, Debug, Default)]
pub struct IdGen {
    prefix: String,
    next: u64,
}

impl IdGen {
    /// A generator whose ids start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// The prefix shared by every generated id.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The next id.
    pub fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    /// The next id not present in `taken`.
    pub fn next_unused(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let id = self.next_id();
            if !taken.contains(&id) {
                return id;
            }
        }
    }
}
