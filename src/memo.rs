// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A value that is computed at most once, on demand.
//!
//! [`Memo`] is used for derived state that is expensive to produce (a fitted
//! interpolation model, a pseudo-inverse basis). Readers either get the value
//! or an explicit "not ready" (`None`); they never see a partially-built value.
//! Concurrent first computations are serialised, so the computation runs once
//! even if many threads ask for it at the same time.

use std::sync::{Mutex, OnceLock, PoisonError};

pub struct Memo<T> {
    value: OnceLock<T>,
    init_lock: Mutex<()>,
}

impl<T> Memo<T> {
    pub const fn new() -> Memo<T> {
        Memo {
            value: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Get the value if it has been computed.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    pub fn is_ready(&self) -> bool {
        self.value.get().is_some()
    }

    /// Get the value, computing it with `init` if this is the first successful
    /// call. If `init` fails, nothing is stored and the error is returned; a
    /// later call may try again.
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(v) = self.value.get() {
            return Ok(v);
        }

        // A panicking initialiser leaves nothing behind in `value`, so a
        // poisoned lock is still safe to use.
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(v) = self.value.get() {
            return Ok(v);
        }
        let v = init()?;
        Ok(self.value.get_or_init(|| v))
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Memo::new()
    }
}

/// A clone carries the value over if it has been computed.
impl<T: Clone> Clone for Memo<T> {
    fn clone(&self) -> Self {
        let memo = Memo::new();
        if let Some(v) = self.value.get() {
            let _ = memo.value.set(v.clone());
        }
        memo
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value.get() {
            Some(v) => f.debug_tuple("Memo").field(v).finish(),
            None => f.write_str("Memo(<not ready>)"),
        }
    }
}
