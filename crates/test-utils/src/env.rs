//! Scoped environment variables for configuration tests.
//!
//! The process environment is shared by every test thread, so a guard
//! holds a global lock while its variables are set.

use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Sets variables until dropped, then restores the previous values.
///
/// ```
/// use test_utils::EnvGuard;
///
/// {
///     let _env = EnvGuard::set(&[("TEST_UTILS_DOC_VAR", "1")]);
///     assert_eq!(std::env::var("TEST_UTILS_DOC_VAR").as_deref(), Ok("1"));
/// }
/// assert!(std::env::var("TEST_UTILS_DOC_VAR").is_err());
/// ```
pub struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub fn set(vars: &[(&str, &str)]) -> Self {
        // a panicking test must not poison the others
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved = vars
            .iter()
            .map(|&(key, value)| {
                let old = std::env::var(key).ok();
                std::env::set_var(key, value);
                (key.to_string(), old)
            })
            .collect();
        Self { saved, _lock: lock }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in self.saved.drain(..).rev() {
            match old {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}
