//! Process environment serialization for tests
//!
//! Guards that mutate HOME must not overlap while the test harness runs
//! tests on parallel threads. Each guard holds this process-wide lock for
//! its lifetime so environment-dependent assertions stay consistent.

use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Take the process-wide environment lock.
///
/// A panic while a guard is alive poisons the lock; the poison is cleared
/// here so one failing test does not cascade into the rest.
pub fn lock_env() -> MutexGuard<'static, ()> {
  ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
