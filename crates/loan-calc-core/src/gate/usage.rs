use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::gate::store::KeyValueStore;
use crate::{LoanCalcError, LoanCalcResult};

/// Free entries before the gate locks.
pub const FREE_USAGE_LIMIT: u32 = 3;
pub const DEFAULT_COUNT_KEY: &str = "dg_calc_usage_count";
pub const DEFAULT_UNLOCKED_KEY: &str = "dg_calc_unlocked";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub free_limit: u32,
    pub count_key: String,
    pub unlocked_key: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            free_limit: FREE_USAGE_LIMIT,
            count_key: DEFAULT_COUNT_KEY.to_string(),
            unlocked_key: DEFAULT_UNLOCKED_KEY.to_string(),
        }
    }
}

/// Outcome of a single gated entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Allowed,
    Locked,
}

/// Where the gate currently sits. `Unlocked` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Open,
    Locked,
    Unlocked,
}

/// One logical entry into a gated view (one mount, not one render).
///
/// Presenting the same token again never records a second attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryToken(u64);

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

impl EntryToken {
    pub fn new() -> Self {
        EntryToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for EntryToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct Session {
    /// Decision recorded for each token seen by this gate.
    entries: HashMap<EntryToken, GateDecision>,
    /// Unlock observed or performed during this process.
    unlocked: bool,
    /// Last count successfully read back from storage.
    last_known_count: i64,
    /// In-process count used once storage has failed.
    fallback_count: Option<i64>,
}

/// Usage quota in front of the calculators, unlocked for good by a lead.
pub struct UsageGate<S: KeyValueStore> {
    store: S,
    config: GateConfig,
    session: Mutex<Session>,
}

impl<S: KeyValueStore> UsageGate<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, GateConfig::default())
    }

    pub fn with_config(store: S, config: GateConfig) -> Self {
        Self {
            store,
            config,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a fresh entry and decide whether it may render.
    ///
    /// Nothing is kept per call; use [`UsageGate::check_entry`] when the same
    /// entry may be presented more than once.
    pub fn check_and_record_entry(&self) -> GateDecision {
        let mut session = self.session();
        if self.is_unlocked(&mut session) {
            return GateDecision::Allowed;
        }
        self.record(&mut session)
    }

    /// Record the entry identified by `token`, at most once.
    ///
    /// Repeated calls with the same token return the recorded decision, or
    /// `Allowed` if the gate has been unlocked since. Tokens are held until
    /// [`UsageGate::finish_entry`] or the unlock.
    pub fn check_entry(&self, token: EntryToken) -> GateDecision {
        let mut session = self.session();

        if self.is_unlocked(&mut session) {
            return GateDecision::Allowed;
        }
        if let Some(decision) = session.entries.get(&token) {
            return *decision;
        }

        let decision = self.record(&mut session);
        tracing::debug!(token = token.id(), ?decision, "gated entry recorded");
        session.entries.insert(token, decision);
        decision
    }

    /// Forget a token once its view is gone.
    pub fn finish_entry(&self, token: EntryToken) {
        self.session().entries.remove(&token);
    }

    /// Permanently lift the quota. Idempotent; the attempt count is kept.
    ///
    /// The current process is unlocked even if persisting the flag fails;
    /// the storage error is still returned.
    pub fn unlock(&self) -> LoanCalcResult<()> {
        let mut session = self.session();
        session.unlocked = true;
        session.entries.clear();
        self.store
            .set_bool(&self.config.unlocked_key, true)
            .map_err(|e| {
                tracing::warn!(error = %e, "unlock applied to this session only");
                LoanCalcError::from(e)
            })?;
        tracing::info!("usage gate unlocked");
        Ok(())
    }

    /// Persisted number of recorded entries.
    pub fn attempt_count(&self) -> LoanCalcResult<i64> {
        Ok(self
            .store
            .get_int(&self.config.count_key)?
            .unwrap_or(0))
    }

    /// Current state, without recording an entry.
    pub fn state(&self) -> GateState {
        let mut session = self.session();
        if self.is_unlocked(&mut session) {
            return GateState::Unlocked;
        }

        let count = match self.store.get_int(&self.config.count_key) {
            Ok(count) => count.unwrap_or(0),
            Err(_) => session.fallback_count.unwrap_or(session.last_known_count),
        };
        match self.decide(count) {
            GateDecision::Allowed => GateState::Open,
            GateDecision::Locked => GateState::Locked,
        }
    }

    fn record(&self, session: &mut Session) -> GateDecision {
        match self.store.increment_int(&self.config.count_key) {
            Ok(count) => {
                session.last_known_count = count;
                if let Some(fallback) = session.fallback_count.as_mut() {
                    *fallback = (*fallback).max(count);
                }
                self.decide(count)
            }
            Err(e) => match session.fallback_count {
                None => {
                    tracing::warn!(
                        error = %e,
                        key = %self.config.count_key,
                        "usage counter unavailable; allowing entry"
                    );
                    session.fallback_count = Some(session.last_known_count + 1);
                    GateDecision::Allowed
                }
                Some(count) => {
                    tracing::warn!(error = %e, "usage counter still unavailable; counting in memory");
                    session.fallback_count = Some(count + 1);
                    self.decide(count + 1)
                }
            },
        }
    }

    fn decide(&self, count: i64) -> GateDecision {
        if count > i64::from(self.config.free_limit) {
            GateDecision::Locked
        } else {
            GateDecision::Allowed
        }
    }

    fn is_unlocked(&self, session: &mut Session) -> bool {
        if session.unlocked {
            return true;
        }
        match self.store.get_bool(&self.config.unlocked_key) {
            Ok(Some(true)) => {
                session.unlocked = true;
                session.entries.clear();
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(error = %e, "unlock flag unreadable; applying quota");
                false
            }
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
