//! Session manager: one engine per session with journal-after-apply semantics.
//!
//! Concurrency: `SharedSession` wraps a session in a Mutex. That lock is the
//! host's serialization point; the kernel itself takes no locks.
//!
//! Apply-before-journal order:
//!   1. engine.execute(caller, call)  (rejected calls stop here, unjournaled)
//!   2. journal.append(envelope)      (only if step 1 succeeded)
//!   3. snapshot if interval reached

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, info};

use vesting_ledger::calls::{Call, CallEnvelope};
use vesting_ledger::clock::{Clock, ManualClock};
use vesting_ledger::config::{ConfigError, TokenConfig};
use vesting_ledger::domain::{Day, LedgerState};
use vesting_ledger::hashing::canonical_hash;
use vesting_ledger::{LedgerError, TokenEngine};

use crate::journal::{CallJournal, JournalError};
use crate::replay::{self, ReplayError};
use crate::snapshot::{self, Snapshot, SnapshotError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("call rejected: {0}")]
    Rejected(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

/// An isolated ledger session with its own clock, journal and snapshots.
pub struct Session {
    session_id: String,
    config: TokenConfig,
    engine: TokenEngine,
    clock: ManualClock,
    journal: CallJournal,
    snapshots: Vec<Snapshot>,
    snapshot_interval: u64,
}

impl Session {
    /// `snapshot_interval == 0` disables automatic snapshots.
    pub fn new(
        session_id: &str,
        config: TokenConfig,
        start_day: Day,
        snapshot_interval: u64,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let clock = ManualClock::new(start_day);
        let engine = TokenEngine::new(&config, clock.clone());
        info!(session = session_id, start_day, "session opened");
        Ok(Self {
            session_id: session_id.to_string(),
            config,
            engine,
            clock,
            journal: CallJournal::new(),
            snapshots: Vec::new(),
            snapshot_interval,
        })
    }

    /// Reopens a session from an exported journal by full replay.
    pub fn from_journal(
        session_id: &str,
        config: TokenConfig,
        journal: CallJournal,
        snapshot_interval: u64,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let (engine, clock) = replay::rebuild_engine(&config, journal.entries())?;
        Ok(Self {
            session_id: session_id.to_string(),
            config,
            engine,
            clock,
            journal,
            snapshots: Vec::new(),
            snapshot_interval,
        })
    }

    /// Execute one call at the session's current day. Returns the journal
    /// sequence assigned to the accepted call.
    pub fn submit(&mut self, caller: &str, call: Call) -> Result<u64, SessionError> {
        // Step 1: kernel (state untouched on error)
        self.engine.execute(caller, &call)?;

        // Step 2: journal
        let envelope = CallEnvelope {
            sequence: self.journal.next_sequence(),
            caller: caller.to_string(),
            day: self.clock.today(),
            call,
        };
        let sequence = envelope.sequence;
        debug!(session = %self.session_id, sequence, op = envelope.call.name(), "call journaled");
        self.journal.append(envelope)?;

        // Step 3: auto-snapshot at interval
        if self.snapshot_interval > 0 && sequence % self.snapshot_interval == 0 {
            self.snapshot_now()?;
        }
        Ok(sequence)
    }

    pub fn snapshot_now(&mut self) -> Result<&Snapshot, SessionError> {
        let snap = snapshot::take_snapshot(
            self.journal.last_sequence(),
            self.clock.today(),
            self.engine.state(),
        )?;
        info!(session = %self.session_id, sequence = snap.sequence, hash = %snap.hash, "snapshot taken");
        self.snapshots.push(snap);
        Ok(&self.snapshots[self.snapshots.len() - 1])
    }

    /// Moves the session clock forward. Earlier days are ignored.
    pub fn advance_to_day(&self, day: Day) {
        self.clock.advance_to(day);
    }

    pub fn today(&self) -> Day {
        self.clock.today()
    }

    /// Full replay from the journal; the rebuilt engine replaces the live one.
    pub fn replay_full(&mut self) -> Result<String, SessionError> {
        let (engine, clock) = replay::rebuild_engine(&self.config, self.journal.entries())?;
        clock.advance_to(self.clock.today());
        self.engine = engine;
        self.clock = clock;
        Ok(self.current_hash())
    }

    /// Restore the latest snapshot and replay the journal tail after it.
    /// Falls back to a full replay when no snapshot exists.
    pub fn recover_from_snapshot(&mut self) -> Result<String, SessionError> {
        let snap = match self.snapshots.last() {
            Some(s) => s.clone(),
            None => return self.replay_full(),
        };
        let state = snapshot::restore_snapshot(&snap)?;
        let clock = ManualClock::new(snap.day);
        let mut engine = TokenEngine::from_state(state, clock.clone());
        replay::replay_onto(&mut engine, &clock, self.journal.since(snap.sequence))?;
        clock.advance_to(self.clock.today());
        self.engine = engine;
        self.clock = clock;
        Ok(self.current_hash())
    }

    /// Read-only access for queries.
    pub fn engine(&self) -> &TokenEngine {
        &self.engine
    }

    pub fn state(&self) -> &LedgerState {
        self.engine.state()
    }

    pub fn journal(&self) -> &CallJournal {
        &self.journal
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(self.engine.state())
    }

    pub fn current_sequence(&self) -> u64 {
        self.journal.last_sequence()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }
}

/// Thread-safe session handle.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// Poisoning is ignored: engine commits are all-or-nothing.
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn submit(&self, caller: &str, call: Call) -> Result<u64, SessionError> {
        self.lock().submit(caller, call)
    }

    /// Run a read-only query against the engine under the lock.
    pub fn query<T>(&self, f: impl FnOnce(&TokenEngine) -> T) -> T {
        f(self.lock().engine())
    }

    pub fn advance_to_day(&self, day: Day) {
        self.lock().advance_to_day(day)
    }

    pub fn current_hash(&self) -> String {
        self.lock().current_hash()
    }

    pub fn current_sequence(&self) -> u64 {
        self.lock().current_sequence()
    }

    pub fn export_journal(&self) -> Result<String, SessionError> {
        Ok(self.lock().journal().to_jsonl_string()?)
    }

    pub fn into_inner(self) -> Session {
        self.inner.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
