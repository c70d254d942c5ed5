//! Match Session Manager
//!
//! Every live match sits behind its own [`MatchSession`] mutex, so deliveries
//! against one match never interleave while different matches run in
//! parallel. Sessions are held in a [`MatchRegistry`] that callers create and
//! pass around; there is no process-wide instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::debug;

use crate::engine::runner::{MatchRunner, OverReport};
use crate::engine::state_machine::ApplyOutcome;
use crate::error::{MatchError, Result, SimulationError};
use crate::models::{Ball, Match, MatchId, MatchSettings};

/// One match and the lock that serializes work on it.
#[derive(Debug)]
pub struct MatchSession {
    id: MatchId,
    inner: Mutex<Match>,
}

impl MatchSession {
    pub fn new(m: Match) -> Self {
        Self { id: m.id, inner: Mutex::new(m) }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, Match> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` with exclusive access to the match.
    pub fn with_match<T>(&self, f: impl FnOnce(&mut Match) -> T) -> T {
        f(&mut self.lock())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Match {
        self.lock().clone()
    }

    pub fn apply_ball(&self, ball: Ball) -> Result<ApplyOutcome> {
        self.lock().apply_ball(ball)
    }

    pub fn play_over(&self, runner: &MatchRunner) -> std::result::Result<OverReport, SimulationError> {
        runner.play_over(&mut self.lock())
    }

    pub fn play_match(
        &self,
        runner: &MatchRunner,
    ) -> std::result::Result<Vec<OverReport>, SimulationError> {
        runner.play_match(&mut self.lock())
    }
}

/// Live matches by id.
#[derive(Debug, Default)]
pub struct MatchRegistry {
    sessions: RwLock<HashMap<MatchId, Arc<MatchSession>>>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a match from `settings` and registers it.
    pub fn create(&self, settings: MatchSettings) -> Result<Arc<MatchSession>> {
        Ok(self.insert(Match::new(settings)?))
    }

    /// Registers `m`, replacing any session with the same id.
    pub fn insert(&self, m: Match) -> Arc<MatchSession> {
        let session = Arc::new(MatchSession::new(m));
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.insert(session.id(), session.clone());
        debug!(match_id = %session.id(), live = sessions.len(), "session registered");
        session
    }

    pub fn get(&self, id: MatchId) -> Option<Arc<MatchSession>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).get(&id).cloned()
    }

    pub fn require(&self, id: MatchId) -> Result<Arc<MatchSession>> {
        self.get(id).ok_or(MatchError::UnknownMatch(id))
    }

    pub fn remove(&self, id: MatchId) -> Option<Arc<MatchSession>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner()).remove(&id)
    }

    pub fn ids(&self) -> Vec<MatchId> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
