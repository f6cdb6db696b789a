//! Local bookkeeping for the propose/respond handshake.
//!
//! Restart, undo and re-scoring need the opponent's consent: one side sends
//! `request/{action}`, the other answers with `respond/{action}` carrying
//! `accepted`. The server decides whether a proposal is actually pending;
//! this tracker only mirrors what this client has sent or been told about so
//! a UI can show the right affordance. It never blocks a send.

use baduk_protocol::Negotiable;

/// Where a negotiable action stands from this participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProposalState {
    #[default]
    Idle,
    /// We proposed and are waiting for the opponent.
    Sent,
    /// The opponent proposed and is waiting for us.
    Received,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Negotiator {
    start: ProposalState,
    undo: ProposalState,
    score: ProposalState,
}

impl Negotiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, kind: Negotiable) -> ProposalState {
        *self.slot(kind)
    }

    /// Record that our request went out. Returns the previous state.
    pub fn request_sent(&mut self, kind: Negotiable) -> ProposalState {
        let previous = std::mem::replace(self.slot_mut(kind), ProposalState::Sent);
        if previous == ProposalState::Sent {
            tracing::debug!(
                "Repeated {} request while one is outstanding; the server decides",
                kind.as_str()
            );
        }
        previous
    }

    /// Record an opponent proposal seen in a broadcast.
    pub fn proposal_received(&mut self, kind: Negotiable) {
        *self.slot_mut(kind) = ProposalState::Received;
    }

    /// Our answer went out, or the server resolved the proposal.
    pub fn resolved(&mut self, kind: Negotiable) {
        *self.slot_mut(kind) = ProposalState::Idle;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Kinds with something outstanding.
    pub fn pending(&self) -> Vec<(Negotiable, ProposalState)> {
        Negotiable::ALL
            .into_iter()
            .map(|kind| (kind, self.state(kind)))
            .filter(|(_, state)| *state != ProposalState::Idle)
            .collect()
    }

    fn slot(&self, kind: Negotiable) -> &ProposalState {
        match kind {
            Negotiable::Start => &self.start,
            Negotiable::Undo => &self.undo,
            Negotiable::Score => &self.score,
        }
    }

    fn slot_mut(&mut self, kind: Negotiable) -> &mut ProposalState {
        match kind {
            Negotiable::Start => &mut self.start,
            Negotiable::Undo => &mut self.undo,
            Negotiable::Score => &mut self.score,
        }
    }
}
