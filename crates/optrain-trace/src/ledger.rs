//! Per-light ray accounting.
//!
//! Every emitted ray ends exactly once as absorbed, blocked or exited, and
//! every interaction that continues a ray spawns one child segment. The
//! ledger counts both independently so a finished trace can be reconciled.

use std::collections::BTreeMap;

use crate::tracer::RayState;

/// Counters for one light source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightTally {
    /// Rays emitted.
    pub emitted: u64,
    /// Rays that ended on an absorbing surface.
    pub absorbed: u64,
    /// Rays that missed a surface or fell outside an aperture.
    pub blocked: u64,
    /// Rays that left the last surface.
    pub exited: u64,
    /// Child segments spawned by interactions.
    pub children: u64,
    /// Segments traced, roots included.
    pub segments: u64,
    /// Refractions that fell back to total internal reflection.
    pub total_internal_reflections: u64,
}

impl LightTally {
    /// Rays that reached a terminal state.
    pub fn terminated(&self) -> u64 {
        self.absorbed + self.blocked + self.exited
    }

    /// Whether the counters are mutually consistent.
    pub fn reconciles(&self) -> bool {
        self.emitted == self.terminated() && self.segments == self.emitted + self.children
    }

    fn merge(&mut self, other: &LightTally) {
        self.emitted += other.emitted;
        self.absorbed += other.absorbed;
        self.blocked += other.blocked;
        self.exited += other.exited;
        self.children += other.children;
        self.segments += other.segments;
        self.total_internal_reflections += other.total_internal_reflections;
    }
}

/// Tallies keyed by light id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RayLedger {
    tallies: BTreeMap<u32, LightTally>,
}

impl RayLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, light_id: u32) -> &mut LightTally {
        self.tallies.entry(light_id).or_default()
    }

    /// Count a newly emitted ray and its first segment.
    pub fn record_emission(&mut self, light_id: u32) {
        let tally = self.entry(light_id);
        tally.emitted += 1;
        tally.segments += 1;
    }

    /// Count a child segment.
    pub fn record_child(&mut self, light_id: u32) {
        let tally = self.entry(light_id);
        tally.children += 1;
        tally.segments += 1;
    }

    /// Count a total-internal-reflection fallback.
    pub fn record_total_internal_reflection(&mut self, light_id: u32) {
        self.entry(light_id).total_internal_reflections += 1;
    }

    /// Count a terminal state. Non-terminal states are ignored.
    pub fn record_terminal(&mut self, light_id: u32, state: RayState) {
        let tally = self.entry(light_id);
        match state {
            RayState::Absorbed => tally.absorbed += 1,
            RayState::Blocked => tally.blocked += 1,
            RayState::Exited => tally.exited += 1,
            _ => {}
        }
    }

    /// Tally for one light, zero if it never emitted.
    pub fn tally(&self, light_id: u32) -> LightTally {
        self.tallies.get(&light_id).copied().unwrap_or_default()
    }

    /// Lights with at least one counted event, ascending.
    pub fn lights(&self) -> impl Iterator<Item = u32> + '_ {
        self.tallies.keys().copied()
    }

    /// Sum over all lights.
    pub fn total(&self) -> LightTally {
        let mut total = LightTally::default();
        for tally in self.tallies.values() {
            total.merge(tally);
        }
        total
    }

    /// Whether every light's counters reconcile.
    pub fn reconciles(&self) -> bool {
        self.tallies.values().all(LightTally::reconciles)
    }

    /// Add another ledger's counts into this one.
    pub fn merge(&mut self, other: &RayLedger) {
        for (&light, tally) in &other.tallies {
            self.entry(light).merge(tally);
        }
    }

    /// Reset all counters.
    pub fn clear(&mut self) {
        self.tallies.clear();
    }
}
