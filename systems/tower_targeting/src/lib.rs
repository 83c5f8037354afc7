#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic defender targets from world snapshots.

use deck_defence_core::{
    AttackerId, AttackerView, CellCoord, DefenderTarget, DefenderView, SessionPhase,
};

/// Defender targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    attacker_workspace: Vec<AttackerCandidate>,
}

impl TowerTargeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes defender targets for the provided world snapshot.
    ///
    /// Each defender, in position order, picks the attacker within its
    /// Manhattan range that is furthest along the path; equal progress falls
    /// back to the lowest identifier. The output buffer is cleared before
    /// populating it with the latest assignments.
    pub fn handle(
        &mut self,
        phase: SessionPhase,
        defenders: &DefenderView,
        attackers: &AttackerView,
        out: &mut Vec<DefenderTarget>,
    ) {
        out.clear();

        if phase != SessionPhase::WaveInProgress {
            return;
        }

        self.prepare_attacker_workspace(attackers);
        if self.attacker_workspace.is_empty() {
            return;
        }

        for defender in defenders.iter() {
            let range = defender.kind.range();
            let mut best: Option<&AttackerCandidate> = None;

            for candidate in &self.attacker_workspace {
                if candidate.cell.manhattan_distance(defender.cell) > range {
                    continue;
                }

                match best {
                    Some(existing) if !candidate.precedes(existing) => {}
                    _ => best = Some(candidate),
                }
            }

            if let Some(chosen) = best {
                out.push(DefenderTarget {
                    defender: defender.id,
                    attacker: chosen.id,
                });
            }
        }
    }

    fn prepare_attacker_workspace(&mut self, attackers: &AttackerView) {
        self.attacker_workspace.clear();
        self.attacker_workspace.reserve(attackers.len());
        for snapshot in attackers.iter() {
            self.attacker_workspace.push(AttackerCandidate {
                id: snapshot.id,
                cell: snapshot.cell,
                path_index: snapshot.path_index,
            });
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct AttackerCandidate {
    id: AttackerId,
    cell: CellCoord,
    path_index: u32,
}

impl AttackerCandidate {
    fn precedes(&self, other: &Self) -> bool {
        match self.path_index.cmp(&other.path_index) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.id < other.id,
        }
    }
}
