#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands from targeting data.

use deck_defence_core::{
    Command, DefenderId, DefenderSnapshot, DefenderTarget, DefenderView, SessionPhase,
};

/// Combat system that queues firing commands for ready defenders.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireDefender` entries for defenders ready to strike.
    ///
    /// Commands follow the order of `targets`, which the targeting system
    /// produces in defender position order.
    pub fn handle(
        &mut self,
        phase: SessionPhase,
        defenders: &DefenderView,
        targets: &[DefenderTarget],
        out: &mut Vec<Command>,
    ) {
        if phase != SessionPhase::WaveInProgress {
            return;
        }

        if targets.is_empty() {
            return;
        }

        let mut by_id: Vec<&DefenderSnapshot> = defenders.iter().collect();
        if by_id.is_empty() {
            return;
        }
        by_id.sort_by_key(|snapshot| snapshot.id);

        self.scratch.clear();

        for target in targets {
            if let Some(snapshot) = find_defender(&by_id, target.defender) {
                if snapshot.cooldown_remaining == 0 {
                    self.scratch.push(Command::FireDefender {
                        defender: target.defender,
                        attacker: target.attacker,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_defender<'a>(
    defenders: &[&'a DefenderSnapshot],
    defender: DefenderId,
) -> Option<&'a DefenderSnapshot> {
    defenders
        .binary_search_by_key(&defender, |snapshot| snapshot.id)
        .ok()
        .map(|index| defenders[index])
}
