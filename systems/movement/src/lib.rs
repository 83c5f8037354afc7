#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that proposes one stride per attacker and tick.

use deck_defence_core::{AttackerView, Command, Event, SessionPhase, Stride};

/// Pure system that reacts to time advancing and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `MoveAttacker` command per live attacker, ordered by id.
    ///
    /// Slowed attackers hold position on odd ticks.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: SessionPhase,
        attackers: &AttackerView,
        out: &mut Vec<Command>,
    ) {
        if phase != SessionPhase::WaveInProgress {
            return;
        }

        let Some(tick) = events.iter().rev().find_map(|event| match event {
            Event::TimeAdvanced { tick } => Some(*tick),
            _ => None,
        }) else {
            return;
        };

        self.scratch.clear();
        for snapshot in attackers.iter() {
            let stride = if snapshot.is_slowed() && tick % 2 == 1 {
                Stride::Hold
            } else {
                Stride::Step
            };
            self.scratch.push(Command::MoveAttacker {
                attacker: snapshot.id,
                stride,
            });
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
