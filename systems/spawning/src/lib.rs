#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for releasing queued attackers.

use deck_defence_core::{Command, Event, SessionPhase};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: u32,
}

impl Config {
    /// Creates a new configuration releasing one attacker every `spawn_interval` ticks.
    #[must_use]
    pub const fn new(spawn_interval: u32) -> Self {
        Self { spawn_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Pure system that emits `SpawnAttacker` commands while a wave runs.
///
/// An attacker is released once the interval has elapsed since the previous
/// release, and immediately whenever the path is empty.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: u32,
    ticks_since_spawn: u32,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            ticks_since_spawn: 0,
        }
    }

    /// Ticks between releases while attackers are on the path.
    #[must_use]
    pub const fn spawn_interval(&self) -> u32 {
        self.spawn_interval
    }

    /// Consumes events and wave counters to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: SessionPhase,
        queued: u32,
        live_attackers: usize,
        out: &mut Vec<Command>,
    ) {
        if phase != SessionPhase::WaveInProgress {
            self.ticks_since_spawn = 0;
            return;
        }

        let elapsed = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();
        if elapsed == 0 {
            return;
        }
        self.ticks_since_spawn = self
            .ticks_since_spawn
            .saturating_add(u32::try_from(elapsed).unwrap_or(u32::MAX));

        if queued == 0 {
            return;
        }

        if live_attackers == 0 || self.ticks_since_spawn >= self.spawn_interval {
            self.ticks_since_spawn = 0;
            out.push(Command::SpawnAttacker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced { tick: 1 }]
    }

    #[test]
    fn idle_phase_is_silent_and_resets_counter() {
        let mut spawning = Spawning::new(Config::default());
        spawning.ticks_since_spawn = 2;
        let mut out = Vec::new();
        spawning.handle(&tick(), SessionPhase::Idle, 4, 0, &mut out);
        assert!(out.is_empty());
        assert_eq!(spawning.ticks_since_spawn, 0);
    }

    #[test]
    fn empty_path_spawns_immediately() {
        let mut spawning = Spawning::new(Config::default());
        let mut out = Vec::new();
        spawning.handle(&tick(), SessionPhase::WaveInProgress, 4, 0, &mut out);
        assert_eq!(out, vec![Command::SpawnAttacker]);
    }

    #[test]
    fn busy_path_waits_for_interval() {
        let mut spawning = Spawning::new(Config::new(3));
        let mut out = Vec::new();
        spawning.handle(&tick(), SessionPhase::WaveInProgress, 4, 0, &mut out);
        out.clear();

        spawning.handle(&tick(), SessionPhase::WaveInProgress, 3, 1, &mut out);
        spawning.handle(&tick(), SessionPhase::WaveInProgress, 3, 1, &mut out);
        assert!(out.is_empty());

        spawning.handle(&tick(), SessionPhase::WaveInProgress, 3, 1, &mut out);
        assert_eq!(out, vec![Command::SpawnAttacker]);
    }

    #[test]
    fn drained_queue_emits_nothing() {
        let mut spawning = Spawning::new(Config::default());
        let mut out = Vec::new();
        spawning.handle(&tick(), SessionPhase::WaveInProgress, 0, 0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn no_time_no_spawn() {
        let mut spawning = Spawning::new(Config::default());
        let mut out = Vec::new();
        spawning.handle(&[], SessionPhase::WaveInProgress, 2, 0, &mut out);
        assert!(out.is_empty());
    }
}
