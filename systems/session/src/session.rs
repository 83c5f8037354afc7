//! Single-threaded session that owns the world and drives every system.

use deck_defence_core::{
    Archetype, BoardView, CellCoord, Command, CommandError, DefenderId, DefenderInfo,
    DefenderKind, DefenderTarget, Event, HpMultiplier, HudSnapshot, SessionSnapshot,
};
use deck_defence_system_movement::Movement;
use deck_defence_system_spawning::{Config as SpawningConfig, Spawning};
use deck_defence_system_tower_combat::TowerCombat;
use deck_defence_system_tower_targeting::TowerTargeting;
use deck_defence_system_wave_generation::WaveGeneration;
use deck_defence_world::{self as world, query, PathMap, World};

use crate::config::SessionConfig;

/// Undrained events kept by a session; older ones are dropped first.
pub const MAX_PENDING_EVENTS: usize = 4096;

/// Outcome of a single simulation tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Tick index after advancing.
    pub tick: u64,
    /// Events emitted while processing the tick, in order.
    pub events: Vec<Event>,
    /// Best wave reached when the tick ended the game with a new record.
    pub new_best: Option<u32>,
}

impl TickReport {
    /// Reports whether the tick ended the session.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, Event::GameOver { .. }))
    }
}

/// World plus the systems that advance it.
#[derive(Debug)]
pub struct Session {
    world: World,
    waves: WaveGeneration,
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    targets: Vec<DefenderTarget>,
    best_wave: u32,
    pending_events: Vec<Event>,
}

impl Session {
    /// Creates a session on the standard layout.
    #[must_use]
    pub fn new(config: &SessionConfig, best_wave: u32) -> Self {
        Self::with_layout(config, PathMap::standard(), best_wave)
    }

    /// Creates a session on a custom layout.
    #[must_use]
    pub fn with_layout(config: &SessionConfig, path: PathMap, best_wave: u32) -> Self {
        Self {
            world: World::with_layout(path, config.economy),
            waves: WaveGeneration::new(config.waves, config.simulation.seed),
            spawning: Spawning::new(SpawningConfig::new(config.simulation.spawn_interval)),
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            targets: Vec::new(),
            best_wave,
            pending_events: Vec::new(),
        }
    }

    /// Starts the next wave and returns its number.
    pub fn start_wave(&mut self) -> Result<u32, CommandError> {
        let next_wave = query::wave_number(&self.world).saturating_add(1);
        let mut commands = Vec::new();
        self.waves.handle(next_wave, &mut commands);

        let mut started = Err(CommandError::WaveAlreadyActive);
        for command in commands {
            started = match command {
                Command::StartWave {
                    composition,
                    hp_multiplier,
                } => self.start_wave_with(composition, hp_multiplier),
                other => {
                    self.record(|state, events| world::apply(state, other, events));
                    continue;
                }
            };
        }
        started
    }

    /// Starts the next wave with a fixed line-up at unit hp, in the given order.
    pub fn start_scripted_wave(
        &mut self,
        composition: Vec<Archetype>,
    ) -> Result<u32, CommandError> {
        self.start_wave_with(composition, HpMultiplier::UNIT)
    }

    fn start_wave_with(
        &mut self,
        composition: Vec<Archetype>,
        hp_multiplier: HpMultiplier,
    ) -> Result<u32, CommandError> {
        self.record(|state, events| {
            world::start_wave(state, composition, hp_multiplier, events)
        })
    }

    /// Places a level-one defender on a buildable cell.
    pub fn build(
        &mut self,
        kind: DefenderKind,
        cell: CellCoord,
    ) -> Result<DefenderId, CommandError> {
        self.record(|state, events| world::build(state, kind, cell, events))
    }

    /// Raises a defender by one level and returns the new level.
    pub fn upgrade(&mut self, defender: DefenderId) -> Result<u32, CommandError> {
        self.record(|state, events| world::upgrade(state, defender, events))
    }

    /// Discards the running game and starts over with fresh balances.
    pub fn restart(&mut self) {
        self.spawning = Spawning::new(SpawningConfig::new(self.spawning_interval()));
        self.targets.clear();
        self.record(|state, events| world::apply(state, Command::Restart, events));
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self) -> TickReport {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick, &mut events);

        let mut commands = Vec::new();
        self.spawning.handle(
            &events,
            query::phase(&self.world),
            query::queued_attackers(&self.world),
            query::entities(&self.world).attacker_count(),
            &mut commands,
        );
        self.apply_all(&mut commands, &mut events);

        // Includes attackers released above.
        let walkers = query::attacker_view(&self.world);
        self.movement
            .handle(&events, query::phase(&self.world), &walkers, &mut commands);
        self.apply_all(&mut commands, &mut events);

        let phase = query::phase(&self.world);
        let defenders = query::defender_view(&self.world);
        self.targeting.handle(
            phase,
            &defenders,
            &query::attacker_view(&self.world),
            &mut self.targets,
        );
        self.combat
            .handle(phase, &defenders, &self.targets, &mut commands);
        // Casualties are settled after every defender has acted.
        commands.push(Command::ResolveCasualties);
        commands.push(Command::ConcludeTick);
        self.apply_all(&mut commands, &mut events);

        let new_best = events.iter().find_map(|event| match event {
            Event::GameOver { final_wave } if *final_wave > self.best_wave => Some(*final_wave),
            _ => None,
        });
        if let Some(best) = new_best {
            log::info!("new best wave {best}");
            self.best_wave = best;
        }

        self.queue_events(&events);
        TickReport {
            tick: query::tick_index(&self.world),
            events,
            new_best,
        }
    }

    /// Everything a presentation layer needs for one frame.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board(),
            hud: self.hud(),
            best_wave: self.best_wave,
            build_menu: query::build_menu(&self.world),
        }
    }

    /// Heads-up display scalars.
    #[must_use]
    pub fn hud(&self) -> HudSnapshot {
        query::hud(&self.world)
    }

    /// Render state of every grid cell.
    #[must_use]
    pub fn board(&self) -> BoardView {
        query::board(&self.world)
    }

    /// Scaled damage and next upgrade price of a defender.
    #[must_use]
    pub fn defender_info(&self, defender: DefenderId) -> Option<DefenderInfo> {
        query::defender_info(&self.world, defender)
    }

    /// Best wave reached across this and earlier sessions.
    #[must_use]
    pub fn best_wave(&self) -> u32 {
        self.best_wave
    }

    /// Takes every event emitted since the previous drain.
    ///
    /// At most [`MAX_PENDING_EVENTS`] are retained between drains, so callers
    /// that care about every event should drain at least once per frame.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending_events)
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn spawning_interval(&self) -> u32 {
        self.spawning.spawn_interval()
    }

    fn record<T>(&mut self, op: impl FnOnce(&mut World, &mut Vec<Event>) -> T) -> T {
        let mut events = Vec::new();
        let outcome = op(&mut self.world, &mut events);
        self.queue_events(&events);
        outcome
    }

    fn queue_events(&mut self, events: &[Event]) {
        self.pending_events.extend_from_slice(events);
        let excess = self.pending_events.len().saturating_sub(MAX_PENDING_EVENTS);
        if excess > 0 {
            let _ = self.pending_events.drain(..excess);
        }
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_defence_core::SessionPhase;

    #[test]
    fn first_attacker_takes_a_step_on_the_tick_it_spawns() {
        let mut session = Session::new(&SessionConfig::default(), 0);
        assert_eq!(session.start_wave(), Ok(1));

        let report = session.tick();

        assert_eq!(report.tick, 1);
        let view = query::attacker_view(session.world());
        let spawned = view.iter().next().expect("attacker spawned");
        assert_eq!(spawned.archetype, Archetype::Weak);
        assert_eq!(spawned.path_index, 1);
    }

    #[test]
    fn second_start_is_rejected_while_wave_runs() {
        let mut session = Session::new(&SessionConfig::default(), 0);
        assert_eq!(session.start_wave(), Ok(1));
        assert_eq!(session.start_wave(), Err(CommandError::WaveAlreadyActive));
        assert_eq!(session.hud().wave_number, 1);
    }

    #[test]
    fn build_and_upgrade_report_results() {
        let mut session = Session::new(&SessionConfig::default(), 0);
        let defender = session
            .build(DefenderKind::Piercing, CellCoord::new(0, 1))
            .expect("affordable");
        assert_eq!(session.hud().gold, 70);
        assert_eq!(
            session.build(DefenderKind::Piercing, CellCoord::new(0, 1)),
            Err(CommandError::SlotOccupied)
        );
        assert_eq!(
            session.build(DefenderKind::Beam, CellCoord::new(2, 0)),
            Err(CommandError::InsufficientGold {
                required: 100,
                available: 70,
            })
        );
        assert_eq!(session.upgrade(defender), Ok(2));
        assert_eq!(session.hud().gold, 40);
        assert_eq!(
            session.upgrade(DefenderId::new(9)),
            Err(CommandError::NoSuchDefender)
        );
    }

    #[test]
    fn drained_events_include_commands_and_ticks() {
        let mut session = Session::new(&SessionConfig::default(), 0);
        let _ = session.start_wave();
        let _ = session.tick();

        let events = session.drain_events();
        assert!(matches!(events.first(), Some(Event::WaveStarted { wave: 1, .. })));
        assert!(events.contains(&Event::TimeAdvanced { tick: 1 }));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn restart_keeps_best_wave() {
        let mut session = Session::new(&SessionConfig::default(), 4);
        let _ = session.build(DefenderKind::Chill, CellCoord::new(0, 1));
        let _ = session.start_wave();
        let _ = session.tick();

        session.restart();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.best_wave, 4);
        assert_eq!(snapshot.hud.gold, 100);
        assert_eq!(snapshot.hud.wave_number, 0);
        assert_eq!(snapshot.hud.phase, SessionPhase::Idle);
        assert_eq!(query::tick_index(session.world()), 0);
    }

    #[test]
    fn undrained_events_keep_only_the_newest() {
        let mut session = Session::new(&SessionConfig::default(), 0);
        for _ in 0..5_000 {
            let _ = session.tick();
        }

        let events = session.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert_eq!(events.first(), Some(&Event::TimeAdvanced { tick: 905 }));
        assert_eq!(events.last(), Some(&Event::TimeAdvanced { tick: 5_000 }));
    }
}
