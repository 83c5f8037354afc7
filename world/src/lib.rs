#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Deck Defence.
//!
//! The world owns the path geometry, the entity arena, the economy, and the
//! wave bookkeeping. Every mutation flows through [`apply`]; read access goes
//! through the [`query`] module.

mod economy;
mod entities;
mod path;

use std::collections::VecDeque;

use deck_defence_core::{
    Archetype, AttackerId, CellCoord, Command, CommandError, DefenderId, DefenderKind,
    EconomyTuning, Event, HpMultiplier, SessionPhase, Stride, WELCOME_BANNER,
};

pub use economy::Economy;
pub use entities::{Attacker, Defender, EntityStore};
pub use path::{PathError, PathMap};

/// Wave counter and the spawn queue of the running wave.
#[derive(Clone, Debug, Default)]
struct WaveState {
    number: u32,
    queue: VecDeque<Archetype>,
    hp_multiplier: HpMultiplier,
}

impl WaveState {
    fn begin(&mut self, composition: Vec<Archetype>, hp_multiplier: HpMultiplier) -> u32 {
        self.number = self.number.saturating_add(1);
        self.queue = composition.into();
        self.hp_multiplier = hp_multiplier;
        self.number
    }

    fn queued(&self) -> u32 {
        u32::try_from(self.queue.len()).unwrap_or(u32::MAX)
    }
}

/// Represents the authoritative Deck Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    path: PathMap,
    entities: EntityStore,
    economy: Economy,
    waves: WaveState,
    phase: SessionPhase,
    tick_index: u64,
    kills: u32,
}

impl World {
    /// Creates a world on the standard layout with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(PathMap::standard(), EconomyTuning::default())
    }

    /// Creates a world on the provided layout and economy tuning.
    #[must_use]
    pub fn with_layout(path: PathMap, tuning: EconomyTuning) -> Self {
        Self {
            banner: WELCOME_BANNER,
            path,
            entities: EntityStore::new(),
            economy: Economy::new(tuning),
            waves: WaveState::default(),
            phase: SessionPhase::Idle,
            tick_index: 0,
            kills: 0,
        }
    }

    fn reset(&mut self) {
        let tuning = *self.economy.tuning();
        self.entities = EntityStore::new();
        self.economy = Economy::new(tuning);
        self.waves = WaveState::default();
        self.phase = SessionPhase::Idle;
        self.tick_index = 0;
        self.kills = 0;
    }

    fn start_wave(
        &mut self,
        composition: Vec<Archetype>,
        hp_multiplier: HpMultiplier,
        out_events: &mut Vec<Event>,
    ) -> Result<u32, CommandError> {
        match self.phase {
            SessionPhase::GameOver => return Err(CommandError::SessionOver),
            SessionPhase::WaveInProgress => return Err(CommandError::WaveAlreadyActive),
            SessionPhase::Idle => {}
        }

        let attackers = u32::try_from(composition.len()).unwrap_or(u32::MAX);
        let wave = self.waves.begin(composition, hp_multiplier);
        self.phase = SessionPhase::WaveInProgress;
        log::info!("wave {wave} started with {attackers} attackers");
        out_events.push(Event::WaveStarted { wave, attackers });
        Ok(wave)
    }

    fn build(
        &mut self,
        kind: DefenderKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<DefenderId, CommandError> {
        if self.phase == SessionPhase::GameOver {
            return Err(CommandError::SessionOver);
        }
        if !self.path.is_buildable(cell) {
            return Err(CommandError::NotBuildable);
        }
        self.economy.ensure_affordable(kind.cost())?;

        let defender = self.entities.place_defender(kind, cell)?;
        self.economy.debit(kind.cost())?;
        log::debug!("built {kind:?} at ({}, {})", cell.column(), cell.row());
        out_events.push(Event::DefenderBuilt {
            defender,
            kind,
            cell,
        });
        Ok(defender)
    }

    fn upgrade(
        &mut self,
        defender: DefenderId,
        out_events: &mut Vec<Event>,
    ) -> Result<u32, CommandError> {
        if self.phase == SessionPhase::GameOver {
            return Err(CommandError::SessionOver);
        }
        let (kind, level) = self
            .entities
            .defender(defender)
            .map(|entry| (entry.kind(), entry.level()))
            .ok_or(CommandError::NoSuchDefender)?;

        let cost = self.economy.upgrade_cost(kind, level);
        self.economy.debit(cost)?;
        let level = self
            .entities
            .defender_mut(defender)
            .map(Defender::level_up)
            .ok_or(CommandError::NoSuchDefender)?;
        log::debug!("upgraded defender {} to level {level}", defender.get());
        out_events.push(Event::DefenderUpgraded {
            defender,
            level,
            cost,
        });
        Ok(level)
    }

    fn spawn_attacker(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::WaveInProgress {
            return;
        }
        let Some(archetype) = self.waves.queue.pop_front() else {
            return;
        };

        let attacker = self
            .entities
            .spawn_attacker(archetype, self.waves.hp_multiplier);
        let hp = self
            .entities
            .attacker(attacker)
            .map_or(0, Attacker::hp);
        out_events.push(Event::AttackerSpawned {
            attacker,
            archetype,
            hp,
        });
    }

    fn move_attacker(
        &mut self,
        attacker: AttackerId,
        stride: Stride,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != SessionPhase::WaveInProgress {
            return;
        }
        let path_len = self.path.len();
        let Some(entry) = self.entities.attacker_mut(attacker) else {
            return;
        };

        entry.tick_slow();
        if stride == Stride::Hold {
            return;
        }

        let from = entry.path_index();
        let to = entry.advance();
        if to < path_len {
            out_events.push(Event::AttackerAdvanced { attacker, from, to });
            return;
        }

        let _ = self.entities.remove_attacker(attacker);
        let remaining = self.economy.lose_life();
        log::debug!("attacker {} leaked, {remaining} lives left", attacker.get());
        out_events.push(Event::LivesLost {
            attacker,
            remaining,
        });
    }

    fn fire_defender(
        &mut self,
        defender: DefenderId,
        attacker: AttackerId,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != SessionPhase::WaveInProgress {
            return;
        }
        let Some((kind, damage, origin)) = self
            .entities
            .defender(defender)
            .filter(|entry| entry.is_ready())
            .map(|entry| (entry.kind(), entry.kind().damage_at(entry.level()), entry.cell()))
        else {
            return;
        };

        let in_range = self.entities.attackers_in_range(&self.path, origin, kind.range());
        if !in_range.contains(&attacker) {
            return;
        }
        let Some(impact) = self
            .entities
            .attacker(attacker)
            .and_then(|target| self.path.cell_at(target.path_index()))
        else {
            return;
        };

        if let Some(target) = self.entities.attacker_mut(attacker) {
            target.take_damage(damage);
        }
        if let Some(entry) = self.entities.defender_mut(defender) {
            entry.rearm();
        }
        out_events.push(Event::DefenderFired {
            defender,
            kind,
            attacker,
            damage,
        });

        if kind.splashes() {
            let splash = deck_defence_core::splash_damage(damage);
            for neighbour in self.entities.attackers_in_range(&self.path, impact, 1) {
                if neighbour == attacker {
                    continue;
                }
                if let Some(entry) = self.entities.attacker_mut(neighbour) {
                    entry.take_damage(splash);
                    out_events.push(Event::AttackerSplashed {
                        defender,
                        attacker: neighbour,
                        damage: splash,
                    });
                }
            }
        }

        let slow = kind.slow_duration();
        if slow > 0 {
            if let Some(target) = self.entities.attacker_mut(attacker) {
                let ticks = target.chill(slow);
                out_events.push(Event::AttackerSlowed { attacker, ticks });
            }
        }
    }

    fn resolve_casualties(&mut self, out_events: &mut Vec<Event>) {
        for attacker in self.entities.defeated_attackers() {
            let Some(removed) = self.entities.remove_attacker(attacker) else {
                continue;
            };
            let reward = removed.archetype().kill_reward();
            self.economy.credit(reward);
            self.kills = self.kills.saturating_add(1);
            out_events.push(Event::AttackerKilled {
                attacker,
                archetype: removed.archetype(),
                reward,
            });
        }
    }

    fn conclude_tick(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::WaveInProgress {
            return;
        }

        if self.economy.is_depleted() {
            self.phase = SessionPhase::GameOver;
            self.waves.queue.clear();
            let final_wave = self.waves.number;
            log::info!("game over on wave {final_wave}");
            out_events.push(Event::GameOver { final_wave });
            return;
        }

        if self.waves.queue.is_empty() && self.entities.attacker_count() == 0 {
            self.phase = SessionPhase::Idle;
            let wave = self.waves.number;
            let bonus = self.economy.wave_clear_bonus(wave);
            self.economy.credit(bonus);
            log::info!("wave {wave} cleared, bonus {bonus}");
            out_events.push(Event::WaveCleared { wave, bonus });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::Restart => {
            world.reset();
            out_events.push(Event::SessionRestarted {
                gold: world.economy.gold(),
                lives: world.economy.lives(),
            });
            Ok(())
        }
        Command::StartWave {
            composition,
            hp_multiplier,
        } => world
            .start_wave(composition, hp_multiplier, out_events)
            .map(drop),
        Command::Build { kind, cell } => world.build(kind, cell, out_events).map(drop),
        Command::Upgrade { defender } => world.upgrade(defender, out_events).map(drop),
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            for defender in world.entities.defenders_mut() {
                defender.cool_down();
            }
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
            Ok(())
        }
        Command::SpawnAttacker => {
            world.spawn_attacker(out_events);
            Ok(())
        }
        Command::MoveAttacker { attacker, stride } => {
            world.move_attacker(attacker, stride, out_events);
            Ok(())
        }
        Command::FireDefender { defender, attacker } => {
            world.fire_defender(defender, attacker, out_events);
            Ok(())
        }
        Command::ResolveCasualties => {
            world.resolve_casualties(out_events);
            Ok(())
        }
        Command::ConcludeTick => {
            world.conclude_tick(out_events);
            Ok(())
        }
    };

    let _ = report(outcome, out_events);
}

/// Starts a wave like [`apply`] and returns its number.
pub fn start_wave(
    world: &mut World,
    composition: Vec<Archetype>,
    hp_multiplier: HpMultiplier,
    out_events: &mut Vec<Event>,
) -> Result<u32, CommandError> {
    let outcome = world.start_wave(composition, hp_multiplier, out_events);
    report(outcome, out_events)
}

/// Builds a defender like [`apply`] and returns its identifier.
pub fn build(
    world: &mut World,
    kind: DefenderKind,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<DefenderId, CommandError> {
    let outcome = world.build(kind, cell, out_events);
    report(outcome, out_events)
}

/// Upgrades a defender like [`apply`] and returns the level reached.
pub fn upgrade(
    world: &mut World,
    defender: DefenderId,
    out_events: &mut Vec<Event>,
) -> Result<u32, CommandError> {
    let outcome = world.upgrade(defender, out_events);
    report(outcome, out_events)
}

fn report<T>(
    outcome: Result<T, CommandError>,
    out_events: &mut Vec<Event>,
) -> Result<T, CommandError> {
    if let Err(error) = &outcome {
        log::debug!("command rejected: {error}");
        out_events.push(Event::CommandRejected { error: *error });
    }
    outcome
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use deck_defence_core::{
        AttackerSnapshot, AttackerView, BoardView, BuildOption, CellCoord, CellRender,
        DefenderId, DefenderInfo, DefenderKind, DefenderSnapshot, DefenderView, HudSnapshot,
        SessionPhase,
    };

    use super::{Economy, EntityStore, PathMap, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the path geometry.
    #[must_use]
    pub fn path(world: &World) -> &PathMap {
        &world.path
    }

    /// Provides read-only access to the entity arena.
    #[must_use]
    pub fn entities(world: &World) -> &EntityStore {
        &world.entities
    }

    /// Provides read-only access to the gold and lives balances.
    #[must_use]
    pub fn economy(world: &World) -> &Economy {
        &world.economy
    }

    /// Current session phase.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Number of ticks processed since the session began.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of the current or most recent wave.
    #[must_use]
    pub fn wave_number(world: &World) -> u32 {
        world.waves.number
    }

    /// Archetypes still waiting to spawn.
    #[must_use]
    pub fn queued_attackers(world: &World) -> u32 {
        world.waves.queued()
    }

    /// Queued plus live attackers of the running wave.
    #[must_use]
    pub fn enemies_remaining(world: &World) -> u32 {
        let live = u32::try_from(world.entities.attacker_count()).unwrap_or(u32::MAX);
        world.waves.queued().saturating_add(live)
    }

    /// Captures a read-only view of the attackers on the path.
    #[must_use]
    pub fn attacker_view(world: &World) -> AttackerView {
        let snapshots = world
            .entities
            .attackers()
            .filter_map(|attacker| {
                let cell = world.path.cell_at(attacker.path_index())?;
                Some(AttackerSnapshot {
                    id: attacker.id(),
                    archetype: attacker.archetype(),
                    hp: attacker.hp(),
                    max_hp: attacker.max_hp(),
                    path_index: attacker.path_index(),
                    cell,
                    slow_remaining: attacker.slow_remaining(),
                })
            })
            .collect();
        AttackerView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the defenders in position order.
    #[must_use]
    pub fn defender_view(world: &World) -> DefenderView {
        let snapshots = world
            .entities
            .defenders()
            .map(|defender| DefenderSnapshot {
                id: defender.id(),
                kind: defender.kind(),
                level: defender.level(),
                cell: defender.cell(),
                cooldown_remaining: defender.cooldown_remaining(),
            })
            .collect();
        DefenderView::from_snapshots(snapshots)
    }

    /// Price of the next upgrade of the provided defender.
    #[must_use]
    pub fn upgrade_cost(world: &World, defender: DefenderId) -> Option<u32> {
        world
            .entities
            .defender(defender)
            .map(|entry| world.economy.upgrade_cost(entry.kind(), entry.level()))
    }

    /// Build menu entries in display order, flagged by affordability.
    #[must_use]
    pub fn build_menu(world: &World) -> Vec<BuildOption> {
        DefenderKind::ALL
            .into_iter()
            .map(|kind| BuildOption {
                kind,
                cost: kind.cost(),
                affordable: world.economy.gold() >= kind.cost(),
            })
            .collect()
    }

    /// Damage, range and next upgrade price of the provided defender.
    #[must_use]
    pub fn defender_info(world: &World, defender: DefenderId) -> Option<DefenderInfo> {
        let entry = world.entities.defender(defender)?;
        Some(DefenderInfo {
            id: entry.id(),
            kind: entry.kind(),
            level: entry.level(),
            cell: entry.cell(),
            damage: entry.kind().damage_at(entry.level()),
            range: entry.kind().range(),
            upgrade_cost: world.economy.upgrade_cost(entry.kind(), entry.level()),
        })
    }

    /// Heads-up display scalars.
    #[must_use]
    pub fn hud(world: &World) -> HudSnapshot {
        HudSnapshot {
            gold: world.economy.gold(),
            lives: world.economy.lives(),
            wave_number: world.waves.number,
            kills: world.kills,
            enemies_remaining: enemies_remaining(world),
            phase: world.phase,
        }
    }

    /// Row-major render state of every grid cell.
    #[must_use]
    pub fn board(world: &World) -> BoardView {
        let attackers = attacker_view(world);
        let columns = world.path.columns();
        let rows = world.path.rows();
        let mut cells = Vec::new();
        for row in 0..rows {
            for column in 0..columns {
                cells.push(render_cell(world, &attackers, CellCoord::new(column, row)));
            }
        }
        BoardView::new(columns, rows, cells)
    }

    fn render_cell(world: &World, attackers: &AttackerView, cell: CellCoord) -> CellRender {
        if let Some(defender) = world.entities.defender_at(cell) {
            return CellRender::DefenderAt {
                kind: defender.kind(),
                level: defender.level(),
            };
        }
        if !world.path.is_path(cell) {
            return CellRender::Empty;
        }

        let leader = attackers
            .iter()
            .filter(|snapshot| snapshot.cell == cell)
            .max_by_key(|snapshot| (snapshot.path_index, std::cmp::Reverse(snapshot.id)));
        match leader {
            Some(snapshot) => CellRender::AttackerAt {
                archetype: snapshot.archetype,
                hp_fraction: snapshot.hp_fraction(),
                slowed: snapshot.is_slowed(),
            },
            None => CellRender::PathArrow(world.path.direction_at(cell)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_defence_core::CellRender;

    fn start(world: &mut World, composition: Vec<Archetype>) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::StartWave {
                composition,
                hp_multiplier: HpMultiplier::UNIT,
            },
            &mut events,
        );
        events
    }

    #[test]
    fn build_debits_gold_and_places_level_one_defender() {
        let mut world = World::new();
        let mut events = Vec::new();
        let cell = CellCoord::new(0, 1);

        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Piercing,
                cell,
            },
            &mut events,
        );

        assert_eq!(query::economy(&world).gold(), 70);
        let defender = query::entities(&world)
            .defender_at(cell)
            .expect("defender placed");
        assert_eq!(defender.level(), 1);
        assert_eq!(
            events,
            vec![Event::DefenderBuilt {
                defender: defender.id(),
                kind: DefenderKind::Piercing,
                cell,
            }]
        );
    }

    #[test]
    fn build_on_path_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Piercing,
                cell: CellCoord::new(0, 0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                error: CommandError::NotBuildable,
            }]
        );
        assert_eq!(query::economy(&world).gold(), 100);
    }

    #[test]
    fn occupied_slot_leaves_gold_untouched() {
        let mut world = World::new();
        let mut events = Vec::new();
        let cell = CellCoord::new(2, 0);
        let build = Command::Build {
            kind: DefenderKind::Piercing,
            cell,
        };

        apply(&mut world, build.clone(), &mut events);
        events.clear();
        apply(&mut world, build, &mut events);

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                error: CommandError::SlotOccupied,
            }]
        );
        assert_eq!(query::economy(&world).gold(), 70);
    }

    #[test]
    fn unaffordable_build_reports_shortfall() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Beam,
                cell: CellCoord::new(2, 0),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Piercing,
                cell: CellCoord::new(4, 1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                error: CommandError::InsufficientGold {
                    required: 30,
                    available: 0,
                },
            }]
        );
        assert!(query::entities(&world)
            .defender_at(CellCoord::new(4, 1))
            .is_none());
    }

    #[test]
    fn upgrade_charges_growth_and_increments_level() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Piercing,
                cell: CellCoord::new(0, 1),
            },
            &mut events,
        );
        let defender = DefenderId::new(0);
        assert_eq!(query::upgrade_cost(&world, defender), Some(30));

        events.clear();
        apply(&mut world, Command::Upgrade { defender }, &mut events);

        assert_eq!(
            events,
            vec![Event::DefenderUpgraded {
                defender,
                level: 2,
                cost: 30,
            }]
        );
        assert_eq!(query::economy(&world).gold(), 40);
        assert_eq!(query::upgrade_cost(&world, defender), Some(45));
    }

    #[test]
    fn build_menu_tracks_balance() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Chill,
                cell: CellCoord::new(0, 1),
            },
            &mut events,
        );

        let affordable: Vec<DefenderKind> = query::build_menu(&world)
            .into_iter()
            .filter(|option| option.affordable)
            .map(|option| option.kind)
            .collect();
        assert_eq!(affordable, vec![DefenderKind::Piercing, DefenderKind::Chill]);

        let info = query::defender_info(&world, DefenderId::new(0)).expect("defender exists");
        assert_eq!(info.damage, 1);
        assert_eq!(info.range, 2);
        assert_eq!(info.upgrade_cost, 50);
    }

    #[test]
    fn upgrade_of_unknown_defender_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Upgrade {
                defender: DefenderId::new(9),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                error: CommandError::NoSuchDefender,
            }]
        );
    }

    #[test]
    fn second_wave_start_is_rejected_while_active() {
        let mut world = World::new();
        let first = start(&mut world, vec![Archetype::Weak]);
        assert_eq!(
            first,
            vec![Event::WaveStarted {
                wave: 1,
                attackers: 1,
            }]
        );

        let second = start(&mut world, vec![Archetype::Weak]);
        assert_eq!(
            second,
            vec![Event::CommandRejected {
                error: CommandError::WaveAlreadyActive,
            }]
        );
        assert_eq!(query::wave_number(&world), 1);
    }

    #[test]
    fn attacker_leaks_after_stepping_past_exit() {
        let mut world = World::new();
        let _ = start(&mut world, vec![Archetype::Weak]);
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnAttacker, &mut events);
        let attacker = AttackerId::new(0);

        for _ in 0..13 {
            apply(
                &mut world,
                Command::MoveAttacker {
                    attacker,
                    stride: Stride::Step,
                },
                &mut events,
            );
        }
        let view = query::attacker_view(&world);
        let snapshot = view.iter().next().expect("attacker still on exit cell");
        assert_eq!(snapshot.path_index, 13);

        events.clear();
        apply(
            &mut world,
            Command::MoveAttacker {
                attacker,
                stride: Stride::Step,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::LivesLost {
                attacker,
                remaining: 19,
            }]
        );
        assert_eq!(query::entities(&world).attacker_count(), 0);
    }

    #[test]
    fn hold_stride_consumes_slow_without_moving() {
        let mut world = World::new();
        let _ = start(&mut world, vec![Archetype::Armored]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Chill,
                cell: CellCoord::new(0, 1),
            },
            &mut events,
        );
        apply(&mut world, Command::SpawnAttacker, &mut events);
        apply(
            &mut world,
            Command::FireDefender {
                defender: DefenderId::new(0),
                attacker: AttackerId::new(0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveAttacker {
                attacker: AttackerId::new(0),
                stride: Stride::Hold,
            },
            &mut events,
        );

        let view = query::attacker_view(&world);
        let snapshot = view.iter().next().expect("attacker present");
        assert_eq!(snapshot.path_index, 0);
        assert_eq!(snapshot.slow_remaining, 2);
        assert_eq!(snapshot.hp, 14);
    }

    #[test]
    fn cooling_defender_cannot_fire() {
        let mut world = World::new();
        let _ = start(&mut world, vec![Archetype::Boss]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Splash,
                cell: CellCoord::new(0, 1),
            },
            &mut events,
        );
        apply(&mut world, Command::SpawnAttacker, &mut events);
        let fire = Command::FireDefender {
            defender: DefenderId::new(0),
            attacker: AttackerId::new(0),
        };

        apply(&mut world, fire.clone(), &mut events);
        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, fire.clone(), &mut events);
        assert_eq!(query::attacker_view(&world).iter().next().map(|a| a.hp), Some(42));

        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, fire, &mut events);
        assert_eq!(query::attacker_view(&world).iter().next().map(|a| a.hp), Some(34));
    }

    #[test]
    fn board_shows_defenders_arrows_and_leading_attacker() {
        let mut world = World::new();
        let _ = start(&mut world, vec![Archetype::Weak, Archetype::Boss]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Piercing,
                cell: CellCoord::new(0, 1),
            },
            &mut events,
        );
        apply(&mut world, Command::SpawnAttacker, &mut events);
        apply(&mut world, Command::SpawnAttacker, &mut events);

        let board = query::board(&world);
        assert_eq!(
            board.cell(CellCoord::new(0, 1)),
            Some(CellRender::DefenderAt {
                kind: DefenderKind::Piercing,
                level: 1,
            })
        );
        assert_eq!(board.cell(CellCoord::new(2, 1)), Some(CellRender::Empty));
        assert_eq!(
            board.cell(CellCoord::new(1, 0)),
            Some(CellRender::PathArrow(Some(deck_defence_core::Direction::South)))
        );
        assert_eq!(
            board.cell(CellCoord::new(0, 0)),
            Some(CellRender::AttackerAt {
                archetype: Archetype::Weak,
                hp_fraction: 1.0,
                slowed: false,
            })
        );
    }

    #[test]
    fn restart_resets_balances_and_entities() {
        let mut world = World::new();
        let _ = start(&mut world, vec![Archetype::Weak]);
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnAttacker, &mut events);
        apply(
            &mut world,
            Command::Build {
                kind: DefenderKind::Piercing,
                cell: CellCoord::new(0, 1),
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::Restart, &mut events);

        assert_eq!(
            events,
            vec![Event::SessionRestarted {
                gold: 100,
                lives: 20,
            }]
        );
        assert_eq!(query::phase(&world), SessionPhase::Idle);
        assert_eq!(query::wave_number(&world), 0);
        assert_eq!(query::entities(&world).attacker_count(), 0);
        assert_eq!(query::defender_view(&world).iter().count(), 0);
    }

    #[test]
    fn typed_commands_return_their_results() {
        let mut world = World::new();
        let mut events = Vec::new();
        let cell = CellCoord::new(0, 1);

        let defender = build(&mut world, DefenderKind::Piercing, cell, &mut events)
            .expect("affordable");
        assert_eq!(upgrade(&mut world, defender, &mut events), Ok(2));
        assert_eq!(
            start_wave(
                &mut world,
                vec![Archetype::Weak],
                HpMultiplier::UNIT,
                &mut events
            ),
            Ok(1)
        );

        let rejected = build(&mut world, DefenderKind::Piercing, cell, &mut events);
        assert_eq!(rejected, Err(CommandError::SlotOccupied));
        assert_eq!(
            events.last(),
            Some(&Event::CommandRejected {
                error: CommandError::SlotOccupied,
            })
        );
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }
}
