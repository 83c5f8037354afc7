//! Arena storage for attackers and defenders.

use std::collections::BTreeMap;

use deck_defence_core::{
    Archetype, AttackerId, CellCoord, CommandError, DefenderId, DefenderKind, HpMultiplier,
};

use crate::path::PathMap;

/// Attacker walking the path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attacker {
    id: AttackerId,
    archetype: Archetype,
    hp: i32,
    max_hp: i32,
    path_index: u32,
    slow_remaining: u32,
}

impl Attacker {
    /// Identifier allocated by the store.
    #[must_use]
    pub const fn id(&self) -> AttackerId {
        self.id
    }

    /// Archetype the attacker was spawned as.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.hp
    }

    /// Hit points at spawn.
    #[must_use]
    pub const fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Current position along the path.
    #[must_use]
    pub const fn path_index(&self) -> u32 {
        self.path_index
    }

    /// Ticks of slow effect left.
    #[must_use]
    pub const fn slow_remaining(&self) -> u32 {
        self.slow_remaining
    }

    /// Reports whether the attacker has been defeated.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    pub(crate) fn take_damage(&mut self, damage: u32) {
        let damage = i32::try_from(damage).unwrap_or(i32::MAX);
        self.hp = self.hp.saturating_sub(damage);
    }

    pub(crate) fn chill(&mut self, ticks: u32) -> u32 {
        self.slow_remaining = self.slow_remaining.max(ticks);
        self.slow_remaining
    }

    pub(crate) fn tick_slow(&mut self) {
        self.slow_remaining = self.slow_remaining.saturating_sub(1);
    }

    pub(crate) fn advance(&mut self) -> u32 {
        self.path_index = self.path_index.saturating_add(1);
        self.path_index
    }
}

/// Defender standing on a buildable cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Defender {
    id: DefenderId,
    kind: DefenderKind,
    level: u32,
    cell: CellCoord,
    cooldown_remaining: u32,
}

impl Defender {
    /// Identifier allocated by the store.
    #[must_use]
    pub const fn id(&self) -> DefenderId {
        self.id
    }

    /// Kind chosen at construction.
    #[must_use]
    pub const fn kind(&self) -> DefenderKind {
        self.kind
    }

    /// Current level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Cell hosting the defender.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Ticks until the defender may strike again.
    #[must_use]
    pub const fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    /// Reports whether the defender may strike this tick.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }

    pub(crate) fn level_up(&mut self) -> u32 {
        self.level = self.level.saturating_add(1);
        self.level
    }

    pub(crate) fn cool_down(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }

    pub(crate) fn rearm(&mut self) {
        self.cooldown_remaining = self.kind.cooldown();
    }
}

/// Owns every live entity and allocates identifiers.
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    attackers: BTreeMap<AttackerId, Attacker>,
    defenders: BTreeMap<DefenderId, Defender>,
    positions: BTreeMap<CellCoord, DefenderId>,
    next_attacker_id: u32,
    next_defender_id: u32,
}

impl EntityStore {
    /// Creates an empty store with reset identifier counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a new attacker of `archetype` at path index zero.
    pub fn spawn_attacker(
        &mut self,
        archetype: Archetype,
        hp_multiplier: HpMultiplier,
    ) -> AttackerId {
        let id = AttackerId::new(self.next_attacker_id);
        self.next_attacker_id = self.next_attacker_id.saturating_add(1);
        let hp = hp_multiplier.apply(archetype.base_hp());
        let attacker = Attacker {
            id,
            archetype,
            hp,
            max_hp: hp,
            path_index: 0,
            slow_remaining: 0,
        };
        let _ = self.attackers.insert(id, attacker);
        id
    }

    /// Removes an attacker, returning its final state.
    pub fn remove_attacker(&mut self, id: AttackerId) -> Option<Attacker> {
        self.attackers.remove(&id)
    }

    /// Attackers whose cell lies within Manhattan `radius` of `center`, ordered by id.
    #[must_use]
    pub fn attackers_in_range(
        &self,
        path: &PathMap,
        center: CellCoord,
        radius: u32,
    ) -> Vec<AttackerId> {
        self.attackers
            .values()
            .filter(|attacker| {
                path.cell_at(attacker.path_index)
                    .is_some_and(|cell| cell.manhattan_distance(center) <= radius)
            })
            .map(Attacker::id)
            .collect()
    }

    /// Constructs a level-one defender, failing when the cell is taken.
    pub fn place_defender(
        &mut self,
        kind: DefenderKind,
        cell: CellCoord,
    ) -> Result<DefenderId, CommandError> {
        if self.positions.contains_key(&cell) {
            return Err(CommandError::SlotOccupied);
        }

        let id = DefenderId::new(self.next_defender_id);
        self.next_defender_id = self.next_defender_id.saturating_add(1);
        let defender = Defender {
            id,
            kind,
            level: 1,
            cell,
            cooldown_remaining: 0,
        };
        let _ = self.positions.insert(cell, id);
        let _ = self.defenders.insert(id, defender);
        Ok(id)
    }

    /// Defender standing on `cell`, if any.
    #[must_use]
    pub fn defender_at(&self, cell: CellCoord) -> Option<&Defender> {
        self.positions
            .get(&cell)
            .and_then(|id| self.defenders.get(id))
    }

    /// Looks up an attacker by identifier.
    #[must_use]
    pub fn attacker(&self, id: AttackerId) -> Option<&Attacker> {
        self.attackers.get(&id)
    }

    /// Looks up a defender by identifier.
    #[must_use]
    pub fn defender(&self, id: DefenderId) -> Option<&Defender> {
        self.defenders.get(&id)
    }

    /// Live attackers ordered by identifier.
    pub fn attackers(&self) -> impl Iterator<Item = &Attacker> {
        self.attackers.values()
    }

    /// Defenders in position order.
    pub fn defenders(&self) -> impl Iterator<Item = &Defender> {
        self.positions
            .values()
            .filter_map(|id| self.defenders.get(id))
    }

    /// Number of live attackers.
    #[must_use]
    pub fn attacker_count(&self) -> usize {
        self.attackers.len()
    }

    pub(crate) fn attacker_mut(&mut self, id: AttackerId) -> Option<&mut Attacker> {
        self.attackers.get_mut(&id)
    }

    pub(crate) fn defender_mut(&mut self, id: DefenderId) -> Option<&mut Defender> {
        self.defenders.get_mut(&id)
    }

    pub(crate) fn defenders_mut(&mut self) -> impl Iterator<Item = &mut Defender> {
        self.defenders.values_mut()
    }

    pub(crate) fn defeated_attackers(&self) -> Vec<AttackerId> {
        self.attackers
            .values()
            .filter(|attacker| attacker.is_defeated())
            .map(Attacker::id)
            .collect()
    }
}
