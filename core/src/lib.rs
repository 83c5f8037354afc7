#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Deck Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation collaborators to react to deterministically. Systems consume
//! immutable views and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Deck Defence: hold the path.";

/// Lifecycle phase of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No wave is running; the player may build, upgrade, or start the next wave.
    Idle,
    /// Attackers are queued or alive on the path.
    WaveInProgress,
    /// Lives ran out. Terminal until the session restarts.
    GameOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets economy, entities and waves to a fresh session.
    Restart,
    /// Begins the next wave using the provided spawn order.
    StartWave {
        /// Archetypes to spawn, front first.
        composition: Vec<Archetype>,
        /// Hit-point multiplier applied to every attacker of the wave.
        hp_multiplier: HpMultiplier,
    },
    /// Requests construction of a defender on a buildable cell.
    Build {
        /// Kind of defender to construct.
        kind: DefenderKind,
        /// Cell that will host the defender.
        cell: CellCoord,
    },
    /// Requests that an existing defender gain one level.
    Upgrade {
        /// Defender to upgrade.
        defender: DefenderId,
    },
    /// Advances the logical clock by one tick.
    Tick,
    /// Dequeues the next archetype of the running wave and places it at the entry.
    SpawnAttacker,
    /// Resolves one attacker's movement for the current tick.
    MoveAttacker {
        /// Attacker being moved.
        attacker: AttackerId,
        /// Whether the attacker steps forward or holds position.
        stride: Stride,
    },
    /// Requests that a ready defender strike the provided attacker.
    FireDefender {
        /// Defender discharging its attack.
        defender: DefenderId,
        /// Attacker selected as the primary target.
        attacker: AttackerId,
    },
    /// Removes every defeated attacker and credits its kill reward.
    ResolveCasualties,
    /// Evaluates defeat and wave completion at the end of a tick.
    ConcludeTick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that the session was reset.
    SessionRestarted {
        /// Gold available at the start of the session.
        gold: u32,
        /// Lives available at the start of the session.
        lives: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just began.
        tick: u64,
    },
    /// Announces that a new wave began.
    WaveStarted {
        /// Number of the wave that started.
        wave: u32,
        /// Number of attackers queued for the wave.
        attackers: u32,
    },
    /// Confirms that an attacker entered the path.
    AttackerSpawned {
        /// Identifier assigned to the attacker.
        attacker: AttackerId,
        /// Archetype of the attacker.
        archetype: Archetype,
        /// Starting hit points after wave scaling.
        hp: i32,
    },
    /// Confirms that an attacker advanced along the path.
    AttackerAdvanced {
        /// Attacker that moved.
        attacker: AttackerId,
        /// Path index occupied before the move.
        from: u32,
        /// Path index occupied after the move.
        to: u32,
    },
    /// Reports that an attacker walked out through the exit.
    LivesLost {
        /// Attacker that escaped.
        attacker: AttackerId,
        /// Lives remaining after the loss.
        remaining: u32,
    },
    /// Confirms that a defender was constructed.
    DefenderBuilt {
        /// Identifier assigned to the defender.
        defender: DefenderId,
        /// Kind of defender constructed.
        kind: DefenderKind,
        /// Cell hosting the defender.
        cell: CellCoord,
    },
    /// Confirms that a defender gained a level.
    DefenderUpgraded {
        /// Defender that was upgraded.
        defender: DefenderId,
        /// Level reached after the upgrade.
        level: u32,
        /// Gold spent on the upgrade.
        cost: u32,
    },
    /// Reports that a defender struck its primary target.
    DefenderFired {
        /// Defender that attacked.
        defender: DefenderId,
        /// Kind of the defender, used to select presentation cues.
        kind: DefenderKind,
        /// Primary target of the strike.
        attacker: AttackerId,
        /// Damage dealt to the primary target.
        damage: u32,
    },
    /// Reports collateral damage from a splash strike.
    AttackerSplashed {
        /// Defender responsible for the splash.
        defender: DefenderId,
        /// Attacker caught in the blast.
        attacker: AttackerId,
        /// Damage dealt to the attacker.
        damage: u32,
    },
    /// Reports that an attacker's slow effect was refreshed.
    AttackerSlowed {
        /// Attacker that was slowed.
        attacker: AttackerId,
        /// Remaining slowed ticks after the refresh.
        ticks: u32,
    },
    /// Reports that an attacker was defeated.
    AttackerKilled {
        /// Attacker that was removed.
        attacker: AttackerId,
        /// Archetype of the defeated attacker.
        archetype: Archetype,
        /// Gold credited for the kill.
        reward: u32,
    },
    /// Announces that every attacker of a wave was resolved.
    WaveCleared {
        /// Number of the wave that cleared.
        wave: u32,
        /// Bonus gold credited for clearing the wave.
        bonus: u32,
    },
    /// Announces the end of the session.
    GameOver {
        /// Last wave the player reached.
        final_wave: u32,
    },
    /// Reports that a player command was rejected without side effects.
    CommandRejected {
        /// Reason the command failed.
        error: CommandError,
    },
}

/// Movement decision for a single attacker on a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stride {
    /// Advance one cell along the path.
    Step,
    /// Stay on the current cell.
    Hold,
}

/// Reasons a player command may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandError {
    /// The player cannot pay for the requested build or upgrade.
    #[error("not enough gold: need {required}, have {available}")]
    InsufficientGold {
        /// Gold required by the command.
        required: u32,
        /// Gold held when the command was issued.
        available: u32,
    },
    /// A defender already occupies the requested cell.
    #[error("cell already holds a defender")]
    SlotOccupied,
    /// The requested cell is on the path or outside the grid.
    #[error("cell is not buildable")]
    NotBuildable,
    /// No defender carries the provided identifier.
    #[error("no such defender")]
    NoSuchDefender,
    /// A wave is still running.
    #[error("a wave is already in progress")]
    WaveAlreadyActive,
    /// The session ended; only a restart is accepted.
    #[error("session is over")]
    SessionOver,
}

/// Cardinal step directions along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit vector of the direction expressed as `(column, row)` deltas.
    #[must_use]
    pub const fn unit_vector(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Unique identifier assigned to an attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttackerId(u32);

impl AttackerId {
    /// Creates a new attacker identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenderId(u32);

impl DefenderId {
    /// Creates a new defender identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the defender identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Attacker categories. Each archetype fixes base hit points and kill reward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Fragile early-wave attacker.
    Weak,
    /// Light attacker that appears from wave three onwards.
    Flying,
    /// Sturdy mid-game attacker.
    Armored,
    /// Late-game bruiser.
    Heavy,
    /// Cadence boss.
    Boss,
}

impl Archetype {
    /// Every archetype ordered from weakest to strongest.
    pub const ALL: [Archetype; 5] = [
        Self::Weak,
        Self::Flying,
        Self::Armored,
        Self::Heavy,
        Self::Boss,
    ];

    /// Hit points before wave scaling.
    #[must_use]
    pub const fn base_hp(self) -> i32 {
        match self {
            Self::Weak => 5,
            Self::Flying => 8,
            Self::Armored => 15,
            Self::Heavy => 25,
            Self::Boss => 50,
        }
    }

    /// Gold credited when an attacker of this archetype is defeated.
    #[must_use]
    pub const fn kill_reward(self) -> u32 {
        match self {
            Self::Weak => 5,
            Self::Flying => 8,
            Self::Armored => 15,
            Self::Heavy => 20,
            Self::Boss => 50,
        }
    }
}

/// Types of defenders that can be constructed beside the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefenderKind {
    /// Cheap single-target attacker with medium reach.
    Piercing,
    /// Short-range heavy hitter that also damages the target's neighbours.
    Splash,
    /// Weak attacker that slows its target.
    Chill,
    /// Expensive long-range attacker.
    Beam,
}

impl DefenderKind {
    /// Every defender kind in build-menu order.
    pub const ALL: [DefenderKind; 4] = [Self::Piercing, Self::Splash, Self::Chill, Self::Beam];

    /// Gold required to construct the defender.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Piercing => 30,
            Self::Splash => 60,
            Self::Chill => 50,
            Self::Beam => 100,
        }
    }

    /// Damage dealt per strike at level one.
    #[must_use]
    pub const fn base_damage(self) -> u32 {
        match self {
            Self::Piercing => 2,
            Self::Splash => 8,
            Self::Chill => 1,
            Self::Beam => 5,
        }
    }

    /// Targeting radius measured in Manhattan cells.
    #[must_use]
    pub const fn range(self) -> u32 {
        match self {
            Self::Piercing | Self::Chill => 2,
            Self::Splash => 1,
            Self::Beam => 3,
        }
    }

    /// Ticks between consecutive strikes.
    #[must_use]
    pub const fn cooldown(self) -> u32 {
        match self {
            Self::Splash => 2,
            Self::Piercing | Self::Chill | Self::Beam => 1,
        }
    }

    /// Ticks of slow applied to the target, zero for kinds without the effect.
    #[must_use]
    pub const fn slow_duration(self) -> u32 {
        match self {
            Self::Chill => 3,
            Self::Piercing | Self::Splash | Self::Beam => 0,
        }
    }

    /// Reports whether strikes also hit the target's neighbours.
    #[must_use]
    pub const fn splashes(self) -> bool {
        matches!(self, Self::Splash)
    }

    /// Damage dealt per strike at the provided level.
    ///
    /// Every level past the first adds half of the base damage; fractional
    /// damage is truncated.
    #[must_use]
    pub fn damage_at(self, level: u32) -> u32 {
        let level = u64::from(level.max(1));
        let scaled = u64::from(self.base_damage()) * (level + 1) / 2;
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }
}

/// Damage dealt to attackers adjacent to a splash target.
#[must_use]
pub const fn splash_damage(damage: u32) -> u32 {
    damage / 2
}

/// Wave-wide hit-point multiplier expressed in whole percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HpMultiplier {
    percent: u32,
}

impl HpMultiplier {
    /// Multiplier that leaves hit points unchanged.
    pub const UNIT: Self = Self { percent: 100 };

    /// Creates a multiplier from a whole percentage (`100` is unscaled).
    #[must_use]
    pub const fn from_percent(percent: u32) -> Self {
        Self { percent }
    }

    /// Whole percentage represented by the multiplier.
    #[must_use]
    pub const fn percent(&self) -> u32 {
        self.percent
    }

    /// Scales base hit points, truncating and never dropping below one.
    #[must_use]
    pub fn apply(self, base_hp: i32) -> i32 {
        let scaled = i64::from(base_hp) * i64::from(self.percent) / 100;
        i32::try_from(scaled).unwrap_or(i32::MAX).max(1)
    }
}

impl Default for HpMultiplier {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Geometric ratio applied to upgrade prices for every level gained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostGrowth {
    numerator: u32,
    denominator: u32,
}

impl CostGrowth {
    /// Creates a growth ratio of `numerator / denominator` per level.
    #[must_use]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Numerator of the per-level ratio.
    #[must_use]
    pub const fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Denominator of the per-level ratio.
    #[must_use]
    pub const fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Price of upgrading a defender of `kind` currently at `level`.
    ///
    /// The price is `kind.cost() * ratio^(level - 1)`, truncated, so the first
    /// upgrade always costs exactly the build price. Results saturate at
    /// `u32::MAX`.
    #[must_use]
    pub fn upgrade_cost(self, kind: DefenderKind, level: u32) -> u32 {
        let denominator_step = u128::from(self.denominator.max(1));
        let numerator_step = u128::from(self.numerator);
        let ceiling = u128::from(u32::MAX);

        let mut numerator = u128::from(kind.cost());
        let mut denominator = 1_u128;
        for _ in 1..level.max(1) {
            numerator = numerator.saturating_mul(numerator_step);
            denominator = denominator.saturating_mul(denominator_step);
            let value = numerator / denominator;
            if value >= ceiling {
                return u32::MAX;
            }
            if value == 0 {
                return 0;
            }
        }

        u32::try_from(numerator / denominator).unwrap_or(u32::MAX)
    }
}

impl Default for CostGrowth {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

/// Economy tuning knobs shared by the world and session configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Gold granted when a session starts.
    pub starting_gold: u32,
    /// Lives granted when a session starts.
    pub starting_lives: u32,
    /// Flat gold credited whenever a wave clears.
    pub wave_clear_bonus: u32,
    /// Additional wave-clear gold per wave number.
    pub wave_clear_bonus_per_wave: u32,
    /// Price growth applied per upgrade level.
    pub upgrade_growth: CostGrowth,
}

impl EconomyTuning {
    /// Bonus credited for clearing the provided wave.
    #[must_use]
    pub fn wave_clear_bonus_for(&self, wave: u32) -> u32 {
        self.wave_clear_bonus
            .saturating_add(self.wave_clear_bonus_per_wave.saturating_mul(wave))
    }
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            starting_gold: 100,
            starting_lives: 20,
            wave_clear_bonus: 10,
            wave_clear_bonus_per_wave: 2,
            upgrade_growth: CostGrowth::default(),
        }
    }
}

/// Immutable representation of a single attacker used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttackerSnapshot {
    /// Unique identifier assigned to the attacker.
    pub id: AttackerId,
    /// Archetype of the attacker.
    pub archetype: Archetype,
    /// Remaining hit points; zero or below means defeated.
    pub hp: i32,
    /// Hit points at spawn.
    pub max_hp: i32,
    /// Position along the path.
    pub path_index: u32,
    /// Grid cell at `path_index`.
    pub cell: CellCoord,
    /// Ticks of slow effect left.
    pub slow_remaining: u32,
}

impl AttackerSnapshot {
    /// Remaining health as a fraction of the starting health.
    #[must_use]
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        (self.hp.max(0) as f32 / self.max_hp as f32).clamp(0.0, 1.0)
    }

    /// Reports whether the attacker is currently slowed.
    #[must_use]
    pub const fn is_slowed(&self) -> bool {
        self.slow_remaining > 0
    }
}

/// Read-only snapshot describing all attackers on the path.
#[derive(Clone, Debug, Default)]
pub struct AttackerView {
    snapshots: Vec<AttackerSnapshot>,
}

impl AttackerView {
    /// Creates a new attacker view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AttackerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured attacker snapshots ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &AttackerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of attackers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no attackers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AttackerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single defender used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefenderSnapshot {
    /// Identifier allocated to the defender by the world.
    pub id: DefenderId,
    /// Kind of defender that was constructed.
    pub kind: DefenderKind,
    /// Current level, starting at one.
    pub level: u32,
    /// Cell hosting the defender.
    pub cell: CellCoord,
    /// Ticks until the defender may strike again.
    pub cooldown_remaining: u32,
}

impl DefenderSnapshot {
    /// Damage the defender currently deals per strike.
    #[must_use]
    pub fn damage(&self) -> u32 {
        self.kind.damage_at(self.level)
    }
}

/// Read-only snapshot describing all defenders, ordered by position.
#[derive(Clone, Debug, Default)]
pub struct DefenderView {
    snapshots: Vec<DefenderSnapshot>,
}

impl DefenderView {
    /// Creates a new defender view, sorting snapshots by cell.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| (snapshot.cell, snapshot.id));
        Self { snapshots }
    }

    /// Iterator over the captured defender snapshots in position order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenderSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenderSnapshot> {
        self.snapshots
    }
}

/// Target assignment computed for a single defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefenderTarget {
    /// Defender that will strike.
    pub defender: DefenderId,
    /// Attacker selected as the primary target.
    pub attacker: AttackerId,
}

/// Render state of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellRender {
    /// Buildable cell without a defender.
    Empty,
    /// Unoccupied path cell with the heading toward its successor; `None` marks the exit.
    PathArrow(Option<Direction>),
    /// Path cell occupied by an attacker; the one closest to the exit wins.
    AttackerAt {
        /// Archetype of the displayed attacker.
        archetype: Archetype,
        /// Remaining health fraction in `0.0..=1.0`.
        hp_fraction: f32,
        /// Whether the attacker is slowed.
        slowed: bool,
    },
    /// Cell hosting a defender.
    DefenderAt {
        /// Kind of the defender.
        kind: DefenderKind,
        /// Level of the defender.
        level: u32,
    },
}

/// Row-major snapshot of every cell in the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardView {
    columns: u32,
    rows: u32,
    cells: Vec<CellRender>,
}

impl BoardView {
    /// Creates a board from row-major cells. Missing cells render as empty.
    #[must_use]
    pub fn new(columns: u32, rows: u32, mut cells: Vec<CellRender>) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        cells.resize(capacity, CellRender::Empty);
        Self {
            columns,
            rows,
            cells,
        }
    }

    /// Number of columns in the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Render state of the provided cell, if it lies within the board.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellRender> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let offset = u64::from(cell.row()) * u64::from(self.columns) + u64::from(cell.column());
        let index = usize::try_from(offset).ok()?;
        self.cells.get(index).copied()
    }

    /// Iterator over the board rows, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[CellRender]> {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.cells.chunks(width)
    }
}

/// Scalar values shown on the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HudSnapshot {
    /// Gold available to spend.
    pub gold: u32,
    /// Lives remaining.
    pub lives: u32,
    /// Number of the current or most recent wave.
    pub wave_number: u32,
    /// Attackers defeated this session.
    pub kills: u32,
    /// Queued plus live attackers of the running wave.
    pub enemies_remaining: u32,
    /// Current session phase.
    pub phase: SessionPhase,
}

/// Entry of the build menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildOption {
    /// Defender kind offered.
    pub kind: DefenderKind,
    /// Gold required to build it.
    pub cost: u32,
    /// Whether the current balance covers the cost.
    pub affordable: bool,
}

/// Detailed description of a single defender for info panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefenderInfo {
    /// Identifier of the defender.
    pub id: DefenderId,
    /// Kind of the defender.
    pub kind: DefenderKind,
    /// Current level.
    pub level: u32,
    /// Cell hosting the defender.
    pub cell: CellCoord,
    /// Damage dealt per strike at the current level.
    pub damage: u32,
    /// Targeting radius in Manhattan cells.
    pub range: u32,
    /// Gold required for the next upgrade.
    pub upgrade_cost: u32,
}

/// Everything a presentation layer needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Render state of every grid cell.
    pub board: BoardView,
    /// Heads-up display scalars.
    pub hud: HudSnapshot,
    /// Best wave reached across sessions.
    pub best_wave: u32,
    /// Build menu in display order.
    pub build_menu: Vec<BuildOption>,
}

#[cfg(test)]
mod tests {
    use super::{
        Archetype, CellCoord, CommandError, CostGrowth, DefenderId, DefenderKind, Direction,
        EconomyTuning, HpMultiplier, SessionPhase,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn wire_types_round_trip_through_bincode() {
        assert_round_trip(&DefenderId::new(42));
        assert_round_trip(&DefenderKind::Chill);
        assert_round_trip(&Archetype::Boss);
        assert_round_trip(&SessionPhase::WaveInProgress);
        assert_round_trip(&CommandError::InsufficientGold {
            required: 60,
            available: 12,
        });
        assert_round_trip(&EconomyTuning::default());
    }

    #[test]
    fn unit_vectors_are_unit_length() {
        for direction in [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ] {
            let (column, row) = direction.unit_vector();
            assert_eq!(column.abs() + row.abs(), 1, "{direction:?}");
        }
    }

    #[test]
    fn damage_grows_by_half_base_per_level() {
        assert_eq!(DefenderKind::Piercing.damage_at(1), 2);
        assert_eq!(DefenderKind::Piercing.damage_at(2), 3);
        assert_eq!(DefenderKind::Piercing.damage_at(3), 4);
        assert_eq!(DefenderKind::Chill.damage_at(2), 1);
        assert_eq!(DefenderKind::Beam.damage_at(2), 7);
        assert_eq!(DefenderKind::Splash.damage_at(0), 8);
    }

    #[test]
    fn first_upgrade_costs_the_build_price() {
        let growth = CostGrowth::default();
        for kind in DefenderKind::ALL {
            assert_eq!(growth.upgrade_cost(kind, 1), kind.cost());
        }
    }

    #[test]
    fn upgrade_cost_grows_geometrically() {
        let growth = CostGrowth::new(3, 2);
        assert_eq!(growth.upgrade_cost(DefenderKind::Piercing, 2), 45);
        assert_eq!(growth.upgrade_cost(DefenderKind::Piercing, 3), 67);
        assert_eq!(growth.upgrade_cost(DefenderKind::Beam, 3), 225);
    }

    #[test]
    fn upgrade_cost_saturates() {
        let growth = CostGrowth::new(10, 1);
        assert_eq!(growth.upgrade_cost(DefenderKind::Beam, 40), u32::MAX);
    }

    #[test]
    fn hp_multiplier_truncates_and_never_zeroes() {
        assert_eq!(HpMultiplier::UNIT.apply(25), 25);
        assert_eq!(HpMultiplier::from_percent(115).apply(5), 5);
        assert_eq!(HpMultiplier::from_percent(130).apply(25), 32);
        assert_eq!(HpMultiplier::from_percent(0).apply(5), 1);
    }

    #[test]
    fn wave_clear_bonus_scales_with_wave() {
        let tuning = EconomyTuning::default();
        assert_eq!(tuning.wave_clear_bonus_for(1), 12);
        assert_eq!(tuning.wave_clear_bonus_for(5), 20);
    }
}
