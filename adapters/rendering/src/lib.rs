#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Deck Defence adapters.
//!
//! Adapters never inspect the world directly. They receive a
//! [`SessionSnapshot`], turn it into a [`Scene`] of glyphs and colours, and
//! translate simulation events into [`AudioCue`]s.

use std::collections::BTreeSet;

use anyhow::Result as AnyResult;
use deck_defence_core::{
    Archetype, BuildOption, CellRender, DefenderKind, Direction, Event, HudSnapshot,
    SessionPhase, SessionSnapshot,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Channels quantised to bytes, suitable for terminal escape codes.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [
            quantise(self.red),
            quantise(self.green),
            quantise(self.blue),
        ]
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

fn quantise(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

const GROUND: Color = Color::from_rgb_u8(90, 90, 90);
const PATH: Color = Color::from_rgb_u8(200, 170, 110);
const ATTACKER: Color = Color::from_rgb_u8(220, 40, 40);
const CHILLED: Color = Color::from_rgb_u8(80, 160, 255);

/// One drawable grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Character drawn for the cell.
    pub glyph: char,
    /// Foreground color of the glyph.
    pub color: Color,
}

impl CellPresentation {
    /// Maps a cell render state to its glyph and color.
    ///
    /// Wounded attackers fade towards white; chilled attackers are tinted blue.
    #[must_use]
    pub fn from_render(render: CellRender) -> Self {
        match render {
            CellRender::Empty => Self {
                glyph: '.',
                color: GROUND,
            },
            CellRender::PathArrow(direction) => Self {
                glyph: arrow_glyph(direction),
                color: PATH,
            },
            CellRender::AttackerAt {
                archetype,
                hp_fraction,
                slowed,
            } => {
                let base = if slowed { CHILLED } else { ATTACKER };
                Self {
                    glyph: archetype_glyph(archetype),
                    color: base.lighten(1.0 - hp_fraction),
                }
            }
            CellRender::DefenderAt { kind, level } => Self {
                glyph: defender_glyph(kind),
                color: defender_color(kind).lighten(level_tint(level)),
            },
        }
    }
}

fn arrow_glyph(direction: Option<Direction>) -> char {
    match direction {
        Some(Direction::North) => '^',
        Some(Direction::East) => '>',
        Some(Direction::South) => 'v',
        Some(Direction::West) => '<',
        None => '#',
    }
}

/// Glyph used for an attacker archetype.
#[must_use]
pub const fn archetype_glyph(archetype: Archetype) -> char {
    match archetype {
        Archetype::Weak => 'w',
        Archetype::Flying => 'f',
        Archetype::Armored => 'a',
        Archetype::Heavy => 'h',
        Archetype::Boss => '@',
    }
}

/// Glyph used for a defender kind.
#[must_use]
pub const fn defender_glyph(kind: DefenderKind) -> char {
    match kind {
        DefenderKind::Piercing => 'P',
        DefenderKind::Splash => 'S',
        DefenderKind::Chill => 'C',
        DefenderKind::Beam => 'B',
    }
}

fn defender_color(kind: DefenderKind) -> Color {
    match kind {
        DefenderKind::Piercing => Color::from_rgb_u8(60, 200, 90),
        DefenderKind::Splash => Color::from_rgb_u8(230, 140, 30),
        DefenderKind::Chill => Color::from_rgb_u8(60, 200, 230),
        DefenderKind::Beam => Color::from_rgb_u8(190, 80, 230),
    }
}

// Higher levels glow brighter, capped well short of white.
fn level_tint(level: u32) -> f32 {
    (level.saturating_sub(1) as f32 * 0.1).min(0.6)
}

/// Frame content derived from a session snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    columns: u32,
    cells: Vec<CellPresentation>,
    /// Heads-up display scalars.
    pub hud: HudSnapshot,
    /// Best wave reached across sessions.
    pub best_wave: u32,
    /// Defender kinds with their prices and affordability.
    pub build_menu: Vec<BuildOption>,
}

impl Scene {
    /// Builds a scene from the latest session snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let cells = snapshot
            .board
            .rows_iter()
            .flatten()
            .map(|render| CellPresentation::from_render(*render))
            .collect();
        Self {
            columns: snapshot.board.columns(),
            cells,
            hud: snapshot.hud,
            best_wave: snapshot.best_wave,
            build_menu: snapshot.build_menu.clone(),
        }
    }

    /// Rows of drawable cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellPresentation]> {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.cells.chunks(width)
    }

    /// Board rendered as plain glyph lines.
    #[must_use]
    pub fn board_lines(&self) -> Vec<String> {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.glyph).collect())
            .collect()
    }

    /// Single-line heads-up display.
    #[must_use]
    pub fn hud_line(&self) -> String {
        let hud = &self.hud;
        format!(
            "wave {} | gold {} | lives {} | kills {} | enemies {} | best {} | {}",
            hud.wave_number,
            hud.gold,
            hud.lives,
            hud.kills,
            hud.enemies_remaining,
            self.best_wave,
            phase_label(hud.phase),
        )
    }

    /// Build menu with unaffordable entries marked.
    #[must_use]
    pub fn menu_line(&self) -> String {
        self.build_menu
            .iter()
            .map(|option| {
                let marker = if option.affordable { "" } else { "!" };
                format!(
                    "{}:{:?} {}g{marker}",
                    defender_glyph(option.kind),
                    option.kind,
                    option.cost
                )
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

fn phase_label(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "between waves",
        SessionPhase::WaveInProgress => "wave in progress",
        SessionPhase::GameOver => "game over",
    }
}

/// Sound effect requested by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudioCue {
    /// A defender of the given kind fired.
    Fire(DefenderKind),
    /// An attacker was destroyed.
    Kill,
    /// A wave began.
    WaveStart,
    /// A wave was cleared.
    WaveClear,
    /// An attacker reached the exit.
    LifeLost,
    /// A defender was built.
    Build,
    /// A defender was upgraded.
    Upgrade,
    /// A command was rejected.
    Rejected,
    /// The session ended.
    GameOver,
}

impl AudioCue {
    /// Cue associated with an event, if any.
    #[must_use]
    pub fn for_event(event: &Event) -> Option<Self> {
        let cue = match event {
            Event::DefenderFired { kind, .. } => Self::Fire(*kind),
            Event::AttackerKilled { .. } => Self::Kill,
            Event::WaveStarted { .. } => Self::WaveStart,
            Event::WaveCleared { .. } => Self::WaveClear,
            Event::LivesLost { .. } => Self::LifeLost,
            Event::DefenderBuilt { .. } => Self::Build,
            Event::DefenderUpgraded { .. } => Self::Upgrade,
            Event::CommandRejected { .. } => Self::Rejected,
            Event::GameOver { .. } => Self::GameOver,
            Event::SessionRestarted { .. }
            | Event::TimeAdvanced { .. }
            | Event::AttackerSpawned { .. }
            | Event::AttackerAdvanced { .. }
            | Event::AttackerSplashed { .. }
            | Event::AttackerSlowed { .. } => return None,
        };
        Some(cue)
    }
}

/// Cues for one tick's events, in event order.
///
/// Each defender kind's firing cue plays at most once per tick.
#[must_use]
pub fn cues_for_tick(events: &[Event]) -> Vec<AudioCue> {
    let mut fired = BTreeSet::new();
    events
        .iter()
        .filter_map(AudioCue::for_event)
        .filter(|cue| match cue {
            AudioCue::Fire(kind) => fired.insert(*kind),
            _ => true,
        })
        .collect()
}

/// Rendering backend capable of presenting Deck Defence scenes.
pub trait RenderingBackend {
    /// Presents one frame together with the cues raised since the last one.
    fn present(&mut self, scene: &Scene, cues: &[AudioCue]) -> AnyResult<()>;
}
