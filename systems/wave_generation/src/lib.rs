#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave composition.
//!
//! Waves one through five are hand-authored. Later waves blend procedurally:
//! the weakest archetype tapers off, sturdier archetypes grow with the wave
//! number, and a boss joins on every cadence multiple. The spawn order of a
//! wave is shuffled with a ChaCha stream keyed on the session seed and the
//! wave number, so identical seeds replay identically.

use deck_defence_core::{Archetype, Command, HpMultiplier};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const RNG_STREAM_WAVE_ORDER: &str = "wave-order";

/// Coefficients of the procedural wave formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Waves above this number scale attacker hit points.
    pub hp_threshold: u32,
    /// Hit-point percentage added per wave above the threshold.
    pub hp_step_percent: u32,
    /// A boss joins every wave divisible by this cadence.
    pub boss_cadence: u32,
    /// Weak attackers number `weak_taper - wave` and vanish from this wave on.
    pub weak_taper: u32,
    /// Upper bound on flying attackers per wave.
    pub flying_cap: u32,
    /// Armored attackers number `wave - armored_offset`.
    pub armored_offset: u32,
    /// Heavy attackers join from this wave on.
    pub heavy_from_wave: u32,
    /// Heavy attackers number `wave - heavy_offset`.
    pub heavy_offset: u32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            hp_threshold: 5,
            hp_step_percent: 15,
            boss_cadence: 5,
            weak_taper: 10,
            flying_cap: 8,
            armored_offset: 3,
            heavy_from_wave: 8,
            heavy_offset: 6,
        }
    }
}

/// Ordered archetypes of the provided wave before shuffling.
///
/// Wave zero is empty. Waves one to five return their authored composition.
#[must_use]
pub fn generate(wave: u32, tuning: &WaveTuning) -> Vec<Archetype> {
    if let Some(authored) = authored(wave) {
        return authored;
    }

    let mut composition = Vec::new();
    if wave < tuning.weak_taper {
        push_many(&mut composition, Archetype::Weak, tuning.weak_taper - wave);
    }
    push_many(&mut composition, Archetype::Flying, wave.min(tuning.flying_cap));
    push_many(
        &mut composition,
        Archetype::Armored,
        wave.saturating_sub(tuning.armored_offset),
    );
    if wave >= tuning.heavy_from_wave {
        push_many(
            &mut composition,
            Archetype::Heavy,
            wave.saturating_sub(tuning.heavy_offset),
        );
    }
    if tuning.boss_cadence > 0 && wave % tuning.boss_cadence == 0 {
        composition.push(Archetype::Boss);
    }
    composition
}

/// Hit-point multiplier applied to every attacker of the provided wave.
#[must_use]
pub fn hp_multiplier(wave: u32, tuning: &WaveTuning) -> HpMultiplier {
    let excess = wave.saturating_sub(tuning.hp_threshold);
    let percent = 100_u32.saturating_add(excess.saturating_mul(tuning.hp_step_percent));
    HpMultiplier::from_percent(percent)
}

fn authored(wave: u32) -> Option<Vec<Archetype>> {
    let groups: &[(Archetype, u32)] = match wave {
        0 => &[],
        1 => &[(Archetype::Weak, 5)],
        2 => &[(Archetype::Weak, 8)],
        3 => &[(Archetype::Flying, 4)],
        4 => &[(Archetype::Flying, 6), (Archetype::Weak, 2)],
        5 => &[(Archetype::Armored, 3), (Archetype::Boss, 1)],
        _ => return None,
    };

    let mut composition = Vec::new();
    for &(archetype, count) in groups {
        push_many(&mut composition, archetype, count);
    }
    Some(composition)
}

fn push_many(composition: &mut Vec<Archetype>, archetype: Archetype, count: u32) {
    composition.extend(std::iter::repeat(archetype).take(count as usize));
}

/// Pure system that turns wave requests into shuffled `StartWave` commands.
#[derive(Clone, Debug)]
pub struct WaveGeneration {
    tuning: WaveTuning,
    seed: u64,
}

impl WaveGeneration {
    /// Creates a generator for the provided tuning and session seed.
    #[must_use]
    pub const fn new(tuning: WaveTuning, seed: u64) -> Self {
        Self { tuning, seed }
    }

    /// Tuning used by the generator.
    #[must_use]
    pub const fn tuning(&self) -> &WaveTuning {
        &self.tuning
    }

    /// Emits the `StartWave` command for the provided wave number.
    pub fn handle(&self, wave: u32, out: &mut Vec<Command>) {
        let mut composition = generate(wave, &self.tuning);
        let mut rng = ChaCha8Rng::seed_from_u64(derive_order_seed(self.seed, wave));
        composition.shuffle(&mut rng);
        out.push(Command::StartWave {
            composition,
            hp_multiplier: hp_multiplier(wave, &self.tuning),
        });
    }
}

fn derive_order_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    hasher.update(RNG_STREAM_WAVE_ORDER.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}
