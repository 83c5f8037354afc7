//! Gold and lives bookkeeping.

use deck_defence_core::{CommandError, DefenderKind, EconomyTuning};

/// Gold and lives balances together with the price formulas that gate them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Economy {
    gold: u32,
    lives: u32,
    tuning: EconomyTuning,
}

impl Economy {
    /// Creates a fresh economy seeded from the provided tuning.
    #[must_use]
    pub fn new(tuning: EconomyTuning) -> Self {
        Self {
            gold: tuning.starting_gold,
            lives: tuning.starting_lives,
            tuning,
        }
    }

    /// Gold currently available.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Lives currently remaining.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Tuning the economy was created with.
    #[must_use]
    pub const fn tuning(&self) -> &EconomyTuning {
        &self.tuning
    }

    /// Reports whether every life has been lost.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.lives == 0
    }

    /// Price of upgrading a defender of `kind` that currently sits at `level`.
    #[must_use]
    pub fn upgrade_cost(&self, kind: DefenderKind, level: u32) -> u32 {
        self.tuning.upgrade_growth.upgrade_cost(kind, level)
    }

    /// Bonus credited for clearing the provided wave.
    #[must_use]
    pub fn wave_clear_bonus(&self, wave: u32) -> u32 {
        self.tuning.wave_clear_bonus_for(wave)
    }

    /// Fails with `InsufficientGold` when `cost` exceeds the balance.
    pub fn ensure_affordable(&self, cost: u32) -> Result<(), CommandError> {
        if self.gold < cost {
            return Err(CommandError::InsufficientGold {
                required: cost,
                available: self.gold,
            });
        }
        Ok(())
    }

    pub(crate) fn debit(&mut self, cost: u32) -> Result<(), CommandError> {
        self.ensure_affordable(cost)?;
        self.gold -= cost;
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}
