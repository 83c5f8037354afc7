//! Scripted player that spends gold between waves.

use std::cmp::Reverse;

use deck_defence_core::{CellCoord, CommandError, DefenderId, DefenderKind};
use deck_defence_session::SessionController;
use deck_defence_world::{query, PathMap, World};

/// Build order cycled through as sites fill up.
const ROTATION: [DefenderKind; 4] = [
    DefenderKind::Piercing,
    DefenderKind::Chill,
    DefenderKind::Splash,
    DefenderKind::Beam,
];

/// Upper bound on commands issued in one shopping round.
const MAX_ACTIONS_PER_ROUND: usize = 64;

/// Purchase chosen by the autopilot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Build { kind: DefenderKind, cell: CellCoord },
    Upgrade(DefenderId),
}

/// Greedy player: fills the sites covering the most path cells first, then
/// sinks leftover gold into the cheapest upgrade.
#[derive(Debug)]
pub(crate) struct Autopilot {
    sites: Vec<CellCoord>,
    built: usize,
}

impl Autopilot {
    pub(crate) fn new(path: &PathMap) -> Self {
        let reach = ROTATION
            .iter()
            .map(|kind| kind.range())
            .min()
            .unwrap_or(1);
        let mut sites: Vec<CellCoord> = path.buildable_cells().collect();
        sites.sort_by_key(|site| {
            let covered = path
                .cells()
                .iter()
                .filter(|cell| cell.manhattan_distance(*site) <= reach)
                .count();
            (Reverse(covered), site.row(), site.column())
        });
        Self { sites, built: 0 }
    }

    pub(crate) fn next_action(&self, world: &World) -> Option<Action> {
        let gold = query::economy(world).gold();
        let entities = query::entities(world);
        let kind = ROTATION[self.built % ROTATION.len()];
        let free_site = self
            .sites
            .iter()
            .copied()
            .find(|site| entities.defender_at(*site).is_none());

        match free_site {
            Some(cell) if gold >= kind.cost() => Some(Action::Build { kind, cell }),
            // Save up for the next site instead of upgrading.
            Some(_) => None,
            None => query::defender_view(world)
                .iter()
                .filter_map(|defender| {
                    query::upgrade_cost(world, defender.id).map(|cost| (cost, defender.id))
                })
                .filter(|(cost, _)| *cost <= gold)
                .min()
                .map(|(_, defender)| Action::Upgrade(defender)),
        }
    }

    /// Spends gold until nothing useful is affordable. Returns the number of
    /// purchases made.
    pub(crate) fn shop(&mut self, controller: &SessionController) -> usize {
        let mut purchases = 0;
        for _ in 0..MAX_ACTIONS_PER_ROUND {
            let Some(action) = controller.inspect(|session| self.next_action(session.world()))
            else {
                break;
            };
            match self.perform(controller, action) {
                Ok(()) => purchases += 1,
                Err(error) => {
                    log::debug!("autopilot {action:?} rejected: {error}");
                    break;
                }
            }
        }
        purchases
    }

    fn perform(
        &mut self,
        controller: &SessionController,
        action: Action,
    ) -> Result<(), CommandError> {
        match action {
            Action::Build { kind, cell } => {
                let defender = controller.build(kind, cell)?;
                self.built += 1;
                log::debug!(
                    "autopilot built {kind:?} {} at ({}, {})",
                    defender.get(),
                    cell.column(),
                    cell.row()
                );
            }
            Action::Upgrade(defender) => {
                let level = controller.upgrade(defender)?;
                log::debug!("autopilot upgraded defender {} to {level}", defender.get());
            }
        }
        Ok(())
    }
}
