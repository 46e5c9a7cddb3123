//! Topological arrangement of a module set into the plan grid.

use std::collections::{BTreeMap, BTreeSet};

use tracing::instrument;

use crate::domain::{
    graph::PrerequisiteGraph,
    schedule::{join_codes, PlanError, SchedulePlan, Slot},
    ModuleCatalogEntry, ModuleCode, PlanConfig,
};

/// Errors from arranging a module set into a plan.
#[derive(Debug, thiserror::Error)]
pub enum ArrangeError {
    /// The module set contains a prerequisite cycle and cannot be ordered.
    #[error("prerequisite cycle involving {}", join_codes(.members))]
    PrerequisiteCycle {
        /// Modules participating in the cycle.
        members: Vec<ModuleCode>,
    },

    /// A placement was rejected by the plan.
    ///
    /// The topological order makes this unlikely, but the plan checks
    /// satisfaction against the modules *already placed*, not the whole
    /// working set, so a requirement pointing outside the set surfaces here.
    #[error(transparent)]
    Placement(#[from] PlanError),
}

/// Distributes a core + elective module set into the year/term grid in one
/// feasible prerequisite-respecting order.
#[derive(Debug, Clone, Copy)]
pub struct Planner {
    config: PlanConfig,
}

impl Planner {
    /// Creates a planner for a grid of the given shape.
    #[must_use]
    pub const fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    /// Orders `modules` so every module follows its in-set prerequisites.
    ///
    /// Iterative Kahn-style peeling: each pass collects every module whose
    /// remaining prerequisite set is empty into a ready batch, keeping the
    /// batch in first-seen insertion order, then strikes the batch out of the
    /// other modules' remaining sets. Exempted codes never gate anything.
    ///
    /// # Errors
    ///
    /// Returns [`ArrangeError::PrerequisiteCycle`] when a pass makes no
    /// progress while modules remain, naming the modules in the graph's
    /// strongly connected components.
    pub fn topological_order<'a>(
        modules: &[&'a ModuleCatalogEntry],
        exempted: &BTreeSet<ModuleCode>,
    ) -> Result<Vec<&'a ModuleCatalogEntry>, ArrangeError> {
        let graph = PrerequisiteGraph::build(modules.iter().copied(), exempted.clone());
        let mut remaining: BTreeMap<ModuleCode, BTreeSet<ModuleCode>> = graph.prerequisite_map();

        let mut pending: Vec<&ModuleCatalogEntry> = modules.to_vec();
        let mut ordered = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let (ready, blocked): (Vec<_>, Vec<_>) = pending.into_iter().partition(|module| {
                remaining
                    .get(module.code())
                    .is_none_or(BTreeSet::is_empty)
            });

            if ready.is_empty() {
                let mut members: Vec<ModuleCode> =
                    graph.cycles().into_iter().flatten().collect();
                if members.is_empty() {
                    members = blocked.iter().map(|m| m.code().clone()).collect();
                }
                return Err(ArrangeError::PrerequisiteCycle { members });
            }

            for module in &ready {
                remaining.remove(module.code());
                for prerequisites in remaining.values_mut() {
                    prerequisites.remove(module.code());
                }
            }

            ordered.extend(ready);
            pending = blocked;
        }

        Ok(ordered)
    }

    /// Orders the core + elective set and places it into a fresh plan.
    ///
    /// Core modules come before electives in the input order; duplicate codes
    /// keep their first occurrence. Module `i` of the ordering goes to
    /// `year = i / terms`, `term = i % terms`, one module per advancing term
    /// slot. Modules beyond the grid capacity are left unplaced, which is
    /// logged but not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ArrangeError::PrerequisiteCycle`] if the set cannot be
    /// ordered, or [`ArrangeError::Placement`] if the plan rejects a
    /// placement (e.g. a prerequisite outside the set).
    #[instrument(skip_all, fields(core = core.len(), electives = electives.len()))]
    pub fn arrange(
        &self,
        core: &[ModuleCatalogEntry],
        electives: &[ModuleCatalogEntry],
        exempted: &BTreeSet<ModuleCode>,
    ) -> Result<SchedulePlan, ArrangeError> {
        let mut seen = BTreeSet::new();
        let modules: Vec<&ModuleCatalogEntry> = core
            .iter()
            .chain(electives)
            .filter(|module| seen.insert(module.code().clone()))
            .collect();

        let ordered = Self::topological_order(&modules, exempted)?;

        let mut plan = SchedulePlan::new(&self.config);
        for code in exempted {
            plan.exempt(code.clone())?;
        }

        let capacity = self.config.slots();
        if ordered.len() > capacity {
            tracing::warn!(
                unplaced = ordered.len() - capacity,
                capacity,
                "module set exceeds the grid capacity; excess modules left unplaced"
            );
        }

        let terms = self.config.terms_per_year;
        for (i, entry) in ordered.into_iter().take(capacity).enumerate() {
            let slot = Slot::new(i / terms, i % terms);
            plan.place_module(entry, slot)?;
        }

        Ok(plan)
    }
}
