//! The year × term schedule grid.

use std::{collections::BTreeSet, fmt};

use crate::domain::{
    graph::PrerequisiteGraph, ModuleCatalogEntry, ModuleCode, PlanConfig, UnmetPrerequisite,
};

/// A position in the plan grid.
///
/// Indices are 0-based everywhere in memory; the storage wire format and all
/// human-facing text are 1-based, converted at those boundaries only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot {
    /// 0-based year index.
    pub year: usize,
    /// 0-based term index within the year.
    pub term: usize,
}

impl Slot {
    /// Creates a slot from 0-based indices.
    #[must_use]
    pub const fn new(year: usize, term: usize) -> Self {
        Self { year, term }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year {} term {}", self.year + 1, self.term + 1)
    }
}

/// Outcome of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// The placed module's code.
    pub code: ModuleCode,
    /// Where the module was placed.
    pub slot: Slot,
    /// Number of modules in the term after this placement.
    pub term_load: usize,
    /// `true` when the term now exceeds the configured soft cap.
    ///
    /// An advisory, not a failure: the placement has already happened.
    pub overloaded: bool,
}

/// Outcome of a batch removal: per-module successes and failures.
#[derive(Debug, Default)]
pub struct RemovalReport {
    /// Codes removed from the plan, in request order.
    pub removed: Vec<ModuleCode>,
    /// Codes that could not be removed, with the reason for each.
    pub failed: Vec<(ModuleCode, PlanError)>,
}

impl RemovalReport {
    /// Returns `true` if every requested removal succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Errors from plan mutations.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The module already occupies a cell in the plan.
    #[error("module {0} is already in the plan")]
    ModuleAlreadyExists(ModuleCode),

    /// The module was not found in the plan.
    #[error("module {0} is not in the plan")]
    ModuleNotFound(ModuleCode),

    /// The module is on the exemption list and cannot also be scheduled.
    #[error("module {0} is already exempted")]
    ModuleAlreadyExempted(ModuleCode),

    /// The module's prerequisite requirement is not met.
    #[error(transparent)]
    PrerequisiteNotMet(#[from] UnmetPrerequisite),

    /// Removing the module would leave a placed dependent unsatisfied.
    #[error("cannot remove {removed}: still required by {}", join_codes(.dependents))]
    DeletionBlocked {
        /// The module whose removal was requested.
        removed: ModuleCode,
        /// Placed modules that would lose a satisfied requirement.
        dependents: Vec<ModuleCode>,
    },

    /// The module's preclusion list references an already-placed module.
    #[error("module {code} is mutually exclusive with placed module {clashes_with}")]
    PreclusionConflict {
        /// The module being added.
        code: ModuleCode,
        /// The placed module it is precluded by.
        clashes_with: ModuleCode,
    },

    /// The year or term index is outside the configured plan bounds.
    #[error("{0} is outside the plan bounds")]
    InvalidSlot(Slot),
}

pub(crate) fn join_codes(codes: &[ModuleCode]) -> String {
    codes
        .iter()
        .map(ModuleCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The year × term grid of placed modules, plus the exemption list.
///
/// Invariants:
/// - a module code appears in at most one cell across the whole grid;
/// - a module is placed only if its prerequisite requirement was satisfied by
///   the codes placed elsewhere plus the exemption list at placement time;
/// - a cell may exceed the soft per-term cap, which is surfaced as an
///   overload advisory on the placement outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePlan {
    years: usize,
    terms_per_year: usize,
    max_modules_per_term: usize,
    cells: Vec<Vec<Vec<ModuleCatalogEntry>>>,
    exempted: BTreeSet<ModuleCode>,
}

impl SchedulePlan {
    /// Creates an empty plan with the configured grid dimensions.
    #[must_use]
    pub fn new(config: &PlanConfig) -> Self {
        Self {
            years: config.years,
            terms_per_year: config.terms_per_year,
            max_modules_per_term: config.max_modules_per_term,
            cells: vec![vec![Vec::new(); config.terms_per_year]; config.years],
            exempted: BTreeSet::new(),
        }
    }

    /// Number of years in the grid.
    #[must_use]
    pub const fn years(&self) -> usize {
        self.years
    }

    /// Number of terms per year in the grid.
    #[must_use]
    pub const fn terms_per_year(&self) -> usize {
        self.terms_per_year
    }

    /// Places a module into the given slot.
    ///
    /// The prerequisite check evaluates against every code already placed in
    /// the grid plus the exemption list. Exceeding the per-term soft cap is
    /// reported on the returned [`Placement`], not treated as an error.
    ///
    /// # Errors
    ///
    /// - [`PlanError::InvalidSlot`] if the slot is outside the grid;
    /// - [`PlanError::ModuleAlreadyExists`] if the code occupies any cell;
    /// - [`PlanError::PrerequisiteNotMet`] if the requirement fails (unless
    ///   the module itself is exempted);
    /// - [`PlanError::ModuleAlreadyExempted`] if the code is exempted;
    /// - [`PlanError::PreclusionConflict`] if the module's preclusion text
    ///   references a placed module.
    pub fn place_module(
        &mut self,
        entry: &ModuleCatalogEntry,
        slot: Slot,
    ) -> Result<Placement, PlanError> {
        if slot.year >= self.years || slot.term >= self.terms_per_year {
            return Err(PlanError::InvalidSlot(slot));
        }

        let code = entry.code();
        if self.slot_of(code).is_some() {
            return Err(PlanError::ModuleAlreadyExists(code.clone()));
        }

        let completed = self.placed_codes();
        entry
            .prerequisites()
            .validate(code, &completed, &self.exempted)?;

        if self.exempted.contains(code) {
            return Err(PlanError::ModuleAlreadyExempted(code.clone()));
        }

        if let Some(placed) = self.placed().find(|module| entry.precludes(module.code())) {
            return Err(PlanError::PreclusionConflict {
                code: code.clone(),
                clashes_with: placed.code().clone(),
            });
        }

        let cell = &mut self.cells[slot.year][slot.term];
        cell.push(entry.clone());
        let term_load = cell.len();
        let overloaded = term_load > self.max_modules_per_term;

        if overloaded {
            tracing::warn!(
                code = %entry.code(),
                %slot,
                term_load,
                cap = self.max_modules_per_term,
                "term exceeds the module load cap"
            );
        }

        Ok(Placement {
            code: code.clone(),
            slot,
            term_load,
            overloaded,
        })
    }

    /// Removes a module from the plan.
    ///
    /// The dependency check rebuilds the prerequisite graph over the placed
    /// modules and refuses the removal if any other placed module would lose
    /// a satisfied requirement.
    ///
    /// # Errors
    ///
    /// - [`PlanError::ModuleNotFound`] if the code is not placed;
    /// - [`PlanError::DeletionBlocked`] naming every placed dependent that
    ///   would break.
    pub fn remove_module(&mut self, code: &ModuleCode) -> Result<ModuleCatalogEntry, PlanError> {
        let slot = self
            .slot_of(code)
            .ok_or_else(|| PlanError::ModuleNotFound(code.clone()))?;

        let dependents: Vec<ModuleCode> = {
            let graph = PrerequisiteGraph::build(self.placed(), self.exempted.clone());
            graph
                .broken_dependents(code, self.placed())
                .into_iter()
                .map(|module| module.code().clone())
                .collect()
        };

        if !dependents.is_empty() {
            return Err(PlanError::DeletionBlocked {
                removed: code.clone(),
                dependents,
            });
        }

        let cell = &mut self.cells[slot.year][slot.term];
        let index = cell
            .iter()
            .position(|module| module.code() == code)
            .ok_or_else(|| PlanError::ModuleNotFound(code.clone()))?;
        Ok(cell.remove(index))
    }

    /// Removes a batch of modules, accumulating per-module outcomes.
    ///
    /// Failures never abort the batch: each code is attempted in order and
    /// the report records which were removed, which were absent and which
    /// were blocked by a dependent.
    pub fn remove_modules(&mut self, codes: &[ModuleCode]) -> RemovalReport {
        let mut report = RemovalReport::default();

        for code in codes {
            match self.remove_module(code) {
                Ok(_) => report.removed.push(code.clone()),
                Err(err) => report.failed.push((code.clone(), err)),
            }
        }

        report
    }

    /// Adds a module code to the exemption list.
    ///
    /// # Errors
    ///
    /// - [`PlanError::ModuleAlreadyExists`] if the code is placed in the
    ///   grid (a scheduled module cannot also be exempted);
    /// - [`PlanError::ModuleAlreadyExempted`] if it is already on the list.
    pub fn exempt(&mut self, code: ModuleCode) -> Result<(), PlanError> {
        if self.slot_of(&code).is_some() {
            return Err(PlanError::ModuleAlreadyExists(code));
        }
        if !self.exempted.insert(code.clone()) {
            return Err(PlanError::ModuleAlreadyExempted(code));
        }
        Ok(())
    }

    /// The exemption list.
    #[must_use]
    pub const fn exempted(&self) -> &BTreeSet<ModuleCode> {
        &self.exempted
    }

    /// Empties every cell and the exemption list. Irreversible.
    pub fn clear(&mut self) {
        for year in &mut self.cells {
            for cell in year.iter_mut() {
                cell.clear();
            }
        }
        self.exempted.clear();
    }

    /// Iterates over placed modules in year-major, term-minor order.
    pub fn placed(&self) -> impl Iterator<Item = &ModuleCatalogEntry> {
        self.placed_with_slots().map(|(entry, _)| entry)
    }

    /// Iterates over placed modules with their slots, year-major term-minor.
    pub fn placed_with_slots(&self) -> impl Iterator<Item = (&ModuleCatalogEntry, Slot)> {
        self.cells.iter().enumerate().flat_map(|(year, terms)| {
            terms.iter().enumerate().flat_map(move |(term, cell)| {
                cell.iter().map(move |entry| (entry, Slot::new(year, term)))
            })
        })
    }

    /// The set of all placed module codes.
    #[must_use]
    pub fn placed_codes(&self) -> BTreeSet<ModuleCode> {
        self.placed().map(|entry| entry.code().clone()).collect()
    }

    /// Finds the slot a module occupies, if any.
    #[must_use]
    pub fn slot_of(&self, code: &ModuleCode) -> Option<Slot> {
        self.placed_with_slots()
            .find(|(entry, _)| entry.code() == code)
            .map(|(_, slot)| slot)
    }

    /// The modules in a single cell, in placement order.
    #[must_use]
    pub fn modules_in(&self, slot: Slot) -> Option<&[ModuleCatalogEntry]> {
        self.cells
            .get(slot.year)
            .and_then(|terms| terms.get(slot.term))
            .map(Vec::as_slice)
    }

    /// Number of modules placed across the whole grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placed().count()
    }

    /// Returns `true` if no modules are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placed().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PrerequisiteSet;

    fn module(code: &str, options: &[&[&str]]) -> ModuleCatalogEntry {
        let prerequisites = PrerequisiteSet::new(options.iter().map(|o| o.iter().copied()))
            .expect("valid tokens");
        ModuleCatalogEntry::new(
            ModuleCode::new(code).unwrap(),
            format!("Module {code}"),
            4,
            "core".to_string(),
            Vec::new(),
            prerequisites,
        )
        .expect("valid entry")
    }

    fn code(raw: &str) -> ModuleCode {
        ModuleCode::new(raw).unwrap()
    }

    fn plan() -> SchedulePlan {
        SchedulePlan::new(&PlanConfig::default())
    }

    #[test]
    fn places_module_without_prerequisites() {
        let mut plan = plan();
        let outcome = plan
            .place_module(&module("CS1010", &[]), Slot::new(0, 0))
            .expect("placement should succeed");

        assert_eq!(outcome.code, code("CS1010"));
        assert_eq!(outcome.slot, Slot::new(0, 0));
        assert!(!outcome.overloaded);
        assert_eq!(plan.slot_of(&code("CS1010")), Some(Slot::new(0, 0)));
    }

    #[test]
    fn rejects_placement_outside_grid_bounds() {
        let mut plan = plan();
        let err = plan
            .place_module(&module("CS1010", &[]), Slot::new(4, 0))
            .expect_err("year out of bounds");
        assert!(matches!(err, PlanError::InvalidSlot(_)));

        let err = plan
            .place_module(&module("CS1010", &[]), Slot::new(0, 2))
            .expect_err("term out of bounds");
        assert!(matches!(err, PlanError::InvalidSlot(_)));
    }

    #[test]
    fn rejects_duplicate_placement_anywhere_in_grid() {
        let mut plan = plan();
        plan.place_module(&module("CS1010", &[]), Slot::new(0, 0))
            .unwrap();

        let err = plan
            .place_module(&module("CS1010", &[]), Slot::new(1, 1))
            .expect_err("duplicate placement");
        match err {
            PlanError::ModuleAlreadyExists(c) => assert_eq!(c, code("CS1010")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn prerequisite_gates_placement() {
        let mut plan = plan();
        let cs2040 = module("CS2040", &[&["CS1010"]]);

        let err = plan
            .place_module(&cs2040, Slot::new(0, 0))
            .expect_err("prerequisite unmet");
        assert!(matches!(err, PlanError::PrerequisiteNotMet(_)));

        plan.place_module(&module("CS1010", &[]), Slot::new(0, 0))
            .unwrap();
        plan.place_module(&cs2040, Slot::new(0, 1))
            .expect("prerequisite met after placing CS1010");
    }

    #[test]
    fn exempted_module_cannot_be_scheduled() {
        let mut plan = plan();
        plan.exempt(code("CS1010")).unwrap();

        // Exemption short-circuits the prerequisite check but the module
        // still cannot occupy a cell.
        let err = plan
            .place_module(&module("CS1010", &[&["MA9999"]]), Slot::new(0, 0))
            .expect_err("exempted module");
        assert!(matches!(err, PlanError::ModuleAlreadyExempted(_)));
    }

    #[test]
    fn exemption_unblocks_dependents() {
        let mut plan = plan();
        plan.exempt(code("CS1010")).unwrap();

        plan.place_module(&module("CS2040", &[&["CS1010"]]), Slot::new(0, 0))
            .expect("exempted prerequisite counts as satisfied");
    }

    #[test]
    fn preclusion_conflict_rejects_placement() {
        let mut plan = plan();
        plan.place_module(&module("CS2040", &[]), Slot::new(0, 0))
            .unwrap();

        let clashing = ModuleCatalogEntry::new(
            code("CS2040C"),
            "Data Structures (C)".to_string(),
            4,
            "core".to_string(),
            vec!["CS2040 / CS2040S".to_string()],
            PrerequisiteSet::none(),
        )
        .unwrap();

        let err = plan
            .place_module(&clashing, Slot::new(0, 1))
            .expect_err("precluded module");
        match err {
            PlanError::PreclusionConflict { code: c, clashes_with } => {
                assert_eq!(c, code("CS2040C"));
                assert_eq!(clashes_with, code("CS2040"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn overload_is_an_advisory_not_an_error() {
        let config = PlanConfig {
            max_modules_per_term: 2,
            ..PlanConfig::default()
        };
        let mut plan = SchedulePlan::new(&config);

        for (i, c) in ["CS1010", "MA1521", "GER1000"].iter().enumerate() {
            let outcome = plan
                .place_module(&module(c, &[]), Slot::new(0, 0))
                .expect("placements beyond the cap still succeed");
            assert_eq!(outcome.term_load, i + 1);
            assert_eq!(outcome.overloaded, i + 1 > 2);
        }

        assert_eq!(plan.modules_in(Slot::new(0, 0)).unwrap().len(), 3);
    }

    #[test]
    fn removal_blocked_by_placed_dependent() {
        let mut plan = plan();
        plan.place_module(&module("CS1010", &[]), Slot::new(0, 0))
            .unwrap();
        plan.place_module(&module("CS2040", &[&["CS1010"]]), Slot::new(0, 1))
            .unwrap();

        let err = plan
            .remove_module(&code("CS1010"))
            .expect_err("dependent still placed");
        match err {
            PlanError::DeletionBlocked { removed, dependents } => {
                assert_eq!(removed, code("CS1010"));
                assert_eq!(dependents, vec![code("CS2040")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Removing the dependent first unblocks the removal.
        plan.remove_module(&code("CS2040")).expect("no dependents");
        plan.remove_module(&code("CS1010")).expect("now removable");
        assert!(plan.is_empty());
    }

    #[test]
    fn batch_removal_reports_per_module_outcomes() {
        let mut plan = plan();
        plan.place_module(&module("CS1010", &[]), Slot::new(0, 0))
            .unwrap();
        plan.place_module(&module("CS2040", &[&["CS1010"]]), Slot::new(0, 1))
            .unwrap();

        let report =
            plan.remove_modules(&[code("CS1010"), code("CS9999"), code("CS2040")]);

        assert!(!report.is_complete());
        assert_eq!(report.removed, vec![code("CS2040")]);
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(
            report.failed[0],
            (ref c, PlanError::DeletionBlocked { .. }) if *c == code("CS1010")
        ));
        assert!(matches!(
            report.failed[1],
            (ref c, PlanError::ModuleNotFound(_)) if *c == code("CS9999")
        ));
    }

    #[test]
    fn clear_empties_grid_and_exemptions() {
        let mut plan = plan();
        plan.place_module(&module("CS1010", &[]), Slot::new(0, 0))
            .unwrap();
        plan.exempt(code("MA1521")).unwrap();

        plan.clear();

        assert!(plan.is_empty());
        assert!(plan.exempted().is_empty());
    }

    #[test]
    fn placed_modules_iterate_year_major_term_minor() {
        let mut plan = plan();
        plan.place_module(&module("CS1010", &[]), Slot::new(1, 0))
            .unwrap();
        plan.place_module(&module("MA1521", &[]), Slot::new(0, 1))
            .unwrap();
        plan.place_module(&module("GER1000", &[]), Slot::new(0, 0))
            .unwrap();

        let order: Vec<_> = plan.placed().map(|m| m.code().clone()).collect();
        assert_eq!(order, vec![code("GER1000"), code("MA1521"), code("CS1010")]);
    }
}
