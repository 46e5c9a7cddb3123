//! The active planning session.
//!
//! A [`PlannerSession`] is the single explicit context object for one
//! student's plan: the loaded catalog, the plan grid and the plan
//! configuration. Every operation goes through it; there is no ambient or
//! process-wide state.

use crate::domain::{
    ArrangeError, Catalog, ModuleCode, PlanConfig, PlanError, Placement, Planner, RemovalReport,
    SchedulePlan, Slot,
};

/// One student's planning session: catalog + plan + configuration.
#[derive(Debug)]
pub struct PlannerSession {
    config: PlanConfig,
    catalog: Catalog,
    plan: SchedulePlan,
}

impl PlannerSession {
    /// Creates a session with an empty catalog and an empty plan.
    #[must_use]
    pub fn new(config: PlanConfig) -> Self {
        Self {
            config,
            catalog: Catalog::default(),
            plan: SchedulePlan::new(&config),
        }
    }

    /// Creates a session from already-loaded parts.
    #[must_use]
    pub const fn from_parts(config: PlanConfig, catalog: Catalog, plan: SchedulePlan) -> Self {
        Self {
            config,
            catalog,
            plan,
        }
    }

    /// The session's plan configuration.
    #[must_use]
    pub const fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// The loaded module catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable access to the catalog, for population at load time.
    pub const fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// The current plan grid.
    #[must_use]
    pub const fn plan(&self) -> &SchedulePlan {
        &self.plan
    }

    /// Places a catalog module into the plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::ModuleNotFound`] if the code is not in the
    /// catalog, or any placement error from
    /// [`SchedulePlan::place_module`].
    pub fn place(&mut self, code: &ModuleCode, slot: Slot) -> Result<Placement, PlanError> {
        let entry = self
            .catalog
            .get(code)
            .ok_or_else(|| PlanError::ModuleNotFound(code.clone()))?;
        self.plan.place_module(entry, slot)
    }

    /// Removes a module from the plan.
    ///
    /// # Errors
    ///
    /// See [`SchedulePlan::remove_module`].
    pub fn remove(&mut self, code: &ModuleCode) -> Result<(), PlanError> {
        self.plan.remove_module(code).map(|_| ())
    }

    /// Removes a batch of modules, reporting per-module outcomes.
    pub fn remove_many(&mut self, codes: &[ModuleCode]) -> RemovalReport {
        self.plan.remove_modules(codes)
    }

    /// Adds a module code to the exemption list.
    ///
    /// # Errors
    ///
    /// See [`SchedulePlan::exempt`].
    pub fn exempt(&mut self, code: ModuleCode) -> Result<(), PlanError> {
        self.plan.exempt(code)
    }

    /// Clears the plan grid and the exemption list. The catalog is kept.
    pub fn clear(&mut self) {
        self.plan.clear();
    }

    /// Replaces the plan with a freshly arranged one for the given core and
    /// elective codes, carrying over the current exemption list.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::ModuleNotFound`] (wrapped in
    /// [`ArrangeError::Placement`]) for codes missing from the catalog, or
    /// any ordering/placement error from [`Planner::arrange`]. The existing
    /// plan is untouched on failure.
    pub fn arrange(
        &mut self,
        core: &[ModuleCode],
        electives: &[ModuleCode],
    ) -> Result<(), ArrangeError> {
        let core = self.resolve(core)?;
        let electives = self.resolve(electives)?;

        let planner = Planner::new(self.config);
        let plan = planner.arrange(&core, &electives, self.plan.exempted())?;
        self.plan = plan;
        Ok(())
    }

    fn resolve(
        &self,
        codes: &[ModuleCode],
    ) -> Result<Vec<crate::domain::ModuleCatalogEntry>, PlanError> {
        codes
            .iter()
            .map(|code| {
                self.catalog
                    .get(code)
                    .cloned()
                    .ok_or_else(|| PlanError::ModuleNotFound(code.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModuleCatalogEntry, PrerequisiteSet};

    fn code(raw: &str) -> ModuleCode {
        ModuleCode::new(raw).unwrap()
    }

    fn session() -> PlannerSession {
        let mut session = PlannerSession::new(PlanConfig::default());
        for (c, options) in [
            ("CS1010", Vec::new()),
            ("CS2040", vec![vec!["CS1010"]]),
            ("GER1000", Vec::new()),
        ] {
            let entry = ModuleCatalogEntry::new(
                code(c),
                format!("Module {c}"),
                4,
                "core".to_string(),
                Vec::new(),
                PrerequisiteSet::new(options).unwrap(),
            )
            .unwrap();
            session.catalog_mut().insert(entry);
        }
        session
    }

    #[test]
    fn place_resolves_codes_through_the_catalog() {
        let mut session = session();

        session
            .place(&code("CS1010"), Slot::new(0, 0))
            .expect("known module");

        let err = session
            .place(&code("CS9999"), Slot::new(0, 1))
            .expect_err("unknown module");
        assert!(matches!(err, PlanError::ModuleNotFound(_)));
    }

    #[test]
    fn arrange_replaces_the_plan() {
        let mut session = session();

        session
            .arrange(&[code("CS2040"), code("CS1010")], &[code("GER1000")])
            .expect("feasible set");

        assert_eq!(session.plan().len(), 3);
        let a = session.plan().slot_of(&code("CS1010")).unwrap();
        let b = session.plan().slot_of(&code("CS2040")).unwrap();
        assert!(a < b);
    }

    #[test]
    fn arrange_with_unknown_code_leaves_plan_untouched() {
        let mut session = session();
        session.place(&code("CS1010"), Slot::new(0, 0)).unwrap();

        let err = session
            .arrange(&[code("CS9999")], &[])
            .expect_err("unknown module");
        assert!(matches!(
            err,
            ArrangeError::Placement(PlanError::ModuleNotFound(_))
        ));
        assert_eq!(session.plan().len(), 1);
    }

    #[test]
    fn clear_keeps_the_catalog() {
        let mut session = session();
        session.place(&code("CS1010"), Slot::new(0, 0)).unwrap();
        session.exempt(code("GER1000")).unwrap();

        session.clear();

        assert!(session.plan().is_empty());
        assert!(session.plan().exempted().is_empty());
        assert_eq!(session.catalog().len(), 3);
    }
}
