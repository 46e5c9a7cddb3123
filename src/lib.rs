//! Multi-year academic module planning.
//!
//! A study plan is a grid of years and terms into which modules are placed.
//! Each module carries a prerequisite requirement (an OR-of-AND combination
//! of module codes), and the plan only accepts placements whose prerequisites
//! are met by the modules already placed or by the student's exemptions.
//! Plans and the module catalog are persisted as length-prefixed text records.

pub mod domain;
pub use domain::{
    ArrangeError, Catalog, ModuleCatalogEntry, ModuleCode, PlanConfig, PlanError, Planner,
    PlannerSession, PrerequisiteGraph, PrerequisiteSet, RemovalReport, SchedulePlan, Slot,
};

pub mod storage;
pub use storage::{codec, Directory};
