//! The planning model: module records, prerequisite logic, the schedule grid
//! and the topological planner.

mod code;
mod config;
mod graph;
mod module;
mod planner;
mod prereq;
mod schedule;
mod session;

pub use code::{InvalidCodeError, ModuleCode};
pub use config::PlanConfig;
pub use graph::PrerequisiteGraph;
pub use module::{Catalog, InvalidCreditsError, ModuleCatalogEntry, MAX_CREDITS};
pub use planner::{ArrangeError, Planner};
pub use prereq::{InvalidTokenError, PrerequisiteSet, UnmetPrerequisite};
pub use schedule::{PlanError, Placement, RemovalReport, SchedulePlan, Slot};
pub use session::PlannerSession;
