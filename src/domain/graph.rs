//! The dependency graph over a working set of modules.
//!
//! The graph is rebuilt from scratch whenever a membership query needs to
//! reason about the whole set; it is never incrementally maintained. Nodes
//! are module codes, not entry references — entries are resolved through the
//! catalog on demand, so there are no shared mutable references between the
//! graph and the plan.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::{
    algo::{is_cyclic_directed, tarjan_scc},
    graph::{DiGraph, NodeIndex},
};

use crate::domain::{ModuleCatalogEntry, ModuleCode};

/// A dependency graph built from a working set of modules plus the exemption
/// list.
///
/// Edges point from a module to each of its prerequisites that appear in the
/// working set. Every working-set module is present as a node even when it
/// has no edges. Cycles are representable — construction does not reject
/// them — and are surfaced through [`Self::has_cycles`] and [`Self::cycles`].
#[derive(Debug)]
pub struct PrerequisiteGraph {
    /// Edges point from a module to its in-set prerequisites.
    graph: DiGraph<ModuleCode, ()>,
    indices: BTreeMap<ModuleCode, NodeIndex>,
    completed: BTreeSet<ModuleCode>,
    exempted: BTreeSet<ModuleCode>,
}

impl PrerequisiteGraph {
    /// Builds the graph over `working_set`, treating its members as completed
    /// for planning purposes.
    ///
    /// Prerequisite tokens resolve to working-set codes (wildcards resolve to
    /// every matching code). Exempted codes never produce edges: they are
    /// already satisfied and must not gate anything.
    pub fn build<'a, I>(working_set: I, exempted: BTreeSet<ModuleCode>) -> Self
    where
        I: IntoIterator<Item = &'a ModuleCatalogEntry>,
    {
        let entries: Vec<&ModuleCatalogEntry> = working_set.into_iter().collect();
        let completed: BTreeSet<ModuleCode> =
            entries.iter().map(|entry| entry.code().clone()).collect();

        let mut graph = DiGraph::new();
        let mut indices = BTreeMap::new();

        for code in &completed {
            let index = graph.add_node(code.clone());
            indices.insert(code.clone(), index);
        }

        for entry in &entries {
            let Some(&from) = indices.get(entry.code()) else {
                continue;
            };
            for prereq in entry.prerequisites().referenced_codes(&completed) {
                if prereq == *entry.code() || exempted.contains(&prereq) {
                    continue;
                }
                if let Some(&to) = indices.get(&prereq) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        Self {
            graph,
            indices,
            completed,
            exempted,
        }
    }

    /// The codes of the working set the graph was built from.
    #[must_use]
    pub const fn completed(&self) -> &BTreeSet<ModuleCode> {
        &self.completed
    }

    /// Returns `true` if the candidate's prerequisites are satisfied by the
    /// working set plus the exemption list.
    #[must_use]
    pub fn prerequisites_met(&self, candidate: &ModuleCatalogEntry) -> bool {
        candidate
            .prerequisites()
            .is_satisfied(&self.completed, &self.exempted)
    }

    /// The flattened prerequisite map: every working-set code mapped to its
    /// in-set prerequisites.
    ///
    /// Codes with no prerequisites map to an empty set, so the map's key set
    /// is exactly the working set.
    #[must_use]
    pub fn prerequisite_map(&self) -> BTreeMap<ModuleCode, BTreeSet<ModuleCode>> {
        self.indices
            .iter()
            .map(|(code, &index)| {
                let prerequisites = self
                    .graph
                    .neighbors(index)
                    .map(|neighbor| self.graph[neighbor].clone())
                    .collect();
                (code.clone(), prerequisites)
            })
            .collect()
    }

    /// Finds the future modules that would lose a satisfied requirement if
    /// `removed` were taken out of the working set.
    ///
    /// A module is reported when its requirement is satisfied before the
    /// removal but not after it. Modules that were already unsatisfied are
    /// not reported; removal cannot make them worse.
    #[must_use]
    pub fn broken_dependents<'a, I>(
        &self,
        removed: &ModuleCode,
        future: I,
    ) -> Vec<&'a ModuleCatalogEntry>
    where
        I: IntoIterator<Item = &'a ModuleCatalogEntry>,
    {
        let mut remaining = self.completed.clone();
        remaining.remove(removed);

        future
            .into_iter()
            .filter(|module| module.code() != removed)
            .filter(|module| {
                let requirement = module.prerequisites();
                requirement.is_satisfied(&self.completed, &self.exempted)
                    && !requirement.is_satisfied(&remaining, &self.exempted)
            })
            .collect()
    }

    /// Determines whether the graph contains any prerequisite cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns all cycles in the graph as sorted sets of module codes.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<ModuleCode>> {
        let mut cycles = Vec::new();

        for component in tarjan_scc(&self.graph) {
            if component.len() > 1 {
                let mut codes: Vec<_> = component
                    .iter()
                    .map(|&index| self.graph[index].clone())
                    .collect();
                codes.sort();
                cycles.push(codes);
                continue;
            }

            let Some(&node) = component.first() else {
                continue;
            };

            if self.graph.contains_edge(node, node) {
                cycles.push(vec![self.graph[node].clone()]);
            }
        }

        cycles.sort();
        cycles
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

    #[test]
    fn isolated_modules_appear_as_keys() {
        let a = module("CS1010", &[]);
        let graph = PrerequisiteGraph::build([&a], BTreeSet::new());

        let map = graph.prerequisite_map();
        assert_eq!(map.len(), 1);
        assert!(map[&code("CS1010")].is_empty());
    }

    #[test]
    fn edges_resolve_literals_and_wildcards_within_the_set() {
        let a = module("CS1010", &[]);
        let b = module("CS2040", &[&["CS1010"]]);
        let c = module("CS2100", &[&["CS1%"]]);
        // References a code outside the working set: no edge.
        let d = module("CS3230", &[&["MA9999"]]);

        let graph = PrerequisiteGraph::build([&a, &b, &c, &d], BTreeSet::new());
        let map = graph.prerequisite_map();

        assert_eq!(map[&code("CS2040")], BTreeSet::from([code("CS1010")]));
        assert_eq!(map[&code("CS2100")], BTreeSet::from([code("CS1010")]));
        assert!(map[&code("CS3230")].is_empty());
    }

    #[test]
    fn exempted_codes_do_not_gate() {
        let a = module("CS1010", &[]);
        let b = module("CS2040", &[&["CS1010"]]);

        let exempted = BTreeSet::from([code("CS1010")]);
        let graph = PrerequisiteGraph::build([&a, &b], exempted);

        assert!(graph.prerequisite_map()[&code("CS2040")].is_empty());
    }

    #[test]
    fn prerequisites_met_evaluates_against_working_set_and_exemptions() {
        let a = module("CS1010", &[]);
        let graph = PrerequisiteGraph::build([&a], BTreeSet::from([code("MA1521")]));

        let ok = module("CS2040", &[&["CS1010"]]);
        let also_ok = module("MA2001", &[&["MA1521"]]);
        let not_ok = module("CS3230", &[&["CS2040"]]);

        assert!(graph.prerequisites_met(&ok));
        assert!(graph.prerequisites_met(&also_ok));
        assert!(!graph.prerequisites_met(&not_ok));
    }

    #[test]
    fn broken_dependents_reports_only_newly_unsatisfied_modules() {
        let a = module("CS1010", &[]);
        let b = module("CS2040", &[&["CS1010"]]);
        // Satisfied through either option; survives losing one of them.
        let c = module("CS2030", &[&["CS1010"], &["CS2040"]]);

        let graph = PrerequisiteGraph::build([&a, &b, &c], BTreeSet::new());

        let broken = graph.broken_dependents(&code("CS1010"), [&b, &c]);
        let broken_codes: Vec<_> = broken.iter().map(|m| m.code().clone()).collect();
        assert_eq!(broken_codes, vec![code("CS2040")]);

        assert!(graph.broken_dependents(&code("CS2030"), [&a, &b]).is_empty());
    }

    #[test]
    fn detects_cycles() {
        let a = module("CS1010", &[&["CS2040"]]);
        let b = module("CS2040", &[&["CS1010"]]);
        let c = module("GER1000", &[]);

        let graph = PrerequisiteGraph::build([&a, &b, &c], BTreeSet::new());

        assert!(graph.has_cycles());
        assert_eq!(
            graph.cycles(),
            vec![vec![code("CS1010"), code("CS2040")]]
        );
    }

    #[test]
    fn acyclic_graph_reports_no_cycles() {
        let a = module("CS1010", &[]);
        let b = module("CS2040", &[&["CS1010"]]);

        let graph = PrerequisiteGraph::build([&a, &b], BTreeSet::new());

        assert!(!graph.has_cycles());
        assert!(graph.cycles().is_empty());
    }
}
