// src/dag/graph.rs

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::task_info::TaskDef;
use crate::engine::TaskName;
use crate::errors::ValidationError;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Direct dependencies: tasks that must finish before this one can run.
    deps: Vec<TaskName>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskName>,
}

/// Validated, acyclic task graph keyed by task id.
///
/// Construction through [`TaskGraph::from_defs`] is the only way to get one,
/// so every value of this type satisfies:
/// - ids are present and unique
/// - every dependency refers to a task in the same submission
/// - there are no cycles
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: HashMap<TaskName, DagNode>,
    /// Submission order, used wherever output must be deterministic.
    order: Vec<TaskName>,
}

impl TaskGraph {
    /// Build and validate a graph from submitted task definitions.
    ///
    /// Checks run in this order and stop at the first problem:
    /// 1. missing / empty id
    /// 2. duplicate id
    /// 3. unknown dependency
    /// 4. cycle
    ///
    /// Duplicate entries within one `depends_on` list are dropped.
    pub fn from_defs(defs: &[TaskDef]) -> Result<Self, ValidationError> {
        let mut nodes: HashMap<TaskName, DagNode> = HashMap::new();
        let mut order = Vec::with_capacity(defs.len());

        for (index, def) in defs.iter().enumerate() {
            let id = match def.id.as_deref() {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => return Err(ValidationError::MissingId { index }),
            };

            if nodes.contains_key(&id) {
                return Err(ValidationError::DuplicateId(id));
            }

            let mut seen = HashSet::new();
            let deps: Vec<TaskName> = def
                .depends_on
                .iter()
                .filter(|dep| seen.insert(dep.as_str()))
                .cloned()
                .collect();

            nodes.insert(
                id.clone(),
                DagNode {
                    deps,
                    dependents: Vec::new(),
                },
            );
            order.push(id);
        }

        // Unknown dependencies, reported in submission order.
        for id in &order {
            for dep in &nodes[id].deps {
                if !nodes.contains_key(dep) {
                    return Err(ValidationError::UnknownDependency {
                        task: id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        // Populate dependents in submission order.
        for id in &order {
            let deps = nodes[id].deps.clone();
            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(id.clone());
                }
            }
        }

        let graph = Self { nodes, order };
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// Cycle detection via petgraph's topological sort.
    ///
    /// Edge direction: dep -> task. A self-dependency is a cycle as well.
    fn check_acyclic(&self) -> Result<(), ValidationError> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for id in &self.order {
            graph.add_node(id.as_str());
        }

        for id in &self.order {
            for dep in self.dependencies_of(id) {
                graph.add_edge(dep.as_str(), id.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(ValidationError::Cycle(cycle.node_id().to_string())),
        }
    }

    /// All task ids in submission order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Immediate dependencies of a task (its `depends_on`).
    pub fn dependencies_of(&self, id: &str) -> &[TaskName] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks listing it in `depends_on`).
    pub fn dependents_of(&self, id: &str) -> &[TaskName] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks with no dependencies, in submission order.
    pub fn roots(&self) -> Vec<TaskName> {
        self.order
            .iter()
            .filter(|id| self.dependencies_of(id).is_empty())
            .cloned()
            .collect()
    }

    /// Layer the graph with Kahn's algorithm.
    ///
    /// Every task in level `n` depends only on tasks from levels `< n`. Within
    /// a level tasks keep submission order. This is a planning view (dry run);
    /// the runtime releases tasks incrementally instead.
    pub fn levels(&self) -> Vec<Vec<TaskName>> {
        let mut in_degree: HashMap<&str, usize> = self
            .order
            .iter()
            .map(|id| (id.as_str(), self.dependencies_of(id).len()))
            .collect();

        let mut levels = Vec::new();
        let mut current = self.roots();

        while !current.is_empty() {
            let mut released: HashSet<&str> = HashSet::new();

            for id in &current {
                for dependent in self.dependents_of(id) {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree -= 1;
                        if *degree == 0 {
                            released.insert(dependent.as_str());
                        }
                    }
                }
            }

            levels.push(current);

            current = self
                .order
                .iter()
                .filter(|id| released.contains(id.as_str()))
                .cloned()
                .collect();
        }

        levels
    }
}
