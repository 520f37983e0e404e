//! Tree navigator: an indexed view over one immutable decision tree.
//!
//! Construction validates the tree and builds the id lookup; breadcrumb
//! trails and path labels are memoized per node id. The underlying tree is
//! never mutated, so cached results stay valid for the navigator's whole
//! lifetime and concurrent readers may race on first access without harm
//! (recomputing a pure function and overwriting is benign).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use itertools::Itertools;

use crate::error::{ViewerError, ViewerResult};
use crate::format::action_label;
use crate::tree::{validate, ActionKind, Tree, TreeNode};

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// One step of the ancestor path from the root to a node. The first entry
/// of every trail is the synthetic root entry labeled "Start" with no
/// action taken; each following entry carries the action that led into its
/// node and the seat that took it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbItem {
    pub node_id: String,
    pub label: String,
    pub acting_player: usize,
    pub action_taken: Option<ActionKind>,
}

/// An action a user can navigate into: has a target node. Actions without
/// a target terminate play and are not listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableAction {
    pub label: String,
    pub target_node: String,
    pub kind: ActionKind,
    pub amount: Option<u64>,
}

/// Aggregate descriptive counts over all indexed nodes. Branching factors
/// count actions-with-target on non-terminal nodes only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStatistics {
    pub total_nodes: usize,
    pub terminal_nodes: usize,
    pub max_depth: u32,
    pub avg_branching_factor: f64,
    pub max_branching_factor: usize,
    pub nodes_with_hand_data: usize,
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

pub struct TreeNavigator {
    tree: Tree,
    breadcrumb_cache: Mutex<HashMap<String, Vec<BreadcrumbItem>>>,
    path_cache: Mutex<HashMap<String, String>>,
}

impl TreeNavigator {
    /// Validate the tree and build a navigator over it. A tree that fails
    /// the integrity gate is refused outright.
    pub fn new(tree: Tree) -> ViewerResult<TreeNavigator> {
        let report = validate(&tree);
        if !report.valid {
            return Err(ViewerError::MalformedTree(report.errors));
        }
        Ok(TreeNavigator::new_unchecked(tree))
    }

    /// Build a navigator without running validation. The caller is
    /// responsible for having validated the tree; traversal guards still
    /// terminate on malformed input instead of hanging.
    pub fn new_unchecked(tree: Tree) -> TreeNavigator {
        TreeNavigator {
            tree,
            breadcrumb_cache: Mutex::new(HashMap::new()),
            path_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root_id(&self) -> &str {
        &self.tree.root
    }

    /// O(1) node lookup by id.
    pub fn node(&self, id: &str) -> ViewerResult<&TreeNode> {
        self.tree
            .nodes
            .get(id)
            .ok_or_else(|| ViewerError::NodeNotFound(id.to_string()))
    }

    /// The id of a seat's first (opening) decision node, from metadata.
    pub fn first_decision(&self, player: usize) -> Option<&str> {
        self.tree
            .metadata
            .first_decision
            .get(&player)
            .map(String::as_str)
    }

    /// Ancestor trail from the root to `node_id`, labeled by the action
    /// taken at each step. Cached per node id.
    pub fn breadcrumbs(&self, node_id: &str) -> ViewerResult<Vec<BreadcrumbItem>> {
        if let Some(hit) = self.lock_breadcrumbs().get(node_id) {
            return Ok(hit.clone());
        }

        let mut items = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut current = self.node(node_id)?;

        while let Some(parent_id) = current.parent.as_deref() {
            if !seen.insert(current.id.clone()) {
                return Err(ViewerError::CycleDetected(current.id.clone()));
            }
            let parent = self.node(parent_id)?;
            // First action in the parent whose target is the current node;
            // first match wins on trees predating the duplicate-target rule.
            let action = parent
                .actions
                .iter()
                .find(|a| a.node.as_deref() == Some(current.id.as_str()));
            items.push(BreadcrumbItem {
                node_id: current.id.clone(),
                label: match action {
                    Some(a) => action_label(a.kind, a.amount),
                    None => current.id.clone(),
                },
                acting_player: parent.acting_player,
                action_taken: action.map(|a| a.kind),
            });
            current = parent;
        }

        items.push(BreadcrumbItem {
            node_id: current.id.clone(),
            label: "Start".to_string(),
            acting_player: current.acting_player,
            action_taken: None,
        });
        items.reverse();

        self.lock_breadcrumbs()
            .insert(node_id.to_string(), items.clone());
        Ok(items)
    }

    /// Actions from `node_id` that lead to another node, in declaration
    /// order. The order is never changed: the UI lays buttons out in the
    /// order the solver declared them.
    pub fn available_actions(&self, node_id: &str) -> ViewerResult<Vec<AvailableAction>> {
        let node = self.node(node_id)?;
        Ok(node
            .actions
            .iter()
            .filter_map(|action| {
                action.node.as_ref().map(|target| AvailableAction {
                    label: action_label(action.kind, action.amount),
                    target_node: target.clone(),
                    kind: action.kind,
                    amount: action.amount,
                })
            })
            .collect())
    }

    /// Follow a sequence of action kinds from `start_id`, taking at each
    /// node the first action of the requested kind that has a target.
    pub fn navigate_by_path(
        &self,
        start_id: &str,
        kinds: &[ActionKind],
    ) -> ViewerResult<String> {
        let mut current = self.node(start_id)?;
        for kind in kinds {
            let target = current
                .actions
                .iter()
                .find(|a| a.kind == *kind && a.node.is_some())
                .and_then(|a| a.node.as_deref())
                .ok_or_else(|| {
                    ViewerError::NodeNotFound(format!(
                        "no '{}' action with a target at node '{}'",
                        kind.as_str(),
                        current.id
                    ))
                })?;
            current = self.node(target)?;
        }
        Ok(current.id.clone())
    }

    /// All terminal nodes reachable from `start_id` through action targets.
    /// The walk tracks visited ids so malformed (cyclic) input terminates,
    /// and a back edge is reported as a cycle instead of being ignored.
    pub fn terminal_nodes(&self, start_id: &str) -> ViewerResult<BTreeSet<String>> {
        self.node(start_id)?;
        let mut visited = HashSet::new();
        let mut on_path = HashSet::new();
        let mut found = BTreeSet::new();
        self.collect_terminals(start_id, &mut visited, &mut on_path, &mut found)?;
        Ok(found)
    }

    fn collect_terminals(
        &self,
        id: &str,
        visited: &mut HashSet<String>,
        on_path: &mut HashSet<String>,
        found: &mut BTreeSet<String>,
    ) -> ViewerResult<()> {
        if on_path.contains(id) {
            return Err(ViewerError::CycleDetected(id.to_string()));
        }
        if !visited.insert(id.to_string()) {
            return Ok(());
        }
        let node = self.node(id)?;
        if node.flags.terminal {
            found.insert(id.to_string());
        }
        on_path.insert(id.to_string());
        for action in &node.actions {
            if let Some(target) = action.node.as_deref() {
                self.collect_terminals(target, visited, on_path, found)?;
            }
        }
        on_path.remove(id);
        Ok(())
    }

    /// Breadcrumb labels joined with " > ", excluding the synthetic root
    /// entry; "Root" for the root itself. Cached per node id.
    pub fn path_label(&self, node_id: &str) -> ViewerResult<String> {
        if let Some(hit) = self.lock_paths().get(node_id) {
            return Ok(hit.clone());
        }
        let crumbs = self.breadcrumbs(node_id)?;
        let label = if crumbs.len() <= 1 {
            "Root".to_string()
        } else {
            crumbs.iter().skip(1).map(|c| c.label.as_str()).join(" > ")
        };
        self.lock_paths()
            .insert(node_id.to_string(), label.clone());
        Ok(label)
    }

    pub fn statistics(&self) -> TreeStatistics {
        let mut stats = TreeStatistics {
            total_nodes: self.tree.nodes.len(),
            ..TreeStatistics::default()
        };
        let mut branching_total = 0usize;
        let mut branching_nodes = 0usize;
        for node in self.tree.nodes.values() {
            stats.max_depth = stats.max_depth.max(node.depth);
            if node.flags.terminal {
                stats.terminal_nodes += 1;
            } else {
                let fanout = node.actions.iter().filter(|a| a.node.is_some()).count();
                branching_total += fanout;
                stats.max_branching_factor = stats.max_branching_factor.max(fanout);
                branching_nodes += 1;
            }
            if node.flags.has_hand_data {
                stats.nodes_with_hand_data += 1;
            }
        }
        if branching_nodes > 0 {
            stats.avg_branching_factor = branching_total as f64 / branching_nodes as f64;
        }
        stats
    }

    /// Drop the breadcrumb and path-label caches. The node index stays;
    /// it is rebuilt only by constructing a new navigator.
    pub fn clear_caches(&self) {
        self.lock_breadcrumbs().clear();
        self.lock_paths().clear();
    }

    // Cached values are pure functions of the immutable tree, so a map
    // left behind by a panicked holder is still coherent; recover it
    // rather than propagating the poison.
    fn lock_breadcrumbs(&self) -> MutexGuard<'_, HashMap<String, Vec<BreadcrumbItem>>> {
        self.breadcrumb_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_paths(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.path_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
