//! Serialized decision-tree model and integrity validation.
//!
//! The tree payload is produced by the external solver and fetched as JSON.
//! Nodes are keyed by string id and reference each other through parent
//! links and per-action target ids; this module owns the wire schema and
//! the integrity gate (`validate`) that a tree must pass before it is
//! handed to a navigator.

use std::collections::{HashMap, HashSet};

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::ViewerResult;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Closed set of betting actions, encoded on the wire as the solver's
/// single-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "F")]
    Fold,
    #[serde(rename = "C")]
    Call,
    #[serde(rename = "X")]
    Check,
    #[serde(rename = "R")]
    Raise,
    #[serde(rename = "A")]
    AllIn,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Fold => "F",
            ActionKind::Call => "C",
            ActionKind::Check => "X",
            ActionKind::Raise => "R",
            ActionKind::AllIn => "A",
        }
    }

    pub fn from_letter(c: char) -> Option<ActionKind> {
        match c.to_ascii_uppercase() {
            'F' => Some(ActionKind::Fold),
            'C' => Some(ActionKind::Call),
            'X' => Some(ActionKind::Check),
            'R' => Some(ActionKind::Raise),
            'A' => Some(ActionKind::AllIn),
            _ => None,
        }
    }

    /// Whether this action moves chips into the pot.
    pub fn wagers(&self) -> bool {
        matches!(
            self,
            ActionKind::Call | ActionKind::Raise | ActionKind::AllIn
        )
    }
}

/// One available action from a node. `amount` is present only for actions
/// with a non-zero wager; `node` is absent for actions that terminate play
/// (a fold, or a final call).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
}

// ---------------------------------------------------------------------------
// Node flags
// ---------------------------------------------------------------------------

const FLAG_TERMINAL: u8 = 1;
const FLAG_HAND_DATA: u8 = 1 << 1;

/// Terminal / hand-data-availability indicators. The wire packs these into
/// one integer; in memory they are plain booleans, converted only at the
/// serde boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags {
    pub terminal: bool,
    pub has_hand_data: bool,
}

impl NodeFlags {
    pub fn from_bits(bits: u8) -> NodeFlags {
        NodeFlags {
            terminal: bits & FLAG_TERMINAL != 0,
            has_hand_data: bits & FLAG_HAND_DATA != 0,
        }
    }

    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.terminal {
            bits |= FLAG_TERMINAL;
        }
        if self.has_hand_data {
            bits |= FLAG_HAND_DATA;
        }
        bits
    }
}

impl Serialize for NodeFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.to_bits())
    }
}

impl<'de> Deserialize<'de> for NodeFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(NodeFlags::from_bits(u8::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// Nodes and tree
// ---------------------------------------------------------------------------

/// A decision point in the game tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(rename = "actingPlayer")]
    pub acting_player: usize,
    /// Street phase: 0=preflop, 1=flop, 2=turn, 3=river. Never decreases
    /// from parent to child.
    pub street: u8,
    /// Distance from the root; root is 0.
    pub depth: u32,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub flags: NodeFlags,
}

/// Aggregate counts carried alongside the node table, plus the jump table
/// from player index to that seat's first decision node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeMetadata {
    pub total_nodes: usize,
    pub terminal_nodes: usize,
    pub max_depth: u32,
    pub player_count: usize,
    #[serde(default)]
    pub first_decision: HashMap<usize, String>,
}

/// One complete decision tree as fetched from storage. Immutable once
/// loaded; discarded when the spot view closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: HashMap<String, TreeNode>,
    pub root: String,
    #[serde(default)]
    pub metadata: TreeMetadata,
}

impl Tree {
    pub fn from_json(bytes: &[u8]) -> ViewerResult<Tree> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Outcome of the integrity gate. `errors` accumulates every violation
/// found rather than stopping at the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check that the node table actually forms a tree rooted at the declared
/// root: the root id resolves, every parent and action-target reference
/// resolves, no node's action list targets the same child twice, exactly
/// one node is parentless (and it is the root), parent chains do not cycle,
/// and depth/street are consistent along parent links.
///
/// A tree that fails this gate must not be handed to a navigator.
pub fn validate(tree: &Tree) -> ValidationReport {
    let mut errors = Vec::new();

    if !tree.nodes.contains_key(&tree.root) {
        errors.push(format!("declared root '{}' is not a node id", tree.root));
    }

    let mut parentless: Vec<&str> = tree
        .nodes
        .values()
        .filter(|n| n.parent.is_none())
        .map(|n| n.id.as_str())
        .collect();
    parentless.sort_unstable();
    if parentless.is_empty() {
        errors.push("no parentless node: tree has no root".to_string());
    } else if parentless.len() > 1 {
        errors.push(format!(
            "multiple parentless nodes: {}",
            parentless.join(", ")
        ));
    } else if parentless[0] != tree.root {
        errors.push(format!(
            "parentless node '{}' does not match declared root '{}'",
            parentless[0], tree.root
        ));
    }

    // Sorted iteration keeps error output deterministic.
    let mut ids: Vec<&String> = tree.nodes.keys().collect();
    ids.sort_unstable();

    for id in &ids {
        let node = &tree.nodes[*id];
        if node.id != **id {
            errors.push(format!(
                "node keyed '{}' declares id '{}'",
                id, node.id
            ));
        }
        match &node.parent {
            Some(parent_id) => match tree.nodes.get(parent_id) {
                Some(parent) => {
                    if node.depth != parent.depth + 1 {
                        errors.push(format!(
                            "node '{}' depth {} is not parent depth {} + 1",
                            id, node.depth, parent.depth
                        ));
                    }
                    if node.street < parent.street {
                        errors.push(format!(
                            "node '{}' street {} precedes parent street {}",
                            id, node.street, parent.street
                        ));
                    }
                }
                None => errors.push(format!(
                    "node '{}' references missing parent '{}'",
                    id, parent_id
                )),
            },
            None => {
                if node.depth != 0 {
                    errors.push(format!(
                        "parentless node '{}' has nonzero depth {}",
                        id, node.depth
                    ));
                }
            }
        }

        let mut seen_targets = HashSet::new();
        for (index, action) in node.actions.iter().enumerate() {
            if let Some(target) = &action.node {
                if !tree.nodes.contains_key(target) {
                    errors.push(format!(
                        "node '{}' action {} targets missing node '{}'",
                        id, index, target
                    ));
                }
                if !seen_targets.insert(target.as_str()) {
                    errors.push(format!(
                        "node '{}' action {} duplicates target '{}'",
                        id, index, target
                    ));
                }
            }
        }
    }

    // Parent chains must terminate without revisiting a node. Chains that
    // reach an already-verified node are known good, so each node is walked
    // at most once overall.
    let mut verified: HashSet<&str> = HashSet::new();
    for id in &ids {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut current = tree.nodes.get(*id);
        while let Some(node) = current {
            if verified.contains(node.id.as_str()) {
                break;
            }
            if !on_path.insert(node.id.as_str()) {
                errors.push(format!(
                    "parent chain from '{}' cycles at '{}'",
                    id, node.id
                ));
                break;
            }
            path.push(node.id.as_str());
            current = node.parent.as_ref().and_then(|p| tree.nodes.get(p));
        }
        verified.extend(path);
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
