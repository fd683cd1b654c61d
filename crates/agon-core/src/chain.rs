//! # Relationship Graph Engine
//!
//! Derives directed, typed edges between argument records and builds
//! bounded-depth chains from a root.
//!
//! Edges are derived, never persisted: every query reconstructs them by
//! scanning records whose target field matches. Recomputation is the
//! source of truth — this trades query cost for simplicity and avoids
//! edge-consistency drift (see DESIGN.md).
//!
//! Chain construction walks breadth-first over an arena of nodes with
//! an explicit work-list and a per-traversal visited-set; language-level
//! recursion is never unbounded. A node already visited within the
//! current traversal is not re-expanded, so even a cyclic record set
//! terminates.

use crate::primitives::{
    CONCESSION_CONDITIONAL_STRENGTH, CONCESSION_FULL_STRENGTH, CONCESSION_PARTIAL_STRENGTH,
    KIND_MATCH_BONUS, LENGTH_RATIO_CAP, MAX_CHAIN_DEPTH, REBUTTAL_BASE_STRENGTH, SUPPORT_STRENGTH,
};
use crate::records::{
    Argument, ArgumentKind, Concession, ConcessionKind, Rebuttal, RebuttalKind, Record, RecordKind,
};
use crate::store::{Collection, ObjectStore};
use crate::types::{AgentId, AgonError, ContentHash, Strength};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// EDGES
// =============================================================================

/// Type of a directed relationship between two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// The source rebuts the target.
    Rebuts,
    /// The source concedes to the target.
    ConcedesTo,
    /// The source supports the target.
    Supports,
    /// The source elaborates on the target. Not produced by
    /// derivation; available to callers that tag edges directly.
    Elaborates,
}

impl EdgeKind {
    /// Wire name of the edge kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rebuts => "rebuts",
            Self::ConcedesTo => "concedes_to",
            Self::Supports => "supports",
            Self::Elaborates => "elaborates",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A directed, typed, weighted relationship between two records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Origin record.
    pub from: ContentHash,
    /// Target record.
    pub to: ContentHash,
    /// Relationship type.
    pub kind: EdgeKind,
    /// Heuristic strength in permille.
    pub strength: Strength,
}

impl Edge {
    /// Create an edge, rejecting self-loops.
    pub fn new(
        from: ContentHash,
        to: ContentHash,
        kind: EdgeKind,
        strength: Strength,
    ) -> Result<Self, AgonError> {
        if from == to {
            return Err(AgonError::Validation(format!(
                "self-loop edge on {}",
                from.short()
            )));
        }
        Ok(Self {
            from,
            to,
            kind,
            strength,
        })
    }
}

// =============================================================================
// LINK VALIDATION
// =============================================================================

/// Validate that `source` may form an edge against `target`.
///
/// Invariants enforced before an edge may be created:
/// - source and target must belong to the same debate session;
/// - a rebuttal or concession may not be directed at a record by the
///   same author. Self-rebuttal is a business-rule fault, not a silent
///   drop.
pub fn validate_link(source: &Record, target: &Record) -> Result<(), AgonError> {
    if source.debate() != target.debate() {
        return Err(AgonError::Validation(format!(
            "cross-session link: source in `{}`, target in `{}`",
            source.debate(),
            target.debate()
        )));
    }
    match source.kind() {
        RecordKind::Rebuttal | RecordKind::Concession => {
            if source.author() == target.author() {
                return Err(AgonError::BusinessRule(format!(
                    "agent `{}` may not {} their own record",
                    source.author(),
                    if source.kind() == RecordKind::Rebuttal {
                        "rebut"
                    } else {
                        "concede to"
                    }
                )));
            }
        }
        RecordKind::Argument => {}
    }
    Ok(())
}

// =============================================================================
// STRENGTH HEURISTIC
// =============================================================================

/// Strength of a rebuttal edge against its target argument.
///
/// Base 0.5, +0.2 when an empirical rebuttal meets an empirical
/// argument, +0.2 when a logical rebuttal meets a deductive argument,
/// plus a text-length-ratio adjustment capped at +/-0.1. Clamped onto
/// the scale. All permille integer arithmetic.
#[must_use]
pub fn rebuttal_strength(rebuttal: &Rebuttal, target: &Argument) -> Strength {
    let mut permille = REBUTTAL_BASE_STRENGTH as i64;

    if rebuttal.kind == RebuttalKind::Empirical && target.kind == ArgumentKind::Empirical {
        permille = permille.saturating_add(KIND_MATCH_BONUS as i64);
    }
    if rebuttal.kind == RebuttalKind::Logical && target.kind == ArgumentKind::Deductive {
        permille = permille.saturating_add(KIND_MATCH_BONUS as i64);
    }

    permille = permille.saturating_add(length_ratio_adjustment(
        rebuttal.text.len(),
        target.text.len(),
    ));

    Strength::from_signed(permille)
}

/// Signed permille adjustment from the rebuttal/target text-length
/// ratio: 10% longer contributes +0.010, capped at +/-0.1.
fn length_ratio_adjustment(rebuttal_len: usize, target_len: usize) -> i64 {
    let target = target_len.max(1) as i64;
    let ratio_permille = (rebuttal_len as i64).saturating_mul(1000) / target;
    ((ratio_permille - 1000) / 10).clamp(-LENGTH_RATIO_CAP, LENGTH_RATIO_CAP)
}

/// Strength of a concession edge, fixed by concession kind.
#[must_use]
pub fn concession_strength(kind: ConcessionKind) -> Strength {
    Strength::new(match kind {
        ConcessionKind::Full => CONCESSION_FULL_STRENGTH,
        ConcessionKind::Partial => CONCESSION_PARTIAL_STRENGTH,
        ConcessionKind::Conditional => CONCESSION_CONDITIONAL_STRENGTH,
    })
}

/// Edge kind contributed by a record, classified by its discriminant.
fn classify(record: &Record) -> EdgeKind {
    match record.kind() {
        RecordKind::Rebuttal => EdgeKind::Rebuts,
        RecordKind::Concession => EdgeKind::ConcedesTo,
        RecordKind::Argument => EdgeKind::Supports,
    }
}

/// Strength of the edge a record forms against its (possibly absent)
/// target record. A missing or non-argument target degrades the
/// rebuttal heuristic to its base value.
fn edge_strength(source: &Record, target: Option<&Record>) -> Strength {
    match source {
        Record::Rebuttal(r) => match target {
            Some(Record::Argument(a)) => rebuttal_strength(r, a),
            _ => Strength::new(REBUTTAL_BASE_STRENGTH),
        },
        Record::Concession(c) => concession_strength(c.kind),
        Record::Argument(_) => Strength::new(SUPPORT_STRENGTH),
    }
}

// =============================================================================
// EDGE DERIVATION
// =============================================================================

/// Load and decode a record, treating undecodable payloads as absent.
///
/// Chain expansion degrades a broken reference to a leaf instead of
/// aborting the traversal; storage faults still propagate.
fn load_record<S: ObjectStore>(
    store: &S,
    id: &ContentHash,
) -> Result<Option<Record>, AgonError> {
    match store.get(Collection::Arguments, id)? {
        Some(bytes) => Ok(Record::decode(&bytes).ok()),
        None => Ok(None),
    }
}

/// Find all edges directed at `target`: one scan of the arguments
/// collection, one typed edge per record whose target field matches.
pub fn derive_edges<S: ObjectStore>(
    store: &S,
    target: &ContentHash,
) -> Result<Vec<Edge>, AgonError> {
    let target_record = load_record(store, target)?;

    let mut edges = Vec::new();
    for key in store.list_keys(Collection::Arguments)? {
        let Some(record) = load_record(store, &key)? else {
            continue;
        };
        if record.target() != Some(target) || key == *target {
            continue;
        }
        let strength = edge_strength(&record, target_record.as_ref());
        edges.push(Edge::new(key, target.clone(), classify(&record), strength)?);
    }
    Ok(edges)
}

/// Derive the full edge set of the archive, for the standalone cycle
/// audit and whole-graph reporting.
pub fn collect_edges<S: ObjectStore>(store: &S) -> Result<Vec<Edge>, AgonError> {
    // One scan into a record map, then derive edges against it so
    // rebuttal strength can see its target.
    let mut records: BTreeMap<ContentHash, Record> = BTreeMap::new();
    for key in store.list_keys(Collection::Arguments)? {
        if let Some(record) = load_record(store, &key)? {
            records.insert(key, record);
        }
    }

    let mut edges = Vec::new();
    for (key, record) in &records {
        let Some(target) = record.target() else {
            continue;
        };
        if target == key {
            continue;
        }
        let strength = edge_strength(record, records.get(target));
        edges.push(Edge::new(
            key.clone(),
            target.clone(),
            classify(record),
            strength,
        )?);
    }
    Ok(edges)
}

// =============================================================================
// CHAIN CONSTRUCTION
// =============================================================================

/// One node of a constructed chain, held in the chain's arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNode {
    /// The record's content hash.
    pub id: ContentHash,
    /// Record kind, for metadata annotation.
    pub kind: RecordKind,
    /// Record author, for metadata annotation.
    pub author: AgentId,
    /// Depth below the root (root = 0).
    pub depth: usize,
    /// The edge that reached this node from its parent; `None` at the
    /// root.
    pub edge: Option<(EdgeKind, Strength)>,
    /// Arena indices of this node's children.
    pub children: Vec<usize>,
}

/// Statistics computed after chain construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    /// Total node count, including the root.
    pub total_nodes: usize,
    /// Deepest level actually reached; may be less than the requested
    /// bound when the real graph is shallower.
    pub max_depth_reached: usize,
}

/// A bounded-depth tree of an argument and its descendant edges.
///
/// Arena representation: `nodes[root]` is the root; children are
/// arena indices. Sibling order is stable within a single call given
/// stable storage contents, but not guaranteed across backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Arena of nodes.
    pub nodes: Vec<ChainNode>,
    /// Index of the root node (always 0).
    pub root: usize,
    /// Derived statistics.
    pub stats: ChainStats,
}

/// Build the chain rooted at `root`, expanding children breadth-first
/// level by level up to `max_depth`.
///
/// - Depth requests above `MAX_CHAIN_DEPTH` are clamped, not rejected.
/// - Returns `Ok(None)` when the root record does not exist.
/// - A single scan of the arguments collection builds a per-call
///   origin snapshot; missing or unreadable children degrade to
///   leaves rather than aborting the traversal.
pub fn build_chain<S: ObjectStore>(
    store: &S,
    root: &ContentHash,
    max_depth: usize,
) -> Result<Option<Chain>, AgonError> {
    let depth_bound = max_depth.min(MAX_CHAIN_DEPTH);

    let Some(root_record) = load_record(store, root)? else {
        return Ok(None);
    };

    // Per-call snapshot: target -> [(child id, child record)].
    let mut children_of: BTreeMap<ContentHash, Vec<(ContentHash, Record)>> = BTreeMap::new();
    for key in store.list_keys(Collection::Arguments)? {
        let Some(record) = load_record(store, &key)? else {
            continue;
        };
        if let Some(target) = record.target() {
            if *target != key {
                children_of
                    .entry(target.clone())
                    .or_default()
                    .push((key, record));
            }
        }
    }

    let mut nodes = vec![ChainNode {
        id: root.clone(),
        kind: root_record.kind(),
        author: root_record.author().clone(),
        depth: 0,
        edge: None,
        children: Vec::new(),
    }];

    let mut visited = BTreeSet::new();
    visited.insert(root.clone());

    // Work-list BFS: (arena index, record, depth).
    let mut queue: VecDeque<(usize, Record, usize)> = VecDeque::new();
    queue.push_back((0, root_record, 0));

    while let Some((parent_idx, parent_record, depth)) = queue.pop_front() {
        if depth >= depth_bound {
            continue;
        }
        let parent_id = nodes[parent_idx].id.clone();
        let Some(kids) = children_of.remove(&parent_id) else {
            continue;
        };
        for (child_id, child_record) in kids {
            if visited.contains(&child_id) {
                continue;
            }
            visited.insert(child_id.clone());

            let edge_kind = classify(&child_record);
            let strength = edge_strength(&child_record, Some(&parent_record));

            let child_idx = nodes.len();
            nodes.push(ChainNode {
                id: child_id,
                kind: child_record.kind(),
                author: child_record.author().clone(),
                depth: depth.saturating_add(1),
                edge: Some((edge_kind, strength)),
                children: Vec::new(),
            });
            nodes[parent_idx].children.push(child_idx);
            queue.push_back((child_idx, child_record, depth.saturating_add(1)));
        }
    }

    let stats = ChainStats {
        total_nodes: nodes.len(),
        max_depth_reached: nodes.iter().map(|n| n.depth).max().unwrap_or(0),
    };

    Ok(Some(Chain {
        nodes,
        root: 0,
        stats,
    }))
}

// =============================================================================
// STANDALONE CYCLE AUDIT
// =============================================================================

/// Audit a full edge set for cycles.
///
/// Iterative depth-first search with an explicit stack and
/// recursion-stack coloring; the first cycle found is reported as a
/// business-rule fault naming the cycle path. This is an assertion
/// over the whole graph, distinct from chain construction's bounded
/// defensive walk.
pub fn audit_cycles(edges: &[Edge]) -> Result<(), AgonError> {
    let mut adjacency: BTreeMap<&ContentHash, Vec<&ContentHash>> = BTreeMap::new();
    for edge in edges {
        adjacency.entry(&edge.from).or_default().push(&edge.to);
        adjacency.entry(&edge.to).or_default();
    }

    let mut done: BTreeSet<&ContentHash> = BTreeSet::new();

    let starts: Vec<&ContentHash> = adjacency.keys().copied().collect();
    for start in starts {
        if done.contains(start) {
            continue;
        }

        // (node, index of the next child to visit)
        let mut stack: Vec<(&ContentHash, usize)> = vec![(start, 0)];
        let mut on_stack: BTreeSet<&ContentHash> = BTreeSet::new();
        on_stack.insert(start);

        while let Some((node, next_child)) = stack.last_mut() {
            let node = *node;
            let neighbors = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);

            if *next_child < neighbors.len() {
                let neighbor = neighbors[*next_child];
                *next_child += 1;

                if on_stack.contains(neighbor) {
                    let cycle = render_cycle(&stack, neighbor);
                    return Err(AgonError::BusinessRule(format!(
                        "cycle detected: {}",
                        cycle
                    )));
                }
                if !done.contains(neighbor) {
                    on_stack.insert(neighbor);
                    stack.push((neighbor, 0));
                }
            } else {
                on_stack.remove(node);
                done.insert(node);
                stack.pop();
            }
        }
    }
    Ok(())
}

/// Render the cycle portion of the DFS stack as `a -> b -> c -> a`.
fn render_cycle(stack: &[(&ContentHash, usize)], back_to: &ContentHash) -> String {
    let mut ids: Vec<&str> = stack
        .iter()
        .skip_while(|(node, _)| *node != back_to)
        .map(|(node, _)| node.short())
        .collect();
    ids.push(back_to.short());
    ids.join(" -> ")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::DebateId;

    fn argument(text: &str, kind: ArgumentKind, author: &str) -> Record {
        Record::Argument(Argument {
            text: text.to_string(),
            kind,
            sequence: 0,
            supports: None,
            author: AgentId::new(author),
            debate: DebateId::new("debate-1"),
            created_at: 1_700_000_000,
        })
    }

    fn rebuttal(target: &ContentHash, text: &str, kind: RebuttalKind, author: &str) -> Record {
        Record::Rebuttal(Rebuttal {
            target: target.clone(),
            text: text.to_string(),
            kind,
            author: AgentId::new(author),
            debate: DebateId::new("debate-1"),
            created_at: 1_700_000_100,
        })
    }

    fn store_record(store: &mut MemoryStore, record: &Record) -> ContentHash {
        let hash = record.content_hash().expect("hash");
        let bytes = record.encode().expect("encode");
        store
            .put(Collection::Arguments, &hash, &bytes)
            .expect("put");
        hash
    }

    /// Store a record under a caller-chosen key. Edge derivation does
    /// not forbid cycles at write time, so tests can fabricate them.
    fn store_raw(store: &mut MemoryStore, key: &ContentHash, record: &Record) {
        let bytes = record.encode().expect("encode");
        store.put(Collection::Arguments, key, &bytes).expect("put");
    }

    fn fabricated(tag: char) -> ContentHash {
        ContentHash::from_hex(tag.to_string().repeat(64)).expect("hex")
    }

    // -------------------------------------------------------------------------
    // Strength heuristic
    // -------------------------------------------------------------------------

    #[test]
    fn empirical_on_empirical_scores_seven_hundred() {
        let target = Argument {
            text: "x".repeat(100),
            kind: ArgumentKind::Empirical,
            sequence: 0,
            supports: None,
            author: AgentId::new("alice"),
            debate: DebateId::new("d"),
            created_at: 0,
        };
        let reb = Rebuttal {
            target: fabricated('a'),
            text: "y".repeat(100),
            kind: RebuttalKind::Empirical,
            author: AgentId::new("bob"),
            debate: DebateId::new("d"),
            created_at: 0,
        };
        // base 500 + 200 kind match + 0 ratio (equal lengths)
        assert_eq!(rebuttal_strength(&reb, &target).permille(), 700);
    }

    #[test]
    fn logical_on_deductive_scores_seven_hundred() {
        let target = Argument {
            text: "x".repeat(100),
            kind: ArgumentKind::Deductive,
            sequence: 0,
            supports: None,
            author: AgentId::new("alice"),
            debate: DebateId::new("d"),
            created_at: 0,
        };
        let reb = Rebuttal {
            target: fabricated('a'),
            text: "y".repeat(100),
            kind: RebuttalKind::Logical,
            author: AgentId::new("bob"),
            debate: DebateId::new("d"),
            created_at: 0,
        };
        assert_eq!(rebuttal_strength(&reb, &target).permille(), 700);
    }

    #[test]
    fn mismatched_kinds_stay_at_base() {
        let target = Argument {
            text: "x".repeat(100),
            kind: ArgumentKind::Analogical,
            sequence: 0,
            supports: None,
            author: AgentId::new("alice"),
            debate: DebateId::new("d"),
            created_at: 0,
        };
        let reb = Rebuttal {
            target: fabricated('a'),
            text: "y".repeat(100),
            kind: RebuttalKind::Contextual,
            author: AgentId::new("bob"),
            debate: DebateId::new("d"),
            created_at: 0,
        };
        assert_eq!(rebuttal_strength(&reb, &target).permille(), 500);
    }

    #[test]
    fn length_ratio_contribution_is_capped() {
        // Rebuttal 10x the target length: ratio adjustment saturates at +100
        assert_eq!(length_ratio_adjustment(1000, 100), 100);
        // Tiny rebuttal against a long target saturates at -100
        assert_eq!(length_ratio_adjustment(1, 1000), -100);
        // 10% longer contributes +10
        assert_eq!(length_ratio_adjustment(110, 100), 10);
        // Equal lengths contribute nothing
        assert_eq!(length_ratio_adjustment(100, 100), 0);
        // Empty target never divides by zero
        assert_eq!(length_ratio_adjustment(100, 0), 100);
    }

    #[test]
    fn concession_strengths_fixed_by_kind() {
        assert_eq!(concession_strength(ConcessionKind::Full).permille(), 1000);
        assert_eq!(concession_strength(ConcessionKind::Partial).permille(), 600);
        assert_eq!(
            concession_strength(ConcessionKind::Conditional).permille(),
            400
        );
    }

    // -------------------------------------------------------------------------
    // Edges and validation
    // -------------------------------------------------------------------------

    #[test]
    fn self_loop_edge_rejected() {
        let id = fabricated('a');
        let result = Edge::new(id.clone(), id, EdgeKind::Rebuts, Strength::new(500));
        assert!(matches!(result, Err(AgonError::Validation(_))));
    }

    #[test]
    fn self_rebuttal_rejected_as_business_rule() {
        let target = argument("claim", ArgumentKind::Empirical, "alice");
        let target_id = target.content_hash().expect("hash");
        let reb = rebuttal(&target_id, "counter", RebuttalKind::Logical, "alice");

        let result = validate_link(&reb, &target);
        assert!(matches!(result, Err(AgonError::BusinessRule(_))));
    }

    #[test]
    fn cross_author_rebuttal_accepted() {
        let target = argument("claim", ArgumentKind::Empirical, "alice");
        let target_id = target.content_hash().expect("hash");
        let reb = rebuttal(&target_id, "counter", RebuttalKind::Logical, "bob");

        assert!(validate_link(&reb, &target).is_ok());
    }

    #[test]
    fn cross_session_link_rejected() {
        let target = argument("claim", ArgumentKind::Empirical, "alice");
        let target_id = target.content_hash().expect("hash");
        let mut reb = rebuttal(&target_id, "counter", RebuttalKind::Logical, "bob");
        if let Record::Rebuttal(r) = &mut reb {
            r.debate = DebateId::new("debate-2");
        }

        let result = validate_link(&reb, &target);
        assert!(matches!(result, Err(AgonError::Validation(_))));
    }

    #[test]
    fn derive_edges_finds_typed_children() {
        let mut store = MemoryStore::new();
        let root = argument("claim", ArgumentKind::Empirical, "alice");
        let root_id = store_record(&mut store, &root);

        let reb = rebuttal(&root_id, "counter", RebuttalKind::Empirical, "bob");
        let reb_id = store_record(&mut store, &reb);

        let edges = derive_edges(&store, &root_id).expect("derive");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from, reb_id);
        assert_eq!(edges[0].to, root_id);
        assert_eq!(edges[0].kind, EdgeKind::Rebuts);
        // empirical vs empirical, "counter" 7 chars vs "claim" 5 chars:
        // 500 + 200 + clamp((1400-1000)/10, -100, 100) = 740
        assert_eq!(edges[0].strength.permille(), 740);
    }

    #[test]
    fn derive_edges_classifies_supports() {
        let mut store = MemoryStore::new();
        let root = argument("claim", ArgumentKind::Empirical, "alice");
        let root_id = store_record(&mut store, &root);

        let supporting = Record::Argument(Argument {
            text: "supporting premise".to_string(),
            kind: ArgumentKind::Inductive,
            sequence: 1,
            supports: Some(root_id.clone()),
            author: AgentId::new("carol"),
            debate: DebateId::new("debate-1"),
            created_at: 1_700_000_200,
        });
        store_record(&mut store, &supporting);

        let edges = derive_edges(&store, &root_id).expect("derive");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, EdgeKind::Supports);
        assert_eq!(edges[0].strength.permille(), SUPPORT_STRENGTH);
    }

    // -------------------------------------------------------------------------
    // Chain construction
    // -------------------------------------------------------------------------

    /// Build a linear chain of `len` rebuttals hanging off a root
    /// argument; returns the root id.
    fn linear_chain(store: &mut MemoryStore, len: usize) -> ContentHash {
        let root = argument("root claim", ArgumentKind::Empirical, "alice");
        let root_id = store_record(store, &root);

        let mut parent = root_id.clone();
        for i in 0..len {
            let reb = Record::Rebuttal(Rebuttal {
                target: parent.clone(),
                text: format!("rebuttal {}", i),
                kind: RebuttalKind::Logical,
                author: AgentId::new(if i % 2 == 0 { "bob" } else { "alice" }),
                debate: DebateId::new("debate-1"),
                created_at: 1_700_000_000 + i as u64,
            });
            parent = store_record(store, &reb);
        }
        root_id
    }

    #[test]
    fn chain_respects_depth_bound() {
        let mut store = MemoryStore::new();
        let root_id = linear_chain(&mut store, 15);

        let chain = build_chain(&store, &root_id, 10)
            .expect("build")
            .expect("root exists");

        // 10 levels of expansion below the root
        assert_eq!(chain.stats.max_depth_reached, 10);
        assert_eq!(chain.stats.total_nodes, 11);
    }

    #[test]
    fn oversized_depth_clamps_to_ceiling() {
        let mut store = MemoryStore::new();
        let root_id = linear_chain(&mut store, 3);

        let chain = build_chain(&store, &root_id, 500)
            .expect("build")
            .expect("root exists");

        // The clamp to MAX_CHAIN_DEPTH leaves a shallow graph intact.
        assert_eq!(chain.stats.max_depth_reached, 3);
        assert_eq!(chain.stats.total_nodes, 4);
    }

    #[test]
    fn shallow_graph_reports_actual_depth() {
        let mut store = MemoryStore::new();
        let root_id = linear_chain(&mut store, 2);

        let chain = build_chain(&store, &root_id, 10)
            .expect("build")
            .expect("root exists");

        assert_eq!(chain.stats.max_depth_reached, 2);
    }

    #[test]
    fn missing_root_is_none() {
        let store = MemoryStore::new();
        let result = build_chain(&store, &fabricated('a'), 10).expect("build");
        assert!(result.is_none());
    }

    #[test]
    fn chain_nodes_carry_metadata() {
        let mut store = MemoryStore::new();
        let root = argument("claim", ArgumentKind::Empirical, "alice");
        let root_id = store_record(&mut store, &root);
        let reb = rebuttal(&root_id, "counter", RebuttalKind::Empirical, "bob");
        store_record(&mut store, &reb);

        let chain = build_chain(&store, &root_id, 10)
            .expect("build")
            .expect("root exists");

        assert_eq!(chain.nodes[chain.root].kind, RecordKind::Argument);
        assert_eq!(chain.nodes[chain.root].author, AgentId::new("alice"));
        assert!(chain.nodes[chain.root].edge.is_none());

        let child_idx = chain.nodes[chain.root].children[0];
        let child = &chain.nodes[child_idx];
        assert_eq!(child.kind, RecordKind::Rebuttal);
        assert_eq!(child.depth, 1);
        match child.edge {
            Some((EdgeKind::Rebuts, strength)) => assert_eq!(strength.permille(), 740),
            other => panic!("expected rebuts edge, got {:?}", other),
        }
    }

    #[test]
    fn cyclic_records_terminate() {
        // Fabricated keys let records loop back: a -> b -> c -> a.
        // Content hashing prevents this in normal writes; the walk
        // must still terminate on a defensive visited-set.
        let mut store = MemoryStore::new();
        let (a, b, c) = (fabricated('a'), fabricated('b'), fabricated('c'));

        store_raw(
            &mut store,
            &a,
            &rebuttal(&b, "a rebuts b", RebuttalKind::Logical, "alice"),
        );
        store_raw(
            &mut store,
            &b,
            &rebuttal(&c, "b rebuts c", RebuttalKind::Logical, "bob"),
        );
        store_raw(
            &mut store,
            &c,
            &rebuttal(&a, "c rebuts a", RebuttalKind::Logical, "carol"),
        );

        let chain = build_chain(&store, &a, 50)
            .expect("build")
            .expect("root exists");

        // Each node visited exactly once: finite count despite the loop.
        assert_eq!(chain.stats.total_nodes, 3);
    }

    #[test]
    fn unreadable_child_degrades_to_leaf() {
        let mut store = MemoryStore::new();
        let root = argument("claim", ArgumentKind::Empirical, "alice");
        let root_id = store_record(&mut store, &root);

        // A garbage payload in the collection must not abort traversal.
        let junk_key = fabricated('f');
        store
            .put(Collection::Arguments, &junk_key, b"\xff\xff\xff")
            .expect("put");

        let reb = rebuttal(&root_id, "counter", RebuttalKind::Logical, "bob");
        store_record(&mut store, &reb);

        let chain = build_chain(&store, &root_id, 10)
            .expect("build")
            .expect("root exists");
        assert_eq!(chain.stats.total_nodes, 2);
    }

    // -------------------------------------------------------------------------
    // Cycle audit
    // -------------------------------------------------------------------------

    fn edge(from: char, to: char) -> Edge {
        Edge::new(
            fabricated(from),
            fabricated(to),
            EdgeKind::Rebuts,
            Strength::new(500),
        )
        .expect("edge")
    }

    #[test]
    fn audit_reports_cycle() {
        let edges = vec![edge('a', 'b'), edge('b', 'c'), edge('c', 'a')];
        let result = audit_cycles(&edges);
        match result {
            Err(AgonError::BusinessRule(msg)) => assert!(msg.contains("cycle")),
            other => panic!("expected business-rule fault, got {:?}", other),
        }
    }

    #[test]
    fn audit_passes_acyclic_graph() {
        let edges = vec![edge('a', 'b'), edge('b', 'c')];
        assert!(audit_cycles(&edges).is_ok());
    }

    #[test]
    fn audit_passes_diamond() {
        // Shared descendant is not a cycle.
        let edges = vec![edge('a', 'b'), edge('a', 'c'), edge('b', 'd'), edge('c', 'd')];
        assert!(audit_cycles(&edges).is_ok());
    }

    #[test]
    fn audit_finds_cycle_in_disconnected_component() {
        let edges = vec![edge('a', 'b'), edge('c', 'd'), edge('d', 'c')];
        assert!(audit_cycles(&edges).is_err());
    }

    #[test]
    fn audit_empty_graph_passes() {
        assert!(audit_cycles(&[]).is_ok());
    }
}
