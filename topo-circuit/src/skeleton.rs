//! Skeleton Matcher: component-count tolerance plus a subgraph-isomorphism
//! check between a component/net multigraph extracted from the reference
//! and one extracted from the candidate.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use petgraph::graph::UnGraph;
use topo_common::{KgStore, Snapshot, TaskId};

const PASSIVE_PART_IDS: [&str; 6] = ["R", "C", "L", "D", "C_film", "Inductor_power"];
const COMPONENT_COUNT_TOLERANCE: f64 = 0.5;
const WIDENED_TOLERANCE: f64 = 0.6;
const P3_GRAPH_TOLERANCE: i64 = 5;

static FULL_SUBGRAPH_TASKS: Lazy<HashSet<TaskId>> = Lazy::new(|| HashSet::from([TaskId(3)]));
static KEY_SUBGRAPH_TASKS: Lazy<HashSet<TaskId>> = Lazy::new(|| {
    HashSet::from([
        TaskId(1),
        TaskId(2),
        TaskId(4),
        TaskId(5),
        TaskId(7),
        TaskId(8),
        TaskId(9),
        TaskId(10),
        TaskId(11),
        TaskId(12),
    ])
});

fn is_passive(part_id: &str) -> bool {
    PASSIVE_PART_IDS.contains(&part_id)
}

fn count_bounds(task_id: TaskId, part_id: &str, reference_count: i64) -> (i64, i64) {
    if task_id.0 == 15 && part_id == "D" {
        return (0, i64::MAX);
    }
    let tolerance = if task_id.0 == 16 && (part_id == "R" || part_id == "C") {
        WIDENED_TOLERANCE
    } else {
        COMPONENT_COUNT_TOLERANCE
    };
    let lower = ((reference_count as f64 * (1.0 - tolerance)).floor() as i64).max(1);
    let upper = if reference_count <= 4 {
        4
    } else {
        (reference_count as f64 * (1.0 + tolerance)).ceil() as i64
    };
    (lower, upper.max(lower))
}

/// Per-`part_id` count tolerance between the reference and the candidate.
pub fn check_component_counts(reference: &Snapshot, candidate: &Snapshot, task_id: TaskId) -> Vec<String> {
    let mut reference_counts: HashMap<&str, i64> = HashMap::new();
    for comp in &reference.components {
        *reference_counts.entry(comp.part_id.as_str()).or_default() += 1;
    }
    let mut candidate_counts: HashMap<&str, i64> = HashMap::new();
    for comp in &candidate.components {
        *candidate_counts.entry(comp.part_id.as_str()).or_default() += 1;
    }

    let mut errors = Vec::new();
    for (part_id, reference_count) in &reference_counts {
        let (lower, upper) = count_bounds(task_id, part_id, *reference_count);
        let candidate_count = candidate_counts.get(part_id).copied().unwrap_or(0);
        if candidate_count < lower || candidate_count > upper {
            errors.push(format!(
                "component count mismatch for '{part_id}': candidate has {candidate_count}, expected between {lower} and {upper} (reference has {reference_count})"
            ));
        }
    }
    errors
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeLabel {
    Component { category: String },
    Net,
}

fn node_match(a: &NodeLabel, b: &NodeLabel) -> bool {
    match (a, b) {
        (NodeLabel::Net, NodeLabel::Net) => true,
        (NodeLabel::Component { category: ca }, NodeLabel::Component { category: cb }) => ca == cb,
        _ => false,
    }
}

fn edge_match(a: &Option<String>, b: &Option<String>) -> bool {
    a == b
}

fn build_multigraph(snapshot: &Snapshot, kg: &KgStore, non_passive_only: bool) -> UnGraph<NodeLabel, Option<String>, usize> {
    let mut graph: UnGraph<NodeLabel, Option<String>, usize> = UnGraph::default();
    let mut component_nodes = HashMap::new();
    let mut net_nodes = HashMap::new();

    for comp in &snapshot.components {
        if non_passive_only && is_passive(&comp.part_id) {
            continue;
        }
        let category = kg.category_of(&comp.part_id, &comp.reference);
        let node = graph.add_node(NodeLabel::Component { category });
        component_nodes.insert(comp.reference.as_str(), node);
    }

    for comp in &snapshot.components {
        let Some(&comp_node) = component_nodes.get(comp.reference.as_str()) else {
            continue;
        };
        for pin in &comp.pins {
            let Some(net_name) = pin.net.as_deref() else {
                continue;
            };
            let net_node = *net_nodes
                .entry(net_name)
                .or_insert_with(|| graph.add_node(NodeLabel::Net));
            graph.add_edge(comp_node, net_node, pin.pin_role.clone());
        }
    }

    graph
}

/// Reference graph is the subgraph-isomorphism *pattern*; it must match
/// some subgraph of the candidate graph.
fn is_subgraph_isomorphic(
    reference: &UnGraph<NodeLabel, Option<String>, usize>,
    candidate: &UnGraph<NodeLabel, Option<String>, usize>,
) -> bool {
    petgraph::algo::subgraph_isomorphisms_iter(
        reference,
        candidate,
        &mut |a, b| node_match(a, b),
        &mut |a, b| edge_match(a, b),
    )
    .map(|mut iter| iter.next().is_some())
    .unwrap_or(false)
}

/// Subgraph-isomorphism check between a reference and candidate
/// component/net multigraph. Task membership in `FULL_SUBGRAPH_TASKS`
/// includes every component; `KEY_SUBGRAPH_TASKS` restricts both graphs to
/// non-passive components only. Tasks in neither set skip the graph check
/// entirely (count tolerance is the only skeleton signal for them).
pub fn check_subgraph(reference: &Snapshot, candidate: &Snapshot, kg: &KgStore, task_id: TaskId) -> Vec<String> {
    let non_passive_only = if FULL_SUBGRAPH_TASKS.contains(&task_id) {
        false
    } else if KEY_SUBGRAPH_TASKS.contains(&task_id) {
        true
    } else {
        return Vec::new();
    };

    let reference_graph = build_multigraph(reference, kg, non_passive_only);
    let candidate_graph = build_multigraph(candidate, kg, non_passive_only);

    if reference_graph.node_count() < 2 || candidate_graph.node_count() < 2 {
        tracing::info!("skeleton subgraph check skipped: degenerate multigraph (fewer than 2 nodes)");
        return Vec::new();
    }

    if is_subgraph_isomorphic(&reference_graph, &candidate_graph) {
        return Vec::new();
    }

    if task_id.0 == 3 {
        let node_diff = (reference_graph.node_count() as i64 - candidate_graph.node_count() as i64).abs();
        let edge_diff = (reference_graph.edge_count() as i64 - candidate_graph.edge_count() as i64).abs();
        if node_diff <= P3_GRAPH_TOLERANCE && edge_diff <= P3_GRAPH_TOLERANCE {
            return Vec::new();
        }
    }

    vec![format!(
        "skeleton mismatch: candidate multigraph ({} nodes, {} edges) is not subgraph-isomorphic to the reference ({} nodes, {} edges)",
        candidate_graph.node_count(),
        candidate_graph.edge_count(),
        reference_graph.node_count(),
        reference_graph.edge_count(),
    )]
}

pub fn check(reference: &Snapshot, candidate: &Snapshot, kg: &KgStore, task_id: TaskId) -> Vec<String> {
    let mut errors = check_component_counts(reference, candidate, task_id);
    errors.extend(check_subgraph(reference, candidate, kg, task_id));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{Component, KnowledgeGraph, Pin};

    fn cap(reference: &str) -> Component {
        Component {
            reference: reference.into(),
            part_id: "C".into(),
            value: None,
            category: Some("passive".into()),
            pins: vec![Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some("N1".into()), pin_role: None }],
        }
    }

    #[test]
    fn component_count_within_default_tolerance_passes() {
        let reference = Snapshot { components: vec![cap("C1"), cap("C2")], nets: vec![] };
        let candidate = Snapshot { components: vec![cap("C1"), cap("C2"), cap("C3")], nets: vec![] };
        assert!(check_component_counts(&reference, &candidate, TaskId(1)).is_empty());
    }

    #[test]
    fn component_count_far_outside_tolerance_fails() {
        let reference = Snapshot { components: vec![cap("C1"); 10].into_iter().enumerate().map(|(i, mut c)| { c.reference = format!("C{i}"); c }).collect(), nets: vec![] };
        let candidate = Snapshot { components: vec![cap("C1")], nets: vec![] };
        let errors = check_component_counts(&reference, &candidate, TaskId(1));
        assert!(errors.iter().any(|e| e.contains("component count mismatch for 'C'")));
    }

    #[test]
    fn degenerate_graph_soft_skips() {
        let reference = Snapshot { components: vec![], nets: vec![] };
        let candidate = Snapshot { components: vec![], nets: vec![] };
        let kg = KgStore::new(KnowledgeGraph::default(), None);
        assert!(check_subgraph(&reference, &candidate, &kg, TaskId(3)).is_empty());
    }

    #[test]
    fn identical_snapshots_are_subgraph_isomorphic() {
        let snapshot = Snapshot {
            components: vec![
                Component { reference: "Q1".into(), part_id: "IMZA65R015M2H".into(), value: None, category: Some("MOSFET".into()), pins: vec![Pin { pin_id: "1".into(), pin_name: "G".into(), net: Some("GATE".into()), pin_role: Some("mosfet_gate".into()) }] },
                Component { reference: "U1".into(), part_id: "UCC5390E".into(), value: None, category: Some("gate-driver".into()), pins: vec![Pin { pin_id: "1".into(), pin_name: "OUT".into(), net: Some("GATE".into()), pin_role: Some("out".into()) }] },
            ],
            nets: vec![],
        };
        let kg = KgStore::new(KnowledgeGraph::default(), None);
        assert!(check_subgraph(&snapshot, &snapshot, &kg, TaskId(1)).is_empty());
    }
}
