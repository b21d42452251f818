//! Tank-path requirement and bridge-to-transformer-terminal connectivity,
//! shared by the DAB and LLC checks.

use topo_common::Snapshot;

use crate::graph::{self, PASSIVE_INDUCED_PARTS};

pub const MISSING_TANK_MESSAGE: &str =
    "missing series tank elements (need both C_film and inductor on VIN-side path to transformer)";

/// Whether a passive-induced path from `switch_net` to `terminal_net`
/// exists at all (ignores the film/inductor requirement) -- used for
/// transformer-terminal coverage, not the tank requirement itself.
pub fn switch_reaches_terminal(snapshot: &Snapshot, switch_net: &str, terminal_net: &str) -> bool {
    graph::path_exists(snapshot, switch_net, terminal_net, &PASSIVE_INDUCED_PARTS, false, false)
}

/// A transformer side's two terminals are covered by a bridge's switch
/// nodes when each terminal is reachable from some switch node in the
/// bridge.
pub fn bridge_covers_terminals(snapshot: &Snapshot, switch_nodes: &[&str], terminal_a: &str, terminal_b: &str) -> bool {
    let covers = |terminal: &str| switch_nodes.iter().any(|sw| switch_reaches_terminal(snapshot, sw, terminal));
    covers(terminal_a) && covers(terminal_b)
}

/// Tank-path requirement: a passive-induced path from `switch_net` to
/// `target_net` that traverses at least one `C_film` edge and at least one
/// inductor edge (`Inductor_power` or `L`).
pub fn tank_path_exists(snapshot: &Snapshot, switch_net: &str, target_net: &str) -> bool {
    graph::path_exists(snapshot, switch_net, target_net, &PASSIVE_INDUCED_PARTS, true, true)
}

/// DAB: the bridge as a whole must reach the transformer terminal through a
/// tank path on at least one switch node.
pub fn dab_tank_requirement(snapshot: &Snapshot, switch_nodes: &[&str], primary_terminal: &str) -> Option<String> {
    if switch_nodes.iter().any(|sw| tank_path_exists(snapshot, sw, primary_terminal)) {
        None
    } else {
        Some(MISSING_TANK_MESSAGE.to_string())
    }
}

/// LLC: every switch-node leg of the input-side bridge must independently
/// reach a transformer primary terminal via a tank path.
pub fn llc_tank_requirement(snapshot: &Snapshot, switch_nodes: &[&str], primary_terminal: &str) -> Option<String> {
    if switch_nodes.iter().all(|sw| tank_path_exists(snapshot, sw, primary_terminal)) {
        None
    } else {
        Some(MISSING_TANK_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{Component, Pin};

    fn comp(reference: &str, part_id: &str, net_a: &str, net_b: &str) -> Component {
        Component {
            reference: reference.into(),
            part_id: part_id.into(),
            value: None,
            category: None,
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some(net_a.into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "2".into(), net: Some(net_b.into()), pin_role: None },
            ],
        }
    }

    #[test]
    fn dab_tank_requires_both_film_and_inductor_on_path() {
        let snapshot = Snapshot {
            components: vec![comp("C1", "C_film", "VSW", "MID")],
            nets: vec![],
        };
        assert_eq!(dab_tank_requirement(&snapshot, &["VSW"], "PRI_A"), Some(MISSING_TANK_MESSAGE.to_string()));

        let snapshot_with_inductor = Snapshot {
            components: vec![comp("C1", "C_film", "VSW", "MID"), comp("L1", "Inductor_power", "MID", "PRI_A")],
            nets: vec![],
        };
        assert_eq!(dab_tank_requirement(&snapshot_with_inductor, &["VSW"], "PRI_A"), None);
    }
}
