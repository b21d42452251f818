//! Per-topology verification functions, one per `TASK_TEMPLATES` topology
//! tag.

use std::collections::HashMap;

use topo_common::{Component, KgStore, Snapshot};

use crate::graph::{self, PASSIVE_INDUCED_PARTS};

use super::bridge::{candidate_switch_nets, check_full_bridge_pair, infer_half_bridge_on_vsw, n_way_half_bridge, HalfBridge};
use super::mosfet::{all_mosfets, MosfetConnectivity};
use super::netclass::{is_input_supply_net, is_output_net};
use super::tank::{bridge_covers_terminals, dab_tank_requirement, llc_tank_requirement};

fn find_inductor_terminal_net<'a>(snapshot: &'a Snapshot, switch_net: &str) -> Option<&'a str> {
    snapshot
        .components
        .iter()
        .filter(|c| c.part_id == "Inductor_power" || c.part_id == "L")
        .find_map(|c| {
            let nets: Vec<&str> = c.pins.iter().filter_map(|p| p.net.as_deref()).collect();
            if nets.len() < 2 {
                return None;
            }
            if nets[0] == switch_net {
                Some(nets[1])
            } else if nets[1] == switch_net {
                Some(nets[0])
            } else {
                None
            }
        })
}

/// A single switch-node half-bridge whose bus looks like an input supply,
/// and whose power inductor's other terminal looks like an output net.
pub fn check_sync_buck_or_boost(snapshot: &Snapshot, kg: &KgStore, topology: &str) -> Vec<String> {
    let mosfets = all_mosfets(snapshot, kg);
    let switch_nets = candidate_switch_nets(&mosfets);

    let Some((switch_net, hb)) = switch_nets.iter().find_map(|sw| infer_half_bridge_on_vsw(&mosfets, sw).map(|hb| (*sw, hb))) else {
        return vec![format!("{topology}: no half-bridge found around any mosfet-plus-inductor switch node")];
    };

    let mut errors = Vec::new();
    if let Some(diag) = &hb.diagnostic {
        errors.push(format!("{topology}: {diag}"));
    }

    let Some(inductor_terminal) = find_inductor_terminal_net(snapshot, switch_net) else {
        errors.push(format!("{topology}: switch node {switch_net} has no power inductor"));
        return errors;
    };

    match topology {
        "sync_buck" => {
            if !is_input_supply_net(hb.bus_net) {
                errors.push(format!("{topology}: bus net ({}) does not look like an input supply net", hb.bus_net));
            }
            if !is_output_net(inductor_terminal) {
                errors.push(format!("{topology}: inductor terminal ({inductor_terminal}) does not look like an output net"));
            }
        }
        "sync_boost" => {
            if !is_input_supply_net(inductor_terminal) {
                errors.push(format!("{topology}: inductor terminal ({inductor_terminal}) does not look like an input supply net"));
            }
            if !is_output_net(hb.bus_net) {
                errors.push(format!("{topology}: bus net ({}) does not look like an output net", hb.bus_net));
            }
        }
        _ => unreachable!("check_sync_buck_or_boost called with unsupported topology {topology}"),
    }
    errors
}

/// Two half-bridges, one referenced to a VIN-like bus and one to a VOUT-like
/// bus, with a power inductor between their switch nodes.
pub fn check_4sw_buckboost(snapshot: &Snapshot, kg: &KgStore) -> Vec<String> {
    let mosfets = all_mosfets(snapshot, kg);
    let switch_nets = candidate_switch_nets(&mosfets);
    let half_bridges: Vec<HalfBridge> = switch_nets.iter().filter_map(|sw| infer_half_bridge_on_vsw(&mosfets, sw)).collect();

    let input_side = half_bridges.iter().find(|hb| is_input_supply_net(hb.bus_net));
    let output_side = half_bridges.iter().find(|hb| is_output_net(hb.bus_net) && hb.bus_net != input_side.map(|h| h.bus_net).unwrap_or(""));

    let (Some(input_side), Some(output_side)) = (input_side, output_side) else {
        return vec!["4-switch buck-boost: could not identify input-referenced and output-referenced half-bridges".to_string()];
    };

    let mut errors = Vec::new();
    if !graph::nets_connected(snapshot, input_side.switch_net, output_side.switch_net, &["Inductor_power", "L"]) {
        errors.push(format!(
            "4-switch buck-boost: no power inductor between switch nodes {} and {}",
            input_side.switch_net, output_side.switch_net
        ));
    }
    errors
}

struct FullBridgeCandidate<'a> {
    bus_net: &'a str,
    gnd_net: &'a str,
    switch_nodes: Vec<&'a str>,
}

fn full_bridge_candidates<'a>(mosfets: &[MosfetConnectivity<'a>]) -> Vec<FullBridgeCandidate<'a>> {
    let switch_nets = candidate_switch_nets(mosfets);
    let half_bridges: Vec<HalfBridge<'a>> = switch_nets.into_iter().filter_map(|sw| infer_half_bridge_on_vsw(mosfets, sw)).collect();

    let mut groups: HashMap<(&'a str, &'a str), Vec<&'a str>> = HashMap::new();
    for hb in &half_bridges {
        groups.entry((hb.bus_net, hb.gnd_net)).or_default().push(hb.switch_net);
    }
    groups
        .into_iter()
        .filter(|(_, nodes)| nodes.len() >= 2)
        .map(|((bus_net, gnd_net), switch_nodes)| FullBridgeCandidate { bus_net, gnd_net, switch_nodes })
        .collect()
}

fn transformer_component<'a>(snapshot: &'a Snapshot, kg: &KgStore) -> Option<&'a Component> {
    snapshot.components.iter().find(|c| kg.category_of(&c.part_id, &c.reference) == "transformer")
}

fn terminal_nets<'a>(component: &'a Component, pin_names: &[String]) -> Vec<&'a str> {
    component
        .pins
        .iter()
        .filter(|p| pin_names.iter().any(|n| n == &p.pin_name))
        .filter_map(|p| p.net.as_deref())
        .collect()
}

fn bridge_coverage_score(snapshot: &Snapshot, candidate: &FullBridgeCandidate, terminals: &[&str]) -> usize {
    terminals
        .iter()
        .filter(|t| candidate.switch_nodes.iter().any(|sw| graph::path_exists(snapshot, sw, t, &PASSIVE_INDUCED_PARTS, false, false)))
        .count()
}

/// Shared DAB/LLC bridge-and-transformer wiring check. Returns the errors
/// plus, on success, the input-side bridge's switch nodes and the
/// transformer's primary terminal (for the caller's tank-path check).
fn isolated_bridge_topology<'a>(
    snapshot: &'a Snapshot,
    kg: &KgStore,
    topology_label: &str,
) -> Result<(Vec<&'a str>, &'a str), Vec<String>> {
    let mosfets = all_mosfets(snapshot, kg);
    let Some(transformer) = transformer_component(snapshot, kg) else {
        return Err(vec![format!("{topology_label}: no transformer found")]);
    };

    let primary_pins = kg.primary_pins(&transformer.part_id).to_vec();
    let secondary_pins = kg.secondary_pins(&transformer.part_id).to_vec();
    let primary_terminals = terminal_nets(transformer, &primary_pins);
    let secondary_terminals = terminal_nets(transformer, &secondary_pins);
    if primary_terminals.len() < 2 || secondary_terminals.len() < 2 {
        return Err(vec![format!("{topology_label}: transformer is missing primary or secondary terminal nets")]);
    }

    let candidates = full_bridge_candidates(&mosfets);
    if candidates.len() < 2 {
        return Err(vec![format!("{topology_label}: fewer than two full-bridge candidates found")]);
    }

    let primary_index = candidates
        .iter()
        .position(|c| c.bus_net.eq_ignore_ascii_case("VIN"))
        .or_else(|| {
            candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| is_input_supply_net(c.bus_net))
                .max_by_key(|(_, c)| bridge_coverage_score(snapshot, c, &primary_terminals))
                .map(|(i, _)| i)
        });
    let Some(primary_index) = primary_index else {
        return Err(vec![format!("{topology_label}: could not identify primary-side bridge")]);
    };
    let primary = &candidates[primary_index];

    if !bridge_covers_terminals(snapshot, &primary.switch_nodes, primary_terminals[0], primary_terminals[1]) {
        return Err(vec![format!("{topology_label}: primary-side bridge does not reach both transformer primary terminals")]);
    }

    let secondary = candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != primary_index)
        .find(|(_, c)| bridge_covers_terminals(snapshot, &c.switch_nodes, secondary_terminals[0], secondary_terminals[1]));
    let Some((_, secondary)) = secondary else {
        return Err(vec![format!("{topology_label}: no secondary-side bridge reaches both transformer secondary terminals")]);
    };

    if let Err(e) = check_full_bridge_pair(
        &HalfBridge { switch_net: primary.switch_nodes[0], hs_ref: "", ls_ref: "", bus_net: primary.bus_net, gnd_net: primary.gnd_net, diagnostic: None },
        &HalfBridge { switch_net: secondary.switch_nodes[0], hs_ref: "", ls_ref: "", bus_net: secondary.bus_net, gnd_net: secondary.gnd_net, diagnostic: None },
    ) {
        // primary and secondary bridges are expected to differ (isolated);
        // this only guards against a degenerate candidate set where both
        // "bridges" are in fact the same group.
        if primary.bus_net == secondary.bus_net && primary.gnd_net == secondary.gnd_net {
            return Err(vec![e]);
        }
    }

    Ok((primary.switch_nodes.clone(), primary_terminals[0]))
}

pub fn check_dab(snapshot: &Snapshot, kg: &KgStore) -> Vec<String> {
    match isolated_bridge_topology(snapshot, kg, "DAB") {
        Ok((switch_nodes, primary_terminal)) => dab_tank_requirement(snapshot, &switch_nodes, primary_terminal).into_iter().collect(),
        Err(errors) => errors,
    }
}

pub fn check_llc(snapshot: &Snapshot, kg: &KgStore) -> Vec<String> {
    match isolated_bridge_topology(snapshot, kg, "LLC") {
        Ok((switch_nodes, primary_terminal)) => llc_tank_requirement(snapshot, &switch_nodes, primary_terminal).into_iter().collect(),
        Err(errors) => errors,
    }
}

pub fn check_3ph_inverter(snapshot: &Snapshot, kg: &KgStore) -> Vec<String> {
    let mosfets = all_mosfets(snapshot, kg);
    match n_way_half_bridge(snapshot, &mosfets, &["VSW_1", "VSW_2", "VSW_3"], "3-phase inverter", true) {
        Ok(_) => Vec::new(),
        Err(e) => vec![e],
    }
}

pub fn check_1ph_fullbridge(snapshot: &Snapshot, kg: &KgStore) -> Vec<String> {
    let mosfets = all_mosfets(snapshot, kg);
    match n_way_half_bridge(snapshot, &mosfets, &["VSW_1", "VSW_2"], "Single-phase inverter", true) {
        Ok(_) => Vec::new(),
        Err(e) => vec![e],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{KgComponentEntry, KnowledgeGraph, Pin};

    fn mosfet(reference: &str, drain: &str, source: &str, gate: &str) -> Component {
        Component {
            reference: reference.into(),
            part_id: "IMZA65R015M2H".into(),
            value: None,
            category: Some("MOSFET".into()),
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "D".into(), net: Some(drain.into()), pin_role: Some("mosfet_drain".into()) },
                Pin { pin_id: "2".into(), pin_name: "S".into(), net: Some(source.into()), pin_role: Some("mosfet_source".into()) },
                Pin { pin_id: "3".into(), pin_name: "G".into(), net: Some(gate.into()), pin_role: Some("mosfet_gate".into()) },
            ],
        }
    }

    fn inductor(reference: &str, a: &str, b: &str) -> Component {
        Component {
            reference: reference.into(),
            part_id: "Inductor_power".into(),
            value: None,
            category: Some("passive".into()),
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some(a.into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "2".into(), net: Some(b.into()), pin_role: None },
            ],
        }
    }

    fn kg_with_mosfet() -> KgStore {
        let mut kg = KnowledgeGraph::default();
        kg.components.push(KgComponentEntry { id: "IMZA65R015M2H".into(), category: Some("MOSFET".into()), ..Default::default() });
        KgStore::new(kg, None)
    }

    #[test]
    fn sync_buck_identifies_correct_rails() {
        let snapshot = Snapshot {
            components: vec![
                mosfet("Q1", "VIN", "VSW", "G1"),
                mosfet("Q2", "VSW", "PGND", "G2"),
                inductor("L1", "VSW", "VOUT"),
            ],
            nets: vec![],
        };
        let errors = check_sync_buck_or_boost(&snapshot, &kg_with_mosfet(), "sync_buck");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }
}
