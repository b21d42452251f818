use std::collections::{HashMap, HashSet, VecDeque};

use topo_common::{EndpointDescriptor, Net, Rule, Snapshot};

use crate::graph;

const UCC21710_PRIMARY_PINS: [&str; 8] = ["GND", "IN+", "IN-", "RDY", "~{FLT}", "~{RST}/EN", "VCC", "APWM"];
const UCC21710_SECONDARY_PINS: [&str; 8] = ["AIN", "OC", "COM", "OUTH", "VDD", "OUTL", "CLMPI", "VEE"];

fn best_endpoint_descriptor(snapshot: &Snapshot, net: &Net) -> Option<EndpointDescriptor> {
    net.endpoints
        .iter()
        .max_by_key(|ep| ep.pin_role.is_some() as u8 + ep.component_category.is_some() as u8)
        .map(|ep| EndpointDescriptor {
            part_id: snapshot.find_component(&ep.reference).map(|c| c.part_id.clone()),
            category: ep.component_category.clone(),
            pin_role: ep.pin_role.clone(),
            pin_id: Some(ep.pin_id.clone()),
            pin_name: Some(ep.pin_name.clone()),
        })
}

fn net_has_identifiable_endpoint(net: &Net) -> bool {
    net.endpoints.iter().any(|ep| ep.pin_role.is_some())
}

/// Connected groups of nets under a fixed induced-graph part set, restricted
/// to nets that actually appear in the snapshot's net list (an isolated net
/// with no passive edges is its own singleton group).
fn connected_groups(snapshot: &Snapshot, allowed_parts: &[&str]) -> Vec<Vec<&str>> {
    let adjacency = graph::build_net_graph(snapshot, allowed_parts);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();
    for net in &snapshot.nets {
        if visited.contains(net.name.as_str()) {
            continue;
        }
        let mut group = Vec::new();
        let mut queue = VecDeque::from([net.name.as_str()]);
        visited.insert(net.name.as_str());
        while let Some(current) = queue.pop_front() {
            group.push(current);
            for (neighbor, _part_id, _reference) in adjacency.neighbors(current) {
                if visited.insert(neighbor.as_str()) {
                    queue.push_back(neighbor.as_str());
                }
            }
        }
        groups.push(group);
    }
    groups
}

/// A UCC21710 endpoint's isolation domain: by `pin_id` when it's a plain
/// number (1-8 secondary, 9-16 primary), else by `pin_name` against the
/// primary/secondary pin-name sets.
fn ucc21710_domain(descriptor: &EndpointDescriptor) -> Option<&'static str> {
    if let Some(pin_num) = descriptor.pin_id.as_deref().and_then(|id| id.parse::<u32>().ok()) {
        if (1..=8).contains(&pin_num) {
            return Some("secondary");
        }
        if (9..=16).contains(&pin_num) {
            return Some("primary");
        }
    }
    let name = descriptor.pin_name.as_deref().unwrap_or("");
    if UCC21710_PRIMARY_PINS.contains(&name) {
        Some("primary")
    } else if UCC21710_SECONDARY_PINS.contains(&name) {
        Some("secondary")
    } else {
        None
    }
}

fn is_ucc21710_rdy_gnd(a: &EndpointDescriptor, b: &EndpointDescriptor) -> bool {
    (a.pin_name.as_deref() == Some("RDY") && b.pin_role.as_deref() == Some("supply_gnd"))
        || (b.pin_name.as_deref() == Some("RDY") && a.pin_role.as_deref() == Some("supply_gnd"))
}

fn is_ucc21710_rst_en_gnd(a: &EndpointDescriptor, b: &EndpointDescriptor) -> bool {
    let names = (a.pin_name.as_deref(), b.pin_name.as_deref());
    if names.0 != Some("~{RST}/EN") && names.1 != Some("~{RST}/EN") {
        return false;
    }
    matches!(names, (Some("IN-"), _) | (_, Some("IN-")) | (Some("GND"), _) | (_, Some("GND")))
}

/// UCC21710-only skip rules (`rule_extractor.py`'s `_should_skip_rule`):
/// every condition below requires both endpoints to be a UCC21710 pin.
fn should_skip(kind: &str, a: &EndpointDescriptor, b: &EndpointDescriptor) -> bool {
    if a.part_id.as_deref() != Some("UCC21710") || b.part_id.as_deref() != Some("UCC21710") {
        return false;
    }

    if let (Some(domain_a), Some(domain_b)) = (ucc21710_domain(a), ucc21710_domain(b)) {
        if domain_a != domain_b {
            return true;
        }
    }

    if kind == "C_DIRECT" && (is_ucc21710_rdy_gnd(a, b) || is_ucc21710_rst_en_gnd(a, b)) {
        return true;
    }

    let roles = (a.pin_role.as_deref(), b.pin_role.as_deref());
    if kind == "C_DIRECT" && matches!(roles, (Some("logic_in"), Some("logic_out")) | (Some("logic_out"), Some("logic_in"))) {
        return true;
    }
    if kind == "R_PATH" && matches!(roles, (Some("supply_vdd"), Some("supply_gnd")) | (Some("supply_gnd"), Some("supply_vdd"))) {
        return true;
    }

    false
}

/// Derive a de-duplicated set of `C_DIRECT`, `R_PATH`, `L_PATH` rules from a
/// reference snapshot.
pub fn extract_rules(reference: &Snapshot) -> Vec<Rule> {
    let mut rules = Vec::new();
    let mut seen: HashSet<(EndpointDescriptor, EndpointDescriptor, &'static str)> = HashSet::new();

    let mut push = |rules: &mut Vec<Rule>,
                    seen: &mut HashSet<(EndpointDescriptor, EndpointDescriptor, &'static str)>,
                    kind: &'static str,
                    a: EndpointDescriptor,
                    b: EndpointDescriptor,
                    fail_on_short: bool| {
        if a == b || should_skip(kind, &a, &b) {
            return;
        }
        let key = if format!("{a:?}") <= format!("{b:?}") {
            (a.clone(), b.clone(), kind)
        } else {
            (b.clone(), a.clone(), kind)
        };
        if !seen.insert(key) {
            return;
        }
        rules.push(match kind {
            "C_DIRECT" => Rule::CDirect { a, b, fail_on_short, allow_series: false },
            "R_PATH" => Rule::RPath { a, b, fail_on_short, allow_series: true },
            _ => Rule::LPath { a, b, fail_on_short, allow_series: true },
        });
    };

    for comp in &reference.components {
        if comp.part_id != "C" {
            continue;
        }
        let connected: Vec<&str> = comp.pins.iter().filter_map(|p| p.net.as_deref()).collect();
        if connected.len() < 2 || connected[0] == connected[1] {
            continue;
        }
        let (Some(net_a), Some(net_b)) = (reference.find_net(connected[0]), reference.find_net(connected[1])) else {
            continue;
        };
        let (Some(a), Some(b)) = (best_endpoint_descriptor(reference, net_a), best_endpoint_descriptor(reference, net_b)) else {
            continue;
        };
        push(&mut rules, &mut seen, "C_DIRECT", a, b, true);
    }

    for (kind, parts) in [("R_PATH", vec!["R"]), ("L_PATH", vec!["L", "Inductor_power"])] {
        for group in connected_groups(reference, &parts) {
            let identifiable: Vec<&str> = group
                .into_iter()
                .filter(|name| reference.find_net(name).map(net_has_identifiable_endpoint).unwrap_or(false))
                .collect();
            for i in 0..identifiable.len() {
                for j in (i + 1)..identifiable.len() {
                    let (Some(net_a), Some(net_b)) = (reference.find_net(identifiable[i]), reference.find_net(identifiable[j])) else {
                        continue;
                    };
                    let (Some(a), Some(b)) = (best_endpoint_descriptor(reference, net_a), best_endpoint_descriptor(reference, net_b)) else {
                        continue;
                    };
                    push(&mut rules, &mut seen, kind, a, b, true);
                }
            }
        }
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{Component, Endpoint, Pin};

    fn cap(reference: &str, a: &str, b: &str) -> Component {
        Component {
            reference: reference.into(),
            part_id: "C".into(),
            value: None,
            category: Some("passive".into()),
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some(a.into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "2".into(), net: Some(b.into()), pin_role: None },
            ],
        }
    }

    fn net_with_role(name: &str, reference: &str, pin_id: &str, role: &str) -> Net {
        Net {
            name: name.into(),
            endpoints: vec![Endpoint {
                reference: reference.into(),
                pin_id: pin_id.into(),
                pin_name: pin_id.into(),
                pin_role: Some(role.into()),
                component_category: Some("MOSFET".into()),
            }],
        }
    }

    #[test]
    fn extracts_c_direct_rule_from_single_capacitor() {
        let snapshot = Snapshot {
            components: vec![cap("C1", "VBUS", "GND")],
            nets: vec![net_with_role("VBUS", "Q1", "1", "mosfet_drain"), net_with_role("GND", "Q1", "2", "mosfet_source")],
        };
        let rules = extract_rules(&snapshot);
        assert_eq!(rules.len(), 1);
        assert!(matches!(rules[0], Rule::CDirect { .. }));
    }

    #[test]
    fn self_loop_capacitor_yields_no_rule() {
        let snapshot = Snapshot {
            components: vec![cap("C1", "VBUS", "VBUS")],
            nets: vec![net_with_role("VBUS", "Q1", "1", "mosfet_drain")],
        };
        assert!(extract_rules(&snapshot).is_empty());
    }
}
