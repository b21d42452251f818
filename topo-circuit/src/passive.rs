//! Passive Classifier & Bipartite Builder: recognises R/C/L/D components and
//! builds the component<->net bipartite graph used by reachability
//! queries, plus the driver-gate link fingerprint consumed by the Rule
//! Checker and Skeleton Matcher.

use std::collections::{HashSet, VecDeque};

use topo_common::{Component, Snapshot};

const ONE_LETTER_PASSIVES: [&str; 4] = ["R", "C", "L", "D"];

/// Classify a component as a one-letter passive (`R`/`C`/`L`/`D`), or
/// `None` if it isn't one. A component is passive if its `part_id` is
/// itself one of the one-letter ids, or its category is `passive` and its
/// reference-designator prefix matches.
pub fn classify_passive(component: &Component) -> Option<char> {
    if let Some(ch) = ONE_LETTER_PASSIVES
        .iter()
        .find(|p| **p == component.part_id)
        .and_then(|p| p.chars().next())
    {
        return Some(ch);
    }
    if component.category.as_deref() != Some("passive") {
        return None;
    }
    let prefix = component.reference.chars().next()?.to_ascii_uppercase();
    if ONE_LETTER_PASSIVES.iter().any(|p| p.starts_with(prefix)) {
        Some(prefix)
    } else {
        None
    }
}

fn comp_node(reference: &str) -> String {
    format!("comp:{reference}")
}

fn net_node(name: &str) -> String {
    format!("net:{name}")
}

/// Bipartite graph of `comp:<ref>` and `net:<name>` nodes, built on demand
/// from an immutable snapshot and never outliving one verification.
pub struct BipartiteGraph<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> BipartiteGraph<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        BipartiteGraph { snapshot }
    }

    fn neighbors(&self, node: &str, allow_caps: bool) -> Vec<String> {
        if let Some(net_name) = node.strip_prefix("net:") {
            self.snapshot
                .find_net(net_name)
                .map(|net| net.endpoints.iter().map(|ep| comp_node(&ep.reference)).collect())
                .unwrap_or_default()
        } else if let Some(reference) = node.strip_prefix("comp:") {
            let Some(comp) = self.snapshot.find_component(reference) else {
                return Vec::new();
            };
            if !allow_caps && classify_passive(comp) == Some('C') {
                return Vec::new();
            }
            comp.pins
                .iter()
                .filter_map(|p| p.net.as_deref())
                .map(net_node)
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Reachability between two net nodes, undirected by construction
    /// (BFS over an adjacency relation built the same way from either
    /// side). `allow_caps = true` lets capacitors act as edges (useful for
    /// "is a bypass/filter element present"); `allow_caps = false` models a
    /// DC path, where a capacitor blocks.
    pub fn path_exists(&self, start_net: &str, end_net: &str, allow_caps: bool) -> bool {
        if start_net == end_net {
            return true;
        }
        let start = net_node(start_net);
        let end = net_node(end_net);
        let mut seen: HashSet<String> = HashSet::from([start.clone()]);
        let mut queue: VecDeque<String> = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for neighbor in self.neighbors(&node, allow_caps) {
                if neighbor == end {
                    return true;
                }
                if seen.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
        }
        false
    }
}

/// Pin roles that count as a gate-driver output.
const DRIVER_OUT_ROLES: [&str; 6] = ["out", "out_plus", "out_minus", "gate_ho", "gate_lo", "logic_out"];

/// Ground-like roles a net must carry an endpoint of to count as a
/// reference net for the shunt-capacitor fingerprint bit below.
const GND_ROLES: [&str; 3] = ["supply_gnd", "mosfet_source", "mosfet_kelvin_source"];

/// Passive part ids allowed when asking whether a driver output can reach a
/// gate at all (the link's existence).
const LINK_PARTS: [&str; 4] = ["R", "C", "L", "D"];
/// Passive part ids allowed when asking whether that reach is a DC path
/// (capacitors block DC, so they're excluded here but not above).
const DC_LINK_PARTS: [&str; 3] = ["R", "L", "D"];

/// A driver-output-to-MOSFET-gate connection, fingerprinted by the passive
/// topology between the two nets rather than by net name, so a reference
/// link and a candidate link (drawn on different net names) can still be
/// matched against each other. Consumed by the Rule Checker's
/// `check_driver_gate_links`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverGateLink {
    pub driver_ref: String,
    pub driver_part_id: String,
    pub driver_category: Option<String>,
    pub driver_role: String,
    pub gate_ref: String,
    pub gate_part_id: String,
    pub gate_category: Option<String>,
    pub dc_path: bool,
    pub has_series_resistor: bool,
    pub has_shunt_cap: bool,
}

struct DriverOrGatePin<'a> {
    reference: &'a str,
    part_id: &'a str,
    category: Option<&'a str>,
    role: &'a str,
    net: &'a str,
}

fn driver_pins(snapshot: &Snapshot) -> Vec<DriverOrGatePin<'_>> {
    let mut out = Vec::new();
    for comp in &snapshot.components {
        for pin in &comp.pins {
            let (Some(role), Some(net)) = (pin.pin_role.as_deref(), pin.net.as_deref()) else { continue };
            if DRIVER_OUT_ROLES.contains(&role) {
                out.push(DriverOrGatePin { reference: &comp.reference, part_id: &comp.part_id, category: comp.category.as_deref(), role, net });
            }
        }
    }
    out
}

fn gate_pins(snapshot: &Snapshot) -> Vec<DriverOrGatePin<'_>> {
    let mut out = Vec::new();
    for comp in &snapshot.components {
        for pin in &comp.pins {
            if pin.pin_role.as_deref() != Some("mosfet_gate") {
                continue;
            }
            if let Some(net) = pin.net.as_deref() {
                out.push(DriverOrGatePin { reference: &comp.reference, part_id: &comp.part_id, category: comp.category.as_deref(), role: "mosfet_gate", net });
            }
        }
    }
    out
}

/// Whether `gate_net` carries a capacitor to a ground-like reference net —
/// a noise-filter shunt cap, distinct from the drive path itself.
fn gate_has_shunt_cap(snapshot: &Snapshot, gate_net: &str) -> bool {
    let is_reference_net = |name: &str| -> bool {
        name.eq_ignore_ascii_case("gnd")
            || snapshot
                .find_net(name)
                .map(|net| net.endpoints.iter().any(|ep| ep.pin_role.as_deref().map(|r| GND_ROLES.contains(&r)).unwrap_or(false)))
                .unwrap_or(false)
    };
    snapshot.components.iter().filter(|c| classify_passive(c) == Some('C')).any(|c| {
        let nets: Vec<&str> = c.pins.iter().filter_map(|p| p.net.as_deref()).collect();
        nets.contains(&gate_net) && nets.iter().any(|n| *n != gate_net && is_reference_net(n))
    })
}

/// Compute the driver-gate link fingerprint for every gate reachable from a
/// driver output through a passive (R/C/L/D) path, same net included.
pub fn compute_driver_gate_links(snapshot: &Snapshot) -> Vec<DriverGateLink> {
    let mut links = Vec::new();
    for driver in driver_pins(snapshot) {
        for gate in gate_pins(snapshot) {
            let same_net = driver.net == gate.net;
            if !same_net && !crate::graph::path_exists(snapshot, driver.net, gate.net, &LINK_PARTS, false, false) {
                continue;
            }
            let dc_path = same_net || crate::graph::path_exists(snapshot, driver.net, gate.net, &DC_LINK_PARTS, false, false);
            let has_series_resistor = !same_net && crate::graph::path_exists(snapshot, driver.net, gate.net, &["R"], false, false);
            links.push(DriverGateLink {
                driver_ref: driver.reference.to_string(),
                driver_part_id: driver.part_id.to_string(),
                driver_category: driver.category.map(str::to_string),
                driver_role: driver.role.to_string(),
                gate_ref: gate.reference.to_string(),
                gate_part_id: gate.part_id.to_string(),
                gate_category: gate.category.map(str::to_string),
                dc_path,
                has_series_resistor,
                has_shunt_cap: gate_has_shunt_cap(snapshot, gate.net),
            });
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{Component, Net, Pin};

    fn passive(reference: &str, part_id: &str, a: &str, b: &str) -> Component {
        Component {
            reference: reference.into(),
            part_id: part_id.into(),
            value: None,
            category: Some("passive".into()),
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some(a.into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "2".into(), net: Some(b.into()), pin_role: None },
            ],
        }
    }

    #[test]
    fn classifies_one_letter_passives_by_part_id() {
        let r = passive("R1", "R", "A", "B");
        assert_eq!(classify_passive(&r), Some('R'));
    }

    #[test]
    fn non_passive_category_is_not_classified() {
        let mut q = passive("Q1", "IMZA65R015M2H", "A", "B");
        q.category = Some("MOSFET".into());
        assert_eq!(classify_passive(&q), None);
    }

    #[test]
    fn bipartite_path_respects_allow_caps() {
        let snap = Snapshot {
            components: vec![passive("C1", "C", "A", "B")],
            nets: vec![Net { name: "A".into(), endpoints: vec![] }, Net { name: "B".into(), endpoints: vec![] }],
        };
        let graph = BipartiteGraph::new(&snap);
        assert!(graph.path_exists("A", "B", true));
        assert!(!graph.path_exists("A", "B", false));
    }
}
