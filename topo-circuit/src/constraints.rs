//! Constraint Checker (Phase 2): generic per-component constraints plus a
//! closed set of part-specific checks. The only stage allowed to fast-fail
//! the pipeline, and only for the complex-task family (see
//! `crate::system`).

use once_cell::sync::Lazy;
use std::collections::HashSet;

use topo_common::{GenericConstraint, KgStore, Snapshot, TaskId};

use crate::graph;
use crate::passive;

/// Tasks where a gate net with a single endpoint is tolerated (the
/// candidate is expected to float the gate deliberately, e.g. a populate-
/// later footprint).
pub static GATE_FLOAT_TASKS: Lazy<HashSet<TaskId>> = Lazy::new(|| {
    [TaskId(8), TaskId(9), TaskId(10), TaskId(11), TaskId(12)].into_iter().collect()
});

/// Strict half-bridge tasks that must carry full VBUS decoupling, MOSFET
/// pin connectivity, and Kelvin-source-distinctness checks.
pub static STRICT_HALFBRIDGE_TASKS: Lazy<HashSet<TaskId>> = Lazy::new(|| {
    [TaskId(8), TaskId(9), TaskId(10), TaskId(11), TaskId(12)].into_iter().collect()
});

/// Kelvin-source half-bridge tasks where the Kelvin-source net must never
/// reach the power-source net through any passive path.
pub static KS_SOURCE_RLC_TASKS: Lazy<HashSet<TaskId>> =
    Lazy::new(|| [TaskId(9), TaskId(10), TaskId(11)].into_iter().collect());

pub fn check(snapshot: &Snapshot, kg: &KgStore, task_id: TaskId) -> Vec<String> {
    let mut errors = Vec::new();
    for component in &snapshot.components {
        for constraint in kg.generic_constraints(&component.part_id) {
            check_generic_constraint(snapshot, component, constraint, task_id, &mut errors);
        }
        check_part_specific(snapshot, component, kg, task_id, &mut errors);
    }
    if task_id.0 == 6 {
        check_tps54302_diode_pairs(snapshot, &mut errors);
    }
    if STRICT_HALFBRIDGE_TASKS.contains(&task_id) {
        check_mosfet_pins_connected(snapshot, &mut errors);
        check_kelvin_source_distinct(snapshot, &mut errors);
        check_vbus_decoupling_caps(snapshot, &mut errors);
    }
    if task_id.0 == 15 {
        check_ucc5390e_vin_minus(snapshot, &mut errors);
    }
    if task_id.0 == 13 {
        check_ucc27511_outputs(snapshot, &mut errors);
    }
    errors
}

fn check_generic_constraint(
    snapshot: &Snapshot,
    component: &topo_common::Component,
    constraint: &GenericConstraint,
    task_id: TaskId,
    errors: &mut Vec<String>,
) {
    let reference = &component.reference;
    match constraint {
        GenericConstraint::MustBeConnected { pins } => {
            for pin_id in pins {
                if component.net_of(pin_id).is_none() {
                    errors.push(format!("{reference}: pin {pin_id} is not connected"));
                }
            }
        }
        GenericConstraint::SupplyPair { vdd_pin, gnd_pin } => {
            let vdd = component.net_of(vdd_pin);
            let gnd = component.net_of(gnd_pin);
            match (vdd, gnd) {
                (Some(v), Some(g)) if v == g => {
                    errors.push(format!("{reference}: supply pins {vdd_pin}/{gnd_pin} shorted on net {v}"));
                }
                (None, _) | (_, None) => {
                    errors.push(format!("{reference}: supply pins {vdd_pin}/{gnd_pin} not both connected"));
                }
                _ => {}
            }
        }
        GenericConstraint::DifferentialPairMustBeDistinct { pins } => {
            if let [p, n] = pins.as_slice() {
                let p_net = component.net_of(p);
                let n_net = component.net_of(n);
                if let (Some(a), Some(b)) = (p_net, n_net) {
                    if a == b {
                        errors.push(format!("{reference}: differential pins on same net ({p}={a})"));
                    }
                }
            }
        }
        GenericConstraint::DrivingPair { gate_pin, source_pin: _ } => {
            let Some(gate_net) = component.net_of(gate_pin) else {
                errors.push(format!("{reference}: gate pin {gate_pin} is not connected"));
                return;
            };
            if GATE_FLOAT_TASKS.contains(&task_id) {
                return;
            }
            let endpoint_count = snapshot.find_net(gate_net).map(|n| n.endpoints.len()).unwrap_or(0);
            if endpoint_count < 2 {
                errors.push(format!(
                    "{reference}: gate net ({gate_net}) should have a pull resistor or driver (only 1 endpoint)"
                ));
            }
        }
    }
}

fn check_part_specific(
    snapshot: &Snapshot,
    component: &topo_common::Component,
    kg: &KgStore,
    task_id: TaskId,
    errors: &mut Vec<String>,
) {
    let reference = &component.reference;

    match component.part_id.as_str() {
        "ACS37010" => {
            let ip_plus = component.net_of("IP+");
            let ip_minus = component.net_of("IP-");
            if let (Some(a), Some(b)) = (ip_plus, ip_minus) {
                if a == b {
                    errors.push(format!("{reference}: IP+ and IP- shorted"));
                }
            }
            let vref = component.net_of("VREF");
            let gnd = component.net_of("GND");
            if let (Some(a), Some(b)) = (vref, gnd) {
                if a == b {
                    errors.push(format!("{reference}: VREF should not be tied to GND"));
                }
            }
        }
        "MGJ2D121505SC" => {
            let primary_pins = kg.primary_pins("MGJ2D121505SC");
            let mut seen_nets: HashSet<&str> = HashSet::new();
            for pin_id in primary_pins {
                if let Some(net) = component.net_of(pin_id) {
                    if !seen_nets.insert(net) {
                        errors.push(format!("{reference}: isolated supply primary input pins shorted"));
                        break;
                    }
                }
            }
        }
        _ => {}
    }

    check_kelvin_source(snapshot, component, task_id, errors);
    check_bootstrap_cap(snapshot, component, errors);
    check_isolated_driver_out_resistor(snapshot, component, kg, errors);
}

fn is_connected_pin(pin: &topo_common::Pin) -> bool {
    match pin.net.as_deref() {
        Some(net) => !matches!(net.to_uppercase().as_str(), "NC" | "__NOCONNECT"),
        None => false,
    }
}

/// Task 6's diode-detection sweep: any 2-pin diode between two nets marks
/// that net pair as a known diode path, then every TPS54302 pin pair that
/// reuses one of those net pairs is flagged — a diode accidentally wired
/// in place of the intended passive.
fn check_tps54302_diode_pairs(snapshot: &Snapshot, errors: &mut Vec<String>) {
    let mut diode_pairs: HashSet<(String, String)> = HashSet::new();
    for comp in &snapshot.components {
        if passive::classify_passive(comp) != Some('D') {
            continue;
        }
        let nets: Vec<&str> = comp.pins.iter().filter(|p| is_connected_pin(p)).filter_map(|p| p.net.as_deref()).collect();
        if let [net_a, net_b] = nets[..] {
            diode_pairs.insert(sorted_pair(net_a, net_b));
        }
    }
    if diode_pairs.is_empty() {
        return;
    }
    for comp in &snapshot.components {
        if comp.part_id != "TPS54302" {
            continue;
        }
        let reference = &comp.reference;
        for (pin_a, pin_b) in [("1", "2"), ("2", "3"), ("1", "6")] {
            let (Some(a), Some(b)) = (
                comp.pin(pin_a).or_else(|| comp.pin_by_name(pin_a)),
                comp.pin(pin_b).or_else(|| comp.pin_by_name(pin_b)),
            ) else {
                continue;
            };
            if !(is_connected_pin(a) && is_connected_pin(b)) {
                continue;
            }
            let (Some(net_a), Some(net_b)) = (a.net.as_deref(), b.net.as_deref()) else { continue };
            if diode_pairs.contains(&sorted_pair(net_a, net_b)) {
                errors.push(format!("{reference}: diode detected between pins {pin_a} and {pin_b} ({net_a} <-> {net_b})"));
            }
        }
    }
}

fn sorted_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Every MOSFET pin must connect to a real net, strict half-bridge tasks
/// only: populate-later/floating footprints aren't tolerated here.
fn check_mosfet_pins_connected(snapshot: &Snapshot, errors: &mut Vec<String>) {
    for comp in &snapshot.components {
        if comp.category.as_deref() != Some("MOSFET") {
            continue;
        }
        for pin in &comp.pins {
            if !is_connected_pin(pin) {
                let pin_id = if pin.pin_id.is_empty() { pin.pin_name.as_str() } else { pin.pin_id.as_str() };
                let pin_id = if pin_id.is_empty() { "?" } else { pin_id };
                errors.push(format!(
                    "{}: pin {pin_id} is unconnected (MOSFET pins must all connect)",
                    comp.reference
                ));
                break;
            }
        }
    }
}

/// Kelvin-source nets must be distinct across MOSFETs: each MOSFET's own
/// Kelvin-source pins must agree with each other (checked separately, see
/// `check_kelvin_source`), and no two MOSFETs may share a Kelvin-source
/// net.
fn check_kelvin_source_distinct(snapshot: &Snapshot, errors: &mut Vec<String>) {
    let mut ks_by_ref: Vec<(&str, HashSet<&str>)> = Vec::new();
    for comp in &snapshot.components {
        if comp.category.as_deref() != Some("MOSFET") {
            continue;
        }
        let ks_nets: HashSet<&str> = comp
            .pins
            .iter()
            .filter(|p| p.pin_role.as_deref() == Some("mosfet_kelvin_source") && is_connected_pin(p))
            .filter_map(|p| p.net.as_deref())
            .collect();
        if ks_nets.is_empty() {
            continue;
        }
        if ks_nets.len() > 1 {
            errors.push(format!("{}: kelvin source pins must be tied to a single net", comp.reference));
        }
        ks_by_ref.push((&comp.reference, ks_nets));
    }

    if ks_by_ref.len() < 2 {
        return;
    }

    let mut unique_nets: HashSet<&str> = HashSet::new();
    for (_, nets) in &ks_by_ref {
        unique_nets.extend(nets.iter());
    }
    if unique_nets.len() < ks_by_ref.len() {
        errors.push("Kelvin source nets must be distinct between MOSFETs".to_string());
    }
}

/// Every decoupling capacitor in a strict half-bridge snapshot must connect
/// specifically between a net literally named `VBUS+` and a net named
/// `GND` or `PGND`, case-insensitively. Unrelated to any particular
/// driver's part id or a capacitor count.
fn check_vbus_decoupling_caps(snapshot: &Snapshot, errors: &mut Vec<String>) {
    const ALLOWED_GROUND: [&str; 2] = ["GND", "PGND"];
    for comp in &snapshot.components {
        if passive::classify_passive(comp) != Some('C') {
            continue;
        }
        let reference = &comp.reference;
        let nets_upper: HashSet<String> = comp
            .pins
            .iter()
            .filter(|p| is_connected_pin(p))
            .filter_map(|p| p.net.as_deref())
            .map(|n| n.to_uppercase())
            .collect();
        if nets_upper.len() != 2 || !nets_upper.contains("VBUS+") {
            errors.push(format!("{reference}: decoupling cap must connect between VBUS+ and GND/PGND"));
            continue;
        }
        let other_is_ground = nets_upper
            .iter()
            .find(|n| n.as_str() != "VBUS+")
            .map(|n| ALLOWED_GROUND.contains(&n.as_str()))
            .unwrap_or(false);
        if !other_is_ground {
            errors.push(format!("{reference}: decoupling cap must connect between VBUS+ and GND/PGND"));
        }
    }
}

/// UCC27511 OUTH/OUTL must each connect, and neither may tie directly to
/// GND/PGND. Task 13 only.
fn check_ucc27511_outputs(snapshot: &Snapshot, errors: &mut Vec<String>) {
    for comp in &snapshot.components {
        if comp.part_id != "UCC27511" {
            continue;
        }
        let reference = &comp.reference;
        for label in ["OUTH", "OUTL"] {
            let Some(pin) = comp.pin(label).or_else(|| comp.pin_by_name(label)) else { continue };
            if !is_connected_pin(pin) {
                errors.push(format!("{reference}: {label} must be connected"));
                continue;
            }
            let net = pin.net.as_deref().unwrap_or("");
            if matches!(net.to_uppercase().as_str(), "GND" | "PGND") {
                errors.push(format!("{reference}: {label} must not be tied to GND/PGND ({net})"));
            }
        }
    }
}

/// UCC5390E's VEE2 (aka VIN-) must connect, and its net must carry more
/// than one endpoint. Task 15 only.
fn check_ucc5390e_vin_minus(snapshot: &Snapshot, errors: &mut Vec<String>) {
    for comp in &snapshot.components {
        if comp.part_id != "UCC5390E" {
            continue;
        }
        let reference = &comp.reference;
        let Some(pin) = comp.pin("VEE2").or_else(|| comp.pin_by_name("VEE2")).or_else(|| comp.pin("VIN-")).or_else(|| comp.pin_by_name("VIN-")) else {
            continue;
        };
        if !is_connected_pin(pin) {
            errors.push(format!("{reference}: VEE2 (VIN-) must be connected"));
            continue;
        }
        let net_name = pin.net.as_deref().unwrap_or("");
        let endpoint_count = snapshot.find_net(net_name).map(|n| n.endpoints.len()).unwrap_or(0);
        if endpoint_count <= 1 {
            errors.push(format!("{reference}: VEE2 (VIN-) net appears floating ({net_name})"));
        }
    }
}

fn check_kelvin_source(
    snapshot: &Snapshot,
    component: &topo_common::Component,
    task_id: TaskId,
    errors: &mut Vec<String>,
) {
    let kelvin = component
        .pins
        .iter()
        .find(|p| p.pin_role.as_deref() == Some("mosfet_kelvin_source"));
    let source = component
        .pins
        .iter()
        .find(|p| p.pin_role.as_deref() == Some("mosfet_source"));
    let (Some(kelvin), Some(source)) = (kelvin, source) else {
        return;
    };
    let (Some(ks_net), Some(src_net)) = (&kelvin.net, &source.net) else {
        return;
    };
    if ks_net == src_net {
        errors.push(format!(
            "{}: kelvin source should not be shorted to source net ({src_net})",
            component.reference
        ));
        return;
    }
    if KS_SOURCE_RLC_TASKS.contains(&task_id)
        && graph::nets_connected(snapshot, ks_net, src_net, &graph::PASSIVE_INDUCED_PARTS)
    {
        errors.push(format!(
            "{}: kelvin source net ({ks_net}) must not connect to source net ({src_net}) through any passive path",
            component.reference
        ));
    }
}

fn check_bootstrap_cap(snapshot: &Snapshot, component: &topo_common::Component, errors: &mut Vec<String>) {
    let hb_net = component
        .pins
        .iter()
        .find(|p| p.pin_role.as_deref() == Some("halfbridge_hb"))
        .and_then(|p| p.net.as_deref());
    let hs_net = component
        .pins
        .iter()
        .find(|p| p.pin_role.as_deref() == Some("halfbridge_hs"))
        .and_then(|p| p.net.as_deref());
    let (Some(hb_net), Some(hs_net)) = (hb_net, hs_net) else {
        return;
    };
    let has_bootstrap_cap = snapshot.components.iter().any(|c| {
        c.part_id == "C"
            && c.pins.iter().any(|p| p.net.as_deref() == Some(hb_net))
            && c.pins.iter().any(|p| p.net.as_deref() == Some(hs_net))
    });
    if !has_bootstrap_cap {
        errors.push(format!(
            "{}: missing bootstrap capacitor between HB ({hb_net}) and HS ({hs_net})",
            component.reference
        ));
    }
}

fn check_isolated_driver_out_resistor(
    snapshot: &Snapshot,
    component: &topo_common::Component,
    kg: &KgStore,
    errors: &mut Vec<String>,
) {
    let category = kg.category_of(&component.part_id, &component.reference);
    if category != "isolated-driver" && category != "isolated-supply" {
        return;
    }
    let Some(out_pin) = component.pins.iter().find(|p| {
        matches!(p.pin_role.as_deref(), Some("logic_out") | Some("out"))
    }) else {
        return;
    };
    let Some(out_net) = out_pin.net.as_deref() else {
        return;
    };
    let has_resistor = snapshot
        .find_net(out_net)
        .map(|net| {
            net.endpoints.iter().any(|ep| {
                snapshot
                    .find_component(&ep.reference)
                    .map(|c| c.part_id == "R")
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false);
    if !has_resistor {
        errors.push(format!(
            "{}: isolated driver OUT net ({out_net}) has no series resistor",
            component.reference
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{Component, KnowledgeGraph, KgComponentEntry, Net, Pin};

    fn pin(id: &str, role: &str, net: &str) -> Pin {
        Pin { pin_id: id.into(), pin_name: id.into(), net: Some(net.into()), pin_role: Some(role.into()) }
    }

    #[test]
    fn differential_pair_shorted_reports_s2_message() {
        let component = Component {
            reference: "U1".into(),
            part_id: "AMC1350".into(),
            value: None,
            category: Some("opamp".into()),
            pins: vec![pin("1", "diff_p", "VIN_DIV"), pin("2", "diff_n", "VIN_DIV")],
        };
        let snapshot = Snapshot { components: vec![component.clone()], nets: vec![] };
        let constraint = GenericConstraint::DifferentialPairMustBeDistinct {
            pins: vec!["1".into(), "2".into()],
        };
        let mut errors = Vec::new();
        check_generic_constraint(&snapshot, &component, &constraint, TaskId(1), &mut errors);
        assert_eq!(errors, vec!["U1: differential pins on same net (1=VIN_DIV)"]);
    }

    #[test]
    fn kelvin_source_shorted_to_source_reports_s3_message() {
        let component = Component {
            reference: "Q2".into(),
            part_id: "IMZA65R015M2H".into(),
            value: None,
            category: Some("MOSFET".into()),
            pins: vec![pin("1", "mosfet_source", "VSW"), pin("2", "mosfet_kelvin_source", "VSW")],
        };
        let snapshot = Snapshot { components: vec![component.clone()], nets: vec![] };
        let mut errors = Vec::new();
        check_kelvin_source(&snapshot, &component, TaskId(1), &mut errors);
        assert_eq!(errors, vec!["Q2: kelvin source should not be shorted to source net (VSW)"]);
    }

    #[test]
    fn must_be_connected_flags_missing_net() {
        let component = Component {
            reference: "U3".into(),
            part_id: "UCC5390E".into(),
            value: None,
            category: None,
            pins: vec![Pin { pin_id: "1".into(), pin_name: "EN".into(), net: None, pin_role: None }],
        };
        let snapshot = Snapshot { components: vec![component.clone()], nets: vec![] };
        let constraint = GenericConstraint::MustBeConnected { pins: vec!["1".into()] };
        let mut errors = Vec::new();
        check_generic_constraint(&snapshot, &component, &constraint, TaskId(1), &mut errors);
        assert_eq!(errors, vec!["U3: pin 1 is not connected"]);
    }

    #[test]
    fn isolated_supply_primary_pins_shorted() {
        let mut entries = KnowledgeGraph::default();
        entries.components.push(KgComponentEntry {
            id: "MGJ2D121505SC".into(),
            primary_pins: vec!["1".into(), "2".into()],
            ..Default::default()
        });
        let kg = KgStore::new(entries, None);
        let component = Component {
            reference: "PS1".into(),
            part_id: "MGJ2D121505SC".into(),
            value: None,
            category: None,
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "VIN+".into(), net: Some("VIN".into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "VIN-".into(), net: Some("VIN".into()), pin_role: None },
            ],
        };
        let snapshot = Snapshot { components: vec![component.clone()], nets: vec![Net { name: "VIN".into(), endpoints: vec![] }] };
        let mut errors = Vec::new();
        check_part_specific(&snapshot, &component, &kg, TaskId(1), &mut errors);
        assert!(errors.iter().any(|e| e.contains("isolated supply primary input pins shorted")));
    }

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
    fn acs37010_vref_shorted_to_gnd() {
        let component = Component {
            reference: "U2".into(),
            part_id: "ACS37010".into(),
            value: None,
            category: None,
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "VREF".into(), net: Some("GND".into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "GND".into(), net: Some("GND".into()), pin_role: None },
            ],
        };
        let kg = KgStore::new(KnowledgeGraph::default(), None);
        let snapshot = Snapshot { components: vec![component.clone()], nets: vec![] };
        let mut errors = Vec::new();
        check_part_specific(&snapshot, &component, &kg, TaskId(1), &mut errors);
        assert!(errors.contains(&"U2: VREF should not be tied to GND".to_string()));
    }

    #[test]
    fn tps54302_diode_pair_detected() {
        let diode = Component {
            reference: "D1".into(),
            part_id: "D".into(),
            value: None,
            category: Some("passive".into()),
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some("VSW".into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "2".into(), net: Some("GND".into()), pin_role: None },
            ],
        };
        let buck = Component {
            reference: "U1".into(),
            part_id: "TPS54302".into(),
            value: None,
            category: None,
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some("VSW".into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "2".into(), net: Some("GND".into()), pin_role: None },
            ],
        };
        let snapshot = Snapshot { components: vec![diode, buck], nets: vec![] };
        let mut errors = Vec::new();
        check_tps54302_diode_pairs(&snapshot, &mut errors);
        assert_eq!(errors, vec!["U1: diode detected between pins 1 and 2 (VSW <-> GND)".to_string()]);
    }

    #[test]
    fn mosfet_unconnected_pin_reported() {
        let component = Component {
            reference: "Q1".into(),
            part_id: "IMZA65R015M2H".into(),
            value: None,
            category: Some("MOSFET".into()),
            pins: vec![Pin { pin_id: "1".into(), pin_name: "D".into(), net: None, pin_role: None }],
        };
        let snapshot = Snapshot { components: vec![component], nets: vec![] };
        let mut errors = Vec::new();
        check_mosfet_pins_connected(&snapshot, &mut errors);
        assert_eq!(errors, vec!["Q1: pin 1 is unconnected (MOSFET pins must all connect)".to_string()]);
    }

    #[test]
    fn kelvin_source_nets_must_be_distinct_across_mosfets() {
        let mosfet = |reference: &str, net: &str| Component {
            reference: reference.into(),
            part_id: "IMZA65R015M2H".into(),
            value: None,
            category: Some("MOSFET".into()),
            pins: vec![pin("1", "mosfet_kelvin_source", net)],
        };
        let snapshot = Snapshot { components: vec![mosfet("Q1", "KS"), mosfet("Q2", "KS")], nets: vec![] };
        let mut errors = Vec::new();
        check_kelvin_source_distinct(&snapshot, &mut errors);
        assert_eq!(errors, vec!["Kelvin source nets must be distinct between MOSFETs".to_string()]);
    }

    #[test]
    fn vbus_decoupling_cap_wrong_nets_reported() {
        let good = passive("C1", "C", "VBUS+", "GND");
        let bad = passive("C2", "C", "VBUS+", "VOUT");
        let snapshot = Snapshot { components: vec![good, bad], nets: vec![] };
        let mut errors = Vec::new();
        check_vbus_decoupling_caps(&snapshot, &mut errors);
        assert_eq!(errors, vec!["C2: decoupling cap must connect between VBUS+ and GND/PGND".to_string()]);
    }

    #[test]
    fn ucc27511_output_tied_to_gnd_reported() {
        let component = Component {
            reference: "U4".into(),
            part_id: "UCC27511".into(),
            value: None,
            category: None,
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "OUTH".into(), net: Some("GATE_H".into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "OUTL".into(), net: Some("GND".into()), pin_role: None },
            ],
        };
        let snapshot = Snapshot { components: vec![component], nets: vec![] };
        let mut errors = Vec::new();
        check_ucc27511_outputs(&snapshot, &mut errors);
        assert_eq!(errors, vec!["U4: OUTL must not be tied to GND/PGND (GND)".to_string()]);
    }

    #[test]
    fn ucc5390e_vee2_floating_net_reported() {
        let component = Component {
            reference: "U5".into(),
            part_id: "UCC5390E".into(),
            value: None,
            category: None,
            pins: vec![Pin { pin_id: "1".into(), pin_name: "VEE2".into(), net: Some("VEE2_NET".into()), pin_role: None }],
        };
        let snapshot = Snapshot {
            components: vec![component],
            nets: vec![Net { name: "VEE2_NET".into(), endpoints: vec![] }],
        };
        let mut errors = Vec::new();
        check_ucc5390e_vin_minus(&snapshot, &mut errors);
        assert_eq!(errors, vec!["U5: VEE2 (VIN-) net appears floating (VEE2_NET)".to_string()]);
    }
}
