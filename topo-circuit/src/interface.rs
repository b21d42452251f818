//! Interface Checker: end-to-end driver-output -> (resistor | diode)* ->
//! MOSFET-gate reachability, gate-resistor presence, Kelvin-source wiring,
//! and bootstrap-capacitor presence.

use topo_common::{Component, KgStore, Pin, Snapshot};

use crate::graph;

/// Gate-driver part ids recognised even when the knowledge graph carries no
/// entry for them, with hardcoded pin-name fallbacks.
const KNOWN_GATE_DRIVER_IDS: [&str; 4] = ["UCC27211", "UCC27511", "UCC5390E", "UCC21710"];
const OUTPUT_PIN_NAME_FALLBACKS: [&str; 3] = ["OUT", "OUTH", "OUTL"];
const GATE_PIN_NAME_FALLBACKS: [&str; 2] = ["G", "GATE"];

fn is_gate_driver(component: &Component, kg: &KgStore) -> bool {
    kg.category_of(&component.part_id, &component.reference) == "gate-driver"
        || KNOWN_GATE_DRIVER_IDS.contains(&component.part_id.as_str())
}

fn driver_output_pins<'a>(component: &'a Component) -> Vec<&'a Pin> {
    let by_role: Vec<&Pin> = component
        .pins
        .iter()
        .filter(|p| matches!(p.pin_role.as_deref(), Some("out") | Some("out_plus") | Some("out_minus") | Some("logic_out")))
        .collect();
    if !by_role.is_empty() {
        return by_role;
    }
    component
        .pins
        .iter()
        .filter(|p| OUTPUT_PIN_NAME_FALLBACKS.contains(&p.pin_name.as_str()))
        .collect()
}

fn mosfet_gate_pin(component: &Component) -> Option<&Pin> {
    component
        .pins
        .iter()
        .find(|p| p.pin_role.as_deref() == Some("mosfet_gate"))
        .or_else(|| component.pins.iter().find(|p| GATE_PIN_NAME_FALLBACKS.contains(&p.pin_name.as_str())))
}

fn is_mosfet(component: &Component, kg: &KgStore) -> bool {
    kg.category_of(&component.part_id, &component.reference) == "MOSFET"
}

fn net_has_resistor(snapshot: &Snapshot, net_name: &str) -> bool {
    snapshot
        .find_net(net_name)
        .map(|net| {
            net.endpoints.iter().any(|ep| {
                snapshot
                    .find_component(&ep.reference)
                    .map(|c| c.part_id == "R")
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

fn check_driver_gate_reachability(snapshot: &Snapshot, driver: &Component, kg: &KgStore, errors: &mut Vec<String>) {
    let mosfets: Vec<&Component> = snapshot.components.iter().filter(|c| is_mosfet(c, kg)).collect();
    for out_pin in driver_output_pins(driver) {
        let Some(out_net) = out_pin.net.as_deref() else {
            continue;
        };

        if !net_has_resistor(snapshot, out_net) {
            errors.push(format!(
                "{}: driver output net ({out_net}) has no gate resistor",
                driver.reference
            ));
        }

        let mut reaches_any_gate = false;
        for mosfet in &mosfets {
            let Some(gate_pin) = mosfet_gate_pin(mosfet) else {
                continue;
            };
            let Some(gate_net) = gate_pin.net.as_deref() else {
                continue;
            };
            if out_net == gate_net {
                errors.push(format!(
                    "Gate driver output ({}, net {out_net}) connects directly to MOSFET gate ({}, net {gate_net}) without gate resistor",
                    driver.reference, mosfet.reference
                ));
                reaches_any_gate = true;
                continue;
            }
            if graph::path_exists(snapshot, out_net, gate_net, &["R", "D"], false, false) {
                reaches_any_gate = true;
            }
        }
        if !reaches_any_gate && !mosfets.is_empty() {
            errors.push(format!(
                "{}: driver output net ({out_net}) does not reach any MOSFET gate",
                driver.reference
            ));
        }
    }
}

fn check_isolated_driver_kelvin_ground(
    snapshot: &Snapshot,
    driver: &Component,
    kg: &KgStore,
    errors: &mut Vec<String>,
) {
    if kg.category_of(&driver.part_id, &driver.reference) != "isolated-driver" {
        return;
    }
    let Some(secondary_gnd_net) = driver
        .pins
        .iter()
        .find(|p| p.pin_role.as_deref() == Some("secondary_gnd"))
        .and_then(|p| p.net.as_deref())
    else {
        return;
    };

    let driver_outs: Vec<&str> = driver_output_pins(driver).into_iter().filter_map(|p| p.net.as_deref()).collect();
    for mosfet in snapshot.components.iter().filter(|c| is_mosfet(c, kg)) {
        let Some(gate_net) = mosfet_gate_pin(mosfet).and_then(|p| p.net.as_deref()) else {
            continue;
        };
        let driven = driver_outs
            .iter()
            .any(|out_net| *out_net == gate_net || graph::path_exists(snapshot, out_net, gate_net, &["R", "D"], false, false));
        if !driven {
            continue;
        }
        let source_net = mosfet
            .pins
            .iter()
            .find(|p| p.pin_role.as_deref() == Some("mosfet_source"))
            .and_then(|p| p.net.as_deref());
        let kelvin_net = mosfet
            .pins
            .iter()
            .find(|p| p.pin_role.as_deref() == Some("mosfet_kelvin_source"))
            .and_then(|p| p.net.as_deref());
        if let (Some(kelvin_net), Some(source_net)) = (kelvin_net, source_net) {
            if secondary_gnd_net == source_net && secondary_gnd_net != kelvin_net {
                errors.push(format!(
                    "{}: isolated driver secondary ground connects to MOSFET source net ({source_net}) instead of kelvin-source net",
                    driver.reference
                ));
            }
        }
    }
}

fn check_ucc27211_bootstrap(driver: &Component, errors: &mut Vec<String>) {
    if driver.part_id != "UCC27211" {
        return;
    }
    let hb_net = driver.pin_by_name("HB").and_then(|p| p.net.as_deref());
    let hs_net = driver.pin_by_name("HS").and_then(|p| p.net.as_deref());
    let (Some(hb_net), Some(hs_net)) = (hb_net, hs_net) else {
        return;
    };
    if hb_net == hs_net {
        errors.push(format!("{}: UCC27211 HB and HS shorted", driver.reference));
    }
}

fn check_isolated_supply_outputs(supply: &Component, kg: &KgStore, errors: &mut Vec<String>) {
    if kg.category_of(&supply.part_id, &supply.reference) != "isolated-supply" {
        return;
    }
    let out_plus = pin_net_by_role_or_name(supply, "out_plus", "+VOUT");
    let out_zero = pin_net_by_role_or_name(supply, "supply_gnd", "0V");
    let out_minus = pin_net_by_role_or_name(supply, "out_minus", "-VOUT");
    for (label, net) in [("+VOUT", out_plus), ("0V", out_zero), ("-VOUT", out_minus)] {
        if net.is_none() {
            errors.push(format!("{}: isolated supply output {label} is not connected", supply.reference));
        }
    }
}

fn pin_net_by_role_or_name<'a>(component: &'a Component, role: &str, name: &str) -> Option<&'a str> {
    component
        .pins
        .iter()
        .find(|p| p.pin_role.as_deref() == Some(role))
        .or_else(|| component.pins.iter().find(|p| p.pin_name == name))
        .and_then(|p| p.net.as_deref())
}

pub fn check(snapshot: &Snapshot, kg: &KgStore) -> Vec<String> {
    let mut errors = Vec::new();
    for component in &snapshot.components {
        if is_gate_driver(component, kg) {
            check_driver_gate_reachability(snapshot, component, kg, &mut errors);
            check_isolated_driver_kelvin_ground(snapshot, component, kg, &mut errors);
            check_ucc27211_bootstrap(component, &mut errors);
        }
        if kg.category_of(&component.part_id, &component.reference) == "isolated-supply" {
            check_isolated_supply_outputs(component, kg, &mut errors);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{KgComponentEntry, KnowledgeGraph};

    fn pin(id: &str, name: &str, role: Option<&str>, net: Option<&str>) -> Pin {
        Pin {
            pin_id: id.into(),
            pin_name: name.into(),
            net: net.map(String::from),
            pin_role: role.map(String::from),
        }
    }

    #[test]
    fn missing_gate_resistor_reports_s4_message() {
        let driver = Component {
            reference: "U1".into(),
            part_id: "UCC5390E".into(),
            value: None,
            category: Some("gate-driver".into()),
            pins: vec![pin("1", "OUT", Some("out"), Some("GATE_NET"))],
        };
        let mosfet = Component {
            reference: "Q1".into(),
            part_id: "IMZA65R015M2H".into(),
            value: None,
            category: Some("MOSFET".into()),
            pins: vec![pin("1", "G", Some("mosfet_gate"), Some("GATE_NET"))],
        };
        let snapshot = Snapshot { components: vec![driver, mosfet], nets: vec![] };
        let mut kg_json = KnowledgeGraph::default();
        kg_json.components.push(KgComponentEntry { id: "UCC5390E".into(), category: Some("gate-driver".into()), ..Default::default() });
        kg_json.components.push(KgComponentEntry { id: "IMZA65R015M2H".into(), category: Some("MOSFET".into()), ..Default::default() });
        let kg = KgStore::new(kg_json, None);

        let errors = check(&snapshot, &kg);
        assert!(errors.iter().any(|e| {
            e.contains("Gate driver output") && e.contains("connects directly to MOSFET") && e.contains("without gate resistor")
        }));
    }

    #[test]
    fn driver_output_with_resistor_and_reachable_gate_is_clean() {
        let driver = Component {
            reference: "U1".into(),
            part_id: "UCC5390E".into(),
            value: None,
            category: Some("gate-driver".into()),
            pins: vec![pin("1", "OUT", Some("out"), Some("OUT_NET"))],
        };
        let resistor = Component {
            reference: "R1".into(),
            part_id: "R".into(),
            value: None,
            category: Some("passive".into()),
            pins: vec![
                pin("1", "1", None, Some("OUT_NET")),
                pin("2", "2", None, Some("GATE_NET")),
            ],
        };
        let mosfet = Component {
            reference: "Q1".into(),
            part_id: "IMZA65R015M2H".into(),
            value: None,
            category: Some("MOSFET".into()),
            pins: vec![pin("1", "G", Some("mosfet_gate"), Some("GATE_NET"))],
        };
        let snapshot = Snapshot { components: vec![driver, resistor, mosfet], nets: vec![] };
        let mut kg_json = KnowledgeGraph::default();
        kg_json.components.push(KgComponentEntry { id: "UCC5390E".into(), category: Some("gate-driver".into()), ..Default::default() });
        let kg = KgStore::new(kg_json, None);

        let errors = check(&snapshot, &kg);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }
}
