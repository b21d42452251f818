use std::collections::HashSet;

use topo_common::{EndpointDescriptor, Rule, Snapshot, TaskId};

use crate::graph;
use crate::passive::{self, DriverGateLink};
use crate::rules::describe;

fn endpoint_matches_specific(candidate: &Snapshot, descriptor: &EndpointDescriptor, ep: &topo_common::Endpoint) -> bool {
    if let Some(part_id) = &descriptor.part_id {
        let actual = candidate.find_component(&ep.reference).map(|c| &c.part_id);
        if actual != Some(part_id) {
            return false;
        }
    }
    if let Some(role) = &descriptor.pin_role {
        if ep.pin_role.as_deref() != Some(role.as_str()) {
            return false;
        }
    }
    if let Some(pin_id) = &descriptor.pin_id {
        if &ep.pin_id != pin_id {
            return false;
        }
    } else if let Some(pin_name) = &descriptor.pin_name {
        if &ep.pin_name != pin_name {
            return false;
        }
    }
    true
}

fn endpoint_matches_loose(descriptor: &EndpointDescriptor, ep: &topo_common::Endpoint) -> bool {
    let category_ok = descriptor
        .category
        .as_ref()
        .map(|c| ep.component_category.as_deref() == Some(c.as_str()))
        .unwrap_or(true);
    let role_ok = descriptor
        .pin_role
        .as_ref()
        .map(|r| ep.pin_role.as_deref() == Some(r.as_str()))
        .unwrap_or(true);
    category_ok && role_ok && (descriptor.category.is_some() || descriptor.pin_role.is_some())
}

/// Resolve an endpoint descriptor to the set of candidate net names it
/// could refer to, preferring `part_id + pin_role + pin_id/name` matches
/// and falling back to `category + pin_role` when nothing specific is
/// found.
fn resolve(candidate: &Snapshot, descriptor: &EndpointDescriptor) -> HashSet<String> {
    let mut specific = HashSet::new();
    for net in &candidate.nets {
        for ep in &net.endpoints {
            if endpoint_matches_specific(candidate, descriptor, ep) {
                specific.insert(net.name.clone());
            }
        }
    }
    if !specific.is_empty() {
        return specific;
    }
    let mut loose = HashSet::new();
    for net in &candidate.nets {
        for ep in &net.endpoints {
            if endpoint_matches_loose(descriptor, ep) {
                loose.insert(net.name.clone());
            }
        }
    }
    loose
}

fn is_mosfet_source_drain_pair(a: &EndpointDescriptor, b: &EndpointDescriptor) -> bool {
    matches!(
        (a.pin_role.as_deref(), b.pin_role.as_deref()),
        (Some("mosfet_source"), Some("mosfet_drain")) | (Some("mosfet_drain"), Some("mosfet_source"))
    )
}

fn is_tps54302_en(a: &EndpointDescriptor, b: &EndpointDescriptor) -> bool {
    [a, b].iter().any(|d| d.part_id.as_deref() == Some("TPS54302") && d.pin_name.as_deref() == Some("EN"))
}

fn is_ucc27511_outh_outl(a: &EndpointDescriptor, b: &EndpointDescriptor) -> bool {
    let roles = (a.pin_role.as_deref(), b.pin_role.as_deref());
    a.part_id.as_deref() == Some("UCC27511")
        && b.part_id.as_deref() == Some("UCC27511")
        && matches!(roles, (Some("out_plus"), Some("out_minus")) | (Some("out_minus"), Some("out_plus")))
}

/// Task 6's buck-enable rule skips: the enable-divider rules and the
/// VIN/GND, VIN/FB role pairs are checked separately by
/// `check_buck_enable_divider`, not by the generic rule loop.
fn rule_has_pin_role(rule: &Rule, role: &str) -> bool {
    let (a, b) = rule.endpoints();
    a.pin_role.as_deref() == Some(role) || b.pin_role.as_deref() == Some(role)
}

fn rule_has_role_pair(rule: &Rule, role_a: &str, role_b: &str) -> bool {
    let (a, b) = rule.endpoints();
    let roles = (a.pin_role.as_deref(), b.pin_role.as_deref());
    matches!(roles, (x, y) if (x == Some(role_a) && y == Some(role_b)) || (x == Some(role_b) && y == Some(role_a)))
}

/// UCC21710's OUTH/OUTL-to-GATE clamp path: a `sense_minus` endpoint
/// shorted (sharing a net) with an `out_plus`/`out_minus` endpoint on the
/// same part is the documented CLMPI clamp, not a fault. Matched on
/// `pin_role`, not `pin_name`: the rule in question is `R_PATH`, not
/// `C_DIRECT`, since CLMPI/OUTH/OUTL reach GATE through a series resistor.
fn is_ucc21710_gate_short(a: &EndpointDescriptor, b: &EndpointDescriptor) -> bool {
    if a.part_id.as_deref() != Some("UCC21710") || b.part_id.as_deref() != Some("UCC21710") {
        return false;
    }
    let roles = (a.pin_role.as_deref(), b.pin_role.as_deref());
    matches!(
        roles,
        (Some("sense_minus"), Some("out_plus"))
            | (Some("out_plus"), Some("sense_minus"))
            | (Some("sense_minus"), Some("out_minus"))
            | (Some("out_minus"), Some("sense_minus"))
    )
}

/// `p f n u \u{b5} m k M G` SPICE-style magnitude suffixes on a leading
/// numeric literal. `R`/`meg` forms are not recognised, matching the
/// original parser.
fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let split_at = raw.find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))?;
    let (number, suffix) = raw.split_at(split_at);
    let base: f64 = number.parse().ok()?;
    let multiplier = match suffix.chars().next() {
        Some('p') => 1e-12,
        Some('f') => 1e-15,
        Some('n') => 1e-9,
        Some('u') | Some('\u{b5}') => 1e-6,
        Some('m') => 1e-3,
        Some('k') => 1e3,
        Some('M') => 1e6,
        Some('G') => 1e9,
        Some(_) => return None,
        None => 1.0,
    };
    Some(base * multiplier)
}

const OPA328_NEG_IN_NAMES: [&str; 4] = ["-IN", "IN-", "INN", "VINN"];
const OPA328_POS_IN_NAMES: [&str; 4] = ["+IN", "IN+", "INP", "VINP"];

struct GainResistor<'a> {
    reference: &'a str,
    value: Option<f64>,
    value_raw: Option<&'a str>,
    nets: HashSet<&'a str>,
}

fn find_pin_net_by_name<'a>(component: &'a topo_common::Component, candidates: &[&str]) -> Option<&'a str> {
    component
        .pins
        .iter()
        .find(|p| candidates.contains(&p.pin_name.to_uppercase().as_str()))
        .and_then(|p| p.net.as_deref())
}

/// Task 3's gain check: independent of the rule loop. Locates the single
/// OPA328, its `+IN`/`-IN` nets, and requires each to carry exactly two
/// resistors whose ratio sits within ±20% of a fixed 1.47 target.
fn check_p3_gain(candidate: &Snapshot) -> Vec<String> {
    const TARGET: f64 = 1.47;
    const TOLERANCE: f64 = 0.2;
    let min_ratio = TARGET * (1.0 - TOLERANCE);
    let max_ratio = TARGET * (1.0 + TOLERANCE);

    let Some(opa) = candidate.components.iter().find(|c| c.part_id == "OPA328") else {
        return vec!["p3 gain check: OPA328 not found".to_string()];
    };

    let neg_net = find_pin_net_by_name(opa, &OPA328_NEG_IN_NAMES);
    let pos_net = find_pin_net_by_name(opa, &OPA328_POS_IN_NAMES);
    let (Some(neg_net), Some(pos_net)) = (neg_net, pos_net) else {
        return vec!["p3 gain check: missing +IN/-IN nets on OPA328".to_string()];
    };

    let resistors: Vec<GainResistor> = candidate
        .components
        .iter()
        .filter(|c| passive::classify_passive(c) == Some('R'))
        .filter_map(|c| {
            let nets: HashSet<&str> = c.pins.iter().filter_map(|p| p.net.as_deref()).collect();
            if nets.len() != 2 {
                return None;
            }
            Some(GainResistor {
                reference: &c.reference,
                value: c.value.as_deref().and_then(parse_value),
                value_raw: c.value.as_deref(),
                nets,
            })
        })
        .collect();

    let mut errors = Vec::new();
    errors.extend(check_ratio_for_net(&resistors, neg_net, "p3 gain check (-IN)", min_ratio, max_ratio));
    errors.extend(check_ratio_for_net(&resistors, pos_net, "p3 gain check (+IN)", min_ratio, max_ratio));
    errors
}

fn check_ratio_for_net(resistors: &[GainResistor], target_net: &str, label: &str, min_ratio: f64, max_ratio: f64) -> Vec<String> {
    let related: Vec<&GainResistor> = resistors.iter().filter(|r| r.nets.contains(target_net)).collect();
    if related.len() != 2 {
        return vec![format!("{label}: expected 2 resistors on net {target_net}, got {}", related.len())];
    }

    let mut values = Vec::with_capacity(2);
    for r in &related {
        match r.value {
            Some(v) if v > 0.0 => values.push((r.reference, v)),
            _ => {
                return vec![format!(
                    "{label}: invalid resistor value for {} ({})",
                    r.reference,
                    r.value_raw.unwrap_or("")
                )]
            }
        }
    }
    values.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    let ratio = values[1].1 / values[0].1;
    if ratio < min_ratio || ratio > max_ratio {
        return vec!["resistance is wrong".to_string()];
    }
    Vec::new()
}

/// Evaluate extracted rules against a candidate snapshot.
pub fn check_rules(_reference: &Snapshot, candidate: &Snapshot, rules: &[Rule], task_id: TaskId) -> Vec<String> {
    let mut errors = Vec::new();
    for rule in rules {
        let (a, b) = rule.endpoints();

        if task_id.0 == 6 && rule_has_pin_role(rule, "buck_en") {
            continue;
        }
        if task_id.0 == 6 && rule_has_role_pair(rule, "buck_vin", "buck_gnd") {
            continue;
        }
        if task_id.0 == 6 && rule_has_role_pair(rule, "buck_vin", "buck_fb") {
            continue;
        }
        if is_mosfet_source_drain_pair(a, b) && matches!(rule, Rule::CDirect { .. }) {
            continue;
        }
        if is_tps54302_en(a, b) {
            continue;
        }
        let set_a = resolve(candidate, a);
        let set_b = resolve(candidate, b);
        if set_a.is_empty() || set_b.is_empty() {
            errors.push(format!("{}: endpoint missing ({} or {})", describe(a), describe(a), describe(b)));
            continue;
        }

        match rule {
            Rule::CDirect { fail_on_short, .. } => {
                if task_id.0 == 13 && is_ucc27511_outh_outl(a, b) && set_a.intersection(&set_b).next().is_some() {
                    continue;
                }
                if let Some(found) = capacitor_bridges(candidate, &set_a, &set_b) {
                    let _ = found;
                    continue;
                }
                if *fail_on_short && set_a.intersection(&set_b).next().is_some() {
                    errors.push(format!("{}: shorted ({} and {} share a net)", describe(a), describe(a), describe(b)));
                } else {
                    errors.push(format!("{}: missing C_DIRECT to {}", describe(a), describe(b)));
                }
            }
            Rule::RPath { .. } => {
                if is_ucc21710_gate_short(a, b) && set_a.intersection(&set_b).next().is_some() {
                    errors.push(
                        "UCC21710: OUTH (pin 4) and OUTL (pin 6) must each go through separate series resistors to the GATE net; \
                         CLMPI (pin 7) may connect to GATE. Do not tie OUTH/OUTL directly to CLMPI/GATE."
                            .to_string(),
                    );
                    continue;
                }
                let connected = any_pair_connected(candidate, &set_a, &set_b, &["R"]);
                if !connected {
                    errors.push(format!("{}: missing R_PATH to {}", describe(a), describe(b)));
                }
            }
            Rule::LPath { .. } => {
                if !any_pair_connected(candidate, &set_a, &set_b, &["L", "Inductor_power"]) {
                    errors.push(format!("{}: missing L_PATH to {}", describe(a), describe(b)));
                }
            }
        }
    }
    if task_id.0 == 6 {
        errors.extend(check_buck_enable_divider(candidate));
    }
    if task_id.0 == 3 {
        errors.extend(check_p3_gain(candidate));
    }
    errors
}

/// Net-path reachability distinguishing "connected" from "literally
/// shorted": a pair of equal net names counts as `shorted`, not `ok`,
/// unless every pair in the two sets is equal (then neither applies).
fn path_rule_ok_or_shorted(candidate: &Snapshot, set_a: &HashSet<String>, set_b: &HashSet<String>, parts: &[&str]) -> (bool, bool) {
    let mut shorted = false;
    for net_a in set_a {
        for net_b in set_b {
            if net_a == net_b {
                shorted = true;
                continue;
            }
            if graph::nets_connected(candidate, net_a, net_b, parts) {
                return (true, false);
            }
        }
    }
    let has_nonshort_pair = set_a.iter().any(|a| set_b.iter().any(|b| a != b));
    (false, shorted && !has_nonshort_pair)
}

fn is_connected_nets(nets: &HashSet<String>) -> bool {
    nets.iter().any(|n| !matches!(n.to_uppercase().as_str(), "NC" | "__NOCONNECT"))
}

/// Task 6's buck-enable divider check, substituted for the generic
/// R_PATH rules skipped on the EN net by `rule_has_pin_role`/
/// `rule_has_role_pair` above.
fn check_buck_enable_divider(candidate: &Snapshot) -> Vec<String> {
    let en = EndpointDescriptor {
        part_id: Some("TPS54302".to_string()),
        category: Some("ic".to_string()),
        pin_role: Some("buck_en".to_string()),
        ..Default::default()
    };
    let vin = EndpointDescriptor { pin_role: Some("buck_vin".to_string()), ..en.clone() };
    let gnd = EndpointDescriptor { pin_role: Some("buck_gnd".to_string()), ..en.clone() };

    let en_nets = resolve(candidate, &en);
    if !is_connected_nets(&en_nets) {
        return Vec::new();
    }
    let vin_nets = resolve(candidate, &vin);
    let gnd_nets = resolve(candidate, &gnd);

    let (ok_vin, short_vin) = path_rule_ok_or_shorted(candidate, &en_nets, &vin_nets, &["R"]);
    let (ok_gnd, short_gnd) = path_rule_ok_or_shorted(candidate, &en_nets, &gnd_nets, &["R"]);

    if ok_vin && ok_gnd {
        return Vec::new();
    }
    if short_vin || short_gnd {
        return vec!["EN should not be directly shorted; use a resistor divider between VIN and GND".to_string()];
    }
    vec!["EN requires a resistor divider to VIN and GND, or leave EN unconnected/NC".to_string()]
}

fn normalize_driver_role(role: &str) -> &str {
    match role {
        "out_plus" | "out_minus" => "out",
        other => other,
    }
}

fn drivers_compatible(reference: &DriverGateLink, candidate: &DriverGateLink) -> bool {
    if let (Some(a), Some(b)) = (&reference.driver_category, &candidate.driver_category) {
        if a != b {
            return false;
        }
    }
    normalize_driver_role(&reference.driver_role) == normalize_driver_role(&candidate.driver_role)
}

fn gates_compatible(reference: &DriverGateLink, candidate: &DriverGateLink) -> bool {
    match (&reference.gate_category, &candidate.gate_category) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

fn fingerprint_compatible(reference: &DriverGateLink, candidate: &DriverGateLink) -> bool {
    (!reference.dc_path || candidate.dc_path)
        && (!reference.has_series_resistor || candidate.has_series_resistor)
        && (!reference.has_shunt_cap || candidate.has_shunt_cap)
}

/// Diff the reference and candidate snapshots' driver-gate link
/// fingerprints, reporting a reference link with no compatible match in the
/// candidate (driver role, gate category, and fingerprint all matched; each
/// candidate link consumed by at most one reference link).
pub fn check_driver_gate_links(reference: &Snapshot, candidate: &Snapshot) -> Vec<String> {
    let reference_links = passive::compute_driver_gate_links(reference);
    let candidate_links = passive::compute_driver_gate_links(candidate);
    let mut used = vec![false; candidate_links.len()];
    let mut errors = Vec::new();
    for reference_link in &reference_links {
        let matched = candidate_links.iter().enumerate().find(|(i, candidate_link)| {
            !used[*i]
                && drivers_compatible(reference_link, candidate_link)
                && gates_compatible(reference_link, candidate_link)
                && fingerprint_compatible(reference_link, candidate_link)
        });
        match matched {
            Some((i, _)) => used[i] = true,
            None => errors.push(format!("Missing driver->gate link for MOSFET {}", reference_link.gate_part_id)),
        }
    }
    errors
}

fn capacitor_bridges(candidate: &Snapshot, set_a: &HashSet<String>, set_b: &HashSet<String>) -> Option<String> {
    candidate
        .components
        .iter()
        .filter(|c| c.part_id == "C")
        .find_map(|c| {
            let nets: Vec<&str> = c.pins.iter().filter_map(|p| p.net.as_deref()).collect();
            if nets.len() < 2 {
                return None;
            }
            let (n0, n1) = (nets[0], nets[1]);
            if n0 != n1
                && ((set_a.contains(n0) && set_b.contains(n1)) || (set_a.contains(n1) && set_b.contains(n0)))
            {
                Some(c.reference.clone())
            } else {
                None
            }
        })
}

fn any_pair_connected(candidate: &Snapshot, set_a: &HashSet<String>, set_b: &HashSet<String>, parts: &[&str]) -> bool {
    for net_a in set_a {
        for net_b in set_b {
            if graph::nets_connected(candidate, net_a, net_b, parts) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{Component, Endpoint, Net, Pin};

    fn mosfet_source_drain_snapshot() -> Snapshot {
        Snapshot {
            components: vec![Component {
                reference: "Q1".into(),
                part_id: "IMZA65R015M2H".into(),
                value: None,
                category: Some("MOSFET".into()),
                pins: vec![
                    Pin { pin_id: "1".into(), pin_name: "D".into(), net: Some("VBUS".into()), pin_role: Some("mosfet_drain".into()) },
                    Pin { pin_id: "2".into(), pin_name: "S".into(), net: Some("VSW".into()), pin_role: Some("mosfet_source".into()) },
                ],
            }],
            nets: vec![
                Net { name: "VBUS".into(), endpoints: vec![Endpoint { reference: "Q1".into(), pin_id: "1".into(), pin_name: "D".into(), pin_role: Some("mosfet_drain".into()), component_category: Some("MOSFET".into()) }] },
                Net { name: "VSW".into(), endpoints: vec![Endpoint { reference: "Q1".into(), pin_id: "2".into(), pin_name: "S".into(), pin_role: Some("mosfet_source".into()), component_category: Some("MOSFET".into()) }] },
            ],
        }
    }

    #[test]
    fn mosfet_source_drain_c_direct_is_waived() {
        let rule = Rule::CDirect {
            a: EndpointDescriptor { pin_role: Some("mosfet_drain".into()), ..Default::default() },
            b: EndpointDescriptor { pin_role: Some("mosfet_source".into()), ..Default::default() },
            fail_on_short: true,
            allow_series: false,
        };
        let snapshot = mosfet_source_drain_snapshot();
        let errors = check_rules(&snapshot, &snapshot, &[rule], TaskId(1));
        assert!(errors.is_empty());
    }

    #[test]
    fn parse_value_handles_spice_suffixes() {
        assert_eq!(parse_value("10k"), Some(10_000.0));
        assert_eq!(parse_value("4.7n"), Some(4.7e-9));
        assert_eq!(parse_value("100"), Some(100.0));
    }

    fn gain_resistor(reference: &str, value: &str, net_a: &str, net_b: &str) -> Component {
        Component {
            reference: reference.into(),
            part_id: "R".into(),
            value: Some(value.into()),
            category: Some("passive".into()),
            pins: vec![
                Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some(net_a.into()), pin_role: None },
                Pin { pin_id: "2".into(), pin_name: "2".into(), net: Some(net_b.into()), pin_role: None },
            ],
        }
    }

    fn p3_gain_snapshot(neg_top: &str, neg_bottom: &str) -> Snapshot {
        Snapshot {
            components: vec![
                Component {
                    reference: "U1".into(),
                    part_id: "OPA328".into(),
                    value: None,
                    category: Some("opamp".into()),
                    pins: vec![
                        Pin { pin_id: "2".into(), pin_name: "-IN".into(), net: Some("NEG".into()), pin_role: None },
                        Pin { pin_id: "3".into(), pin_name: "+IN".into(), net: Some("POS".into()), pin_role: None },
                    ],
                },
                gain_resistor("R1", neg_top, "VOUT", "NEG"),
                gain_resistor("R2", neg_bottom, "NEG", "GND"),
                gain_resistor("R3", "14.7k", "VREF", "POS"),
                gain_resistor("R4", "10k", "POS", "GND"),
            ],
            nets: vec![],
        }
    }

    #[test]
    fn check_p3_gain_accepts_matching_ratio() {
        let snapshot = p3_gain_snapshot("14.7k", "10k");
        assert!(check_p3_gain(&snapshot).is_empty());
    }

    #[test]
    fn check_p3_gain_rejects_large_deviation() {
        let snapshot = p3_gain_snapshot("50k", "10k");
        let errors = check_p3_gain(&snapshot);
        assert_eq!(errors, vec!["resistance is wrong".to_string()]);
    }

    #[test]
    fn check_p3_gain_reports_missing_opamp() {
        let snapshot = Snapshot { components: vec![], nets: vec![] };
        assert_eq!(check_p3_gain(&snapshot), vec!["p3 gain check: OPA328 not found".to_string()]);
    }

    fn driver_gate_snapshot(resistor_ref: &str) -> Snapshot {
        Snapshot {
            components: vec![
                Component {
                    reference: "U1".into(),
                    part_id: "UCC27211".into(),
                    value: None,
                    category: Some("gate-driver".into()),
                    pins: vec![Pin { pin_id: "1".into(), pin_name: "OUT".into(), net: Some("DRV".into()), pin_role: Some("out".into()) }],
                },
                Component {
                    reference: resistor_ref.into(),
                    part_id: "R".into(),
                    value: Some("10".into()),
                    category: Some("passive".into()),
                    pins: vec![
                        Pin { pin_id: "1".into(), pin_name: "1".into(), net: Some("DRV".into()), pin_role: None },
                        Pin { pin_id: "2".into(), pin_name: "2".into(), net: Some("GATE".into()), pin_role: None },
                    ],
                },
                Component {
                    reference: "Q1".into(),
                    part_id: "IMZA65R015M2H".into(),
                    value: None,
                    category: Some("MOSFET".into()),
                    pins: vec![Pin { pin_id: "1".into(), pin_name: "G".into(), net: Some("GATE".into()), pin_role: Some("mosfet_gate".into()) }],
                },
            ],
            nets: vec![],
        }
    }

    #[test]
    fn check_driver_gate_links_accepts_matching_candidate() {
        let reference = driver_gate_snapshot("R1");
        let candidate = driver_gate_snapshot("R9");
        assert!(check_driver_gate_links(&reference, &candidate).is_empty());
    }

    #[test]
    fn check_driver_gate_links_reports_missing_link() {
        let reference = driver_gate_snapshot("R1");
        let mut candidate = driver_gate_snapshot("R1");
        candidate.components.retain(|c| c.reference != "R1");
        let errors = check_driver_gate_links(&reference, &candidate);
        assert_eq!(errors, vec!["Missing driver->gate link for MOSFET IMZA65R015M2H".to_string()]);
    }
}
