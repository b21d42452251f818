//! Net Conflict Checker: cross-domain name collisions and multi-instance
//! naming hygiene.

use std::collections::{HashMap, HashSet};

use topo_common::Snapshot;

use crate::isolation::IsolationDomains;

fn domain_label(index: Option<usize>) -> String {
    match index {
        None => "primary".to_string(),
        Some(i) => format!("secondary_{i}"),
    }
}

/// A net name is attributed to whichever domain's *final* (post-subtraction)
/// partition first claims it. `raw_secondary` still lists every net a
/// boundary component's secondary side would reach before that
/// subtraction; any name there that actually belongs to a different
/// domain is a same-name reuse across what should be disjoint domains.
fn cross_domain_conflicts(domains: &IsolationDomains) -> Vec<String> {
    let mut owner: HashMap<&str, String> = HashMap::new();
    for net in &domains.primary {
        owner.insert(net.as_str(), domain_label(None));
    }
    for (i, domain) in domains.secondary.iter().enumerate() {
        for net in domain {
            owner.insert(net.as_str(), domain_label(Some(i)));
        }
    }

    let mut errors = Vec::new();
    let mut reported: HashSet<(String, String)> = HashSet::new();
    for (i, raw) in domains.raw_secondary.iter().enumerate() {
        let claimant = domain_label(Some(i));
        for net in raw {
            if let Some(actual_owner) = owner.get(net.as_str()) {
                if *actual_owner != claimant {
                    let key = (net.clone(), claimant.clone());
                    if reported.insert(key) {
                        errors.push(format!(
                            "NET CONFLICT: '{net}' appears in both {actual_owner} and {claimant} domains"
                        ));
                    }
                }
            }
        }
    }
    errors
}

fn ground_naming_warning(snapshot: &Snapshot, domains: &IsolationDomains) -> Option<String> {
    if domains.secondary.is_empty() {
        return None;
    }
    let num_domains = 1 + domains.secondary.len();
    let mut unique_gnds: HashSet<&str> = HashSet::new();
    for net in &snapshot.nets {
        let upper = net.name.to_uppercase();
        if upper.contains("GND") || upper == "VSS" {
            unique_gnds.insert(net.name.as_str());
        }
    }
    if unique_gnds.len() < num_domains {
        let mut sorted_names: Vec<&str> = unique_gnds.into_iter().collect();
        sorted_names.sort_unstable();
        Some(format!(
            "GND NAMING WARNING: Circuit has {num_domains} isolation domains but only {} unique GND net(s): {sorted_names:?}. \
             Consider using distinct names like GND_PRI, GND_SEC1, GND_SEC2.",
            sorted_names.len()
        ))
    } else {
        None
    }
}

fn instance_naming_warnings(snapshot: &Snapshot) -> Vec<String> {
    let names: HashSet<&str> = snapshot.nets.iter().map(|n| n.name.as_str()).collect();
    let mut warnings = Vec::new();
    let mut reported_bases: HashSet<&str> = HashSet::new();
    for name in &names {
        let Some((base, suffix)) = name.rsplit_once('_') else {
            continue;
        };
        if suffix.parse::<u32>().is_err() {
            continue;
        }
        if names.contains(base) && reported_bases.insert(base) {
            warnings.push(format!(
                "INSTANCE NAMING WARNING: base name '{base}' exists both with and without a numeric suffix ({base}, {name})"
            ));
        }
    }
    warnings
}

fn gate_net_sharing_warnings(snapshot: &Snapshot) -> Vec<String> {
    let mut by_gate_net: HashMap<&str, Vec<&str>> = HashMap::new();
    for net in &snapshot.nets {
        let mosfet_refs: Vec<&str> = net
            .endpoints
            .iter()
            .filter(|ep| ep.pin_role.as_deref() == Some("mosfet_gate"))
            .map(|ep| ep.reference.as_str())
            .collect();
        if !mosfet_refs.is_empty() {
            by_gate_net.entry(net.name.as_str()).or_default().extend(mosfet_refs);
        }
    }
    let mut warnings = Vec::new();
    for (net, refs) in by_gate_net {
        if refs.len() > 2 {
            warnings.push(format!(
                "GATE NET WARNING: gate net '{net}' is shared by {} MOSFETs ({})",
                refs.len(),
                refs.join(", ")
            ));
        }
    }
    warnings
}

/// Reserved-name conflict check: the original implementation computes
/// domain maps for this and never emits a diagnostic. Carried as an
/// explicit no-op rather than inventing stricter behaviour than was ever
/// enforced.
fn reserved_name_conflicts(_snapshot: &Snapshot, _domains: &IsolationDomains) -> Vec<String> {
    Vec::new()
}

pub fn check(snapshot: &Snapshot, domains: &IsolationDomains) -> Vec<String> {
    let mut errors = cross_domain_conflicts(domains);
    errors.extend(ground_naming_warning(snapshot, domains));
    errors.extend(instance_naming_warnings(snapshot));
    errors.extend(gate_net_sharing_warnings(snapshot));
    errors.extend(reserved_name_conflicts(snapshot, domains));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn reports_net_conflict_between_primary_and_secondary() {
        let domains = IsolationDomains {
            primary: HashSet::from(["GND".to_string(), "VIN".to_string()]),
            secondary: vec![HashSet::new()],
            raw_secondary: vec![HashSet::from(["GND".to_string(), "VOUT_ISO".to_string()])],
        };
        let errors = cross_domain_conflicts(&domains);
        assert_eq!(errors, vec!["NET CONFLICT: 'GND' appears in both primary and secondary_0 domains"]);
    }

    #[test]
    fn ground_naming_skips_when_no_isolation() {
        let snapshot = Snapshot { components: vec![], nets: vec![] };
        let domains = IsolationDomains { primary: HashSet::new(), secondary: vec![], raw_secondary: vec![] };
        assert_eq!(ground_naming_warning(&snapshot, &domains), None);
    }

    #[test]
    fn ground_naming_warns_on_too_few_unique_gnds() {
        let snapshot = Snapshot {
            components: vec![],
            nets: vec![
                topo_common::Net { name: "GND".into(), endpoints: vec![] },
                topo_common::Net { name: "VIN".into(), endpoints: vec![] },
            ],
        };
        let domains = IsolationDomains {
            primary: HashSet::new(),
            secondary: vec![HashSet::new()],
            raw_secondary: vec![HashSet::new()],
        };
        assert_eq!(
            ground_naming_warning(&snapshot, &domains),
            Some(
                "GND NAMING WARNING: Circuit has 2 isolation domains but only 1 unique GND net(s): [\"GND\"]. \
                 Consider using distinct names like GND_PRI, GND_SEC1, GND_SEC2."
                    .to_string()
            )
        );
    }

    #[test]
    fn flags_instance_naming_collision() {
        let snapshot = Snapshot {
            components: vec![],
            nets: vec![
                topo_common::Net { name: "VSW".into(), endpoints: vec![] },
                topo_common::Net { name: "VSW_1".into(), endpoints: vec![] },
            ],
        };
        let warnings = instance_naming_warnings(&snapshot);
        assert_eq!(
            warnings,
            vec!["INSTANCE NAMING WARNING: base name 'VSW' exists both with and without a numeric suffix (VSW, VSW_1)"]
        );
    }
}
