//! Isolation Domain Analyser: partitions nets into a primary domain and one
//! or more secondary domains across isolation boundaries, and reports
//! direct shorts across those boundaries.

use std::collections::{HashMap, HashSet, VecDeque};

use topo_common::{Component, KgStore, Snapshot};

/// Net-name substrings tried in order when seeding the primary domain's
/// BFS. Biased towards this component library's naming conventions; kept
/// verbatim rather than generalised.
const ANCHOR_PATTERNS: [&str; 7] = ["VIN", "VBUS", "VCC", "V12", "V5", "GND_PRI", "PGND"];

#[derive(Debug, Default, Clone)]
pub struct IsolationDomains {
    pub primary: HashSet<String>,
    pub secondary: Vec<HashSet<String>>,
    /// Each secondary domain's BFS result before subtracting nets already
    /// claimed by an earlier domain; used by the Net Conflict Checker to
    /// spot a net name reused across what should be disjoint domains.
    pub raw_secondary: Vec<HashSet<String>>,
}

fn connect_all(adjacency: &mut HashMap<String, HashSet<String>>, nets: &[&str]) {
    for &a in nets {
        for &b in nets {
            if a != b {
                adjacency.entry(a.to_string()).or_default().insert(b.to_string());
            }
        }
    }
}

fn side_nets<'a>(component: &'a Component, side_pins: &[String]) -> Vec<&'a str> {
    component
        .pins
        .iter()
        .filter(|p| side_pins.contains(&p.pin_id) || side_pins.contains(&p.pin_name))
        .filter_map(|p| p.net.as_deref())
        .collect()
}

fn build_adjacency(snapshot: &Snapshot, kg: &KgStore) -> HashMap<String, HashSet<String>> {
    let mut adjacency = HashMap::new();
    for component in &snapshot.components {
        if kg.is_isolation_boundary(&component.part_id) {
            let primary = side_nets(component, kg.primary_pins(&component.part_id));
            let secondary = side_nets(component, kg.secondary_pins(&component.part_id));
            connect_all(&mut adjacency, &primary);
            connect_all(&mut adjacency, &secondary);
        } else {
            let nets: Vec<&str> = component.pins.iter().filter_map(|p| p.net.as_deref()).collect();
            connect_all(&mut adjacency, &nets);
        }
    }
    adjacency
}

fn bfs(adjacency: &HashMap<String, HashSet<String>>, seeds: &[&str]) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    for &seed in seeds {
        if seen.insert(seed.to_string()) {
            queue.push_back(seed.to_string());
        }
    }
    while let Some(net) = queue.pop_front() {
        if let Some(neighbors) = adjacency.get(&net) {
            for neighbor in neighbors {
                if seen.insert(neighbor.clone()) {
                    queue.push_back(neighbor.clone());
                }
            }
        }
    }
    seen
}

fn pick_primary_seed<'a>(snapshot: &'a Snapshot) -> Option<&'a str> {
    for pattern in ANCHOR_PATTERNS {
        if let Some(net) = snapshot
            .nets
            .iter()
            .find(|n| n.name.to_uppercase().contains(pattern))
        {
            return Some(net.name.as_str());
        }
    }
    snapshot.nets.first().map(|n| n.name.as_str())
}

/// Partition nets into primary/secondary domains and flag direct shorts
/// across an isolation boundary. Returns the domains plus accumulated
/// boundary-violation errors.
pub fn analyse(snapshot: &Snapshot, kg: &KgStore) -> (IsolationDomains, Vec<String>) {
    let adjacency = build_adjacency(snapshot, kg);
    let mut errors = Vec::new();

    let primary_seed = pick_primary_seed(snapshot);
    let primary = match primary_seed {
        Some(seed) => bfs(&adjacency, &[seed]),
        None => HashSet::new(),
    };

    let mut claimed = primary.clone();
    let mut secondary = Vec::new();
    let mut raw_secondary = Vec::new();

    for component in &snapshot.components {
        if !kg.is_isolation_boundary(&component.part_id) {
            continue;
        }
        let primary_side = side_nets(component, kg.primary_pins(&component.part_id));
        let secondary_side = side_nets(component, kg.secondary_pins(&component.part_id));

        for net in &primary_side {
            if secondary_side.contains(net) {
                errors.push(format!(
                    "{}: isolation boundary violated, net '{net}' appears on both primary and secondary sides",
                    component.reference
                ));
            }
        }

        if secondary_side.is_empty() {
            continue;
        }
        let raw = bfs(&adjacency, &secondary_side);
        let mut domain = raw.clone();
        domain.retain(|net| !claimed.contains(net));
        claimed.extend(domain.iter().cloned());
        secondary.push(domain);
        raw_secondary.push(raw);
    }

    (
        IsolationDomains { primary, secondary, raw_secondary },
        errors,
    )
}
