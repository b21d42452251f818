//! Net-adjacency graph induced by a fixed set of two-terminal part ids.
//! Shared by the Interface Checker and the System Topology Verifier for
//! "does a passive path exist between these two nets" queries, including
//! the stateful tank-path search.

use std::collections::{HashMap, HashSet, VecDeque};

use topo_common::Snapshot;

pub const FILM_CAP_PART: &str = "C_film";
pub const POWER_INDUCTOR_PART: &str = "Inductor_power";

/// net name -> list of (neighbor net, part_id, ref) reachable through one
/// allowed two-terminal component.
pub struct NetGraph {
    adjacency: HashMap<String, Vec<(String, String, String)>>,
}

impl NetGraph {
    pub fn neighbors(&self, net: &str) -> &[(String, String, String)] {
        self.adjacency.get(net).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

fn two_terminal_nets(component: &topo_common::Component) -> Option<(&str, &str)> {
    let connected: Vec<&str> = component
        .pins
        .iter()
        .filter_map(|p| p.net.as_deref())
        .collect();
    if connected.len() < 2 {
        return None;
    }
    Some((connected[0], connected[1]))
}

/// Build the net-adjacency graph induced by the given allowed `part_id`s.
/// Only components with exactly this part id (or more) contribute an edge
/// between the nets their first two connected pins sit on; self-loops
/// (both pins on the same net) are dropped.
pub fn build_net_graph(snapshot: &Snapshot, allowed_parts: &[&str]) -> NetGraph {
    let mut adjacency: HashMap<String, Vec<(String, String, String)>> = HashMap::new();
    for comp in &snapshot.components {
        if !allowed_parts.contains(&comp.part_id.as_str()) {
            continue;
        }
        let Some((net_a, net_b)) = two_terminal_nets(comp) else {
            continue;
        };
        if net_a == net_b {
            continue;
        }
        adjacency
            .entry(net_a.to_string())
            .or_default()
            .push((net_b.to_string(), comp.part_id.clone(), comp.reference.clone()));
        adjacency
            .entry(net_b.to_string())
            .or_default()
            .push((net_a.to_string(), comp.part_id.clone(), comp.reference.clone()));
    }
    NetGraph { adjacency }
}

/// Passive parts that make up the tank/connectivity graph used throughout
/// the Interface Checker and System Topology Verifier.
pub const PASSIVE_INDUCED_PARTS: [&str; 5] = ["R", "C", FILM_CAP_PART, POWER_INDUCTOR_PART, "L"];

/// Path existence on the net graph induced by `allowed_parts`. When
/// `require_film`/`require_inductor` is set, the path must traverse at
/// least one edge whose part id is `C_film` and/or an inductor
/// (`Inductor_power` or `L`) respectively. State is `(net, has_film,
/// has_inductor)`; a zero-length path (`start == end`) is allowed only when
/// neither requirement is set.
pub fn path_exists(
    snapshot: &Snapshot,
    start_net: &str,
    end_net: &str,
    allowed_parts: &[&str],
    require_film: bool,
    require_inductor: bool,
) -> bool {
    if start_net.is_empty() || end_net.is_empty() {
        return false;
    }
    if start_net == end_net {
        return !(require_film || require_inductor);
    }

    let graph = build_net_graph(snapshot, allowed_parts);
    let mut seen: HashSet<(String, bool, bool)> = HashSet::new();
    let mut queue: VecDeque<(String, bool, bool)> = VecDeque::new();
    queue.push_back((start_net.to_string(), false, false));

    while let Some((net, has_film, has_ind)) = queue.pop_front() {
        let state = (net.clone(), has_film, has_ind);
        if !seen.insert(state) {
            continue;
        }
        for (neighbor, part_id, _reference) in graph.neighbors(&net) {
            let nb_film = has_film || part_id == FILM_CAP_PART;
            let nb_ind = has_ind || part_id == POWER_INDUCTOR_PART || part_id == "L";
            if neighbor == end_net
                && (!require_film || nb_film)
                && (!require_inductor || nb_ind)
            {
                return true;
            }
            queue.push_back((neighbor.clone(), nb_film, nb_ind));
        }
    }
    false
}

/// Two nets are connected when identical or joined by a passive path
/// through `allowed_parts` (no film/inductor requirement).
pub fn nets_connected(snapshot: &Snapshot, net_a: &str, net_b: &str, allowed_parts: &[&str]) -> bool {
    if net_a.is_empty() || net_b.is_empty() {
        return false;
    }
    if net_a == net_b {
        return true;
    }
    path_exists(snapshot, net_a, net_b, allowed_parts, false, false)
}
