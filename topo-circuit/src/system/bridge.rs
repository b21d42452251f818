//! Half-bridge inference, full-bridge pairing and N-way (3-phase /
//! full-bridge-inverter) pairing around named or inferred switch nodes.

use topo_common::Snapshot;

use super::mosfet::MosfetConnectivity;
use super::netclass::{is_ground_net, is_input_supply_net};

#[derive(Debug, Clone)]
pub struct HalfBridge<'a> {
    pub switch_net: &'a str,
    pub hs_ref: &'a str,
    pub ls_ref: &'a str,
    pub bus_net: &'a str,
    pub gnd_net: &'a str,
    pub diagnostic: Option<String>,
}

/// Half-bridge inference around a known switch node: pick the
/// highest-scoring (HS, LS) pair among MOSFETs whose source/drain sit on
/// `switch_net`.
pub fn infer_half_bridge_on_vsw<'a>(mosfets: &[MosfetConnectivity<'a>], switch_net: &'a str) -> Option<HalfBridge<'a>> {
    let hs_candidates: Vec<&MosfetConnectivity<'a>> = mosfets
        .iter()
        .filter(|m| m.source_net == Some(switch_net) && m.drain_net.is_some())
        .collect();
    let ls_candidates: Vec<&MosfetConnectivity<'a>> = mosfets
        .iter()
        .filter(|m| m.drain_net == Some(switch_net) && m.source_net.is_some())
        .collect();

    let mut best: Option<(i32, &MosfetConnectivity<'a>, &MosfetConnectivity<'a>)> = None;
    for hs in &hs_candidates {
        for ls in &ls_candidates {
            if hs.reference == ls.reference {
                continue;
            }
            let (Some(bus), Some(gnd)) = (hs.drain_net, ls.source_net) else {
                continue;
            };
            let mut score = 0;
            if is_ground_net(gnd) {
                score += 3;
            }
            if !is_ground_net(bus) {
                score += 1;
            }
            if is_input_supply_net(bus) {
                score += 1;
            }
            if best.map(|(s, ..)| score > s).unwrap_or(true) {
                best = Some((score, hs, ls));
            }
        }
    }

    let (_, hs, ls) = best?;
    let bus_net = hs.drain_net?;
    let gnd_net = ls.source_net?;
    let diagnostic = if !is_ground_net(gnd_net) {
        Some(format!("LS source ({gnd_net}) does not look like a ground net"))
    } else {
        None
    };
    Some(HalfBridge { switch_net, hs_ref: hs.reference, ls_ref: ls.reference, bus_net, gnd_net, diagnostic })
}

/// Every distinct net any MOSFET's source or drain sits on: candidate
/// switch nodes for topologies that don't name VSW explicitly.
pub fn candidate_switch_nets<'a>(mosfets: &[MosfetConnectivity<'a>]) -> Vec<&'a str> {
    let mut nets: Vec<&'a str> = Vec::new();
    for m in mosfets {
        for net in [m.source_net, m.drain_net].into_iter().flatten() {
            if !nets.contains(&net) {
                nets.push(net);
            }
        }
    }
    nets
}

/// Two half-bridges on distinct switch nodes must share identical bus and
/// ground nets.
pub fn check_full_bridge_pair(a: &HalfBridge, b: &HalfBridge) -> Option<String> {
    if a.bus_net == b.bus_net && a.gnd_net == b.gnd_net {
        None
    } else {
        Some(format!(
            "half-bridges do not share common bus/gnd (HB1 bus/gnd={}/{}, HB2 bus/gnd={}/{})",
            a.bus_net, a.gnd_net, b.bus_net, b.gnd_net
        ))
    }
}

fn resolve_net_name<'a>(snapshot: &'a Snapshot, expected: &str) -> Option<&'a str> {
    snapshot
        .nets
        .iter()
        .find(|n| n.name.eq_ignore_ascii_case(expected))
        .map(|n| n.name.as_str())
}

/// Resolve every named switch node (e.g. `VSW_1`/`VSW_2`[/`VSW_3`]) to an
/// actual net name, infer a half-bridge on each, and require them all to
/// share one bus/ground (optionally requiring that bus to be input-supply
/// -like).
pub fn n_way_half_bridge<'a>(
    snapshot: &'a Snapshot,
    mosfets: &[MosfetConnectivity<'a>],
    switch_node_names: &[&str],
    topology_label: &str,
    require_input_bus: bool,
) -> Result<Vec<HalfBridge<'a>>, String> {
    let mut resolved = Vec::new();
    for name in switch_node_names {
        match resolve_net_name(snapshot, name) {
            Some(net) => resolved.push(net),
            None => {
                return Err(format!(
                    "{topology_label}: expected output nets named {}",
                    switch_node_names.join("/")
                ));
            }
        }
    }

    let mut bridges = Vec::new();
    for net in &resolved {
        match infer_half_bridge_on_vsw(mosfets, net) {
            Some(hb) => bridges.push(hb),
            None => {
                return Err(format!("{topology_label}: no half-bridge found on switch node {net}"));
            }
        }
    }

    let (bus, gnd) = (bridges[0].bus_net, bridges[0].gnd_net);
    for hb in &bridges[1..] {
        if hb.bus_net != bus || hb.gnd_net != gnd {
            return Err(format!(
                "{topology_label}: half-bridges do not share common bus/gnd (HB1 bus/gnd={bus}/{gnd}, HB2 bus/gnd={}/{})",
                hb.bus_net, hb.gnd_net
            ));
        }
    }
    if require_input_bus && !is_input_supply_net(bus) {
        return Err(format!("{topology_label}: common bus ({bus}) does not look like an input supply net"));
    }

    Ok(bridges)
}
