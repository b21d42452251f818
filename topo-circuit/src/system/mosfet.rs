//! MOSFET connectivity extraction: drain/source/gate/Kelvin-source nets
//! resolved from pin roles, shared by every per-topology check.

use topo_common::{Component, KgStore, Snapshot};

#[derive(Debug, Clone)]
pub struct MosfetConnectivity<'a> {
    pub reference: &'a str,
    pub drain_net: Option<&'a str>,
    pub source_net: Option<&'a str>,
    pub gate_net: Option<&'a str>,
    pub kelvin_source_net: Option<&'a str>,
}

fn pin_net_by_role<'a>(component: &'a Component, role: &str) -> Option<&'a str> {
    component
        .pins
        .iter()
        .find(|p| p.pin_role.as_deref() == Some(role))
        .and_then(|p| p.net.as_deref())
}

pub fn is_mosfet(component: &Component, kg: &KgStore) -> bool {
    kg.category_of(&component.part_id, &component.reference) == "MOSFET"
}

pub fn extract(component: &Component) -> MosfetConnectivity<'_> {
    MosfetConnectivity {
        reference: &component.reference,
        drain_net: pin_net_by_role(component, "mosfet_drain"),
        source_net: pin_net_by_role(component, "mosfet_source"),
        gate_net: pin_net_by_role(component, "mosfet_gate"),
        kelvin_source_net: pin_net_by_role(component, "mosfet_kelvin_source"),
    }
}

pub fn all_mosfets<'a>(snapshot: &'a Snapshot, kg: &KgStore) -> Vec<MosfetConnectivity<'a>> {
    snapshot
        .components
        .iter()
        .filter(|c| is_mosfet(c, kg))
        .map(extract)
        .collect()
}
