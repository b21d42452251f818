//! Snapshot Augmenter: annotates every component and net endpoint with
//! category and pin role drawn from the knowledge graph. Runs once at
//! pipeline entry; idempotent by construction, since every field it writes
//! is recomputed from scratch rather than accumulated.

use topo_common::{KgStore, Snapshot};

pub fn augment(snapshot: &mut Snapshot, kg: &KgStore) {
    for component in &mut snapshot.components {
        component.category = Some(kg.category_of(&component.part_id, &component.reference));
        for pin in &mut component.pins {
            pin.pin_role = kg.pin_role(&component.part_id, &pin.pin_id, &pin.pin_name);
        }
    }

    for net in &mut snapshot.nets {
        for endpoint in &mut net.endpoints {
            let Some(component) = snapshot
                .components
                .iter()
                .find(|c| c.reference == endpoint.reference)
            else {
                continue;
            };
            endpoint.component_category = component.category.clone();
            endpoint.pin_role = component
                .pin(&endpoint.pin_id)
                .or_else(|| component.pin_by_name(&endpoint.pin_name))
                .and_then(|p| p.pin_role.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_common::{Component, KnowledgeGraph, Net, Pin};
    use topo_common::kg::KgComponentEntry;
    use std::collections::HashMap;

    fn snapshot() -> Snapshot {
        Snapshot {
            components: vec![Component {
                reference: "Q1".into(),
                part_id: "IMZA65R015M2H".into(),
                value: None,
                category: None,
                pins: vec![
                    Pin { pin_id: "1".into(), pin_name: "G".into(), net: Some("GATE1".into()), pin_role: None },
                    Pin { pin_id: "2".into(), pin_name: "D".into(), net: Some("VSW".into()), pin_role: None },
                ],
            }],
            nets: vec![
                Net { name: "GATE1".into(), endpoints: vec![topo_common::Endpoint {
                    reference: "Q1".into(), pin_id: "1".into(), pin_name: "G".into(),
                    pin_role: None, component_category: None,
                }] },
            ],
        }
    }

    fn kg() -> KgStore {
        let mut pin_roles = HashMap::new();
        pin_roles.insert("1".to_string(), "mosfet_gate".to_string());
        pin_roles.insert("2".to_string(), "mosfet_drain".to_string());
        let entry = KgComponentEntry {
            id: "IMZA65R015M2H".into(),
            category: Some("MOSFET".into()),
            pin_roles,
            ..Default::default()
        };
        KgStore::new(KnowledgeGraph { components: vec![entry] }, None)
    }

    #[test]
    fn augments_component_and_endpoint() {
        let mut snap = snapshot();
        augment(&mut snap, &kg());
        assert_eq!(snap.components[0].category.as_deref(), Some("MOSFET"));
        assert_eq!(snap.components[0].pins[0].pin_role.as_deref(), Some("mosfet_gate"));
        assert_eq!(snap.nets[0].endpoints[0].pin_role.as_deref(), Some("mosfet_gate"));
        assert_eq!(snap.nets[0].endpoints[0].component_category.as_deref(), Some("MOSFET"));
    }

    #[test]
    fn augmentation_is_idempotent() {
        let mut once = snapshot();
        augment(&mut once, &kg());
        let mut twice = once.clone();
        augment(&mut twice, &kg());
        assert_eq!(once, twice);
    }
}
