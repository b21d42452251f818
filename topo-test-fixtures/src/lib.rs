//! Builder API for constructing `Snapshot`/`KnowledgeGraph` values in tests,
//! mirroring the donor workspace's fixture-crate builder pattern. Nets are
//! derived automatically from the pins a component declares a net on, so
//! callers only ever need to describe components.

use std::collections::BTreeMap;

use topo_common::{Component, Endpoint, KgComponentEntry, KnowledgeGraph, Net, Pin, Snapshot};

pub mod samples;

/// Build one `Pin` with an optional connected net.
pub fn pin(pin_id: &str, pin_name: &str, net: Option<&str>) -> Pin {
    Pin {
        pin_id: pin_id.to_string(),
        pin_name: pin_name.to_string(),
        net: net.map(str::to_string),
        pin_role: None,
    }
}

/// Build one `Component` from a reference designator, part id, and its pins.
pub fn component(reference: &str, part_id: &str, pins: Vec<Pin>) -> Component {
    Component {
        reference: reference.to_string(),
        part_id: part_id.to_string(),
        value: None,
        category: None,
        pins,
    }
}

/// Same as [`component`], but also sets `value` (for parts the Rule Checker
/// reads a SPICE value off of, e.g. resistor-divider ratios).
pub fn component_with_value(reference: &str, part_id: &str, value: &str, pins: Vec<Pin>) -> Component {
    Component {
        value: Some(value.to_string()),
        ..component(reference, part_id, pins)
    }
}

/// Accumulates components and derives the snapshot's net list from their
/// pins on `build()`. Pre-augmentation: endpoint `pin_role`/
/// `component_category` are left unset, matching a raw schematic-capture
/// snapshot before the Augmenter stage runs.
#[derive(Default)]
pub struct FixtureBuilder {
    components: Vec<Component>,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, comp: Component) -> Self {
        self.components.push(comp);
        self
    }

    pub fn with_components(mut self, comps: impl IntoIterator<Item = Component>) -> Self {
        self.components.extend(comps);
        self
    }

    pub fn build(self) -> Snapshot {
        let mut nets: BTreeMap<String, Vec<Endpoint>> = BTreeMap::new();
        for comp in &self.components {
            for p in &comp.pins {
                let Some(net_name) = &p.net else { continue };
                nets.entry(net_name.clone()).or_default().push(Endpoint {
                    reference: comp.reference.clone(),
                    pin_id: p.pin_id.clone(),
                    pin_name: p.pin_name.clone(),
                    pin_role: None,
                    component_category: None,
                });
            }
        }
        Snapshot {
            components: self.components,
            nets: nets.into_iter().map(|(name, endpoints)| Net { name, endpoints }).collect(),
        }
    }
}

/// Accumulates knowledge-graph entries for `build()` into a `KnowledgeGraph`
/// (the raw JSON shape; wrap in `KgStore::new` to query it).
#[derive(Default)]
pub struct KgBuilder {
    entries: Vec<KgComponentEntry>,
}

impl KgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: KgComponentEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> KnowledgeGraph {
        KnowledgeGraph { components: self.entries }
    }
}

/// Build a `KgComponentEntry` with a category and a `pin_id -> role` map,
/// the shape most tests need.
pub fn kg_entry(id: &str, category: &str, pin_roles: &[(&str, &str)]) -> KgComponentEntry {
    KgComponentEntry {
        id: id.to_string(),
        category: Some(category.to_string()),
        pin_roles: pin_roles.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        ..Default::default()
    }
}
