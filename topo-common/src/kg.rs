use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constraint::GenericConstraint;

/// One knowledge-graph entry, keyed externally by `part_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KgComponentEntry {
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub footprint: Option<String>,
    #[serde(default)]
    pub pins: Vec<String>,
    #[serde(default)]
    pub pin_roles: HashMap<String, String>,
    #[serde(default)]
    pub generic_constraints: Vec<GenericConstraint>,
    #[serde(default)]
    pub isolation_boundary: bool,
    #[serde(default)]
    pub primary_pins: Vec<String>,
    #[serde(default)]
    pub secondary_pins: Vec<String>,
}

/// Raw `{components: [...]}` shape shared by both the KG overlay and the
/// base component table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub components: Vec<KgComponentEntry>,
}

const ONE_LETTER_PASSIVES: [&str; 4] = ["R", "C", "L", "D"];

/// Indexes a KG overlay and an optional base component table by `part_id`,
/// giving the overlay precedence. Loaded once at verifier construction and
/// shared read-only for the verifier's lifetime.
#[derive(Debug, Default)]
pub struct KgStore {
    overlay: HashMap<String, KgComponentEntry>,
    base: HashMap<String, KgComponentEntry>,
}

impl KgStore {
    pub fn new(overlay: KnowledgeGraph, base: Option<KnowledgeGraph>) -> Self {
        let index = |kg: KnowledgeGraph| {
            kg.components
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect::<HashMap<_, _>>()
        };
        KgStore {
            overlay: index(overlay),
            base: base.map(index).unwrap_or_default(),
        }
    }

    pub fn entry(&self, part_id: &str) -> Option<&KgComponentEntry> {
        self.overlay.get(part_id).or_else(|| self.base.get(part_id))
    }

    /// Category fallback order: KG overlay category, base-table category,
    /// literal one-letter-passive `part_id`, reference-designator prefix
    /// (R/C/L/D -> passive, Q -> MOSFET), `part_id` containing "MOSFET",
    /// otherwise "unknown". Never fails; unknown parts are flagged, if at
    /// all, by later stages.
    pub fn category_of(&self, part_id: &str, reference: &str) -> String {
        if let Some(cat) = self
            .overlay
            .get(part_id)
            .and_then(|e| e.category.clone())
            .or_else(|| self.base.get(part_id).and_then(|e| e.category.clone()))
        {
            return cat;
        }
        if ONE_LETTER_PASSIVES.contains(&part_id) {
            return "passive".to_string();
        }
        let prefix = reference
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_uppercase();
        match prefix.as_str() {
            "R" | "C" | "L" | "D" => return "passive".to_string(),
            "Q" => return "MOSFET".to_string(),
            _ => {}
        }
        if part_id.to_uppercase().contains("MOSFET") {
            return "MOSFET".to_string();
        }
        "unknown".to_string()
    }

    /// Resolve a pin role by searching first the pin's identifier, then its
    /// name, in the KG overlay, then the base table.
    pub fn pin_role(&self, part_id: &str, pin_id: &str, pin_name: &str) -> Option<String> {
        for table in [&self.overlay, &self.base] {
            if let Some(entry) = table.get(part_id) {
                if let Some(role) = entry.pin_roles.get(pin_id) {
                    return Some(role.clone());
                }
                if let Some(role) = entry.pin_roles.get(pin_name) {
                    return Some(role.clone());
                }
            }
        }
        None
    }

    pub fn generic_constraints(&self, part_id: &str) -> &[GenericConstraint] {
        self.entry(part_id)
            .map(|e| e.generic_constraints.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_isolation_boundary(&self, part_id: &str) -> bool {
        self.entry(part_id).map(|e| e.isolation_boundary).unwrap_or(false)
    }

    pub fn primary_pins(&self, part_id: &str) -> &[String] {
        self.entry(part_id).map(|e| e.primary_pins.as_slice()).unwrap_or(&[])
    }

    pub fn secondary_pins(&self, part_id: &str) -> &[String] {
        self.entry(part_id).map(|e| e.secondary_pins.as_slice()).unwrap_or(&[])
    }
}
