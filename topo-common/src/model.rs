use serde::{Deserialize, Serialize};

/// A single pin on a component, as it appears in a circuit snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub pin_id: String,
    #[serde(default)]
    pub pin_name: String,
    #[serde(default)]
    pub net: Option<String>,
    #[serde(default)]
    pub pin_role: Option<String>,
}

/// A placed component, identified by its reference designator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "ref")]
    pub reference: String,
    pub part_id: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub pins: Vec<Pin>,
}

impl Component {
    pub fn pin(&self, pin_id: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.pin_id == pin_id)
    }

    pub fn pin_by_name(&self, pin_name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.pin_name == pin_name)
    }

    /// Net connected to the first pin (by id, then by name) matching `pin_id_or_name`.
    pub fn net_of(&self, pin_id_or_name: &str) -> Option<&str> {
        self.pin(pin_id_or_name)
            .or_else(|| self.pin_by_name(pin_id_or_name))
            .and_then(|p| p.net.as_deref())
    }
}

/// One terminal of a net: the component and pin it connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "ref")]
    pub reference: String,
    pub pin_id: String,
    #[serde(default)]
    pub pin_name: String,
    #[serde(default)]
    pub pin_role: Option<String>,
    #[serde(default)]
    pub component_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// The post-execution representation of a generated schematic: components,
/// pins, and nets. Constructed once by the external runtime; augmentation
/// (see `topo-circuit::augment`) mutates it in place exactly once at the
/// front of the pipeline, after which every stage treats it as read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub nets: Vec<Net>,
}

impl Snapshot {
    pub fn find_component(&self, reference: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.reference == reference)
    }

    pub fn find_component_mut(&mut self, reference: &str) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.reference == reference)
    }

    pub fn find_net(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|n| n.name == name)
    }

    /// Resolve a canonical net name (e.g. "VIN", "VSW_1") case-insensitively
    /// to the net name actually used in this snapshot.
    pub fn resolve_named_net(&self, desired: &str) -> Option<&str> {
        let desired_upper = desired.to_uppercase();
        self.nets
            .iter()
            .find(|n| n.name.to_uppercase() == desired_upper)
            .map(|n| n.name.as_str())
    }
}
