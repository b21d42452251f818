use serde::{Deserialize, Serialize};

/// A partial description of an endpoint: any subset of fields may be
/// present. Resolution against a candidate snapshot prefers the most
/// specific (most non-empty-field) match; see `topo-circuit::rules`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    #[serde(default)]
    pub part_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub pin_role: Option<String>,
    #[serde(default)]
    pub pin_id: Option<String>,
    #[serde(default)]
    pub pin_name: Option<String>,
}

impl EndpointDescriptor {
    /// Number of fields present; used to break resolution ties in favour of
    /// the more specific descriptor.
    pub fn specificity(&self) -> usize {
        [
            &self.part_id,
            &self.category,
            &self.pin_role,
            &self.pin_id,
            &self.pin_name,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }
}

fn default_true() -> bool {
    true
}

/// A typed connectivity requirement extracted from a reference snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Rule {
    CDirect {
        a: EndpointDescriptor,
        b: EndpointDescriptor,
        #[serde(default = "default_true")]
        fail_on_short: bool,
        #[serde(default)]
        allow_series: bool,
    },
    RPath {
        a: EndpointDescriptor,
        b: EndpointDescriptor,
        #[serde(default = "default_true")]
        fail_on_short: bool,
        #[serde(default)]
        allow_series: bool,
    },
    LPath {
        a: EndpointDescriptor,
        b: EndpointDescriptor,
        #[serde(default = "default_true")]
        fail_on_short: bool,
        #[serde(default)]
        allow_series: bool,
    },
}

impl Rule {
    pub fn endpoints(&self) -> (&EndpointDescriptor, &EndpointDescriptor) {
        match self {
            Rule::CDirect { a, b, .. } | Rule::RPath { a, b, .. } | Rule::LPath { a, b, .. } => {
                (a, b)
            }
        }
    }

    pub fn fail_on_short(&self) -> bool {
        match self {
            Rule::CDirect { fail_on_short, .. }
            | Rule::RPath { fail_on_short, .. }
            | Rule::LPath { fail_on_short, .. } => *fail_on_short,
        }
    }
}
