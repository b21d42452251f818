use serde::{Deserialize, Serialize};

/// A per-component constraint declared on a knowledge-graph entry.
/// Dispatch lives in `topo-circuit::constraints`, matched explicitly on the
/// variant rather than by any form of reflection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenericConstraint {
    MustBeConnected { pins: Vec<String> },
    SupplyPair { vdd_pin: String, gnd_pin: String },
    DifferentialPairMustBeDistinct { pins: Vec<String> },
    DrivingPair { gate_pin: String, source_pin: String },
}
