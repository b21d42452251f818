//! Canned snapshots and knowledge graphs for the spec's testable scenarios
//! (S1-S6). Each function returns everything a caller needs to run one
//! scenario through `topo-verifier` without re-deriving the wiring.

use topo_common::{KgComponentEntry, KnowledgeGraph, Snapshot};

use crate::{component, kg_entry, pin, FixtureBuilder, KgBuilder};

const MOSFET_PART: &str = "IMZA65R015M2H";

fn mosfet_kg_entry() -> KgComponentEntry {
    kg_entry(MOSFET_PART, "MOSFET", &[("D", "mosfet_drain"), ("S", "mosfet_source"), ("G", "mosfet_gate")])
}

/// S1: a correct synchronous buck converter. `VIN -> Q1 -> VSW -> L1 ->
/// VOUT`, LS source on `PGND`, 8 VIN decoupling caps, one power inductor.
/// Reference and candidate are identical; expected to pass with no errors.
pub fn s1_buck_converter() -> (Snapshot, KnowledgeGraph) {
    let mut builder = FixtureBuilder::new()
        .with_component(component(
            "U1",
            "UCC27211",
            vec![pin("OUTH", "OUTH", Some("GH_OUT")), pin("OUTL", "OUTL", Some("GL_OUT"))],
        ))
        .with_component(component("R1", "R", vec![pin("1", "1", Some("GH_OUT")), pin("2", "2", Some("Q1_GATE"))]))
        .with_component(component("R2", "R", vec![pin("1", "1", Some("GL_OUT")), pin("2", "2", Some("Q2_GATE"))]))
        .with_component(component(
            "Q1",
            MOSFET_PART,
            vec![pin("D", "D", Some("VIN")), pin("S", "S", Some("VSW")), pin("G", "G", Some("Q1_GATE"))],
        ))
        .with_component(component(
            "Q2",
            MOSFET_PART,
            vec![pin("D", "D", Some("VSW")), pin("S", "S", Some("PGND")), pin("G", "G", Some("Q2_GATE"))],
        ))
        .with_component(component("L1", "Inductor_power", vec![pin("1", "1", Some("VSW")), pin("2", "2", Some("VOUT"))]));

    for i in 0..8 {
        builder = builder.with_component(component(
            &format!("C{i}"),
            "C",
            vec![pin("1", "1", Some("VIN")), pin("2", "2", Some("PGND"))],
        ));
    }

    let snapshot = builder.build();
    let kg = KgBuilder::new()
        .with_entry(kg_entry("UCC27211", "gate-driver", &[("OUTH", "out"), ("OUTL", "out")]))
        .with_entry(mosfet_kg_entry())
        .build();
    (snapshot, kg)
}

/// S2: `AMC1350` with `INP` and `INN` both tied to net `VIN_DIV` — a
/// shorted differential pair.
pub fn s2_shorted_differential_pair() -> (Snapshot, KnowledgeGraph) {
    let snapshot = FixtureBuilder::new()
        .with_component(component(
            "U1",
            "AMC1350",
            vec![pin("INP", "INP", Some("VIN_DIV")), pin("INN", "INN", Some("VIN_DIV"))],
        ))
        .build();
    let mut entry = kg_entry("AMC1350", "opamp", &[]);
    entry.generic_constraints = vec![topo_common::GenericConstraint::DifferentialPairMustBeDistinct {
        pins: vec!["INP".to_string(), "INN".to_string()],
    }];
    let kg = KgBuilder::new().with_entry(entry).build();
    (snapshot, kg)
}

/// S3: `IMZA65R015M2H` with both `mosfet_source` and `mosfet_kelvin_source`
/// endpoints on net `VSW`.
pub fn s3_kelvin_source_shorted() -> (Snapshot, KnowledgeGraph) {
    let snapshot = FixtureBuilder::new()
        .with_component(component(
            "Q1",
            MOSFET_PART,
            vec![
                pin("D", "D", Some("VBUS")),
                pin("S", "S", Some("VSW")),
                pin("KS", "KS", Some("VSW")),
                pin("G", "G", Some("GATE1")),
            ],
        ))
        .build();
    let entry = kg_entry(
        MOSFET_PART,
        "MOSFET",
        &[("D", "mosfet_drain"), ("S", "mosfet_source"), ("KS", "mosfet_kelvin_source"), ("G", "mosfet_gate")],
    );
    let kg = KgBuilder::new().with_entry(entry).build();
    (snapshot, kg)
}

/// S4: `UCC5390E` `OUT` connects directly to a MOSFET gate net with no
/// resistor on the path.
pub fn s4_missing_gate_resistor() -> (Snapshot, KnowledgeGraph) {
    let snapshot = FixtureBuilder::new()
        .with_component(component("U1", "UCC5390E", vec![pin("OUT", "OUT", Some("GATE_NET"))]))
        .with_component(component("Q1", MOSFET_PART, vec![pin("G", "G", Some("GATE_NET"))]))
        .build();
    let kg = KgBuilder::new()
        .with_entry(kg_entry("UCC5390E", "gate-driver", &[("OUT", "out")]))
        .with_entry(kg_entry(MOSFET_PART, "MOSFET", &[("G", "mosfet_gate")]))
        .build();
    (snapshot, kg)
}

/// S5: dual active bridge (task 20), valid eight-MOSFET arrangement and
/// transformer, one `C_film` in series on the VIN-side leg but no inductor
/// anywhere — the tank requirement (both film and inductor) is unmet.
pub fn s5_dab_missing_inductor() -> (Snapshot, KnowledgeGraph) {
    let half_bridge = |hs: &str, ls: &str, bus: &str, sw: &str, gnd: &str| {
        vec![
            component(hs, MOSFET_PART, vec![pin("D", "D", Some(bus)), pin("S", "S", Some(sw)), pin("G", "G", Some(&format!("{hs}_G")))]),
            component(ls, MOSFET_PART, vec![pin("D", "D", Some(sw)), pin("S", "S", Some(gnd)), pin("G", "G", Some(&format!("{ls}_G")))]),
        ]
    };

    let snapshot = FixtureBuilder::new()
        .with_components(half_bridge("Q1", "Q2", "VIN", "VSW_P1", "PGND_PRI"))
        .with_components(half_bridge("Q3", "Q4", "VIN", "PRI_B", "PGND_PRI"))
        .with_components(half_bridge("Q5", "Q6", "VOUT_ISO", "SEC_A", "PGND_SEC"))
        .with_components(half_bridge("Q7", "Q8", "VOUT_ISO", "SEC_B", "PGND_SEC"))
        .with_component(component("CR1", "C_film", vec![pin("1", "1", Some("VSW_P1")), pin("2", "2", Some("PRI_A"))]))
        .with_component(component(
            "T1",
            "XFMR_ISO1",
            vec![
                pin("P1", "PRI_A", Some("PRI_A")),
                pin("P2", "PRI_B", Some("PRI_B")),
                pin("S1", "SEC_A", Some("SEC_A")),
                pin("S2", "SEC_B", Some("SEC_B")),
            ],
        ))
        .with_component(component(
            "PS1",
            "MGJ2D121505SC",
            vec![pin("P", "+VOUT", Some("PS1_P")), pin("Z", "0V", Some("PS1_Z")), pin("M", "-VOUT", Some("PS1_M"))],
        ))
        .with_component(component(
            "PS2",
            "MGJ2D121505SC",
            vec![pin("P", "+VOUT", Some("PS2_P")), pin("Z", "0V", Some("PS2_Z")), pin("M", "-VOUT", Some("PS2_M"))],
        ))
        .with_component(component("U1", "UCC5390E", vec![pin("OUT", "OUT", None)]))
        .with_component(component("U2", "UCC5390E", vec![pin("OUT", "OUT", None)]))
        .build();

    let mut transformer_entry = kg_entry("XFMR_ISO1", "transformer", &[]);
    transformer_entry.isolation_boundary = true;
    transformer_entry.primary_pins = vec!["PRI_A".to_string(), "PRI_B".to_string()];
    transformer_entry.secondary_pins = vec!["SEC_A".to_string(), "SEC_B".to_string()];

    let mut isolated_supply_entry = kg_entry("MGJ2D121505SC", "isolated-supply", &[]);
    isolated_supply_entry.pin_roles = [
        ("+VOUT".to_string(), "out_plus".to_string()),
        ("0V".to_string(), "supply_gnd".to_string()),
        ("-VOUT".to_string(), "out_minus".to_string()),
    ]
    .into_iter()
    .collect();

    let kg = KgBuilder::new()
        .with_entry(mosfet_kg_entry())
        .with_entry(transformer_entry)
        .with_entry(isolated_supply_entry)
        .with_entry(kg_entry("UCC5390E", "gate-driver", &[("OUT", "out")]))
        .build();
    (snapshot, kg)
}

/// S6: an isolated supply's secondary return reuses the net name `GND`,
/// which a primary-side resistor already ties to `VIN` — the same literal
/// name claimed by two domains that should be disjoint.
pub fn s6_cross_domain_net_conflict() -> (Snapshot, KnowledgeGraph) {
    let snapshot = FixtureBuilder::new()
        .with_component(component("R1", "R", vec![pin("1", "1", Some("VIN")), pin("2", "2", Some("GND"))]))
        .with_component(component(
            "PS1",
            "MGJ2D121505SC",
            vec![
                pin("1", "VIN+", Some("VIN")),
                pin("2", "VIN-", Some("GND_PRI")),
                pin("3", "VOUT+", Some("VOUT_ISO")),
                pin("4", "VOUT-", Some("GND")),
            ],
        ))
        .build();
    let mut entry = kg_entry("MGJ2D121505SC", "isolated-supply", &[]);
    entry.isolation_boundary = true;
    entry.primary_pins = vec!["1".to_string(), "2".to_string()];
    entry.secondary_pins = vec!["3".to_string(), "4".to_string()];
    let kg = KgBuilder::new().with_entry(entry).build();
    (snapshot, kg)
}
