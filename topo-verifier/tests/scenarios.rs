//! End-to-end scenarios S1-S6 from the testable-properties list, each
//! built from a canned fixture in `topo_test_fixtures::samples`.

use topo_circuit::{augment, constraints, interface, isolation, net_conflict};
use topo_common::{KgStore, TaskId};
use topo_test_fixtures::samples;
use topo_verifier::verify_complex;

#[test]
fn s1_correct_buck_converter_passes_with_no_errors() {
    let (candidate, kg) = samples::s1_buck_converter();
    let store = KgStore::new(kg, None);
    let result = verify_complex(&candidate, &store, TaskId(17));
    assert!(result.passed, "unexpected errors: {:?}", result.errors);
}

#[test]
fn s2_shorted_differential_pair_is_reported() {
    let (mut snapshot, kg) = samples::s2_shorted_differential_pair();
    let store = KgStore::new(kg, None);
    augment::augment(&mut snapshot, &store);
    let errors = constraints::check(&snapshot, &store, TaskId(1));
    assert!(
        errors.iter().any(|e| e.contains("differential pins on same net")),
        "errors: {errors:?}"
    );
}

#[test]
fn s3_kelvin_source_shorted_to_source_is_reported() {
    let (mut snapshot, kg) = samples::s3_kelvin_source_shorted();
    let store = KgStore::new(kg, None);
    augment::augment(&mut snapshot, &store);
    let errors = constraints::check(&snapshot, &store, TaskId(1));
    assert!(
        errors.iter().any(|e| e.contains("kelvin source should not be shorted to source net")),
        "errors: {errors:?}"
    );
}

#[test]
fn s4_missing_gate_resistor_is_reported() {
    let (mut snapshot, kg) = samples::s4_missing_gate_resistor();
    let store = KgStore::new(kg, None);
    augment::augment(&mut snapshot, &store);
    let errors = interface::check(&snapshot, &store);
    assert!(
        errors.iter().any(|e| e.contains("without gate resistor")),
        "errors: {errors:?}"
    );
}

#[test]
fn s5_dab_missing_resonant_inductor_is_reported() {
    let (candidate, kg) = samples::s5_dab_missing_inductor();
    let store = KgStore::new(kg, None);
    let result = verify_complex(&candidate, &store, TaskId(20));
    assert!(
        result.errors.iter().any(|e| e.contains("missing series tank elements")),
        "errors: {:?}",
        result.errors
    );
}

#[test]
fn s6_cross_domain_net_conflict_is_reported() {
    let (mut snapshot, kg) = samples::s6_cross_domain_net_conflict();
    let store = KgStore::new(kg, None);
    augment::augment(&mut snapshot, &store);
    let (domains, isolation_errors) = isolation::analyse(&snapshot, &store);
    assert!(isolation_errors.is_empty(), "unexpected isolation errors: {isolation_errors:?}");
    let errors = net_conflict::check(&snapshot, &domains);
    assert!(
        errors.iter().any(|e| e.contains("NET CONFLICT") && e.contains("'GND'")),
        "errors: {errors:?}"
    );
}
