//! Orchestrates the stages in `topo_circuit` into the two top-level entry
//! points external callers use: [`verify_simple`] (candidate vs. reference
//! snapshot) and [`verify_complex`] (candidate vs. a hand-authored task
//! template). Stage order and fast-fail behavior follow the pipeline:
//! Augmenter -> Constraint Checker (complex tasks may fast-fail here) ->
//! Isolation + Net Conflict + Interface -> Rule Extractor/Checker +
//! Skeleton Matcher (simple) or System Topology Verifier (complex) ->
//! Reporter.

use topo_circuit::{augment, constraints, interface, isolation, net_conflict, rules, skeleton, system};
use topo_common::{KgStore, Snapshot, TaskId};

/// Outcome of one verification run. `warnings` carries the Net Conflict
/// Checker's advisory diagnostics (anything tagged `WARNING`); everything
/// else that's wrong lands in `errors`.
#[derive(Debug, Clone, Default)]
pub struct VerificationResult {
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl VerificationResult {
    fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        VerificationResult {
            passed: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Splits Net Conflict Checker output into hard errors and advisory
/// warnings, keyed on the `WARNING` tag the checker puts in its own
/// messages (`GND NAMING WARNING`, `INSTANCE NAMING WARNING`, `GATE NET
/// WARNING`) versus its hard `NET CONFLICT` messages.
fn partition_net_conflict(messages: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for message in messages {
        if message.contains("WARNING") {
            warnings.push(message);
        } else {
            errors.push(message);
        }
    }
    (errors, warnings)
}

/// Verify a candidate snapshot against a reference snapshot for a simple
/// task: every stage runs to completion regardless of earlier failures.
pub fn verify_simple(candidate: &Snapshot, reference: &Snapshot, kg: &KgStore, task_id: TaskId) -> VerificationResult {
    let _span = tracing::debug_span!("verify_simple", task = task_id.0).entered();

    let mut candidate = candidate.clone();
    augment::augment(&mut candidate, kg);
    let mut reference = reference.clone();
    augment::augment(&mut reference, kg);

    let mut errors = constraints::check(&candidate, kg, task_id);

    let (domains, isolation_errors) = isolation::analyse(&candidate, kg);
    errors.extend(isolation_errors);

    let (conflict_errors, warnings) = partition_net_conflict(net_conflict::check(&candidate, &domains));
    errors.extend(conflict_errors);

    errors.extend(interface::check(&candidate, kg));

    let extracted_rules = rules::extract_rules(&reference);
    errors.extend(rules::check_rules(&reference, &candidate, &extracted_rules, task_id));
    errors.extend(rules::check_driver_gate_links(&reference, &candidate));

    errors.extend(skeleton::check(&reference, &candidate, kg, task_id));

    tracing::info!(task = task_id.0, errors = errors.len(), "simple-task verification complete");
    VerificationResult::new(errors, warnings)
}

/// Verify a candidate snapshot against a hand-authored topology template
/// for a complex power-electronics task. Fast-fails at the Constraint
/// Checker: a non-empty result there skips every later stage.
pub fn verify_complex(candidate: &Snapshot, kg: &KgStore, task_id: TaskId) -> VerificationResult {
    let _span = tracing::debug_span!("verify_complex", task = task_id.0).entered();

    let mut candidate = candidate.clone();
    augment::augment(&mut candidate, kg);

    let constraint_errors = constraints::check(&candidate, kg, task_id);
    if !constraint_errors.is_empty() {
        tracing::warn!(task = task_id.0, "complex-task verification fast-failed at constraint checker");
        return VerificationResult::new(constraint_errors, Vec::new());
    }

    let mut errors = Vec::new();
    let (domains, isolation_errors) = isolation::analyse(&candidate, kg);
    errors.extend(isolation_errors);

    let (conflict_errors, warnings) = partition_net_conflict(net_conflict::check(&candidate, &domains));
    errors.extend(conflict_errors);

    errors.extend(interface::check(&candidate, kg));
    errors.extend(system::verify(&candidate, kg, task_id));

    tracing::info!(task = task_id.0, errors = errors.len(), "complex-task verification complete");
    VerificationResult::new(errors, warnings)
}

/// Format a diagnostic list the way callers print it: empty input yields
/// an empty string; otherwise a header line followed by one dashed line
/// per entry.
pub fn report(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from("Topology verification failed:");
    for entry in errors {
        out.push_str("\n- ");
        out.push_str(entry);
    }
    out
}
