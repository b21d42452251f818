//! System Topology Verifier: template-driven checks for the complex-task
//! family (synchronous buck/boost, 4-switch buck-boost, dual active bridge,
//! LLC resonant, multi-phase inverter), plus the shared primitives
//! (MOSFET-connectivity extraction, bridge inference, tank-path search)
//! every per-topology check is built from.

mod bridge;
mod mosfet;
mod netclass;
mod tank;
mod topologies;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use topo_common::{KgStore, LoadError, Snapshot, TaskId};

use self::mosfet::all_mosfets;

/// One row of the fixed task-id -> topology template table (task ids
/// 17-23). Carries only the counts and component-presence requirements a
/// template needs up front; the topology-specific wiring/tank checks live
/// in `topologies`.
#[derive(Debug, Clone)]
pub struct TaskTemplate {
    pub name: &'static str,
    pub topology: &'static str,
    pub min_mosfets: usize,
    pub min_gate_drivers: usize,
    pub min_isolated_supplies: usize,
    pub requires_transformer: bool,
    pub requires_film_cap: bool,
    pub requires_power_inductor: bool,
}

pub static TASK_TEMPLATES: Lazy<HashMap<TaskId, TaskTemplate>> = Lazy::new(|| {
    HashMap::from([
        (
            TaskId(17),
            TaskTemplate {
                name: "Synchronous Buck",
                topology: "sync_buck",
                min_mosfets: 2,
                min_gate_drivers: 1,
                min_isolated_supplies: 0,
                requires_transformer: false,
                requires_film_cap: false,
                requires_power_inductor: true,
            },
        ),
        (
            TaskId(18),
            TaskTemplate {
                name: "Synchronous Boost",
                topology: "sync_boost",
                min_mosfets: 2,
                min_gate_drivers: 1,
                min_isolated_supplies: 0,
                requires_transformer: false,
                requires_film_cap: false,
                requires_power_inductor: true,
            },
        ),
        (
            TaskId(19),
            TaskTemplate {
                name: "4-Switch Buck-Boost",
                topology: "4sw_buckboost",
                min_mosfets: 4,
                min_gate_drivers: 2,
                min_isolated_supplies: 0,
                requires_transformer: false,
                requires_film_cap: false,
                requires_power_inductor: true,
            },
        ),
        (
            TaskId(20),
            TaskTemplate {
                name: "Dual Active Bridge",
                topology: "dab",
                min_mosfets: 8,
                min_gate_drivers: 2,
                min_isolated_supplies: 2,
                requires_transformer: true,
                requires_film_cap: true,
                requires_power_inductor: true,
            },
        ),
        (
            TaskId(21),
            TaskTemplate {
                name: "LLC Resonant Converter",
                topology: "llc",
                min_mosfets: 4,
                min_gate_drivers: 2,
                min_isolated_supplies: 1,
                requires_transformer: true,
                requires_film_cap: true,
                requires_power_inductor: true,
            },
        ),
        (
            TaskId(22),
            TaskTemplate {
                name: "Three-Phase Inverter",
                topology: "3ph_inverter",
                min_mosfets: 6,
                min_gate_drivers: 1,
                min_isolated_supplies: 0,
                requires_transformer: false,
                requires_film_cap: false,
                requires_power_inductor: false,
            },
        ),
        (
            TaskId(23),
            TaskTemplate {
                name: "Single-Phase Full-Bridge Inverter",
                topology: "1ph_fullbridge",
                min_mosfets: 4,
                min_gate_drivers: 1,
                min_isolated_supplies: 0,
                requires_transformer: false,
                requires_film_cap: false,
                requires_power_inductor: false,
            },
        ),
    ])
});

/// Resolve a task identifier to its system-topology template, for callers
/// (the CLI) that need to tell "this is a complex task" apart from "this
/// task id isn't registered at all" before running any verification.
pub fn resolve_template(task_id: TaskId) -> Result<&'static TaskTemplate, LoadError> {
    TASK_TEMPLATES.get(&task_id).ok_or(LoadError::UnknownTask(task_id))
}

fn count_category(snapshot: &Snapshot, kg: &KgStore, category: &str) -> usize {
    snapshot
        .components
        .iter()
        .filter(|c| kg.category_of(&c.part_id, &c.reference) == category)
        .count()
}

fn check_component_floors(snapshot: &Snapshot, kg: &KgStore, task_id: TaskId, template: &TaskTemplate) -> Vec<String> {
    let mut errors = Vec::new();
    let mosfets = count_category(snapshot, kg, "MOSFET");
    if mosfets < template.min_mosfets {
        errors.push(format!(
            "Task {} ({}) requires at least {} MOSFETs, but only {} found",
            task_id.0, template.name, template.min_mosfets, mosfets
        ));
    }
    let drivers = count_category(snapshot, kg, "gate-driver");
    if drivers < template.min_gate_drivers {
        errors.push(format!(
            "Task {} ({}) requires at least {} gate drivers, but only {} found",
            task_id.0, template.name, template.min_gate_drivers, drivers
        ));
    }
    let isolated_supplies = count_category(snapshot, kg, "isolated-supply");
    if isolated_supplies < template.min_isolated_supplies {
        errors.push(format!(
            "Task {} ({}) requires at least {} isolated supplies, but only {} found",
            task_id.0, template.name, template.min_isolated_supplies, isolated_supplies
        ));
    }
    if template.requires_transformer && count_category(snapshot, kg, "transformer") == 0 {
        errors.push(format!("Task {} ({}) requires a transformer, but none found", task_id.0, template.name));
    }
    if template.requires_film_cap && !snapshot.components.iter().any(|c| c.part_id == "C_film") {
        errors.push(format!("Task {} ({}) requires a film capacitor, but none found", task_id.0, template.name));
    }
    if template.requires_power_inductor
        && !snapshot.components.iter().any(|c| c.part_id == "Inductor_power" || c.part_id == "L")
    {
        errors.push(format!("Task {} ({}) requires a power inductor, but none found", task_id.0, template.name));
    }
    errors
}

/// VBUS-like nets carrying a `mosfet_drain` endpoint must have at least 8
/// decoupling capacitors, across every complex task (17-23). Logic-only
/// `VIN` rails with no power-stage drain endpoint are exempt.
fn check_vbus_decoupling(snapshot: &Snapshot) -> Vec<String> {
    let mut errors = Vec::new();
    for net in &snapshot.nets {
        let upper = net.name.to_uppercase();
        if !(upper.contains("VBUS") || upper.contains("VIN")) {
            continue;
        }
        if !net.endpoints.iter().any(|ep| ep.pin_role.as_deref() == Some("mosfet_drain")) {
            continue;
        }
        let cap_count = net
            .endpoints
            .iter()
            .filter(|ep| {
                snapshot
                    .find_component(&ep.reference)
                    .map(|c| c.part_id == "C")
                    .unwrap_or(false)
            })
            .count();
        if cap_count < 8 {
            errors.push(format!(
                "VBUS net '{}' has only {cap_count} decoupling capacitors. High dv/dt applications MUST have at least 8 capacitors.",
                net.name
            ));
        }
    }
    errors
}

/// Dispatch to the per-topology check named by the template, given that the
/// up-front component-floor checks already passed on their own terms (a
/// failing floor check does not prevent the topology check from also
/// running; both sets of errors accumulate per the pipeline's
/// run-to-completion policy).
fn check_topology(snapshot: &Snapshot, kg: &KgStore, template: &TaskTemplate) -> Vec<String> {
    match template.topology {
        "sync_buck" => topologies::check_sync_buck_or_boost(snapshot, kg, "sync_buck"),
        "sync_boost" => topologies::check_sync_buck_or_boost(snapshot, kg, "sync_boost"),
        "4sw_buckboost" => topologies::check_4sw_buckboost(snapshot, kg),
        "dab" => topologies::check_dab(snapshot, kg),
        "llc" => topologies::check_llc(snapshot, kg),
        "3ph_inverter" => topologies::check_3ph_inverter(snapshot, kg),
        "1ph_fullbridge" => topologies::check_1ph_fullbridge(snapshot, kg),
        other => vec![format!("unknown topology tag '{other}'")],
    }
}

/// Run the System Topology Verifier for a complex task: component-floor
/// checks, VBUS decoupling, then the topology-specific wiring/tank check.
/// Unknown task ids (outside the template table) are reported as a single
/// error rather than silently passing.
pub fn verify(snapshot: &Snapshot, kg: &KgStore, task_id: TaskId) -> Vec<String> {
    let Some(template) = TASK_TEMPLATES.get(&task_id) else {
        return vec![format!("no system topology template registered for task {}", task_id.0)];
    };

    let mosfets = all_mosfets(snapshot, kg);
    tracing::debug!(task = task_id.0, topology = template.topology, mosfets = mosfets.len(), "system topology verification");

    let mut errors = check_component_floors(snapshot, kg, task_id, template);
    errors.extend(check_vbus_decoupling(snapshot));
    errors.extend(check_topology(snapshot, kg, template));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_task_id_reports_single_error() {
        let snapshot = Snapshot::default();
        let kg = KgStore::new(topo_common::KnowledgeGraph::default(), None);
        let errors = verify(&snapshot, &kg, TaskId(999));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("no system topology template"));
    }

    #[test]
    fn missing_components_reports_floor_errors() {
        let snapshot = Snapshot::default();
        let kg = KgStore::new(topo_common::KnowledgeGraph::default(), None);
        let errors = verify(&snapshot, &kg, TaskId(20));
        assert!(errors.iter().any(|e| e.contains("requires at least 8 MOSFETs")));
        assert!(errors.iter().any(|e| e.contains("requires a transformer")));
    }

    #[test]
    fn resolve_template_finds_registered_complex_task() {
        let template = resolve_template(TaskId(17)).expect("task 17 is registered");
        assert_eq!(template.topology, "sync_buck");
    }

    #[test]
    fn resolve_template_reports_unknown_task() {
        let err = resolve_template(TaskId(1)).unwrap_err();
        assert!(matches!(err, topo_common::LoadError::UnknownTask(TaskId(1))));
    }
}
