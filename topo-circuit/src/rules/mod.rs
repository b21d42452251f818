//! Rule Extractor and Rule Checker: typed connectivity rules derived from a
//! reference snapshot and evaluated, with tolerant endpoint resolution,
//! against a candidate.

mod check;
mod extract;

pub use check::{check_driver_gate_links, check_rules};
pub use extract::extract_rules;

use topo_common::EndpointDescriptor;

/// Human-readable signature for an endpoint descriptor, used in
/// rule-failure messages.
fn describe(descriptor: &EndpointDescriptor) -> String {
    let mut parts = Vec::new();
    if let Some(p) = &descriptor.part_id {
        parts.push(p.clone());
    }
    if let Some(c) = &descriptor.category {
        parts.push(c.clone());
    }
    if let Some(r) = &descriptor.pin_role {
        parts.push(r.clone());
    }
    if parts.is_empty() {
        if let Some(name) = &descriptor.pin_name {
            parts.push(name.clone());
        }
    }
    if parts.is_empty() {
        "<endpoint>".to_string()
    } else {
        parts.join("/")
    }
}
