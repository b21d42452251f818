//! The verification pipeline's stages: snapshot augmentation, passive
//! classification, constraint checking, isolation-domain analysis, net
//! conflict checking, interface checking, rule extraction/checking, skeleton
//! matching, and system topology verification. Orchestration (ordering the
//! stages and choosing simple-task vs. complex-task flow) lives in
//! `topo-verifier`; this crate owns the stages themselves.

pub mod augment;
pub mod constraints;
pub mod graph;
pub mod interface;
pub mod isolation;
pub mod net_conflict;
pub mod passive;
pub mod rules;
pub mod skeleton;
pub mod system;

pub use isolation::IsolationDomains;
pub use system::{resolve_template, TaskTemplate, TASK_TEMPLATES};
