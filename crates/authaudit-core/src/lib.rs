pub mod audit;
pub mod check;
pub mod graph;
pub mod marker;
pub mod registry;
pub mod report;
pub mod requirement;

pub use audit::{AuditPolicy, Auditor};
pub use check::{AcceptAll, RequirementValidator, ValidationFinding};
pub use graph::{Coordinate, GraphError, SchemaGraph};
pub use marker::{MarkerHandle, MarkerKind, MarkerTable};
pub use registry::RequirementRegistry;
pub use report::{AuditReport, Finding, FindingKind, Severity};
pub use requirement::{AccessRequirement, Fingerprint};
