mod markers;
mod origin;
mod polymorphism;
mod transitive;

pub use markers::check_renamed_markers;
pub use origin::detect_multi_origin;
pub use polymorphism::PolymorphismChecker;
pub use transitive::TransitiveExposureDetector;

use crate::graph::Coordinate;

/// A semantic problem reported by a [`RequirementValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub message: String,
}

impl ValidationFinding {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Evaluates the data a field pulls in from other origins against the
/// field's own access-control requirement. Supplied by the host because it
/// needs full selection-set evaluation against the composed graph.
pub trait RequirementValidator {
    fn check_field_dependency(&self, coordinate: &Coordinate) -> Vec<ValidationFinding>;

    fn check_context_forwarding(&self, coordinate: &Coordinate) -> Vec<ValidationFinding>;
}

/// Validator that never reports anything, for hosts without selection-set
/// support.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl RequirementValidator for AcceptAll {
    fn check_field_dependency(&self, _coordinate: &Coordinate) -> Vec<ValidationFinding> {
        Vec::new()
    }

    fn check_context_forwarding(&self, _coordinate: &Coordinate) -> Vec<ValidationFinding> {
        Vec::new()
    }
}
