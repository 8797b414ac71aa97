use crate::registry::RequirementRegistry;
use crate::report::{Finding, FindingKind, Findings};

use super::RequirementValidator;

/// Forwards fields that pull data from other origins to the validator and
/// surfaces whatever it reports as errors.
pub struct TransitiveExposureDetector<'a, V: RequirementValidator> {
    registry: &'a RequirementRegistry,
    validator: &'a V,
}

impl<'a, V: RequirementValidator> TransitiveExposureDetector<'a, V> {
    pub fn new(registry: &'a RequirementRegistry, validator: &'a V) -> Self {
        Self {
            registry,
            validator,
        }
    }

    pub fn run(&self, findings: &mut Findings) -> bool {
        let mut secure = true;

        for coordinate in self.registry.fields_with_field_dependency() {
            for problem in self.validator.check_field_dependency(coordinate) {
                secure = false;
                findings.push(Finding::error(
                    FindingKind::FieldDependency,
                    vec![coordinate.clone()],
                    problem.message,
                ));
            }
        }

        for coordinate in self.registry.fields_with_context_forwarding() {
            for problem in self.validator.check_context_forwarding(coordinate) {
                secure = false;
                findings.push(Finding::error(
                    FindingKind::ContextForwarding,
                    vec![coordinate.clone()],
                    problem.message,
                ));
            }
        }

        secure
    }
}
