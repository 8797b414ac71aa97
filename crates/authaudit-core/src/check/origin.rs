use std::collections::BTreeSet;

use crate::graph::{SchemaGraph, TypeKind};
use crate::registry::RequirementRegistry;
use crate::report::{Finding, FindingKind, Findings};

/// Warns about access-controlled elements contributed by other than exactly
/// one origin. How such requirements merge depends on the composition
/// version, so these are advisory and never fail the audit.
pub fn detect_multi_origin(
    graph: &SchemaGraph,
    registry: &RequirementRegistry,
    findings: &mut Findings,
) -> bool {
    for (coordinate, requirement) in registry.iter() {
        let Some(owner) = graph.get_type(&coordinate.type_name) else {
            continue;
        };

        match coordinate.field_name.as_deref() {
            None => {
                if owner.kind != TypeKind::Object {
                    continue;
                }
                let origins = owner.origin_set();
                if origins.len() != 1 {
                    findings.push(Finding::warning(
                        FindingKind::MultiOriginType,
                        vec![coordinate.clone()],
                        format!(
                            "Type {coordinate} declares {requirement} and is contributed by {}; merge semantics depend on the composition version, review manually",
                            describe_origins(&origins)
                        ),
                    ));
                }
            }
            Some(field_name) => {
                let Some(field) = owner.get_field(field_name) else {
                    continue;
                };
                let origins = field.origin_set(owner);
                if origins.len() != 1 && field.contributions.len() != 1 {
                    findings.push(Finding::warning(
                        FindingKind::MultiOriginField,
                        vec![coordinate.clone()],
                        format!(
                            "Field {coordinate} declares {requirement} and is contributed by {}; merge semantics depend on the composition version, review manually",
                            describe_origins(&origins)
                        ),
                    ));
                }
            }
        }
    }

    true
}

fn describe_origins(origins: &BTreeSet<&str>) -> String {
    if origins.is_empty() {
        return "no recorded origin".to_string();
    }
    let names = origins.iter().copied().collect::<Vec<_>>().join(", ");
    format!("{} origins ({names})", origins.len())
}
