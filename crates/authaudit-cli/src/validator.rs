use authaudit_core::graph::{FieldDefinition, SchemaGraph, TypeDefinition};
use authaudit_core::requirement::{self, AccessRequirement, describe};
use authaudit_core::{Coordinate, MarkerTable, RequirementValidator, ValidationFinding};

use crate::selection::{Selection, parse_field_set};

/// Checks that every field reached through a field set is protected at least
/// as strongly as the field pulling it in.
pub struct SelectionValidator<'a> {
    graph: &'a SchemaGraph,
    table: &'a MarkerTable,
}

impl<'a> SelectionValidator<'a> {
    pub fn new(graph: &'a SchemaGraph, table: &'a MarkerTable) -> Self {
        Self { graph, table }
    }

    fn resolve(
        &self,
        coordinate: &Coordinate,
    ) -> Option<(&'a TypeDefinition, &'a FieldDefinition)> {
        let owner = self.graph.get_type(&coordinate.type_name)?;
        let field = owner.get_field(coordinate.field_name.as_deref()?)?;
        Some((owner, field))
    }

    /// Requirement guarding a field: its own plus its declaring type's.
    fn effective_requirement(
        &self,
        owner: &TypeDefinition,
        field: &FieldDefinition,
    ) -> Option<AccessRequirement> {
        let on_type = requirement::extract(&owner.markers, self.table);
        let on_field = requirement::extract(&field.markers, self.table);
        match (on_type, on_field) {
            (Some(t), Some(f)) => Some(t.and(&f)),
            (t, f) => t.or(f),
        }
    }

    fn collect_requirements(
        &self,
        current: &TypeDefinition,
        selections: &[Selection],
        out: &mut Vec<(Coordinate, AccessRequirement)>,
    ) {
        for selection in selections {
            match selection {
                Selection::Field { name, selections } => {
                    let Some(field) = current.get_field(name) else {
                        tracing::debug!(
                            type_name = %current.name,
                            field = %name,
                            "selected field not in graph"
                        );
                        continue;
                    };
                    if let Some(requirement) = self.effective_requirement(current, field) {
                        out.push((current.field_coordinate(field), requirement));
                    }
                    if !selections.is_empty()
                        && let Some(target) = self.graph.get_type(&field.type_name)
                    {
                        self.collect_requirements(target, selections, out);
                    }
                }
                Selection::InlineFragment {
                    type_condition,
                    selections,
                } => {
                    if let Some(target) = self.graph.get_type(type_condition) {
                        self.collect_requirements(target, selections, out);
                    }
                }
            }
        }
    }

    fn unimplied<'r>(
        own: Option<&AccessRequirement>,
        reached: &'r [(Coordinate, AccessRequirement)],
    ) -> impl Iterator<Item = &'r (Coordinate, AccessRequirement)> {
        reached
            .iter()
            .filter(move |(_, needed)| !own.is_some_and(|held| held.implies(needed)))
    }
}

impl RequirementValidator for SelectionValidator<'_> {
    fn check_field_dependency(&self, coordinate: &Coordinate) -> Vec<ValidationFinding> {
        let Some((owner, field)) = self.resolve(coordinate) else {
            return Vec::new();
        };
        let own = self.effective_requirement(owner, field);
        let mut problems = Vec::new();

        for contribution in &field.contributions {
            let Some(ref requires) = contribution.requires else {
                continue;
            };
            let field_set = match parse_field_set(requires) {
                Ok(field_set) => field_set,
                Err(e) => {
                    problems.push(ValidationFinding::new(format!(
                        "Field {coordinate} has a field set that could not be parsed: {e}"
                    )));
                    continue;
                }
            };

            let mut reached = Vec::new();
            self.collect_requirements(owner, &field_set.selections, &mut reached);
            for (dependency, needed) in Self::unimplied(own.as_ref(), &reached) {
                problems.push(ValidationFinding::new(format!(
                    "Field {coordinate} depends on {dependency} through a field dependency from {}, but {dependency} requires {needed} which {coordinate} does not ({})",
                    contribution.origin,
                    describe(own.as_ref())
                )));
            }
        }

        problems
    }

    fn check_context_forwarding(&self, coordinate: &Coordinate) -> Vec<ValidationFinding> {
        let Some((owner, field)) = self.resolve(coordinate) else {
            return Vec::new();
        };
        let own = self.effective_requirement(owner, field);
        let mut problems = Vec::new();

        for argument in field
            .contributions
            .iter()
            .flat_map(|c| c.context_arguments.iter())
        {
            let field_set = match parse_field_set(&argument.selection) {
                Ok(field_set) => field_set,
                Err(e) => {
                    problems.push(ValidationFinding::new(format!(
                        "Field {coordinate} has a field set that could not be parsed: {e}"
                    )));
                    continue;
                }
            };

            let mut reached = Vec::new();
            for source in &argument.source_types {
                if let Some(source_type) = self.graph.get_type(source) {
                    self.collect_requirements(source_type, &field_set.selections, &mut reached);
                }
            }
            for (dependency, needed) in Self::unimplied(own.as_ref(), &reached) {
                problems.push(ValidationFinding::new(format!(
                    "Argument {coordinate}({}:) forwards {dependency} from context \"{}\", but {dependency} requires {needed} which {coordinate} does not ({})",
                    argument.name,
                    argument.context,
                    describe(own.as_ref())
                )));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authaudit_core::graph::{AppliedMarker, ContextArgument, FieldContribution};

    fn authenticated() -> AppliedMarker {
        AppliedMarker::bare("authenticated")
    }

    fn scope(name: &str) -> AppliedMarker {
        AppliedMarker::with_values("requiresScopes", [vec![name]])
    }

    fn graph(order_total: FieldDefinition) -> SchemaGraph {
        SchemaGraph::new(vec![
            TypeDefinition::object("Order")
                .with_field(FieldDefinition::new("id", "ID"))
                .with_field(FieldDefinition::new("items", "Item"))
                .with_field(
                    FieldDefinition::new("customerTier", "String").with_marker(scope("crm")),
                )
                .with_field(order_total),
            TypeDefinition::object("Item")
                .with_field(FieldDefinition::new("price", "Int").with_marker(authenticated())),
        ])
        .unwrap()
    }

    #[test]
    fn unprotected_dependency_on_protected_field_is_reported() {
        let graph = graph(
            FieldDefinition::new("total", "Int")
                .with_contribution(FieldContribution::new("pricing").requiring("items { price }")),
        );
        let table = MarkerTable::canonical();
        let validator = SelectionValidator::new(&graph, &table);

        let problems = validator.check_field_dependency(&Coordinate::of_field("Order", "total"));

        assert_eq!(problems.len(), 1);
        assert_eq!(
            problems[0].message,
            "Field Order.total depends on Item.price through a field dependency from pricing, but Item.price requires @authenticated which Order.total does not (no access control)"
        );
    }

    #[test]
    fn dependency_covered_by_own_requirement_passes() {
        let graph = graph(
            FieldDefinition::new("total", "Int")
                .with_marker(scope("crm"))
                .with_contribution(
                    FieldContribution::new("pricing").requiring("id customerTier items { price }"),
                ),
        );
        let table = MarkerTable::canonical();
        let validator = SelectionValidator::new(&graph, &table);

        let problems = validator.check_field_dependency(&Coordinate::of_field("Order", "total"));

        assert!(problems.is_empty(), "unexpected problems: {problems:?}");
    }

    #[test]
    fn weaker_own_requirement_is_reported() {
        let graph = graph(
            FieldDefinition::new("total", "Int")
                .with_marker(authenticated())
                .with_contribution(FieldContribution::new("pricing").requiring("customerTier")),
        );
        let table = MarkerTable::canonical();
        let validator = SelectionValidator::new(&graph, &table);

        let problems = validator.check_field_dependency(&Coordinate::of_field("Order", "total"));

        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("Order.customerTier"));
    }

    #[test]
    fn unparseable_field_set_is_reported() {
        let graph = graph(
            FieldDefinition::new("total", "Int")
                .with_contribution(FieldContribution::new("pricing").requiring("items {")),
        );
        let table = MarkerTable::canonical();
        let validator = SelectionValidator::new(&graph, &table);

        let problems = validator.check_field_dependency(&Coordinate::of_field("Order", "total"));

        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("could not be parsed"));
    }

    #[test]
    fn unknown_selected_fields_are_skipped() {
        let graph = graph(
            FieldDefinition::new("total", "Int")
                .with_contribution(
                    FieldContribution::new("pricing").requiring("missing { price }"),
                ),
        );
        let table = MarkerTable::canonical();
        let validator = SelectionValidator::new(&graph, &table);

        assert!(
            validator
                .check_field_dependency(&Coordinate::of_field("Order", "total"))
                .is_empty()
        );
    }

    #[test]
    fn context_forwarding_from_protected_source_is_reported() {
        let graph = SchemaGraph::new(vec![
            TypeDefinition::object("Customer")
                .with_marker(policy("crm_reader"))
                .with_field(FieldDefinition::new("tier", "String")),
            TypeDefinition::object("Offer").with_field(
                FieldDefinition::new("discount", "Int").with_contribution(
                    FieldContribution::new("pricing").with_context_argument(ContextArgument {
                        name: "tier".to_string(),
                        context: "customer".to_string(),
                        selection: "$customer { tier }".to_string(),
                        source_types: vec!["Customer".to_string()],
                    }),
                ),
            ),
        ])
        .unwrap();
        let table = MarkerTable::canonical();
        let validator = SelectionValidator::new(&graph, &table);

        let problems =
            validator.check_context_forwarding(&Coordinate::of_field("Offer", "discount"));

        assert_eq!(problems.len(), 1);
        assert_eq!(
            problems[0].message,
            r#"Argument Offer.discount(tier:) forwards Customer.tier from context "customer", but Customer.tier requires @policy(policies: [["crm_reader"]]) which Offer.discount does not (no access control)"#
        );
    }

    fn policy(name: &str) -> AppliedMarker {
        AppliedMarker::with_values("policy", [vec![name]])
    }

    #[test]
    fn unknown_coordinate_yields_nothing() {
        let graph = SchemaGraph::default();
        let table = MarkerTable::canonical();
        let validator = SelectionValidator::new(&graph, &table);

        assert!(
            validator
                .check_field_dependency(&Coordinate::of_field("Order", "total"))
                .is_empty()
        );
        assert!(
            validator
                .check_context_forwarding(&Coordinate::of_type("Order"))
                .is_empty()
        );
    }
}
