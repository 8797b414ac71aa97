use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{AppliedMarker, Coordinate, FieldDefinition, SchemaGraph, TypeDefinition};
use crate::marker::MarkerTable;
use crate::requirement::{AccessRequirement, extract};

/// Requirements declared across one graph snapshot, plus the coordinate sets
/// the checks run over. Built once per audit and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementRegistry {
    requirements: BTreeMap<Coordinate, AccessRequirement>,
    interfaces_to_check: BTreeSet<String>,
    fields_with_field_dependency: BTreeSet<Coordinate>,
    fields_with_context_forwarding: BTreeSet<Coordinate>,
    interface_member_declarations: BTreeSet<Coordinate>,
}

impl RequirementRegistry {
    pub fn build(graph: &SchemaGraph, table: &MarkerTable) -> Self {
        let mut registry = Self::default();

        for interface in graph.interfaces() {
            registry.visit_interface(interface, table);
        }
        for object in graph.objects() {
            registry.visit_object(object, table);
        }

        tracing::debug!(
            requirements = registry.requirements.len(),
            interfaces_to_check = registry.interfaces_to_check.len(),
            field_dependencies = registry.fields_with_field_dependency.len(),
            context_forwarding = registry.fields_with_context_forwarding.len(),
            "requirement registry built"
        );

        registry
    }

    fn visit_interface(&mut self, interface: &TypeDefinition, table: &MarkerTable) {
        let interface_object_origins = interface.interface_object_origins();
        let all_interface_objects = !interface.origins.is_empty()
            && interface_object_origins.len() == interface.origin_set().len();

        let mut controlled = false;
        if self.record(interface.coordinate(), &interface.markers, table) {
            controlled = true;
            if !all_interface_objects {
                self.interface_member_declarations.insert(interface.coordinate());
            }
        }

        for field in &interface.fields {
            let coordinate = interface.field_coordinate(field);
            self.record_dependencies(&coordinate, field);
            if self.record(coordinate.clone(), &field.markers, table) {
                controlled = true;
                let field_origins = field.origin_set(interface);
                let via_interface_object = !field_origins.is_empty()
                    && field_origins.is_subset(&interface_object_origins);
                if !via_interface_object {
                    self.interface_member_declarations.insert(coordinate);
                }
            }
        }

        if controlled {
            self.interfaces_to_check.insert(interface.name.clone());
        }
    }

    fn visit_object(&mut self, object: &TypeDefinition, table: &MarkerTable) {
        let mut controlled = self.record(object.coordinate(), &object.markers, table);

        for field in &object.fields {
            let coordinate = object.field_coordinate(field);
            self.record_dependencies(&coordinate, field);
            controlled |= self.record(coordinate, &field.markers, table);
        }

        if controlled {
            self.interfaces_to_check.extend(object.implements.iter().cloned());
        }
    }

    fn record(
        &mut self,
        coordinate: Coordinate,
        markers: &[AppliedMarker],
        table: &MarkerTable,
    ) -> bool {
        match extract(markers, table) {
            Some(requirement) => {
                self.requirements.insert(coordinate, requirement);
                true
            }
            None => false,
        }
    }

    fn record_dependencies(&mut self, coordinate: &Coordinate, field: &FieldDefinition) {
        if field.has_field_dependency() {
            self.fields_with_field_dependency.insert(coordinate.clone());
        }
        if field.has_context_forwarding() {
            self.fields_with_context_forwarding.insert(coordinate.clone());
        }
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&AccessRequirement> {
        self.requirements.get(coordinate)
    }

    pub fn type_requirement(&self, type_name: &str) -> Option<&AccessRequirement> {
        self.requirements.get(&Coordinate::of_type(type_name))
    }

    pub fn field_requirement(&self, type_name: &str, field: &str) -> Option<&AccessRequirement> {
        self.requirements.get(&Coordinate::of_field(type_name, field))
    }

    /// Entries in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &AccessRequirement)> {
        self.requirements.iter()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn interfaces_to_check(&self) -> &BTreeSet<String> {
        &self.interfaces_to_check
    }

    pub fn fields_with_field_dependency(&self) -> &BTreeSet<Coordinate> {
        &self.fields_with_field_dependency
    }

    pub fn fields_with_context_forwarding(&self) -> &BTreeSet<Coordinate> {
        &self.fields_with_context_forwarding
    }

    pub fn interface_member_declarations(&self) -> &BTreeSet<Coordinate> {
        &self.interface_member_declarations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ContextArgument, FieldContribution, TypeOrigin};

    fn authed_field(name: &str) -> FieldDefinition {
        FieldDefinition::new(name, "String").with_marker(AppliedMarker::bare("authenticated"))
    }

    fn build(types: Vec<TypeDefinition>) -> RequirementRegistry {
        let graph = SchemaGraph::new(types).unwrap();
        RequirementRegistry::build(&graph, &MarkerTable::canonical())
    }

    #[test]
    fn graph_without_markers_yields_empty_registry() {
        let registry = build(vec![
            TypeDefinition::interface("Node").with_field(FieldDefinition::new("id", "ID")),
            TypeDefinition::object("User")
                .implementing("Node")
                .with_field(FieldDefinition::new("id", "ID")),
        ]);

        assert!(registry.is_empty());
        assert!(registry.interfaces_to_check().is_empty());
        assert!(registry.fields_with_field_dependency().is_empty());
        assert!(registry.fields_with_context_forwarding().is_empty());
        assert!(registry.interface_member_declarations().is_empty());
    }

    #[test]
    fn stores_type_and_field_requirements() {
        let registry = build(vec![
            TypeDefinition::object("User")
                .with_marker(AppliedMarker::with_values("policy", [vec!["owner"]]))
                .with_field(authed_field("email"))
                .with_field(FieldDefinition::new("name", "String")),
        ]);

        assert_eq!(registry.len(), 2);
        assert!(registry.type_requirement("User").is_some());
        assert_eq!(
            registry.field_requirement("User", "email"),
            Some(&AccessRequirement::authenticated())
        );
        assert!(registry.field_requirement("User", "name").is_none());
    }

    #[test]
    fn controlled_object_marks_its_interfaces() {
        let registry = build(vec![
            TypeDefinition::interface("Node").with_field(FieldDefinition::new("id", "ID")),
            TypeDefinition::interface("Named"),
            TypeDefinition::object("User")
                .implementing("Node")
                .implementing("Named")
                .with_field(authed_field("email")),
            TypeDefinition::interface("Plain"),
            TypeDefinition::object("Tag").implementing("Plain"),
        ]);

        let interfaces: Vec<_> = registry.interfaces_to_check().iter().cloned().collect();
        assert_eq!(interfaces, vec!["Named".to_string(), "Node".to_string()]);
    }

    #[test]
    fn controlled_interface_member_is_declared() {
        let registry = build(vec![
            TypeDefinition::interface("Node")
                .with_origin(TypeOrigin::new("accounts"))
                .with_field(authed_field("secret")),
        ]);

        assert!(registry.interfaces_to_check().contains("Node"));
        assert!(
            registry
                .interface_member_declarations()
                .contains(&Coordinate::of_field("Node", "secret"))
        );
    }

    #[test]
    fn interface_object_fields_are_exempt_from_declaration_notice() {
        let registry = build(vec![
            TypeDefinition::interface("Media")
                .with_origin(TypeOrigin::new("catalog"))
                .with_origin(TypeOrigin::interface_object("reviews"))
                .with_field(
                    authed_field("rating")
                        .with_contribution(FieldContribution::new("reviews")),
                )
                .with_field(
                    authed_field("title").with_contribution(FieldContribution::new("catalog")),
                ),
        ]);

        let declared = registry.interface_member_declarations();
        assert!(!declared.contains(&Coordinate::of_field("Media", "rating")));
        assert!(declared.contains(&Coordinate::of_field("Media", "title")));
        // Exempt fields still land in the registry.
        assert!(registry.field_requirement("Media", "rating").is_some());
    }

    #[test]
    fn interface_owned_only_through_interface_objects_is_exempt() {
        let registry = build(vec![
            TypeDefinition::interface("Media")
                .with_origin(TypeOrigin::interface_object("reviews"))
                .with_marker(AppliedMarker::bare("authenticated")),
        ]);

        assert!(registry.interface_member_declarations().is_empty());
        assert!(registry.interfaces_to_check().contains("Media"));
    }

    #[test]
    fn collects_dependency_candidates() {
        let registry = build(vec![
            TypeDefinition::object("Order")
                .with_field(
                    FieldDefinition::new("shippingEstimate", "Int")
                        .with_contribution(FieldContribution::new("shipping").requiring("weight")),
                )
                .with_field(
                    FieldDefinition::new("discount", "Int").with_contribution(
                        FieldContribution::new("pricing").with_context_argument(ContextArgument {
                            name: "tier".to_string(),
                            context: "customer".to_string(),
                            selection: "{ tier }".to_string(),
                            source_types: vec!["Customer".to_string()],
                        }),
                    ),
                ),
        ]);

        assert_eq!(
            registry.fields_with_field_dependency().iter().collect::<Vec<_>>(),
            vec![&Coordinate::of_field("Order", "shippingEstimate")]
        );
        assert_eq!(
            registry.fields_with_context_forwarding().iter().collect::<Vec<_>>(),
            vec![&Coordinate::of_field("Order", "discount")]
        );
        // Candidates are recorded whether or not they carry markers.
        assert!(registry.is_empty());
    }
}
