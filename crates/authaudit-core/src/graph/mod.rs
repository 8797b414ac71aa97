pub mod types;

use std::collections::HashSet;

pub use types::{
    AppliedMarker, ContextArgument, Coordinate, FieldContribution, FieldDefinition,
    TypeDefinition, TypeKind, TypeOrigin,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate type: {0}")]
    DuplicateType(String),
    #[error("duplicate field '{field}' in type '{type_name}'")]
    DuplicateField { type_name: String, field: String },
    #[error("type '{type_name}' implements unknown type '{interface}'")]
    UnknownInterface { type_name: String, interface: String },
    #[error("type '{type_name}' implements '{interface}', which is not an interface")]
    NotAnInterface { type_name: String, interface: String },
}

/// Immutable snapshot of a composed schema graph, restricted to the composite
/// types that can carry access-control markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaGraph {
    types: Vec<TypeDefinition>,
}

impl SchemaGraph {
    pub fn new(types: Vec<TypeDefinition>) -> Result<Self, GraphError> {
        let mut seen_types = HashSet::new();
        for type_def in &types {
            if !seen_types.insert(type_def.name.as_str()) {
                return Err(GraphError::DuplicateType(type_def.name.clone()));
            }
            let mut seen_fields = HashSet::new();
            for field in &type_def.fields {
                if !seen_fields.insert(field.name.as_str()) {
                    return Err(GraphError::DuplicateField {
                        type_name: type_def.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        let graph = Self { types };
        for type_def in &graph.types {
            for interface in &type_def.implements {
                match graph.get_type(interface) {
                    None => {
                        return Err(GraphError::UnknownInterface {
                            type_name: type_def.name.clone(),
                            interface: interface.clone(),
                        });
                    }
                    Some(target) if !target.is_interface() => {
                        return Err(GraphError::NotAnInterface {
                            type_name: type_def.name.clone(),
                            interface: interface.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(graph)
    }

    pub fn types(&self) -> &[TypeDefinition] {
        &self.types
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter().filter(|t| t.kind == TypeKind::Interface)
    }

    pub fn objects(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter().filter(|t| t.kind == TypeKind::Object)
    }

    /// Object types that may be returned at runtime for `interface`.
    pub fn possible_types(&self, interface: &str) -> Vec<&TypeDefinition> {
        self.objects()
            .filter(|t| t.implements.iter().any(|i| i == interface))
            .collect()
    }
}
