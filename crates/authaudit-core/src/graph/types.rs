use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub type_name: String,
    pub field_name: Option<String>,
}

impl Coordinate {
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: None,
        }
    }

    pub fn of_field(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: Some(field_name.into()),
        }
    }

    pub fn is_field(&self) -> bool {
        self.field_name.is_some()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        if let Some(ref field) = self.field_name {
            write!(f, ".{field}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Interface,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMarker {
    pub name: String,
    pub values: Vec<Vec<String>>,
}

impl AppliedMarker {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_values<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|alt| alt.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

/// Composition-provenance record of a type: one per contributing origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOrigin {
    pub origin: String,
    /// The origin declares this interface as an object standing in for it.
    pub interface_object: bool,
}

impl TypeOrigin {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            interface_object: false,
        }
    }

    pub fn interface_object(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            interface_object: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextArgument {
    pub name: String,
    pub context: String,
    pub selection: String,
    pub source_types: Vec<String>,
}

/// One origin-level contribution record of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContribution {
    pub origin: String,
    pub external: bool,
    pub requires: Option<String>,
    pub context_arguments: Vec<ContextArgument>,
}

impl FieldContribution {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            external: false,
            requires: None,
            context_arguments: Vec::new(),
        }
    }

    pub fn requiring(mut self, field_set: impl Into<String>) -> Self {
        self.requires = Some(field_set.into());
        self
    }

    pub fn with_context_argument(mut self, argument: ContextArgument) -> Self {
        self.context_arguments.push(argument);
        self
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub type_name: String,
    pub markers: Vec<AppliedMarker>,
    pub contributions: Vec<FieldContribution>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            markers: Vec::new(),
            contributions: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: AppliedMarker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_contribution(mut self, contribution: FieldContribution) -> Self {
        self.contributions.push(contribution);
        self
    }

    pub fn has_field_dependency(&self) -> bool {
        self.contributions.iter().any(|c| c.requires.is_some())
    }

    pub fn has_context_forwarding(&self) -> bool {
        self.contributions
            .iter()
            .any(|c| !c.context_arguments.is_empty())
    }

    /// Distinct origins resolving this field. Falls back to the owning type's
    /// origins when the field carries no contribution records.
    pub fn origin_set<'a>(&'a self, owner: &'a TypeDefinition) -> BTreeSet<&'a str> {
        if self.contributions.is_empty() {
            return owner.origin_set();
        }
        self.contributions
            .iter()
            .filter(|c| !c.external)
            .map(|c| c.origin.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub implements: Vec<String>,
    pub origins: Vec<TypeOrigin>,
    pub markers: Vec<AppliedMarker>,
    pub fields: Vec<FieldDefinition>,
}

impl TypeDefinition {
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Object)
    }

    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            implements: Vec::new(),
            origins: Vec::new(),
            markers: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    pub fn with_origin(mut self, origin: TypeOrigin) -> Self {
        self.origins.push(origin);
        self
    }

    pub fn with_marker(mut self, marker: AppliedMarker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn origin_set(&self) -> BTreeSet<&str> {
        self.origins.iter().map(|o| o.origin.as_str()).collect()
    }

    pub fn interface_object_origins(&self) -> BTreeSet<&str> {
        self.origins
            .iter()
            .filter(|o| o.interface_object)
            .map(|o| o.origin.as_str())
            .collect()
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::of_type(&self.name)
    }

    pub fn field_coordinate(&self, field: &FieldDefinition) -> Coordinate {
        Coordinate::of_field(&self.name, &field.name)
    }
}
