use std::path::Path;

use authaudit_core::graph::{
    AppliedMarker, ContextArgument, FieldContribution, FieldDefinition, GraphError, SchemaGraph,
    TypeDefinition, TypeOrigin,
};
use authaudit_core::{MarkerKind, MarkerTable};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default = "MarkerNames::canonical")]
    pub markers: MarkerNames,
    #[serde(default)]
    pub types: Vec<TypeSnapshot>,
}

/// Names under which each access-control marker is applied in the graph.
/// A missing key means the canonical name; `null` means the graph does not
/// use that capability.
#[derive(Debug, Deserialize)]
pub struct MarkerNames {
    #[serde(default = "canonical_authentication")]
    pub authentication: Option<String>,
    #[serde(default = "canonical_scopes")]
    pub scopes: Option<String>,
    #[serde(default = "canonical_policy")]
    pub policy: Option<String>,
}

impl MarkerNames {
    fn canonical() -> Self {
        Self {
            authentication: canonical_authentication(),
            scopes: canonical_scopes(),
            policy: canonical_policy(),
        }
    }
}

fn canonical_authentication() -> Option<String> {
    Some(MarkerKind::Authentication.canonical_name().to_string())
}

fn canonical_scopes() -> Option<String> {
    Some(MarkerKind::Scopes.canonical_name().to_string())
}

fn canonical_policy() -> Option<String> {
    Some(MarkerKind::Policy.canonical_name().to_string())
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KindSnapshot {
    Interface,
    Object,
}

#[derive(Debug, Deserialize)]
pub struct TypeSnapshot {
    pub name: String,
    pub kind: KindSnapshot,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub origins: Vec<OriginSnapshot>,
    #[serde(default)]
    pub markers: Vec<MarkerSnapshot>,
    #[serde(default)]
    pub fields: Vec<FieldSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct OriginSnapshot {
    pub origin: String,
    #[serde(default)]
    pub interface_object: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkerSnapshot {
    pub name: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct FieldSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub markers: Vec<MarkerSnapshot>,
    #[serde(default)]
    pub contributions: Vec<ContributionSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct ContributionSnapshot {
    pub origin: String,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub requires: Option<String>,
    #[serde(default)]
    pub context_arguments: Vec<ContextArgumentSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct ContextArgumentSnapshot {
    pub name: String,
    pub context: String,
    pub selection: String,
    #[serde(default)]
    pub source_types: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read graph snapshot '{0}': {1}")]
    ReadFile(String, String),

    #[error("failed to parse graph snapshot: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("invalid schema graph: {0}")]
    Graph(#[from] GraphError),
}

/// A validated graph together with its resolved marker table.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub graph: SchemaGraph,
    pub markers: MarkerTable,
}

pub fn load_snapshot(path: &Path) -> Result<LoadedGraph, SnapshotError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SnapshotError::ReadFile(path.display().to_string(), e.to_string()))?;
    let loaded = parse_snapshot(&contents)?;
    tracing::debug!(
        path = %path.display(),
        types = loaded.graph.types().len(),
        markers = loaded.markers.handles().count(),
        "graph snapshot loaded"
    );
    Ok(loaded)
}

pub fn parse_snapshot(contents: &str) -> Result<LoadedGraph, SnapshotError> {
    let snapshot: GraphSnapshot = serde_json::from_str(contents)?;
    snapshot_to_domain(snapshot)
}

pub fn snapshot_to_domain(snapshot: GraphSnapshot) -> Result<LoadedGraph, SnapshotError> {
    let markers = marker_names_to_table(&snapshot.markers);
    let types = snapshot.types.into_iter().map(snapshot_type_to_domain).collect();
    let graph = SchemaGraph::new(types)?;
    Ok(LoadedGraph { graph, markers })
}

fn marker_names_to_table(names: &MarkerNames) -> MarkerTable {
    let mut table = MarkerTable::new();
    for (kind, name) in [
        (MarkerKind::Authentication, &names.authentication),
        (MarkerKind::Scopes, &names.scopes),
        (MarkerKind::Policy, &names.policy),
    ] {
        if let Some(name) = name {
            table = table.with(kind, name.trim_start_matches('@'));
        }
    }
    table
}

fn snapshot_type_to_domain(snapshot: TypeSnapshot) -> TypeDefinition {
    let mut type_def = match snapshot.kind {
        KindSnapshot::Interface => TypeDefinition::interface(snapshot.name),
        KindSnapshot::Object => TypeDefinition::object(snapshot.name),
    };
    type_def.implements = snapshot.implements;
    type_def.origins = snapshot
        .origins
        .into_iter()
        .map(|o| TypeOrigin {
            origin: o.origin,
            interface_object: o.interface_object,
        })
        .collect();
    type_def.markers = snapshot.markers.into_iter().map(snapshot_marker_to_domain).collect();
    type_def.fields = snapshot.fields.into_iter().map(snapshot_field_to_domain).collect();
    type_def
}

fn snapshot_marker_to_domain(snapshot: MarkerSnapshot) -> AppliedMarker {
    AppliedMarker {
        name: snapshot.name.trim_start_matches('@').to_string(),
        values: snapshot.values,
    }
}

/// Strips list and non-null wrappers: `[Item!]!` names `Item`.
fn named_type(type_ref: &str) -> &str {
    type_ref.trim_matches(|c: char| c == '[' || c == ']' || c == '!' || c.is_whitespace())
}

fn snapshot_field_to_domain(snapshot: FieldSnapshot) -> FieldDefinition {
    FieldDefinition {
        name: snapshot.name,
        type_name: named_type(&snapshot.type_name).to_string(),
        markers: snapshot.markers.into_iter().map(snapshot_marker_to_domain).collect(),
        contributions: snapshot
            .contributions
            .into_iter()
            .map(|c| FieldContribution {
                origin: c.origin,
                external: c.external,
                requires: c.requires,
                context_arguments: c
                    .context_arguments
                    .into_iter()
                    .map(|a| ContextArgument {
                        name: a.name,
                        context: a.context,
                        selection: a.selection,
                        source_types: a.source_types,
                    })
                    .collect(),
            })
            .collect(),
    }
}
