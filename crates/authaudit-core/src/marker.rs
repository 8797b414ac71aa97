use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerKind {
    Authentication,
    Scopes,
    Policy,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 3] = [
        MarkerKind::Authentication,
        MarkerKind::Scopes,
        MarkerKind::Policy,
    ];

    pub fn canonical_name(self) -> &'static str {
        match self {
            MarkerKind::Authentication => "authenticated",
            MarkerKind::Scopes => "requiresScopes",
            MarkerKind::Policy => "policy",
        }
    }

    /// Name of the list-of-lists argument carried by the marker, if any.
    pub fn argument_name(self) -> Option<&'static str> {
        match self {
            MarkerKind::Authentication => None,
            MarkerKind::Scopes => Some("scopes"),
            MarkerKind::Policy => Some("policies"),
        }
    }

    fn index(self) -> usize {
        match self {
            MarkerKind::Authentication => 0,
            MarkerKind::Scopes => 1,
            MarkerKind::Policy => 2,
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.canonical_name())
    }
}

/// A marker definition resolved in the graph: the name under which it is
/// applied, which may differ from the canonical one when it was imported
/// under an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHandle {
    pub kind: MarkerKind,
    pub name: String,
}

impl MarkerHandle {
    pub fn new(kind: MarkerKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn is_renamed(&self) -> bool {
        self.name != self.kind.canonical_name()
    }
}

/// Capability-indexed lookup from marker kind to its resolved handle. A kind
/// without a handle is not used by the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerTable {
    handles: [Option<MarkerHandle>; 3],
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every kind resolved under its canonical name.
    pub fn canonical() -> Self {
        let mut table = Self::new();
        for kind in MarkerKind::ALL {
            table.insert(MarkerHandle::new(kind, kind.canonical_name()));
        }
        table
    }

    pub fn with(mut self, kind: MarkerKind, name: impl Into<String>) -> Self {
        self.insert(MarkerHandle::new(kind, name));
        self
    }

    pub fn insert(&mut self, handle: MarkerHandle) {
        let index = handle.kind.index();
        self.handles[index] = Some(handle);
    }

    pub fn get(&self, kind: MarkerKind) -> Option<&MarkerHandle> {
        self.handles[kind.index()].as_ref()
    }

    pub fn handles(&self) -> impl Iterator<Item = &MarkerHandle> {
        self.handles.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.iter().all(Option::is_none)
    }
}
