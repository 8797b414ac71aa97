use std::fmt;

use crate::graph::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    RenamedMarker,
    InterfaceMemberDeclaration,
    InterfaceTypeMismatch,
    InterfaceFieldMismatch,
    MultiOriginType,
    MultiOriginField,
    FieldDependency,
    ContextForwarding,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::RenamedMarker => "renamed_marker",
            FindingKind::InterfaceMemberDeclaration => "interface_member_declaration",
            FindingKind::InterfaceTypeMismatch => "interface_type_mismatch",
            FindingKind::InterfaceFieldMismatch => "interface_field_mismatch",
            FindingKind::MultiOriginType => "multi_origin_type",
            FindingKind::MultiOriginField => "multi_origin_field",
            FindingKind::FieldDependency => "field_dependency",
            FindingKind::ContextForwarding => "context_forwarding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub coordinates: Vec<Coordinate>,
    pub message: String,
}

impl Finding {
    pub fn warning(kind: FindingKind, coordinates: Vec<Coordinate>, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            coordinates,
            message,
        }
    }

    pub fn error(kind: FindingKind, coordinates: Vec<Coordinate>, message: String) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            coordinates,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn mentions(&self, coordinate: &Coordinate) -> bool {
        self.coordinates.contains(coordinate)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Findings accumulated by the stages of one audit, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        tracing::debug!(
            severity = %finding.severity,
            kind = finding.kind.as_str(),
            message = %finding.message,
            "finding recorded"
        );
        self.items.push(finding);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.items.iter()
    }

    pub fn into_report(self) -> AuditReport {
        AuditReport {
            findings: self.items,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub findings: Vec<Finding>,
}

impl AuditReport {
    pub fn is_secure(&self) -> bool {
        !self.findings.iter().any(Finding::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn of_kind(&self, kind: FindingKind) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.kind == kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_display_prefixes_severity() {
        let finding = Finding::error(
            FindingKind::InterfaceFieldMismatch,
            vec![Coordinate::of_field("I", "secret")],
            "mismatch".to_string(),
        );

        assert_eq!(finding.to_string(), "ERROR: mismatch");
        assert!(finding.mentions(&Coordinate::of_field("I", "secret")));
    }

    #[test]
    fn report_with_only_warnings_is_secure() {
        let mut findings = Findings::new();
        findings.push(Finding::warning(
            FindingKind::MultiOriginType,
            vec![Coordinate::of_type("T")],
            "shared".to_string(),
        ));
        let report = findings.into_report();

        assert!(report.is_secure());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn any_error_makes_report_insecure() {
        let mut findings = Findings::new();
        findings.push(Finding::warning(
            FindingKind::RenamedMarker,
            vec![],
            "renamed".to_string(),
        ));
        findings.push(Finding::error(
            FindingKind::FieldDependency,
            vec![Coordinate::of_field("T", "f")],
            "leak".to_string(),
        ));
        let report = findings.into_report();

        assert!(!report.is_secure());
        assert_eq!(report.of_kind(FindingKind::FieldDependency).len(), 1);
    }

    #[test]
    fn empty_report_is_secure() {
        assert!(AuditReport::default().is_secure());
    }
}
