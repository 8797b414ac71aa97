use crate::check::{
    PolymorphismChecker, RequirementValidator, TransitiveExposureDetector, check_renamed_markers,
    detect_multi_origin,
};
use crate::graph::SchemaGraph;
use crate::marker::MarkerTable;
use crate::registry::RequirementRegistry;
use crate::report::{AuditReport, Findings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditPolicy {
    /// Report an interface that declares nothing while its implementations
    /// all agree on a requirement.
    pub flag_silent_interface_agreement: bool,
    /// Report renamed markers as errors rather than warnings.
    pub fail_on_renamed_markers: bool,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            flag_silent_interface_agreement: true,
            fail_on_renamed_markers: false,
        }
    }
}

/// One audit run over an immutable graph snapshot.
pub struct Auditor<'a, V: RequirementValidator> {
    graph: &'a SchemaGraph,
    table: &'a MarkerTable,
    validator: &'a V,
    policy: AuditPolicy,
    registry: RequirementRegistry,
}

impl<'a, V: RequirementValidator> Auditor<'a, V> {
    pub fn new(
        graph: &'a SchemaGraph,
        table: &'a MarkerTable,
        validator: &'a V,
        policy: AuditPolicy,
    ) -> Self {
        let registry = RequirementRegistry::build(graph, table);
        Self {
            graph,
            table,
            validator,
            policy,
            registry,
        }
    }

    pub fn registry(&self) -> &RequirementRegistry {
        &self.registry
    }

    /// Runs every stage, in order, without stopping at the first failure.
    pub fn run(&self) -> AuditReport {
        let mut findings = Findings::new();

        let markers_secure = check_renamed_markers(
            self.table,
            self.policy.fail_on_renamed_markers,
            &mut findings,
        );
        tracing::debug!(secure = markers_secure, "renamed-marker check finished");

        let polymorphism_secure = PolymorphismChecker::new(
            self.graph,
            &self.registry,
            self.policy.flag_silent_interface_agreement,
        )
        .check_all(&mut findings);
        tracing::debug!(
            secure = polymorphism_secure,
            interfaces = self.registry.interfaces_to_check().len(),
            "polymorphism checks finished"
        );

        let origins_secure = detect_multi_origin(self.graph, &self.registry, &mut findings);

        let transitive_secure =
            TransitiveExposureDetector::new(&self.registry, self.validator).run(&mut findings);
        tracing::debug!(secure = transitive_secure, "transitive exposure checks finished");

        let secure = markers_secure && polymorphism_secure && origins_secure && transitive_secure;
        let report = findings.into_report();
        debug_assert_eq!(secure, report.is_secure());

        tracing::info!(
            secure,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "audit finished"
        );

        report
    }
}
