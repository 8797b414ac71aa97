use crate::graph::{Coordinate, SchemaGraph, TypeDefinition};
use crate::registry::RequirementRegistry;
use crate::report::{Finding, FindingKind, Findings};
use crate::requirement::{AccessRequirement, describe};

/// Compares interface requirements with those of their implementing types.
pub struct PolymorphismChecker<'a> {
    graph: &'a SchemaGraph,
    registry: &'a RequirementRegistry,
    flag_silent_interface_agreement: bool,
}

impl<'a> PolymorphismChecker<'a> {
    pub fn new(
        graph: &'a SchemaGraph,
        registry: &'a RequirementRegistry,
        flag_silent_interface_agreement: bool,
    ) -> Self {
        Self {
            graph,
            registry,
            flag_silent_interface_agreement,
        }
    }

    /// Checks every interface the registry marked, plus the deprecation
    /// notices for access control declared on interface members.
    pub fn check_all(&self, findings: &mut Findings) -> bool {
        self.report_interface_member_declarations(findings);

        let mut secure = true;
        for interface in self.registry.interfaces_to_check() {
            secure &= self.check_interface(interface, findings);
        }
        secure
    }

    pub fn report_interface_member_declarations(&self, findings: &mut Findings) {
        for coordinate in self.registry.interface_member_declarations() {
            findings.push(Finding::warning(
                FindingKind::InterfaceMemberDeclaration,
                vec![coordinate.clone()],
                format!(
                    "{coordinate} declares access control on an interface member; declare it on each implementing type instead"
                ),
            ));
        }
    }

    pub fn check_interface(&self, name: &str, findings: &mut Findings) -> bool {
        let Some(interface) = self.graph.get_type(name).filter(|t| t.is_interface()) else {
            tracing::debug!(interface = name, "skipping unknown interface");
            return true;
        };
        let implementations = self.graph.possible_types(name);

        let type_secure = self.check_type_level(interface, &implementations, findings);
        let fields_secure = self.check_field_level(interface, &implementations, findings);

        tracing::debug!(
            interface = name,
            implementations = implementations.len(),
            secure = type_secure && fields_secure,
            "interface checked"
        );

        type_secure && fields_secure
    }

    fn check_type_level(
        &self,
        interface: &TypeDefinition,
        implementations: &[&TypeDefinition],
        findings: &mut Findings,
    ) -> bool {
        match self.registry.type_requirement(&interface.name) {
            Some(declared) => {
                let mut secure = true;
                for implementation in implementations {
                    let actual = self.registry.type_requirement(&implementation.name);
                    if actual != Some(declared) {
                        secure = false;
                        findings.push(Finding::error(
                            FindingKind::InterfaceTypeMismatch,
                            vec![interface.coordinate(), implementation.coordinate()],
                            format!(
                                "Interface {} requires {} but implementing type {} requires {}",
                                interface.name,
                                declared,
                                implementation.name,
                                describe(actual)
                            ),
                        ));
                    }
                }
                secure
            }
            None => self.check_silent_interface(interface, implementations, findings),
        }
    }

    fn check_silent_interface(
        &self,
        interface: &TypeDefinition,
        implementations: &[&TypeDefinition],
        findings: &mut Findings,
    ) -> bool {
        let declared: Vec<(&TypeDefinition, Option<&AccessRequirement>)> = implementations
            .iter()
            .map(|t| (*t, self.registry.type_requirement(&t.name)))
            .collect();

        let Some(first) = declared.iter().find_map(|(_, r)| *r) else {
            return true;
        };
        let agree = declared.iter().all(|(_, r)| *r == Some(first));
        if agree && !self.flag_silent_interface_agreement {
            return true;
        }

        let mut coordinates = vec![interface.coordinate()];
        coordinates.extend(declared.iter().map(|(t, _)| t.coordinate()));

        let message = if agree {
            format!(
                "Interface {name} declares no access control but every implementing type requires {first}; add the same requirement to {name}",
                name = interface.name
            )
        } else {
            let detail = declared
                .iter()
                .map(|(t, r)| format!("{} requires {}", t.name, describe(*r)))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Interface {} declares no access control but its implementing types disagree: {detail}",
                interface.name
            )
        };

        findings.push(Finding::error(
            FindingKind::InterfaceTypeMismatch,
            coordinates,
            message,
        ));
        false
    }

    fn check_field_level(
        &self,
        interface: &TypeDefinition,
        implementations: &[&TypeDefinition],
        findings: &mut Findings,
    ) -> bool {
        let mut secure = true;

        for field in &interface.fields {
            let declared = self.registry.field_requirement(&interface.name, &field.name);
            for implementation in implementations {
                // Implementations missing the field are a graph-construction
                // problem upstream.
                if implementation.get_field(&field.name).is_none() {
                    continue;
                }
                let actual = self
                    .registry
                    .field_requirement(&implementation.name, &field.name);
                if actual == declared {
                    continue;
                }

                secure = false;
                let interface_field = Coordinate::of_field(&interface.name, &field.name);
                let implementation_field = Coordinate::of_field(&implementation.name, &field.name);
                findings.push(Finding::error(
                    FindingKind::InterfaceFieldMismatch,
                    vec![interface_field.clone(), implementation_field.clone()],
                    format!(
                        "Field {interface_field} requires {} but {implementation_field} requires {}",
                        describe(declared),
                        describe(actual)
                    ),
                ));
            }
        }

        secure
    }
}
