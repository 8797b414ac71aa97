use authaudit_core::{AuditReport, Finding, RequirementRegistry};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReportBody {
    pub secure: bool,
    pub errors: usize,
    pub warnings: usize,
    pub findings: Vec<FindingBody>,
}

#[derive(Debug, Serialize)]
pub struct FindingBody {
    pub severity: &'static str,
    pub kind: &'static str,
    pub coordinates: Vec<String>,
    pub message: String,
}

impl From<&Finding> for FindingBody {
    fn from(finding: &Finding) -> Self {
        Self {
            severity: finding.severity.as_str(),
            kind: finding.kind.as_str(),
            coordinates: finding.coordinates.iter().map(ToString::to_string).collect(),
            message: finding.message.clone(),
        }
    }
}

impl From<&AuditReport> for ReportBody {
    fn from(report: &AuditReport) -> Self {
        Self {
            secure: report.is_secure(),
            errors: report.error_count(),
            warnings: report.warning_count(),
            findings: report.findings.iter().map(FindingBody::from).collect(),
        }
    }
}

pub fn render_text(report: &AuditReport) -> String {
    let mut out = String::new();
    for finding in &report.findings {
        out.push_str(&finding.to_string());
        out.push('\n');
    }
    out.push_str(&format!(
        "{} error(s), {} warning(s): {}\n",
        report.error_count(),
        report.warning_count(),
        if report.is_secure() { "secure" } else { "insecure" }
    ));
    out
}

pub fn render_json(report: &AuditReport) -> Result<String, serde_json::Error> {
    let mut body = serde_json::to_string_pretty(&ReportBody::from(report))?;
    body.push('\n');
    Ok(body)
}

pub fn render_requirements(registry: &RequirementRegistry) -> String {
    let mut out = String::new();
    for (coordinate, requirement) in registry.iter() {
        out.push_str(&format!("{coordinate}: {requirement}\n"));
    }

    let interfaces = registry
        .interfaces_to_check()
        .iter()
        .cloned()
        .collect::<Vec<_>>();
    out.push_str(&format!("interfaces to check: {}\n", list_or_none(&interfaces)));

    let dependencies = registry
        .fields_with_field_dependency()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    out.push_str(&format!("field dependencies: {}\n", list_or_none(&dependencies)));

    let forwarding = registry
        .fields_with_context_forwarding()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    out.push_str(&format!("context forwarding: {}\n", list_or_none(&forwarding)));

    out
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
