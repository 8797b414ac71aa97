use std::io::Write;
use std::path::Path;

use authaudit_core::{AuditPolicy, AuditReport, Auditor, RequirementRegistry};

use crate::cli::Command;
use crate::config::{AppConfig, OutputFormat};
use crate::error::CliError;
use crate::render;
use crate::snapshot::load_snapshot;
use crate::validator::SelectionValidator;

/// Runs one subcommand and writes its output. Returns whether the graph is
/// secure; listing requirements always succeeds.
pub fn run_command(
    command: Command,
    config: &AppConfig,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    match command {
        Command::Check {
            graph,
            format,
            lenient_interfaces,
        } => {
            let mut policy = config.to_audit_policy();
            if lenient_interfaces {
                policy.flag_silent_interface_agreement = false;
            }
            let format = format.unwrap_or(config.output.format);
            let report = audit_file(&graph, policy)?;

            let rendered = match format {
                OutputFormat::Text => render::render_text(&report),
                OutputFormat::Json => render::render_json(&report)?,
            };
            out.write_all(rendered.as_bytes())?;
            Ok(report.is_secure())
        }
        Command::Requirements { graph } => {
            let registry = requirements_of_file(&graph)?;
            out.write_all(render::render_requirements(&registry).as_bytes())?;
            Ok(true)
        }
    }
}

pub fn audit_file(path: &Path, policy: AuditPolicy) -> Result<AuditReport, CliError> {
    let loaded = load_snapshot(path)?;
    let validator = SelectionValidator::new(&loaded.graph, &loaded.markers);
    let report = Auditor::new(&loaded.graph, &loaded.markers, &validator, policy).run();

    tracing::debug!(path = %path.display(), findings = report.findings.len(), "graph audited");
    Ok(report)
}

pub fn requirements_of_file(path: &Path) -> Result<RequirementRegistry, CliError> {
    let loaded = load_snapshot(path)?;
    Ok(RequirementRegistry::build(&loaded.graph, &loaded.markers))
}
