use crate::marker::MarkerTable;
use crate::report::{Finding, FindingKind, Findings};

/// Flags markers resolved under a name other than their canonical one.
/// Returns `false` only when a renamed marker is reported as an error.
pub fn check_renamed_markers(
    table: &MarkerTable,
    fail_on_rename: bool,
    findings: &mut Findings,
) -> bool {
    let mut secure = true;

    for handle in table.handles().filter(|h| h.is_renamed()) {
        let message = format!(
            "Marker @{} is a renamed {}; verify it is the access-control marker before trusting this audit",
            handle.name, handle.kind
        );
        if fail_on_rename {
            secure = false;
            findings.push(Finding::error(FindingKind::RenamedMarker, Vec::new(), message));
        } else {
            findings.push(Finding::warning(FindingKind::RenamedMarker, Vec::new(), message));
        }
    }

    secure
}
