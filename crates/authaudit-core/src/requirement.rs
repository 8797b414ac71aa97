use std::collections::BTreeSet;
use std::fmt;

use crate::graph::AppliedMarker;
use crate::marker::{MarkerKind, MarkerTable};

/// Access-control requirement declared on a type or field.
///
/// `scopes` and `policies` are disjunctions of conjunctions: each inner set
/// must be held in full, and holding any one inner set is enough. They are
/// kept in declaration order; equality goes through [`Fingerprint`], so
/// declaration order and repeated alternatives never matter.
///
/// A requirement with every facet unset is not representable: constructors
/// return `None` instead, so "no requirement" is always absence.
#[derive(Debug, Clone)]
pub struct AccessRequirement {
    requires_authentication: bool,
    scopes: Vec<BTreeSet<String>>,
    policies: Vec<BTreeSet<String>>,
}

/// Canonical, order-insensitive form of an [`AccessRequirement`].
///
/// Alternatives are collected into sets on purpose: a repeated alternative
/// adds no way of satisfying the requirement, so `[["a"], ["a"]]` and
/// `[["a"]]` share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    pub requires_authentication: bool,
    pub scopes: BTreeSet<BTreeSet<String>>,
    pub policies: BTreeSet<BTreeSet<String>>,
}

impl AccessRequirement {
    pub fn new(
        requires_authentication: bool,
        scopes: Vec<BTreeSet<String>>,
        policies: Vec<BTreeSet<String>>,
    ) -> Option<Self> {
        if !requires_authentication && scopes.is_empty() && policies.is_empty() {
            return None;
        }
        Some(Self {
            requires_authentication,
            scopes,
            policies,
        })
    }

    pub fn authenticated() -> Self {
        Self {
            requires_authentication: true,
            scopes: Vec::new(),
            policies: Vec::new(),
        }
    }

    pub fn scopes<I, A, S>(alternatives: I) -> Option<Self>
    where
        I: IntoIterator<Item = A>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(false, to_sets(alternatives), Vec::new())
    }

    pub fn policies<I, A, S>(alternatives: I) -> Option<Self>
    where
        I: IntoIterator<Item = A>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(false, Vec::new(), to_sets(alternatives))
    }

    pub fn requires_authentication(&self) -> bool {
        self.requires_authentication
    }

    pub fn scope_sets(&self) -> &[BTreeSet<String>] {
        &self.scopes
    }

    pub fn policy_sets(&self) -> &[BTreeSet<String>] {
        &self.policies
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            requires_authentication: self.requires_authentication,
            scopes: self.scopes.iter().cloned().collect(),
            policies: self.policies.iter().cloned().collect(),
        }
    }

    pub fn is_equivalent(&self, other: &AccessRequirement) -> bool {
        self.fingerprint() == other.fingerprint()
    }

    /// Requirement satisfied exactly when both `self` and `other` are.
    pub fn and(&self, other: &AccessRequirement) -> AccessRequirement {
        AccessRequirement {
            requires_authentication: self.requires_authentication
                || other.requires_authentication,
            scopes: conjoin(&self.scopes, &other.scopes),
            policies: conjoin(&self.policies, &other.policies),
        }
    }

    /// Whether every request satisfying `self` also satisfies `other`.
    ///
    /// Scope requirements can only be met by an authenticated caller, so they
    /// imply authentication on their own.
    pub fn implies(&self, other: &AccessRequirement) -> bool {
        if other.requires_authentication
            && !self.requires_authentication
            && self.scopes.is_empty()
        {
            return false;
        }
        covers(&self.scopes, &other.scopes) && covers(&self.policies, &other.policies)
    }
}

impl PartialEq for AccessRequirement {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}

impl Eq for AccessRequirement {}

impl fmt::Display for AccessRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fingerprint = self.fingerprint();
        let mut parts = Vec::new();
        if fingerprint.requires_authentication {
            parts.push(MarkerKind::Authentication.to_string());
        }
        for (kind, sets) in [
            (MarkerKind::Scopes, &fingerprint.scopes),
            (MarkerKind::Policy, &fingerprint.policies),
        ] {
            if sets.is_empty() {
                continue;
            }
            let argument = kind.argument_name().unwrap_or_default();
            parts.push(format!("{kind}({argument}: {})", render_sets(sets)));
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// Renders an optional requirement for messages.
pub fn describe(requirement: Option<&AccessRequirement>) -> String {
    match requirement {
        Some(requirement) => requirement.to_string(),
        None => "no access control".to_string(),
    }
}

/// Reads the access-control markers applied to one type or field.
///
/// Only the first application of each marker is considered; repeated
/// applications are invalid upstream and are ignored here.
pub fn extract(markers: &[AppliedMarker], table: &MarkerTable) -> Option<AccessRequirement> {
    let mut requires_authentication = false;
    let mut scopes = Vec::new();
    let mut policies = Vec::new();

    for kind in MarkerKind::ALL {
        let Some(handle) = table.get(kind) else {
            continue;
        };
        let mut applications = markers.iter().filter(|m| m.name == handle.name);
        let Some(first) = applications.next() else {
            continue;
        };
        let ignored = applications.count();
        if ignored > 0 {
            tracing::debug!(
                marker = %handle.name,
                ignored,
                "ignoring repeated marker applications"
            );
        }

        match kind {
            MarkerKind::Authentication => requires_authentication = true,
            MarkerKind::Scopes => scopes = to_sets(first.values.iter().cloned()),
            MarkerKind::Policy => policies = to_sets(first.values.iter().cloned()),
        }
    }

    AccessRequirement::new(requires_authentication, scopes, policies)
}

fn to_sets<I, A, S>(alternatives: I) -> Vec<BTreeSet<String>>
where
    I: IntoIterator<Item = A>,
    A: IntoIterator<Item = S>,
    S: Into<String>,
{
    alternatives
        .into_iter()
        .map(|alt| alt.into_iter().map(Into::into).collect())
        .collect()
}

fn conjoin(left: &[BTreeSet<String>], right: &[BTreeSet<String>]) -> Vec<BTreeSet<String>> {
    if left.is_empty() {
        return right.to_vec();
    }
    if right.is_empty() {
        return left.to_vec();
    }
    let mut product = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            product.push(l.union(r).cloned().collect());
        }
    }
    product
}

// Every alternative of the stronger side must contain some alternative of the
// weaker side.
fn covers(stronger: &[BTreeSet<String>], weaker: &[BTreeSet<String>]) -> bool {
    if weaker.is_empty() {
        return true;
    }
    if stronger.is_empty() {
        return false;
    }
    stronger
        .iter()
        .all(|held| weaker.iter().any(|needed| needed.is_subset(held)))
}

fn render_sets(sets: &BTreeSet<BTreeSet<String>>) -> String {
    let inner = sets
        .iter()
        .map(|set| {
            let names = set
                .iter()
                .map(|name| format!("\"{name}\""))
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{names}]")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(alternatives: &[&[&str]]) -> AccessRequirement {
        AccessRequirement::scopes(alternatives.iter().map(|alt| alt.iter().copied())).unwrap()
    }

    #[test]
    fn reordered_alternatives_are_equivalent() {
        let left = scopes(&[&["a", "b"], &["c"]]);
        let right = scopes(&[&["c"], &["b", "a"]]);

        assert_eq!(left, right);
        assert_eq!(left.fingerprint(), right.fingerprint());
    }

    #[test]
    fn repeated_alternatives_are_equivalent() {
        assert_eq!(scopes(&[&["a"], &["a"]]), scopes(&[&["a"]]));
    }

    #[test]
    fn scopes_and_policies_are_separate_namespaces() {
        let by_scope = scopes(&[&["admin"]]);
        let by_policy = AccessRequirement::policies([["admin"]]).unwrap();

        assert_ne!(by_scope, by_policy);
    }

    #[test]
    fn authentication_flag_distinguishes_requirements() {
        let plain = scopes(&[&["read"]]);
        let authed = AccessRequirement::new(true, plain.scope_sets().to_vec(), Vec::new()).unwrap();

        assert_ne!(plain, authed);
    }

    #[test]
    fn empty_requirement_is_absent() {
        assert!(AccessRequirement::new(false, Vec::new(), Vec::new()).is_none());
        assert!(AccessRequirement::scopes(Vec::<Vec<String>>::new()).is_none());
    }

    #[test]
    fn extract_without_markers_is_absent() {
        assert!(extract(&[], &MarkerTable::canonical()).is_none());
    }

    #[test]
    fn extract_never_yields_zero_requirement() {
        let markers = vec![
            AppliedMarker::with_values("requiresScopes", Vec::<Vec<String>>::new()),
            AppliedMarker::with_values("policy", Vec::<Vec<String>>::new()),
        ];

        assert!(extract(&markers, &MarkerTable::canonical()).is_none());
    }

    #[test]
    fn extract_reads_all_three_markers() {
        let markers = vec![
            AppliedMarker::bare("authenticated"),
            AppliedMarker::with_values("requiresScopes", [vec!["read:user"]]),
            AppliedMarker::with_values("policy", [vec!["is_owner", "is_active"]]),
        ];

        let requirement = extract(&markers, &MarkerTable::canonical()).unwrap();

        assert!(requirement.requires_authentication());
        assert_eq!(requirement.scope_sets().len(), 1);
        assert_eq!(requirement.policy_sets()[0].len(), 2);
    }

    #[test]
    fn extract_ignores_markers_not_in_table() {
        let markers = vec![AppliedMarker::bare("authenticated")];
        let table = MarkerTable::new().with(MarkerKind::Scopes, "requiresScopes");

        assert!(extract(&markers, &table).is_none());
    }

    #[test]
    fn extract_follows_renamed_handles() {
        let markers = vec![AppliedMarker::bare("auth")];
        let table = MarkerTable::new().with(MarkerKind::Authentication, "auth");

        assert_eq!(
            extract(&markers, &table),
            Some(AccessRequirement::authenticated())
        );
    }

    #[test]
    fn extract_takes_first_repeated_application() {
        let markers = vec![
            AppliedMarker::with_values("requiresScopes", [vec!["first"]]),
            AppliedMarker::with_values("requiresScopes", [vec!["second"]]),
        ];

        let requirement = extract(&markers, &MarkerTable::canonical()).unwrap();

        assert_eq!(requirement, scopes(&[&["first"]]));
    }

    #[test]
    fn display_is_canonical() {
        let requirement = AccessRequirement::new(
            true,
            vec![
                ["c"].into_iter().map(String::from).collect(),
                ["b", "a"].into_iter().map(String::from).collect(),
            ],
            Vec::new(),
        )
        .unwrap();

        assert_eq!(
            requirement.to_string(),
            r#"@authenticated @requiresScopes(scopes: [["a", "b"], ["c"]])"#
        );
        assert_eq!(describe(None), "no access control");
    }

    #[test]
    fn conjunction_multiplies_alternatives() {
        let left = scopes(&[&["a"], &["b"]]);
        let right = scopes(&[&["c"]]);

        assert_eq!(left.and(&right), scopes(&[&["a", "c"], &["b", "c"]]));
        assert_eq!(
            AccessRequirement::authenticated().and(&right),
            AccessRequirement::new(true, right.scope_sets().to_vec(), Vec::new()).unwrap()
        );
    }

    #[test]
    fn stronger_scopes_imply_weaker() {
        let strong = scopes(&[&["read", "admin"]]);
        let weak = scopes(&[&["read"]]);

        assert!(strong.implies(&weak));
        assert!(!weak.implies(&strong));
    }

    #[test]
    fn every_alternative_must_cover() {
        let either = scopes(&[&["read"], &["guest"]]);
        let read = scopes(&[&["read"]]);

        assert!(!either.implies(&read));
        assert!(read.implies(&either));
    }

    #[test]
    fn scopes_imply_authentication() {
        assert!(scopes(&[&["read"]]).implies(&AccessRequirement::authenticated()));
        assert!(
            !AccessRequirement::policies([["p"]])
                .unwrap()
                .implies(&AccessRequirement::authenticated())
        );
        assert!(!AccessRequirement::authenticated().implies(&scopes(&[&["read"]])));
    }
}
