//! Payer transmission routes
//!
//! A route tells the transmission layer where an appeal for a payer is sent.
//! Names on denials rarely match the directory exactly ("Cigna Healthcare of
//! Texas" vs "Cigna"), so resolution is a case-insensitive containment match
//! against the route name and its aliases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fax used when no directory entry matches
pub const DEFAULT_FAX: &str = "1-800-555-0199";

/// Department used on fallback routes
pub const DEFAULT_DEPARTMENT: &str = "General Claims Review";

/// How a route was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteProvenance {
    /// Loaded from the payer directory
    Directory,
    /// Fallback route, no directory match
    Default,
    /// Repaired after a transmission failure
    Healed,
}

impl RouteProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteProvenance::Directory => "directory",
            RouteProvenance::Default => "default",
            RouteProvenance::Healed => "healed",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "healed" => RouteProvenance::Healed,
            "default" => RouteProvenance::Default,
            _ => RouteProvenance::Directory,
        }
    }
}

/// Transmission address for a payer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerRoute {
    pub payer: String,
    pub fax: String,
    pub department: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub provenance: RouteProvenance,
    pub updated_at: DateTime<Utc>,
}

impl PayerRoute {
    pub fn new(
        payer: impl Into<String>,
        fax: impl Into<String>,
        department: impl Into<String>,
        provenance: RouteProvenance,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            payer: payer.into(),
            fax: fax.into(),
            department: department.into(),
            aliases: Vec::new(),
            provenance,
            updated_at,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Fallback route for a payer with no directory entry
    pub fn fallback(payer: impl Into<String>, fax: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(payer, fax, DEFAULT_DEPARTMENT, RouteProvenance::Default, at)
    }

    /// True when `payer_name` contains this route's name or one of its aliases
    pub fn matches(&self, payer_name: &str) -> bool {
        let normalized = payer_name.to_lowercase();
        std::iter::once(&self.payer)
            .chain(self.aliases.iter())
            .map(|candidate| candidate.trim().to_lowercase())
            .any(|candidate| !candidate.is_empty() && normalized.contains(&candidate))
    }
}

/// Finds the route for `payer_name`, falling back to `default_fax`
///
/// Healed routes win over directory routes matching the same name.
pub fn resolve_route(
    routes: &[PayerRoute],
    payer_name: &str,
    default_fax: &str,
    now: DateTime<Utc>,
) -> PayerRoute {
    let mut matches: Vec<&PayerRoute> = routes.iter().filter(|r| r.matches(payer_name)).collect();
    matches.sort_by_key(|r| std::cmp::Reverse((r.provenance == RouteProvenance::Healed, r.updated_at)));
    matches
        .first()
        .map(|r| (*r).clone())
        .unwrap_or_else(|| PayerRoute::fallback(payer_name, default_fax, now))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_containment_match() {
        let now = Utc::now();
        let routes = vec![PayerRoute::new(
            "UnitedHealthcare",
            "1-866-555-0101",
            "Appeals",
            RouteProvenance::Directory,
            now,
        )
        .with_aliases(["UHC", "United Health"])];

        let route = resolve_route(&routes, "UHC Community Plan", DEFAULT_FAX, now);
        assert_eq!(route.fax, "1-866-555-0101");
        assert_eq!(route.provenance, RouteProvenance::Directory);
    }

    #[test]
    fn test_unknown_payer_gets_default_route() {
        let now = Utc::now();
        let route = resolve_route(&[], "Obscure Mutual", DEFAULT_FAX, now);
        assert_eq!(route.payer, "Obscure Mutual");
        assert_eq!(route.fax, DEFAULT_FAX);
        assert_eq!(route.provenance, RouteProvenance::Default);
    }

    #[test]
    fn test_healed_route_preferred() {
        let now = Utc::now();
        let routes = vec![
            PayerRoute::new("Cigna", "1-800-000-0001", "Appeals", RouteProvenance::Directory, now),
            PayerRoute::new("Cigna", "1-800-000-0002", "Appeals", RouteProvenance::Healed, now),
        ];
        assert_eq!(resolve_route(&routes, "Cigna", DEFAULT_FAX, now).fax, "1-800-000-0002");
    }
}
