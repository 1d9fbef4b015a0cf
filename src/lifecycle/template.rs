//! Catalog template naming and version resolution.
//!
//! Templates live in catalogs. Global catalogs are addressed through the
//! `cattle-global-data` namespace; cluster and project catalogs already carry
//! their scope (`c-xxxxx:my-catalog`) and are addressed through it instead.

use std::cmp::Ordering;

use crate::types::{Template, TemplateVersionId};

use super::error::ResolutionError;

/// Namespace holding global catalog objects.
pub const GLOBAL_CATALOG_PREFIX: &str = "cattle-global-data:";

const CATALOG_SCHEME: &str = "catalog://?";

/// Returns the ID of a template in a global catalog.
pub fn template_id(catalog: &str, template: &str) -> String {
    format!("{}{}-{}", GLOBAL_CATALOG_PREFIX, catalog, template)
}

/// Returns the ID of a concrete template version.
///
/// A scoped catalog (`scope:name`) keeps its scope with the separator
/// flattened to `-`; a plain catalog name is placed in the global namespace.
pub fn template_version_id(catalog: &str, template: &str, version: &str) -> TemplateVersionId {
    let catalog = if catalog.contains(':') {
        catalog.replace(':', "-")
    } else {
        format!("{}{}", GLOBAL_CATALOG_PREFIX, catalog)
    };
    TemplateVersionId::new(format!("{}-{}-{}", catalog, template, version))
}

/// Returns the highest version the template publishes, as the API spells it.
///
/// # Errors
///
/// [`ResolutionError::NoVersions`] if there are no version links, and
/// [`ResolutionError::InvalidVersion`] if any of them is not a version.
pub fn latest_version(template: &Template) -> Result<String, ResolutionError> {
    let mut latest: Option<(Version, &str)> = None;

    for raw in template.version_links.keys() {
        let version = Version::parse(raw).ok_or_else(|| ResolutionError::InvalidVersion {
            template_id: template.id.clone(),
            version: raw.clone(),
        })?;
        let newer = match &latest {
            Some((best, _)) => version > *best,
            None => true,
        };
        if newer {
            latest = Some((version, raw.as_str()));
        }
    }

    latest
        .map(|(_, raw)| raw.to_string())
        .ok_or_else(|| ResolutionError::NoVersions {
            template_id: template.id.clone(),
        })
}

// ─── Version Ordering ─────────────────────────────────────────────────────────

/// A release version: dotted numeric segments, an optional pre-release, and
/// ignored build metadata (`v1.2.3-rc.1+build5`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Version {
    segments: Vec<u64>,
    pre: Option<String>,
}

impl Version {
    fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        let s = s.split_once('+').map_or(s, |(version, _)| version);
        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
            Some(_) => return None,
            None => (s, None),
        };

        let segments = core
            .split('.')
            .map(|seg| seg.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Version { segments, pre })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }

        // A pre-release sorts before its release.
        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_pre_release(a, b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares dot-separated pre-release identifiers: numeric identifiers
/// numerically and below alphanumeric ones, the rest lexically.
fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

// ─── Catalog References ───────────────────────────────────────────────────────

/// The catalog, template and version a template version was published from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRef {
    pub catalog_name: String,
    pub template_name: String,
    pub version: String,
}

impl CatalogRef {
    /// Parses an external ID of the form
    /// `catalog://?catalog=<catalog>&template=<template>&version=<version>`.
    ///
    /// Scoped catalogs appear as `scope/name` in the reference and are
    /// returned in the `scope:name` form callers declare them in. Unknown
    /// query keys are ignored.
    pub fn parse(external_id: &str) -> Result<Self, ResolutionError> {
        let invalid = |reason| ResolutionError::InvalidExternalId {
            external_id: external_id.to_string(),
            reason,
        };

        let query = external_id
            .strip_prefix(CATALOG_SCHEME)
            .ok_or_else(|| invalid("missing catalog:// scheme"))?;

        let mut catalog = None;
        let mut template = None;
        let mut version = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| invalid("query pair without '='"))?;
            match key {
                "catalog" => catalog = Some(value.replace('/', ":")),
                "template" => template = Some(value.to_string()),
                "version" => version = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(CatalogRef {
            catalog_name: catalog
                .filter(|c| !c.is_empty())
                .ok_or_else(|| invalid("missing catalog"))?,
            template_name: template
                .filter(|t| !t.is_empty())
                .ok_or_else(|| invalid("missing template"))?,
            version: version
                .filter(|v| !v.is_empty())
                .ok_or_else(|| invalid("missing version"))?,
        })
    }
}
