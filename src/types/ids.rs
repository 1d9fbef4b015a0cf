//! Newtype wrappers for management API identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., passing a
//! template version ID where a multi-cluster app ID is expected) and make the
//! code more self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

string_id!(
    /// The ID of a multi-cluster app object, assigned by the management API.
    MultiClusterAppId
);

string_id!(
    /// The ID of an app instance the management API created inside one target
    /// project. Only meaningful together with the target's project.
    AppId
);

string_id!(
    /// A template version ID, e.g. `cattle-global-data:library-wordpress-7.3.8`.
    TemplateVersionId
);

string_id!(
    /// A multi-cluster app revision, used as the rollback target.
    RevisionId
);

/// A fully-qualified project ID in `cluster:project` form (e.g. `c-7k2x9:p-4mzq8`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(s: impl Into<String>) -> Self {
        ProjectId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the project portion of the ID with the cluster prefix removed.
    ///
    /// An unqualified ID is returned unchanged.
    pub fn project_part(&self) -> &str {
        match self.0.split_once(':') {
            Some((_, project)) => project,
            None => &self.0,
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        ProjectId(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        ProjectId(s.to_string())
    }
}

/// The ID of the per-target child app a multi-cluster app owns.
///
/// The project API addresses child apps as `<project-part>:<app-id>`, where the
/// project part has the cluster prefix stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildAppId(pub String);

impl ChildAppId {
    /// Derives the child app ID for a target.
    pub fn for_target(project: &ProjectId, app: &AppId) -> Self {
        ChildAppId(format!("{}:{}", project.project_part(), app))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChildAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
