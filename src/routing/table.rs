//! Compiled route table.
//!
//! # Design Decisions
//! - Immutable after construction; reload builds a new table and swaps it
//! - Entries keep their configuration order for stable diagnostics
//! - Specs are `"<verb> <path>" = "<controller>#<action>"`, the same shape
//!   the configuration file declares

use serde::Serialize;
use thiserror::Error;

/// A route spec that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteSpecError {
    #[error("route '{0}' must be '<verb> <path>'")]
    BadSpec(String),

    #[error("route '{spec}' has unknown verb '{verb}'")]
    BadVerb { spec: String, verb: String },

    #[error("route target '{0}' must be '<controller>#<action>'")]
    BadTarget(String),
}

/// One compiled route.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteEntry {
    pub verb: String,
    pub path: String,
    pub controller: String,
    pub action: String,
}

const VERBS: [&str; 7] = ["get", "post", "put", "patch", "delete", "head", "options"];

impl RouteEntry {
    /// Parse a `"get /users" = "users#index"` pair.
    pub fn parse(spec: &str, target: &str) -> Result<Self, RouteSpecError> {
        let mut parts = spec.split_whitespace();
        let (Some(verb), Some(path), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RouteSpecError::BadSpec(spec.to_string()));
        };

        let verb = verb.to_lowercase();
        if !VERBS.contains(&verb.as_str()) {
            return Err(RouteSpecError::BadVerb {
                spec: spec.to_string(),
                verb,
            });
        }

        let (controller, action) = target
            .split_once('#')
            .filter(|(c, a)| !c.is_empty() && !a.is_empty())
            .ok_or_else(|| RouteSpecError::BadTarget(target.to_string()))?;

        Ok(Self {
            verb,
            path: path.to_string(),
            controller: controller.to_string(),
            action: action.to_string(),
        })
    }
}

/// The currently registered routes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Compile an ordered list of `(spec, target)` pairs.
    pub fn compile<'a, I>(specs: I) -> Result<Self, RouteSpecError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let entries = specs
            .into_iter()
            .map(|(spec, target)| RouteEntry::parse(spec, target))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
