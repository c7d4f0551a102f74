//! core::refspec
//!
//! Push ref-specs and the rules for choosing them.
//!
//! A ref-spec maps a local ref onto a remote one: `src:dst` updates,
//! `+src:dst` force-updates, and `:dst` (empty source) deletes.
//!
//! # Example
//!
//! ```
//! use gitclerk::core::refspec::{build_refspecs, RefKind};
//! use gitclerk::core::types::RefName;
//!
//! let tag = RefName::new("refs/tags/v1.0.0").unwrap();
//! let specs = build_refspecs(RefKind::Tag, &tag, false);
//! assert_eq!(specs[0].to_string(), "+refs/tags/v1.0.0:refs/tags/v1.0.0");
//!
//! let specs = build_refspecs(RefKind::Tag, &tag, true);
//! assert_eq!(specs[0].to_string(), ":refs/tags/v1.0.0");
//! ```

use std::fmt;
use std::str::FromStr;

use super::types::{RefName, TypeError};

/// What kind of ref a handle manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Branch,
    Tag,
}

impl RefKind {
    /// Lowercase label used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            RefKind::Branch => "branch",
            RefKind::Tag => "tag",
        }
    }
}

/// A single push ref-spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefSpec {
    force: bool,
    src: Option<RefName>,
    dst: RefName,
}

impl RefSpec {
    /// `src:dst`, a plain fast-forward update.
    pub fn update(src: RefName, dst: RefName) -> Self {
        Self {
            force: false,
            src: Some(src),
            dst,
        }
    }

    /// `+ref:ref`, overwrite the remote ref with the local one.
    pub fn force_update(reference: RefName) -> Self {
        Self {
            force: true,
            src: Some(reference.clone()),
            dst: reference,
        }
    }

    /// `:dst`, delete the remote ref.
    pub fn delete(dst: RefName) -> Self {
        Self {
            force: false,
            src: None,
            dst,
        }
    }

    pub fn is_force(&self) -> bool {
        self.force
    }

    pub fn is_delete(&self) -> bool {
        self.src.is_none()
    }

    pub fn src(&self) -> Option<&RefName> {
        self.src.as_ref()
    }

    pub fn dst(&self) -> &RefName {
        &self.dst
    }
}

impl fmt::Display for RefSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.force {
            f.write_str("+")?;
        }
        if let Some(src) = &self.src {
            f.write_str(src.as_str())?;
        }
        write!(f, ":{}", self.dst)
    }
}

impl FromStr for RefSpec {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (force, rest) = match s.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (src, dst) = rest
            .split_once(':')
            .ok_or_else(|| TypeError::InvalidRefName(format!("ref-spec '{s}' has no ':'")))?;
        let src = if src.is_empty() {
            None
        } else {
            Some(RefName::new(src)?)
        };
        if src.is_none() && force {
            return Err(TypeError::InvalidRefName(format!(
                "deletion ref-spec '{s}' cannot be forced"
            )));
        }
        Ok(Self {
            force,
            src,
            dst: RefName::new(dst)?,
        })
    }
}

/// Choose the push ref-specs for a branch or tag handle.
///
/// - deleted: a single `:ref` deletion spec
/// - live tag: `+ref:ref`, so re-tagging overwrites the remote tag
/// - live branch: no explicit spec; the caller falls back to the
///   branch's configured merge ref
pub fn build_refspecs(kind: RefKind, reference: &RefName, deleted: bool) -> Vec<RefSpec> {
    if deleted {
        return vec![RefSpec::delete(reference.clone())];
    }
    match kind {
        RefKind::Branch => Vec::new(),
        RefKind::Tag => vec![RefSpec::force_update(reference.clone())],
    }
}
