//! core::naming
//!
//! Reference naming: turning what a caller typed into a fully-qualified ref.
//!
//! # Rules
//!
//! - An empty name means "whatever HEAD is on": HEAD's short name is
//!   re-qualified under the requested namespace.
//! - A name already qualified under the namespace is returned unchanged,
//!   so resolution is idempotent.
//! - Anything else is validated as a [`ShortName`] and qualified.
//!
//! # Example
//!
//! ```
//! use gitclerk::core::naming::{resolve, Namespace};
//! use gitclerk::core::types::{RefName, TypeError};
//!
//! let head = || Ok::<_, TypeError>(RefName::new("refs/heads/main").unwrap());
//!
//! let r = resolve(&Namespace::Branch, "", head).unwrap();
//! assert_eq!(r.as_str(), "refs/heads/main");
//!
//! let r = resolve(&Namespace::Tag, "v1.0.0", head).unwrap();
//! assert_eq!(r.as_str(), "refs/tags/v1.0.0");
//! ```

use super::types::{RefName, ShortName, TypeError};

/// The ref namespace a short name is qualified under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Local branches, `refs/heads/`.
    Branch,
    /// Tags, `refs/tags/`.
    Tag,
    /// Remote-tracking branches of one remote, `refs/remotes/<remote>/`.
    Remote(String),
}

impl Namespace {
    /// The ref prefix of this namespace, including the trailing slash.
    pub fn prefix(&self) -> String {
        match self {
            Namespace::Branch => RefName::HEADS.to_string(),
            Namespace::Tag => RefName::TAGS.to_string(),
            Namespace::Remote(remote) => format!("{}{}/", RefName::REMOTES, remote),
        }
    }

    /// Whether `name` is already qualified under this namespace.
    pub fn contains(&self, name: &str) -> bool {
        name.starts_with(&self.prefix())
    }
}

/// Qualify `name` under `ns`, leaving already-qualified names untouched.
///
/// # Errors
///
/// Returns a [`TypeError`] when `name` is not a valid short name, or is
/// qualified but not a valid ref name.
pub fn qualify(ns: &Namespace, name: &str) -> Result<RefName, TypeError> {
    if ns.contains(name) {
        return RefName::new(name);
    }
    let short = ShortName::new(name)?;
    RefName::new(format!("{}{}", ns.prefix(), short))
}

/// Resolve a possibly-empty name to a full ref under `ns`.
///
/// `head` is consulted only when `name` is empty; its error is returned
/// unchanged, which is how a missing HEAD surfaces to callers.
pub fn resolve<E, F>(ns: &Namespace, name: &str, head: F) -> Result<RefName, E>
where
    E: From<TypeError>,
    F: FnOnce() -> Result<RefName, E>,
{
    if name.is_empty() {
        let head = head()?;
        return Ok(qualify(ns, head.short())?);
    }
    Ok(qualify(ns, name)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head_on(name: &str) -> impl FnOnce() -> Result<RefName, TypeError> + '_ {
        move || RefName::new(name)
    }

    fn no_head() -> Result<RefName, TypeError> {
        panic!("head must not be read for non-empty names")
    }

    mod namespace {
        use super::*;

        #[test]
        fn prefixes() {
            assert_eq!(Namespace::Branch.prefix(), "refs/heads/");
            assert_eq!(Namespace::Tag.prefix(), "refs/tags/");
            assert_eq!(
                Namespace::Remote("origin".into()).prefix(),
                "refs/remotes/origin/"
            );
        }

        #[test]
        fn contains_is_namespace_specific() {
            assert!(Namespace::Branch.contains("refs/heads/main"));
            assert!(!Namespace::Branch.contains("refs/tags/main"));
            assert!(!Namespace::Remote("origin".into()).contains("refs/remotes/upstream/main"));
        }
    }

    mod qualify {
        use super::*;

        #[test]
        fn short_names_are_qualified() {
            assert_eq!(
                qualify(&Namespace::Branch, "feature/x").unwrap().as_str(),
                "refs/heads/feature/x"
            );
            assert_eq!(
                qualify(&Namespace::Remote("origin".into()), "dev").unwrap().as_str(),
                "refs/remotes/origin/dev"
            );
        }

        #[test]
        fn qualified_names_pass_through() {
            assert_eq!(
                qualify(&Namespace::Tag, "refs/tags/v1").unwrap().as_str(),
                "refs/tags/v1"
            );
        }

        #[test]
        fn branch_and_remote_counterpart_differ() {
            let local = qualify(&Namespace::Branch, "main").unwrap();
            let remote = qualify(&Namespace::Remote("origin".into()), "main").unwrap();
            assert_ne!(local, remote);
        }

        #[test]
        fn invalid_names_rejected() {
            assert!(qualify(&Namespace::Branch, "bad..name").is_err());
            assert!(qualify(&Namespace::Tag, "has space").is_err());
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn empty_name_follows_head() {
            let r = resolve(&Namespace::Branch, "", head_on("refs/heads/main")).unwrap();
            assert_eq!(r.as_str(), "refs/heads/main");
        }

        #[test]
        fn empty_tag_name_requalifies_head_short_name() {
            let r = resolve(&Namespace::Tag, "", head_on("refs/heads/main")).unwrap();
            assert_eq!(r.as_str(), "refs/tags/main");
        }

        #[test]
        fn empty_name_matches_explicit_short_name() {
            let implicit = resolve(&Namespace::Branch, "", head_on("refs/heads/main")).unwrap();
            let explicit = resolve(&Namespace::Branch, "main", no_head).unwrap();
            assert_eq!(implicit, explicit);
        }

        #[test]
        fn idempotent_on_qualified_names() {
            let once = resolve(&Namespace::Tag, "v1.0.0", no_head).unwrap();
            let twice = resolve(&Namespace::Tag, once.as_str(), no_head).unwrap();
            assert_eq!(once, twice);
        }

        #[test]
        fn head_failure_propagates() {
            #[derive(Debug, PartialEq)]
            enum Failure {
                NoHead,
                Type(TypeError),
            }
            impl From<TypeError> for Failure {
                fn from(err: TypeError) -> Self {
                    Failure::Type(err)
                }
            }

            let r = resolve(&Namespace::Branch, "", || Err(Failure::NoHead));
            assert_eq!(r, Err(Failure::NoHead));
        }
    }
}
