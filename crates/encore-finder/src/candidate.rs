/// Separator between a name and its disambiguating tag (`name#0042`).
pub const TAG_SEPARATOR: char = '#';

/// Tag value that marks a candidate as having no usable tag.
pub const NO_TAG_SENTINEL: &str = "0000";

/// Read-only view of a named entity that text queries are resolved against.
///
/// Implementors expose a stable snowflake identifier and a primary name.
/// Entities with a nickname or a discriminator override the optional
/// accessors so the resolver can compare against them too.
pub trait Candidate {
    fn id(&self) -> u64;

    fn name(&self) -> &str;

    /// Secondary name shown in place of `name` (for example a nickname).
    fn display_name(&self) -> Option<&str> {
        None
    }

    /// Disambiguating tag appended to `name` with [`TAG_SEPARATOR`].
    fn tag(&self) -> Option<&str> {
        None
    }

    /// Returns the `name#tag` form when the tag is usable.
    fn composite_identity(&self) -> Option<String> {
        let tag = self.tag()?;
        if tag.is_empty() || tag == NO_TAG_SENTINEL {
            return None;
        }
        Some(format!("{}{TAG_SEPARATOR}{tag}", self.name()))
    }
}

impl<C: Candidate + ?Sized> Candidate for &C {
    fn id(&self) -> u64 {
        (**self).id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn display_name(&self) -> Option<&str> {
        (**self).display_name()
    }

    fn tag(&self) -> Option<&str> {
        (**self).tag()
    }
}

#[cfg(test)]
mod tests {
    use super::{Candidate, NO_TAG_SENTINEL};

    struct Tagged(&'static str, Option<&'static str>);

    impl Candidate for Tagged {
        fn id(&self) -> u64 {
            1
        }

        fn name(&self) -> &str {
            self.0
        }

        fn tag(&self) -> Option<&str> {
            self.1
        }
    }

    #[test]
    fn unit_composite_identity_joins_name_and_tag() {
        assert_eq!(
            Tagged("Alice", Some("0042")).composite_identity().as_deref(),
            Some("Alice#0042")
        );
    }

    #[test]
    fn unit_composite_identity_skips_sentinel_and_missing_tags() {
        assert!(Tagged("alice", Some(NO_TAG_SENTINEL))
            .composite_identity()
            .is_none());
        assert!(Tagged("alice", None).composite_identity().is_none());
        assert!(Tagged("alice", Some("")).composite_identity().is_none());
    }
}
