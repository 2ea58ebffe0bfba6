/// Precedence levels of name matching, best first.
///
/// The derived ordering follows declaration order, so `Exact < Substring`
/// and a smaller tier always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Exact,
    CaseInsensitive,
    Prefix,
    Substring,
}

impl MatchTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::CaseInsensitive => "case_insensitive",
            Self::Prefix => "prefix",
            Self::Substring => "substring",
        }
    }

    /// Returns the first tier `field` satisfies for an already-trimmed query.
    ///
    /// `query_lower` must be `query.to_lowercase()`; callers classify many
    /// fields against one query and pass it in to avoid recomputing it.
    pub fn classify(field: &str, query: &str, query_lower: &str) -> Option<Self> {
        if field == query {
            return Some(Self::Exact);
        }
        let field_lower = field.to_lowercase();
        if field_lower == query_lower {
            Some(Self::CaseInsensitive)
        } else if field_lower.starts_with(query_lower) {
            Some(Self::Prefix)
        } else if field_lower.contains(query_lower) {
            Some(Self::Substring)
        } else {
            None
        }
    }
}

/// Accumulates only the members of the best tier offered so far.
///
/// Members of a tier keep their offer order; a better tier discards
/// everything collected before it.
#[derive(Debug)]
pub(crate) struct BestTier<T> {
    tier: Option<MatchTier>,
    members: Vec<T>,
}

impl<T> BestTier<T> {
    pub(crate) fn new() -> Self {
        Self {
            tier: None,
            members: Vec::new(),
        }
    }

    pub(crate) fn offer(&mut self, tier: MatchTier, item: T) {
        match self.tier {
            Some(current) if tier > current => {}
            Some(current) if tier == current => self.members.push(item),
            _ => {
                self.tier = Some(tier);
                self.members.clear();
                self.members.push(item);
            }
        }
    }

    pub(crate) fn into_parts(self) -> (Option<MatchTier>, Vec<T>) {
        (self.tier, self.members)
    }
}
