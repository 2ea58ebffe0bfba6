use crate::candidate::{Candidate, TAG_SEPARATOR};
use crate::patterns::{parse_mention, parse_snowflake, MentionKind, MentionToken};
use crate::tiers::{BestTier, MatchTier};

/// Which resolution step produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    /// Blank query or no candidates.
    Empty,
    /// Mention wrapper, resolved or not.
    Mention,
    /// Bare 17-20 digit identifier that matched a candidate.
    Snowflake,
    /// `name#tag` match; exact case wins over case-insensitive.
    Composite,
    /// Tiered name matching produced members of this tier.
    Name(MatchTier),
    /// Tiered name matching found nothing.
    NoMatch,
}

impl ResolvedVia {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Mention => "mention",
            Self::Snowflake => "snowflake",
            Self::Composite => "composite",
            Self::Name(tier) => tier.as_str(),
            Self::NoMatch => "no_match",
        }
    }
}

/// Ranked, deduplicated matches plus the step that produced them.
#[derive(Debug)]
pub struct Resolved<'a, C> {
    pub matches: Vec<&'a C>,
    pub via: ResolvedVia,
}

impl<'a, C> Resolved<'a, C> {
    fn new(matches: Vec<&'a C>, via: ResolvedVia) -> Self {
        Self { matches, via }
    }

    fn empty(via: ResolvedVia) -> Self {
        Self::new(Vec::new(), via)
    }
}

/// Resolves a raw text query against `candidates`.
///
/// Returns the members of the highest non-empty tier in input order. Blank
/// queries and empty candidate sets yield an empty result rather than an error.
///
/// # Examples
///
/// ```
/// use encore_finder::{resolve, Role};
///
/// let roles = vec![
///     Role::new(111_111_111_111_111_111, "DJ"),
///     Role::new(222_222_222_222_222_222, "DJ Helpers"),
/// ];
/// let found = resolve("dj", &roles, None);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].name, "DJ");
/// ```
pub fn resolve<'a, C, I>(query: &str, candidates: I, mention: Option<MentionKind>) -> Vec<&'a C>
where
    C: Candidate + 'a,
    I: IntoIterator<Item = &'a C>,
{
    resolve_detailed(query, candidates, mention).matches
}

/// Same as [`resolve`] but also reports which step produced the matches.
pub fn resolve_detailed<'a, C, I>(
    query: &str,
    candidates: I,
    mention: Option<MentionKind>,
) -> Resolved<'a, C>
where
    C: Candidate + 'a,
    I: IntoIterator<Item = &'a C>,
{
    let query = query.trim();
    let candidates: Vec<&'a C> = candidates.into_iter().collect();
    if query.is_empty() || candidates.is_empty() {
        return Resolved::empty(ResolvedVia::Empty);
    }

    if let Some(kind) = mention {
        match parse_mention(kind, query) {
            Some(MentionToken::Id(id)) => {
                let matches = find_by_id(&candidates, id).into_iter().collect();
                tracing::debug!(kind = kind.as_str(), id, "resolved mention token");
                return Resolved::new(matches, ResolvedVia::Mention);
            }
            Some(MentionToken::Unresolvable) => {
                return Resolved::empty(ResolvedVia::Mention);
            }
            None => {}
        }
    }

    if let Some(id) = parse_snowflake(query) {
        if let Some(found) = find_by_id(&candidates, id) {
            return Resolved::new(vec![found], ResolvedVia::Snowflake);
        }
    }

    let query_lower = query.to_lowercase();
    if query.contains(TAG_SEPARATOR) {
        let mut composite = BestTier::new();
        for candidate in &candidates {
            let Some(identity) = candidate.composite_identity() else {
                continue;
            };
            if identity == query {
                composite.offer(MatchTier::Exact, *candidate);
            } else if identity.to_lowercase() == query_lower {
                composite.offer(MatchTier::CaseInsensitive, *candidate);
            }
        }
        let (_, matches) = composite.into_parts();
        if !matches.is_empty() {
            return Resolved::new(matches, ResolvedVia::Composite);
        }
    }

    let mut best = BestTier::new();
    for candidate in candidates {
        let by_name = MatchTier::classify(candidate.name(), query, &query_lower);
        let by_display = candidate
            .display_name()
            .and_then(|display| MatchTier::classify(display, query, &query_lower));
        let tier = match (by_name, by_display) {
            (Some(left), Some(right)) => Some(left.min(right)),
            (left, right) => left.or(right),
        };
        if let Some(tier) = tier {
            best.offer(tier, candidate);
        }
    }

    let (tier, matches) = best.into_parts();
    let via = tier.map(ResolvedVia::Name).unwrap_or(ResolvedVia::NoMatch);
    tracing::debug!(via = via.as_str(), matches = matches.len(), "tiered name match");
    Resolved::new(matches, via)
}

fn find_by_id<'a, C: Candidate>(candidates: &[&'a C], id: u64) -> Option<&'a C> {
    candidates
        .iter()
        .copied()
        .find(|candidate| candidate.id() == id)
}
