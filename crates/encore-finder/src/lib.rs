//! Text-query resolution against named entities.
//!
//! Maps a raw query onto a ranked candidate list: mention tokens and bare
//! snowflake ids resolve directly, `name#tag` composites are tried next, and
//! everything else falls through to tiered name matching
//! (exact, case-insensitive, prefix, substring). Only the best non-empty
//! tier is returned.

pub mod candidate;
pub mod entities;
pub mod finder;
pub mod patterns;
pub mod tiers;

pub use candidate::{Candidate, NO_TAG_SENTINEL, TAG_SEPARATOR};
pub use entities::{Channel, ChannelKind, GuildRoster, Member, Role};
pub use finder::{resolve, resolve_detailed, Resolved, ResolvedVia};
pub use patterns::{is_snowflake, parse_mention, parse_snowflake, MentionKind, MentionToken};
pub use tiers::MatchTier;
