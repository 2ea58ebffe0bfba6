/// Reply keyword that abandons a selection menu.
pub const CANCEL_KEYWORD: &str = "cancel";

/// Interpretation of a reply to a numbered menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based index of the chosen option.
    Chosen(usize),
    Cancelled,
    Unrecognized,
}

impl Selection {
    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

/// Parses a 1-based option number or the cancel keyword.
pub fn parse_selection(content: &str, option_count: usize) -> Selection {
    let content = content.trim();
    if content.eq_ignore_ascii_case(CANCEL_KEYWORD) {
        return Selection::Cancelled;
    }
    match content.parse::<usize>() {
        Ok(number) if (1..=option_count).contains(&number) => Selection::Chosen(number - 1),
        _ => Selection::Unrecognized,
    }
}
