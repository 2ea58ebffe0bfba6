/// Outcome of a finder lookup, split by how many candidates survived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    NotFound,
    Unique(T),
    Ambiguous(Vec<T>),
}

impl<T> Resolution<T> {
    pub fn from_matches(mut matches: Vec<T>) -> Self {
        match matches.len() {
            0 => Self::NotFound,
            1 => match matches.pop() {
                Some(only) => Self::Unique(only),
                None => Self::NotFound,
            },
            _ => Self::Ambiguous(matches),
        }
    }
}

impl<T> From<Vec<T>> for Resolution<T> {
    fn from(matches: Vec<T>) -> Self {
        Self::from_matches(matches)
    }
}
