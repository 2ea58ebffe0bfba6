use encore_finder::{resolve, Candidate};

/// A searchable track title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: u64,
    pub title: String,
}

impl Candidate for Track {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
}

impl TrackCatalog {
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tracks = titles
            .into_iter()
            .zip(1_u64..)
            .map(|(title, id)| Track {
                id,
                title: title.into(),
            })
            .collect();
        Self { tracks }
    }

    /// Tracks matching `query` in the best tier, capped at `limit`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Track> {
        let mut found = resolve(query, &self.tracks, None);
        found.truncate(limit);
        found
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
