/// Static level description: rows of tile-type labels.
///
/// The grid is drawn once per level load and never mutated here.
/// Rows are not required to share a length; nothing validates that.

use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Level {
    rows: Vec<Vec<String>>,
}

impl Level {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Level { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl<R, S> FromIterator<R> for Level
where
    R: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Level::new(
            iter.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}
