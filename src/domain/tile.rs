/// Known tile types and their style-class labels.
///
/// Levels carry plain labels so unknown tile types pass through the grid
/// untouched; this enum only names the ones the terminal presenter and the
/// demo level know how to draw.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Wall,
    Lava,
}

impl Tile {
    /// Style class written on the grid cell.
    pub fn label(self) -> &'static str {
        match self {
            Tile::Empty => "empty",
            Tile::Wall => "wall",
            Tile::Lava => "lava",
        }
    }

    /// Inverse of `label`. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Tile> {
        match label {
            "empty" => Some(Tile::Empty),
            "wall" => Some(Tile::Wall),
            "lava" => Some(Tile::Lava),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for t in [Tile::Empty, Tile::Wall, Tile::Lava] {
            assert_eq!(Tile::from_label(t.label()), Some(t));
        }
    }

    #[test]
    fn unknown_label() {
        assert_eq!(Tile::from_label("portal"), None);
    }
}
