/// Per-tick game snapshot handed to the display by the host.
///
/// Read-only here; the physics that produces it lives elsewhere.

use std::fmt;

use crate::domain::vec::Vec2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Playing => "playing",
            Status::Won => "won",
            Status::Lost => "lost",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamic entity: player, enemy, pickup.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    /// Style class, e.g. `"player"`, `"coin"`, `"lava"`.
    pub kind: String,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Actor {
    pub fn new(kind: impl Into<String>, pos: Vec2, size: Vec2) -> Self {
        Actor { kind: kind.into(), pos, size }
    }

    pub fn player(pos: Vec2) -> Self {
        Actor::new("player", pos, Vec2::new(0.8, 1.5))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub status: Status,
    pub player: Actor,
    /// Everything except the player.
    pub actors: Vec<Actor>,
}

impl GameState {
    pub fn new(player: Actor, actors: Vec<Actor>) -> Self {
        GameState { status: Status::Playing, player, actors }
    }

    /// All actors in draw order, player first.
    pub fn all_actors(&self) -> impl Iterator<Item = &Actor> {
        std::iter::once(&self.player).chain(self.actors.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings() {
        assert_eq!(Status::Playing.to_string(), "playing");
        assert_eq!(Status::Won.to_string(), "won");
        assert_eq!(Status::Lost.to_string(), "lost");
    }

    #[test]
    fn player_is_drawn_first() {
        let coin = Actor::new("coin", Vec2::new(3.0, 1.0), Vec2::new(0.6, 0.6));
        let state = GameState::new(Actor::player(Vec2::new(1.0, 1.0)), vec![coin]);
        let kinds: Vec<&str> = state.all_actors().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, ["player", "coin"]);
    }
}
