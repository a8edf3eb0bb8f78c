/// Actor layer drawing.
///
/// The surface asks an `ActorDrawer` for a fresh, detached layer on every
/// tick and never looks inside it. `DomActorDrawer` is the stock drawer:
/// one absolutely-positioned `div` per actor, sized and placed in pixels.

use crossterm::event::KeyCode;

use crate::dom::{Document, DomError, NodeId, Style};
use crate::domain::state::{Actor, GameState};
use crate::ui::input::KeyState;

pub trait ActorDrawer {
    /// Build a new actor layer for `state`. The returned node must be
    /// detached; the caller owns attaching and removing it.
    fn draw_actors(
        &mut self,
        doc: &mut Document,
        state: &GameState,
        keys: &KeyState,
    ) -> Result<NodeId, DomError>;
}

pub struct DomActorDrawer {
    scale: f64,
}

impl DomActorDrawer {
    pub fn new(scale: f64) -> Self {
        DomActorDrawer { scale }
    }

    fn actor_style(&self, actor: &Actor) -> Style {
        let pos = actor.pos.times(self.scale);
        let size = actor.size.times(self.scale);
        Style {
            left: Some(pos.x),
            top: Some(pos.y),
            width: Some(size.x),
            height: Some(size.y),
        }
    }
}

impl ActorDrawer for DomActorDrawer {
    fn draw_actors(
        &mut self,
        doc: &mut Document,
        state: &GameState,
        keys: &KeyState,
    ) -> Result<NodeId, DomError> {
        // Player (drawn first) gets a facing hint while an arrow key is held.
        let facing = if keys.is_held(KeyCode::Left) {
            " left"
        } else if keys.is_held(KeyCode::Right) {
            " right"
        } else {
            ""
        };

        let mut nodes = Vec::with_capacity(state.actors.len() + 1);
        for (i, actor) in state.all_actors().enumerate() {
            let hint = if i == 0 { facing } else { "" };
            let class = format!("actor {}{hint}", actor.kind);
            nodes.push(doc.create_element("div", &class, self.actor_style(actor)));
        }

        doc.elt("div", "actors", Style::default(), nodes)
    }
}
