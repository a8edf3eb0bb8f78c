/// Retained element tree.
///
/// An arena of elements addressed by `NodeId`. Elements carry a tag, a
/// style class, a typed inline style, ordered children and a horizontal
/// scroll offset. Removing an element frees its whole subtree and recycles
/// the slots; each slot carries a generation that is bumped on free, so a
/// stale id reports `UnknownNode` instead of aliasing a newer element.

use std::collections::VecDeque;
use std::fmt::Write as _;

use thiserror::Error;

/// Generational element handle: slot index plus the slot's generation at
/// allocation time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} is not in the document")]
    UnknownNode(NodeId),
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
}

/// Inline style. All lengths are pixels.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Style {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub left: Option<f64>,
    pub top: Option<f64>,
}

impl Style {
    pub fn width(px: f64) -> Self {
        Style { width: Some(px), ..Style::default() }
    }

    pub fn height(px: f64) -> Self {
        Style { height: Some(px), ..Style::default() }
    }

    /// CSS text, e.g. `"width: 3200px"`. Unset properties are omitted.
    pub fn css(&self) -> String {
        let mut out = String::new();
        let props = [
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in props {
            if let Some(px) = value {
                if !out.is_empty() {
                    out.push_str("; ");
                }
                let _ = write!(out, "{name}: {px}px");
            }
        }
        out
    }
}

#[derive(Clone, Debug)]
pub struct Element {
    tag: String,
    class: String,
    style: Style,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    scroll_left: f64,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Does the space-separated class list contain `class`?
    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }
}

struct Slot {
    generation: u32,
    element: Option<Element>,
}

pub struct Document {
    slots: Vec<Slot>,
    /// Freed slot indices, reused oldest first.
    free: VecDeque<u32>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

// ── Construction ──

impl Document {
    /// New document with a single `body` root.
    pub fn new() -> Self {
        let mut doc = Document {
            slots: Vec::with_capacity(64),
            free: VecDeque::new(),
            root: NodeId { index: 0, generation: 0 },
        };
        doc.root = doc.create_element("body", "", Style::default());
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element, reusing a freed slot when one exists.
    pub fn create_element(&mut self, tag: &str, class: &str, style: Style) -> NodeId {
        let element = Element {
            tag: tag.to_string(),
            class: class.to_string(),
            style,
            children: Vec::new(),
            parent: None,
            scroll_left: 0.0,
        };
        if let Some(index) = self.free.pop_front() {
            // Generation was already bumped when the slot was freed.
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            NodeId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, element: Some(element) });
            NodeId { index, generation: 0 }
        }
    }

    /// Create an element and append `children` to it in order.
    pub fn elt<I>(&mut self, tag: &str, class: &str, style: Style, children: I) -> Result<NodeId, DomError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let id = self.create_element(tag, class, style);
        for child in children {
            self.append_child(id, child)?;
        }
        Ok(id)
    }
}

// ── Queries ──

impl Document {
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    pub fn element(&self, id: NodeId) -> Result<&Element, DomError> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
            .ok_or(DomError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], DomError> {
        Ok(self.element(id)?.children())
    }

    /// Is `node` strictly below `ancestor`?
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = self.get(node).and_then(Element::parent);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.get(id).and_then(Element::parent);
        }
        false
    }

    /// Number of elements currently alive in the arena.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.element.is_some()).count()
    }

    /// Number of slots ever allocated, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

// ── Mutation ──

impl Document {
    /// Append `child` as the last child of `parent`, moving it out of any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.element(child)?;
        if parent == child || self.is_descendant(parent, child) {
            return Err(DomError::WouldCycle { parent, child });
        }
        self.detach(child)?;
        self.element_mut(child)?.parent = Some(parent);
        self.element_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Unlink `id` from its parent. The subtree stays alive.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.element_mut(id)?.parent.take() else {
            return Ok(());
        };
        if let Ok(p) = self.element_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        Ok(())
    }

    /// Unlink `id` and free it together with its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(slot) = self.slots.get_mut(next.index as usize) else { continue };
            if slot.generation != next.generation {
                continue;
            }
            if let Some(el) = slot.element.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push_back(next.index);
                stack.extend(el.children);
            }
        }
        Ok(())
    }

    pub fn set_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        el.class.clear();
        el.class.push_str(class);
        Ok(())
    }

    pub fn scroll_left(&self, id: NodeId) -> Result<f64, DomError> {
        Ok(self.element(id)?.scroll_left)
    }

    /// Set the horizontal scroll offset. Not clamped to the content width.
    pub fn set_scroll_left(&mut self, id: NodeId, px: f64) -> Result<(), DomError> {
        self.element_mut(id)?.scroll_left = px;
        Ok(())
    }
}
