/// Static level grid: one `table.background` per level load.
///
/// Each level row becomes a `tr`, each tile a `td` classed with its tile
/// label. Ragged rows are drawn as given.

use crate::dom::{Document, DomError, NodeId, Style};
use crate::domain::level::Level;

/// Fixed table width in pixels. Not derived from the level.
pub const GRID_WIDTH_PX: f64 = 3200.0;
/// Fixed row height in pixels.
pub const ROW_HEIGHT_PX: f64 = 16.0;

pub fn draw_grid(doc: &mut Document, level: &Level) -> Result<NodeId, DomError> {
    let mut rows = Vec::with_capacity(level.height());
    for row in level.rows() {
        let cells: Vec<NodeId> = row
            .iter()
            .map(|tile| doc.create_element("td", tile, Style::default()))
            .collect();
        rows.push(doc.elt("tr", "", Style::height(ROW_HEIGHT_PX), cells)?);
    }
    doc.elt("table", "background", Style::width(GRID_WIDTH_PX), rows)
}
