//! # Position Resolver
//!
//! Maps a pointer location to the semantic target under it, so the host can
//! replace the platform context menu over links.

use crate::session::EditorSession;
use postcraft_model::{Document, Mark, Node};
use postcraft_schema::extensions::LINK;
use postcraft_schema::Schema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Viewport coordinates of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Layout lookup provided by the view layer
pub trait CoordsLookup {
    /// Nearest document position, or `None` outside the document
    fn pos_at_coords(&self, coords: Coords) -> Option<usize>;
}

impl<F> CoordsLookup for F
where
    F: Fn(Coords) -> Option<usize>,
{
    fn pos_at_coords(&self, coords: Coords) -> Option<usize> {
        self(coords)
    }
}

/// Link found under the pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub pos: usize,
    pub href: String,
    pub target: Option<String>,
    pub coords: Coords,
    /// Extent of the contiguous text carrying the same link
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextMenu {
    /// Show the link menu instead of the platform menu
    Link(LinkTarget),
    /// Let the platform handle the event
    Default,
}

impl ContextMenu {
    pub fn suppresses_default(&self) -> bool {
        matches!(self, ContextMenu::Link(_))
    }
}

/// Resolve a secondary-click location
pub fn resolve_context_menu(
    session: &EditorSession,
    lookup: &dyn CoordsLookup,
    coords: Coords,
) -> ContextMenu {
    let Some(pos) = lookup.pos_at_coords(coords) else {
        return ContextMenu::Default;
    };

    match link_at(session.doc(), session.schema(), pos) {
        Some(found) => {
            debug!(pos, href = %found.href, "Context menu over link");
            ContextMenu::Link(LinkTarget { coords, ..found })
        }
        None => ContextMenu::Default,
    }
}

/// Link active at `pos`, with its extent; `coords` is left at the origin
pub fn link_at(doc: &Document, schema: &Schema, pos: usize) -> Option<LinkTarget> {
    let rp = doc.resolve(pos).ok()?;
    let link = rp
        .marks(|m| schema.is_inclusive(m))
        .into_iter()
        .find(|m| m.is_type(LINK))?;

    let (from, to) = link_extent(rp.parent().children(), rp.parent_offset(), &link)?;
    let base = rp.start(rp.depth());

    Some(LinkTarget {
        pos,
        href: link.attr("href").as_str().unwrap_or_default().to_string(),
        target: link.attr("target").as_str().map(str::to_string),
        coords: Coords::new(0.0, 0.0),
        from: base + from,
        to: base + to,
    })
}

/// Content offsets of the run of siblings carrying `link` around `offset`
fn link_extent(children: &[Node], offset: usize, link: &Mark) -> Option<(usize, usize)> {
    let covers = |&(start, stop): &(usize, usize)| start <= offset && offset <= stop;
    let mut run: Option<(usize, usize)> = None;
    let mut pos = 0;

    for child in children {
        let end = pos + child.size();
        if child.marks().contains(link) {
            let start = run.map_or(pos, |(start, _)| start);
            run = Some((start, end));
        } else if let Some(done) = run.take().filter(covers) {
            return Some(done);
        }
        pos = end;
    }

    run.filter(covers)
}
