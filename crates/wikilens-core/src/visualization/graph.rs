//! Graph view model: entities, synthetic edges, viewport and interaction
//!
//! The view owns no business data. It is handed the current entity list and
//! highlight, runs a `GraphLayout` over them and maps between screen and
//! layout space for pan, zoom, drag and click.

use crate::config::GraphConfig;
use crate::domain::Entity;
use crate::explorer::ExplorerState;

use super::layout::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Edge, ForceLayout, GraphLayout, Point};

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 5.0;

/// Alpha target while a node is being dragged
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Node radii in layout units
pub const NODE_RADIUS: f64 = 18.0;
pub const COMPARISON_RADIUS: f64 = 22.0;
pub const SELECTED_RADIUS: f64 = 26.0;

/// Following entities each entity is linked to
pub const NEIGHBOR_LINKS: usize = 3;

/// Link each entity to the next `span` entities in list order
///
/// This is a visual placeholder for relatedness. It does not reflect any
/// relation recorded in the knowledge graph.
pub fn synthetic_edges(count: usize, span: usize) -> Vec<Edge> {
    (0..count)
        .flat_map(|i| ((i + 1)..count.min(i + 1 + span)).map(move |j| Edge::new(i, j)))
        .collect()
}

/// Which entities are emphasised
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    pub selected: Option<String>,
    pub comparison: Vec<String>,
}

impl Highlight {
    pub fn from_state(state: &ExplorerState) -> Self {
        Self {
            selected: state.selected_entity.as_ref().map(|e| e.id.clone()),
            comparison: state
                .comparison_entity
                .iter()
                .map(|e| e.id.clone())
                .collect(),
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn is_compared(&self, id: &str) -> bool {
        self.comparison.iter().any(|c| c == id)
    }

    /// Drawn radius of a node
    pub fn radius(&self, id: &str) -> f64 {
        if self.is_selected(id) {
            SELECTED_RADIUS
        } else if self.is_compared(id) {
            COMPARISON_RADIUS
        } else {
            NODE_RADIUS
        }
    }
}

/// Screen transform: `screen = layout * zoom + translate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub translate: Point,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            zoom: 1.0,
            translate: Point::default(),
        }
    }

    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.zoom + self.translate.x,
            p.y * self.zoom + self.translate.y,
        )
    }

    pub fn to_layout(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate.x) / self.zoom,
            (p.y - self.translate.y) / self.zoom,
        )
    }
}

/// Interactive force-directed view over the current entities
#[derive(Debug)]
pub struct GraphView<L = ForceLayout> {
    layout: L,
    entities: Vec<Entity>,
    edges: Vec<Edge>,
    highlight: Highlight,
    viewport: Viewport,
    dragging: Option<String>,
}

impl GraphView<ForceLayout> {
    /// View over a force layout tuned by `config`
    pub fn from_config(config: &GraphConfig) -> Self {
        let layout = ForceLayout::from_config(config, DEFAULT_WIDTH, DEFAULT_HEIGHT);
        Self::new(layout, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Default for GraphView<ForceLayout> {
    fn default() -> Self {
        Self::from_config(&GraphConfig::default())
    }
}

impl<L: GraphLayout> GraphView<L> {
    pub fn new(layout: L, width: f64, height: f64) -> Self {
        Self {
            layout,
            entities: Vec::new(),
            edges: Vec::new(),
            highlight: Highlight::default(),
            viewport: Viewport::new(width, height),
            dragging: None,
        }
    }

    /// Show `entities`, restarting the layout only when the set changed
    pub fn set_entities(&mut self, entities: &[Entity]) {
        let unchanged = self.entities.len() == entities.len()
            && self.entities.iter().zip(entities).all(|(a, b)| a.id == b.id);
        if unchanged {
            return;
        }

        self.entities = entities.to_vec();
        self.edges = synthetic_edges(entities.len(), NEIGHBOR_LINKS);
        self.dragging = None;
        let ids: Vec<String> = entities.iter().map(|e| e.id.clone()).collect();
        self.layout.set_graph(&ids, &self.edges);
    }

    pub fn set_highlight(&mut self, highlight: Highlight) {
        self.highlight = highlight;
    }

    /// Sync entities and highlight from the explorer state
    pub fn sync(&mut self, state: &ExplorerState) {
        self.set_entities(&state.entities);
        self.set_highlight(Highlight::from_state(state));
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Whether an edge touches the selection or joins two compared nodes
    pub fn is_related(&self, edge: &Edge) -> bool {
        let (Some(a), Some(b)) = (self.entities.get(edge.source), self.entities.get(edge.target))
        else {
            return false;
        };
        self.highlight.is_selected(&a.id)
            || self.highlight.is_selected(&b.id)
            || (self.highlight.is_compared(&a.id) && self.highlight.is_compared(&b.id))
    }

    /// Entities paired with their screen position
    pub fn nodes(&self) -> impl Iterator<Item = (&Entity, Point)> {
        self.entities
            .iter()
            .zip(self.layout.positions())
            .map(|(e, p)| (e, self.viewport.to_screen(*p)))
    }

    /// Screen endpoints of every edge
    pub fn segments(&self) -> impl Iterator<Item = (&Edge, Point, Point)> {
        let positions = self.layout.positions();
        self.edges.iter().filter_map(move |edge| {
            let a = positions.get(edge.source)?;
            let b = positions.get(edge.target)?;
            Some((edge, self.viewport.to_screen(*a), self.viewport.to_screen(*b)))
        })
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.translate.x += dx;
        self.viewport.translate.y += dy;
    }

    /// Zoom about the viewport centre, clamped to the allowed range
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let old = self.viewport.zoom;
        let new = (old * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let cx = self.viewport.width / 2.0;
        let cy = self.viewport.height / 2.0;
        let ratio = new / old;

        self.viewport.translate.x = cx - (cx - self.viewport.translate.x) * ratio;
        self.viewport.translate.y = cy - (cy - self.viewport.translate.y) * ratio;
        self.viewport.zoom = new;
    }

    pub fn reset_view(&mut self) {
        self.viewport = Viewport::new(self.viewport.width, self.viewport.height);
    }

    /// Topmost entity under a screen point
    pub fn node_at(&self, screen: Point) -> Option<&Entity> {
        let p = self.viewport.to_layout(screen);
        self.entities
            .iter()
            .zip(self.layout.positions())
            .rev()
            .find(|(e, pos)| pos.distance(p) <= self.highlight.radius(&e.id))
            .map(|(e, _)| e)
    }

    /// Entity to select for a click at `screen`, if any
    pub fn click(&self, screen: Point) -> Option<&Entity> {
        self.node_at(screen)
    }

    /// Pin a node where it stands and warm the layout up
    pub fn begin_drag(&mut self, id: &str) -> bool {
        let Some(index) = self.entities.iter().position(|e| e.id == id) else {
            return false;
        };
        let Some(&at) = self.layout.positions().get(index) else {
            return false;
        };
        self.layout.pin(id, at);
        self.layout.reheat(DRAG_ALPHA_TARGET);
        self.dragging = Some(id.to_string());
        true
    }

    /// Move the dragged node under a screen point
    pub fn drag_to(&mut self, screen: Point) {
        if let Some(id) = &self.dragging {
            let p = self.viewport.to_layout(screen);
            self.layout.pin(id, p);
        }
    }

    /// Release the dragged node and let the layout cool
    pub fn end_drag(&mut self) {
        if let Some(id) = self.dragging.take() {
            self.layout.unpin(&id);
            self.layout.reheat(0.0);
        }
    }

    /// Per-frame layout step
    pub fn tick(&mut self) -> bool {
        self.layout.step()
    }

    /// Stop the simulation when the view goes away
    pub fn teardown(&mut self) {
        self.dragging = None;
        self.layout.stop();
    }
}
