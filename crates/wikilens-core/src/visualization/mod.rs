//! Entity Visualization Module
//!
//! Views over the explorer's result set, rendered with ratatui.
//!
//! # Features
//!
//! - **Graph View**: force-directed node-link diagram with pan, zoom, drag and click
//! - **Card List View**: scrollable cards with select / compare actions
//! - **Layout Seam**: `GraphLayout` keeps the placement algorithm substitutable
//! - **Themes**: dark and light palettes shared by both widgets
//!
//! # Example
//!
//! ```ignore
//! use wikilens_core::visualization::{GraphView, GraphWidget, Highlight};
//!
//! let mut view = GraphView::default();
//! view.sync(explorer.state());
//!
//! // Each frame:
//! view.tick();
//! frame.render_widget(GraphWidget::new(&view).palette(theme.palette()), area);
//! ```

mod cards;
mod graph;
mod layout;
mod theme;
mod widget;

pub use cards::{CARD_HEIGHT, CardAction, CardList, CardListWidget};
pub use graph::{
    COMPARISON_RADIUS, DRAG_ALPHA_TARGET, GraphView, Highlight, MAX_ZOOM, MIN_ZOOM,
    NEIGHBOR_LINKS, NODE_RADIUS, SELECTED_RADIUS, Viewport, synthetic_edges,
};
pub use layout::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Edge, ForceLayout, ForceParams, GraphLayout, Point};
pub use theme::{Palette, Theme};
pub use widget::{GraphWidget, IDLE_HINT, cell_to_screen, cells_to_delta};
