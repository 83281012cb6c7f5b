//! Ratatui widget for the force-directed entity graph
//!
//! Renders a `GraphView` on a braille canvas. The canvas spans the view's
//! screen space, so terminal cells map back to view coordinates through
//! `cell_to_screen` for mouse hit-testing.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        Block, Paragraph, Widget, Wrap,
        canvas::{Canvas, Circle, Line as Segment},
    },
};

use super::graph::{GraphView, Viewport};
use super::layout::{GraphLayout, Point};
use super::theme::Palette;

/// Shown when there is nothing to draw
pub const IDLE_HINT: &str = "System idle. Enter a query to map the knowledge graph.";

/// Widget for rendering a `GraphView`
pub struct GraphWidget<'a, L> {
    view: &'a GraphView<L>,
    palette: Palette,
    block: Option<Block<'a>>,
    show_labels: bool,
}

impl<'a, L: GraphLayout> GraphWidget<'a, L> {
    pub fn new(view: &'a GraphView<L>) -> Self {
        Self {
            view,
            palette: Palette::default(),
            block: None,
            show_labels: true,
        }
    }

    /// Set the colour scheme
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the block (border/title)
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Show or hide node labels
    pub fn show_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }
}

impl<L: GraphLayout> Widget for GraphWidget<'_, L> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if self.view.entities().is_empty() {
            Paragraph::new(IDLE_HINT)
                .style(Style::default().fg(self.palette.muted))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(inner_area, buf);
            return;
        }

        let view = self.view;
        let palette = &self.palette;
        let show_labels = self.show_labels;
        let viewport = *view.viewport();
        let height = viewport.height;
        let highlight = view.highlight();

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(palette.background)
            .x_bounds([0.0, viewport.width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                // Canvas y grows upward
                for (edge, a, b) in view.segments() {
                    let color = if view.is_related(edge) {
                        palette.edge_related
                    } else {
                        palette.edge
                    };
                    ctx.draw(&Segment::new(a.x, height - a.y, b.x, height - b.y, color));
                }

                ctx.layer();
                for (i, (entity, p)) in view.nodes().enumerate() {
                    let color = if highlight.is_selected(&entity.id) {
                        palette.selected
                    } else if highlight.is_compared(&entity.id) {
                        palette.comparison
                    } else {
                        palette.node(i)
                    };
                    ctx.draw(&Circle {
                        x: p.x,
                        y: height - p.y,
                        radius: highlight.radius(&entity.id) * viewport.zoom,
                        color,
                    });
                }

                if !show_labels {
                    return;
                }
                ctx.layer();
                for (entity, p) in view.nodes() {
                    let emphasised =
                        highlight.is_selected(&entity.id) || highlight.is_compared(&entity.id);
                    let style = if highlight.is_selected(&entity.id) {
                        Style::default()
                            .fg(palette.selected)
                            .add_modifier(Modifier::BOLD)
                    } else if emphasised {
                        Style::default().fg(palette.comparison)
                    } else {
                        Style::default().fg(palette.muted)
                    };
                    let offset = (highlight.radius(&entity.id) + 6.0) * viewport.zoom;
                    ctx.print(
                        p.x + offset,
                        height - p.y,
                        Line::styled(entity.label.clone(), style),
                    );
                }
            });

        canvas.render(inner_area, buf);
    }
}

/// View-space point at the centre of terminal cell (`column`, `row`)
///
/// `area` is the rectangle the canvas was drawn in. Returns `None` for cells
/// outside it.
pub fn cell_to_screen(area: Rect, viewport: &Viewport, column: u16, row: u16) -> Option<Point> {
    if area.width == 0
        || area.height == 0
        || column < area.x
        || row < area.y
        || column >= area.x + area.width
        || row >= area.y + area.height
    {
        return None;
    }
    let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
    let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
    Some(Point::new(fx * viewport.width, fy * viewport.height))
}

/// View-space distance covered by moving `columns` x `rows` cells
pub fn cells_to_delta(area: Rect, viewport: &Viewport, columns: i32, rows: i32) -> (f64, f64) {
    if area.width == 0 || area.height == 0 {
        return (0.0, 0.0);
    }
    (
        f64::from(columns) * viewport.width / f64::from(area.width),
        f64::from(rows) * viewport.height / f64::from(area.height),
    )
}
