//! Frame layout and panel rendering

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use wikilens_core::explorer::ExplorerState;
use wikilens_core::visualization::{CardListWidget, GraphWidget, Highlight, Palette};

use crate::app::{App, Focus, PanelAreas};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let palette = app.theme.palette();
    let has_error = app.explorer.state().error.is_some();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                             // Search
            Constraint::Length(if has_error { 1 } else { 0 }), // Error banner
            Constraint::Min(10),                               // Main content
            Constraint::Length(1),                             // Footer
        ])
        .split(frame.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30), // Cards
            Constraint::Percentage(42), // Graph
            Constraint::Percentage(28), // Detail
        ])
        .split(chunks[2]);

    app.areas = PanelAreas {
        search: chunks[0],
        cards: main_chunks[0],
        graph: main_chunks[1],
        detail: main_chunks[2],
    };

    draw_search(frame, app, &palette, chunks[0]);
    if let Some(error) = &app.explorer.state().error {
        let banner = Paragraph::new(format!(" ! {}", error))
            .style(Style::default().fg(palette.error).add_modifier(Modifier::BOLD));
        frame.render_widget(banner, chunks[1]);
    }
    draw_cards(frame, app, &palette, main_chunks[0]);
    draw_graph(frame, app, &palette, main_chunks[1]);
    draw_detail(frame, app, &palette, main_chunks[2]);
    draw_footer(frame, app, &palette, chunks[3]);
}

fn panel<'a>(title: &'a str, focused: bool, palette: &Palette) -> Block<'a> {
    let border = if focused { palette.selected } else { palette.muted };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn draw_search(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let state = app.explorer.state();
    let focused = app.focus == Focus::Search;

    let status = if state.loading {
        " Mapping knowledge graph... ".to_string()
    } else if state.has_results() {
        format!(" {} entities ", state.entities.len())
    } else {
        String::new()
    };

    let block = panel(" Search Wikidata ", focused, palette)
        .title(Line::from(status).right_aligned());

    let content = if app.input.is_empty() && !focused {
        Line::styled(
            "Press / and type a concept, e.g. black hole",
            Style::default().fg(palette.muted),
        )
    } else {
        Line::from(vec![
            Span::styled("› ", Style::default().fg(palette.selected)),
            Span::styled(app.input.as_str(), Style::default().fg(palette.text)),
        ])
    };
    frame.render_widget(Paragraph::new(content).block(block), area);

    if focused {
        let offset = u16::try_from(app.input.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(3).saturating_add(offset);
        if x < area.x + area.width.saturating_sub(1) {
            frame.set_cursor_position((x, area.y + 1));
        }
    }
}

fn draw_cards(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let state = app.explorer.state();
    let block = panel(" Entities ", app.focus == Focus::Cards, palette);

    if state.entities.is_empty() {
        let hint = if state.loading {
            "Searching..."
        } else {
            "No entities yet."
        };
        let empty = Paragraph::new(hint)
            .style(Style::default().fg(palette.muted))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let widget = CardListWidget::new(&state.entities, &app.cards)
        .highlight(Highlight::from_state(state))
        .analysis(state.analysis.as_ref())
        .palette(*palette)
        .block(block);
    frame.render_widget(widget, area);
}

fn draw_graph(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let zoom = format!(" {:.0}% ", app.graph.zoom() * 100.0);
    let block = panel(" Knowledge Graph ", app.focus == Focus::Graph, palette)
        .title(Line::from(zoom).right_aligned());

    let widget = GraphWidget::new(&app.graph)
        .palette(*palette)
        .show_labels(app.show_labels)
        .block(block);
    frame.render_widget(widget, area);
}

fn draw_detail(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let lines = detail_lines(app.explorer.state(), palette, app.insight_configured);
    let detail = Paragraph::new(lines)
        .block(panel(" Insight ", false, palette))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(detail, area);
}

fn heading(text: &str, palette: &Palette) -> Line<'static> {
    Line::styled(
        text.to_string(),
        Style::default().fg(palette.selected).add_modifier(Modifier::BOLD),
    )
}

fn muted(text: impl Into<String>, palette: &Palette) -> Line<'static> {
    Line::styled(text.into(), Style::default().fg(palette.muted))
}

/// Text of the insight panel: selection, comparison, then corpus analysis
pub fn detail_lines(
    state: &ExplorerState,
    palette: &Palette,
    insight_configured: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if !insight_configured {
        lines.push(Line::styled(
            "AI insight disabled: set GEMINI_API_KEY".to_string(),
            Style::default().fg(palette.error),
        ));
        lines.push(Line::default());
    }

    match &state.selected_entity {
        Some(entity) => {
            lines.push(heading(&entity.label, palette));
            lines.push(muted(format!("{} · {}", entity.id, entity.entity_type), palette));
            lines.push(Line::from(entity.display_description().to_string()));
            lines.push(muted(entity.wikidata_url(), palette));
            lines.push(Line::default());

            match &state.insight {
                Some(insight) => {
                    for paragraph in insight.text.lines() {
                        lines.push(Line::from(paragraph.to_string()));
                    }
                    let sources: Vec<_> = insight.sources().collect();
                    if !sources.is_empty() {
                        lines.push(Line::default());
                        lines.push(heading("Sources", palette));
                        for source in sources {
                            let title = if source.title.is_empty() {
                                source.uri.clone()
                            } else {
                                source.title.clone()
                            };
                            lines.push(Line::from(format!("• {}", title)));
                            lines.push(muted(format!("  {}", source.uri), palette));
                        }
                    }
                }
                None => lines.push(muted("Synthesizing contextual insight...", palette)),
            }
        }
        None => lines.push(muted("Select an entity to see its AI profile.", palette)),
    }

    if let Some(other) = &state.comparison_entity {
        lines.push(Line::default());
        lines.push(Line::styled(
            format!("⇄ Comparing with {}", other.label),
            Style::default().fg(palette.comparison).add_modifier(Modifier::BOLD),
        ));
        match (&state.comparison_result, &state.selected_entity) {
            (Some(result), _) => {
                for (label, value) in [
                    ("Common ground", &result.common_ground),
                    ("Divergence", &result.divergence),
                    ("Semantic distance", &result.semantic_distance),
                    ("Influence", &result.influence),
                ] {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("{}: ", label),
                            Style::default().fg(palette.comparison),
                        ),
                        Span::raw(value.clone()),
                    ]));
                }
            }
            (None, Some(selected)) if selected.id != other.id => {
                lines.push(muted("Computing semantic bridge...", palette));
            }
            (None, _) => lines.push(muted("Select another entity to compare.", palette)),
        }
    }

    if let Some(analysis) = &state.analysis {
        lines.push(Line::default());
        lines.push(heading("Corpus analysis", palette));
        lines.push(Line::from(analysis.summary.clone()));
        for cluster in &analysis.semantic_clusters {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("#{} ", cluster.name),
                    Style::default().fg(palette.comparison),
                ),
                Span::styled(cluster.entities.join(", "), Style::default().fg(palette.muted)),
            ]));
            if !cluster.description.is_empty() {
                lines.push(muted(format!("  {}", cluster.description), palette));
            }
        }
        if let Some(sparql) = &analysis.sparql_suggestion {
            lines.push(Line::default());
            lines.push(heading("SPARQL", palette));
            for line in sparql.lines() {
                lines.push(muted(line.to_string(), palette));
            }
        }
    }

    lines
}

fn draw_footer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let hints = match app.focus {
        Focus::Search => "Enter: Search | Esc: Results | Tab: Focus | Ctrl-C: Quit",
        Focus::Cards => {
            "j/k: Move | Enter: Select | c: Compare | /: Search | x: Clear | t: Theme | Tab: Focus | q: Quit"
        }
        Focus::Graph => {
            "Arrows: Pan | +/-: Zoom | 0: Reset | L: Labels | n/p: Cursor | Enter: Select | c: Compare | q: Quit"
        }
    };
    let footer = Paragraph::new(format!(" {}  [{}]", hints, app.theme))
        .style(Style::default().fg(palette.muted));
    frame.render_widget(footer, area);
}
