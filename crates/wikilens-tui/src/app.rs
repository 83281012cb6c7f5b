//! Application state for the terminal front end
//!
//! `App` wraps the explorer together with the view state that only the
//! terminal cares about: focus, the search input, the graph viewport and the
//! card cursor. Input handlers return the explorer effects the event loop has
//! to run.

use std::sync::Arc;

use async_trait::async_trait;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use wikilens_core::config::Config;
use wikilens_core::domain::{ComparisonResult, Entity, EntityInsight, VectorAnalysis};
use wikilens_core::error::{Error, Result};
use wikilens_core::explorer::{Effect, Explorer, Outcome};
use wikilens_core::insight::InsightService;
use wikilens_core::visualization::{
    CardList, GraphView, Point, Theme, cell_to_screen, cells_to_delta,
};
use wikilens_core::wikidata::EntityRepository;

/// Explorer over boxed clients
pub type DynExplorer = Explorer<dyn EntityRepository, dyn InsightService>;

/// Layout units the arrow keys pan by
pub const PAN_STEP: f64 = 40.0;

/// Zoom factor per key press or wheel notch
pub const ZOOM_STEP: f64 = 1.2;

/// Which panel receives key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Cards,
    Graph,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::Search => Self::Cards,
            Self::Cards => Self::Graph,
            Self::Graph => Self::Search,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Search => Self::Graph,
            Self::Cards => Self::Search,
            Self::Graph => Self::Cards,
        }
    }
}

/// Screen rectangles from the last draw, used for mouse hit-testing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelAreas {
    pub search: Rect,
    pub cards: Rect,
    pub graph: Rect,
    pub detail: Rect,
}

/// Mouse gesture in progress over the graph
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Node { id: String, moved: bool },
    Pan { column: u16, row: u16 },
}

/// Insight service used when no API key is configured
///
/// Every call fails with `ApiKeyMissing`, so the explorer degrades the same
/// way it does when the service is down.
#[derive(Debug, Default)]
pub struct UnconfiguredInsight;

#[async_trait]
impl InsightService for UnconfiguredInsight {
    async fn analyze_corpus(&self, _query: &str, _entities: &[Entity]) -> Result<VectorAnalysis> {
        Err(Error::ApiKeyMissing)
    }

    async fn get_insight(&self, _entity: &Entity) -> Result<EntityInsight> {
        Err(Error::ApiKeyMissing)
    }

    async fn compare_entities(&self, _a: &Entity, _b: &Entity) -> Result<ComparisonResult> {
        Err(Error::ApiKeyMissing)
    }
}

pub struct App {
    pub explorer: DynExplorer,
    pub graph: GraphView,
    pub cards: CardList,
    pub theme: Theme,
    pub focus: Focus,
    pub input: String,
    pub show_labels: bool,
    pub detail_scroll: u16,
    pub areas: PanelAreas,
    pub insight_configured: bool,
    pub should_quit: bool,
    gesture: Option<Gesture>,
}

impl App {
    pub fn new(
        repository: Arc<dyn EntityRepository>,
        insight: Arc<dyn InsightService>,
        config: &Config,
        theme: Theme,
    ) -> Self {
        Self {
            explorer: Explorer::new(repository, insight),
            graph: GraphView::from_config(&config.graph),
            cards: CardList::new(),
            theme,
            focus: Focus::Search,
            input: String::new(),
            show_labels: true,
            detail_scroll: 0,
            areas: PanelAreas::default(),
            insight_configured: true,
            should_quit: false,
            gesture: None,
        }
    }

    /// Mark the insight service as the unconfigured placeholder
    pub fn without_insight(mut self) -> Self {
        self.insight_configured = false;
        self
    }

    /// Start a search for `query` and move focus to the results
    pub fn search(&mut self, query: &str) -> Vec<Effect> {
        self.input = query.trim().to_string();
        let effects = self.explorer.submit_search(query);
        if !effects.is_empty() {
            self.focus = Focus::Cards;
            self.detail_scroll = 0;
            self.sync();
        }
        effects
    }

    /// Fold an outcome into the explorer and refresh the views
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        let effects = self.explorer.apply(outcome);
        self.sync();
        effects
    }

    /// Bring the graph and card list in line with the explorer state
    pub fn sync(&mut self) {
        let state = self.explorer.state();
        let changed = self.graph.entities().len() != state.entities.len()
            || self
                .graph
                .entities()
                .iter()
                .zip(&state.entities)
                .any(|(a, b)| a.id != b.id);

        if changed {
            self.cards.reset(state.entities.len());
        } else {
            self.cards.sync_len(state.entities.len());
        }
        self.graph.sync(state);
    }

    fn select(&mut self, entity: Entity) -> Vec<Effect> {
        self.detail_scroll = 0;
        let effects = self.explorer.select_entity(entity);
        self.sync();
        effects
    }

    fn toggle_comparison(&mut self, entity: Entity) -> Vec<Effect> {
        let effects = self.explorer.toggle_comparison(entity);
        self.sync();
        effects
    }

    fn select_current(&mut self) -> Vec<Effect> {
        match self.cards.select(&self.explorer.state().entities) {
            Some(action) => {
                self.detail_scroll = 0;
                let effects = action.dispatch(&mut self.explorer);
                self.sync();
                effects
            }
            None => Vec::new(),
        }
    }

    fn toggle_current(&mut self) -> Vec<Effect> {
        match self.cards.toggle_comparison(&self.explorer.state().entities) {
            Some(action) => {
                let effects = action.dispatch(&mut self.explorer);
                self.sync();
                effects
            }
            None => Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.explorer.clear_results();
        self.input.clear();
        self.detail_scroll = 0;
        self.focus = Focus::Search;
        self.graph.reset_view();
        self.sync();
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return Vec::new();
            }
            KeyCode::PageDown => {
                self.detail_scroll = self.detail_scroll.saturating_add(5);
                return Vec::new();
            }
            KeyCode::PageUp => {
                self.detail_scroll = self.detail_scroll.saturating_sub(5);
                return Vec::new();
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Cards => self.handle_cards_key(key),
            Focus::Graph => self.handle_graph_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Enter => {
                let query = self.input.clone();
                self.search(&query)
            }
            KeyCode::Esc => {
                if self.explorer.state().has_results() {
                    self.focus = Focus::Cards;
                } else {
                    self.input.clear();
                }
                Vec::new()
            }
            KeyCode::Backspace => {
                self.input.pop();
                Vec::new()
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Keys shared by the cards and graph panels
    fn handle_common_key(&mut self, key: KeyEvent) -> Option<Vec<Effect>> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') | KeyCode::Esc => self.focus = Focus::Search,
            KeyCode::Char('t') => self.theme = self.theme.toggle(),
            KeyCode::Char('x') => self.clear(),
            KeyCode::Enter => return Some(self.select_current()),
            KeyCode::Char('c') => return Some(self.toggle_current()),
            _ => return None,
        }
        Some(Vec::new())
    }

    fn handle_cards_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if let Some(effects) = self.handle_common_key(key) {
            return effects;
        }
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.cards.next(),
            KeyCode::Up | KeyCode::Char('k') => self.cards.previous(),
            KeyCode::Home | KeyCode::Char('g') => self.cards.first(),
            KeyCode::End | KeyCode::Char('G') => self.cards.last(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_graph_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if let Some(effects) = self.handle_common_key(key) {
            return effects;
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.graph.pan(PAN_STEP, 0.0),
            KeyCode::Right | KeyCode::Char('l') => self.graph.pan(-PAN_STEP, 0.0),
            KeyCode::Up | KeyCode::Char('k') => self.graph.pan(0.0, PAN_STEP),
            KeyCode::Down | KeyCode::Char('j') => self.graph.pan(0.0, -PAN_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.graph.zoom_by(ZOOM_STEP),
            KeyCode::Char('-') => self.graph.zoom_by(1.0 / ZOOM_STEP),
            KeyCode::Char('0') => self.graph.reset_view(),
            KeyCode::Char('L') => self.show_labels = !self.show_labels,
            KeyCode::Char('n') => self.cards.next(),
            KeyCode::Char('p') => self.cards.previous(),
            _ => {}
        }
        Vec::new()
    }

    /// Handle a mouse event against the panel areas of the last draw
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Effect> {
        let at = (mouse.column, mouse.row);
        if contains(self.areas.graph, at) || self.gesture.is_some() {
            return self.handle_graph_mouse(mouse);
        }
        if contains(self.areas.cards, at) {
            return self.handle_cards_mouse(mouse);
        }
        if contains(self.areas.search, at) && matches!(mouse.kind, MouseEventKind::Down(_)) {
            self.focus = Focus::Search;
        }
        if contains(self.areas.detail, at) {
            match mouse.kind {
                MouseEventKind::ScrollDown => {
                    self.detail_scroll = self.detail_scroll.saturating_add(1)
                }
                MouseEventKind::ScrollUp => {
                    self.detail_scroll = self.detail_scroll.saturating_sub(1)
                }
                _ => {}
            }
        }
        Vec::new()
    }

    fn handle_cards_mouse(&mut self, mouse: MouseEvent) -> Vec<Effect> {
        let inner = inner(self.areas.cards);
        match mouse.kind {
            MouseEventKind::ScrollDown => self.cards.next(),
            MouseEventKind::ScrollUp => self.cards.previous(),
            MouseEventKind::Down(button) => {
                self.focus = Focus::Cards;
                let Some(index) = self.cards.index_at(inner, mouse.row) else {
                    return Vec::new();
                };
                self.cards.select_index(index);
                return match button {
                    MouseButton::Left => self.select_current(),
                    MouseButton::Right => self.toggle_current(),
                    MouseButton::Middle => Vec::new(),
                };
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_graph_mouse(&mut self, mouse: MouseEvent) -> Vec<Effect> {
        let canvas = inner(self.areas.graph);
        let viewport = *self.graph.viewport();
        let screen = cell_to_screen(canvas, &viewport, mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::ScrollUp => self.graph.zoom_by(ZOOM_STEP),
            MouseEventKind::ScrollDown => self.graph.zoom_by(1.0 / ZOOM_STEP),
            MouseEventKind::Down(MouseButton::Left) => {
                self.focus = Focus::Graph;
                let hit = screen
                    .and_then(|p| self.graph.node_at(p))
                    .map(|e| e.id.clone());
                self.gesture = Some(match hit {
                    Some(id) => {
                        self.graph.begin_drag(&id);
                        Gesture::Node { id, moved: false }
                    }
                    None => Gesture::Pan {
                        column: mouse.column,
                        row: mouse.row,
                    },
                });
            }
            MouseEventKind::Down(MouseButton::Right) => {
                let hit = screen.and_then(|p| self.graph.node_at(p)).cloned();
                if let Some(entity) = hit {
                    return self.toggle_comparison(entity);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => match self.gesture.as_mut() {
                Some(Gesture::Node { moved, .. }) => {
                    *moved = true;
                    if let Some(p) = screen {
                        self.graph.drag_to(p);
                    }
                }
                Some(Gesture::Pan { column, row }) => {
                    let (dx, dy) = cells_to_delta(
                        canvas,
                        &viewport,
                        i32::from(mouse.column) - i32::from(*column),
                        i32::from(mouse.row) - i32::from(*row),
                    );
                    *column = mouse.column;
                    *row = mouse.row;
                    self.graph.pan(dx, dy);
                }
                None => {}
            },
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(Gesture::Node { id, moved }) = self.gesture.take() {
                    self.graph.end_drag();
                    if !moved {
                        return self.click_node(&id, screen);
                    }
                }
            }
            _ => {}
        }
        Vec::new()
    }

    /// A press and release on the same node selects it
    fn click_node(&mut self, id: &str, screen: Option<Point>) -> Vec<Effect> {
        let entity = screen
            .and_then(|p| self.graph.click(p))
            .filter(|e| e.id == id)
            .cloned()
            .or_else(|| self.graph.entities().iter().find(|e| e.id == id).cloned());

        match entity {
            Some(entity) => {
                let entities = &self.explorer.state().entities;
                if let Some(index) = entities.iter().position(|e| e.id == entity.id) {
                    self.cards.select_index(index);
                }
                self.select(entity)
            }
            None => Vec::new(),
        }
    }

    /// Stop background work before exit
    pub fn teardown(&mut self) {
        self.gesture = None;
        self.graph.teardown();
    }
}

fn contains(area: Rect, (column, row): (u16, u16)) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

/// Area inside a one-cell border
pub fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}
