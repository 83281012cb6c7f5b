//! Card list view over the current entities
//!
//! `CardList` keeps a cursor over the result set; `CardListWidget` renders one
//! three-line card per entity. Card actions hand the entity to the explorer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::domain::{Entity, VectorAnalysis};
use crate::explorer::{Effect, Explorer};
use crate::insight::InsightService;
use crate::wikidata::EntityRepository;

use super::graph::Highlight;
use super::theme::Palette;

/// Terminal rows per card
pub const CARD_HEIGHT: u16 = 3;

/// What the user asked to do with a card
#[derive(Debug, Clone, PartialEq)]
pub enum CardAction {
    Select(Entity),
    ToggleComparison(Entity),
}

impl CardAction {
    /// Run the matching explorer transition
    pub fn dispatch<R, I>(self, explorer: &mut Explorer<R, I>) -> Vec<Effect>
    where
        R: EntityRepository + ?Sized,
        I: InsightService + ?Sized,
    {
        match self {
            Self::Select(entity) => explorer.select_entity(entity),
            Self::ToggleComparison(entity) => explorer.toggle_comparison(entity),
        }
    }
}

/// Cursor over the card sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardList {
    cursor: usize,
    len: usize,
}

impl CardList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow a new result length, keeping the cursor in range
    pub fn sync_len(&mut self, len: usize) {
        if len != self.len {
            self.len = len;
            self.cursor = self.cursor.min(len.saturating_sub(1));
        }
    }

    /// Reset the cursor for a fresh result set
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) {
        if self.cursor + 1 < self.len {
            self.cursor += 1;
        }
    }

    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self) {
        self.cursor = self.len.saturating_sub(1);
    }

    /// Move the cursor to `index` if it is in range
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.len {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    /// Entity under the cursor
    pub fn current<'a>(&self, entities: &'a [Entity]) -> Option<&'a Entity> {
        entities.get(self.cursor)
    }

    /// Primary action on the card under the cursor
    pub fn select(&self, entities: &[Entity]) -> Option<CardAction> {
        self.current(entities).cloned().map(CardAction::Select)
    }

    /// Secondary action on the card under the cursor
    pub fn toggle_comparison(&self, entities: &[Entity]) -> Option<CardAction> {
        self.current(entities)
            .cloned()
            .map(CardAction::ToggleComparison)
    }

    /// First visible card when `visible` cards fit on screen
    pub fn offset(&self, visible: usize) -> usize {
        if visible == 0 || self.cursor < visible {
            0
        } else {
            self.cursor + 1 - visible
        }
    }

    /// Card index under terminal `row` of a list drawn in `area`
    pub fn index_at(&self, area: Rect, row: u16) -> Option<usize> {
        if row < area.y || row >= area.y + area.height {
            return None;
        }
        let visible = usize::from(area.height / CARD_HEIGHT);
        let index = self.offset(visible) + usize::from((row - area.y) / CARD_HEIGHT);
        (index < self.len).then_some(index)
    }
}

/// Widget for rendering the card list
pub struct CardListWidget<'a> {
    entities: &'a [Entity],
    list: &'a CardList,
    highlight: Highlight,
    analysis: Option<&'a VectorAnalysis>,
    palette: Palette,
    block: Option<Block<'a>>,
}

impl<'a> CardListWidget<'a> {
    pub fn new(entities: &'a [Entity], list: &'a CardList) -> Self {
        Self {
            entities,
            list,
            highlight: Highlight::default(),
            analysis: None,
            palette: Palette::default(),
            block: None,
        }
    }

    /// Set which entities are selected / compared
    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = highlight;
        self
    }

    /// Tag each card with its semantic cluster
    pub fn analysis(mut self, analysis: Option<&'a VectorAnalysis>) -> Self {
        self.analysis = analysis;
        self
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

    fn card_lines(&self, index: usize, entity: &'a Entity) -> [Line<'a>; 3] {
        let palette = &self.palette;
        let is_cursor = index == self.list.cursor();
        let is_selected = self.highlight.is_selected(&entity.id);
        let is_compared = self.highlight.is_compared(&entity.id);

        let marker = if is_cursor { "▶ " } else { "  " };
        let mut label_style = Style::default().fg(palette.text).add_modifier(Modifier::BOLD);
        if is_selected {
            label_style = label_style.fg(palette.selected);
        }
        if is_cursor {
            label_style = label_style.add_modifier(Modifier::REVERSED);
        }

        let mut title = vec![
            Span::styled(marker, Style::default().fg(palette.selected)),
            Span::styled(entity.label.as_str(), label_style),
        ];
        if entity.has_image() {
            title.push(Span::styled(" ◩", Style::default().fg(palette.muted)));
        }
        if is_selected {
            title.push(Span::styled(" ● selected", Style::default().fg(palette.selected)));
        }
        if is_compared {
            title.push(Span::styled(" ⇄ compare", Style::default().fg(palette.comparison)));
        }

        let description = Line::from(vec![
            Span::raw("  "),
            Span::styled(
                entity.display_description(),
                Style::default().fg(palette.muted),
            ),
        ]);

        let mut meta = vec![
            Span::raw("  "),
            Span::styled(entity.id.as_str(), Style::default().fg(palette.muted)),
        ];
        if let Some(cluster) = self.analysis.and_then(|a| a.cluster_of(&entity.label)) {
            meta.push(Span::styled(
                format!("  #{}", cluster),
                Style::default().fg(palette.comparison),
            ));
        }

        [Line::from(title), description, Line::from(meta)]
    }
}

impl Widget for CardListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let visible = usize::from(inner_area.height / CARD_HEIGHT);
        let offset = self.list.offset(visible);

        let lines: Vec<Line> = self
            .entities
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible.max(1))
            .flat_map(|(i, entity)| self.card_lines(i, entity))
            .collect();

        Paragraph::new(lines).render(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SemanticCluster;

    fn entities(n: usize) -> Vec<Entity> {
        (0..n)
            .map(|i| Entity::new(format!("Q{}", i), format!("item {}", i), ""))
            .collect()
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_cursor_navigation_is_clamped() {
        let mut list = CardList::new();
        list.reset(3);
        list.previous();
        assert_eq!(list.cursor(), 0);
        list.next();
        list.next();
        list.next();
        assert_eq!(list.cursor(), 2);
        list.first();
        assert_eq!(list.cursor(), 0);
        list.last();
        assert_eq!(list.cursor(), 2);
        assert!(!list.select_index(3));
        assert!(list.select_index(1));
    }

    #[test]
    fn test_sync_len_clamps_cursor() {
        let mut list = CardList::new();
        list.reset(10);
        list.last();
        list.sync_len(4);
        assert_eq!(list.cursor(), 3);
        list.sync_len(0);
        assert_eq!(list.cursor(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_actions_carry_current_entity() {
        let items = entities(3);
        let mut list = CardList::new();
        list.reset(items.len());
        list.next();

        assert_eq!(list.select(&items), Some(CardAction::Select(items[1].clone())));
        assert_eq!(
            list.toggle_comparison(&items),
            Some(CardAction::ToggleComparison(items[1].clone()))
        );
        assert_eq!(CardList::new().select(&[]), None);
    }

    #[test]
    fn test_offset_and_hit_testing() {
        let mut list = CardList::new();
        list.reset(10);
        let area = Rect::new(0, 2, 30, 9);

        assert_eq!(list.offset(3), 0);
        assert_eq!(list.index_at(area, 2), Some(0));
        assert_eq!(list.index_at(area, 5), Some(1));
        assert_eq!(list.index_at(area, 1), None);

        list.select_index(7);
        assert_eq!(list.offset(3), 5);
        assert_eq!(list.index_at(area, 2), Some(5));
        assert_eq!(list.index_at(area, 10), Some(7));
    }

    #[test]
    fn test_render_cards_with_badges() {
        let items = vec![
            Entity::new("Q589", "black hole", "region of spacetime")
                .with_image_url("https://commons.example/bh.jpg"),
            Entity::new("Q1", "Universe", ""),
        ];
        let mut list = CardList::new();
        list.reset(items.len());
        let analysis = VectorAnalysis {
            summary: "s".to_string(),
            semantic_clusters: vec![SemanticCluster {
                name: "Cosmology".to_string(),
                entities: vec!["Universe".to_string()],
                description: "d".to_string(),
            }],
            sparql_suggestion: None,
        };
        let highlight = Highlight {
            selected: Some("Q589".to_string()),
            comparison: vec!["Q1".to_string()],
        };

        let area = Rect::new(0, 0, 50, 6);
        let mut buf = Buffer::empty(area);
        CardListWidget::new(&items, &list)
            .highlight(highlight)
            .analysis(Some(&analysis))
            .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("black hole"));
        assert!(text.contains("selected"));
        assert!(text.contains("region of spacetime"));
        assert!(text.contains("Global Knowledge Entity"));
        assert!(text.contains("compare"));
        assert!(text.contains("#Cosmology"));
    }

    #[test]
    fn test_render_scrolls_to_cursor() {
        let items = entities(6);
        let mut list = CardList::new();
        list.reset(items.len());
        list.last();

        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        CardListWidget::new(&items, &list).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("item 5"));
        assert!(text.contains("item 4"));
        assert!(!text.contains("item 0"));
    }
}
