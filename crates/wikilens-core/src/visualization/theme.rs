//! Dark and light colour schemes shared by the widgets

use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;

use crate::error::Error;

/// UI colour theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette::dark(),
            Self::Light => Palette::light(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(Error::InvalidInput(format!(
                "unknown theme '{}', expected 'dark' or 'light'",
                other
            ))),
        }
    }
}

/// Colour scheme for the graph and card widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    /// Headline text
    pub text: Color,
    /// Secondary text (descriptions, ids)
    pub muted: Color,
    /// Selected entity
    pub selected: Color,
    /// Comparison entity
    pub comparison: Color,
    pub edge: Color,
    /// Edges touching the selection
    pub edge_related: Color,
    pub error: Color,
    /// Node colours cycled by list position
    pub nodes: [Color; 6],
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(2, 6, 23),
            text: Color::White,
            muted: Color::Rgb(148, 163, 184),
            selected: Color::Rgb(96, 165, 250),
            comparison: Color::Rgb(167, 139, 250),
            edge: Color::Rgb(30, 41, 59),
            edge_related: Color::Rgb(59, 130, 246),
            error: Color::Rgb(248, 113, 113),
            nodes: [
                Color::Rgb(70, 107, 227),
                Color::Rgb(40, 188, 235),
                Color::Rgb(50, 242, 152),
                Color::Rgb(164, 252, 60),
                Color::Rgb(251, 185, 56),
                Color::Rgb(239, 90, 17),
            ],
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(248, 250, 252),
            text: Color::Rgb(15, 23, 42),
            muted: Color::Rgb(71, 85, 105),
            selected: Color::Rgb(37, 99, 235),
            comparison: Color::Rgb(124, 58, 237),
            edge: Color::Rgb(203, 213, 225),
            edge_related: Color::Rgb(37, 99, 235),
            error: Color::Rgb(220, 38, 38),
            nodes: [
                Color::Rgb(48, 18, 59),
                Color::Rgb(26, 133, 196),
                Color::Rgb(18, 163, 104),
                Color::Rgb(110, 150, 20),
                Color::Rgb(201, 120, 10),
                Color::Rgb(180, 40, 10),
            ],
        }
    }

    /// Colour of the node at `index`
    pub fn node(&self, index: usize) -> Color {
        self.nodes[index % self.nodes.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" Light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle().to_string(), "dark");
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(Theme::Dark.palette(), Theme::Light.palette());
        assert_eq!(Palette::default(), Palette::dark());
    }

    #[test]
    fn test_node_colours_cycle() {
        let palette = Palette::dark();
        assert_eq!(palette.node(0), palette.node(6));
        assert_ne!(palette.node(0), palette.node(1));
    }
}
