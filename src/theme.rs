//! Theme system for the terminal front-end.
//!
//! Semantic color roles resolved to ratatui `Style`s. `ThemeVariant` selects
//! the dark or light palette.

use ratatui::style::{Color, Modifier, Style};

use crate::catalog::VideoTag;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Name as stored in preferences.
    pub fn key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Chrome --
    pub header: Style,
    pub header_user: Style,
    pub status_bar: Style,
    pub status_error: Style,
    pub border: Style,
    pub dim: Style,

    // -- Category tabs --
    pub tab: Style,
    pub tab_active: Style,
    pub tab_highlight: Style,

    // -- Feed --
    pub section_title: Style,
    pub section_description: Style,
    pub card: Style,
    pub card_title: Style,
    pub featured: Style,
    pub featured_label: Style,
    pub tag_hot: Style,
    pub tag_new: Style,
    pub tag_picks: Style,

    // -- Overlays --
    pub modal_border: Style,
    pub accent: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            header_user: Style::default().fg(Color::Cyan),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().bg(Color::Red).fg(Color::White),
            border: Style::default().fg(Color::DarkGray),
            dim: Style::default().fg(Color::DarkGray),

            tab: Style::default().fg(Color::Gray),
            tab_active: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            tab_highlight: Style::default().fg(Color::Cyan),

            section_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            section_description: Style::default().fg(Color::Gray),
            card: Style::default().bg(Color::Rgb(30, 30, 36)).fg(Color::Gray),
            card_title: Style::default().fg(Color::White),
            featured: Style::default().bg(Color::Rgb(24, 40, 64)).fg(Color::White),
            featured_label: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            tag_hot: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            tag_new: Style::default().fg(Color::Black).bg(Color::Green),
            tag_picks: Style::default().fg(Color::Black).bg(Color::Cyan),

            modal_border: Style::default().fg(Color::Cyan),
            accent: Style::default().fg(Color::Yellow),
        }
    }

    fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            header_user: Style::default().fg(Color::Blue),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_error: Style::default().bg(Color::Red).fg(Color::White),
            border: Style::default().fg(Color::Gray),
            dim: Style::default().fg(Color::DarkGray),

            tab: Style::default().fg(Color::DarkGray),
            tab_active: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            tab_highlight: Style::default().fg(Color::Blue),

            section_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            section_description: Style::default().fg(Color::DarkGray),
            card: Style::default().bg(Color::Rgb(235, 235, 240)).fg(Color::DarkGray),
            card_title: Style::default().fg(Color::Black),
            featured: Style::default().bg(Color::Rgb(210, 225, 245)).fg(Color::Black),
            featured_label: Style::default()
                .fg(Color::White)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            tag_hot: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            tag_new: Style::default().fg(Color::White).bg(Color::Green),
            tag_picks: Style::default().fg(Color::White).bg(Color::Blue),

            modal_border: Style::default().fg(Color::Blue),
            accent: Style::default().fg(Color::Magenta),
        }
    }

    pub fn tag(&self, tag: VideoTag) -> Style {
        match tag {
            VideoTag::Hot => self.tag_hot,
            VideoTag::New => self.tag_new,
            VideoTag::Recommended => self.tag_picks,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("DARK"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("light"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name("solarized"), None);
    }

    #[test]
    fn test_cycle_round_trips() {
        let v = ThemeVariant::Dark;
        assert_eq!(v.next(), ThemeVariant::Light);
        assert_eq!(v.next().next(), v);
    }

    #[test]
    fn test_key_parses_back() {
        for v in [ThemeVariant::Dark, ThemeVariant::Light] {
            assert_eq!(ThemeVariant::from_str_name(v.key()), Some(v));
        }
    }

    #[test]
    fn test_palettes_differ() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.header, light.header);
        assert_ne!(dark.tag(VideoTag::New), dark.tag(VideoTag::Hot));
    }
}
