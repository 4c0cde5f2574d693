//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

use crate::model::ResourceKind;

/// Dashboard color palette.
pub struct Theme;

impl Theme {
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Metrics colors
    pub const CPU_COLOR: Color = Color::Cyan;
    pub const MEM_COLOR: Color = Color::Magenta;
    pub const DISK_COLOR: Color = Color::Yellow;

    pub const KEY_COLOR: Color = Color::Yellow;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Border and title style for a resource row.
    pub fn border(color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Text of a row with a fresh reading.
    pub fn value() -> Style {
        Style::default().fg(Theme::FG)
    }

    /// Text of a row that is empty or stale.
    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Key names in the hint line.
    pub fn key() -> Style {
        Style::default().fg(Theme::KEY_COLOR)
    }
}

/// Accent color for a resource row.
pub fn kind_color(kind: ResourceKind) -> Color {
    match kind {
        ResourceKind::Cpu => Theme::CPU_COLOR,
        ResourceKind::Memory => Theme::MEM_COLOR,
        ResourceKind::Disk => Theme::DISK_COLOR,
    }
}
