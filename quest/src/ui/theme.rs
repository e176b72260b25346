//! Color theme and styling for the quest TUI.
//!
//! The theme is an immutable value handed to the presentation layer at
//! construction. It carries no behavior the engine can see; the core
//! never learns it exists.

use ratatui::style::{Color, Modifier, Style};

/// Game UI color theme
#[derive(Debug, Clone)]
pub struct QuestTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub accent: Color,

    // Stat colors
    pub health: Color,
    pub gold: Color,

    // Text colors
    pub story_text: Color,
    pub choice_key: Color,
    pub system_text: Color,
}

impl Default for QuestTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            accent: Color::LightBlue,

            health: Color::Green,
            gold: Color::Yellow,

            story_text: Color::White,
            choice_key: Color::LightBlue,
            system_text: Color::DarkGray,
        }
    }
}

impl QuestTheme {
    /// Style for story narration
    pub fn story_style(&self) -> Style {
        Style::default().fg(self.story_text)
    }

    /// Style for the numeric key of a choice
    pub fn choice_key_style(&self) -> Style {
        Style::default()
            .fg(self.choice_key)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for choice labels
    pub fn choice_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    /// Style for health, dimming toward red as it drains
    pub fn health_style(&self, health: i32) -> Style {
        let color = if health > 50 {
            self.health
        } else if health > 20 {
            Color::Yellow
        } else {
            Color::Red
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Style for the gold counter
    pub fn gold_style(&self) -> Style {
        Style::default().fg(self.gold).add_modifier(Modifier::BOLD)
    }

    /// Style for system/status messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Style for the loading line
    pub fn loading_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Border style
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Title style
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}
