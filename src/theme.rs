//! UI colors, optionally read from a kitty.conf-style color file

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Focused field, active tab
    pub danger: Color,      // Field and general errors
    pub success: Color,     // Status line notices
    pub text: Color,        // Field values
    pub text_dim: Color,    // Labels, hints, empty states
    pub bg_selected: Color, // Selected list row
    pub inactive: Color,    // Unfocused borders
    pub header: Color,      // Headings
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(137, 180, 250),
        }
    }
}

impl Theme {
    /// Load from `path` when given and readable, defaults otherwise
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match fs::read_to_string(path) {
                Ok(content) => Self::from_kitty_conf(&content),
                Err(e) => {
                    tracing::warn!("Could not read theme file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Map kitty color slots onto the theme, keeping defaults for missing ones
    pub fn from_kitty_conf(content: &str) -> Self {
        let colors = parse_kitty_conf(content);
        let base = Self::default();
        let pick = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|k| colors.get(*k))
                .copied()
                .unwrap_or(fallback)
        };

        Self {
            accent: pick(&["color3", "color11"], base.accent),
            danger: pick(&["color1", "color9"], base.danger),
            success: pick(&["color2", "color10"], base.success),
            text: pick(&["foreground"], base.text),
            text_dim: pick(&["color8"], base.text_dim),
            bg_selected: pick(&["selection_background", "color0"], base.bg_selected),
            inactive: pick(&["inactive_border_color", "color8"], base.inactive),
            header: pick(&["color4", "color12"], base.header),
        }
    }
}

/// Parse `key #rrggbb` lines, skipping comments and non-color values
fn parse_kitty_conf(content: &str) -> HashMap<String, Color> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once(char::is_whitespace)?;
            Some((key.to_string(), parse_hex_color(value)?))
        })
        .collect()
}

/// `#RRGGBB` or `#RGB`
fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return None;
    }
    let channel = |hex: &str| u8::from_str_radix(hex, 16).ok();

    match s.len() {
        6 => Some(Color::Rgb(channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?)),
        3 => Some(Color::Rgb(
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        )),
        _ => None,
    }
}
