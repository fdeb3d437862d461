//! Visual attributes shared by every named domain object.
//!
//! # Responsibility
//! - Define color, font and icon values plus their deterministic mixing rules.
//! - Map icon names between their leaf and "has children" shapes.
//!
//! # Invariants
//! - Mixing is order-independent for colors and fonts.
//! - Unset attributes are `None` (colors/fonts) or the empty string (icons).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// RGBA color; channels are 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

/// Error for color strings that are not `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl Display for ColorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid color literal: {}", self.0)
    }
}

impl Error for ColorParseError {}

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 255)
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// `#RRGGBB`, with the alpha byte appended only when not opaque.
    pub fn to_hex(self) -> String {
        if self.alpha == 255 {
            format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }

    pub fn from_hex(literal: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError(literal.to_string());
        let digits = literal.strip_prefix('#').ok_or_else(invalid)?;
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |index: usize| {
            u8::from_str_radix(&digits[index..index + 2], 16).map_err(|_| invalid())
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Componentwise mean (rounded down) of `colors`.
    pub fn mix(colors: &[Color]) -> Option<Color> {
        if colors.is_empty() {
            return None;
        }
        let count = colors.len() as u32;
        let mean = |pick: fn(&Color) -> u8| {
            let total: u32 = colors.iter().map(|color| u32::from(pick(color))).sum();
            (total / count) as u8
        };
        Some(Color::rgba(
            mean(|c| c.red),
            mean(|c| c.green),
            mean(|c| c.blue),
            mean(|c| c.alpha),
        ))
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::rgb(red, green, blue)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((red, green, blue, alpha): (u8, u8, u8, u8)) -> Self {
        Self::rgba(red, green, blue, alpha)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Font description; an empty family means "platform default".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    pub point_size: u32,
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub underline: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            point_size: 10,
            family: String::new(),
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            underline: false,
        }
    }
}

impl Font {
    pub fn new(point_size: u32) -> Self {
        Self {
            point_size,
            ..Self::default()
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Blends several fonts into one.
    ///
    /// - point size: mean, rounded down
    /// - weight: unique majority, otherwise `Normal`
    /// - style: italic if any font is italic
    /// - underline: set if any font is underlined
    /// - family: most frequent non-empty family, first seen on ties
    pub fn mix(fonts: &[Font]) -> Option<Font> {
        match fonts {
            [] => return None,
            [single] => return Some(single.clone()),
            _ => {}
        }
        let total: u32 = fonts.iter().map(|font| font.point_size).sum();
        let point_size = total / fonts.len() as u32;

        let mut weight_votes = [
            (FontWeight::Light, 0usize),
            (FontWeight::Normal, 0),
            (FontWeight::Bold, 0),
        ];
        for font in fonts {
            if let Some(slot) = weight_votes.iter_mut().find(|(w, _)| *w == font.weight) {
                slot.1 += 1;
            }
        }
        let top = weight_votes.iter().map(|(_, votes)| *votes).max().unwrap_or(0);
        let leaders: Vec<FontWeight> = weight_votes
            .iter()
            .filter(|(_, votes)| *votes == top)
            .map(|(weight, _)| *weight)
            .collect();
        let weight = match leaders.as_slice() {
            [only] => *only,
            _ => FontWeight::Normal,
        };

        let mut family_votes: Vec<(&str, usize)> = Vec::new();
        for font in fonts.iter().filter(|font| !font.family.is_empty()) {
            match family_votes.iter_mut().find(|(name, _)| *name == font.family) {
                Some(slot) => slot.1 += 1,
                None => family_votes.push((font.family.as_str(), 1)),
            }
        }
        let mut family = String::new();
        let mut best = 0;
        for (name, votes) in family_votes {
            if votes > best {
                best = votes;
                family = name.to_string();
            }
        }

        Some(Font {
            point_size,
            family,
            weight,
            style: if fonts.iter().any(|font| font.style == FontStyle::Italic) {
                FontStyle::Italic
            } else {
                FontStyle::Normal
            },
            underline: fonts.iter().any(|font| font.underline),
        })
    }
}

/// Own (non-inherited) style values of one object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub fg_color: Option<Color>,
    pub bg_color: Option<Color>,
    pub font: Option<Font>,
    pub icon: String,
    pub selected_icon: String,
}

impl Style {
    pub fn has(&self, aspect: StyleAspect) -> bool {
        match aspect {
            StyleAspect::Foreground => self.fg_color.is_some(),
            StyleAspect::Background => self.bg_color.is_some(),
            StyleAspect::Font => self.font.is_some(),
            StyleAspect::Icon => !self.icon.is_empty(),
            StyleAspect::SelectedIcon => !self.selected_icon.is_empty(),
        }
    }
}

/// One independently inherited style attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleAspect {
    Foreground,
    Background,
    Font,
    Icon,
    SelectedIcon,
}

impl StyleAspect {
    pub const ALL: [StyleAspect; 5] = [
        Self::Foreground,
        Self::Background,
        Self::Font,
        Self::Icon,
        Self::SelectedIcon,
    ];

    /// Event topic of the aspect, e.g. `fgColor`.
    pub fn topic(self) -> &'static str {
        match self {
            Self::Foreground => "fgColor",
            Self::Background => "bgColor",
            Self::Font => "font",
            Self::Icon => "icon",
            Self::SelectedIcon => "selectedIcon",
        }
    }
}

/// Leaf icon -> icon used when the node has children.
const ICON_PLURALS: &[(&str, &str)] = &[
    ("book_icon", "books_icon"),
    ("cogwheel_icon", "cogwheels_icon"),
    ("envelope_icon", "envelopes_icon"),
    ("person_icon", "persons_icon"),
    ("folder_blue_icon", "folder_blue_open_icon"),
    ("folder_green_icon", "folder_green_open_icon"),
    ("folder_grey_icon", "folder_grey_open_icon"),
    ("folder_orange_icon", "folder_orange_open_icon"),
    ("folder_purple_icon", "folder_purple_open_icon"),
    ("folder_red_icon", "folder_red_open_icon"),
    ("folder_yellow_icon", "folder_yellow_open_icon"),
    ("folder_blue_arrow_icon", "folder_blue_arrow_open_icon"),
    ("folder_blue_light_icon", "folder_blue_light_open_icon"),
];

/// Picks the singular or plural form of `icon` for the node's shape.
///
/// Icons absent from the table are returned unchanged.
pub fn icon_for_shape(icon: &str, has_children: bool) -> String {
    if has_children {
        if let Some((_, plural)) = ICON_PLURALS.iter().find(|(single, _)| *single == icon) {
            return (*plural).to_string();
        }
    } else if let Some((single, _)) = ICON_PLURALS.iter().find(|(_, plural)| *plural == icon) {
        return (*single).to_string();
    }
    icon.to_string()
}

#[cfg(test)]
mod tests {
    use super::{icon_for_shape, Color, Font, FontStyle, FontWeight};

    #[test]
    fn color_mix_is_componentwise_mean() {
        let mixed = Color::mix(&[Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)]);
        assert_eq!(mixed.map(Color::to_hex).as_deref(), Some("#7F007F"));
        assert_eq!(Color::mix(&[]), None);
    }

    #[test]
    fn color_hex_round_trip_keeps_alpha() {
        let color = Color::from((1, 2, 3, 4));
        assert_eq!(Color::from_hex(&color.to_hex()), Ok(color));
        assert!(Color::from_hex("123456").is_err());
    }

    #[test]
    fn font_mix_breaks_weight_ties_toward_normal() {
        let bold = Font::new(10).with_weight(FontWeight::Bold);
        let light = Font::new(12).with_weight(FontWeight::Light).with_style(FontStyle::Italic);

        let mixed = Font::mix(&[bold, light]).expect("two fonts mix");
        assert_eq!(mixed.point_size, 11);
        assert_eq!(mixed.weight, FontWeight::Normal);
        assert_eq!(mixed.style, FontStyle::Italic);
    }

    #[test]
    fn font_mix_prefers_majority_family() {
        let fonts = [
            Font::new(10).with_family("Serif"),
            Font::new(10).with_family("Mono").with_underline(true),
            Font::new(10).with_family("Mono"),
            Font::new(10),
        ];
        let mixed = Font::mix(&fonts).expect("fonts mix");
        assert_eq!(mixed.family, "Mono");
        assert!(mixed.underline);
    }

    #[test]
    fn icons_switch_shape_with_children() {
        assert_eq!(icon_for_shape("book_icon", true), "books_icon");
        assert_eq!(icon_for_shape("books_icon", false), "book_icon");
        assert_eq!(icon_for_shape("books_icon", true), "books_icon");
        assert_eq!(icon_for_shape("clock_icon", true), "clock_icon");
    }
}
