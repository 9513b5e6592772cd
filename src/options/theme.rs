use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::util::color::Color;

/// Which colour table the viewport uses.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Follow the host preference (`prefers-color-scheme` on the web).
    #[default]
    Auto,
    /// Transparent background, dim grid.
    Dark,
    /// Grey background, light grid.
    Light,
}

impl ColorScheme {
    /// Resolve `Auto` against the host preference.
    ///
    /// Native hosts have no preference to query and resolve to `Light`.
    #[must_use]
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => {
                if prefers_dark() {
                    Self::Dark
                } else {
                    Self::Light
                }
            }
            other => other,
        }
    }
}

impl std::fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Dark => "dark",
            Self::Light => "light",
        })
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
fn prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok())
        .flatten()
        .is_some_and(|mq| mq.matches())
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
fn prefers_dark() -> bool {
    false
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[schemars(title = "Theme", inline)]
#[serde(default)]
/// Colour scheme selection.
pub struct ThemeOptions {
    /// Dark, light, or follow the host.
    #[schemars(title = "Color Scheme")]
    pub color_scheme: ColorScheme,
}

/// Resolved viewport colours for one scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Clear colour.
    pub background: Color,
    /// Clear alpha.
    pub background_alpha: f32,
    /// Fine grid line colour.
    pub grid: Color,
    /// Coarse grid line colour.
    pub grid_major: Color,
}

impl Theme {
    /// Colour table for a scheme (`Auto` is resolved first).
    #[must_use]
    pub fn for_scheme(scheme: ColorScheme) -> Self {
        match scheme.resolve() {
            ColorScheme::Dark => Self {
                background: Color::from_hex(0x000000),
                background_alpha: 0.0,
                grid: Color::from_hex(0x555555),
                grid_major: Color::from_hex(0x888888),
            },
            _ => Self {
                background: Color::from_hex(0xaaaaaa),
                background_alpha: 1.0,
                grid: Color::from_hex(0x999999),
                grid_major: Color::from_hex(0x777777),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_theme_is_transparent() {
        let theme = Theme::for_scheme(ColorScheme::Dark);
        assert_eq!(theme.background.to_hex(), 0x000000);
        assert_eq!(theme.background_alpha, 0.0);
        assert_eq!(theme.grid.to_hex(), 0x555555);
        assert_eq!(theme.grid_major.to_hex(), 0x888888);
    }

    #[test]
    fn light_theme_is_opaque_grey() {
        let theme = Theme::for_scheme(ColorScheme::Light);
        assert_eq!(theme.background.to_hex(), 0xaaaaaa);
        assert_eq!(theme.background_alpha, 1.0);
        assert_eq!(theme.grid.to_hex(), 0x999999);
        assert_eq!(theme.grid_major.to_hex(), 0x777777);
    }

    #[test]
    fn auto_resolves_to_light_natively() {
        assert_eq!(ColorScheme::Auto.resolve(), ColorScheme::Light);
        assert_eq!(ColorScheme::Dark.resolve(), ColorScheme::Dark);
    }
}
