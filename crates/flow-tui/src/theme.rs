use crossterm::style::Color;
use flow_core::Severity;

/// Fallback colors for point colors that are not hex strings
const PALETTE: [Color; 8] = [
    Color::Rgb { r: 229, g: 57, b: 53 },
    Color::Rgb { r: 67, g: 160, b: 71 },
    Color::Rgb { r: 30, g: 136, b: 229 },
    Color::Rgb { r: 253, g: 216, b: 53 },
    Color::Rgb { r: 251, g: 140, b: 0 },
    Color::Rgb { r: 142, g: 36, b: 170 },
    Color::Rgb { r: 0, g: 172, b: 193 },
    Color::Rgb { r: 216, g: 27, b: 96 },
];

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Checkerboard cell shades
    pub cell_a: Color,
    pub cell_b: Color,
    /// Board frame
    pub border: Color,
    /// Title text
    pub title: Color,
    pub info: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Key binding text color
    pub key: Color,
    /// Disabled key binding text
    pub disabled: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            cell_a: Color::Rgb { r: 32, g: 35, b: 46 },
            cell_b: Color::Rgb { r: 38, g: 42, b: 55 },
            border: Color::Rgb { r: 130, g: 140, b: 170 },
            title: Color::Rgb { r: 255, g: 255, b: 255 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            warning: Color::Rgb { r: 255, g: 200, b: 80 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
            disabled: Color::Rgb { r: 80, g: 84, b: 100 },
        }
    }

    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Success => self.success,
            Severity::Error => self.error,
        }
    }

    /// Terminal color for a point/path color
    pub fn path_color(&self, color: &flow_core::Color) -> Color {
        parse_hex(color.as_str()).unwrap_or_else(|| {
            let hash = color
                .as_str()
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            PALETTE[hash % PALETTE.len()]
        })
    }

    /// Committed paths are drawn dimmer than the stroke in progress
    pub fn committed(&self, color: &flow_core::Color) -> Color {
        blend(self.path_color(color), self.bg, 0.45)
    }
}

/// `#rrggbb` or `#rgb`
pub fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
        }),
        3 => {
            let short = |s: &str| channel(s).map(|v| v * 17);
            Some(Color::Rgb {
                r: short(&hex[0..1])?,
                g: short(&hex[1..2])?,
                b: short(&hex[2..3])?,
            })
        }
        _ => None,
    }
}

/// Mix `from` toward `to`; non-RGB colors pass through
pub fn blend(from: Color, to: Color, amount: f32) -> Color {
    match (from, to) {
        (Color::Rgb { r, g, b }, Color::Rgb { r: r2, g: g2, b: b2 }) => {
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amount).round() as u8;
            Color::Rgb {
                r: mix(r, r2),
                g: mix(g, g2),
                b: mix(b, b2),
            }
        }
        _ => from,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ff8000"), Some(Color::Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(parse_hex("#f80"), Some(Color::Rgb { r: 255, g: 136, b: 0 }));
        assert_eq!(parse_hex("ff8000"), None);
        assert_eq!(parse_hex("#ggg"), None);
        assert_eq!(parse_hex("#ff80"), None);
    }

    #[test]
    fn test_named_colors_use_palette() {
        let theme = Theme::dark();
        let red = flow_core::Color::from("red");
        assert_eq!(theme.path_color(&red), theme.path_color(&red));
        assert!(PALETTE.contains(&theme.path_color(&red)));
    }

    #[test]
    fn test_blend() {
        let black = Color::Rgb { r: 0, g: 0, b: 0 };
        let white = Color::Rgb { r: 255, g: 255, b: 255 };
        assert_eq!(blend(white, black, 0.0), white);
        assert_eq!(blend(white, black, 1.0), black);
        assert_eq!(blend(Color::Red, black, 0.5), Color::Red);
    }
}
