use ratatui::style::Color;

use crate::config::ColorsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Auto,
    Truecolor,
    Color256,
    Mono,
}

impl ColorSupport {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "truecolor" | "24bit" => ColorSupport::Truecolor,
            "256" | "256color" => ColorSupport::Color256,
            "mono" | "monochrome" => ColorSupport::Mono,
            _ => ColorSupport::Auto,
        }
    }
}

pub fn detect_color_support() -> ColorSupport {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::Truecolor;
    }
    ColorSupport::Color256
}

pub fn resolve_color_support(config: &str) -> ColorSupport {
    let parsed = ColorSupport::from_config_str(config);
    if parsed == ColorSupport::Auto {
        detect_color_support()
    } else {
        parsed
    }
}

/// Load bands for the cosmetic usage colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UsageLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl UsageLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            UsageLevel::Critical
        } else if percent >= 70.0 {
            UsageLevel::High
        } else if percent >= 50.0 {
            UsageLevel::Moderate
        } else {
            UsageLevel::Low
        }
    }

    fn index(self) -> usize {
        match self {
            UsageLevel::Low => 0,
            UsageLevel::Moderate => 1,
            UsageLevel::High => 2,
            UsageLevel::Critical => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeatOverrides {
    pub low: String,
    pub mid: String,
    pub high: String,
    pub critical: String,
}

impl HeatOverrides {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        Self {
            low: colors.heat_low.clone(),
            mid: colors.heat_mid.clone(),
            high: colors.heat_high.clone(),
            critical: colors.heat_critical.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub border: Color,
    pub title: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub table_header: Color,
    pub row_alt_bg: Color,
    pub statusbar_bg: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub gauge_unfilled: Color,
    pub heat_colors: [Color; 4],
}

impl Theme {
    pub fn from_config(theme_name: &str, heat: &HeatOverrides, support: ColorSupport) -> Self {
        let mut theme = match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" => Self::mono(),
            _ => Self::dark(),
        };

        if support == ColorSupport::Mono {
            theme = Self::mono();
        } else {
            theme.apply_heat_overrides(heat);
        }
        theme.apply_color_support(support);
        theme
    }

    pub fn usage_color(&self, percent: f64) -> Color {
        self.heat_colors[UsageLevel::from_percent(percent).index()]
    }

    fn apply_heat_overrides(&mut self, heat: &HeatOverrides) {
        let colors = [&heat.low, &heat.mid, &heat.high, &heat.critical];
        for (slot, raw) in self.heat_colors.iter_mut().zip(colors) {
            if let Some(color) = parse_hex_color(raw) {
                *slot = color;
            }
        }
    }

    fn apply_color_support(&mut self, support: ColorSupport) {
        let map = |c: Color| adapt_color(c, support);

        self.border = map(self.border);
        self.title = map(self.title);
        self.text_primary = map(self.text_primary);
        self.text_secondary = map(self.text_secondary);
        self.table_header = map(self.table_header);
        self.row_alt_bg = map(self.row_alt_bg);
        self.statusbar_bg = map(self.statusbar_bg);
        self.pill_key_bg = map(self.pill_key_bg);
        self.pill_key_fg = map(self.pill_key_fg);
        self.pill_desc_fg = map(self.pill_desc_fg);
        self.surface_bg = map(self.surface_bg);
        self.gauge_unfilled = map(self.gauge_unfilled);

        self.heat_colors = self.heat_colors.map(map);
    }

    pub fn dark() -> Self {
        Theme {
            border: Color::Rgb(71, 85, 105),
            title: Color::Rgb(103, 232, 249),
            text_primary: Color::White,
            text_secondary: Color::Gray,
            table_header: Color::Yellow,
            row_alt_bg: Color::Rgb(30, 41, 59),
            statusbar_bg: Color::DarkGray,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_unfilled: Color::Rgb(51, 65, 85),
            heat_colors: [
                Color::Rgb(34, 197, 94),
                Color::Rgb(234, 179, 8),
                Color::Rgb(249, 115, 22),
                Color::Rgb(239, 68, 68),
            ],
        }
    }

    pub fn light() -> Self {
        Theme {
            border: Color::Rgb(150, 150, 150),
            title: Color::Blue,
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            table_header: Color::Blue,
            row_alt_bg: Color::Rgb(230, 230, 230),
            statusbar_bg: Color::Rgb(220, 220, 220),
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            gauge_unfilled: Color::Rgb(200, 200, 200),
            heat_colors: [
                Color::Rgb(0, 140, 60),
                Color::Rgb(180, 140, 0),
                Color::Rgb(210, 100, 20),
                Color::Rgb(200, 30, 30),
            ],
        }
    }

    pub fn mono() -> Self {
        Theme {
            border: Color::White,
            title: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            table_header: Color::White,
            row_alt_bg: Color::Black,
            statusbar_bg: Color::Black,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            gauge_unfilled: Color::Black,
            heat_colors: [Color::Gray, Color::Gray, Color::White, Color::White],
        }
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn adapt_color(color: Color, support: ColorSupport) -> Color {
    match support {
        ColorSupport::Truecolor | ColorSupport::Auto => color,
        ColorSupport::Color256 => match color {
            Color::Rgb(r, g, b) => Color::Indexed(rgb_to_ansi256(r, g, b)),
            _ => color,
        },
        ColorSupport::Mono => match color {
            Color::Rgb(r, g, b) => {
                let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                if luminance > 128.0 {
                    Color::White
                } else {
                    Color::Black
                }
            }
            Color::White | Color::Black | Color::Gray | Color::DarkGray => color,
            _ => Color::White,
        },
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let r = (r as f32 / 255.0 * 5.0).round() as u8;
    let g = (g as f32 / 255.0 * 5.0).round() as u8;
    let b = (b as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * r + 6 * g + b
}
