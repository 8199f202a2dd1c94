//! Theme
//!
//! Colour palette, font helpers and per-variant style tables, rendered into a
//! stylesheet the frontend injects at mount time.

use std::fmt::Write as _;

/// An sRGB colour
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Some(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Raise HSL lightness by `ratio` of its current value
    pub fn lighten(self, ratio: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l + l * ratio).clamp(0.0, 1.0))
    }

    /// Lower HSL lightness by `ratio` of its current value
    pub fn darken(self, ratio: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l - l * ratio).clamp(0.0, 1.0))
    }

    fn to_hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;

        if delta == 0.0 {
            return (0.0, 0.0, l);
        }

        let s = if l > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };
        let h = if (max - r).abs() < f64::EPSILON {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if (max - g).abs() < f64::EPSILON {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (h / 6.0, s, l)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let to_u8 = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        if s == 0.0 {
            let v = to_u8(l);
            return Self::rgb(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let hue = |mut t: f64| {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };
        Self::rgb(
            to_u8(hue(h + 1.0 / 3.0)),
            to_u8(hue(h)),
            to_u8(hue(h - 1.0 / 3.0)),
        )
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Named colours
pub mod palette {
    use super::Color;

    pub const PRIMARY: Color = Color::rgb(0x00, 0x52, 0xcc);
    pub const SUCCESS: Color = Color::rgb(0x0b, 0x87, 0x5b);
    pub const DANGER: Color = Color::rgb(0xe1, 0x3c, 0x3c);
    pub const WARNING: Color = Color::rgb(0xf8, 0x9c, 0x1c);
    pub const SECONDARY: Color = Color::rgb(0xf4, 0xf5, 0xf7);

    pub const TEXT_DARKEST: Color = Color::rgb(0x17, 0x2b, 0x4d);
    pub const TEXT_DARK: Color = Color::rgb(0x42, 0x52, 0x6e);
    pub const TEXT_MEDIUM: Color = Color::rgb(0x5e, 0x6c, 0x84);

    pub const BACKGROUND_LIGHT: Color = Color::rgb(0xeb, 0xec, 0xf0);
    pub const BACKGROUND_LIGHTEST: Color = Color::rgb(0xf4, 0xf5, 0xf7);
    pub const BACKGROUND_LIGHT_PRIMARY: Color = Color::rgb(0xd2, 0xe5, 0xfe);

    pub const BORDER_LIGHTEST: Color = Color::rgb(0xdf, 0xe1, 0xe6);
    pub const BORDER_INPUT_FOCUS: Color = Color::rgb(0x4c, 0x9a, 0xff);
}

pub mod font {
    pub const REGULAR: &str = "font-family: \"CircularStdBook\", sans-serif; font-weight: normal;";
    pub const MEDIUM: &str = "font-family: \"CircularStdMedium\", sans-serif; font-weight: normal;";

    pub fn size(px: u32) -> String {
        format!("font-size: {px}px;")
    }
}

const CLICKABLE: &str = "cursor: pointer; user-select: none;";

/// Button look
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Success,
    Danger,
    Secondary,
    Empty,
}

impl ButtonVariant {
    pub const ALL: [ButtonVariant; 5] = [
        ButtonVariant::Primary,
        ButtonVariant::Success,
        ButtonVariant::Danger,
        ButtonVariant::Secondary,
        ButtonVariant::Empty,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "primary",
            ButtonVariant::Success => "success",
            ButtonVariant::Danger => "danger",
            ButtonVariant::Secondary => "secondary",
            ButtonVariant::Empty => "empty",
        }
    }

    /// Class names for a button element
    pub fn class(self, is_active: bool) -> String {
        if is_active {
            format!("btn btn-{} is-active", self.name())
        } else {
            format!("btn btn-{}", self.name())
        }
    }

    /// Colour set for this variant
    pub fn style(self) -> ButtonStyle {
        match self {
            ButtonVariant::Primary => ButtonStyle::colored(palette::PRIMARY),
            ButtonVariant::Success => ButtonStyle::colored(palette::SUCCESS),
            ButtonVariant::Danger => ButtonStyle::colored(palette::DANGER),
            ButtonVariant::Secondary => ButtonStyle::muted(palette::SECONDARY),
            ButtonVariant::Empty => ButtonStyle::muted(Color::WHITE),
        }
    }
}

/// Resolved colours of a button variant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonStyle {
    pub color: Color,
    pub background: Color,
    pub hover_background: Color,
    pub active_color: Color,
    pub active_background: Color,
    pub medium_weight: bool,
}

impl ButtonStyle {
    fn colored(base: Color) -> Self {
        Self {
            color: Color::WHITE,
            background: base,
            hover_background: base.lighten(0.15),
            active_color: Color::WHITE,
            active_background: base.darken(0.1),
            medium_weight: true,
        }
    }

    fn muted(background: Color) -> Self {
        Self {
            color: palette::TEXT_DARK,
            background,
            hover_background: palette::BACKGROUND_LIGHT,
            active_color: palette::PRIMARY,
            active_background: palette::BACKGROUND_LIGHT_PRIMARY,
            medium_weight: false,
        }
    }
}

fn button_css(out: &mut String, variant: ButtonVariant) {
    let style = variant.style();
    let name = variant.name();
    let weight = if style.medium_weight { font::MEDIUM } else { font::REGULAR };

    let _ = writeln!(
        out,
        ".btn-{name} {{ color: {}; background: {}; {weight} }}",
        style.color, style.background
    );
    let _ = writeln!(
        out,
        ".btn-{name}:not(:disabled):hover {{ background: {}; }}",
        style.hover_background
    );
    let _ = writeln!(
        out,
        ".btn-{name}:not(:disabled):active, .btn-{name}.is-active:not(:disabled) {{ color: {}; background: {} !important; }}",
        style.active_color, style.active_background
    );
}

/// The complete stylesheet for the donation form
pub fn stylesheet() -> String {
    let mut css = String::new();

    let _ = writeln!(
        css,
        ".btn {{ position: relative; display: inline-flex; align-items: center; justify-content: center; \
         height: 3rem; vertical-align: middle; line-height: 1; white-space: nowrap; border-radius: 3px; \
         transition: all 0.1s; appearance: none; border: none; {CLICKABLE} {} }}",
        font::size(18)
    );
    let _ = writeln!(css, ".btn:disabled {{ opacity: 0.6; cursor: default; }}");
    for variant in ButtonVariant::ALL {
        button_css(&mut css, variant);
    }

    let _ = writeln!(css, ".textarea {{ display: inline-block; width: 100%; }}");
    let _ = writeln!(
        css,
        ".textarea textarea, .input input {{ resize: vertical; width: 100%; padding: 8px 12px 9px; border-radius: 3px; \
         border: 1px solid {}; color: {}; background: {}; transition: background 0.1s; {} {} }}",
        palette::BORDER_LIGHTEST,
        palette::TEXT_DARKEST,
        palette::BACKGROUND_LIGHTEST,
        font::REGULAR,
        font::size(15)
    );
    let _ = writeln!(
        css,
        ".textarea textarea:hover, .input input:hover {{ background: {}; }}",
        palette::BACKGROUND_LIGHT
    );
    let _ = writeln!(
        css,
        ".textarea textarea:focus, .input input:focus {{ background: #fff; border: 1px solid {0}; box-shadow: 0 0 0 1px {0}; }}",
        palette::BORDER_INPUT_FOCUS
    );
    let _ = writeln!(
        css,
        ".invalid textarea, .invalid textarea:focus, .invalid input, .invalid input:focus {{ border: 1px solid {}; }}",
        palette::DANGER
    );
    let _ = writeln!(
        css,
        ".field-error {{ color: {}; {} {} }}",
        palette::DANGER,
        font::MEDIUM,
        font::size(13)
    );
    let _ = writeln!(
        css,
        ".steps .step {{ color: {}; }} .steps .step.current {{ color: {}; {} }}",
        palette::TEXT_MEDIUM,
        palette::PRIMARY,
        font::MEDIUM
    );

    css
}
