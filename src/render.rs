use crate::equalize::Equalizer;
use crate::sim::{Field, RdSystem};
use crossterm::style::Color;

/// HUD lines reserved at the top of the screen.
pub(crate) const HUD_ROWS: usize = 2;

// Braille dot bit positions used by Unicode braille.
const BRAILLE_BASE: u32 = 0x2800;
const DOT1: u8 = 1 << 0;
const DOT2: u8 = 1 << 1;
const DOT3: u8 = 1 << 2;
const DOT4: u8 = 1 << 3;
const DOT5: u8 = 1 << 4;
const DOT6: u8 = 1 << 5;
const DOT7: u8 = 1 << 6;
const DOT8: u8 = 1 << 7;

// 0..8-dot "ramp" patterns, filled in a pleasant order.
const RAMP: [u8; 9] = [
    0,
    DOT1,
    DOT1 | DOT4,
    DOT1 | DOT2 | DOT4,
    DOT1 | DOT2 | DOT4 | DOT5,
    DOT1 | DOT2 | DOT3 | DOT4 | DOT5,
    DOT1 | DOT2 | DOT3 | DOT4 | DOT5 | DOT6,
    DOT1 | DOT2 | DOT3 | DOT4 | DOT5 | DOT6 | DOT7,
    DOT1 | DOT2 | DOT3 | DOT4 | DOT5 | DOT6 | DOT7 | DOT8,
];

fn ramp_braille(level_0_to_8: usize) -> char {
    let m = RAMP[level_0_to_8.min(8)] as u32;
    char::from_u32(BRAILLE_BASE + m).unwrap_or(' ')
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
}

impl Cell {
    pub(crate) fn blank() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(a: (f64, f64, f64), b: (f64, f64, f64), t: f64) -> (f64, f64, f64) {
    (lerp(a.0, b.0, t), lerp(a.1, b.1, t), lerp(a.2, b.2, t))
}

fn tri_gradient(
    t: f64,
    c0: (f64, f64, f64),
    c1: (f64, f64, f64),
    c2: (f64, f64, f64),
) -> (f64, f64, f64) {
    let tt = t.clamp(0.0, 1.0);
    if tt <= 0.5 {
        lerp_color(c0, c1, tt * 2.0)
    } else {
        lerp_color(c1, c2, (tt - 0.5) * 2.0)
    }
}

fn to_rgb_u8(c: (f64, f64, f64)) -> (u8, u8, u8) {
    let r = (c.0.clamp(0.0, 1.0) * 255.0).round() as u8;
    let g = (c.1.clamp(0.0, 1.0) * 255.0).round() as u8;
    let b = (c.2.clamp(0.0, 1.0) * 255.0).round() as u8;
    (r, g, b)
}

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    pub(crate) name: &'static str,
    map: fn(t: f64) -> (u8, u8, u8),
}

impl Theme {
    pub(crate) fn color(&self, t: f64) -> Color {
        let (r, g, b) = (self.map)(t);
        Color::Rgb { r, g, b }
    }
}

pub(crate) const THEMES: &[Theme] = &[
    Theme {
        name: "Heat",
        map: theme_heat,
    },
    Theme {
        name: "Ocean",
        map: theme_ocean,
    },
    Theme {
        name: "Mono",
        map: theme_mono,
    },
];

fn theme_heat(t: f64) -> (u8, u8, u8) {
    to_rgb_u8(tri_gradient(
        t,
        (0.02, 0.0, 0.0),
        (0.9, 0.2, 0.0),
        (1.0, 0.95, 0.6),
    ))
}

fn theme_ocean(t: f64) -> (u8, u8, u8) {
    to_rgb_u8(tri_gradient(
        t,
        (0.0, 0.05, 0.15),
        (0.0, 0.55, 0.65),
        (0.8, 0.95, 1.0),
    ))
}

fn theme_mono(t: f64) -> (u8, u8, u8) {
    let g = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
    (g, g, g)
}

/// Downsample the board through the tone map into terminal cells.
/// Each cell covers 2x4 braille subpixels; dot count and color both
/// follow the mean equalized intensity under the cell.
pub(crate) fn compose(
    sys: &RdSystem,
    which: Field,
    eq: &Equalizer,
    theme: &Theme,
    cols: usize,
    rows: usize,
    frame: &mut Vec<Cell>,
) {
    frame.clear();
    frame.resize(cols * rows, Cell::blank());
    if cols == 0 || rows == 0 {
        return;
    }

    let field = sys.field(which);
    let n = sys.size();
    let px_w = cols * 2;
    let px_h = rows * 4;

    for ty in 0..rows {
        for tx in 0..cols {
            let mut sum = 0.0;
            for dy in 0..4 {
                for dx in 0..2 {
                    let gx = (tx * 2 + dx) * n / px_w;
                    let gy = (ty * 4 + dy) * n / px_h;
                    sum += eq.normalize(field[gx + gy * n]);
                }
            }
            let t = sum * 0.125;
            let dots = (t * 8.0).round().clamp(0.0, 8.0) as usize;
            frame[ty * cols + tx] = Cell {
                ch: ramp_braille(dots),
                fg: theme.color(t),
            };
        }
    }

    // overdraw the newest computed scanline in red
    let scan_ty = (sys.scan_row() * px_h / n) / 4;
    if scan_ty < rows {
        for tx in 0..cols {
            frame[scan_ty * cols + tx] = Cell {
                ch: ramp_braille(8),
                fg: Color::Red,
            };
        }
    }
}
