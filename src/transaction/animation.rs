//! Animation key derivation from the loading-animation SVG paths.
//!
//! The homepage embeds several `loading-x-anim` SVGs. Key bytes pick one
//! path and one row of its control points, and a point in time. The key is
//! the CSS color and rotation matrix that animation would show at that time,
//! rendered as hex. Float formatting here must stay bit-exact.

use super::bezier::CubicBezier;

/// Total animation duration in milliseconds.
const TOTAL_TIME: f64 = 4096.0;

/// Characters of the path prefix (`M 10,30 C`) before the control points.
const PATH_PREFIX_LEN: usize = 9;

/// Integer control points of one SVG path, one row per `C` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationFrame {
    rows: Vec<Vec<i64>>,
}

impl AnimationFrame {
    /// Parse a path `d` attribute. Paths no longer than the prefix have no rows.
    pub fn parse(d: &str) -> Self {
        let bytes = d.as_bytes();
        if bytes.len() <= PATH_PREFIX_LEN {
            return Self::default();
        }
        let rows = bytes[PATH_PREFIX_LEN..]
            .split(|&b| b == b'C')
            .map(|segment| {
                let cleaned: String = segment
                    .iter()
                    .map(|&b| if b.is_ascii_digit() { b as char } else { ' ' })
                    .collect();
                cleaned
                    .split_whitespace()
                    .map(|n| n.parse::<i64>().unwrap_or(0))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<i64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[i64]> {
        self.rows.get(index).map(|r| r.as_slice())
    }
}

/// Product of `key_bytes[idx] % 16` over the in-bounds indices, floored to a
/// multiple of 10.
pub fn frame_time(key_bytes: &[u8], key_indices: &[usize]) -> u64 {
    let product = key_indices
        .iter()
        .filter_map(|&idx| key_bytes.get(idx))
        .fold(1u64, |acc, &b| acc.wrapping_mul(u64::from(b % 16)));
    (product / 10) * 10
}

/// Derive the animation key; empty when the material cannot address a row.
pub fn animation_key(
    key_bytes: &[u8],
    row_index: usize,
    key_indices: &[usize],
    frames: &[String],
) -> String {
    if key_bytes.len() <= row_index || key_bytes.len() <= 5 || frames.is_empty() {
        return String::new();
    }

    // Modulo the actual frame count, not a fixed four.
    let frame_index = usize::from(key_bytes[5]) % frames.len();
    let frame = AnimationFrame::parse(&frames[frame_index]);

    let row = usize::from(key_bytes[row_index] % 16);
    let Some(row) = frame.row(row) else {
        return String::new();
    };

    let target_time = frame_time(key_bytes, key_indices) as f64 / TOTAL_TIME;
    animate(row, target_time)
}

/// Render the animation state at `target_time` (0..1) for one row.
pub fn animate(row: &[i64], target_time: f64) -> String {
    let get = |i: usize| row.get(i).map(|&v| v as f64).unwrap_or(0.0);

    let from_color = [get(0), get(1), get(2), 1.0];
    let to_color = [get(3), get(4), get(5), 1.0];
    let from_rotation = [0.0];
    let to_rotation = [scale(get(6), 60.0, 360.0, true)];

    let mut curves = [0.0; 4];
    for (i, &item) in row.iter().skip(7).take(4).enumerate() {
        curves[i] = scale(item as f64, odd_minimum(i), 1.0, false);
    }
    let [x1, y1, x2, y2] = curves;
    let value = CubicBezier::new(x1, y1, x2, y2).value(target_time);

    let color = interpolate(&from_color, &to_color, value).map(|c| c.max(0.0));
    let [rotation] = interpolate(&from_rotation, &to_rotation, value);
    let matrix = rotation_matrix(rotation);

    let mut parts: Vec<String> = color[..3]
        .iter()
        .map(|c| format!("{:x}", c.round() as i64))
        .collect();
    for v in matrix {
        let rounded = ((v * 100.0).round() / 100.0).abs();
        let mut hex = float_to_hex(rounded);
        if hex.starts_with('.') {
            hex.insert(0, '0');
        }
        parts.push(hex.to_lowercase());
    }
    parts.push("0".to_string());
    parts.push("0".to_string());

    parts.concat().replace(['.', '-'], "")
}

/// Map a byte value from `[0, 255]` onto `[min, max]`.
fn scale(value: f64, min: f64, max: f64, rounding: bool) -> f64 {
    let result = value * (max - min) / 255.0 + min;
    if rounding {
        result.floor()
    } else {
        (result * 100.0).round() / 100.0
    }
}

fn odd_minimum(position: usize) -> f64 {
    if position % 2 != 0 {
        -1.0
    } else {
        0.0
    }
}

fn interpolate<const N: usize>(from: &[f64; N], to: &[f64; N], f: f64) -> [f64; N] {
    std::array::from_fn(|i| from[i] * (1.0 - f) + to[i] * f)
}

fn rotation_matrix(degrees: f64) -> [f64; 4] {
    let rad = degrees * std::f64::consts::PI / 180.0;
    [rad.cos(), -rad.sin(), rad.sin(), rad.cos()]
}

/// Hexadecimal rendering of a non-negative float with its full binary fraction.
///
/// Digits above 9 are uppercase; `0.5` is `".8"` and `255.75` is `"FF.C"`.
pub fn float_to_hex(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }

    let mut int_part = x.floor() as u64;
    let mut fraction = x - int_part as f64;

    let mut int_digits = Vec::new();
    while int_part > 0 {
        int_digits.push(hex_digit((int_part % 16) as u8));
        int_part /= 16;
    }
    int_digits.reverse();
    let mut result: String = int_digits.into_iter().collect();

    if fraction == 0.0 {
        if result.is_empty() {
            return "0".to_string();
        }
        return result;
    }

    result.push('.');
    while fraction > 0.0 {
        fraction *= 16.0;
        let digit = fraction.floor();
        fraction -= digit;
        result.push(hex_digit(digit as u8));
    }
    result
}

fn hex_digit(d: u8) -> char {
    if d > 9 {
        (b'A' + d - 10) as char
    } else {
        (b'0' + d) as char
    }
}
