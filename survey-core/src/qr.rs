//! Placeholder QR pattern
//!
//! Draws something that looks like a QR code for a payload: three finder
//! squares plus a data area filled from the SHA-256 digest of the payload.
//! It is deterministic but NOT a scannable QR code; the survey URL should
//! be printed next to it.

use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Modules per side
pub const GRID_SIZE: usize = 25;
const FINDER_SIZE: usize = 7;

/// Rendering options for [`render_svg`]
#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Pixel size of one module
    pub module_size: u32,
    /// Quiet zone around the grid, in modules
    pub margin: u32,
    pub foreground: String,
    pub background: String,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            module_size: 8,
            margin: 2,
            foreground: "#000000".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

/// Dark/light module grid for `payload`, row-major
pub fn pattern(payload: &str) -> Vec<Vec<bool>> {
    let digest = Sha256::digest(payload.as_bytes());
    let bits = digest.len() * 8;

    let mut grid = vec![vec![false; GRID_SIZE]; GRID_SIZE];
    let mut bit = 0usize;

    for (y, row) in grid.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = match finder_cell(x, y) {
                Some(dark) => dark,
                None => {
                    let index = bit % bits;
                    bit += 1;
                    digest[index / 8] & (0x80 >> (index % 8)) != 0
                }
            };
        }
    }

    grid
}

/// Render the pattern for `payload` as a standalone SVG document
pub fn render_svg(payload: &str, options: &SvgOptions) -> String {
    let grid = pattern(payload);
    let module = options.module_size.max(1);
    let side = (GRID_SIZE as u32 + options.margin * 2) * module;

    let mut svg = String::with_capacity(16 * 1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{side}" height="{side}" viewBox="0 0 {side} {side}" shape-rendering="crispEdges">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{side}" height="{side}" fill="{}"/>"#,
        escape_attr(&options.background)
    );
    let _ = write!(svg, r#"<g fill="{}">"#, escape_attr(&options.foreground));

    for (y, row) in grid.iter().enumerate() {
        for (x, dark) in row.iter().enumerate() {
            if *dark {
                let px = (x as u32 + options.margin) * module;
                let py = (y as u32 + options.margin) * module;
                let _ = write!(
                    svg,
                    r#"<rect x="{px}" y="{py}" width="{module}" height="{module}"/>"#
                );
            }
        }
    }

    svg.push_str("</g></svg>");
    svg
}

/// Fixed value of a module inside one of the three finder squares, if any
///
/// Each finder is a dark 7x7 ring, a light ring, and a dark 3x3 center;
/// the row/column next to a finder is kept light as a separator.
fn finder_cell(x: usize, y: usize) -> Option<bool> {
    let far = GRID_SIZE - FINDER_SIZE;
    let origins = [(0, 0), (far, 0), (0, far)];

    for (ox, oy) in origins {
        let within = |v: usize, o: usize| v + 1 >= o && v <= o + FINDER_SIZE;
        if !(within(x, ox) && within(y, oy)) {
            continue;
        }

        // Separator band around the 7x7 square.
        if x < ox || y < oy || x >= ox + FINDER_SIZE || y >= oy + FINDER_SIZE {
            return Some(false);
        }

        let dx = x - ox;
        let dy = y - oy;
        let ring = dx.min(dy).min(FINDER_SIZE - 1 - dx).min(FINDER_SIZE - 1 - dy);
        return Some(ring != 1);
    }

    None
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_deterministic() {
        let a = render_svg("https://example.org/s/ABCD2345", &SvgOptions::default());
        let b = render_svg("https://example.org/s/ABCD2345", &SvgOptions::default());
        assert_eq!(a, b);
        assert!(a.starts_with("<svg"));
        assert!(a.ends_with("</svg>"));
    }

    #[test]
    fn test_different_payloads_differ() {
        assert_ne!(pattern("ABCD2345"), pattern("ABCD2346"));
    }

    #[test]
    fn test_finder_squares() {
        let grid = pattern("anything");
        let far = GRID_SIZE - FINDER_SIZE;

        for (ox, oy) in [(0, 0), (far, 0), (0, far)] {
            // Outer ring dark, inner ring light, center dark.
            assert!(grid[oy][ox]);
            assert!(grid[oy + 6][ox + 6]);
            assert!(!grid[oy + 1][ox + 1]);
            assert!(!grid[oy + 5][ox + 3]);
            assert!(grid[oy + 3][ox + 3]);
            assert!(grid[oy + 2][ox + 4]);
        }

        // Separators.
        assert!(!grid[7][0]);
        assert!(!grid[0][7]);
        assert!(!grid[0][far - 1]);
        assert!(!grid[far - 1][0]);
    }

    #[test]
    fn test_svg_dimensions() {
        let options = SvgOptions {
            module_size: 4,
            margin: 1,
            ..SvgOptions::default()
        };
        let svg = render_svg("x", &options);
        let side = (GRID_SIZE as u32 + 2) * 4;
        assert!(svg.contains(&format!(r#"width="{side}" height="{side}""#)));
    }
}
