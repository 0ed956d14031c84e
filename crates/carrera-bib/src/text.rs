//! Glyph rendering: a scalable TrueType/OpenType face when one is configured,
//! otherwise the embedded 8×8 bitmap font scaled up in whole pixels.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts as _};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{info, warn};

/// Side length of an embedded bitmap glyph, in font pixels.
const CELL: u32 = 8;

pub enum Glyphs {
  Scalable(FontVec),
  Bitmap,
}

impl Glyphs {
  /// Load the face at `path`, falling back to the embedded bitmap font when
  /// no path is given or the file cannot be read or parsed.
  pub fn load(path: Option<&Path>) -> Self {
    let Some(path) = path else {
      return Self::Bitmap;
    };

    let bytes = match std::fs::read(path) {
      Ok(b) => b,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "font unreadable; using embedded bitmap font");
        return Self::Bitmap;
      }
    };

    match FontVec::try_from_vec(bytes) {
      Ok(font) => {
        info!(path = %path.display(), "loaded bib font");
        Self::Scalable(font)
      }
      Err(e) => {
        warn!(path = %path.display(), error = %e, "invalid font; using embedded bitmap font");
        Self::Bitmap
      }
    }
  }

  /// Width and height of `text` at a nominal size of `px` pixels.
  pub fn measure(&self, px: f32, text: &str) -> (u32, u32) {
    match self {
      Self::Scalable(font) => {
        let (w, h) = text_size(PxScale::from(px), font, text);
        (w as u32, h as u32)
      }
      Self::Bitmap => {
        let cell = CELL * bitmap_scale(px);
        (cell * text.chars().count() as u32, cell)
      }
    }
  }

  /// Draw `text` with its bounding box centred on `(cx, cy)`. Text wider than
  /// the canvas starts at the left edge.
  pub fn draw_centered(
    &self,
    canvas: &mut RgbaImage,
    color: Rgba<u8>,
    (cx, cy): (i32, i32),
    px: f32,
    text: &str,
  ) {
    let (w, h) = self.measure(px, text);
    let x = (cx - (w / 2) as i32).max(0);
    let y = cy - (h / 2) as i32;

    match self {
      Self::Scalable(font) => {
        draw_text_mut(canvas, color, x, y, PxScale::from(px), font, text);
      }
      Self::Bitmap => draw_bitmap_text(canvas, color, x, y, bitmap_scale(px), text),
    }
  }
}

// ─── Bitmap font ─────────────────────────────────────────────────────────────

fn bitmap_scale(px: f32) -> u32 { ((px / CELL as f32).round() as u32).max(1) }

/// Rows of the glyph for `c`; bit 0 of each row is the leftmost pixel.
/// Characters outside ASCII and Latin-1 render as `?`.
fn bitmap_glyph(c: char) -> [u8; 8] {
  BASIC_FONTS
    .get(c)
    .or_else(|| LATIN_FONTS.get(c))
    .or_else(|| BASIC_FONTS.get('?'))
    .unwrap_or([0; 8])
}

fn draw_bitmap_text(
  canvas: &mut RgbaImage,
  color: Rgba<u8>,
  x: i32,
  y: i32,
  scale: u32,
  text: &str,
) {
  let advance = (CELL * scale) as i32;
  let scale = scale as i32;

  for (i, c) in text.chars().enumerate() {
    let origin_x = x + i as i32 * advance;
    for (row, bits) in bitmap_glyph(c).iter().enumerate() {
      for col in 0..CELL as i32 {
        if bits & (1 << col) == 0 {
          continue;
        }
        fill_block(
          canvas,
          color,
          origin_x + col * scale,
          y + row as i32 * scale,
          scale,
        );
      }
    }
  }
}

/// Paint a `size`×`size` square, clipped to the canvas.
fn fill_block(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, size: i32) {
  let (w, h) = (canvas.width() as i32, canvas.height() as i32);
  for py in y.max(0)..(y + size).min(h) {
    for px in x.max(0)..(x + size).min(w) {
      canvas.put_pixel(px as u32, py as u32, color);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bitmap_measure_scales_with_size() {
    let g = Glyphs::Bitmap;
    assert_eq!(g.measure(8.0, "0001"), (32, 8));
    assert_eq!(g.measure(120.0, "0001"), (4 * 8 * 15, 8 * 15));
  }

  #[test]
  fn latin1_letters_have_glyphs() {
    assert_ne!(bitmap_glyph('ó'), [0; 8]);
    assert_ne!(bitmap_glyph('Ñ'), [0; 8]);
    // Unsupported scripts fall back to '?'.
    assert_eq!(bitmap_glyph('日'), bitmap_glyph('?'));
  }

  #[test]
  fn drawing_is_clipped_to_canvas() {
    let mut canvas = RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]));
    Glyphs::Bitmap.draw_centered(
      &mut canvas,
      Rgba([0, 0, 0, 255]),
      (10, 5),
      32.0,
      "MUY LARGO",
    );
    assert!(canvas.pixels().any(|p| p.0 == [0, 0, 0, 255]));
  }

  #[test]
  fn missing_font_falls_back_to_bitmap() {
    let g = Glyphs::load(Some(Path::new("/nonexistent/arial.ttf")));
    assert!(matches!(g, Glyphs::Bitmap));
  }

  fn fixture_font() -> Glyphs {
    let g = Glyphs::load(Some(Path::new(concat!(
      env!("CARGO_MANIFEST_DIR"),
      "/tests/fixtures/DejaVuSansMono.ttf"
    ))));
    assert!(matches!(g, Glyphs::Scalable(_)));
    g
  }

  #[test]
  fn scalable_measure_grows_with_size_and_length() {
    let g = fixture_font();
    let (small_w, small_h) = g.measure(36.0, "0001");
    let (big_w, big_h) = g.measure(120.0, "0001");
    assert!(small_w > 0 && small_h > 0);
    assert!(big_w > small_w);
    assert!(big_h > small_h);
    assert!(g.measure(36.0, "Ana Gómez").0 > g.measure(36.0, "Ana").0);
  }

  #[test]
  fn scalable_text_is_drawn_around_the_centre() {
    let g = fixture_font();
    let white = Rgba([255, 255, 255, 255]);
    let mut canvas = RgbaImage::from_pixel(400, 200, white);
    g.draw_centered(&mut canvas, Rgba([0, 0, 0, 255]), (200, 100), 60.0, "0042");

    let (w, h) = g.measure(60.0, "0042");
    let inked: Vec<(u32, u32)> = canvas
      .enumerate_pixels()
      .filter(|(_, _, p)| p.0[0] < 128)
      .map(|(x, y, _)| (x, y))
      .collect();
    assert!(!inked.is_empty(), "nothing drawn");

    // Ink stays near the measured box around (200, 100).
    let slack = 8;
    for (x, y) in inked {
      assert!(x + slack >= 200 - w / 2 && x <= 200 + w / 2 + slack, "x = {x}");
      assert!(y + slack >= 100 - h / 2 && y <= 100 + h / 2 + slack, "y = {y}");
    }
  }
}
