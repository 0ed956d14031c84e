//! [`BibRenderer`]: stamps a bib number and a name onto the base image.

use std::{io::Cursor, path::PathBuf};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use tracing::{info, warn};

use crate::{Result, text::Glyphs};

// ─── Layout ──────────────────────────────────────────────────────────────────

const FALLBACK_WIDTH: u32 = 800;
const FALLBACK_HEIGHT: u32 = 600;
const FALLBACK_BORDER: u32 = 10;
const FALLBACK_TITLE: &str = "CARRERA DEL MÉDICO";
const TITLE_PX: f32 = 48.0;

const NUMBER_PX: f32 = 120.0;
/// The number sits this far above the vertical middle.
const NUMBER_RISE: i32 = 60;
const NAME_PX: f32 = 36.0;
/// The name sits this far below the vertical middle.
const NAME_DROP: i32 = 40;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const BORDER_BLUE: Rgba<u8> = Rgba([0, 51, 153, 255]);

// ─── Configuration ───────────────────────────────────────────────────────────

/// Where to find the optional assets. Either may be absent.
#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
  /// PNG template to draw on.
  pub template_path: Option<PathBuf>,
  /// TrueType/OpenType face for the number and name.
  pub font_path:     Option<PathBuf>,
}

// ─── Renderer ────────────────────────────────────────────────────────────────

pub struct BibRenderer {
  base:         RgbaImage,
  glyphs:       Glyphs,
  has_template: bool,
}

impl BibRenderer {
  /// Load assets once. Construction never fails: a missing template is
  /// replaced by a generated canvas and a missing font by the embedded one.
  pub fn new(config: &RendererConfig) -> Self {
    let glyphs = Glyphs::load(config.font_path.as_deref());

    let template = config.template_path.as_deref().and_then(|path| {
      match image::open(path) {
        Ok(img) => {
          info!(path = %path.display(), "loaded bib template");
          Some(img.to_rgba8())
        }
        Err(e) => {
          warn!(path = %path.display(), error = %e, "bib template unavailable; using generated canvas");
          None
        }
      }
    });

    let has_template = template.is_some();
    let base = template.unwrap_or_else(|| fallback_canvas(&glyphs));
    Self { base, glyphs, has_template }
  }

  /// Whether a template image (as opposed to the generated canvas) is in use.
  pub fn has_template(&self) -> bool { self.has_template }

  /// Render the bib for participant `id` and return PNG bytes.
  pub fn render(&self, id: u32, name: &str) -> Result<Vec<u8>> {
    let mut canvas = self.base.clone();
    let cx = (canvas.width() / 2) as i32;
    let cy = (canvas.height() / 2) as i32;

    let number = format!("{id:04}");
    self
      .glyphs
      .draw_centered(&mut canvas, BLACK, (cx, cy - NUMBER_RISE), NUMBER_PX, &number);
    self
      .glyphs
      .draw_centered(&mut canvas, BLUE, (cx, cy + NAME_DROP), NAME_PX, name);

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
  }
}

/// White canvas with a blue border and the event title across the top.
fn fallback_canvas(glyphs: &Glyphs) -> RgbaImage {
  let mut canvas = RgbaImage::from_pixel(FALLBACK_WIDTH, FALLBACK_HEIGHT, WHITE);

  for inset in 0..FALLBACK_BORDER {
    let rect = Rect::at(inset as i32, inset as i32)
      .of_size(FALLBACK_WIDTH - 2 * inset, FALLBACK_HEIGHT - 2 * inset);
    draw_hollow_rect_mut(&mut canvas, rect, BORDER_BLUE);
  }

  glyphs.draw_centered(
    &mut canvas,
    BORDER_BLUE,
    ((FALLBACK_WIDTH / 2) as i32, 70),
    TITLE_PX,
    FALLBACK_TITLE,
  );
  canvas
}

// ─── Download name ───────────────────────────────────────────────────────────

/// Attachment filename for a bib, e.g. `participante_0001_Ana_Gomez.png`.
///
/// Spanish accents are folded to ASCII; anything else that is not
/// alphanumeric is dropped, and whitespace becomes `_`.
pub fn download_filename(number: &str, name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  for c in name.trim().chars() {
    match c {
      c if c.is_ascii_alphanumeric() => slug.push(c),
      c if c.is_whitespace() || c == '-' => slug.push('_'),
      'á' | 'à' | 'ä' | 'â' => slug.push('a'),
      'é' | 'è' | 'ë' | 'ê' => slug.push('e'),
      'í' | 'ì' | 'ï' | 'î' => slug.push('i'),
      'ó' | 'ò' | 'ö' | 'ô' => slug.push('o'),
      'ú' | 'ù' | 'ü' | 'û' => slug.push('u'),
      'Á' | 'À' | 'Ä' | 'Â' => slug.push('A'),
      'É' | 'È' | 'Ë' | 'Ê' => slug.push('E'),
      'Í' | 'Ì' | 'Ï' | 'Î' => slug.push('I'),
      'Ó' | 'Ò' | 'Ö' | 'Ô' => slug.push('O'),
      'Ú' | 'Ù' | 'Ü' | 'Û' => slug.push('U'),
      'ñ' => slug.push('n'),
      'Ñ' => slug.push('N'),
      _ => {}
    }
  }

  if slug.is_empty() {
    format!("participante_{number}.png")
  } else {
    format!("participante_{number}_{slug}.png")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(png, ImageFormat::Png)
      .expect("valid png")
      .to_rgba8()
  }

  fn default_renderer() -> BibRenderer { BibRenderer::new(&RendererConfig::default()) }

  #[test]
  fn fallback_canvas_renders_png() {
    let r = default_renderer();
    assert!(!r.has_template());

    let img = decode(&r.render(1, "Ana Gómez").unwrap());
    assert_eq!(img.dimensions(), (FALLBACK_WIDTH, FALLBACK_HEIGHT));
    // Border.
    assert_eq!(*img.get_pixel(0, 0), BORDER_BLUE);
    assert_eq!(*img.get_pixel(FALLBACK_WIDTH - 1, FALLBACK_HEIGHT - 1), BORDER_BLUE);
  }

  #[test]
  fn number_and_name_are_stamped() {
    let img = decode(&default_renderer().render(1, "Ana Gómez").unwrap());
    let mid = (FALLBACK_HEIGHT / 2) as i32;

    let number_band = (mid - NUMBER_RISE - 20) as u32..(mid - NUMBER_RISE + 20) as u32;
    let name_band = (mid + NAME_DROP - 8) as u32..(mid + NAME_DROP + 8) as u32;

    let count = |band: std::ops::Range<u32>, color: Rgba<u8>| {
      band
        .flat_map(|y| (0..FALLBACK_WIDTH).map(move |x| (x, y)))
        .filter(|&(x, y)| *img.get_pixel(x, y) == color)
        .count()
    };
    assert!(count(number_band, BLACK) > 0, "number not drawn");
    assert!(count(name_band, BLUE) > 0, "name not drawn");
  }

  #[test]
  fn rendering_is_deterministic() {
    let r = default_renderer();
    assert_eq!(r.render(7, "Luis").unwrap(), r.render(7, "Luis").unwrap());
    assert_ne!(r.render(7, "Luis").unwrap(), r.render(8, "Luis").unwrap());
    assert_ne!(r.render(7, "Luis").unwrap(), r.render(7, "Lucía").unwrap());
  }

  #[test]
  fn template_is_used_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.png");
    RgbaImage::from_pixel(400, 300, Rgba([250, 240, 200, 255]))
      .save(&path)
      .unwrap();

    let r = BibRenderer::new(&RendererConfig {
      template_path: Some(path),
      font_path:     None,
    });
    assert!(r.has_template());

    let img = decode(&r.render(12, "Ana").unwrap());
    assert_eq!(img.dimensions(), (400, 300));
    assert_eq!(*img.get_pixel(0, 0), Rgba([250, 240, 200, 255]));
  }

  #[test]
  fn missing_assets_fall_back() {
    let r = BibRenderer::new(&RendererConfig {
      template_path: Some("/nonexistent/template.png".into()),
      font_path:     Some("/nonexistent/arial.ttf".into()),
    });
    assert!(!r.has_template());
    assert!(r.render(2000, "Nombre Muy Largo Que No Cabe En El Lienzo").is_ok());
  }

  #[test]
  fn configured_font_is_used() {
    let font = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSansMono.ttf");
    let r = BibRenderer::new(&RendererConfig {
      template_path: None,
      font_path:     Some(font.into()),
    });

    let png = r.render(1, "Ana Gómez").unwrap();
    assert_ne!(png, default_renderer().render(1, "Ana Gómez").unwrap());

    let img = decode(&png);
    let mid = (FALLBACK_HEIGHT / 2) as i32;
    let number_band = (mid - NUMBER_RISE - 20) as u32..(mid - NUMBER_RISE + 20) as u32;
    let dark = number_band
      .flat_map(|y| (0..FALLBACK_WIDTH).map(move |x| (x, y)))
      .filter(|&(x, y)| img.get_pixel(x, y).0[..3].iter().all(|&c| c < 64))
      .count();
    assert!(dark > 0, "number not drawn");
  }

  #[test]
  fn download_filename_is_ascii() {
    assert_eq!(
      download_filename("0001", "Ana Gómez"),
      "participante_0001_Ana_Gomez.png"
    );
    assert_eq!(
      download_filename("0002", "  José Peña-Núñez "),
      "participante_0002_Jose_Pena_Nunez.png"
    );
    assert_eq!(download_filename("0003", "李"), "participante_0003.png");
  }
}
