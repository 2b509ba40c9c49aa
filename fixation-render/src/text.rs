use ab_glyph::{Font, FontRef, Glyph, GlyphId, PxScale, ScaleFont, point};
use tiny_skia::{Pixmap, PremultipliedColorU8};

/// Greedy word wrap: breaks before the word that would push a line past `max_width`.
pub fn wrap_lines(text: &str, font: &FontRef<'_>, scale: PxScale, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if line_width(font, scale, &candidate) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

pub fn line_width(font: &FontRef<'_>, scale: PxScale, line: &str) -> f32 {
    let sf = font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for ch in line.chars() {
        let id = font.glyph_id(ch);
        if let Some(p) = prev {
            width += sf.kern(p, id);
        }
        width += sf.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Rasterises `text` into a transparent premultiplied pixmap, lines centred.
///
/// The pixmap covers the layout box (line advance by line height), so its
/// centre is the optical centre of the block. Returns `None` for blank text.
pub fn render_text_pixmap(
    text: &str,
    font_size: f32,
    font: &FontRef<'_>,
    color: [u8; 4],
    wrap_width: f32,
) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);
    let lines = wrap_lines(text, font, scale, wrap_width);
    if lines.is_empty() {
        return None;
    }

    let line_height = sf.height() + sf.line_gap();
    let widths: Vec<f32> = lines.iter().map(|l| line_width(font, scale, l)).collect();
    let block_width = widths.iter().copied().fold(0.0f32, f32::max);

    let w = block_width.ceil().max(1.0) as u32;
    let h = (line_height * lines.len() as f32).ceil().max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pm.pixels_mut();

    for (row, (line, width)) in lines.iter().zip(&widths).enumerate() {
        let baseline = sf.ascent() + row as f32 * line_height;
        let mut pen_x = (block_width - width) / 2.0;
        let mut prev: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(p) = prev {
                pen_x += sf.kern(p, id);
            }
            let glyph = Glyph {
                id,
                scale,
                position: point(pen_x, baseline),
            };
            if let Some(outline) = font.outline_glyph(glyph) {
                let b = outline.px_bounds();
                outline.draw(|x, y, cov| {
                    let ix = b.min.x as i32 + x as i32;
                    let iy = b.min.y as i32 + y as i32;
                    if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                        return;
                    }
                    let i = iy as usize * stride + ix as usize;
                    dst[i] = blend_over(dst[i], color, cov);
                });
            }
            pen_x += sf.h_advance(id);
            prev = Some(id);
        }
    }

    Some(pm)
}

// Porter-Duff over in premultiplied space: out = src + bg * (1 - src.a)
fn blend_over(bg: PremultipliedColorU8, color: [u8; 4], coverage: f32) -> PremultipliedColorU8 {
    if coverage <= f32::EPSILON {
        return bg;
    }
    let a = (coverage * color[3] as f32 / 255.0).clamp(0.0, 1.0);
    let inv = 1.0 - a;
    let channel = |src: u8, dst: u8| (src as f32 * a + dst as f32 * inv).round().min(255.0) as u8;

    let out_a = channel(255, bg.alpha());
    let r = channel(color[0], bg.red()).min(out_a);
    let g = channel(color[1], bg.green()).min(out_a);
    let b = channel(color[2], bg.blue()).min(out_a);
    PremultipliedColorU8::from_rgba(r, g, b, out_a).unwrap_or(bg)
}
