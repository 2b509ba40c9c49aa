use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ab_glyph::FontRef;
use anyhow::{Result, ensure};
use fixation_cache::{TextId, intern_text};
use fixation_core::{ArrowDirection, FieldId, Stimulus, StimulusLayout};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Transform};

use crate::error::AssetError;
use crate::field::FieldImages;
use crate::text::render_text_pixmap;

static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TextKey {
    id: TextId,
    size_bits: u32,
    color: [u8; 4],
}

/// Rasterised text per (string, size, colour); strings are keyed through the interner.
struct TextCache {
    font: FontRef<'static>,
    wrap_width: f32,
    map: HashMap<TextKey, Option<Arc<Pixmap>>>,
}

impl TextCache {
    fn new(font: FontRef<'static>, wrap_width: f32) -> Self {
        Self {
            font,
            wrap_width,
            map: HashMap::new(),
        }
    }

    fn get_or_render(&mut self, text: &str, size: f32, color: [u8; 4]) -> Option<Arc<Pixmap>> {
        let key = TextKey {
            id: intern_text(text),
            size_bits: size.to_bits(),
            color,
        };
        let (font, wrap_width) = (&self.font, self.wrap_width);
        self.map
            .entry(key)
            .or_insert_with(|| {
                render_text_pixmap(text, size, font, color, wrap_width).map(Arc::new)
            })
            .clone()
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub compose: Duration,
    pub copy: Duration,
    pub primitives: usize,
}

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    layout: StimulusLayout,
    background: Color,
    fields: [Pixmap; 2],
    text_cache: TextCache,
    canvas: Pixmap,
}

impl SkiaRenderer {
    pub fn new(
        width: u32,
        height: u32,
        layout: StimulusLayout,
        fields: &FieldImages,
    ) -> Result<Self, AssetError> {
        let font = FontRef::try_from_slice(FONT_BYTES)?;
        let fields = fields.prepare(layout.field_size.round().max(1.0) as u32)?;
        let canvas = Pixmap::new(width, height).ok_or(AssetError::Canvas(width, height))?;
        let [r, g, b, a] = layout.background;

        let mut renderer = SkiaRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            background: Color::from_rgba8(r, g, b, a),
            text_cache: TextCache::new(font, layout.text_wrap_width),
            layout,
            fields,
            canvas,
        };
        renderer.canvas.fill(renderer.background);
        Ok(renderer)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> &StimulusLayout {
        &self.layout
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    pub fn cached_texts(&self) -> usize {
        self.text_cache.len()
    }

    /// Rasterises a text ahead of its first frame.
    pub fn warm_text(&mut self, content: &str) {
        let (size, color) = (self.layout.text_size, self.layout.foreground);
        self.text_cache.get_or_render(content, size, color);
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), AssetError> {
        let mut canvas = Pixmap::new(new_width, new_height)
            .ok_or(AssetError::Canvas(new_width, new_height))?;
        canvas.fill(self.background);
        self.canvas = canvas;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        Ok(())
    }

    /// Composes `frame` and copies the canvas into an RGBA8 `frame_buffer` of the same size.
    pub fn render_frame(&mut self, frame: &[Stimulus], frame_buffer: &mut [u8]) -> Result<FrameStats> {
        let start = Instant::now();
        self.compose(frame);
        let compose = start.elapsed();

        let data = self.canvas.data();
        ensure!(
            frame_buffer.len() == data.len(),
            "frame buffer holds {} bytes, canvas {}x{} needs {}",
            frame_buffer.len(),
            self.width,
            self.height,
            data.len()
        );
        let copy_start = Instant::now();
        frame_buffer.copy_from_slice(data);

        Ok(FrameStats {
            compose,
            copy: copy_start.elapsed(),
            primitives: frame.len(),
        })
    }

    /// Fills the background and draws `frame` in order, later primitives on top.
    pub fn compose(&mut self, frame: &[Stimulus]) {
        self.canvas.fill(self.background);
        for stimulus in frame {
            self.draw(stimulus);
        }
    }

    fn draw(&mut self, stimulus: &Stimulus) {
        let (cx, cy) = self.center;
        match stimulus {
            Stimulus::Field(id) => self.draw_field(*id),
            Stimulus::Circle { radius, color } => {
                let mut pb = PathBuilder::new();
                pb.push_circle(cx, cy, *radius);
                self.fill(pb, *color);
            }
            Stimulus::Arrow {
                direction,
                size,
                color,
            } => {
                // size is the arrow height; the head is as long as it is tall
                let half = size / 2.0;
                let mut pb = PathBuilder::new();
                match direction {
                    ArrowDirection::Right => {
                        pb.move_to(cx + half, cy);
                        pb.line_to(cx - half, cy - half);
                        pb.line_to(cx - half, cy + half);
                    }
                    ArrowDirection::Left => {
                        pb.move_to(cx - half, cy);
                        pb.line_to(cx + half, cy - half);
                        pb.line_to(cx + half, cy + half);
                    }
                }
                pb.close();
                self.fill(pb, *color);
            }
            Stimulus::Text {
                content,
                size,
                color,
            } => self.blit_text(content, *size, *color, (cx, cy)),
            Stimulus::Glyph {
                glyph,
                x,
                size,
                color,
            } => self.blit_text(glyph.as_str(), *size, *color, (cx + x, cy)),
        }
    }

    fn draw_field(&mut self, id: FieldId) {
        let field = &self.fields[id.index()];
        let x = (self.center.0 - field.width() as f32 / 2.0).round() as i32;
        let y = (self.center.1 - field.height() as f32 / 2.0).round() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            field.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn fill(&mut self, pb: PathBuilder, color: [u8; 4]) {
        let Some(path) = pb.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;
        self.canvas
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn blit_text(&mut self, text: &str, size: f32, color: [u8; 4], at: (f32, f32)) {
        let Some(cached) = self.text_cache.get_or_render(text, size, color) else {
            return;
        };
        let pm: &Pixmap = &cached;
        let x = (at.0 - pm.width() as f32 / 2.0).round() as i32;
        let y = (at.1 - pm.height() as f32 / 2.0).round() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            pm.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}
