use std::path::Path;

use tiny_skia::{
    FillRule, FilterQuality, IntSize, Mask, PathBuilder, Pixmap, PixmapPaint, Transform,
};

use crate::error::AssetError;

/// The two alternation textures, decoded and premultiplied at native size.
#[derive(Debug, Clone)]
pub struct FieldImages {
    fields: [Pixmap; 2],
}

impl FieldImages {
    pub fn load(first: &Path, second: &Path) -> Result<Self, AssetError> {
        Ok(Self {
            fields: [decode(first)?, decode(second)?],
        })
    }

    /// Builds the fields from straight-alpha RGBA8 buffers of `width * height` pixels.
    pub fn from_rgba8(
        width: u32,
        height: u32,
        first: Vec<u8>,
        second: Vec<u8>,
    ) -> Result<Self, AssetError> {
        Ok(Self {
            fields: [
                to_pixmap(width, height, first)?,
                to_pixmap(width, height, second)?,
            ],
        })
    }

    pub fn native(&self, index: usize) -> Option<&Pixmap> {
        self.fields.get(index)
    }

    /// Scales both fields to `size` and cuts them to a centred disc.
    pub fn prepare(&self, size: u32) -> Result<[Pixmap; 2], AssetError> {
        let [first, second] = &self.fields;
        Ok([circular(first, size)?, circular(second, size)?])
    }
}

fn decode(path: &Path) -> Result<Pixmap, AssetError> {
    let img = image::open(path)
        .map_err(|source| AssetError::AssetLoad {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    log::debug!("loaded field {} ({width}x{height})", path.display());
    to_pixmap(width, height, img.into_raw())
}

fn to_pixmap(width: u32, height: u32, mut data: Vec<u8>) -> Result<Pixmap, AssetError> {
    let size = IntSize::from_wh(width, height).ok_or(AssetError::EmptyImage)?;
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(AssetError::WrongDimensions {
            expected,
            actual: data.len(),
        });
    }
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size).ok_or(AssetError::EmptyImage)
}

fn circular(src: &Pixmap, size: u32) -> Result<Pixmap, AssetError> {
    let canvas = || AssetError::Canvas(size, size);
    let mut out = Pixmap::new(size, size).ok_or_else(canvas)?;
    let mut mask = Mask::new(size, size).ok_or_else(canvas)?;

    let r = size as f32 / 2.0;
    let disc = PathBuilder::from_circle(r, r, r).ok_or_else(canvas)?;
    mask.fill_path(&disc, FillRule::Winding, true, Transform::identity());

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    let scale = Transform::from_scale(
        size as f32 / src.width() as f32,
        size as f32 / src.height() as f32,
    );
    out.draw_pixmap(0, 0, src.as_ref(), &paint, scale, Some(&mask));
    Ok(out)
}
