use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::composite::{PremulRgba8, over, over_in_place, premultiply, unpremultiply};

/// Largest width or height a surface can have.
pub const MAX_SURFACE_DIM: u32 = u16::MAX as u32;

/// Mutable raster target in premultiplied RGBA8, row-major.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Pixels copied out of a surface, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl Region {
    /// Premultiplied pixel at (`x`, `y`), or `None` outside the region.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

fn checked_dims(width: u32, height: u32) -> CaptionResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(CaptionError::render(format!(
            "surface size {width}x{height} must be non-zero"
        )));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| CaptionError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CaptionError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> CaptionResult<Self> {
        let (w, h) = checked_dims(width, height)?;
        Ok(Self {
            width: w,
            height: h,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Reallocate to the new size. Previous contents are discarded even if the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> CaptionResult<()> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// Premultiplied RGBA8 bytes, row-major with no padding.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Overwrite every pixel with `premul`.
    pub fn fill(&mut self, premul: PremulRgba8) {
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    /// Premultiplied pixel at (`x`, `y`), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y as usize) * self.width() as usize + x as usize) * 4;
        let d = self.data();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Draw straight-alpha `img` with its top-left at (`x`, `y`), source-over at `opacity`.
    ///
    /// Only pixels inside `clip` (x, y, width, height) are touched; `None` clips to the surface.
    pub fn draw_rgba(
        &mut self,
        img: &image::RgbaImage,
        x: i64,
        y: i64,
        opacity: f32,
        clip: Option<(u32, u32, u32, u32)>,
    ) {
        let (cx0, cy0, cw, ch) = clip.unwrap_or((0, 0, self.width(), self.height()));
        let cx1 = i64::from(cx0.saturating_add(cw).min(self.width()));
        let cy1 = i64::from(cy0.saturating_add(ch).min(self.height()));
        let sx0 = x.max(i64::from(cx0));
        let sy0 = y.max(i64::from(cy0));
        let sx1 = (x + i64::from(img.width())).min(cx1);
        let sy1 = (y + i64::from(img.height())).min(cy1);
        if sx1 <= sx0 || sy1 <= sy0 {
            return;
        }

        let stride = self.width() as usize * 4;
        let data = self.pixmap.data_as_u8_slice_mut();
        for dy in sy0..sy1 {
            let row = dy as usize * stride;
            for dx in sx0..sx1 {
                let src = img.get_pixel((dx - x) as u32, (dy - y) as u32).0;
                let i = row + dx as usize * 4;
                let dst = [data[i], data[i + 1], data[i + 2], data[i + 3]];
                let out = over(dst, premultiply(src), opacity);
                data[i..i + 4].copy_from_slice(&out);
            }
        }
    }

    /// Copy a `width` x `height` block starting at (`x`, `y`).
    ///
    /// Pixels outside the surface read as transparent black.
    pub fn capture_region(&self, x: i64, y: i64, width: u32, height: u32) -> Region {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        for ry in 0..height {
            for rx in 0..width {
                let sx = x + i64::from(rx);
                let sy = y + i64::from(ry);
                if sx < 0 || sy < 0 {
                    continue;
                }
                if let Some(px) = self.pixel(sx as u32, sy as u32) {
                    let i = ((ry * width + rx) * 4) as usize;
                    data[i..i + 4].copy_from_slice(&px);
                }
            }
        }
        Region {
            width,
            height,
            data,
        }
    }

    /// Overwrite pixels with `region` placed at (`x`, `y`), clipped to the surface. No blending.
    pub fn put_region(&mut self, region: &Region, x: i64, y: i64) {
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));
        let stride = self.width() as usize * 4;
        let data = self.pixmap.data_as_u8_slice_mut();
        for ry in 0..region.height {
            let dy = y + i64::from(ry);
            if dy < 0 || dy >= h {
                continue;
            }
            for rx in 0..region.width {
                let dx = x + i64::from(rx);
                if dx < 0 || dx >= w {
                    continue;
                }
                let src = ((ry * region.width + rx) * 4) as usize;
                let dst = dy as usize * stride + dx as usize * 4;
                data[dst..dst + 4].copy_from_slice(&region.data[src..src + 4]);
            }
        }
    }

    /// Run `draw` against a fresh vector context and composite the result over this surface.
    pub fn paint_over<F>(&mut self, draw: F) -> CaptionResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> CaptionResult<()>,
    {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        draw(&mut ctx)?;
        ctx.flush();

        let mut layer = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.render_to_pixmap(&mut layer);
        over_in_place(
            self.pixmap.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
            1.0,
        )
    }

    /// Straight-alpha copy suitable for encoding.
    pub fn to_rgba_image(&self) -> CaptionResult<image::RgbaImage> {
        let mut raw = self.data().to_vec();
        for px in raw.chunks_exact_mut(4) {
            let out = unpremultiply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
        image::RgbaImage::from_raw(self.width(), self.height(), raw)
            .ok_or_else(|| CaptionError::render("surface byte length mismatch"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
