use crate::assets::decode::PreparedImage;
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Raster target holding composited, premultiplied RGBA8 pixels.
///
/// Sized to the source image's natural resolution. Resizing clears the pixels, so it only
/// happens through [`Surface::ensure_size`] when the size actually differs.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    resizes: u64,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("resizes", &self.resizes)
            .finish()
    }
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> OvermarkResult<Self> {
        let (w, h) = checked_size(width, height)?;
        Ok(Self {
            width: w,
            height: h,
            pixmap: vello_cpu::Pixmap::new(w, h),
            resizes: 0,
        })
    }

    /// Allocate a transparent surface matching `image`'s natural size.
    pub fn for_image(image: &PreparedImage) -> OvermarkResult<Self> {
        Self::new(image.width, image.height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// How many times the pixel buffer was reallocated after construction.
    pub fn resize_count(&self) -> u64 {
        self.resizes
    }

    /// Reallocate to `width` x `height` only if the size differs. Returns `true` on resize.
    pub fn ensure_size(&mut self, width: u32, height: u32) -> OvermarkResult<bool> {
        let (w, h) = checked_size(width, height)?;
        if w == self.width && h == self.height {
            return Ok(false);
        }
        self.width = w;
        self.height = h;
        self.pixmap = vello_cpu::Pixmap::new(w, h);
        self.resizes += 1;
        Ok(true)
    }

    /// Premultiplied RGBA8 pixels, row-major.
    pub fn data_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Straight-alpha RGBA8 copy of the pixels, as consumed by encoders and displays.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = self.data_premul().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Premultiplied RGBA8 pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = (y as usize * self.width() as usize + x as usize) * 4;
        let px = self.data_premul().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub(crate) fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }

    pub(crate) fn dims_u16(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}

fn checked_size(width: u32, height: u32) -> OvermarkResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(OvermarkError::precondition(
            "surface width and height must be > 0",
        ));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| OvermarkError::precondition("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| OvermarkError::precondition("surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
