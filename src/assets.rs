pub(crate) mod decode;
pub(crate) mod font;
pub(crate) mod slot;
pub(crate) mod text;

use std::sync::Arc;

use decode::PreparedImage;
use text::TextBlock;

/// The drawable backing a watermark: a shaped text block or a decoded image.
#[derive(Clone, Debug)]
pub enum WatermarkAsset {
    /// Text shaped by [`text::TextLayoutEngine`].
    Text(Arc<TextBlock>),
    /// Decoded watermark image.
    Image(PreparedImage),
}

impl WatermarkAsset {
    /// The text block, if this is a text asset.
    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Self::Text(t) => Some(t),
            Self::Image(_) => None,
        }
    }

    /// The image, if this is an image asset.
    pub fn as_image(&self) -> Option<&PreparedImage> {
        match self {
            Self::Text(_) => None,
            Self::Image(i) => Some(i),
        }
    }
}
