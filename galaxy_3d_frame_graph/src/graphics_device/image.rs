/// Image and ImageView traits - GPU images used as attachments

use bitflags::bitflags;
use crate::render_pass::{SampleCount, TextureFormat};

bitflags! {
    /// How an image will be used
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const COLOR_ATTACHMENT = 1 << 0;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 1;
        const SAMPLED = 1 << 2;
        const TRANSFER_SRC = 1 << 3;
        const TRANSFER_DST = 1 << 4;
        const STORAGE = 1 << 5;
    }
}

/// Descriptor for creating an image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDesc {
    /// Debug name
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Concrete format (never `SWAPCHAIN`)
    pub format: TextureFormat,
    pub samples: SampleCount,
    pub usage: ImageUsage,
}

impl ImageDesc {
    /// Attachment image sized `width` x `height`, usage derived from the format
    ///
    /// Color targets can also be sampled and used as transfer source/destination
    /// (MSAA resolve); depth targets can be sampled.
    pub fn attachment(name: &str, width: u32, height: u32, format: TextureFormat, samples: SampleCount) -> Self {
        let usage = if format.is_depth_format() {
            ImageUsage::DEPTH_STENCIL_ATTACHMENT | ImageUsage::SAMPLED
        } else {
            ImageUsage::COLOR_ATTACHMENT
                | ImageUsage::SAMPLED
                | ImageUsage::TRANSFER_SRC
                | ImageUsage::TRANSFER_DST
        };

        Self {
            name: name.to_string(),
            width,
            height,
            format,
            samples,
            usage,
        }
    }
}

/// GPU image
pub trait Image: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn format(&self) -> TextureFormat;

    fn samples(&self) -> SampleCount;
}

/// View over a whole image, used as framebuffer attachment
pub trait ImageView: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn format(&self) -> TextureFormat;
}
