//! Decoding PNG frame files with lodepng

use crate::error::*;
use crate::frames::FrameSet;
use crate::DecodedFrame;
use imgref::ImgVec;
use log::debug;
use std::path::Path;

/// Decodes every file of a `FrameSet`, in order, all at once.
pub struct Lodecoder {
    frames: FrameSet,
}

impl Lodecoder {
    pub fn new(frames: FrameSet) -> Self {
        Self { frames }
    }

    /// Stops at the first file that fails to decode.
    ///
    /// All frames must have the size of the first one.
    pub fn decode_all(self) -> GifResult<Vec<DecodedFrame>> {
        let mut decoded: Vec<DecodedFrame> = Vec::with_capacity(self.frames.len());
        for (n, frame) in self.frames.into_iter().enumerate() {
            let image = decode_png_file(&frame.path)?;
            if let Some(first) = decoded.first() {
                if first.width() != image.width() || first.height() != image.height() {
                    return Err(Error::WrongSize(format!("Frame {} has wrong size ({}×{}, expected {}×{})", n + 1,
                        image.width(), image.height(), first.width(), first.height())));
                }
            }
            decoded.push(image);
        }
        Ok(decoded)
    }
}

/// Read and decode a PNG file from disk as 8-bit RGBA.
pub fn decode_png_file(path: &Path) -> GifResult<DecodedFrame> {
    let image = lodepng::decode32_file(path)
        .map_err(|err| Error::PNG(format!("Can't load {}: {}", path.display(), err)))?;

    if image.width == 0 || image.height == 0 {
        return Err(Error::WrongSize(format!("{} is empty", path.display())));
    }
    debug!("decoded {} ({}×{})", path.display(), image.width, image.height);
    Ok(ImgVec::new(image.buffer, image.width, image.height))
}
