use crate::error::GifResult;
use crate::GIFFrame;
use gif::Repeat;
use std::borrow::Cow;
use std::io::Write;

/// Writes full-screen frames with the `gif` crate
pub(crate) struct RustEncoder<W: Write> {
    gif_enc: gif::Encoder<W>,
    width: u16,
    height: u16,
}

impl<W: Write> RustEncoder<W> {
    /// Writes the header, logical screen and loop extension right away
    pub fn new(writer: W, width: usize, height: usize, repeat: Repeat) -> GifResult<Self> {
        let width = u16::try_from(width)?;
        let height = u16::try_from(height)?;
        let mut gif_enc = gif::Encoder::new(writer, width, height, &[])?;
        // no loop extension at all is the only way to play once
        if repeat != Repeat::Finite(0) {
            gif_enc.set_repeat(repeat)?;
        }
        Ok(Self { gif_enc, width, height })
    }

    pub fn write_frame(&mut self, f: &GIFFrame, delay: u16) -> GifResult<()> {
        let GIFFrame {ref pal, ref image, transparent_index} = *f;
        debug_assert_eq!(image.width(), self.width as usize);
        debug_assert_eq!(image.height(), self.height as usize);

        let pal_rgb: Vec<u8> = pal.iter().flat_map(|p| [p.r, p.g, p.b]).collect();

        self.gif_enc.write_frame(&gif::Frame {
            delay,
            // frames cover the whole screen, so transparent pixels must not show the previous one
            dispose: gif::DisposalMethod::Background,
            transparent: transparent_index,
            needs_user_input: false,
            top: 0,
            left: 0,
            width: self.width,
            height: self.height,
            interlaced: false,
            palette: Some(pal_rgb),
            buffer: Cow::Borrowed(image.buf()),
        })?;
        Ok(())
    }

    /// Writes the trailer and hands back the flushed writer
    pub fn finish(self) -> GifResult<W> {
        let mut w = self.gif_enc.into_inner()?;
        w.flush()?;
        Ok(w)
    }
}
