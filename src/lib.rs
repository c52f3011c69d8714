/*
 framegif, numbered PNG frames to animated GIF
 © 2024 framegif contributors

 This program is free software: you can redistribute it and/or modify
 it under the terms of the GNU Affero General Public License as
 published by the Free Software Foundation, either version 3 of the
 License, or (at your option) any later version.

 This program is distributed in the hope that it will be useful,
 but WITHOUT ANY WARRANTY; without even the implied warranty of
 MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 GNU Affero General Public License for more details.

 You should have received a copy of the GNU Affero General Public License
 along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
//! Turns a directory of `frame_*.png` files into a looping animated GIF.
//!
//! ```no_run
//! use framegif::{create_gif, default_output_path, Settings};
//! use framegif::progress::NoProgress;
//! use std::path::Path;
//!
//! let dir = Path::new("anim/");
//! let n = create_gif(dir, &default_output_path(dir), &Settings::default(), &mut NoProgress {})?;
//! println!("{n} frames in anim.gif");
//! # Ok::<_, framegif::Error>(())
//! ```

use imgref::*;
use log::info;
use rgb::*;

mod error;
pub use crate::error::*;
pub mod frames;
pub mod png;
pub mod progress;
use crate::progress::*;
mod encoderust;

pub use gif::Repeat;

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

/// One decoded PNG file, 8-bit RGBA
pub type DecodedFrame = ImgVec<RGBA8>;

/// Per-frame display time used when none is given
pub const DEFAULT_DURATION_MS: u32 = 150;

/// Encoding settings
#[derive(Copy, Clone, Debug)]
pub struct Settings {
    /// How long every frame is shown, in milliseconds
    pub duration_ms: u32,
    /// `Repeat::Infinite` loops forever
    pub repeat: Repeat,
    /// 1-100
    pub quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            repeat: Repeat::Infinite,
            quality: 100,
        }
    }
}

impl Settings {
    /// GIF delays are in 1/100ths of a second, and 0 means "as fast as possible" to some viewers
    pub fn gif_delay(&self) -> u16 {
        ((u64::from(self.duration_ms) + 5) / 10).clamp(1, u64::from(u16::MAX)) as u16
    }
}

/// Frame after palette quantization
struct GIFFrame {
    image: ImgVec<u8>,
    pal: Vec<RGBA8>,
    transparent_index: Option<u8>,
}

/// Perform GIF writing
pub struct Writer {
    settings: Settings,
}

impl Writer {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Encodes all frames, in order, each shown for `Settings::duration_ms`.
    ///
    /// `outfile` can be any writer, such as `File` or `&mut Vec`.
    ///
    /// `ProgressReporter.increase()` is called each time a frame has been written.
    /// Returns the number of frames written.
    pub fn write<W: Write>(&self, frames: Vec<DecodedFrame>, outfile: W, reporter: &mut dyn ProgressReporter) -> GifResult<usize> {
        let (width, height) = match frames.first() {
            Some(first) => (first.width(), first.height()),
            None => return Err(Error::NoFrames(PathBuf::new())),
        };

        let mut enc = encoderust::RustEncoder::new(outfile, width, height, self.settings.repeat)?;
        let delay = self.settings.gif_delay();
        let total = frames.len();

        for (n, image) in frames.into_iter().enumerate() {
            if image.width() != width || image.height() != height {
                return Err(Error::WrongSize(format!("Frame {} has wrong size ({}×{}, expected {}×{})", n + 1,
                    image.width(), image.height(), width, height)));
            }
            let frame = self.quantize(binary_alpha(image))?;
            enc.write_frame(&frame, delay)?;
            if !reporter.increase() {
                return Err(Error::Aborted);
            }
        }
        enc.finish()?;
        info!("encoded {total} frames of {width}×{height}, {delay}cs each");
        Ok(total)
    }

    /// Reduces the frame to a palette of at most 256 colors.
    ///
    /// Transparent pixels all get the same palette entry.
    fn quantize(&self, image: DecodedFrame) -> GifResult<GIFFrame> {
        let has_transparency = image.buf().iter().any(|px| px.a == 0);
        let (buf, width, height) = image.into_contiguous_buf();

        let mut liq = imagequant::new();
        liq.set_quality(0, self.settings.quality.clamp(1, 100))?;
        let mut img = liq.new_image_borrowed(&buf, width, height, 0.)?;
        if has_transparency {
            img.add_fixed_color(RGBA8::new(0, 0, 0, 0))?;
        }
        let mut res = liq.quantize(&mut img)?;
        res.set_dithering_level(0.5)?;

        let (pal, pal_img) = res.remapped(&mut img)?;
        debug_assert_eq!(width * height, pal_img.len());

        let transparent_index = pal.iter().position(|p| p.a == 0).map(|i| i as u8);
        Ok(GIFFrame {
            image: Img::new(pal_img, width, height),
            pal,
            transparent_index,
        })
    }
}

/// GIF has only fully transparent or fully opaque pixels
fn binary_alpha(mut image: DecodedFrame) -> DecodedFrame {
    // 8×8 Bayer matrix, scaled to 8..=134 so mostly-opaque pixels stay opaque
    const DITHER: [u8; 64] = [
     0*2+8,48*2+8,12*2+8,60*2+8, 3*2+8,51*2+8,15*2+8,63*2+8,
    32*2+8,16*2+8,44*2+8,28*2+8,35*2+8,19*2+8,47*2+8,31*2+8,
     8*2+8,56*2+8, 4*2+8,52*2+8,11*2+8,59*2+8, 7*2+8,55*2+8,
    40*2+8,24*2+8,36*2+8,20*2+8,43*2+8,27*2+8,39*2+8,23*2+8,
     2*2+8,50*2+8,14*2+8,62*2+8, 1*2+8,49*2+8,13*2+8,61*2+8,
    34*2+8,18*2+8,46*2+8,30*2+8,33*2+8,17*2+8,45*2+8,29*2+8,
    10*2+8,58*2+8, 6*2+8,54*2+8, 9*2+8,57*2+8, 5*2+8,53*2+8,
    42*2+8,26*2+8,38*2+8,22*2+8,41*2+8,25*2+8,37*2+8,21*2+8];

    for (y, row) in image.rows_mut().enumerate() {
        for (x, px) in row.iter_mut().enumerate() {
            if px.a < 255 {
                *px = if px.a < DITHER[(y & 7) * 8 + (x & 7)] {
                    RGBA8::new(0, 0, 0, 0)
                } else {
                    RGBA8::new(px.r, px.g, px.b, 255)
                };
            }
        }
    }
    image
}

/// Collects and decodes every `frame_*.png` in `frames_dir`.
///
/// Reports the number of files found before decoding starts.
pub fn load_frames(frames_dir: &Path, reporter: &mut dyn ProgressReporter) -> GifResult<Vec<DecodedFrame>> {
    let frames = frames::collect_frames(frames_dir)?;
    reporter.frames_found(frames.len());
    png::Lodecoder::new(frames).decode_all()
}

/// The whole pipeline: collect, decode all, then encode to `output_path`.
///
/// The output file is created only after every frame decoded successfully,
/// and an existing file is overwritten.
pub fn create_gif(frames_dir: &Path, output_path: &Path, settings: &Settings, reporter: &mut dyn ProgressReporter) -> GifResult<usize> {
    let frames = load_frames(frames_dir, reporter)?;
    let file = File::create(output_path)
        .map_err(|e| io::Error::new(e.kind(), format!("Can't write to {}: {}", output_path.display(), e)))?;
    Writer::new(*settings).write(frames, io::BufWriter::new(file), reporter)
}

/// `anim/` → `anim.gif`
pub fn default_output_path(frames_dir: &Path) -> PathBuf {
    // collecting components drops trailing separators
    let mut path = frames_dir.components().collect::<PathBuf>().into_os_string();
    path.push(".gif");
    path.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_from_dir() {
        assert_eq!(default_output_path(Path::new("anim")), Path::new("anim.gif"));
        assert_eq!(default_output_path(Path::new("anim/")), Path::new("anim.gif"));
        assert_eq!(default_output_path(Path::new("anim//")), Path::new("anim.gif"));
        assert_eq!(default_output_path(Path::new("out/anim/")), Path::new("out/anim.gif"));
        assert_eq!(default_output_path(Path::new("./anim/")), Path::new("./anim.gif"));
    }

    #[test]
    fn delays() {
        let delay = |duration_ms| Settings { duration_ms, ..Settings::default() }.gif_delay();
        assert_eq!(Settings::default().gif_delay(), 15);
        assert_eq!(delay(100), 10);
        assert_eq!(delay(33), 3);
        assert_eq!(delay(35), 4);
        assert_eq!(delay(1), 1);
        assert_eq!(delay(u32::MAX), u16::MAX);
    }

    #[test]
    fn alpha_is_binary() {
        let img = ImgVec::new(vec![RGBA8::new(10, 20, 30, 0), RGBA8::new(10, 20, 30, 254), RGBA8::new(1, 2, 3, 255), RGBA8::new(9, 9, 9, 5)], 2, 2);
        let out = binary_alpha(img);
        assert_eq!(out.buf()[0], RGBA8::new(0, 0, 0, 0));
        assert_eq!(out.buf()[1], RGBA8::new(10, 20, 30, 255));
        assert_eq!(out.buf()[2], RGBA8::new(1, 2, 3, 255));
        assert_eq!(out.buf()[3], RGBA8::new(0, 0, 0, 0));
    }

    #[test]
    fn empty_write_is_an_error() {
        let mut out = Vec::new();
        let res = Writer::new(Settings::default()).write(Vec::new(), &mut out, &mut NoProgress {});
        assert!(matches!(res, Err(Error::NoFrames(_))));
    }

    #[test]
    fn reporter_can_abort() {
        struct StopAfterOne;
        impl ProgressReporter for StopAfterOne {
            fn increase(&mut self) -> bool { false }
        }
        let frames = vec![ImgVec::new(vec![RGBA8::new(255, 0, 0, 255); 4], 2, 2); 3];
        let res = Writer::new(Settings::default()).write(frames, Vec::new(), &mut StopAfterOne);
        assert!(matches!(res, Err(Error::Aborted)));
    }
}
