#![allow(dead_code)]

use imgref::{ImgRef, ImgVec};
use rgb::{ComponentMap, RGBA8};
use std::path::{Path, PathBuf};

pub const COLORS: [RGBA8; 6] = [
    RGBA8 { r: 255, g: 0, b: 0, a: 255 },
    RGBA8 { r: 0, g: 255, b: 0, a: 255 },
    RGBA8 { r: 0, g: 0, b: 255, a: 255 },
    RGBA8 { r: 255, g: 255, b: 0, a: 255 },
    RGBA8 { r: 0, g: 255, b: 255, a: 255 },
    RGBA8 { r: 255, g: 0, b: 255, a: 255 },
];

/// Solid 10×10 image, different for each `n`
pub fn solid(n: usize) -> ImgVec<RGBA8> {
    let c = COLORS[n % COLORS.len()];
    let shade = (n / COLORS.len() * 40) as u8;
    let c = RGBA8::new(c.r.saturating_sub(shade), c.g.saturating_sub(shade), c.b.saturating_sub(shade), 255);
    ImgVec::new(vec![c; 10 * 10], 10, 10)
}

pub fn write_png(path: &Path, img: &ImgVec<RGBA8>) {
    lodepng::encode32_file(path, img.buf(), img.width(), img.height()).unwrap();
}

/// Writes `frame_{name(n)}.png` for n in 0..count, with `solid(n)` pixels
pub fn write_frames(dir: &Path, count: usize, name: impl Fn(usize) -> String) -> Vec<PathBuf> {
    (0..count).map(|n| {
        let path = dir.join(format!("frame_{}.png", name(n)));
        write_png(&path, &solid(n));
        path
    }).collect()
}

pub struct DecodedGif {
    pub frames: Vec<ImgVec<RGBA8>>,
    pub delays: Vec<u16>,
}

pub fn decode_gif(mut gif_data: &[u8]) -> DecodedGif {
    let mut out = DecodedGif { frames: vec![], delays: vec![] };
    for_each_frame(&mut gif_data, |frame, pixels| {
        let (frame_width, frame_height) = (pixels.width(), pixels.height());
        out.delays.push(frame.delay);
        let pixels = pixels.pixels().map(|px| if px.a == 0 { RGBA8::default() } else { px }).collect();
        out.frames.push(ImgVec::new(pixels, frame_width, frame_height));
    });
    out
}

fn for_each_frame(gif_data: &mut &[u8], mut cb: impl FnMut(&gif::Frame, ImgRef<RGBA8>)) {
    let mut gif_opts = gif::DecodeOptions::new();
    gif_opts.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = gif_opts.read_info(gif_data).unwrap();
    let mut screen = gif_dispose::Screen::new_decoder(&decoder);

    while let Some(frame) = decoder.read_next_frame().unwrap() {
        screen.blit_frame(frame).unwrap();
        cb(frame, screen.pixels_rgba());
    }
}

/// Loop count from the NETSCAPE2.0 extension, `None` if there's no such extension
pub fn loop_count(gif_data: &[u8]) -> Option<u16> {
    let app = b"NETSCAPE2.0";
    let pos = gif_data.windows(app.len()).position(|w| w == app)? + app.len();
    match gif_data.get(pos..pos + 4)? {
        [3, 1, lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

#[track_caller]
pub fn assert_images_eq(a: ImgRef<RGBA8>, b: ImgRef<RGBA8>, max_diff: f64) {
    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    let diff = a.pixels().zip(b.pixels()).map(|(a, b)| {
        let a = a.map(|c| c as i32);
        let b = b.map(|c| c as i32);
        let d = a - b;
        (d.r * d.r +
         d.g * d.g +
         d.b * d.b +
         d.a * d.a) as u64
    }).sum::<u64>() as f64 / (a.width() * a.height()) as f64;
    assert!(diff <= max_diff, "{} diff > {}", diff, max_diff);
}
