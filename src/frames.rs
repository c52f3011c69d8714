//! Finding `frame_*.png` files and putting them in animation order

use crate::error::*;
use log::debug;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const PREFIX: &str = "frame_";
const EXTENSION: &str = ".png";

/// One matched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    /// Number parsed from the digits right after `frame_`, if there are any
    pub index: Option<u64>,
    pub path: PathBuf,
}

/// Matched files in the order they will be animated. Never empty.
#[derive(Debug, Clone)]
pub struct FrameSet {
    frames: Vec<FrameFile>,
}

impl FrameSet {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`, but clippy insists
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl IntoIterator for FrameSet {
    type Item = FrameFile;
    type IntoIter = std::vec::IntoIter<FrameFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

/// Lists `dir` and returns every `frame_*.png` file in it, numerically sorted.
///
/// A missing directory behaves like an empty one, and both fail with `Error::NoFrames`.
pub fn collect_frames(dir: &Path) -> GifResult<FrameSet> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound || dir.exists() && !dir.is_dir() => {
            debug!("can't list {}: {}", dir.display(), e);
            return Err(Error::NoFrames(dir.to_owned()));
        },
        Err(e) => return Err(e.into()),
    };

    let mut frames = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(index) = file_name.to_str().and_then(frame_name_match) else {
            continue;
        };
        let path = entry.path();
        // follows symlinks
        if !path.is_file() {
            debug!("skipping {}: not a file", path.display());
            continue;
        }
        debug!("found frame {}", path.display());
        frames.push(FrameFile { index, path });
    }

    if frames.is_empty() {
        return Err(Error::NoFrames(dir.to_owned()));
    }

    frames.sort_by(compare_frames);
    Ok(FrameSet { frames })
}

/// `Some(index)` if the name looks like `frame_<suffix>.png`.
/// The inner index is `None` when the suffix doesn't start with digits.
fn frame_name_match(name: &str) -> Option<Option<u64>> {
    let suffix = name.strip_prefix(PREFIX)?.strip_suffix(EXTENSION)?;
    let digits_end = suffix.find(|c: char| !c.is_ascii_digit()).unwrap_or(suffix.len());
    // overflowing numbers sort by name
    Some(suffix[..digits_end].parse().ok())
}

fn compare_frames(a: &FrameFile, b: &FrameFile) -> Ordering {
    let by_index = match (a.index, b.index) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_index.then_with(|| {
        let a = a.path.file_name().unwrap_or_default().to_string_lossy();
        let b = b.path.file_name().unwrap_or_default().to_string_lossy();
        natord::compare(&a, &b)
    })
}
