// playback.rs — Frame providers and on-disk sequence playback.
//
// A sequence directory holds `images.txt`, one frame per line:
//
//   <timestamp in seconds> <path relative to the directory>
//
// Blank lines and lines starting with `#` are ignored. Timestamps are
// replayed relative to the first entry, so sequences recorded with epoch
// timestamps start immediately.
//
// Pacing is wall-clock driven and never sleeps: each `next_frame` call
// skips every entry whose time has already passed and decodes the first
// entry still in the future (or the last one). A caller polling faster than
// the sequence rate sees the same frame repeatedly; a slow caller drops
// frames.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::frame::Frame;

/// Index file name inside a sequence directory.
pub const IMAGE_INDEX: &str = "images.txt";

/// One decoded frame with its presentation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    /// Microseconds on the provider's clock.
    pub timestamp_us: u64,
    pub frame: Frame,
}

/// Source of luminance frames.
pub trait FrameProvider {
    fn next_frame(&mut self) -> Result<CameraFrame>;
}

/// One line of `images.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub timestamp_us: u64,
    pub path: PathBuf,
}

/// Parse the contents of an image index. Paths are joined onto `root`.
///
/// `index_path` is only used in error messages.
pub fn parse_image_index(root: &Path, index_path: &Path, text: &str) -> Result<Vec<ImageEntry>> {
    let mut entries = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = || Error::MalformedIndex {
            path: index_path.to_path_buf(),
            line: n + 1,
        };

        let (seconds, rel) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let seconds: f64 = seconds.parse().map_err(|_| malformed())?;
        let rel = rel.trim();
        if rel.is_empty() || !seconds.is_finite() || seconds < 0.0 {
            return Err(malformed());
        }

        entries.push(ImageEntry {
            timestamp_us: (seconds * 1_000_000.0) as u64,
            path: root.join(rel),
        });
    }
    Ok(entries)
}

/// Decode an image file into an 8-bit luminance frame.
pub fn load_luma(path: &Path) -> Result<Frame> {
    let img = image::open(path)
        .map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();
    let (w, h) = img.dimensions();
    Ok(Frame::from_vec(w as usize, h as usize, img.into_raw()))
}

/// Replays an image sequence at its recorded rate.
#[derive(Debug)]
pub struct PlaybackFrameProvider {
    entries: Vec<ImageEntry>,
    loop_playback: bool,
    current: usize,
    /// Clock origin for `timestamp_us`.
    epoch: Instant,
    /// Provider time the current pass started at. Set by the first call.
    start_us: Option<u64>,
}

impl PlaybackFrameProvider {
    /// Read `root/images.txt`. Decoding happens lazily, per frame.
    pub fn open(root: impl AsRef<Path>, loop_playback: bool) -> Result<Self> {
        let root = root.as_ref();
        let index_path = root.join(IMAGE_INDEX);
        let text = std::fs::read_to_string(&index_path).map_err(|e| Error::io(&index_path, e))?;
        let entries = parse_image_index(root, &index_path, &text)?;
        log::info!(
            "playback: {} frames from {} (loop: {})",
            entries.len(),
            root.display(),
            loop_playback
        );
        Self::from_entries(root, entries, loop_playback)
    }

    /// Provider over an explicit entry list. Timestamps are rebased so the
    /// first entry is at 0.
    pub fn from_entries(root: &Path, mut entries: Vec<ImageEntry>, loop_playback: bool) -> Result<Self> {
        let first = match entries.first() {
            Some(e) => e.timestamp_us,
            None => return Err(Error::EmptySequence(root.to_path_buf())),
        };
        for e in entries.iter_mut() {
            if e.timestamp_us < first {
                log::warn!("playback: {} is older than the first frame", e.path.display());
            }
            e.timestamp_us = e.timestamp_us.saturating_sub(first);
        }
        Ok(PlaybackFrameProvider {
            entries,
            loop_playback,
            current: 0,
            epoch: Instant::now(),
            start_us: None,
        })
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded length of one pass, in microseconds.
    pub fn duration_us(&self) -> u64 {
        self.entries.last().map_or(0, |e| e.timestamp_us)
    }

    /// Entry a single, non-looping pass shows `elapsed_us` after it starts:
    /// the first entry whose timestamp is still ahead, or the last one.
    pub fn frame_at(&self, elapsed_us: u64) -> usize {
        self.entries
            .iter()
            .position(|e| e.timestamp_us > elapsed_us)
            .unwrap_or(self.entries.len() - 1)
    }

    /// Advance the playback position to provider time `now_us` and return
    /// the entry index to show. The first call anchors the pass.
    ///
    /// Past the end, a looping provider restarts the pass at `now_us`; a
    /// sequence with zero duration stays on its last entry either way.
    pub fn advance(&mut self, now_us: u64) -> usize {
        let mut start = *self.start_us.get_or_insert(now_us);
        loop {
            let due = start + self.entries[self.current].timestamp_us;
            if now_us < due {
                break;
            }
            if self.current + 1 < self.entries.len() {
                self.current += 1;
            } else if self.loop_playback && self.duration_us() > 0 {
                log::debug!("playback: looping");
                self.current = 0;
                start = now_us;
            } else {
                break;
            }
        }
        self.start_us = Some(start);
        self.current
    }

    /// Presentation time of the current entry on the provider clock.
    pub fn current_timestamp_us(&self) -> u64 {
        self.start_us.unwrap_or(0) + self.entries[self.current].timestamp_us
    }

    fn now_us(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }
}

impl FrameProvider for PlaybackFrameProvider {
    fn next_frame(&mut self) -> Result<CameraFrame> {
        let now = self.now_us();
        let index = self.advance(now);
        let entry = &self.entries[index];
        let frame = load_luma(&entry.path)?;
        log::trace!(
            "playback: frame {} ({}×{}) from {}",
            index,
            frame.width(),
            frame.height(),
            entry.path.display()
        );
        Ok(CameraFrame {
            timestamp_us: self.current_timestamp_us(),
            frame,
        })
    }
}
