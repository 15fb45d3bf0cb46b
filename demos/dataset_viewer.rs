// demos/dataset_viewer.rs
//
// Replay a recorded luminance sequence in a window with detected features
// burned in at full white.
//
// Usage:
//   cargo run --example dataset_viewer --release -- --root /path/to/sequence
//   cargo run --example dataset_viewer --release -- --root /path/to/sequence \
//       --strategy fast-with-tracking --loglevel info
//
// The sequence directory holds images.txt with one `<seconds> <path>` line
// per frame; paths are relative to the directory.
//
// Controls:
//   Space  — pause/resume
//   R      — reset tracking history
//   Q/Esc  — quit

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use replay_features::config::PipelineConfig;
use replay_features::logging::{self, Verbosity};
use replay_features::playback::{FrameProvider, PlaybackFrameProvider};
use replay_features::{DetectionStrategy, FeaturePipeline, Frame};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    HarrisOnly,
    FastWithTracking,
}

impl From<StrategyArg> for DetectionStrategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::HarrisOnly => DetectionStrategy::HarrisOnly,
            StrategyArg::FastWithTracking => DetectionStrategy::FastWithTracking,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dataset_viewer", about = "Replay an image sequence with feature overlay")]
struct Args {
    /// Path to the sequence directory (contains images.txt).
    #[arg(long)]
    root: PathBuf,

    /// Log filter: Fatal (0), Error (1), Warning (2), Debug (3), Info (4)
    /// or Verbose (5).
    #[arg(long, default_value = "verbose")]
    loglevel: Verbosity,

    /// Write log lines to the console.
    #[arg(long, default_value = "true", value_parser = parse_switch, action = clap::ArgAction::Set)]
    logconsole: bool,

    /// YAML pipeline configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured detection strategy.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Stop on the last frame instead of looping.
    #[arg(long)]
    no_loop: bool,
}

/// `true`/`false` in any case, or `1`/`0`.
fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(format!("expected true/false or 1/0, got `{s}`")),
    }
}

/// Nearest-neighbor blit of a luminance frame into an ARGB framebuffer.
fn blit(frame: &Frame, fb: &mut [u32], win_w: usize, win_h: usize) {
    for wy in 0..win_h {
        let sy = wy * frame.height() / win_h;
        let row = frame.row(sy);
        for wx in 0..win_w {
            let v = row[wx * frame.width() / win_w] as u32;
            fb[wy * win_w + wx] = (v << 16) | (v << 8) | v;
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init(args.loglevel, args.logconsole) {
        eprintln!("logger already installed: {e}");
    }

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path).unwrap_or_else(|e| logging::fatal(e)),
        None => PipelineConfig::default(),
    };
    if let Some(s) = args.strategy {
        config.strategy = s.into();
    }
    let mut pipeline = FeaturePipeline::from_config(&config).unwrap_or_else(|e| logging::fatal(e));

    log::info!("initializing playback with root [{}]", args.root.display());
    let mut provider =
        PlaybackFrameProvider::open(&args.root, !args.no_loop).unwrap_or_else(|e| logging::fatal(e));

    let first = provider.next_frame().unwrap_or_else(|e| logging::fatal(e));
    let (img_w, img_h) = (first.frame.width(), first.frame.height());
    log::info!("resolution {}×{}, {} frames", img_w, img_h, provider.len());

    // Window at 2× scale for small images, 1× for large.
    let scale = if img_w <= 400 { 2 } else { 1 };
    let (win_w, win_h) = (img_w * scale, img_h * scale);

    let mut window = Window::new(
        "replay-features — dataset viewer",
        win_w,
        win_h,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    )
    .unwrap_or_else(|e| logging::fatal(format!("failed to create window: {e}")));
    window.set_target_fps(60);

    let mut fb = vec![0u32; win_w * win_h];
    let mut paused = false;
    let mut pending = Some(first);
    let mut shown = 0u64;

    while window.is_open() && !window.is_key_down(Key::Escape) && !window.is_key_down(Key::Q) {
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            paused = !paused;
            log::info!("{}", if paused { "paused" } else { "resumed" });
        }
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            pipeline.reset();
            log::info!("tracking history cleared");
        }

        if !paused {
            let camera_frame = match pending.take() {
                Some(f) => f,
                None => match provider.next_frame() {
                    Ok(f) => f,
                    Err(e) => {
                        log::error!("failed to get next frame from provider: {e}");
                        break;
                    }
                },
            };
            let mut frame = camera_frame.frame;
            if (frame.width(), frame.height()) != (img_w, img_h) {
                log::error!(
                    "frame size changed to {}×{} (expected {}×{})",
                    frame.width(),
                    frame.height(),
                    img_w,
                    img_h
                );
                break;
            }

            let stats = pipeline.process(&mut frame);
            log::trace!("t={}us {:?}", camera_frame.timestamp_us, stats);
            blit(&frame, &mut fb, win_w, win_h);
            shown += 1;
        }

        if let Err(e) = window.update_with_buffer(&fb, win_w, win_h) {
            log::error!("failed to refresh window: {e}");
            break;
        }
    }

    log::info!("displayed {shown} frames");
}
