// demos/synthetic_overlay.rs
//
// Run both detection strategies over a generated sequence (bright
// rectangles drifting across a ramp) and save the overlaid frames.
//
// Usage:
//   cargo run --example synthetic_overlay
//   cargo run --example synthetic_overlay -- 40     (frame count)
//
// Output:
//   vis_output/synthetic_<strategy>_NNN.png  — overlaid frames
//   stdout                                   — per-frame statistics

use std::env;
use std::fs;
use std::path::Path;

use image::GrayImage;

use replay_features::brief::BriefPattern;
use replay_features::fast::FastDetector;
use replay_features::gaussian::GaussianKernel;
use replay_features::logging::{self, Verbosity};
use replay_features::{FeaturePipeline, Frame};

const WIDTH: usize = 320;
const HEIGHT: usize = 240;

fn make_scene(t: usize) -> Frame {
    let mut frame = Frame::new(WIDTH, HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            frame.set(x, y, (30 + x * 60 / WIDTH + y * 20 / HEIGHT) as u8);
        }
    }
    let rects: [(usize, usize, usize, usize, u8); 4] = [
        (30, 30, 50, 40, 210),
        (140, 50, 60, 30, 180),
        (60, 140, 40, 50, 230),
        (200, 130, 70, 60, 190),
    ];
    for &(rx, ry, rw, rh, v) in &rects {
        let rx = rx + t;
        let ry = ry + t / 2;
        for y in ry..(ry + rh).min(HEIGHT) {
            for x in rx..(rx + rw).min(WIDTH) {
                frame.set(x, y, v);
            }
        }
    }
    frame
}

fn save(frame: &Frame, path: &Path) {
    let img = GrayImage::from_raw(WIDTH as u32, HEIGHT as u32, frame.as_slice().to_vec())
        .expect("frame buffer matches its dimensions");
    if let Err(e) = img.save(path) {
        log::warn!("could not write {}: {e}", path.display());
    }
}

fn run(name: &str, mut pipeline: FeaturePipeline, frames: usize) {
    println!("\n{name}");
    println!("{:>5}  {:>5}  {:>7}  {:>6}  {:>8}", "frame", "cands", "matched", "stable", "overlaid");
    println!("{}", "-".repeat(39));
    for t in 0..frames {
        let mut frame = make_scene(t);
        let stats = pipeline.process(&mut frame);
        println!(
            "{:5}  {:5}  {:7}  {:6}  {:8}",
            stats.frame_index, stats.candidates, stats.matched, stats.stable, stats.overlaid
        );
        save(&frame, &Path::new("vis_output").join(format!("synthetic_{name}_{t:03}.png")));
    }
}

fn main() {
    let frames: usize = env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(20);
    logging::init(Verbosity::Warning, true).ok();
    fs::create_dir_all("vis_output").ok();

    run("harris", FeaturePipeline::default(), frames);
    run(
        "fast",
        FeaturePipeline::fast_with_tracking(
            GaussianKernel::default(),
            FastDetector::new(9, 20, 400),
            BriefPattern::from_seed(0x5eed),
        ),
        frames,
    );
    println!("\nFrames saved to vis_output/");
}
