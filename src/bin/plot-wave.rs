use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use midisine::{render_samples, SynthConfig};
use plotters::prelude::*;

/// Largest sample-to-sample jump accepted as continuous, relative to full scale
const DISCONTINUITY_THRESHOLD: f32 = 0.15;

/// Plot a window of the rendered waveform of a MIDI file
#[derive(Debug, Parser)]
#[command(name = "plot-wave", version)]
struct Args {
    /// Path to the .mid file
    input: PathBuf,

    /// Output SVG path
    output: PathBuf,

    /// Start of the plotted window in milliseconds
    #[arg(long, default_value_t = 0.0)]
    start_ms: f32,

    /// Length of the plotted window in milliseconds
    #[arg(long, default_value_t = 50.0)]
    duration_ms: f32,
}

/// Report the largest sample-to-sample jump
///
/// A note cut mid-cycle always produces one, so this never fails.
fn check_discontinuities(samples: &[f32], sample_rate: f32) {
    let mut max_diff: f32 = 0.0;
    let mut max_diff_idx: usize = 0;

    for i in 1..samples.len() {
        let diff = (samples[i] - samples[i - 1]).abs();
        if diff > max_diff {
            max_diff = diff;
            max_diff_idx = i;
        }
    }

    if max_diff > DISCONTINUITY_THRESHOLD {
        println!(
            "  ! Discontinuity at sample {} ({:.1}ms): {} -> {} (diff = {})",
            max_diff_idx,
            max_diff_idx as f32 / sample_rate * 1000.0,
            samples[max_diff_idx - 1],
            samples[max_diff_idx],
            max_diff
        );
    } else {
        println!(
            "  ✓ Max discontinuity: {:.6} at sample {} (below threshold {})",
            max_diff, max_diff_idx, DISCONTINUITY_THRESHOLD
        );
    }
}

fn create_plot(args: &Args, window: &[f32], sample_rate: f32) -> Result<()> {
    let root = SVGBackend::new(&args.output, (1000, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let to_ms = |i: usize| args.start_ms + i as f32 / sample_rate * 1000.0;
    let end_ms = to_ms(window.len().max(1));

    let title = format!(
        "{}: {:.1}ms - {:.1}ms",
        args.input.display(),
        args.start_ms,
        end_ms
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(args.start_ms..end_ms, -1.05f32..1.05f32)?;

    chart
        .configure_mesh()
        .x_desc("Time (ms)")
        .y_desc("Amplitude")
        .x_labels(10)
        .y_labels(10)
        .draw()?;

    chart.draw_series(LineSeries::new(
        window.iter().enumerate().map(|(i, &s)| (to_ms(i), s)),
        BLUE.stroke_width(1),
    ))?;

    root.present()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.start_ms < 0.0 || args.duration_ms <= 0.0 {
        bail!("Window start must be non-negative and duration positive");
    }

    println!("Waveform Plot Generator");
    println!("=======================");
    println!("  Input: {}", args.input.display());
    println!("  Window: {}ms + {}ms", args.start_ms, args.duration_ms);
    println!();

    let bytes = fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    print!("  Rendering... ");
    let config = SynthConfig::default();
    let sample_rate = config.sample_rate as f32;
    let samples = render_samples(&bytes, &config)?;
    println!(
        "done ({} samples, {:.1}ms)",
        samples.len(),
        samples.len() as f32 / sample_rate * 1000.0
    );

    let normalized: Vec<f32> = samples
        .iter()
        .map(|&s| f32::from(s) / f32::from(i16::MAX))
        .collect();

    let start = ((args.start_ms * sample_rate / 1000.0) as usize).min(normalized.len());
    let len = (args.duration_ms * sample_rate / 1000.0) as usize;
    let window = &normalized[start..(start + len).min(normalized.len())];
    if window.is_empty() {
        bail!("Window starts after the end of the rendered audio");
    }

    // Check for clicks
    check_discontinuities(&normalized, sample_rate);

    print!("  Creating plot... ");
    create_plot(&args, window, sample_rate)?;
    println!("done");

    println!();
    println!("Output: {}", args.output.display());

    Ok(())
}
