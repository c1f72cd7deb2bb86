//! CLI tool for rendering a MIDI file to WAV
//!
//! Usage: midi2wav <input.mid> [output.wav] [--sample-rate N] [--dump-events]
//!
//! If output is not specified, generates <input>.wav

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use midisine::midi::{decode, Event};
use midisine::pipeline::{SynthConfig, ToneSynthesizer, DEFAULT_SAMPLE_RATE};
use midisine::wav::write_wav_16bit;

/// Render a standard MIDI file to a mono 16-bit WAV with sine voices
#[derive(Debug, Parser)]
#[command(name = "midi2wav", version)]
struct Args {
    /// Path to the .mid file
    input: PathBuf,

    /// Output WAV file path (defaults to <input>.wav)
    output: Option<PathBuf>,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Print the merged event timeline
    #[arg(long)]
    dump_events: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("wav"));

    let bytes = fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let file = decode(&bytes).with_context(|| format!("decoding {}", args.input.display()))?;
    let timeline = file.timeline();

    println!(
        "Parsed format {:?} file: {} tracks, {} ticks per quarter, {} events, {} ticks long",
        file.format,
        file.tracks.len(),
        file.ticks_per_quarter,
        timeline.len(),
        file.length_ticks()
    );

    if args.dump_events {
        println!("{:>8} {:>5} {:>3}  event", "tick", "track", "ch");
        for timed in &timeline {
            let channel = match timed.event.channel() {
                Some(channel) => (channel + 1).to_string(),
                None => "-".to_string(),
            };
            match timed.event {
                Event::OtherMeta { .. } | Event::SystemExclusive { .. } => {}
                event => println!(
                    "{:>8} {:>5} {:>3}  {:?}",
                    timed.tick, timed.track, channel, event
                ),
            }
        }
    }

    let config = SynthConfig {
        sample_rate: args.sample_rate,
        ..Default::default()
    };

    println!("Configuration:");
    println!("  Sample rate: {} Hz", config.sample_rate);
    println!("  Peak amplitude: {}", config.voice_config.peak_amplitude);
    println!("  Decay per sample: {}", config.voice_config.decay_per_sample);
    println!();

    println!("Generating audio...");
    let samples = ToneSynthesizer::render(&config, &timeline, file.ticks_per_quarter)?;
    write_wav_16bit(&output_path, &samples, config.sample_rate)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "✓ Generated {} ({:.2}s)",
        output_path.display(),
        samples.len() as f64 / f64::from(config.sample_rate)
    );
    Ok(())
}
