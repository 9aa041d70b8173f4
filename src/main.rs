//! Ostinato — command-line front end.
//!
//! `ostinato run` performs in real time, sending notes to the log or to an
//! OSC synth. `ostinato render` runs the same performance on a virtual clock
//! as fast as possible and prints a summary.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};

use ostinato::config::{default_config_path, EnsembleConfig};
use ostinato::ensemble::InstrumentKey;
use ostinato::humanize::{Humanization, Intensity};
use ostinato::osc::{OscConfig, OscNoteSink};
use ostinato::scheduler::{AudioClock, LogSink, ManualClock, NoteRouter, NoteSink, Recorder, SystemClock};
use ostinato::Session;

#[derive(Parser)]
#[command(name = "ostinato")]
#[command(about = "A seeded ensemble of simulated performers playing \"In C\"")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Perform in real time until the ensemble finishes or Ctrl-C
    Run(PerformanceArgs),
    /// Perform offline on a virtual clock and print a summary
    Render {
        /// Stop after this many eighth-note beats
        #[arg(long, default_value_t = 4000)]
        beats: u64,
        #[command(flatten)]
        performance: PerformanceArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IntensityArg {
    Subtle,
    Moderate,
    Expressive,
}

impl From<IntensityArg> for Intensity {
    fn from(arg: IntensityArg) -> Self {
        match arg {
            IntensityArg::Subtle => Intensity::Subtle,
            IntensityArg::Moderate => Intensity::Moderate,
            IntensityArg::Expressive => Intensity::Expressive,
        }
    }
}

#[derive(Args)]
struct PerformanceArgs {
    /// Config file (defaults to ~/.ostinato/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed; the same seed and performer count replay the same performance
    #[arg(long)]
    seed: Option<u32>,

    /// Tempo in BPM (100-180)
    #[arg(long)]
    bpm: Option<f64>,

    /// Number of performers (2-16)
    #[arg(long)]
    performers: Option<usize>,

    /// Base probability of advancing at a pattern boundary (0.1-0.6)
    #[arg(long)]
    advance_weight: Option<f64>,

    /// Humanization intensity for velocity and timing
    #[arg(long, value_enum)]
    intensity: Option<IntensityArg>,

    /// Play every note at full velocity, exactly on the beat
    #[arg(long)]
    no_humanize: bool,

    /// Add the steady high-C reference pulse
    #[arg(long)]
    pulse: bool,

    /// Send notes over OSC to this host:port
    #[arg(long)]
    osc: Option<String>,
}

impl PerformanceArgs {
    /// Config file values, overridden by any flags given.
    fn resolve(&self) -> Result<EnsembleConfig, ostinato::ConfigError> {
        let path = self.config.clone().unwrap_or_else(default_config_path);
        let mut config = EnsembleConfig::load(&path)?;

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(bpm) = self.bpm {
            config.bpm = bpm;
        }
        if let Some(performers) = self.performers {
            config.performers = performers;
        }
        if let Some(weight) = self.advance_weight {
            config.advance_weight = weight;
        }
        if let Some(intensity) = self.intensity {
            config.humanization.velocity.intensity = intensity.into();
            config.humanization.timing.intensity = intensity.into();
        }
        if self.no_humanize {
            config.humanization = Humanization::off();
        }
        if self.pulse {
            config.pulse = true;
        }
        if let Some(target) = &self.osc {
            let prefix = config.osc.take().map(|c| c.prefix);
            let mut osc = OscConfig::new(target.clone());
            if let Some(prefix) = prefix {
                osc.prefix = prefix;
            }
            config.osc = Some(osc);
        }
        Ok(config.clamped())
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(&args),
        Command::Render { beats, performance } => render(&performance, beats),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &PerformanceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve()?;
    let sink: Box<dyn NoteSink> = match &config.osc {
        Some(osc) => Box::new(OscNoteSink::connect(osc.clone())?),
        None => {
            info!("no OSC target; notes go to the log (RUST_LOG=debug to see them)");
            Box::new(LogSink)
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))?;

    let session = Session::new(&config, SystemClock::new(), sink);
    info!("seed {} (replay with --seed {})", session.seed(), session.seed());
    let mut scheduler = session.into_scheduler();
    scheduler.run(&stop);

    let state = scheduler.state();
    info!(
        "done: {} beats, ensemble {}",
        scheduler.beats_scheduled(),
        if state.ensemble_complete { "complete" } else { "stopped" }
    );
    Ok(())
}

fn render(args: &PerformanceArgs, beats: u64) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve()?;

    let recorders: Vec<(InstrumentKey, Recorder)> = InstrumentKey::ALL
        .iter()
        .map(|&key| (key, Recorder::new()))
        .collect();
    let mut router = NoteRouter::new();
    for (key, recorder) in &recorders {
        router.add_route(*key, Box::new(recorder.clone()));
    }

    let clock = ManualClock::new();
    let session = Session::new(&config, clock.clone(), Box::new(router));
    let seed = session.seed();
    let mut scheduler = session.into_scheduler();
    let scheduled = scheduler.run_virtual(beats);
    let complete = scheduler.ensemble().is_complete();

    println!("seed        {seed}");
    println!("performers  {}", config.performers);
    println!("bpm         {}", config.bpm);
    println!(
        "beats       {scheduled}{}",
        if complete { " (ensemble complete)" } else { "" }
    );
    println!("duration    {:.1}s", clock.now());

    let mut per_performer: BTreeMap<u32, usize> = BTreeMap::new();
    for (key, recorder) in &recorders {
        let notes = recorder.notes();
        println!("{:<11} {} notes", key.name(), notes.len());
        for note in notes {
            *per_performer.entry(note.performer_id.0).or_default() += 1;
        }
    }
    for state in scheduler.ensemble().performer_states() {
        println!(
            "  {:<4} pattern {:>2}  {:<8}  {} notes",
            state.id.to_string(),
            state.display_pattern,
            format!("{:?}", state.status).to_lowercase(),
            per_performer.get(&state.id.0).copied().unwrap_or(0)
        );
    }
    Ok(())
}
