use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use metarmap::{
    condition::Snapshot,
    config::Config,
    context::Context,
    driver::{Driver, Outcome},
    fetch::{AviationWeather, DataSource},
    fill,
    memory::MemoryStrip,
    Strip,
};

#[derive(Parser)]
#[command(name = "metarmap")]
#[command(about = "Light a METAR map from live aviation weather", long_about = None)]
struct Cli {
    /// Configuration file (JSON).
    #[arg(long, short, default_value = "metarmap.json")]
    config: PathBuf,

    /// Append logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Where to send pixels. Defaults to the LED strip when built with
    /// hardware support, else the simulator, else memory only.
    #[arg(long, value_enum)]
    sink: Option<SinkKind>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch once, animate for the configured time, and exit
    Run {
        /// Override the configured total run time, in seconds
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Fetch and animate until interrupted
    Watch,

    /// Turn every pixel off
    Off,

    /// Fetch once and print each airport's conditions
    Check,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkKind {
    Memory,
    Simulator,
    Ws281x,
}

impl SinkKind {
    fn preferred() -> Self {
        if cfg!(feature = "hardware") {
            SinkKind::Ws281x
        } else if cfg!(feature = "simulator") {
            SinkKind::Simulator
        } else {
            SinkKind::Memory
        }
    }
}

fn open_strip(kind: SinkKind, count: usize) -> anyhow::Result<Box<dyn Strip>> {
    tracing::info!("using {kind:?} output for {count} pixels");
    match kind {
        SinkKind::Memory => Ok(Box::new(MemoryStrip::bounded(count, 1))),
        #[cfg(feature = "simulator")]
        SinkKind::Simulator => Ok(Box::new(metarmap::simulator::SimStrip::new(count))),
        #[cfg(feature = "hardware")]
        SinkKind::Ws281x => {
            let strip = metarmap::led_displays::LedStrip::new(count)
                .map_err(anyhow::Error::msg)
                .context("could not open LED strip")?;
            Ok(Box::new(strip))
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("this build does not include {other:?} output"),
    }
}

fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("could not open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => tracing_subscriber::fmt::init(),
    }
    Ok(())
}

fn check(config: &Config) -> anyhow::Result<()> {
    let mut source = AviationWeather::new(&config.source)?;
    let stations = config.stations();
    let reports = source.fetch(&stations)?;
    let snapshot = Snapshot::from_reports(&reports, &config.extract_settings());
    for station in &stations {
        match snapshot.condition(station) {
            Some(c) => println!(
                "{station:<6} {:<7} wind {:>3.0}kt gust {:>3.0}kt{}{}",
                c.category,
                c.wind_speed,
                c.gust_speed,
                if c.gusty { " gusty" } else { "" },
                if c.lightning { " lightning" } else { "" },
            ),
            None => println!("{station:<6} no report"),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let mut config = Config::load(&cli.config)?;
    if let Command::Run {
        duration: Some(secs),
    } = cli.cmd
    {
        config.timing.total_secs = secs;
        config.validate()?;
    }
    if let Command::Check = cli.cmd {
        return check(&config);
    }

    let ctx = Context::new();
    {
        let ctx = ctx.clone();
        ctrlc::set_handler(move || {
            tracing::info!("got shutdown signal, closing context");
            ctx.cancel("signal");
        })
        .context("could not set signal handler")?;
    }

    let kind = cli.sink.unwrap_or_else(SinkKind::preferred);
    if let Command::Off = cli.cmd {
        let mut strip = open_strip(kind, config.led_count)?;
        fill(&mut strip, config.palette.clear)?;
        return Ok(());
    }

    let mut source = AviationWeather::new(&config.source)?;
    let mut strip = open_strip(kind, config.led_count)?;
    let mut driver = Driver::new(&config, &mut strip, &ctx);
    let result = match cli.cmd {
        Command::Watch => driver.run_continuous(&mut source),
        _ => driver.run_bounded(&mut source),
    };

    match &result {
        Ok(Outcome::Completed) => tracing::info!("run complete"),
        Ok(Outcome::Cancelled) => {
            if let Some(reason) = ctx.reason() {
                tracing::info!("stopped: {reason}");
            }
        }
        Err(e) => tracing::error!("fatal: {e}"),
    }

    // Leave a completed run's last frame showing; otherwise go dark.
    if !matches!(result, Ok(Outcome::Completed)) {
        if let Err(e) = fill(&mut strip, config.palette.clear) {
            tracing::error!("could not clear the strip: {e}");
        }
    }

    tracing::info!("shut down");
    result.map(|_| ()).map_err(anyhow::Error::from)
}
