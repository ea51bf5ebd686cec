//! irqstatd - interrupt metrics collector daemon.
//!
//! Reads /proc/interrupts on a fixed interval and publishes per-interrupt
//! rates, system-wide and per CPU, into an in-memory time-series store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use irqstat::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use irqstat::collector::mock::MockFs;
use irqstat::collector::config::{INTERRUPTS_SECTION, KEY_FILENAME, KEY_PER_CORE};
use irqstat::collector::{CollectStatus, InterruptsCollector, MapConfig};
use irqstat::storage::MemoryStore;

/// Interrupt metrics collector daemon.
#[derive(Parser)]
#[command(name = "irqstatd", about = "Interrupt metrics collector daemon", version)]
struct Args {
    /// Collection interval in seconds.
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    interval: u32,

    /// Prefix of the host filesystem, for collectors running in a container
    /// with the host's /proc mounted elsewhere.
    #[arg(long, env = "IRQSTAT_HOST_PREFIX", default_value = "")]
    host_prefix: String,

    /// Interrupts table to monitor. Defaults to <host-prefix>/proc/interrupts.
    #[arg(long, value_name = "PATH")]
    filename: Option<String>,

    /// Publish one series per CPU besides the system-wide one.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    per_core: bool,

    /// Stop after this many ticks (0 runs until interrupted).
    #[arg(long, default_value = "0")]
    ticks: u64,

    /// Print the store as JSON to stdout after every tick.
    #[arg(long)]
    dump: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Translates the command line into collector configuration.
    fn config(&self) -> MapConfig {
        let mut config = MapConfig::new();
        config.set(
            INTERRUPTS_SECTION,
            KEY_PER_CORE,
            if self.per_core { "yes" } else { "no" },
        );
        if let Some(ref filename) = self.filename {
            config.set(INTERRUPTS_SECTION, KEY_FILENAME, filename.as_str());
        }
        config
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["irqstatd", "irqstat"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Describes the busiest interrupts of the last commit for logging.
fn describe_busiest(store: &MemoryStore, limit: usize) -> String {
    let Some(series) = store.series("system", "interrupts") else {
        return String::from("no data");
    };

    let mut rates: Vec<(&str, f64)> = series
        .dimensions()
        .iter()
        .filter(|d| d.updated())
        .filter_map(|d| d.rate().map(|rate| (d.name(), rate)))
        .collect();
    if rates.is_empty() {
        return String::from("no rates yet");
    }
    rates.sort_by(|a, b| b.1.total_cmp(&a.1));

    rates
        .iter()
        .take(limit)
        .map(|(name, rate)| format!("{}={:.1}/s", name, rate))
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("irqstatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, host_prefix={:?}, per_core={}",
        args.interval, args.host_prefix, args.per_core
    );

    let config = args.config();

    #[cfg(target_os = "linux")]
    let mut collector = InterruptsCollector::new(RealFs::new(), &config, &args.host_prefix);
    #[cfg(not(target_os = "linux"))]
    let mut collector =
        InterruptsCollector::new(MockFs::typical_interrupts(), &config, &args.host_prefix);

    info!("Monitoring {}", collector.filename().display());

    let mut store = MemoryStore::new();
    let interval = Duration::from_secs(u64::from(args.interval));

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting collection loop");

    let mut tick_count: u64 = 0;
    let mut last_tick = Instant::now();

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let elapsed = now.duration_since(last_tick);
        last_tick = now;
        tick_count += 1;

        match collector.collect(&mut store, args.interval, elapsed) {
            CollectStatus::Collected => {
                let rows = collector.table().used().count();
                info!(
                    "Tick #{}: {} interrupts, busiest: {}",
                    tick_count,
                    rows,
                    describe_busiest(&store, 3)
                );
                if let Some(timing) = collector.last_timing() {
                    debug!(
                        "Timing: total={:?} read={:?} parse={:?} emit={:?}",
                        timing.total, timing.read, timing.parse, timing.emit
                    );
                }
            }
            CollectStatus::Retry => {
                debug!("Tick #{}: nothing collected, retrying next tick", tick_count);
            }
        }

        if args.dump {
            match serde_json::to_string(&store) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("Failed to serialize store: {}", e),
            }
        }

        if args.ticks > 0 && tick_count >= args.ticks {
            info!("Reached {} ticks", args.ticks);
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!(
        "Shutting down after {} ticks, {} series",
        tick_count,
        store.len()
    );
}
