mod args;

use std::fs::OpenOptions;
use std::panic;
use std::path::Path;
use std::time::{Duration, Instant};
use anyhow::anyhow;
use clap::Parser;
use log::{Level, LevelFilter};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;
use featsearch::background_process::background_process_registry::BackgroundProcessRegistry;
use featsearch::background_process::signal::Signal;
use featsearch::search::background::search_in_background;
use featsearch::search::TerminalReason;
use featsearch::utils::measure_l;
use crate::args::Args;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Number of found features printed
const MAX_PRINTED: usize = 20;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_file, args.log_level.unwrap_or(LevelFilter::Info))?;
    init_panic_hook();

    let request = args.to_request()?;
    let searcher = request.construct_searcher()?;
    let handle = searcher.handle();

    let mut registry = BackgroundProcessRegistry::new();
    let handler = search_in_background(searcher, &mut registry, |signal, id| match signal {
        Signal::Custom(window) => log::debug!("[{}] scanning {}", id, window),
        Signal::Progress(percent) => log::info!("[{}] {}% of chromosome scanned", id, percent),
        Signal::Complete(reason) => log::info!("[{}] finished: {}", id, reason),
    })?;

    let deadline = args.timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    measure_l(Level::Info, handler.get_description(), || {
        while !registry.is_empty() {
            registry.handle_events_from_background();
            if deadline.filter(|d| Instant::now() >= *d).is_some() && !handle.is_cancelled() {
                log::info!("Search timed out, interrupting {}", handler.get_id());
                handler.interrupt();
                handle.cancel();
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    });

    let outcome = handle.result().ok_or_else(|| anyhow!("Search finished without an outcome"))?;
    match outcome.reason() {
        TerminalReason::Found => {
            println!("Found features in {}", outcome.window());
            if let Some(features) = outcome.features() {
                for feature in features.take(MAX_PRINTED) {
                    println!("  {}", feature);
                }
            }
            Ok(())
        }
        TerminalReason::Failed => Err(anyhow!("Search failed, see log for details")),
        reason => {
            println!("No feature found: {}", reason);
            Ok(())
        }
    }
}

fn init_logging(log_file: &Path, level: LevelFilter) -> anyhow::Result<()> {
    if let Ok(file) = OpenOptions::new().write(true).open(log_file) {
        file.set_len(0)?;
    }

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}{n}")))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder()
            .appender("logfile")
            .build(level))?;

    log4rs::init_config(config)?;

    log::info!("Logging from featsearch started");
    Ok(())
}

fn init_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        if let Some(location) = panic_info.location() {
            log::error!("panic occurred: {:?} at {} line {}:{}", panic_info, location.file(), location.line(), location.column());
        } else {
            log::error!("panic occurred: {:?}", panic_info);
        }
    }));
}
