use clap::{Parser, ValueEnum};
use glob_tail::{StartPosition, WatchConfig, Watcher, WatcherSet, logging, stdout_callback};
use std::process;
use std::time::Duration;

/// Follow files matching glob patterns, printing every new line as `path: line`.
#[derive(Parser, Debug)]
#[command(name = "glob-tail", version, about)]
struct Cli {
    /// Glob patterns to tail (quote them so the shell does not expand them)
    #[arg(required = true, value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Seconds between polls
    #[arg(short, long, env = "GLOB_TAIL_INTERVAL", default_value_t = 2.0, value_parser = parse_interval)]
    interval: f64,

    /// Where to start reading files that appear while tailing
    #[arg(long, value_enum, default_value_t = NewFiles::Beginning)]
    new_files: NewFiles,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "GLOB_TAIL_LOG", default_value = logging::DEFAULT_DIRECTIVE)]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NewFiles {
    Beginning,
    End,
}

impl From<NewFiles> for StartPosition {
    fn from(value: NewFiles) -> Self {
        match value {
            NewFiles::Beginning => StartPosition::Beginning,
            NewFiles::End => StartPosition::End,
        }
    }
}

fn parse_interval(value: &str) -> Result<f64, String> {
    let seconds: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err("interval must be a positive number of seconds".to_string())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = WatchConfig::default()
        .with_poll_interval(Duration::from_secs_f64(cli.interval))
        .with_new_file_start(cli.new_files.into());

    let mut watchers = WatcherSet::new();
    for pattern in &cli.patterns {
        match Watcher::glob(pattern.as_str(), stdout_callback(), config.clone()) {
            Ok(watcher) => {
                println!("Tailing \"{}\"", pattern);
                watchers.add(watcher);
            }
            Err(e) => {
                eprintln!("Error setting up watcher for \"{}\": {}", pattern, e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = watchers.start_all() {
        eprintln!("Error starting watchers: {}", e);
        process::exit(1);
    }

    if let Err(e) = shutdown_signal().await {
        eprintln!("Error waiting for shutdown signal: {}", e);
    }

    watchers.stop_all_and_wait().await;
    println!("Tailing stopped");
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
