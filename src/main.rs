mod args;
mod screen;

use clap::Parser;
use log::debug;

use crate::args::Args;
use crate::screen::config_reader::{read_config, BoothConfig};

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("args: {:?}", args);

    let config = match &args.config {
        Some(path) => read_config(path),
        None => Ok(BoothConfig::default_election()),
    };

    if let Err(e) = config.and_then(|c| screen::run_booth(&c)) {
        eprintln!("votebox: {}", e);
        std::process::exit(1);
    }
}
