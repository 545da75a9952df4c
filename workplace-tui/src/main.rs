//! Terminal front end for a running Shadow Workplace server.

mod api;
mod session;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use crate::api::HttpApi;

#[derive(Parser)]
#[command(name = "workplace-tui", version, about = "Play through a Shadow Workplace sprint")]
struct Args {
    /// Base URL of the workplace server
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    api_url: String,

    /// Per-request timeout; workflows call the LLM and the source host
    #[arg(long, default_value_t = 180)]
    timeout_secs: u64,
}

fn main() {
    workplace::logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let api = HttpApi::new(&args.api_url, Duration::from_secs(args.timeout_secs))?;
    let stdin = io::stdin();
    session::run(&api, &mut stdin.lock(), &mut io::stdout())
}
