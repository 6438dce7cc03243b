//! glyphctl — control the glyph LED array from the command line.

use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "glyphctl",
    version,
    about = "Control the glyph LED array: play animations, inspect channels, torch mode"
)]
struct Args {
    /// Output as JSON (for status, channels, config)
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = cli::run(args.command, args.json) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
