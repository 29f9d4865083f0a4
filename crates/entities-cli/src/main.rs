// Entities CLI entry point

mod cli;
mod commands;
mod logging;

use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    logging::init_logging(&cli.log_level);

    if let Err(e) = commands::run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
