use clap::Parser;

use compound::cli::{Cli, Command, run_project};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    compound::config::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => compound::api::run_http_server(config).await?,
        Command::Project(command) => println!("{}", run_project(&command)?),
    }
    Ok(())
}
