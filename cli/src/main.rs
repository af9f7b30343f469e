use anttask_cli::Cli;
use anttask_cli::init_tracing;
use anttask_cli::run_main;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let exit_code = run_main(cli).await?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
