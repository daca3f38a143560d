use anyhow::{Context, Result};
use auto_problem_solver::cli::Cli;
use auto_problem_solver::{logger, App};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config().context("加载配置失败")?;
    logger::init(config.verbose_logging);

    let mut app = App::initialize(&config)?;
    let report = app.run(&cli.problem_ids_file).await?;

    println!("{}", report.export_path.display());
    Ok(())
}
