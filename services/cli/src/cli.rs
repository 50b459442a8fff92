use crate::commands::{
    run_datasets, run_decide, run_engineer, run_optimize, DatasetsArgs, DecideArgs, EngineerArgs,
    OptimizeArgs,
};
use clap::{Parser, Subcommand};
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Risk Pipeline",
    about = "Engineer applicant features and pick cost-optimal approval thresholds",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean raw applications and write the engineered feature table
    Engineer(EngineerArgs),
    /// Select the approval threshold that maximises net business value
    Optimize(OptimizeArgs),
    /// Grant or refuse a single scored application
    Decide(DecideArgs),
    /// Report which raw dataset files are present
    Datasets(DatasetsArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(
        ?config.environment,
        data_dir = %config.data.data_dir.display(),
        "credit risk pipeline ready"
    );

    match cli.command {
        Command::Engineer(args) => run_engineer(args, &config),
        Command::Optimize(args) => run_optimize(args, &config),
        Command::Decide(args) => run_decide(args),
        Command::Datasets(args) => run_datasets(args, &config),
    }
}
