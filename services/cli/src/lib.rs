mod cli;
mod commands;

use credit_risk::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
