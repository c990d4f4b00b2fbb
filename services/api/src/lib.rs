mod cli;
mod infra;
mod report;
mod routes;
mod server;

use workforce_ai::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
