mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use auto_finance::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
