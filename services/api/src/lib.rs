mod cli;
mod infra;
mod routes;
mod server;

use cert_gen::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
