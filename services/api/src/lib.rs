mod cli;
mod evaluate;
mod infra;
mod routes;
mod server;

use approval_routing::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
