mod assess;
mod cli;
mod infra;
mod routes;
mod server;

use lecturas::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
