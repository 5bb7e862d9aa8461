//! reftagger binary entry point.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match reftagger::cli::run().await {
        Ok(code) => code,
        Err(err) => {
            reftagger::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
