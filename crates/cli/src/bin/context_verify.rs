use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match context_cli::main_entry().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(context_cli::EXIT_STARTUP_ERROR)
        }
    }
}
