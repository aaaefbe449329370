use std::process::ExitCode;

use env_logger::Env;
use log::error;
use relay::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
  env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
  let cli = Cli::parse_args(std::env::args_os());

  match relay::relay::run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      error!("{err}");
      ExitCode::FAILURE
    }
  }
}
