use paramgate::cli::run_cli;
use paramgate::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging_with_config(&LogConfig::from_env())?;
    let code = run_cli()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
