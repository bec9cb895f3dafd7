// src/main.rs

use droid_executor::types::RunStatus;
use droid_executor::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(RunStatus::Completed) => {}
        Ok(_) => std::process::exit(1),
        Err(err) => {
            eprintln!("droid-executor error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<RunStatus> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
