use reencuadre_cli::cli;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = cli::run().await {
        eprintln!("{}", cli::error_line(&e));
        process::exit(1);
    }
}
