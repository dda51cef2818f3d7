// src/main.rs

use flowdag::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // No subscriber yet, so this one goes straight to stderr.
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("flowdag error: {err:?}");
        std::process::exit(1);
    }

    if let Err(err) = run(args).await {
        logging::report_fatal(&err);
        std::process::exit(1);
    }
}
