pub mod builders;
pub mod recording;

use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Transactions for two members, as the extract step expects them.
pub const SAMPLE_TRANSACTIONS_CSV: &str = "\
memberId,lastTransactionUtcTs,lastTransactionPointsBought,lastTransactionRevenueUSD,lastTransactionType
1,2024-01-01 10:00:00,100,10,buy
1,2024-01-02 11:00:00,200,20,gift
1,2024-01-03 12:00:00,300,30,redeem
2,2024-01-01 13:00:00,150,15,buy
2,2024-01-02 14:00:00,250,25,gift
";

/// Write [`SAMPLE_TRANSACTIONS_CSV`] into `dir` and return its path.
pub fn write_sample_csv(dir: &Path) -> PathBuf {
    let path = dir.join("transactions.csv");
    std::fs::write(&path, SAMPLE_TRANSACTIONS_CSV).expect("failed to write sample CSV");
    path
}
