#![allow(dead_code, unused_imports)]

pub use flowdag_test_utils::builders;
pub use flowdag_test_utils::recording;
pub use flowdag_test_utils::{init_tracing, with_timeout, write_sample_csv, SAMPLE_TRANSACTIONS_CSV};
