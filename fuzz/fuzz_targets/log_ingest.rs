#![no_main]

use lbscope::ingest::{read_observations, LogSchema};
use lbscope::stats::aggregate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any byte sequence must yield observations or an error, never a panic
    for schema in [LogSchema::HealthCheck, LogSchema::Metrics] {
        if let Ok(observations) = read_observations(data, schema, "fuzz") {
            let _ = aggregate(&observations);
        }
    }
});
