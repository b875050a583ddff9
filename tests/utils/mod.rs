// Shared fixtures for the integration tests
#![allow(dead_code)] // each test binary uses a different subset

use std::fs;
use std::path::{Path, PathBuf};

pub const HEALTH_HEADER: &str = "timestamp_ms,status,backend_id,port,rtt_ms";
pub const METRICS_HEADER: &str = "timestamp_ms,response_time_ms,backend_selected";

/// Write `rows` under the health-check header
pub fn write_health_log(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    write_log(dir, name, HEALTH_HEADER, rows)
}

/// Write `rows` under the request-metrics header
pub fn write_metrics_log(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    write_log(dir, name, METRICS_HEADER, rows)
}

pub fn write_log(dir: &Path, name: &str, header: &str, rows: &[&str]) -> PathBuf {
    let mut body = String::from(header);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, body).expect("write fixture log");
    path
}

/// Three backends, one of which fails half of its checks
pub fn sample_health_rows() -> Vec<&'static str> {
    vec![
        "1700000000000,OK,1,8081,10.0",
        "1700000000000,OK,2,8082,12.5",
        "1700000000000,OK,3,8083,30.0",
        "1700000001000,OK,1,8081,20.0",
        "1700000001000,OK,2,8082,11.5",
        "1700000001000,FAIL,3,8083,",
        "1700000002000,FAIL,1,8081,",
        "1700000002000,OK,2,8082,13.0",
        "1700000002000,OK,3,8083,28.0",
        "1700000003000,OK,1,8081,15.0",
        "1700000003000,OK,2,8082,12.0",
        "1700000003000,FAIL,3,8083,",
    ]
}
