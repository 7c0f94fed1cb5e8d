use std::fs;
use std::path::Path;

use crate::cdx::{decode_body, CdxRow};

/// Load a raw CDX response saved by `save_cdx_fixture`
pub fn load_json_fixture(fixture_name: &str) -> String {
    let path = Path::new("src/tests/fixtures").join(format!("{}.json", fixture_name));
    fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to load test fixture: {}", fixture_name))
}

pub fn load_rows(fixture_name: &str) -> Vec<CdxRow> {
    let body = load_json_fixture(fixture_name);
    decode_body(&body)
        .unwrap_or_else(|e| panic!("Fixture {} is not a CDX response: {}", fixture_name, e))
}
