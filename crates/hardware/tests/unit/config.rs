//! Configuration Tests.
//!
//! Defaults, partial JSON documents and file loading.

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;

use pqr5_core::common::constants::{CYCLE_COUNTER_ADDR, HALT_SENTINEL, UART_TX_ADDR};
use pqr5_core::common::error::SimError;
use pqr5_core::config::{BranchPredictorKind, Config};

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.general.halt_instruction, HALT_SENTINEL);
    assert!(!config.general.trace_instructions);
    assert!(!config.general.commit_log);
    assert_eq!(config.memory.imem_base, 0);
    assert_eq!(config.memory.dmem_base, 0);
    assert_eq!(config.memory.imem_latency, 0);
    assert_eq!(config.memory.dmem_latency, 0);
    assert_eq!(config.system.uart_base, UART_TX_ADDR);
    assert_eq!(config.system.cycle_counter_addr, CYCLE_COUNTER_ADDR);
    assert_eq!(config.pipeline.branch_predictor, BranchPredictorKind::Static);
}

#[test]
fn empty_document_is_default() {
    let config = match Config::from_json_str("{}") {
        Ok(c) => c,
        Err(e) => panic!("{e}"),
    };
    let default = Config::default();
    assert_eq!(config.general.max_cycles, default.general.max_cycles);
    assert_eq!(config.memory.dmem_size, default.memory.dmem_size);
    assert_eq!(config.pipeline.ghr_bits, default.pipeline.ghr_bits);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let json = r#"{
        "general": { "halt_instruction": 115, "commit_log": true },
        "memory": { "imem_latency": 3, "dmem_base": 4096 },
        "system": { "uart_base": 536870912 }
    }"#;
    let config = match Config::from_json_str(json) {
        Ok(c) => c,
        Err(e) => panic!("{e}"),
    };
    assert_eq!(config.general.halt_instruction, 0x73);
    assert!(config.general.commit_log);
    assert_eq!(config.general.max_cycles, Config::default().general.max_cycles);
    assert_eq!(config.memory.imem_latency, 3);
    assert_eq!(config.memory.dmem_base, 0x1000);
    assert_eq!(config.memory.dmem_latency, 0);
    assert_eq!(config.system.uart_base, 0x2000_0000);
    assert_eq!(config.system.cycle_counter_addr, CYCLE_COUNTER_ADDR);
}

#[rstest]
#[case("NotTaken", BranchPredictorKind::NotTaken)]
#[case("Static", BranchPredictorKind::Static)]
#[case("GShare", BranchPredictorKind::GShare)]
#[case("Gshare", BranchPredictorKind::GShare)]
#[case("GSHARE", BranchPredictorKind::GShare)]
fn predictor_names(#[case] name: &str, #[case] kind: BranchPredictorKind) {
    let json = format!(r#"{{ "pipeline": {{ "branch_predictor": "{name}" }} }}"#);
    match Config::from_json_str(&json) {
        Ok(c) => assert_eq!(c.pipeline.branch_predictor, kind),
        Err(e) => panic!("{name}: {e}"),
    }
}

#[test]
fn unknown_predictor_is_a_config_error() {
    let json = r#"{ "pipeline": { "branch_predictor": "Tage" } }"#;
    assert!(matches!(Config::from_json_str(json), Err(SimError::Config(_))));
}

#[test]
fn from_file() {
    let mut file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(e) => panic!("{e}"),
    };
    if let Err(e) = writeln!(file, r#"{{ "general": {{ "max_cycles": 77 }} }}"#) {
        panic!("{e}");
    }
    match Config::from_json_file(file.path()) {
        Ok(c) => assert_eq!(c.general.max_cycles, 77),
        Err(e) => panic!("{e}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("{e}"),
    };
    let path = dir.path().join("absent.json");
    assert!(matches!(Config::from_json_file(&path), Err(SimError::Io { .. })));
}
