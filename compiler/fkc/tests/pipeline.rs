//! End-to-end runs of the extraction driver over JSON documents.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use fk_diagnostic::{ErrorCode, ErrorMode};
use fkc::{read_index, run, DriverError, Invocation, RunConfig};
use pretty_assertions::assert_eq;

const INDEX: &str = r#"[
  { "kind": "module", "name": "consts",
    "variables": [
      { "name": "n", "f_type": "integer", "qualifiers": ["parameter"], "value": "128" }
    ] },
  { "kind": "program", "name": "saxpy",
    "used_modules": [ { "name": "consts" }, { "name": "iso_c_binding" } ],
    "variables": [
      { "name": "i", "f_type": "integer" },
      { "name": "a", "f_type": "real", "kind": "4" },
      { "name": "x", "f_type": "real", "kind": "4", "rank": 1,
        "lbounds": ["1"], "counts": ["n"], "total_count": "(n)",
        "index_macro": "x(i1) x[((i1)-(1))]",
        "index_macro_with_placeholders": "x(i1) x[((i1)-(x_lb1))]" },
      { "name": "y", "f_type": "real", "kind": "4", "rank": 1,
        "lbounds": ["1"], "counts": ["n"], "total_count": "(n)",
        "index_macro": "y(i1) y[((i1)-(1))]",
        "index_macro_with_placeholders": "y(i1) y[((i1)-(y_lb1))]" }
    ] }
]"#;

const KERNELS: &str = r#"{
  "kernels": [
    { "kernel_name": "saxpy_7", "launcher_name": "launch_saxpy_7",
      "parent_tag": "saxpy", "line": 7,
      "identifiers": ["i", "y", "a", "x", "n"], "loop_vars": ["i"],
      "dimensions": 1, "problem_size": ["n"], "grid": [-2], "block": [256],
      "c_body": "y[i] = a * x[i] + y[i];", "f_body": "y(i) = a * x(i) + y(i)\n",
      "stream": "c_null_ptr", "shared_mem": "0" }
  ]
}"#;

fn write_inputs(dir: &Path, kernels: &str) -> Invocation {
    let index = dir.join("index.json");
    let kernels_path = dir.join("saxpy.json");
    std::fs::write(&index, INDEX).unwrap();
    std::fs::write(&kernels_path, kernels).unwrap();
    Invocation {
        index,
        kernels: kernels_path,
        output_prefix: None,
        config: RunConfig::default(),
    }
}

#[test]
fn index_document_loads() {
    let dir = tempfile::tempdir().unwrap();
    let invocation = write_inputs(dir.path(), KERNELS);
    let index = read_index(&invocation.index).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.find("SAXPY").unwrap().variables.len(), 4);
}

#[test]
fn writes_kernel_contexts() {
    let dir = tempfile::tempdir().unwrap();
    let invocation = write_inputs(dir.path(), KERNELS);

    let output = run(&invocation).unwrap().expect("a kernel was selected");
    assert_eq!(output, dir.path().join("saxpy.kernels.json"));

    let text = std::fs::read_to_string(&output).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    let kernel = &json["native"]["kernels"][0];
    assert_eq!(kernel["kernel_name"], "saxpy_7");
    assert_eq!(
        kernel["kernel_args"],
        serde_json::json!([
            "float* y",
            "const int y_lb1",
            "const int y_n1",
            "float a",
            "float* x",
            "const int x_lb1",
            "const int x_n1",
            "int n"
        ])
    );
    assert_eq!(kernel["block"], serde_json::json!([{ "dim": "X", "value": 256 }]));
    assert_eq!(kernel["grid"], serde_json::json!([]));
    assert_eq!(kernel["macros"][0]["expr"], "y(i1) y[((i1)-(1))]");

    assert_eq!(json["interface_module"]["name"], "saxpy_kernels");
    assert_eq!(json["launch_sites"][0]["host_call_arg_names"][0], "c_loc(y)");
}

#[test]
fn explicit_output_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let mut invocation = write_inputs(dir.path(), KERNELS);
    invocation.output_prefix = Some(dir.path().join("out").join("heat-eq.f90"));
    std::fs::create_dir(dir.path().join("out")).unwrap();

    let output = run(&invocation).unwrap().unwrap();
    assert_eq!(output, dir.path().join("out").join("heat-eq.f90.kernels.json"));
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("heat_eq_f90_kernels"));
}

#[test]
fn unselected_kernels_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut invocation = write_inputs(dir.path(), KERNELS);
    invocation.config.kernels_to_convert = vec!["99".to_string()];

    assert_eq!(run(&invocation).unwrap(), None);
    assert!(!invocation.output_path().exists());
}

#[test]
fn strict_missing_variable_exits_with_lookup_status() {
    let dir = tempfile::tempdir().unwrap();
    let kernels = KERNELS.replace(r#""a", "x", "n""#, r#""a", "x", "n", "ghost""#);
    let mut invocation = write_inputs(dir.path(), &kernels);
    invocation.config.error_handling = ErrorMode::Strict;

    let err = run(&invocation).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::E1002));
    assert_eq!(err.exit_status(), 12);
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn lenient_missing_variable_becomes_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let kernels = KERNELS.replace(r#""a", "x", "n""#, r#""a", "x", "n", "ghost""#);
    let invocation = write_inputs(dir.path(), &kernels);

    let output = run(&invocation).unwrap().unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    let args = json["native"]["kernels"][0]["kernel_args"].as_array().unwrap();
    assert_eq!(args.last().unwrap(), "UNKNOWN ghost");
}

#[test]
fn malformed_documents_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let invocation = write_inputs(dir.path(), "{ not json");
    let err = run(&invocation).unwrap_err();
    assert!(matches!(err, DriverError::Kernels { .. }));
    assert_eq!(err.exit_status(), 1);
    assert_eq!(err.code(), None);
}

#[test]
fn config_file_round_trips_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fkc.json");
    std::fs::write(&path, r#"{ "error_handling": "strict", "includes": ["extra.h"] }"#).unwrap();
    let config = RunConfig::load(&path).unwrap();
    assert_eq!(config.error_handling, ErrorMode::Strict);
    assert_eq!(config.includes, vec!["extra.h"]);

    let missing = RunConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(missing.to_string().contains("absent.json"));
}
