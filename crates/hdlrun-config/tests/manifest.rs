//! Loading complete manifests from disk

use hdlrun_config::{from_path, from_str, ConfigError, MANIFEST_NAME};
use hdlrun_ports::{flatten_ports, Direction};
use hdlrun_sim::{HdlLanguage, ParamValue, SimulatorKind};
use std::fs;
use std::path::PathBuf;

const ADDER: &str = r#"
[run]
toplevel = "adder"
simulator = "icarus"
lang = "verilog"
waveform = "adder.fst"
seed = 7
timescale = "1ns/1ps"
build_dir = "build"
extra_args = ["-DSIM"]

[sources]
verilog = ["rtl/adder.v"]

[parameters]
WIDTH = 8

[env]
N_TESTS = "100"

[platform.extra_files]
"adder_pkg.v" = "module adder_pkg; endmodule\n"

[design]
module = "adder_core"
ports = [
  { signal = "a", width = 8, dir = "in" },
  { signal = "b", width = 8 },
  { sum = { signal = "o", width = 9, dir = "out" } },
]
"#;

#[test]
fn full_manifest_round_trip_into_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(MANIFEST_NAME);
    fs::write(&path, ADDER).unwrap();

    let manifest = from_path(&path).unwrap();
    manifest.validate().unwrap();
    assert_eq!(manifest.simulator().unwrap(), SimulatorKind::Icarus);

    let input = manifest.design_input().unwrap().unwrap();
    assert_eq!(input.design.name_hint(), "adder_core");

    let options = manifest.into_options(dir.path()).unwrap();
    assert_eq!(options.toplevel.as_deref(), Some("adder"));
    assert_eq!(options.simulator, "icarus");
    assert_eq!(options.language, Some(HdlLanguage::Verilog));
    assert_eq!(options.waveform_file, Some(dir.path().join("adder.fst")));
    assert_eq!(options.build_dir, Some(dir.path().join("build")));
    assert_eq!(options.seed, Some(7));
    assert_eq!(options.timescale.to_string(), "1ns/1ps");
    assert_eq!(options.extra_args, ["-DSIM"]);
    assert_eq!(options.parameters["WIDTH"], ParamValue::Int(8));
    assert_eq!(options.extra_env["N_TESTS"], "100");
    assert_eq!(
        options.sources[&HdlLanguage::Verilog],
        [dir.path().join("rtl/adder.v")]
    );
    assert_eq!(options.platform.as_ref().map(|p| p.len()), Some(1));

    // The manifest is enough to prepare a run
    let build_dir = options.build_dir.clone().unwrap();
    let prepared = hdlrun_runner::prepare(&options, Some(&input), &build_dir).unwrap();
    assert_eq!(
        prepared.job.sources_for(HdlLanguage::Verilog),
        [
            dir.path().join("rtl/adder.v"),
            build_dir.join("adder_pkg.v"),
            build_dir.join("hdlrun_output.v"),
        ]
    );
    let wrapper = fs::read_to_string(build_dir.join("hdlrun_output.v")).unwrap();
    assert!(wrapper.contains("module adder ("));
    assert!(wrapper.contains(".o(sum)"));
}

#[test]
fn design_ports_load_in_order() {
    let manifest = from_str(ADDER).unwrap();
    let ports = flatten_ports(&manifest.port_spec().unwrap().unwrap()).unwrap();

    let names: Vec<_> = ports.names().collect();
    assert_eq!(names, ["a", "b", "sum"]);
    assert_eq!(ports[1].signal.direction(), Direction::Input);
    assert_eq!(ports[2].signal.name(), "o");
    assert_eq!(ports[2].signal.width(), 9);
    assert_eq!(ports[2].path.to_string(), r#"ports[2]["sum"]"#);
}

#[test]
fn absolute_paths_are_kept() {
    let manifest = from_str(
        r#"
        [run]
        toplevel = "adder"
        build_dir = "/tmp/hdlrun-build"

        [sources]
        vhdl = ["/rtl/adder.vhd", "pkg.vhd"]
        "#,
    )
    .unwrap();
    let options = manifest.into_options(&PathBuf::from("/work")).unwrap();
    assert_eq!(options.build_dir, Some(PathBuf::from("/tmp/hdlrun-build")));
    assert_eq!(
        options.sources[&HdlLanguage::Vhdl],
        [PathBuf::from("/rtl/adder.vhd"), PathBuf::from("/work/pkg.vhd")]
    );
}

fn validation_error(manifest: &str) -> String {
    match from_str(manifest).unwrap().validate() {
        Err(ConfigError::Validation(message)) => message,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn validation_errors() {
    assert_eq!(
        validation_error("[sources]\nverilog = [\"a.v\"]\n"),
        "run.toplevel is required when there is no [design] section"
    );
    assert_eq!(
        validation_error("[run]\ntoplevel = \"a\"\nsimulator = \"questa\"\n"),
        "Unknown simulator: questa. Supported: icarus, verilator, ghdl, nvc"
    );
    assert_eq!(
        validation_error("[run]\ntoplevel = \"a\"\nwaveform = \"a.fst\"\nvcd_file = \"a.vcd\"\n"),
        "run.waveform and run.vcd_file can't be used at the same time"
    );
    assert_eq!(
        validation_error("[run]\ntoplevel = \"a\"\nwaveform = \"a.ghw\"\n"),
        "Invalid extension for waveform: 'ghw'. Supported extensions are: vcd fst"
    );
    assert_eq!(
        validation_error("[run]\ntoplevel = \"a\"\nsimulator = \"nvc\"\n[sources]\nverilog = [\"a.v\"]\n"),
        "simulator nvc doesn't support verilog sources"
    );
    assert_eq!(
        validation_error("[run]\ntoplevel = \"a\"\n[sources]\nsystemc = [\"a.cpp\"]\n"),
        "Unknown HDL language: systemc"
    );
    assert_eq!(
        validation_error("[run]\nlang = \"vhdl\"\n[design]\nmodule = \"core\"\nports = []\n"),
        "simulator icarus can't emit the design as vhdl"
    );
}
