//! Shared pipeline helpers for CLI commands.
//!
//! Contains the common steps used by `synth` and `check`: reading the
//! source file, locating the project configuration, and running the
//! parse/elaborate/bit-blast stages with optional debug dumps.

use std::path::{Path, PathBuf};

use silica_netlist::Module;

use crate::GlobalArgs;

/// Reads a Verilog source file, with an explicit not-found message.
pub fn read_source(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("input file not found: {}", path.display()).into());
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Loads the `silica.toml` next to the input file, if any.
pub fn load_project_config(
    input: &Path,
) -> Result<silica_config::ProjectConfig, Box<dyn std::error::Error>> {
    let dir = input.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    Ok(silica_config::load_config(dir)?)
}

/// Default BLIF output path for an input file: same path, `.blif` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("blif")
}

/// Parses and elaborates a source file into a word-level netlist.
///
/// With a dump directory, the AST and the elaborated netlist are written
/// there as JSON snapshots.
pub fn elaborate_source(
    source: &str,
    top: Option<&str>,
    dump_dir: Option<&Path>,
    global: &GlobalArgs,
) -> Result<Module, Box<dyn std::error::Error>> {
    let ast = silica_verilog_parser::parse_source(source)?;
    if global.verbose && !global.quiet {
        eprintln!("parsed {} module(s)", ast.modules.len());
    }
    if let Some(dir) = dump_dir {
        dump_stage(dir, "ast", &ast)?;
    }
    let module = silica_elaborate::elaborate(&ast, top)?;
    if global.verbose && !global.quiet {
        eprintln!(
            "elaborated '{}': {} signals, {} gates",
            module.name,
            module.signals.len(),
            module.gates.len()
        );
    }
    if let Some(dir) = dump_dir {
        dump_stage(dir, "elaborated", &module)?;
    }
    Ok(module)
}

/// Writes a JSON snapshot of a pipeline stage into the debug directory.
pub fn dump_stage<T: serde::Serialize>(
    dir: &Path,
    stage: &str,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{stage}.json"));
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const COUNTER: &str = "\
module counter(input clk, input rst, output reg [7:0] count);
  always @(posedge clk) begin
    if (rst)
      count <= 0;
    else
      count <= count + 1;
  end
endmodule
";

    fn quiet_global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn read_source_missing_file() {
        let err = read_source(Path::new("/no/such/file.v")).unwrap_err();
        assert!(err.to_string().contains("input file not found"));
    }

    #[test]
    fn read_source_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("top.v");
        fs::write(&path, COUNTER).unwrap();
        assert_eq!(read_source(&path).unwrap(), COUNTER);
    }

    #[test]
    fn default_output_swaps_extension() {
        assert_eq!(
            default_output_path(Path::new("rtl/counter.v")),
            PathBuf::from("rtl/counter.blif")
        );
    }

    #[test]
    fn load_config_from_input_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("silica.toml"), "[project]\ntop = \"alu\"").unwrap();
        let input = tmp.path().join("alu.v");
        let config = load_project_config(&input).unwrap();
        assert_eq!(config.project.top.as_deref(), Some("alu"));
    }

    #[test]
    fn load_config_bare_filename_uses_cwd() {
        // A bare filename has an empty parent; the loader must not fail.
        let config = load_project_config(Path::new("counter.v"));
        assert!(config.is_ok());
    }

    #[test]
    fn elaborate_source_produces_module() {
        let module = elaborate_source(COUNTER, None, None, &quiet_global()).unwrap();
        assert_eq!(module.name, "counter");
        assert!(module.signals.contains_key("count"));
    }

    #[test]
    fn elaborate_source_unknown_top_fails() {
        let err = elaborate_source(COUNTER, Some("missing"), None, &quiet_global()).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn elaborate_source_dumps_ast_and_netlist() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("debug");
        elaborate_source(COUNTER, None, Some(&dir), &quiet_global()).unwrap();
        assert!(dir.join("ast.json").is_file());
        let json = fs::read_to_string(dir.join("elaborated.json")).unwrap();
        assert!(json.contains("\"counter\""));
    }
}
