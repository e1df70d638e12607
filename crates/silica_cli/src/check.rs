//! The `silica check` subcommand: run the pipeline without writing output.

use std::path::Path;

use crate::pipeline;
use crate::{CheckArgs, GlobalArgs};

/// Parses, elaborates, and bit-blasts a design, reporting a short summary.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let input = Path::new(&args.input);
    let source = pipeline::read_source(input)?;
    let config = pipeline::load_project_config(input)?;

    let top = args.top.as_deref().or(config.project.top.as_deref());
    let mut module = pipeline::elaborate_source(&source, top, None, global)?;
    silica_bitblast::bit_blast(&mut module)?;

    if !global.quiet {
        let inputs = module.signals.values().filter(|s| s.is_input).count();
        let outputs = module.signals.values().filter(|s| s.is_output).count();
        println!(
            "ok: module '{}' ({} inputs, {} outputs, {} primitive gates)",
            module.name,
            inputs,
            outputs,
            module.gates.len()
        );
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn check_valid_design() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("mux.v");
        fs::write(
            &input,
            "module mux(input s, input a, input b, output reg y);\n\
             always @(*) begin\n\
               if (s) y = b; else y = a;\n\
             end\nendmodule\n",
        )
        .unwrap();

        let args = CheckArgs {
            input: input.to_str().unwrap().to_string(),
            top: None,
        };
        assert_eq!(run(&args, &quiet_global()).unwrap(), 0);
    }

    #[test]
    fn check_syntax_error_fails() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("bad.v");
        fs::write(&input, "module bad(input a;\n").unwrap();

        let args = CheckArgs {
            input: input.to_str().unwrap().to_string(),
            top: None,
        };
        let err = run(&args, &quiet_global()).unwrap_err();
        assert!(err.to_string().contains("syntax error"));
    }
}
