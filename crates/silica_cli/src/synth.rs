//! The `silica synth` subcommand: full Verilog-to-BLIF synthesis.

use std::path::{Path, PathBuf};

use crate::pipeline;
use crate::{GlobalArgs, SynthArgs};

/// Runs the synthesis pipeline and writes the BLIF output file.
pub fn run(args: &SynthArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let input = Path::new(&args.input);
    let source = pipeline::read_source(input)?;
    let config = pipeline::load_project_config(input)?;

    let debug_dir = if args.dump_debug {
        let dir = config
            .output
            .debug_dir
            .clone()
            .unwrap_or_else(|| "silica_debug".to_string());
        Some(PathBuf::from(dir))
    } else {
        None
    };

    let top = args.top.as_deref().or(config.project.top.as_deref());
    let mut module = pipeline::elaborate_source(&source, top, debug_dir.as_deref(), global)?;

    silica_bitblast::bit_blast(&mut module)?;
    if global.verbose && !global.quiet {
        eprintln!("bit-blasted: {} primitive gates", module.gates.len());
    }
    if let Some(ref dir) = debug_dir {
        pipeline::dump_stage(dir, "blasted", &module)?;
    }

    let blif = silica_blif::export_blif(&module)?;

    let output = args
        .output
        .clone()
        .or_else(|| config.output.blif.clone())
        .map(PathBuf::from)
        .unwrap_or_else(|| pipeline::default_output_path(input));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, blif)?;

    if !global.quiet {
        println!("wrote {}", output.display());
    }
    Ok(0)
}
