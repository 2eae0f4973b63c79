//! Command implementations
//!
//! Each command works on whole files; artifacts are small enough to hold
//! in memory.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;

use bytecode_system::{decode, dump, encode, undump, Constant, FunctionProto};
use tracing::{debug, info};

use crate::cli::{Cli, Command};
use crate::error::{CliError, CliResult};

/// Execute the parsed command, writing its report to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> CliResult<()> {
    match &cli.command {
        Command::Inspect { file } => {
            out.write_all(inspect(file)?.as_bytes())?;
        }
        Command::Pack { input, output } => {
            let size = pack(input, output)?;
            writeln!(out, "wrote {} ({} bytes)", output.display(), size)?;
        }
        Command::Unpack { file, output } => {
            let json = unpack(file)?;
            match output {
                Some(path) => fs::write(path, json)?,
                None => writeln!(out, "{}", json)?,
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Describe a chunk file
///
/// Source text gets a one-line summary; an artifact gets a full listing of
/// its decoded tree.
pub fn inspect(path: &Path) -> CliResult<String> {
    let bytes = fs::read(path)?;
    match undump(&bytes)? {
        Some(proto) => {
            debug!(path = %path.display(), bytes = bytes.len(), "artifact decoded");
            Ok(listing(&proto))
        }
        None => Ok(format!(
            "{}: source text ({} bytes)\n",
            path.display(),
            bytes.len()
        )),
    }
}

/// Build an artifact from a JSON prototype tree
///
/// The tree is checked the same way a loader would check it before
/// anything is written. Returns the artifact size.
pub fn pack(input: &Path, output: &Path) -> CliResult<usize> {
    let text = fs::read_to_string(input)?;
    let mut proto: FunctionProto = serde_json::from_str(&text)?;
    proto.rebuild_string_constants();
    decode(&encode(&proto))?;

    let mut artifact = Vec::new();
    dump(&proto, &mut artifact)?;
    fs::write(output, &artifact)?;
    info!(output = %output.display(), bytes = artifact.len(), "artifact packed");
    Ok(artifact.len())
}

/// Decode an artifact into pretty-printed JSON
pub fn unpack(file: &Path) -> CliResult<String> {
    let bytes = fs::read(file)?;
    let proto = undump(&bytes)?.ok_or_else(|| CliError::NotPrecompiled(file.to_path_buf()))?;
    Ok(serde_json::to_string_pretty(&proto)?)
}

/// Human-readable listing of a prototype tree
pub fn listing(proto: &FunctionProto) -> String {
    let mut out = String::new();
    // Formatting into a String cannot fail
    let _ = write_proto(&mut out, proto, "root", 0);
    out
}

fn write_proto(
    out: &mut String,
    proto: &FunctionProto,
    path: &str,
    depth: usize,
) -> std::fmt::Result {
    let pad = "  ".repeat(depth);
    writeln!(
        out,
        "{pad}function {path} <{}:{},{}> ({} instructions)",
        proto.source_name,
        proto.line_defined,
        proto.last_line_defined,
        proto.code.len()
    )?;
    writeln!(
        out,
        "{pad}{} params, {} upvalues, {} registers, vararg flags {:#04x}",
        proto.num_parameters, proto.num_upvalues, proto.num_used_registers, proto.is_var_arg
    )?;

    writeln!(out, "{pad}constants ({}):", proto.constants.len())?;
    for (i, constant) in proto.constants.iter().enumerate() {
        match constant {
            Constant::String(s) => writeln!(out, "{pad}  [{i}] {:?}", s)?,
            Constant::Number(n) => writeln!(out, "{pad}  [{i}] {}", n)?,
        }
    }

    writeln!(out, "{pad}code ({}):", proto.code.len())?;
    for (pc, word) in proto.code.iter().enumerate() {
        match proto.dbg_source_positions.get(pc) {
            Some(line) => writeln!(out, "{pad}  [{pc}] {word:#010x}  ; line {line}")?,
            None => writeln!(out, "{pad}  [{pc}] {word:#010x}")?,
        }
    }

    if !proto.dbg_locals.is_empty() {
        writeln!(out, "{pad}locals ({}):", proto.dbg_locals.len())?;
        for local in &proto.dbg_locals {
            writeln!(
                out,
                "{pad}  {} r{} pc {}-{}",
                local.name, local.register, local.start_pc, local.end_pc
            )?;
        }
    }

    if !proto.dbg_upvalues.is_empty() {
        writeln!(out, "{pad}upvalues: {}", proto.dbg_upvalues.join(", "))?;
    }

    for (i, child) in proto.children().iter().enumerate() {
        write_proto(out, child, &format!("{path}/{i}"), depth + 1)?;
    }
    Ok(())
}
