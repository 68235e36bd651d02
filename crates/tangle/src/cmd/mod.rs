use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod compile;
pub mod decode;
pub mod emit;
pub mod envinfo;
pub mod tokenize;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile TNGL source to bytecode.
    Compile(CompileArgs),
    /// Print the token stream of TNGL source.
    Tokenize(TokenizeArgs),
    /// Decode network-directed bytes.
    Decode(DecodeArgs),
    /// Encode an emit-event message.
    Emit(EmitArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Compile(args) => compile::run(args, format),
        Command::Tokenize(args) => tokenize::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Emit(args) => emit::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// TNGL source file, or `-` for stdin.
    pub input: PathBuf,
    /// Bytecode buffer capacity in bytes.
    #[arg(long, default_value = "65535")]
    pub max_size: usize,
}

#[derive(Args, Debug)]
pub struct TokenizeArgs {
    /// TNGL source file, or `-` for stdin.
    pub input: PathBuf,
    /// Include whitespace tokens.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded bytes, or `-` to read hex from stdin.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Event label (up to five word characters).
    #[arg(long, short = 'l')]
    pub label: String,
    /// Destination controller id.
    #[arg(long, default_value = "255")]
    pub id: u8,
    /// Percentage value, -100 to 100.
    #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["timestamp", "color", "value_label"])]
    pub percentage: Option<f64>,
    /// Timestamp value in milliseconds.
    #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["percentage", "color", "value_label"])]
    pub timestamp: Option<i32>,
    /// Color value, `#rrggbb`.
    #[arg(long, conflicts_with_all = ["percentage", "timestamp", "value_label"])]
    pub color: Option<String>,
    /// Label value.
    #[arg(long, conflicts_with_all = ["percentage", "timestamp", "color"])]
    pub value_label: Option<String>,
    /// Timeline position stamped on the event (ignored with --lazy).
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub at: i32,
    /// Encode the lazy (untimestamped) variant.
    #[arg(long)]
    pub lazy: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}

/// Read a whole input file, `-` meaning stdin.
pub fn read_input(path: &Path) -> CliResult<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}
