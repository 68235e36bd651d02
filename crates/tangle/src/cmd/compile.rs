use serde::Serialize;
use tangle_compiler::{CompiledTngl, Compiler, CompilerConfig, Diagnostic};

use crate::cmd::{read_input, CompileArgs};
use crate::exit::{compile_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_json, print_raw, print_table, to_hex, OutputFormat};

#[derive(Serialize)]
struct CompileOutput<'a> {
    size: usize,
    #[serde(flatten)]
    compiled: &'a CompiledTngl,
}

pub fn run(args: CompileArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_input(&args.input)?;
    let config = CompilerConfig {
        max_bytecode_size: args.max_size,
    };
    let compiled = Compiler::with_config(config)
        .compile(&source)
        .map_err(|err| compile_error("compile failed", err))?;

    print_compiled(&compiled, format);

    if compiled.has_errors() {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

fn print_compiled(compiled: &CompiledTngl, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&CompileOutput {
            size: compiled.bytecode.len(),
            compiled,
        }),
        OutputFormat::Table => {
            println!("{} bytes: {}", compiled.bytecode.len(), to_hex(&compiled.bytecode));
            if !compiled.diagnostics.is_empty() {
                print_table(
                    &["SEVERITY", "OFFSET", "TOKEN", "MESSAGE"],
                    compiled.diagnostics.iter().map(diagnostic_row).collect(),
                );
            }
        }
        OutputFormat::Pretty => {
            println!("{}", to_hex(&compiled.bytecode));
            for diagnostic in &compiled.diagnostics {
                println!("{}", diagnostic_row(diagnostic).join(" "));
            }
        }
        OutputFormat::Raw => print_raw(&compiled.bytecode),
    }
}

fn diagnostic_row(diagnostic: &Diagnostic) -> Vec<String> {
    vec![
        format!("{:?}", diagnostic.severity).to_lowercase(),
        diagnostic.offset.to_string(),
        diagnostic.token.clone(),
        diagnostic.message.clone(),
    ]
}
