use tangle_compiler::{tokenize, Token, TokenKind};

use crate::cmd::{read_input, TokenizeArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_raw, print_table, OutputFormat};

pub fn run(args: TokenizeArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_input(&args.input)?;
    let tokens: Vec<Token<'_>> = tokenize(&source)
        .into_iter()
        .filter(|token| args.all || token.kind != TokenKind::Whitespace)
        .collect();

    match format {
        OutputFormat::Json => print_json(&tokens),
        OutputFormat::Table => print_table(
            &["OFFSET", "KIND", "TEXT"],
            tokens
                .iter()
                .map(|token| {
                    vec![
                        token.offset.to_string(),
                        token.kind.as_str().to_string(),
                        token.text.escape_debug().to_string(),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty => {
            for token in &tokens {
                println!("{:>6} {:<12} {:?}", token.offset, token.kind.as_str(), token.text);
            }
        }
        OutputFormat::Raw => {
            for token in &tokens {
                print_raw(token.text.as_bytes());
                print_raw(b"\n");
            }
        }
    }

    Ok(SUCCESS)
}
