use std::collections::BTreeMap;

use serde::Serialize;
use tangle_compiler::CompilerConfig;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

/// Runtime limits and defaults the binary was built with.
#[derive(Serialize)]
struct Limits {
    max_bytecode_size: usize,
    #[cfg(feature = "interface")]
    chunk_size: usize,
    #[cfg(feature = "interface")]
    reconnection_interval_ms: u128,
    #[cfg(feature = "interface")]
    min_connect_timeout_ms: u128,
}

impl Limits {
    fn current() -> Self {
        #[cfg(feature = "interface")]
        let interface = tangle_interface::InterfaceConfig::default();
        Self {
            max_bytecode_size: CompilerConfig::default().max_bytecode_size,
            #[cfg(feature = "interface")]
            chunk_size: interface.chunk_size,
            #[cfg(feature = "interface")]
            reconnection_interval_ms: interface.reconnection_interval.as_millis(),
            #[cfg(feature = "interface")]
            min_connect_timeout_ms: tangle_interface::MIN_CONNECT_TIMEOUT.as_millis(),
        }
    }
}

#[derive(Serialize)]
struct EnvInfoOutput {
    version: &'static str,
    target: String,
    git_hash: &'static str,
    features: Vec<&'static str>,
    limits: Limits,
    environment: BTreeMap<&'static str, Option<String>>,
}

pub fn run(_args: EnvinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let output = EnvInfoOutput {
        version: env!("CARGO_PKG_VERSION"),
        target: option_env!("TANGLE_BUILD_TARGET")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        features: active_features(),
        limits: Limits::current(),
        environment: ["TANGLE_LOG_LEVEL", "RUST_LOG"]
            .into_iter()
            .map(|key| (key, std::env::var(key).ok()))
            .collect(),
    };

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table | OutputFormat::Pretty => print_table(&["KEY", "VALUE"], rows(&output)),
        OutputFormat::Raw => println!("{}", output.version),
    }
    Ok(SUCCESS)
}

fn rows(output: &EnvInfoOutput) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec!["version".to_string(), output.version.to_string()],
        vec!["target".to_string(), output.target.clone()],
        vec!["git hash".to_string(), output.git_hash.to_string()],
        vec!["features".to_string(), output.features.join(", ")],
    ];
    // keyed by serialized field name
    if let Ok(serde_json::Value::Object(limits)) = serde_json::to_value(&output.limits) {
        rows.extend(
            limits
                .into_iter()
                .map(|(key, value)| vec![key.replace('_', " "), value.to_string()]),
        );
    }
    rows.extend(output.environment.iter().map(|(key, value)| {
        vec![
            key.to_string(),
            value.clone().unwrap_or_else(|| "(not set)".to_string()),
        ]
    }));
    rows
}

fn active_features() -> Vec<&'static str> {
    [
        ("interface", cfg!(feature = "interface")),
        ("cli", cfg!(feature = "cli")),
    ]
    .into_iter()
    .filter_map(|(name, on)| on.then_some(name))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_report_compiler_capacity() {
        let json = serde_json::to_value(Limits::current()).unwrap();
        assert_eq!(json["max_bytecode_size"], 65535);
    }

    #[test]
    fn table_rows_include_limits() {
        let output = EnvInfoOutput {
            version: "0.0.0",
            target: "x86_64-linux".to_string(),
            git_hash: "abc",
            features: vec!["cli"],
            limits: Limits::current(),
            environment: BTreeMap::from([("RUST_LOG", None)]),
        };
        let rows = rows(&output);
        assert!(rows.iter().any(|row| row[0] == "max bytecode size" && row[1] == "65535"));
        assert!(rows.iter().any(|row| row[0] == "RUST_LOG" && row[1] == "(not set)"));
    }
}
