use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use calcite_core::{
    compile_type_name, decode, process_date, process_decimal, process_timestamp,
    quote_qualified, reflect_type, rewrite_statement, TypeClass, TypeClassification, Value,
    RawCell,
};
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(name = "calcite-cli")]
#[command(about = "Inspect how the calcite driver rewrites SQL and decodes values", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a generically compiled statement for the engine
    Rewrite {
        /// SQL text as produced by a generic compiler
        sql: String,
    },
    /// Map a portable column type to the engine's type name
    CompileType {
        /// Portable type, e.g. INTEGER or VARCHAR(20)
        type_name: String,
    },
    /// Classify an engine type name, optionally processing a value of it
    Reflect {
        /// Engine type name, e.g. decimal(10,2)
        engine_type: String,
        /// String value to run through the class's processor
        #[arg(long)]
        value: Option<String>,
    },
    /// Decode a textual cell under a JDBC type code
    Decode {
        /// JDBC type code, e.g. 4 for INTEGER or -5 for BIGINT
        #[arg(allow_negative_numbers = true)]
        code: i32,
        /// Raw cell text
        value: Option<String>,
        /// Engine type name reported in errors
        #[arg(long, default_value = "")]
        type_name: String,
    },
    /// Quote a (possibly dotted) identifier the way the engine expects
    Quote {
        name: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Rewrite { sql } => {
            println!("{}", rewrite_statement(sql)?);
        }
        Commands::CompileType { type_name } => {
            println!("{}", compile_type_name(type_name));
        }
        Commands::Reflect { engine_type, value } => {
            let class = reflect_type(engine_type);
            let mut out = json!({
                "type": class.name(),
                "string_backed": class.is_string_backed(),
            });
            if let Some(value) = value {
                out["value"] = json!(process_value(class, value)?);
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Decode {
            code,
            value,
            type_name,
        } => {
            let raw = value.as_deref().map(RawCell::from).unwrap_or(RawCell::Null);
            let decoded = decode(*code, type_name, &raw)?;
            let out = json!({
                "class": format!("{:?}", TypeClass::for_code(*code)),
                "value": value_json(&decoded),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Quote { name } => {
            println!("{}", quote_qualified(name));
        }
    }

    Ok(())
}

fn process_value(class: TypeClassification, value: &str) -> Result<String> {
    Ok(match class {
        TypeClassification::Date => process_date(value)?.to_string(),
        TypeClassification::Timestamp => process_timestamp(value)?.to_string(),
        TypeClassification::Decimal => process_decimal(value)?.to_string(),
        other => return Err(anyhow!("{} values are not processed", other.name())),
    })
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bytes(bytes) => json!(BASE64.encode(bytes)),
        other => json!(other),
    }
}
