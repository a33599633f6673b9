//! chwire: inspect and exercise the Decimal column codec
//!
//! # Usage
//!
//! ```bash
//! # Storage width for a precision/scale pair
//! chwire resolve 77 10
//!
//! # Show the resolved shape of a column type
//! chwire explain "Map(String, Decimal(85, 18))"
//!
//! # Encode JSON values to hex, and back
//! chwire encode --type "Nullable(Decimal(100, 10))" '"123.456"' null
//! chwire decode --type "Nullable(Decimal(100, 10))" 00...
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::BytesMut;
use chwire::prelude::*;
use chwire::value::Rendered;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::*;
use tracing::Level;

#[derive(Parser)]
#[command(name = "chwire")]
#[command(author = "chwire contributors")]
#[command(version)]
#[command(about = "Exact Decimal(P, S) wire codec, up to 154 digits", long_about = None)]
#[command(after_help = "EXAMPLES:
    chwire resolve 76 0
    chwire explain 'Tuple(a Array(Nullable(Decimal(95, 20))), b Map(String, Decimal(85, 18)))'
    chwire encode --type 'Decimal(154, 50)' '\"-1.5\"'")]
struct Cli {
    /// Configuration file (default: ./chwire.toml, then the user config dir)
    #[arg(long, global = true, env = "CHWIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log to stderr; repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a (precision, scale) pair to its storage width
    Resolve {
        #[arg(allow_hyphen_values = true)]
        precision: i64,
        #[arg(allow_hyphen_values = true)]
        scale: i64,
    },
    /// Parse a column type and show its shape
    Explain {
        /// Declared type, e.g. "Array(Nullable(Decimal(110, 35)))"
        #[arg(value_name = "TYPE")]
        column_type: String,
    },
    /// Encode JSON values and print the bytes as hex
    Encode {
        #[arg(short, long = "type")]
        column_type: String,
        /// One JSON document per value; decimals as strings
        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,
    },
    /// Decode hex bytes into values until the input is exhausted
    Decode {
        #[arg(short, long = "type")]
        column_type: String,
        hex: String,
        /// Strip trailing fractional zeros
        #[arg(long)]
        trimmed: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = CodecConfig::discover(cli.config.as_deref()).context("Failed to load config")?;

    match &cli.command {
        Commands::Resolve { precision, scale } => resolve_pair(*precision, *scale, cli.format),
        Commands::Explain { column_type } => explain_type(column_type, &config, cli.format),
        Commands::Encode {
            column_type,
            values,
        } => encode_values(column_type, values, &config),
        Commands::Decode {
            column_type,
            hex,
            trimmed,
        } => {
            let style = if *trimmed {
                RenderStyle::Trimmed
            } else {
                config.render
            };
            decode_values(column_type, hex, &config, style, cli.format)
        }
    }
}

fn resolve_pair(precision: i64, scale: i64, format: OutputFormat) -> Result<()> {
    let spec = resolve(precision, scale)?;
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "precision": spec.precision(),
                "scale": spec.scale(),
                "width_bits": spec.width().bits(),
                "bytes": spec.width().bytes(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!(
                "{} {} {}",
                spec.to_string().white().bold(),
                "→".dimmed(),
                spec.width().to_string().cyan()
            );
            println!(
                "  {} {} bits, {} bytes",
                "Storage:".dimmed(),
                spec.width().bits(),
                spec.width().bytes()
            );
            println!("  {} {}", "Integer digits:".dimmed(), spec.integer_digits());
        }
    }
    Ok(())
}

fn explain_type(input: &str, config: &CodecConfig, format: OutputFormat) -> Result<()> {
    let ty = ColumnType::parse_with(input, config)?;
    match format {
        OutputFormat::Json => {
            let leaves: Vec<_> = ty
                .decimal_leaves()
                .into_iter()
                .map(|spec| {
                    serde_json::json!({
                        "type": spec.to_string(),
                        "width_bits": spec.width().bits(),
                    })
                })
                .collect();
            let out = serde_json::json!({
                "type": ty.to_string(),
                "nullable": ty.is_nullable(),
                "decimals": leaves,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "Type:".dimmed(), ty.to_string().white().bold());
            println!();
            print_node(&ty, 1, None);
        }
    }
    Ok(())
}

fn print_node(ty: &ColumnType, depth: usize, label: Option<&str>) {
    let indent = "  ".repeat(depth);
    let label = label.map(|l| format!("{} ", l.yellow())).unwrap_or_default();
    match ty {
        ColumnType::Decimal(spec) => println!(
            "{}{}{} {}",
            indent,
            label,
            spec.to_string().cyan(),
            format!("[{}, {} bytes]", spec.width(), spec.width().bytes()).dimmed()
        ),
        ColumnType::Scalar(scalar) => println!("{}{}{}", indent, label, scalar.name().white()),
        ColumnType::Nullable(inner) => {
            println!("{}{}{}", indent, label, "Nullable".green());
            print_node(inner, depth + 1, None);
        }
        ColumnType::Array(inner) => {
            println!("{}{}{}", indent, label, "Array".green());
            print_node(inner, depth + 1, None);
        }
        ColumnType::Map(k, v) => {
            println!("{}{}{}", indent, label, "Map".green());
            print_node(k, depth + 1, Some("key:"));
            print_node(v, depth + 1, Some("value:"));
        }
        ColumnType::Tuple(fields) => {
            println!("{}{}{}", indent, label, "Tuple".green());
            for (i, field) in fields.iter().enumerate() {
                let name = field.name.clone().unwrap_or_else(|| format!("#{}", i));
                print_node(&field.ty, depth + 1, Some(format!("{}:", name).as_str()));
            }
        }
    }
}

fn encode_values(input: &str, values: &[String], config: &CodecConfig) -> Result<()> {
    let ty = ColumnType::parse_with(input, config)?;
    let codec = CompositeCodec::with_config(config);
    let mut buf = BytesMut::new();

    for (i, raw) in values.iter().enumerate() {
        let json: serde_json::Value =
            serde_json::from_str(raw).with_context(|| format!("Value #{} is not valid JSON", i + 1))?;
        let value = Value::from_json(&ty, &json).with_context(|| format!("Value #{}", i + 1))?;
        codec
            .encode(&ty, &value, &mut buf)
            .with_context(|| format!("Value #{}", i + 1))?;
    }

    println!("{}", hex::encode(&buf));
    Ok(())
}

fn decode_values(
    input: &str,
    hex_input: &str,
    config: &CodecConfig,
    style: RenderStyle,
    format: OutputFormat,
) -> Result<()> {
    let ty = ColumnType::parse_with(input, config)?;
    let codec = CompositeCodec::with_config(config);
    let bytes = hex::decode(hex_input.trim()).context("Input is not valid hex")?;

    let mut buf = &bytes[..];
    let mut values = Vec::new();
    while !buf.is_empty() {
        let offset = bytes.len() - buf.len();
        let value = codec
            .decode(&ty, &mut buf)
            .with_context(|| format!("Value #{} at byte {}", values.len() + 1, offset))?;
        values.push(value);
    }

    match format {
        OutputFormat::Json => {
            let out: Vec<_> = values.iter().map(|v| v.to_json(style)).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for value in &values {
                println!("{}", Rendered(value, style));
            }
            println!();
            println!("{} value(s) decoded", values.len().to_string().cyan());
        }
    }
    Ok(())
}
