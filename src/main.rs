use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use dbf_codec::{read_path, write_path_dated, Cli, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let table = read_path(&cli.dbf_path, &cli.decode_options())
        .with_context(|| format!("cannot decode {}", cli.dbf_path.display()))?;

    match cli.command {
        Command::Info => {
            if let Some(header) = table.decoded_header() {
                println!("version: {:#04x}", header.version);
                match header.last_updated {
                    Some(date) => println!("last updated: {date}"),
                    None => println!("last updated: unknown"),
                }
                println!("number of records: {}", header.record_count);
                println!("header length: {}", header.header_length);
                println!("record length: {}", header.record_length);
            }
            println!("number of fields: {}", table.fields().len());
            println!(
                "number of deleted records: {}",
                table.len() - table.active_records().count()
            );
        }
        Command::Fields => {
            for field in table.fields() {
                println!("{field}");
            }
        }
        Command::Records { include_deleted } => {
            for record in table.records() {
                if record.is_deleted() && !include_deleted {
                    continue;
                }
                let line = record
                    .iter()
                    .map(|(_, v)| v.to_string())
                    .collect::<Vec<String>>()
                    .join("|");
                let flag = if record.is_deleted() { "*" } else { "" };
                println!("{flag}{line}");
            }
        }
        Command::Rewrite { output, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            write_path_dated(&table, &output, date)
                .with_context(|| format!("cannot write {}", output.display()))?;
            println!("wrote {} records to {}", table.len(), output.display());
        }
    }

    Ok(())
}
