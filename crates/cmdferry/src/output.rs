use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cmdferry_proto::encode_length;
use cmdferry_session::TransferReport;
use serde::Serialize;

use crate::menu::TEMPLATES;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct TransferOutput<'a> {
    command: &'a str,
    payload_len: usize,
    token: String,
    consumer_pid: u32,
    exit_code: i32,
}

/// Print the transfer report after the consumer has finished.
///
/// The invoked command's own output has already gone to the inherited
/// standard streams; this report is the producer's bookkeeping.
pub fn print_transfer(command: &str, report: &TransferReport, format: OutputFormat) {
    let out = TransferOutput {
        command,
        payload_len: report.payload_len,
        token: encode_length(report.payload_len),
        consumer_pid: report.consumer_pid,
        exit_code: report.exit_code(),
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "BYTES", "TOKEN", "CONSUMER", "EXIT"])
                .add_row(vec![
                    out.command.to_string(),
                    out.payload_len.to_string(),
                    out.token,
                    out.consumer_pid.to_string(),
                    out.exit_code.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "command={:?} bytes={} token={} consumer={} exit={}",
                out.command, out.payload_len, out.token, out.consumer_pid, out.exit_code
            );
        }
    }
}

#[derive(Serialize)]
struct TemplateOutput {
    number: u8,
    label: &'static str,
    inputs: &'static [&'static str],
}

/// Print the command template catalog.
pub fn print_catalog(format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let entries: Vec<TemplateOutput> = TEMPLATES
                .iter()
                .map(|t| TemplateOutput {
                    number: t.number,
                    label: t.label,
                    inputs: t.prompts,
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "ACTION", "INPUTS"]);
            for t in TEMPLATES {
                table.add_row(vec![
                    t.number.to_string(),
                    t.label.to_string(),
                    t.prompts.join(", "),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for t in TEMPLATES {
                println!("{:>2}. {} ({})", t.number, t.label, t.prompts.join(", "));
            }
        }
    }
}
