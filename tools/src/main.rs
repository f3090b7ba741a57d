use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use codec::{ContainerLimits, Lzo, SaveChanges};
use tools::{
    collect_save_entries, ensure_distinct_paths, format_inspect_report, inspect_save,
    verbosity_level,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "wsg-tools",
    version,
    about = "Borderlands 2 save decoding and editing tools"
)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the player record from a save.
    Decode {
        /// Path to the save file.
        save: PathBuf,
        /// Output file, stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write JSON instead of the raw record.
        #[arg(short, long)]
        json: bool,
        /// Name known fields in the JSON.
        #[arg(short, long, requires = "json")]
        parse: bool,
    },
    /// Build a save from a player record.
    Encode {
        /// Raw record, or JSON with --json.
        input: PathBuf,
        /// Output file, stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Read JSON, either a raw dump or a parsed record.
        #[arg(short, long)]
        json: bool,
    },
    /// Write every bank, backpack and weapon item as trade codes.
    ExportItems {
        /// Path to the save file.
        save: PathBuf,
        /// Trade code list to write.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Add trade codes to a save.
    ImportItems {
        /// Path to the save file.
        save: PathBuf,
        /// Trade code list to read.
        codes: PathBuf,
        /// Save file to write.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Apply quick edits, e.g. money=99999999,eridium=99,backpack=39.
    Modify {
        /// Path to the save file.
        save: PathBuf,
        /// Comma-separated name=value changes.
        changes: String,
        /// Save file to write.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print container header fields.
    Inspect {
        /// A save file, or a directory of them.
        path: PathBuf,
        /// Glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(verbosity_level(cli.verbose))
        .with_writer(io::stderr)
        .init();

    let limits = ContainerLimits::default();
    match cli.command {
        Command::Decode {
            save,
            output,
            json,
            parse,
        } => {
            ensure_distinct_paths(&save, output.as_deref())?;
            let bag = codec::decode_save(&read(&save)?, &Lzo, &limits)
                .with_context(|| format!("decode save {}", save.display()))?;
            let bytes = if json {
                let value = if parse {
                    codec::record_to_json(&bag).context("map player record")?
                } else {
                    codec::bag_to_json(&bag)
                };
                let mut text = serde_json::to_string_pretty(&value).context("serialize json")?;
                text.push('\n');
                text.into_bytes()
            } else {
                wire::write_field_bag(&bag).context("encode player record")?
            };
            write_output(output.as_deref(), &bytes)?;
        }
        Command::Encode {
            input,
            output,
            json,
        } => {
            ensure_distinct_paths(&input, output.as_deref())?;
            let contents = read(&input)?;
            let bag = if json {
                let value: serde_json::Value =
                    serde_json::from_slice(&contents).context("parse json")?;
                codec::record_from_json(&value).context("read player record")?
            } else {
                wire::read_field_bag(&contents).context("read player record")?
            };
            let raw = codec::encode_save(&bag, &Lzo).context("encode save")?;
            write_output(output.as_deref(), &raw)?;
        }
        Command::ExportItems { save, output } => {
            ensure_distinct_paths(&save, Some(output.as_path()))?;
            let bag = codec::decode_save(&read(&save)?, &Lzo, &limits)
                .with_context(|| format!("decode save {}", save.display()))?;
            let codes = codec::export_items(&bag).context("export items")?;
            write_output(Some(output.as_path()), codes.as_bytes())?;
        }
        Command::ImportItems {
            save,
            codes,
            output,
        } => {
            ensure_distinct_paths(&save, Some(output.as_path()))?;
            let mut bag = codec::decode_save(&read(&save)?, &Lzo, &limits)
                .with_context(|| format!("decode save {}", save.display()))?;
            let text = fs::read_to_string(&codes)
                .with_context(|| format!("read codes {}", codes.display()))?;
            let count = codec::import_items(&mut bag, &text, &mut rand::thread_rng())
                .context("import items")?;
            info!(count, "imported items");
            let raw = codec::encode_save(&bag, &Lzo).context("encode save")?;
            write_output(Some(output.as_path()), &raw)?;
        }
        Command::Modify {
            save,
            changes,
            output,
        } => {
            ensure_distinct_paths(&save, Some(output.as_path()))?;
            let changes: SaveChanges = changes.parse().context("parse changes")?;
            let mut bag = codec::decode_save(&read(&save)?, &Lzo, &limits)
                .with_context(|| format!("decode save {}", save.display()))?;
            codec::apply_changes(&mut bag, &changes).context("apply changes")?;
            let raw = codec::encode_save(&bag, &Lzo).context("encode save")?;
            write_output(Some(output.as_path()), &raw)?;
        }
        Command::Inspect { path, glob } => {
            if path.is_dir() {
                for entry in collect_save_entries(&path, glob.as_deref())? {
                    println!("== {} ==", entry.path.display());
                    match inspect_save(&read(&entry.path)?, &Lzo, &limits) {
                        Ok(report) => print!("{}", format_inspect_report(&report)),
                        Err(err) => println!("  not a save: {err}"),
                    }
                }
            } else {
                let report = inspect_save(&read(&path)?, &Lzo, &limits)
                    .with_context(|| format!("inspect {}", path.display()))?;
                print!("{}", format_inspect_report(&report));
            }
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => fs::write(path, bytes).with_context(|| format!("write {}", path.display())),
        None => io::stdout()
            .lock()
            .write_all(bytes)
            .context("write stdout"),
    }
}
