use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use serde_json::json;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use pidigits::cli::{Cli, Command, OutputFormat};
use pidigits::codec::{self, PAD_NIBBLE};
use pidigits::config::Config;
use pidigits::{DigitStore, SearchQuery};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(file) = cli.file {
        config.file_path = file;
    }
    if cli.digit_count.is_some() {
        config.digit_count = cli.digit_count;
    }
    config.validate().context("Invalid configuration")?;

    info!("pidigits starting");

    let format = cli.format;
    match cli.command {
        Command::Pack { input, output } => cmd_pack(&input, &output, format),
        command => {
            let store = DigitStore::open(&config.file_path, config.store_options())
                .context(format!("Failed to open digit store at {}", config.file_path.display()))?;
            run(&store, &config, command, format)
        }
    }
}

fn run(store: &DigitStore, config: &Config, command: Command, format: OutputFormat) -> Result<()> {
    match command {
        Command::Digit { position } => {
            let digit = store.get_digit(position)?;
            match format {
                OutputFormat::Text => println!("{}", digit),
                OutputFormat::Json => print_json(&json!({ "position": position, "digit": digit }))?,
            }
        }
        Command::Range { start, count } => {
            let digits = codec::digits_to_string(&store.get_range(start, count)?);
            match format {
                OutputFormat::Text => println!("{}", digits),
                OutputFormat::Json => print_json(&json!({ "start": start, "count": count, "digits": digits }))?,
            }
        }
        Command::Search {
            pattern,
            start,
            max_matches,
            no_context,
        } => {
            let mut query = SearchQuery::new(&pattern)?.start_at(start);
            if let Some(max) = max_matches {
                query = query.with_max_matches(max);
            }

            let started = Instant::now();
            let result = store.search(&query)?;
            let elapsed = started.elapsed().as_secs_f64();

            let context = match result.first() {
                Some(position) if !no_context => {
                    Some(store.window(position, pattern.len() as u64, config.context_radius)?)
                }
                _ => None,
            };

            match format {
                OutputFormat::Json => print_json(&json!({
                    "found": result.found,
                    "positions": result.positions,
                    "pattern": pattern,
                    "start_position": start,
                    "search_time_seconds": elapsed,
                    "context": context,
                }))?,
                OutputFormat::Text if result.found => {
                    let positions: Vec<String> = result.positions.iter().map(|p| p.to_string()).collect();
                    println!("{} Found {} at: {}", "✓".green(), pattern.cyan(), positions.join(", "));
                    if let Some(window) = context {
                        let at = window.pattern_index as usize;
                        let end = at + window.pattern_length as usize;
                        println!(
                            "  {} {}{}{}",
                            format!("[{}]", window.start).dimmed(),
                            window.digits[..at].dimmed(),
                            window.digits[at..end].yellow().bold(),
                            window.digits[end..].dimmed()
                        );
                    }
                    println!("  Search time: {:.3}s", elapsed);
                }
                OutputFormat::Text => {
                    println!("{} {} not found from position {}", "✗".red(), pattern.cyan(), start);
                    println!("  Search time: {:.3}s", elapsed);
                }
            }
        }
        Command::Info => {
            let info = store.info();
            match format {
                OutputFormat::Text => {
                    println!("Store: {}", store.path().display().to_string().cyan());
                    println!("  Digits: {}", info.total_digit_count);
                    println!("  Bytes: {}", info.byte_length);
                    if info.valid {
                        println!("  Valid: {}", "yes".green());
                    } else {
                        let at = info.first_invalid_position.map(|p| p.to_string()).unwrap_or_default();
                        println!("  Valid: {} (first invalid digit at {})", "no".red(), at);
                    }
                    println!("  Ready: {}", store.is_ready());
                }
                OutputFormat::Json => {
                    let mut value = serde_json::to_value(info)?;
                    value["ready"] = json!(store.is_ready());
                    print_json(&value)?;
                }
            }
        }
        Command::Extract { start, count, output } => {
            let count = count.unwrap_or_else(|| store.total_digits().saturating_sub(start));
            match output {
                Some(path) => {
                    let file = File::create(&path).context(format!("Failed to create {}", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    let written = store.write_text(&mut writer, start, count)?;
                    writer.flush()?;
                    println!("{} Wrote {} digits to {}", "✓".green(), written, path.display());
                }
                None => {
                    let mut writer = BufWriter::new(io::stdout().lock());
                    store.write_text(&mut writer, start, count)?;
                    writeln!(writer)?;
                    writer.flush()?;
                }
            }
        }
        Command::Pack { input, output } => cmd_pack(&input, &output, format)?,
    }

    Ok(())
}

/// Pack ASCII digits from `input` into `output`, skipping whitespace and a decimal point
fn cmd_pack(input: &Path, output: &Path, format: OutputFormat) -> Result<()> {
    let reader = BufReader::new(File::open(input).context(format!("Failed to open {}", input.display()))?);
    let mut writer = BufWriter::new(File::create(output).context(format!("Failed to create {}", output.display()))?);

    let mut count = 0u64;
    let mut pending: Option<u8> = None;
    for byte in reader.bytes() {
        let byte = byte?;
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'.' => continue,
            b if b.is_ascii_whitespace() => continue,
            b => {
                drop(writer);
                fs::remove_file(output).ok();
                return Err(eyre::eyre!("Unexpected character {:?} after {} digits", char::from(b), count));
            }
        };
        count += 1;
        match pending.take() {
            Some(high) => writer.write_all(&[codec::encode(high, digit)?])?,
            None => pending = Some(digit),
        }
    }
    if let Some(high) = pending {
        writer.write_all(&[(high << 4) | PAD_NIBBLE])?;
    }
    writer.flush()?;

    if count == 0 {
        fs::remove_file(output).ok();
        return Err(eyre::eyre!("No digits found in {}", input.display()));
    }

    let bytes = count.div_ceil(2);
    match format {
        OutputFormat::Text => {
            println!("{} Packed {} digits into {} bytes: {}", "✓".green(), count, bytes, output.display());
            if count % 2 == 1 {
                println!("  Odd digit count, open with: --digit-count {}", count);
            }
        }
        OutputFormat::Json => print_json(&json!({ "digit_count": count, "byte_length": bytes, "output": output }))?,
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
