//! Gridcalc - grid calculator driven from the command line

mod config;
mod logger;

use anyhow::{Context, bail};
use gridcalc_core::{CellRef, DisplayMode, Sheet};
use std::env;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: gridcalc [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Sheet to open (.grd, .xlcx or .csv)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <EXPR>      Evaluate an expression and print the result");
    eprintln!("  --cell <NAME>             Print the computed value of one cell");
    eprintln!("  -e, --expressions         Print stored text instead of values");
    eprintln!("  -o, --output <FILE>       Save to FILE (.grd, .xlcx, .csv) or export (.md)");
    eprintln!("  --rows <N>                Rows of a new sheet");
    eprintln!("  --cols <N>                Columns of a new sheet");
    eprintln!("  --config <PATH>           Read settings from PATH");
    eprintln!("  -v                        More log output (can be repeated)");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Formulas start with '=' and may use:");
    eprintln!("  + - * /                   Arithmetic");
    eprintln!("  mod  div                  Remainder and truncating integer division");
    eprintln!("  = <> < > <= >=            Comparisons (1 when true, 0 when false)");
    eprintln!("  inc(x)  dec(x)            Add or subtract one");
    eprintln!("  A1, b2, AA10              Cell references");
}

#[derive(Debug, Default)]
struct CliArgs {
    file_path: Option<PathBuf>,
    command: Option<String>,
    cell: Option<String>,
    expressions: bool,
    output_file: Option<PathBuf>,
    rows: Option<usize>,
    cols: Option<usize>,
    config_file: Option<PathBuf>,
    verbosity: u8,
}

/// Parse arguments; `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> anyhow::Result<Option<CliArgs>> {
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = |what: &str| -> anyhow::Result<String> {
            i += 1;
            match args.get(i) {
                Some(v) => Ok(v.clone()),
                None => bail!("{} requires {}", arg, what),
            }
        };
        match arg {
            "-h" | "--help" => return Ok(None),
            "-c" | "--command" => cli.command = Some(value("an expression")?),
            "--cell" => cli.cell = Some(value("a cell name")?),
            "-e" | "--expressions" => cli.expressions = true,
            "-o" | "--output" => cli.output_file = Some(PathBuf::from(value("a file path")?)),
            "--rows" => cli.rows = Some(parse_count(arg, &value("a number")?)?),
            "--cols" => cli.cols = Some(parse_count(arg, &value("a number")?)?),
            "--config" => cli.config_file = Some(PathBuf::from(value("a file path")?)),
            "-v" | "--verbose" => cli.verbosity = cli.verbosity.saturating_add(1),
            flags if flags.len() > 2 && flags.starts_with("-v") && flags[1..].chars().all(|c| c == 'v') => {
                cli.verbosity = cli.verbosity.saturating_add((flags.len() - 1) as u8);
            }
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            other => {
                if cli.file_path.is_some() {
                    bail!("Unexpected argument: {}", other);
                }
                cli.file_path = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }

    Ok(Some(cli))
}

fn parse_count(flag: &str, text: &str) -> anyhow::Result<usize> {
    text.parse::<usize>()
        .with_context(|| format!("{} expects a non-negative number, got '{}'", flag, text))
}

/// Render the whole grid as a text table with aligned columns.
fn render_table(sheet: &Sheet, mode: DisplayMode) -> String {
    let row_label_width = sheet.rows.to_string().len();
    let columns: Vec<Vec<String>> = (0..sheet.cols)
        .map(|col| {
            let mut column = vec![CellRef::col_to_letters(col)];
            column.extend((0..sheet.rows).map(|row| {
                sheet
                    .cell_display(&CellRef::new(col, row), mode)
                    .replace(['\n', '\r'], " ")
            }));
            column
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .map(|column| column.iter().map(|s| s.chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for line in 0..=sheet.rows {
        let label = if line == 0 { String::new() } else { line.to_string() };
        let mut cells = vec![format!("{:>width$}", label, width = row_label_width)];
        for (column, width) in columns.iter().zip(&widths) {
            cells.push(format!("{:<width$}", column[line], width = *width));
        }
        out.push_str(cells.join(" | ").trim_end());
        out.push('\n');
    }
    out
}

fn run(cli: CliArgs) -> anyhow::Result<()> {
    let (config, warnings) = config::load_config(cli.config_file.as_deref());
    let level = if cli.verbosity > 0 {
        logger::level_from_verbosity(cli.verbosity)
    } else {
        config
            .log_level()
            .unwrap_or_else(|| logger::level_from_verbosity(0))
    };
    logger::init(level);
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut options = config.sheet_options();
    if let Some(rows) = cli.rows {
        options.rows = rows;
    }
    if let Some(cols) = cli.cols {
        options.cols = cols;
    }

    let mut sheet = Sheet::with_file(cli.file_path.clone(), options).with_context(|| {
        format!(
            "failed to open {}",
            cli.file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;

    let mode = if cli.expressions {
        DisplayMode::Expressions
    } else {
        DisplayMode::Values
    };
    let mut printed = false;

    if let Some(expr) = cli.command.as_deref() {
        let value = sheet.evaluate(expr)?;
        println!("{}", sheet.format_value(&value));
        printed = true;
    }

    if let Some(name) = cli.cell.as_deref() {
        let value = sheet.resolve(name)?;
        println!("{}", sheet.format_value(&value));
        printed = true;
    }

    if let Some(output_path) = cli.output_file.as_deref() {
        sheet.save_as(output_path)?;
        eprintln!("Wrote {}", output_path.display());
        printed = true;
    }

    if !printed {
        print!("{}", render_table(&sheet, mode));
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let cli = match parse_args(&args) {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
