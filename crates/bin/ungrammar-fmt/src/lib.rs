mod format;

use std::sync::LazyLock;
use std::sync::Mutex;
pub struct GlobalConfig {
    pub indent_size: usize,
    pub width: usize,
}
impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            indent_size: 2,
            width: 80,
        }
    }
}
pub static GLOBAL_DATA: LazyLock<Mutex<GlobalConfig>> =
    LazyLock::new(|| Mutex::new(GlobalConfig::default()));

pub use format::{FormatOptions, format, format_document, pretty_print};

use clap::Parser;
use ungrammar_lang::diagnostics::{reportable, validate};
use ungrammar_lang::log;
use ungrammar_lang::text_document::TextDocument;
use ungrammar_lang::utils::error::report;
use ungrammar_lang::UngramDocument;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// File to format(if not specified, reads from stdin)
    #[clap(value_parser)]
    file: Option<PathBuf>,
    /// Width of the editor
    #[arg(long, default_value = "80")]
    width: usize,
    /// Indentation size
    #[arg(long, default_value = "2")]
    indent_size: usize,
    /// Report problems and unformatted input instead of printing
    #[arg(long)]
    check: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to read from stdin: {0}")]
    Stdin(std::io::Error),
    #[error("{0} problem(s) found in {1}")]
    Problems(usize, String),
    #[error("{0} is not formatted")]
    NotFormatted(String),
}

fn read_input(file_path: Option<&PathBuf>) -> Result<String, FormatError> {
    match file_path {
        Some(path) => fs::read_to_string(path).map_err(|source| FormatError::Read {
            path: path.clone(),
            source,
        }),
        None => {
            let mut buf = String::new();
            eprintln!("No file specified. Reading from stdin...");
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(FormatError::Stdin)?;
            Ok(buf)
        }
    }
}

/// Report every problem of `code`, returning how many there were
fn check_problems(code: &str, path: PathBuf) -> usize {
    let document = TextDocument::new(path.to_string_lossy(), 0, code);
    let ungram = UngramDocument::parse(code);
    let diagnostics = validate(&document, &ungram);
    let count = diagnostics.len();
    if count > 0 {
        report(code, path, &reportable(diagnostics));
    }
    count
}

pub fn lib_main() -> Result<(), FormatError> {
    let args = Args::parse();

    if let Ok(mut gdata) = GLOBAL_DATA.try_lock() {
        gdata.indent_size = args.indent_size;
        gdata.width = args.width;
    }

    let file_path = args.file;
    let code = read_input(file_path.as_ref())?;
    let display_name = file_path
        .as_ref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());

    if args.check {
        let count = check_problems(code.as_str(), file_path.clone().unwrap_or_default());
        if count > 0 {
            return Err(FormatError::Problems(count, display_name));
        }
    }

    match pretty_print(code.as_str(), args.width) {
        Ok(rendered) if args.check => {
            if rendered == code {
                log::info!("{display_name} is formatted");
                Ok(())
            } else {
                Err(FormatError::NotFormatted(display_name))
            }
        }
        Ok(rendered) => {
            print!("{rendered}");
            Ok(())
        }
        Err(errs) => {
            report(code.as_str(), file_path.unwrap_or_default(), &errs);
            Err(FormatError::Problems(errs.len(), display_name))
        }
    }
}
