use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use log::{Level, Metadata, Record};
use notes_pdf::layout::FontMeasurer;
use notes_pdf::{
    Book, DiskImageSource, Font, FontSet, Labels, LayoutConfig, MutedSwatchResolver,
    PaginationEngine,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "notes-pdf",
    about = "Lay out a book's reading notes as a PDF",
    version
)]
struct Cli {
    /// Book JSON file: metadata, cover path and notes
    #[arg(short, long)]
    book: PathBuf,

    /// TrueType or OpenType font used for body text
    #[arg(short, long)]
    font: PathBuf,

    /// Font used for ideas (defaults to the body font)
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Font used for the book title (defaults to the body font)
    #[arg(long)]
    title_font: Option<PathBuf>,

    /// Directory image paths are resolved against (defaults to the book's directory)
    #[arg(short, long)]
    images: Option<PathBuf>,

    /// Layout configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Field labels, overriding the ones in the configuration
    #[arg(long, value_enum)]
    labels: Option<LabelsArg>,

    /// Output PDF file (defaults to 《book name》.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log page breaks and image placement
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum LabelsArg {
    En,
    Zh,
}

impl From<LabelsArg> for Labels {
    fn from(arg: LabelsArg) -> Labels {
        match arg {
            LabelsArg::En => Labels::english(),
            LabelsArg::Zh => Labels::chinese(),
        }
    }
}

/// Writes timestamped log lines to stderr
struct StderrLogger {
    level: Level,
}

impl StderrLogger {
    fn init(level: Level) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(StderrLogger { level }))?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} {:<5} {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

fn load_font(path: &Path) -> Result<Font> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    Font::load(bytes).with_context(|| format!("parsing font {}", path.display()))
}

fn load_fonts(cli: &Cli) -> Result<FontSet> {
    let mut fonts = FontSet::new(load_font(&cli.font)?);
    if let Some(path) = &cli.bold_font {
        fonts = fonts.with_bold(load_font(path)?);
    }
    if let Some(path) = &cli.title_font {
        fonts = fonts.with_title(load_font(path)?);
    }
    Ok(fonts)
}

fn run(cli: Cli) -> Result<PathBuf> {
    let book = Book::load(&cli.book)
        .with_context(|| format!("reading book {}", cli.book.display()))?;

    let mut config = match &cli.config {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("reading layout configuration {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    if let Some(labels) = cli.labels {
        config.labels = labels.into();
    }

    let fonts = load_fonts(&cli)?;
    let images_root = match &cli.images {
        Some(root) => root.clone(),
        None => cli
            .book
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(book.default_file_name()));

    let measurer = FontMeasurer::new(fonts.clone());
    let images = DiskImageSource::new(images_root);
    let colours = MutedSwatchResolver::default();
    let engine = PaginationEngine::new(&config, &measurer, &images, &colours);

    let file = File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    engine
        .export(&book, fonts, &mut writer)
        .with_context(|| format!("exporting notes from {}", cli.book.display()))?;
    writer
        .flush()
        .with_context(|| format!("writing {}", output.display()))?;

    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::Debug } else { Level::Info };
    if let Err(e) = StderrLogger::init(level) {
        eprintln!("failed to set up logging: {e}");
    }

    match run(cli) {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
