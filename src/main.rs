//! `verseflow` - find, check and print Bible references from the command line.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use verseflow::bible::books::CANONICAL_BOOKS;
use verseflow::bible::{
    BookResolver, Extraction, Extractor, ReferenceParser, StandardParser, TranslationLibrary,
    VerseStore,
};
use verseflow::config::Config;
use verseflow::constants::extract::MAX_BOOK_SUGGESTIONS;
use verseflow::services::collection::{proposed_name, validate_lines, Collection, LineStatus};
use verseflow::services::compiler::compile;
use verseflow::services::export::{export_collections, BulletStyle, ExportOptions};

/// Find, check and print Bible references
#[derive(Parser)]
#[command(name = "verseflow")]
#[command(version)]
#[command(after_help = "\
Examples:
  verseflow extract notes.txt
  echo 'Gen 1:1-3, 5; Jn 3:16' | verseflow extract - --json
  verseflow lookup 'Ps 23:1-3' -t KJV
  verseflow export memory.txt -t KJV -t WEB --bullet numbered")]
struct Cli {
    /// Directory of translation files (overrides VERSEFLOW_BIBLE_PATH)
    #[arg(long, global = true)]
    bibles: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every reference from free text
    Extract {
        /// Input text file (use '-' for stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Print the extraction as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a single reference and print its canonical form
    Parse {
        /// Reference text, e.g. "1 Cor 13:4-7"
        reference: String,
    },

    /// Print the verses of a reference
    Lookup {
        /// Reference text
        reference: String,

        /// Translation id (default: VERSEFLOW_TRANSLATION)
        #[arg(short, long)]
        translation: Option<String>,
    },

    /// Check a collection file, one reference per line
    Validate {
        /// Collection text file
        input: PathBuf,
    },

    /// Compile prompts (one per line) into a single text document
    Compile {
        /// Prompt file (use '-' for stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Translation id (default: VERSEFLOW_TRANSLATION)
        #[arg(short, long)]
        translation: Option<String>,
    },

    /// Export collection files with verse text
    Export {
        /// Collection text files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Translation ids; repeat for side-by-side text
        #[arg(short, long = "translation")]
        translations: Vec<String>,

        /// Bullet style: none, square, disc, dash, numbered, alpha_upper, alpha_lower
        #[arg(long, default_value = "none")]
        bullet: BulletStyle,

        /// First entry to export (1-based)
        #[arg(long, default_value_t = 1)]
        start: usize,

        /// Last entry to export (0 = through the end)
        #[arg(long, default_value_t = 0)]
        end: usize,

        /// Separator between reference and text (\n and \t are expanded)
        #[arg(long, default_value = " - ")]
        ref_sep: String,

        /// Separator between entries (\n and \t are expanded, --- becomes em dashes)
        #[arg(long, default_value = "\\n\\n")]
        entry_sep: String,

        /// Write a header line before each collection
        #[arg(long)]
        header: bool,
    },

    /// List the translations found in the bibles directory
    Translations,

    /// List the canonical books with their standard numbers
    Books,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(dir) = cli.bibles {
        config.bible_path = Some(dir);
    }
    let resolver = config.resolver().context("failed to build book resolver")?;

    match cli.command {
        Commands::Extract { input, json } => {
            let text = read_input(&input)?;
            let extraction = Extractor::with_resolver(Arc::clone(&resolver)).extract(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&extraction)?);
            } else {
                print_extraction(&extraction);
            }
        }

        Commands::Parse { reference } => {
            let parser = StandardParser::new(Arc::clone(&resolver));
            let Some(parsed) = parser.parse_reference(&reference) else {
                bail!("'{reference}' is not a reference (expected e.g. 'John 3:16')");
            };
            println!("{parsed}");
            warn_unknown_book(&resolver, &parsed.book);
        }

        Commands::Lookup {
            reference,
            translation,
        } => {
            let parser = StandardParser::new(Arc::clone(&resolver));
            let Some(parsed) = parser.parse_reference(&reference) else {
                bail!("'{reference}' is not a reference (expected e.g. 'John 3:16')");
            };
            let library = open_library(&config, &resolver)?;
            let id = translation_id(translation, &config)?;
            let verses = library.lookup(&parsed, &id)?;
            if verses.is_empty() {
                warn_unknown_book(&resolver, &parsed.book);
                bail!("no verses found for {parsed} in {id}");
            }
            println!("{parsed} ({id})");
            for verse in verses {
                println!("{} {}", verse.verse, verse.text);
            }
        }

        Commands::Validate { input } => {
            let text = read_input(&input)?;
            let parser = StandardParser::new(Arc::clone(&resolver));
            let validation = validate_lines(&text, &parser);
            for line in &validation.lines {
                match &line.status {
                    LineStatus::Empty => {}
                    LineStatus::Valid(r) => println!("{:>4}  ok       {r}", line.line_number),
                    LineStatus::InvalidFormat => {
                        println!("{:>4}  invalid  {}", line.line_number, line.original_text.trim());
                    }
                }
            }
            let name = input
                .file_name()
                .map(|n| proposed_name(&n.to_string_lossy()))
                .unwrap_or_default();
            let problems = validation.problems().count();
            if problems > 0 {
                eprintln!("{name}: {problems} formatting issue(s)");
                return Ok(ExitCode::FAILURE);
            }
            eprintln!("{name}: format looks good");
        }

        Commands::Compile { input, translation } => {
            let prompts = read_input(&input)?;
            let library = open_library(&config, &resolver)?;
            let id = translation_id(translation, &config)?;
            let extractor = Extractor::with_resolver(Arc::clone(&resolver));
            let compilation = compile(&prompts, &library, &id, &extractor)?;
            println!("{}", compilation.output());
            eprintln!("{}", compilation.summary());
        }

        Commands::Export {
            inputs,
            translations,
            bullet,
            start,
            end,
            ref_sep,
            entry_sep,
            header,
        } => {
            let parser = StandardParser::new(Arc::clone(&resolver));
            let collections = inputs
                .iter()
                .map(|path| {
                    let text = read_input(path)?;
                    let name = path
                        .file_name()
                        .map(|n| proposed_name(&n.to_string_lossy()))
                        .unwrap_or_default();
                    Ok(Collection::from_text(name, &text, &parser))
                })
                .collect::<Result<Vec<_>>>()?;

            let ids = if translations.is_empty() {
                vec![translation_id(None, &config)?]
            } else {
                translations
            };
            let options = ExportOptions {
                start_entry: start,
                end_entry: end,
                bullet,
                ref_text_separator: ExportOptions::unescape(&ref_sep),
                entry_separator: ExportOptions::unescape(&entry_sep),
                per_collection_header: header,
            };
            let library = open_library(&config, &resolver)?;
            println!("{}", export_collections(&collections, &library, &ids, &options)?);
        }

        Commands::Translations => {
            let library = open_library(&config, &resolver)?;
            let infos = library.translations();
            if infos.is_empty() {
                eprintln!("No translations found in {}", library.data_path().display());
            }
            for info in infos {
                println!("{:<16} {} ({} verses)", info.id, info.name, info.verse_count);
            }
        }

        Commands::Books => {
            for (i, book) in CANONICAL_BOOKS.iter().enumerate() {
                println!("{:>2}  {book}", i + 1);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read from stdin")?;
        Ok(buf)
    } else {
        fs_err::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn open_library(config: &Config, resolver: &Arc<BookResolver>) -> Result<TranslationLibrary> {
    let Some(path) = &config.bible_path else {
        bail!("no translations directory configured; set VERSEFLOW_BIBLE_PATH or pass --bibles");
    };
    Ok(TranslationLibrary::new(path.clone(), Arc::clone(resolver)))
}

fn translation_id(requested: Option<String>, config: &Config) -> Result<String> {
    requested
        .or_else(|| config.default_translation.clone())
        .context("no translation selected; pass -t or set VERSEFLOW_TRANSLATION")
}

fn print_extraction(extraction: &Extraction) {
    for reference in &extraction.references {
        println!("{}", reference.reference_string);
    }
    if !extraction.chapters.is_empty() {
        println!("\nChapters:");
        for chapter in &extraction.chapters {
            println!("  {chapter}");
        }
    }
    if !extraction.unparsed.is_empty() {
        println!("\nUnparsed:");
        for fragment in &extraction.unparsed {
            println!("  {fragment}");
        }
    }
}

fn warn_unknown_book(resolver: &BookResolver, book: &str) {
    if resolver.is_known(book) {
        return;
    }
    let suggestions = resolver.suggest(book, MAX_BOOK_SUGGESTIONS);
    if suggestions.is_empty() {
        eprintln!("warning: unknown book '{book}'");
    } else {
        eprintln!(
            "warning: unknown book '{book}'; did you mean {}?",
            suggestions.join(", ")
        );
    }
}
