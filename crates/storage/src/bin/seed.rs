use std::fmt;

use chrono::{DateTime, Duration, Utc};
use study_core::model::{
    Flashcard, GeneratedContent, Material, MaterialId, Module, ModuleId, QuizQuestion, Summary,
};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    title: String,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTitle,
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTitle => write!(f, "--title cannot be empty"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("STUDY_DB_URL").unwrap_or_else(|_| "sqlite://study.sqlite3".into());
        let mut title = "Cell Biology".to_string();
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--title" => {
                    let value = require_value(&mut args, "--title")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidTitle);
                    }
                    title = value;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, title, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://study.sqlite3)");
    eprintln!("  --title <text>            Module title (default: Cell Biology)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL");
}

fn mitosis_content() -> GeneratedContent {
    GeneratedContent {
        summary: Some(Summary {
            main_points: vec![
                "Mitosis produces two identical daughter cells".into(),
                "Chromosomes are copied before division".into(),
            ],
            topics: vec!["Cell cycle".into(), "Mitosis".into()],
            key_terms: vec!["Chromatid".into(), "Centromere".into(), "Spindle".into()],
        }),
        quiz: vec![
            QuizQuestion::new(
                "Which phase follows prophase?",
                ["Anaphase", "Metaphase", "Telophase", "Interphase"],
                1,
            ),
            QuizQuestion::new(
                "How many daughter cells does mitosis produce?",
                ["One", "Two", "Four", "Eight"],
                1,
            ),
            QuizQuestion::new(
                "Where do sister chromatids join?",
                ["Centromere", "Ribosome", "Nucleolus", "Membrane"],
                0,
            ),
        ],
        flashcards: vec![
            Flashcard::new("Chromatid", "One half of a duplicated chromosome"),
            Flashcard::new("Spindle", "Microtubules that separate chromosomes"),
            Flashcard::new("Interphase", "Growth phase before division"),
        ],
    }
}

fn meiosis_content() -> GeneratedContent {
    GeneratedContent {
        summary: Some(Summary {
            main_points: vec!["Meiosis halves the chromosome number".into()],
            topics: vec!["Meiosis".into()],
            key_terms: vec!["Haploid".into(), "Crossing over".into()],
        }),
        quiz: vec![
            QuizQuestion::new(
                "How many divisions occur in meiosis?",
                ["One", "Two", "Three", "Four"],
                1,
            ),
            QuizQuestion::new(
                "Meiosis produces cells that are:",
                ["Diploid", "Haploid", "Triploid", "Identical"],
                1,
            ),
        ],
        flashcards: vec![
            Flashcard::new("Haploid", "A single set of chromosomes"),
            Flashcard::new("Crossing over", "Exchange of DNA between homologous chromosomes"),
        ],
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let module = Module::new(
        ModuleId::generate(),
        args.title.clone(),
        "Sample module with analysed materials",
        now,
    )?;
    storage.modules.upsert_module(&module).await?;

    let materials = [
        ("Mitosis", mitosis_content()),
        ("Meiosis", meiosis_content()),
    ];
    for (offset, (title, content)) in (0_i64..).zip(materials) {
        let material = Material::new(
            MaterialId::generate(),
            module.id(),
            title,
            "pdf",
            now + Duration::minutes(offset),
        )?
        .with_content(content);
        storage.materials.append_material(&material).await?;
    }

    println!(
        "Seeded module {} ({}) with 2 materials into {}",
        module.title(),
        module.id(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
