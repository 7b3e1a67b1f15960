use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use services::{AnalysisConfig, AppServices, Clock, UploadConfig};
use study_core::model::{MaterialId, ModuleId, ParseIdError};
use study_core::session::QuizScope;
use study_core::{Notification, NotificationSink};
use tracing_subscriber::EnvFilter;

mod console;
mod interactive;
mod summary;

use console::ConsoleSink;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidId(ParseIdError),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, name } => {
                write!(f, "{command} requires <{name}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidId(err) => write!(f, "{err}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Marks a failure that has already been shown to the user.
#[derive(Debug)]
struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation failed")
    }
}

impl std::error::Error for Reported {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  modules                                   List modules");
    eprintln!("  create-module <title> [--description <text>]");
    eprintln!("  upload <module_id> <file>                 Store a document as a new material");
    eprintln!("  analyze <material_id>                     Generate summary, quiz and flashcards");
    eprintln!("  quiz <module_id> [--material <id>]        Quiz over a module or one material");
    eprintln!("  cards <material_id>                       Study a material's flashcards");
    eprintln!("  summary <material_id>                     Show a material's summary");
    eprintln!("  module-summary <module_id>                Show every material summary of a module");
    eprintln!("  delete-module <module_id>");
    eprintln!("  delete-material <material_id>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://study.sqlite3)");
    eprintln!("  --uploads <dir>           Upload directory (default: uploads)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_UPLOAD_DIR, STUDY_PUBLIC_BASE_URL, STUDY_ANALYSIS_URL, STUDY_LOG");
    eprintln!();
    eprintln!("Demo data: cargo run -p storage --bin seed");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Modules,
    CreateModule { title: String, description: String },
    Upload { module_id: ModuleId, file: PathBuf },
    Analyze { material_id: MaterialId },
    Quiz { module_id: ModuleId, material: Option<MaterialId> },
    Cards { material_id: MaterialId },
    Summary { material_id: MaterialId },
    ModuleSummary { module_id: ModuleId },
    DeleteModule { module_id: ModuleId },
    DeleteMaterial { material_id: MaterialId },
}

#[derive(Debug)]
struct Args {
    db_url: String,
    uploads: Option<PathBuf>,
    command: Command,
}

fn parse_id<T>(raw: &str) -> Result<T, ArgsError>
where
    T: std::str::FromStr<Err = ParseIdError>,
{
    raw.parse().map_err(ArgsError::InvalidId)
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("STUDY_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://study.sqlite3".into(), normalize_sqlite_url);
        let mut uploads = None;
        let mut description = String::new();
        let mut material = None;
        let mut name = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--uploads" => uploads = Some(PathBuf::from(require_value(&mut args, "--uploads")?)),
                "--description" => description = require_value(&mut args, "--description")?,
                "--material" => {
                    material = Some(parse_id(&require_value(&mut args, "--material")?)?);
                }
                "--help" | "-h" => return Ok(None),
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if name.is_none() => name = Some(arg),
                _ => positional.push(arg),
            }
        }

        let Some(name) = name else {
            return Ok(None);
        };
        let mut positional = positional.into_iter();
        let mut take = |command: &'static str, what: &'static str| {
            positional
                .next()
                .ok_or(ArgsError::MissingArgument { command, name: what })
        };

        let command = match name.as_str() {
            "modules" => Command::Modules,
            "create-module" => Command::CreateModule {
                title: take("create-module", "title")?,
                description,
            },
            "upload" => Command::Upload {
                module_id: parse_id(&take("upload", "module_id")?)?,
                file: PathBuf::from(take("upload", "file")?),
            },
            "analyze" => Command::Analyze {
                material_id: parse_id(&take("analyze", "material_id")?)?,
            },
            "quiz" => Command::Quiz {
                module_id: parse_id(&take("quiz", "module_id")?)?,
                material,
            },
            "cards" => Command::Cards {
                material_id: parse_id(&take("cards", "material_id")?)?,
            },
            "summary" => Command::Summary {
                material_id: parse_id(&take("summary", "material_id")?)?,
            },
            "module-summary" => Command::ModuleSummary {
                module_id: parse_id(&take("module-summary", "module_id")?)?,
            },
            "delete-module" => Command::DeleteModule {
                module_id: parse_id(&take("delete-module", "module_id")?)?,
            },
            "delete-material" => Command::DeleteMaterial {
                material_id: parse_id(&take("delete-material", "material_id")?)?,
            },
            _ => return Err(ArgsError::UnknownCommand(name)),
        };
        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self {
            db_url,
            uploads,
            command,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("STUDY_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

/// Sends the outcome of a collaborator call to the sink.
fn report<T, E: fmt::Display>(
    sink: &dyn NotificationSink,
    action: &'static str,
    result: Result<T, E>,
) -> Result<T, Reported> {
    match result {
        Ok(value) => {
            sink.notify(Notification::Succeeded { action });
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(action, %err, "operation failed");
            sink.notify(Notification::Failed {
                action,
                reason: err.to_string(),
            });
            Err(Reported)
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_tracing();
    prepare_sqlite_file(&args.db_url)?;

    let sink: Arc<dyn NotificationSink> = Arc::new(ConsoleSink);
    let mut uploads = UploadConfig::from_env();
    if let Some(root) = args.uploads {
        uploads.root = root;
    }
    let services = AppServices::new_sqlite(
        &args.db_url,
        Clock::default(),
        uploads,
        AnalysisConfig::from_env(),
        Arc::clone(&sink),
    )
    .await?;

    match args.command {
        Command::Modules => {
            let modules = services.modules().list_modules().await?;
            if modules.is_empty() {
                println!("No modules yet. Create one with `create-module <title>`.");
            }
            for module in modules {
                println!(
                    "{}  {}  ({} materials, {} questions, {} flashcards)",
                    module.id(),
                    module.title(),
                    module.materials().len(),
                    module.question_count(),
                    module.flashcard_count()
                );
                for material in module.materials() {
                    let status = if material.has_content() { "analyzed" } else { "not analyzed" };
                    println!(
                        "    {}  {} [{}] {}",
                        material.id(),
                        material.title(),
                        material.kind(),
                        status
                    );
                }
            }
        }
        Command::CreateModule { title, description } => {
            let module = report(
                sink.as_ref(),
                "create module",
                services.modules().create_module(&title, &description).await,
            )?;
            println!("{}", module.id());
        }
        Command::Upload { module_id, file } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let bytes = tokio::fs::read(&file).await?;
            let material = report(
                sink.as_ref(),
                "upload",
                services.materials().upload(module_id, &file_name, &bytes).await,
            )?;
            println!("{}", material.id());
        }
        Command::Analyze { material_id } => {
            let content = report(
                sink.as_ref(),
                "analyze",
                services.analysis().analyze(material_id).await,
            )?;
            println!(
                "{} questions, {} flashcards",
                content.quiz.len(),
                content.flashcards.len()
            );
        }
        Command::Quiz {
            module_id,
            material,
        } => {
            let mut ws = services.study().open(module_id).await?;
            let scope = material.map_or(QuizScope::Module(module_id), QuizScope::Material);
            let stdin = std::io::stdin();
            interactive::run_quiz(&mut ws, scope, stdin.lock(), &mut std::io::stdout())?;
        }
        Command::Cards { material_id } => {
            let material = services
                .materials()
                .get_material(material_id)
                .await?
                .ok_or(services::StudyError::MaterialNotFound(material_id))?;
            let mut ws = services.study().open(material.module_id()).await?;
            let stdin = std::io::stdin();
            interactive::run_flashcards(&mut ws, material_id, stdin.lock(), &mut std::io::stdout())?;
        }
        Command::Summary { material_id } => {
            let material = services
                .materials()
                .get_material(material_id)
                .await?
                .ok_or(services::StudyError::MaterialNotFound(material_id))?;
            println!("{}", summary::material_summary(&material));
        }
        Command::ModuleSummary { module_id } => {
            let module = services
                .modules()
                .get_module(module_id)
                .await?
                .ok_or(services::StudyError::ModuleNotFound(module_id))?;
            println!("{}", summary::module_summary(&module));
        }
        Command::DeleteModule { module_id } => {
            report(
                sink.as_ref(),
                "delete module",
                services.modules().delete_module(module_id).await,
            )?;
        }
        Command::DeleteMaterial { material_id } => {
            report(
                sink.as_ref(),
                "delete material",
                services.materials().delete_material(material_id).await,
            )?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        if !err.is::<Reported>() {
            eprintln!("{err}");
        }
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(ToString::to_string))
    }

    #[test]
    fn quiz_accepts_material_flag_anywhere() {
        let module_id = ModuleId::generate();
        let material_id = MaterialId::generate();
        let args = parse(&[
            "--material",
            &material_id.to_string(),
            "quiz",
            &module_id.to_string(),
            "--db",
            "sqlite://x.sqlite3",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(args.db_url, "sqlite://x.sqlite3");
        assert_eq!(
            args.command,
            Command::Quiz {
                module_id,
                material: Some(material_id)
            }
        );
    }

    #[test]
    fn missing_and_malformed_arguments_are_reported() {
        assert!(matches!(
            parse(&["upload", &ModuleId::generate().to_string()]),
            Err(ArgsError::MissingArgument { name: "file", .. })
        ));
        assert!(matches!(
            parse(&["cards", "not-a-uuid"]),
            Err(ArgsError::InvalidId(_))
        ));
        assert!(matches!(parse(&["frobnicate"]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&[]), Ok(None)));
    }

    #[test]
    fn summary_commands_take_one_id() {
        let material_id = MaterialId::generate();
        let module_id = ModuleId::generate();
        assert_eq!(
            parse(&["summary", &material_id.to_string()]).unwrap().unwrap().command,
            Command::Summary { material_id }
        );
        assert_eq!(
            parse(&["module-summary", &module_id.to_string()])
                .unwrap()
                .unwrap()
                .command,
            Command::ModuleSummary { module_id }
        );
        assert!(matches!(
            parse(&["module-summary"]),
            Err(ArgsError::MissingArgument {
                command: "module-summary",
                ..
            })
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/study.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/study.sqlite3"));
    }

    #[test]
    fn report_forwards_outcomes_to_sink() {
        let sink = study_core::RecordingSink::new();
        assert_eq!(report::<_, String>(&sink, "upload", Ok(3)).unwrap(), 3);
        assert!(report::<(), _>(&sink, "analyze", Err("timeout")).is_err());
        assert_eq!(
            sink.received(),
            vec![
                Notification::Succeeded { action: "upload" },
                Notification::Failed {
                    action: "analyze",
                    reason: "timeout".into()
                },
            ]
        );
    }
}
