use std::fmt;
use std::str::FromStr;

use services::GenerationAmount;
use study_core::model::{QuizType, SubjectId};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidSubjectId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidAmount { raw: String },
    InvalidQuizType { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidSubjectId { raw } => write!(f, "invalid --subject value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidAmount { raw } => {
                write!(f, "invalid --amount value: {raw} (few, normal, a-lot)")
            }
            ArgsError::InvalidQuizType { raw } => {
                write!(f, "invalid --type value: {raw} (mc, tf, fib)")
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

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app status   [--db <sqlite_url>] [--user <id>]");
    eprintln!("  app review   --subject <id> [--db <sqlite_url>] [--user <id>]");
    eprintln!("  app quiz     --subject <id> --type <mc|tf|fib> [--db ..] [--user ..]");
    eprintln!(
        "  app generate --subject <id> [--amount <few|normal|a-lot>] [--focus <text>] [--db ..] [--user ..]"
    );
    eprintln!("  app seed     [--db <sqlite_url>] [--user <id>]");
    eprintln!("  app reset    [--db <sqlite_url>] [--user <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://study.sqlite3");
    eprintln!("  --user local");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_USER_ID, STUDY_LOG_FORMAT (pretty|json), RUST_LOG");
    eprintln!("  STUDY_AI_API_KEY, STUDY_AI_BASE_URL, STUDY_AI_MODEL");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Review {
        subject: SubjectId,
    },
    Quiz {
        subject: SubjectId,
        quiz_type: QuizType,
    },
    Generate {
        subject: SubjectId,
        amount: GenerationAmount,
        focus: String,
    },
    Seed,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub user_id: String,
    pub command: Command,
}

/// Flags shared by every subcommand, plus the per-command ones collected
/// before the command is built.
#[derive(Default)]
struct RawFlags {
    db_url: Option<String>,
    user_id: Option<String>,
    subject: Option<SubjectId>,
    quiz_type: Option<QuizType>,
    amount: Option<GenerationAmount>,
    focus: Option<String>,
}

impl Args {
    /// Parse the arguments after the program name. `Ok(None)` means help was
    /// requested.
    pub fn parse(
        mut args: impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let name = match args.next() {
            None => "status".to_string(),
            Some(first) if first == "--help" || first == "-h" => return Ok(None),
            Some(first) => first,
        };

        let mut flags = RawFlags::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    flags.db_url = Some(value);
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidUserId { raw: value });
                    }
                    flags.user_id = Some(value.trim().to_string());
                }
                "--subject" => {
                    let value = require_value(&mut args, "--subject")?;
                    let id = SubjectId::from_str(value.trim())
                        .map_err(|_| ArgsError::InvalidSubjectId { raw: value.clone() })?;
                    flags.subject = Some(id);
                }
                "--type" => {
                    let value = require_value(&mut args, "--type")?;
                    flags.quiz_type = Some(parse_quiz_type(&value)?);
                }
                "--amount" => {
                    let value = require_value(&mut args, "--amount")?;
                    flags.amount = Some(parse_amount(&value)?);
                }
                "--focus" => {
                    flags.focus = Some(require_value(&mut args, "--focus")?);
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let subject = |flags: &RawFlags| {
            flags
                .subject
                .ok_or(ArgsError::MissingFlag { flag: "--subject" })
        };
        let command = match name.as_str() {
            "status" => Command::Status,
            "review" => Command::Review {
                subject: subject(&flags)?,
            },
            "quiz" => Command::Quiz {
                subject: subject(&flags)?,
                quiz_type: flags
                    .quiz_type
                    .ok_or(ArgsError::MissingFlag { flag: "--type" })?,
            },
            "generate" => Command::Generate {
                subject: subject(&flags)?,
                amount: flags.amount.unwrap_or_default(),
                focus: flags.focus.clone().unwrap_or_default(),
            },
            "seed" => Command::Seed,
            "reset" => Command::Reset,
            other => return Err(ArgsError::UnknownCommand(other.to_string())),
        };

        let db_url = flags
            .db_url
            .or_else(|| env("STUDY_DB_URL").filter(|v| !v.trim().is_empty()))
            .map_or_else(
                || normalize_sqlite_url("sqlite://study.sqlite3".into()),
                normalize_sqlite_url,
            );
        let user_id = flags
            .user_id
            .or_else(|| {
                env("STUDY_USER_ID")
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .unwrap_or_else(|| "local".to_string());

        Ok(Some(Self {
            db_url,
            user_id,
            command,
        }))
    }
}

fn parse_quiz_type(raw: &str) -> Result<QuizType, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mc" | "multiple_choice" => Ok(QuizType::MultipleChoice),
        "tf" | "true_false" => Ok(QuizType::TrueFalse),
        "fib" | "fill_in_the_blank" => Ok(QuizType::FillInTheBlank),
        _ => Err(ArgsError::InvalidQuizType {
            raw: raw.to_string(),
        }),
    }
}

fn parse_amount(raw: &str) -> Result<GenerationAmount, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "few" => Ok(GenerationAmount::Few),
        "normal" => Ok(GenerationAmount::Normal),
        "a-lot" | "alot" => Ok(GenerationAmount::ALot),
        _ => Err(ArgsError::InvalidAmount {
            raw: raw.to_string(),
        }),
    }
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory if missing.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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
