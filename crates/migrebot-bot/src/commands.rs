//! Slash-command parsing.

use std::str::FromStr;

use migrebot_core::models::{SCORE_MAX, SCORE_MIN};
use migrebot_core::{ExportFormat, MedicationType, PainLevel, ValidationError};
use thiserror::Error;

/// Command parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("not a command")]
    NotACommand,

    #[error("unknown command /{0}")]
    Unknown(String),

    #[error("/{command} is missing arguments")]
    MissingArgument { command: &'static str },

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub type CommandResult<T> = Result<T, CommandError>;

/// A parsed user command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    /// Summary of today's entry
    Headache,
    /// Create today's entry
    Entry,
    /// Today's entry with medications and symptoms
    Today,
    Edit,
    SetPain(PainLevel),
    SetScore(i32),
    SetPainDescription(String),
    SetNotes(String),
    SetAttack,
    AddMedication {
        medication_type: MedicationType,
        name: String,
        dosage: Option<String>,
    },
    AddSymptom {
        name: String,
        severity: Option<i32>,
    },
    Recent,
    Export(ExportFormat),
}

impl Command {
    /// Command name without the leading slash.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Headache => "headache",
            Command::Entry => "entry",
            Command::Today => "today",
            Command::Edit => "edit",
            Command::SetPain(_) => "set_pain",
            Command::SetScore(_) => "set_score",
            Command::SetPainDescription(_) => "set_pain_desc",
            Command::SetNotes(_) => "set_notes",
            Command::SetAttack => "set_attack",
            Command::AddMedication { .. } => "add_med",
            Command::AddSymptom { .. } => "add_symptom",
            Command::Recent => "recent",
            Command::Export(_) => "export",
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_command(s)
    }
}

/// Parse one message. `/name@bot` addressing is accepted.
pub fn parse_command(text: &str) -> CommandResult<Command> {
    let text = text.trim();
    let Some(body) = text.strip_prefix('/') else {
        return Err(CommandError::NotACommand);
    };

    let (head, rest) = match body.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (body, ""),
    };
    let name = head.split('@').next().unwrap_or(head).to_lowercase();

    match name.as_str() {
        "start" => Ok(Command::Start),
        "help" => Ok(Command::Help),
        "headache" => Ok(Command::Headache),
        "entry" => Ok(Command::Entry),
        "today" => Ok(Command::Today),
        "edit" => Ok(Command::Edit),
        "set_attack" => Ok(Command::SetAttack),
        "recent" => Ok(Command::Recent),
        "set_pain" => {
            let token = first_word(rest).ok_or(CommandError::MissingArgument {
                command: "set_pain",
            })?;
            Ok(Command::SetPain(token.parse()?))
        }
        "set_score" => {
            let token = first_word(rest).ok_or(CommandError::MissingArgument {
                command: "set_score",
            })?;
            Ok(Command::SetScore(parse_number("pain_score", token)?))
        }
        "set_pain_desc" => required_text(rest, "set_pain_desc").map(Command::SetPainDescription),
        "set_notes" => required_text(rest, "set_notes").map(Command::SetNotes),
        "add_med" => parse_add_medication(rest),
        "add_symptom" => parse_add_symptom(rest),
        "export" => match first_word(rest) {
            Some(token) => Ok(Command::Export(token.parse()?)),
            None => Ok(Command::Export(ExportFormat::Csv)),
        },
        _ => Err(CommandError::Unknown(name)),
    }
}

/// `<type> <name> [dosage]`; everything after the name is the dosage.
fn parse_add_medication(rest: &str) -> CommandResult<Command> {
    let (kind, after_kind) = split_word(rest);
    let (name, dosage) = split_word(after_kind);
    if kind.is_empty() || name.is_empty() {
        return Err(CommandError::MissingArgument { command: "add_med" });
    }

    Ok(Command::AddMedication {
        medication_type: kind.parse()?,
        name: name.to_string(),
        dosage: (!dosage.is_empty()).then(|| dosage.to_string()),
    })
}

/// `<name> [severity]`; a trailing integer is the severity.
fn parse_add_symptom(rest: &str) -> CommandResult<Command> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "add_symptom",
        });
    }

    if let Some((name, last)) = rest.rsplit_once(char::is_whitespace) {
        if is_integer(last) {
            // Integers too wide for i32 are still a severity, just out of range.
            let severity = last.parse::<i32>().map_err(|_| ValidationError::OutOfRange {
                field: "severity",
                min: SCORE_MIN,
                max: SCORE_MAX,
                value: if last.starts_with('-') { i32::MIN } else { i32::MAX },
            })?;
            return Ok(Command::AddSymptom {
                name: name.trim().to_string(),
                severity: Some(severity),
            });
        }
    }

    Ok(Command::AddSymptom {
        name: rest.to_string(),
        severity: None,
    })
}

/// Optional sign followed by ASCII digits.
fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Split off the first word, returning it and the trimmed remainder.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn first_word(rest: &str) -> Option<&str> {
    rest.split_whitespace().next()
}

fn required_text(rest: &str, command: &'static str) -> CommandResult<String> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command })
    } else {
        Ok(rest.to_string())
    }
}

fn parse_number(field: &'static str, token: &str) -> CommandResult<i32> {
    token.parse().map_err(|_| CommandError::NotANumber {
        field,
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_commands() {
        assert_eq!(parse_command("/start").unwrap(), Command::Start);
        assert_eq!(parse_command("  /today  ").unwrap(), Command::Today);
        assert_eq!(parse_command("/HELP").unwrap(), Command::Help);
        assert_eq!(parse_command("/entry@migrebot").unwrap(), Command::Entry);
    }

    #[test]
    fn test_not_a_command() {
        assert_eq!(parse_command("hello").unwrap_err(), CommandError::NotACommand);
        assert_eq!(parse_command("").unwrap_err(), CommandError::NotACommand);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_command("/migrebotplus").unwrap_err(),
            CommandError::Unknown("migrebotplus".into())
        );
    }

    #[test]
    fn test_set_pain() {
        assert_eq!(
            parse_command("/set_pain Very_Severe").unwrap(),
            Command::SetPain(PainLevel::VerySevere)
        );
        assert_eq!(
            parse_command("/set_pain").unwrap_err(),
            CommandError::MissingArgument { command: "set_pain" }
        );

        match parse_command("/set_pain sever").unwrap_err() {
            CommandError::Invalid(ValidationError::InvalidChoice { suggestion, .. }) => {
                assert_eq!(suggestion, Some("severe"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_set_score() {
        assert_eq!(parse_command("/set_score 7").unwrap(), Command::SetScore(7));
        // Range is checked by the diary, not the parser
        assert_eq!(parse_command("/set_score 11").unwrap(), Command::SetScore(11));
        assert!(matches!(
            parse_command("/set_score seven").unwrap_err(),
            CommandError::NotANumber { field: "pain_score", .. }
        ));
    }

    #[test]
    fn test_free_text_commands_keep_whole_tail() {
        assert_eq!(
            parse_command("/set_pain_desc пульсирующая боль, слева").unwrap(),
            Command::SetPainDescription("пульсирующая боль, слева".into())
        );
        assert_eq!(
            parse_command("/set_notes   выпила кофе  ").unwrap(),
            Command::SetNotes("выпила кофе".into())
        );
        assert!(matches!(
            parse_command("/set_notes").unwrap_err(),
            CommandError::MissingArgument { command: "set_notes" }
        ));
    }

    #[test]
    fn test_add_medication() {
        assert_eq!(
            parse_command("/add_med abortive sumatriptan 50 mg").unwrap(),
            Command::AddMedication {
                medication_type: MedicationType::Abortive,
                name: "sumatriptan".into(),
                dosage: Some("50 mg".into()),
            }
        );
        assert_eq!(
            parse_command("/add_med other ibuprofen").unwrap(),
            Command::AddMedication {
                medication_type: MedicationType::Other,
                name: "ibuprofen".into(),
                dosage: None,
            }
        );
        assert!(matches!(
            parse_command("/add_med abortive").unwrap_err(),
            CommandError::MissingArgument { command: "add_med" }
        ));
        assert!(matches!(
            parse_command("/add_med rescue ibuprofen").unwrap_err(),
            CommandError::Invalid(ValidationError::InvalidChoice { field: "medication_type", .. })
        ));
    }

    #[test]
    fn test_add_symptom() {
        assert_eq!(
            parse_command("/add_symptom светобоязнь 6").unwrap(),
            Command::AddSymptom {
                name: "светобоязнь".into(),
                severity: Some(6),
            }
        );
        assert_eq!(
            parse_command("/add_symptom blurred vision").unwrap(),
            Command::AddSymptom {
                name: "blurred vision".into(),
                severity: None,
            }
        );
    }

    #[test]
    fn test_add_symptom_wide_severity_rejected() {
        let err = parse_command("/add_symptom aura 99999999999").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Invalid(ValidationError::OutOfRange {
                field: "severity",
                value: i32::MAX,
                ..
            })
        ));
        assert!(matches!(
            parse_command("/add_symptom aura -99999999999").unwrap_err(),
            CommandError::Invalid(ValidationError::OutOfRange { value: i32::MIN, .. })
        ));
        assert_eq!(
            parse_command("/add_symptom aura 2b").unwrap(),
            Command::AddSymptom {
                name: "aura 2b".into(),
                severity: None,
            }
        );
    }

    #[test]
    fn test_export_format() {
        assert_eq!(
            parse_command("/export").unwrap(),
            Command::Export(ExportFormat::Csv)
        );
        assert_eq!(
            parse_command("/export XLSX").unwrap(),
            Command::Export(ExportFormat::Xlsx)
        );
        assert!(matches!(
            parse_command("/export pdf").unwrap_err(),
            CommandError::Invalid(ValidationError::InvalidChoice { field: "format", .. })
        ));
    }

    #[test]
    fn test_name_matches_parse() {
        for text in ["/start", "/recent", "/set_attack", "/export csv"] {
            let command: Command = text.parse().unwrap();
            assert!(text[1..].starts_with(command.name()));
        }
    }
}
