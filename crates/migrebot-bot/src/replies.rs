//! User-facing reply texts (Russian).

use std::fmt::Write;

use chrono::NaiveDate;
use migrebot_core::export::{attack_token, ExportFile};
use migrebot_core::{DiaryError, Entry, EntryDetails, MedicationType, PainLevel, ValidationError};

use crate::commands::CommandError;

const START_BODY: &str = "Я Migrebot — помогаю вести дневник головной боли.\n\
Основные команды:\n\
/headache — быстрый старт записи\n\
/entry — создать запись на сегодня\n\
/today — показать запись за сегодня\n\
/recent — последние записи\n\
/help — подробности";

/// Greeting for `/start`, addressing the user by name when one is known.
pub fn start_text(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Привет, {}! {}", name, START_BODY),
        None => format!("Привет! {}", START_BODY),
    }
}

pub const HELP_TEXT: &str = "Доступные команды:\n\
/headache — краткая сводка по записи на сегодня\n\
/entry — создать запись на сегодня\n\
/today — показать запись за сегодня\n\
/edit — подсказки по редактированию записи\n\
/set_score <1-10> — оценка боли\n\
/set_pain_desc <текст> — описание боли\n\
/set_pain <уровень> — установить боль (none|mild|moderate|severe|very_severe)\n\
/set_notes <текст> — добавить заметки\n\
/set_attack — отметить приступ\n\
/add_med <тип> <название> [дозировка] — добавить препарат\n\
/add_symptom <название> [тяжесть 1-10] — добавить симптом\n\
/recent — показать последние записи\n\
/export [csv|xlsx] — выгрузка записей за 30 дней";

pub const EDIT_HINTS: &str = "Редактирование записи.\n\
Используйте команды:\n\
/set_score <1-10> - установить оценку боли\n\
/set_pain_desc <текст> - добавить описание боли\n\
/set_pain <уровень> - установить уровень боли (none, mild, moderate, severe, very_severe)\n\
/set_notes <текст> - добавить заметки\n\
/set_attack - отметить приступ";

pub const NO_ENTRY_TODAY: &str = "📝 Записи на сегодня нет. Используйте /entry для создания.";
pub const NO_ENTRY_TO_EDIT: &str = "Записи на сегодня нет. Сначала создайте её командой /entry.";
pub const CREATE_ENTRY_FIRST: &str = "Сначала создайте запись командой /entry.";
pub const ENTRY_EXISTS: &str =
    "У вас уже есть запись на сегодня. Используйте /edit для редактирования.";
pub const NO_ENTRIES: &str = "У вас пока нет записей.";
pub const UNKNOWN_COMMAND: &str = "Неизвестная команда. Список команд: /help";
pub const INTERNAL_ERROR: &str = "Не удалось выполнить команду. Попробуйте ещё раз позже.";

pub const PAIN_DESCRIPTION_UPDATED: &str = "✅ Описание боли обновлено.";
pub const NOTES_UPDATED: &str = "✅ Заметки обновлены.";
pub const ATTACK_MARKED: &str = "✅ Приступ отмечен в записи.";

fn level_or_unset(level: Option<PainLevel>) -> String {
    level
        .map(|l| l.to_string())
        .unwrap_or_else(|| "не указан".to_string())
}

fn score_or_unset(score: Option<i32>) -> String {
    score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "не указана".to_string())
}

/// `/headache`: short summary, or how to start one.
pub fn headache_summary(entry: Option<&Entry>) -> String {
    match entry {
        Some(entry) => format!(
            "📝 У вас уже есть запись на сегодня.\n\
             Уровень боли: {}\n\
             Оценка боли (1-10): {}\n\
             Описание боли: {}\n\
             Приступ: {}\n\
             Используйте /edit для редактирования.",
            level_or_unset(entry.pain_level),
            score_or_unset(entry.pain_score),
            entry.pain_description.as_deref().unwrap_or("не указано"),
            attack_token(entry.had_attack),
        ),
        None => "📝 Создайте запись о головной боли на сегодня.\n\
                 Используйте команды:\n\
                 /entry - создать запись\n\
                 /today - посмотреть сегодняшнюю запись"
            .to_string(),
    }
}

pub fn entry_created(date: NaiveDate) -> String {
    format!(
        "✅ Запись создана на {}.\n\
         Установите оценку боли командой /set_score <1-10>.\n\
         Добавьте описание боли через /set_pain_desc <текст> или заметки через /set_notes.",
        date
    )
}

/// `/today`: the full entry with its children.
pub fn entry_details(details: &EntryDetails) -> String {
    let entry = &details.entry;
    let mut text = format!("📅 Запись на {}:\n\n", entry.entry_date);
    let _ = writeln!(text, "Уровень боли: {}", level_or_unset(entry.pain_level));
    let _ = writeln!(text, "Оценка боли (1-10): {}", score_or_unset(entry.pain_score));
    if let Some(description) = &entry.pain_description {
        let _ = writeln!(text, "Описание боли: {}", description);
    }
    let _ = writeln!(text, "Приступ: {}", attack_token(entry.had_attack));
    if let Some(notes) = &entry.notes {
        let _ = writeln!(text, "Заметки: {}", notes);
    }

    if !details.medications.is_empty() {
        let _ = writeln!(text, "\nПрепараты ({}):", details.medications.len());
        for med in &details.medications {
            match &med.dosage {
                Some(dosage) => {
                    let _ = writeln!(text, "  • {} ({})", med.name, dosage);
                }
                None => {
                    let _ = writeln!(text, "  • {}", med.name);
                }
            }
        }
    }

    if !details.symptoms.is_empty() {
        let _ = writeln!(text, "\nСимптомы ({}):", details.symptoms.len());
        for symptom in &details.symptoms {
            match symptom.severity {
                Some(severity) => {
                    let _ = writeln!(text, "  • {} (тяжесть: {}/10)", symptom.name, severity);
                }
                None => {
                    let _ = writeln!(text, "  • {}", symptom.name);
                }
            }
        }
    }
    text
}

/// `/recent`: compact list, most recent first.
pub fn recent_entries(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return NO_ENTRIES.to_string();
    }

    let mut text = String::from("📋 Последние записи:\n\n");
    for entry in entries {
        let _ = writeln!(text, "📅 {}", entry.entry_date);
        let _ = writeln!(
            text,
            "  Боль: {}",
            entry
                .pain_level
                .map(|l| l.to_string())
                .unwrap_or_else(|| "не указана".to_string())
        );
        let _ = writeln!(text, "  Оценка: {}/10", score_or_unset(entry.pain_score));
        if let Some(description) = &entry.pain_description {
            let _ = writeln!(text, "  Описание: {}", description);
        }
        let _ = writeln!(text, "  Приступ: {}\n", attack_token(entry.had_attack));
    }
    text
}

pub fn pain_level_set(level: PainLevel) -> String {
    format!("✅ Уровень боли установлен: {}", level)
}

pub fn pain_score_set(score: i32) -> String {
    format!("✅ Оценка боли установлена: {}/10.", score)
}

pub fn medication_added(name: &str) -> String {
    format!("✅ Препарат добавлен: {}", name)
}

pub fn symptom_added(name: &str) -> String {
    format!("✅ Симптом добавлен: {}", name)
}

pub fn no_entries_in_window(days: u32) -> String {
    format!("Записей за последние {} дней нет.", days)
}

pub fn export_caption(file: &ExportFile) -> String {
    format!(
        "Выгрузка {} записей с {} по {}.\nВключены оценка и описание боли.",
        file.entry_count, file.window.start, file.window.end
    )
}

fn field_label(field: &str) -> &str {
    match field {
        "pain_description" => "описание боли",
        "notes" => "заметки",
        "name" => "название",
        "dosage" => "дозировка",
        "username" | "first_name" | "last_name" => "имя",
        other => other,
    }
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    suggestion
        .map(|token| format!(" Возможно, вы имели в виду: {}?", token))
        .unwrap_or_default()
}

pub fn validation_error(err: &ValidationError) -> String {
    match err {
        ValidationError::OutOfRange { field, min, max, .. } => match *field {
            "pain_score" => format!("Оценка должна быть в диапазоне {}-{}.", min, max),
            "severity" => format!("Тяжесть симптома должна быть в диапазоне {}-{}.", min, max),
            "export_days" => format!("Период выгрузки должен быть от {} до {} дней.", min, max),
            other => format!("Значение {} должно быть в диапазоне {}-{}.", other, min, max),
        },
        ValidationError::TooLong { field, max, .. } => format!(
            "Слишком длинный текст ({}): максимум {} символов.",
            field_label(field),
            max
        ),
        ValidationError::Empty { field } => {
            format!("Поле «{}» не может быть пустым.", field_label(field))
        }
        ValidationError::InvalidChoice {
            field, suggestion, ..
        } => match *field {
            "pain_level" => format!(
                "Неверный уровень боли. Используйте: {}.{}",
                PainLevel::accepted(),
                did_you_mean(*suggestion)
            ),
            "medication_type" => format!(
                "Неверный тип препарата. Используйте: {}.{}",
                MedicationType::accepted(),
                did_you_mean(*suggestion)
            ),
            "format" => "Укажите формат: /export csv или /export xlsx".to_string(),
            _ => err.to_string(),
        },
        ValidationError::FutureDate { .. } => "Нельзя создать запись на будущую дату.".to_string(),
        ValidationError::InvalidTime { .. } => "Время должно быть в формате ЧЧ:ММ.".to_string(),
    }
}

pub fn command_error(err: &CommandError) -> String {
    match err {
        CommandError::NotACommand | CommandError::Unknown(_) => UNKNOWN_COMMAND.to_string(),
        CommandError::MissingArgument { command } => usage(command).to_string(),
        CommandError::NotANumber { field, .. } => match *field {
            "pain_score" => "Оценка должна быть числом от 1 до 10.".to_string(),
            other => format!("Значение {} должно быть числом.", other),
        },
        CommandError::Invalid(e) => validation_error(e),
    }
}

fn usage(command: &str) -> &'static str {
    match command {
        "set_pain" => "Укажите уровень боли: none, mild, moderate, severe, very_severe",
        "set_score" => "Укажите оценку боли от 1 до 10: /set_score 7",
        "set_pain_desc" => {
            "Укажите описание после команды. Пример: /set_pain_desc пульсирующая боль"
        }
        "set_notes" => "Укажите текст заметки после команды.",
        "add_med" => "Используйте: /add_med <тип> <название> [дозировка]\nТипы: preventive, abortive, other",
        "add_symptom" => "Используйте: /add_symptom <название> [тяжесть 1-10]",
        _ => UNKNOWN_COMMAND,
    }
}

/// Render a failed diary operation.
pub fn diary_error(err: &DiaryError) -> String {
    match err {
        DiaryError::Validation(e) => validation_error(e),
        DiaryError::Conflict(_) => ENTRY_EXISTS.to_string(),
        DiaryError::NotFound(_) => CREATE_ENTRY_FIRST.to_string(),
        DiaryError::Storage(_) | DiaryError::Export(_) => INTERNAL_ERROR.to_string(),
    }
}
