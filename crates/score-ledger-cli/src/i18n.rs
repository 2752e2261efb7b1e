// crates/score-ledger-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalogs and translation utilities for the CLI.
// Purpose: Centralize user-facing replies in English and Persian.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every reply the `score-ledger` binary prints is looked up in a small
//! translation catalog so chat replies and CLI diagnostics read the same in
//! both supported languages. All runtime output should be routed through the
//! [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - Variants are stable for CLI parsing and catalog lookup.
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Persian.
    Fa,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fa => "fa",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "fa" | "per" => Some(Self::Fa),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
///
/// # Invariants
/// - Ordering is stable for deterministic presentation.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Fa];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `code`).
/// - `value` is preformatted and should be safe for display.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"code"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "score-ledger {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("input.kind.bulk", "bulk rows"),
    ("input.kind.import", "import file"),
    ("input.stdin", "<stdin>"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.not_utf8", "The {kind} at {path} is not valid UTF-8."),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("ledger.secret_invalid", "Invalid pseudonymization secret: {error}"),
    ("ledger.store_open_failed", "Failed to open the score store: {error}"),
    ("audit.open_failed", "Failed to open the audit log at {path}: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'fa'."),
    (
        "chat.help",
        "Hi! Send your 10-digit national code to see your scores.\nTo see the score of one \
         subject, send:\n<code>|<subject>  or  <code> <subject>\n\nAdmins: /add, /edit, /remove, \
         /remove_all, /list_codes, /add_bulk",
    ),
    ("chat.unknown_command", "Unknown command {command}. Send /help for usage."),
    ("chat.add.usage", "Usage: /add <code> <subject> <score>"),
    ("chat.add.format", "Wrong format. Example: /add 0012345679 math 18"),
    ("chat.add.ok", "Score for {subject} saved for code {code}."),
    ("chat.remove.usage", "Usage: /remove <code> <subject>"),
    ("chat.remove.ok", "Score for {subject} removed for code {code}."),
    ("chat.remove.missing", "No such score was found."),
    ("chat.remove_all.usage", "Usage: /remove_all <code>"),
    ("chat.remove_all.ok", "{count} rows removed for this code."),
    ("chat.list.empty", "No data has been recorded."),
    ("chat.list.header", "Pseudonymized codes (up to {limit}):"),
    ("chat.bulk.usage", "Usage: /add_bulk\n<code> <subject> <score>"),
    ("chat.lookup.prompt", "Please send a 10-digit national code, optionally with a subject name."),
    ("lookup.entry", "{subject}: {score} (updated: {updated_at})"),
    ("lookup.none", "No scores are recorded for this national code."),
    ("lookup.subject_missing", "No score is recorded for this subject and national code."),
    ("error.denied", "Only admins may use this command."),
    ("error.code_shape", "Please send your 10-digit national code."),
    ("error.code_invalid", "Invalid national code. Please check it again."),
    ("error.format", "Wrong format."),
    ("error.subject_missing", "A subject name is required."),
    ("error.score_parse", "Score must be a number (for example 18 or 17.5)."),
    ("error.score_range", "Score {score} is outside the allowed range."),
    ("error.storage", "Storage failure: {error}"),
    ("error.batch_too_large", "The batch has {rows} rows; the limit is {max}."),
    ("bulk.row.accepted", "{code} {subject}: stored"),
    ("bulk.row.invalid_code", "{code}: invalid national code"),
    ("bulk.row.bad_format", "line {line}: wrong format"),
    ("bulk.row.unparsable_score", "{code} {subject}: score must be a number"),
    ("bulk.row.out_of_range", "{code} {subject}: score {score} is out of range"),
    ("bulk.row.storage_failed", "{code} {subject}: storage failure"),
    ("bulk.summary", "{accepted} of {rows} rows stored, {rejected} rejected."),
    ("seed.applied", "Sample data added: {accepted} rows."),
    ("seed.skipped", "The store already holds records; sample data was not added."),
    (
        "import.unsupported_format",
        "Unsupported file type for {path}. Save the sheet as CSV and import that file.",
    ),
    ("import.parse_failed", "Failed to parse {path}: {error}"),
];

/// Static Persian catalog entries.
const CATALOG_FA: &[(&str, &str)] = &[
    ("main.version", "score-ledger {version}"),
    ("output.stream.stdout", "خروجی استاندارد"),
    ("output.stream.stderr", "خروجی خطا"),
    ("output.stream.unknown", "خروجی"),
    ("output.write_failed", "نوشتن در {stream} ناموفق بود: {error}"),
    ("input.kind.bulk", "ردیف‌های گروهی"),
    ("input.kind.import", "فایل ورودی"),
    ("input.stdin", "<ورودی استاندارد>"),
    ("input.read_failed", "خواندن {kind} در {path} ناموفق بود: {error}"),
    (
        "input.read_too_large",
        "{kind} در {path} خوانده نشد چون {size} بایت است (حداکثر {limit}).",
    ),
    ("input.not_utf8", "{kind} در {path} با UTF-8 معتبر نیست."),
    ("config.load_failed", "بارگذاری پیکربندی ناموفق بود: {error}"),
    ("config.validate.ok", "پیکربندی معتبر است."),
    ("ledger.secret_invalid", "کلید هش نامعتبر است: {error}"),
    ("ledger.store_open_failed", "باز کردن پایگاه نمرات ناموفق بود: {error}"),
    ("audit.open_failed", "باز کردن فایل ممیزی در {path} ناموفق بود: {error}"),
    ("i18n.lang.invalid_env", "مقدار نامعتبر برای {env}: {value}. مقدار مجاز 'en' یا 'fa' است."),
    (
        "chat.help",
        "سلام! کافیه کد ملی ۱۰ رقمی خودت رو ارسال کنی تا نمراتت رو ببینی.\nاگر می‌خوای نمرهٔ یک \
         درس خاص رو ببینی، فرمت زیر رو بفرست:\n<کدملی>|<نام درس>  یا  <کدملی> <نام \
         درس>\n\nادمین‌ها: /add, /edit, /remove, /remove_all, /list_codes, /add_bulk",
    ),
    ("chat.unknown_command", "دستور {command} شناخته نشد. برای راهنما /help را بفرستید."),
    ("chat.add.usage", "فرمت: /add <کدملی> <نام درس> <نمره>"),
    ("chat.add.format", "فرمت درست نیست. مثال: /add 0012345679 ریاضی 18"),
    ("chat.add.ok", "نمرهٔ {subject} برای کد {code} ثبت/بروزرسانی شد."),
    ("chat.remove.usage", "فرمت: /remove <کدملی> <نام درس>"),
    ("chat.remove.ok", "نمرهٔ {subject} برای کد {code} حذف شد."),
    ("chat.remove.missing", "چنین نمره‌ای پیدا نشد."),
    ("chat.remove_all.usage", "فرمت: /remove_all <کدملی>"),
    ("chat.remove_all.ok", "{count} ردیف برای این کد حذف شد."),
    ("chat.list.empty", "هیچ داده‌ای ثبت نشده است."),
    ("chat.list.header", "کدهای هش‌شده (تا {limit}):"),
    ("chat.bulk.usage", "فرمت: /add_bulk\nکدملی نام_درس نمره"),
    ("chat.lookup.prompt", "لطفاً کد ملی ۱۰ رقمی یا کد ملی همراه نام درس را ارسال کنید."),
    ("lookup.entry", "{subject}: {score} (بروزرسانی: {updated_at})"),
    ("lookup.none", "برای این کد ملی، نمره‌ای ثبت نشده است."),
    ("lookup.subject_missing", "نمرهٔ این درس برای این کد ملی ثبت نشده است."),
    ("error.denied", "فقط ادمین‌ها مجاز به استفاده از این دستور هستند."),
    ("error.code_shape", "لطفاً کد ملی ۱۰ رقمی خود را ارسال کنید."),
    ("error.code_invalid", "کد ملی نامعتبر است. لطفاً دوباره بررسی کنید."),
    ("error.format", "فرمت اشتباه"),
    ("error.subject_missing", "نام درس الزامی است."),
    ("error.score_parse", "نمره باید عدد باشد (مثلاً 18 یا 17.5)."),
    ("error.score_range", "نمرهٔ {score} خارج از بازهٔ مجاز است."),
    ("error.storage", "خطای ذخیره‌سازی: {error}"),
    ("error.batch_too_large", "تعداد ردیف‌ها {rows} است؛ حداکثر مجاز {max} است."),
    ("bulk.row.accepted", "{code} {subject}: ثبت شد"),
    ("bulk.row.invalid_code", "{code}: کد ملی نامعتبر"),
    ("bulk.row.bad_format", "خط {line}: فرمت اشتباه"),
    ("bulk.row.unparsable_score", "{code} {subject}: نمره باید عدد باشد"),
    ("bulk.row.out_of_range", "{code} {subject}: نمرهٔ {score} خارج از بازه است"),
    ("bulk.row.storage_failed", "{code} {subject}: خطای ذخیره‌سازی"),
    ("bulk.summary", "{accepted} از {rows} ردیف ثبت شد، {rejected} ردیف رد شد."),
    ("seed.applied", "داده‌های نمونه اضافه شد: {accepted} ردیف."),
    ("seed.skipped", "پایگاه داده خالی نیست؛ داده‌های نمونه اضافه نشد."),
    (
        "import.unsupported_format",
        "نوع فایل {path} پشتیبانی نمی‌شود. برگه را به صورت CSV ذخیره و همان فایل را وارد کنید.",
    ),
    ("import.parse_failed", "پردازش {path} ناموفق بود: {error}"),
];

/// Returns the raw catalog entries for the requested locale.
#[cfg(test)]
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::Fa => CATALOG_FA,
    }
}

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_FA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Fa => CATALOG_FA_MAP.get_or_init(|| CATALOG_FA.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    translate_in(current_locale(), key, args)
}

/// Translates `key` for an explicit locale while substituting `args`.
#[must_use]
pub fn translate_in(locale: Locale, key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
