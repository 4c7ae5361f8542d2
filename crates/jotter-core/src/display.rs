//! Locale-aware timestamp formatting for note rows and the detail footer.

use chrono::{DateTime, Local, Locale, TimeZone, Utc};

const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_TIME", "LANG"];

/// Resolve the user's time locale from the usual POSIX variables.
///
/// Falls back to `POSIX` when nothing usable is set.
pub fn locale_from_env() -> Locale {
    LOCALE_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find_map(|value| parse_locale(&value))
        .unwrap_or(Locale::POSIX)
}

/// Parse values such as `de_DE.UTF-8` or `fr_FR@euro`.
pub fn parse_locale(value: &str) -> Option<Locale> {
    let name = value
        .split(['.', '@'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())?;
    if name == "C" {
        return Some(Locale::POSIX);
    }
    Locale::try_from(name).ok()
}

/// Date only, e.g. `03/05/24` in the POSIX locale.
pub fn format_date<Tz: TimeZone>(value: &DateTime<Tz>, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    value.format_localized("%x", locale).to_string()
}

/// Date and time, e.g. `03/05/24 09:30:00` in the POSIX locale.
pub fn format_date_time<Tz: TimeZone>(value: &DateTime<Tz>, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    value.format_localized("%x %X", locale).to_string()
}

/// Convert a stored UTC timestamp to the machine's local zone.
pub fn to_local(value: DateTime<Utc>) -> DateTime<Local> {
    value.with_timezone(&Local)
}
