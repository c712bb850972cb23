//! Italian date labels for schedules.

use chrono::{Datelike, Local, NaiveDate};

const GIORNI: [&str; 7] = ["Dom", "Lun", "Mar", "Mer", "Gio", "Ven", "Sab"];
const MESI: [&str; 12] = [
    "Gen", "Feb", "Mar", "Apr", "Mag", "Giu", "Lug", "Ago", "Set", "Ott", "Nov", "Dic",
];

/// Label for today's date.
pub const OGGI: &str = "📌 Oggi";

/// Label for tomorrow's date.
pub const DOMANI: &str = "Domani";

/// Parse the calendar date at the start of an ISO string (`YYYY-MM-DD`,
/// optionally followed by a time). The date is taken as written, with no
/// timezone conversion.
pub fn parse_iso_date(iso: &str) -> Option<NaiveDate> {
    let iso = iso.trim();
    let date = iso.get(..10).unwrap_or(iso);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Format a date as `"<weekday> <day> <month>"` with Italian abbreviations,
/// e.g. `"Lun 1 Gen"`.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        GIORNI[date.weekday().num_days_from_sunday() as usize],
        date.day(),
        MESI[date.month0() as usize]
    )
}

/// Format an ISO date string. Empty input gives an empty string; input that
/// is not a date is returned unchanged.
pub fn fmt_date(iso: &str) -> String {
    if iso.trim().is_empty() {
        return String::new();
    }
    match parse_iso_date(iso) {
        Some(date) => format_date(date),
        None => {
            tracing::debug!(input = iso, "not an ISO date, leaving as is");
            iso.to_string()
        }
    }
}

/// Relative label for an ISO date: [`OGGI`], [`DOMANI`], or [`fmt_date`].
pub fn date_label(iso: &str) -> String {
    date_label_on(iso, Local::now().date_naive())
}

/// [`date_label`] relative to an explicit `today`.
pub fn date_label_on(iso: &str, today: NaiveDate) -> String {
    let Some(date) = parse_iso_date(iso) else {
        return fmt_date(iso);
    };
    if date == today {
        OGGI.to_string()
    } else if Some(date) == today.succ_opt() {
        DOMANI.to_string()
    } else {
        format_date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fmt_date() {
        assert_eq!(fmt_date("2024-01-01"), "Lun 1 Gen");
        assert_eq!(fmt_date("2024-08-15"), "Gio 15 Ago");
        assert_eq!(fmt_date("2023-12-31"), "Dom 31 Dic");
    }

    #[test]
    fn test_fmt_date_ignores_time_part() {
        assert_eq!(fmt_date("2024-01-01T23:30:00"), "Lun 1 Gen");
    }

    #[test]
    fn test_fmt_date_empty_and_garbage() {
        assert_eq!(fmt_date(""), "");
        assert_eq!(fmt_date("   "), "");
        assert_eq!(fmt_date("domani"), "domani");
    }

    #[test]
    fn test_date_label_on() {
        let today = ymd(2024, 2, 28);
        assert_eq!(date_label_on("2024-02-28", today), OGGI);
        assert_eq!(date_label_on("2024-02-29", today), DOMANI);
        assert_eq!(date_label_on("2024-03-01", today), "Ven 1 Mar");
        assert_eq!(date_label_on("2024-02-27", today), "Mar 27 Feb");
        assert_eq!(date_label_on("", today), "");
    }

    #[test]
    fn test_date_label_crosses_year_end() {
        assert_eq!(date_label_on("2025-01-01", ymd(2024, 12, 31)), DOMANI);
    }

    #[test]
    fn test_date_label_uses_local_clock() {
        let today = Local::now().date_naive();
        let tomorrow = today.succ_opt().unwrap();
        let later = today + chrono::Duration::days(10);

        assert_eq!(date_label(&today.format("%Y-%m-%d").to_string()), OGGI);
        assert_eq!(date_label(&tomorrow.format("%Y-%m-%d").to_string()), DOMANI);
        assert_eq!(
            date_label(&later.format("%Y-%m-%d").to_string()),
            format_date(later)
        );
    }
}
