// src/launch/normalize.rs
//! Date text normalization for scraped schedule entries.
//!
//! Scraped schedules publish dates like `"NET August 14"`, `"Aug. 20, 2025"` or
//! `"Sept. 3"` and put the time (if any) in a separate field such as
//! `"Launch time: 0030-0430 GMT (8:30 p.m.-12:30 a.m. EDT)"`. The parser turns that
//! into a date-level sort key and, only when the time is explicitly UTC/GMT, an
//! exact instant. A countdown must never run against a made-up time.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::Precision;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Leading "No Earlier Than" / "NET" qualifier.
static RE_QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:no\s+earlier\s+than|net)\b[\s:\-]*").expect("qualifier regex")
});

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

static RE_DATE: Lazy<Regex> = Lazy::new(|| {
    let names = MONTHS.iter().map(|(n, _)| *n).collect::<Vec<_>>().join("|");
    Regex::new(&format!(
        r"(?i)\b(?P<month>{names})\s+(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\b(?:\s+(?P<year>(?:19|20)\d{{2}})\b)?"
    ))
    .expect("date regex")
});

/// A 4-digit "year" directly followed by a zone marker is really a compact time.
static RE_ZONE_AHEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:utc|gmt)\b").expect("zone-ahead regex"));

static RE_TIME_COLON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?P<h>\d{1,2}):(?P<m>\d{2})(?::(?P<s>\d{2}))?(?:\s*(?P<ampm>[ap])m\b)?(?:\s*-\s*\d{1,2}:\d{2}(?::\d{2})?(?:\s*[ap]m\b)?)?(?:\s*(?P<zone>utc|gmt)\b)?",
    )
    .expect("colon time regex")
});

static RE_TIME_COMPACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?P<h>\d{2})(?P<m>\d{2})(?:\s*-\s*\d{4})?\s*(?P<zone>utc|gmt)\b")
        .expect("compact time regex")
});

/// Normalizer output. Built only through the constructors below so that the
/// exact instant and the sort key always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate {
    pub display: String,
    /// Date-level (or exact) ordering key.
    pub sort_key: Option<DateTime<Utc>>,
    /// Present only for explicit UTC/GMT times; equals `sort_key` when set.
    pub exact: Option<DateTime<Utc>>,
    /// The text carried a NET / "No Earlier Than" qualifier.
    pub qualified: bool,
}

impl ParsedDate {
    pub fn exact(at: DateTime<Utc>) -> Self {
        Self {
            display: display_for(at.date_naive(), Some(at.time()), false),
            sort_key: Some(at),
            exact: Some(at),
            qualified: false,
        }
    }

    pub fn date_only(date: NaiveDate, qualified: bool) -> Self {
        Self {
            display: display_for(date, None, qualified),
            sort_key: Some(date.and_time(NaiveTime::MIN).and_utc()),
            exact: None,
            qualified,
        }
    }

    pub fn unknown(raw: &str) -> Self {
        let cleaned = collapse_ws(raw);
        Self {
            display: if cleaned.is_empty() {
                "TBD".to_string()
            } else {
                cleaned
            },
            sort_key: None,
            exact: None,
            qualified: false,
        }
    }

    pub fn precision(&self) -> Precision {
        if self.exact.is_some() {
            Precision::Exact
        } else {
            Precision::Approximate
        }
    }

    pub fn status(&self) -> &'static str {
        match self.precision() {
            Precision::Exact => "Scheduled",
            Precision::Approximate => "TBD",
        }
    }

    pub fn sort_millis(&self) -> Option<i64> {
        self.sort_key.map(|t| t.timestamp_millis())
    }
}

/// Capability seam for turning scraped date text into a `ParsedDate`.
pub trait DateTextParser: Send + Sync {
    fn parse(&self, date_text: &str, time_text: Option<&str>, now: DateTime<Utc>) -> ParsedDate;
}

/// Regex heuristics over English month names and UTC/GMT-marked times.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrapedDateParser;

impl DateTextParser for ScrapedDateParser {
    fn parse(&self, date_text: &str, time_text: Option<&str>, now: DateTime<Utc>) -> ParsedDate {
        let (qualified, cleaned) = clean_date_text(date_text);

        let Some(caps) = RE_DATE.captures(&cleaned) else {
            return ParsedDate::unknown(date_text);
        };
        let (Some(whole), Some(month_m), Some(day_m)) =
            (caps.get(0), caps.name("month"), caps.name("day"))
        else {
            return ParsedDate::unknown(date_text);
        };

        let Some(month) = month_number(month_m.as_str()) else {
            return ParsedDate::unknown(date_text);
        };
        let Ok(day) = day_m.as_str().parse::<u32>() else {
            return ParsedDate::unknown(date_text);
        };

        // Year, unless it is actually a compact "2230 GMT" time.
        let mut date_end = whole.end();
        let mut year = None;
        if let Some(y) = caps.name("year") {
            if RE_ZONE_AHEAD.is_match(&cleaned[y.end()..]) {
                date_end = y.start();
            } else {
                year = y.as_str().parse::<i32>().ok();
            }
        }

        let date = match year {
            Some(y) => NaiveDate::from_ymd_opt(y, month, day),
            None => infer_year(month, day, now),
        };
        let Some(date) = date else {
            return ParsedDate::unknown(date_text);
        };

        // A UTC/GMT time from either text beats a local one; the date text wins ties.
        let remainder = format!("{} {}", &cleaned[..whole.start()], &cleaned[date_end..]);
        let in_date = find_time(&remainder);
        let nearby = time_text
            .map(|t| clean_date_text(t).1)
            .and_then(|t| find_time(&t));
        let time = match (in_date, nearby) {
            (Some(t), _) if t.zoned => Some(t),
            (_, Some(t)) if t.zoned => Some(t),
            (a, b) => a.or(b),
        };

        match time {
            Some(TimeMatch { time, zoned: true }) => {
                let at = date.and_time(time).and_utc();
                ParsedDate {
                    display: display_for(date, Some(time), qualified),
                    qualified,
                    ..ParsedDate::exact(at)
                }
            }
            _ => ParsedDate::date_only(date, qualified),
        }
    }
}

/// Missing year: current UTC year, bumped by one if that lands more than two
/// months in the past. Heuristic; entries right at the boundary may roll wrongly.
fn infer_year(month: u32, day: u32, now: DateTime<Utc>) -> Option<NaiveDate> {
    let this_year = yearless_date(now.year(), month, day)?;
    let cutoff = now.checked_sub_months(Months::new(2))?;
    if this_year.and_time(NaiveTime::MIN).and_utc() < cutoff {
        yearless_date(now.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

/// Feb 29 without a year is a real date; outside leap years it sorts as Feb 28.
fn yearless_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        if (month, day) == (2, 29) {
            NaiveDate::from_ymd_opt(year, 2, 28)
        } else {
            None
        }
    })
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, m)| *m)
}

/// Strip the NET qualifier and punctuation; returns (qualified, cleaned).
fn clean_date_text(raw: &str) -> (bool, String) {
    let collapsed = collapse_ws(raw);
    let qualified = RE_QUALIFIER.is_match(&collapsed);
    let stripped = RE_QUALIFIER.replace(&collapsed, "");
    let punct_free: String = stripped
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { ' ' } else { c })
        .collect();
    (qualified, collapse_ws(&punct_free))
}

fn collapse_ws(s: &str) -> String {
    RE_WS.replace_all(s, " ").trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimeMatch {
    time: NaiveTime,
    zoned: bool,
}

/// First UTC/GMT-marked time if there is one, else the first plain time.
fn find_time(text: &str) -> Option<TimeMatch> {
    let mut found: Vec<(usize, TimeMatch)> = Vec::new();

    for caps in RE_TIME_COLON.captures_iter(text) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let h = caps.name("h").and_then(|m| m.as_str().parse::<u32>().ok());
        let m = caps.name("m").and_then(|m| m.as_str().parse::<u32>().ok());
        let s = caps
            .name("s")
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0);
        let ampm = caps.name("ampm").map(|m| m.as_str().to_ascii_lowercase());
        let (Some(h), Some(m)) = (h, m) else {
            continue;
        };
        let Some(h) = apply_meridiem(h, ampm.as_deref()) else {
            continue;
        };
        if let Some(time) = NaiveTime::from_hms_opt(h, m, s) {
            found.push((
                start,
                TimeMatch {
                    time,
                    zoned: caps.name("zone").is_some(),
                },
            ));
        }
    }

    for caps in RE_TIME_COMPACT.captures_iter(text) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let h = caps.name("h").and_then(|m| m.as_str().parse::<u32>().ok());
        let m = caps.name("m").and_then(|m| m.as_str().parse::<u32>().ok());
        if let (Some(h), Some(m)) = (h, m) {
            if let Some(time) = NaiveTime::from_hms_opt(h, m, 0) {
                found.push((start, TimeMatch { time, zoned: true }));
            }
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found
        .iter()
        .find(|(_, t)| t.zoned)
        .or_else(|| found.first())
        .map(|(_, t)| *t)
}

fn apply_meridiem(h: u32, ampm: Option<&str>) -> Option<u32> {
    match ampm {
        None => Some(h),
        Some(_) if h == 0 || h > 12 => None,
        Some("a") => Some(h % 12),
        Some(_) => Some(h % 12 + 12),
    }
}

fn display_for(date: NaiveDate, time: Option<NaiveTime>, qualified: bool) -> String {
    let prefix = if qualified { "NET " } else { "" };
    let mon = MONTH_ABBR[date.month0() as usize];
    let mut out = format!("{prefix}{mon} {}, {}", date.day(), date.year());
    if let Some(t) = time {
        out.push_str(&t.format(" %H:%M UTC").to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn parse(date: &str, time: Option<&str>) -> ParsedDate {
        ScrapedDateParser.parse(date, time, now())
    }

    #[test]
    fn clean_strips_qualifiers_and_punctuation() {
        assert_eq!(clean_date_text("NET Aug. 20,  2025"), (true, "Aug 20 2025".into()));
        assert_eq!(
            clean_date_text("No Earlier Than Sept. 3"),
            (true, "Sept 3".into())
        );
        assert_eq!(clean_date_text("Network Day"), (false, "Network Day".into()));
    }

    #[test]
    fn month_lookup_is_case_insensitive() {
        assert_eq!(month_number("AUG"), Some(8));
        assert_eq!(month_number("Sept"), Some(9));
        assert_eq!(month_number("december"), Some(12));
        assert_eq!(month_number("Augustus"), None);
    }

    #[test]
    fn compact_range_gmt_is_exact() {
        let p = parse("Aug. 20", Some("Launch time: 0030-0430 GMT (8:30 p.m.-12:30 a.m. EDT)"));
        assert_eq!(
            p.exact,
            Some(Utc.with_ymd_and_hms(2025, 8, 20, 0, 30, 0).unwrap())
        );
        assert_eq!(p.display, "Aug 20, 2025 00:30 UTC");
    }

    #[test]
    fn local_zone_time_stays_approximate() {
        let p = parse("Aug 20", Some("8:30 p.m. EDT"));
        assert!(p.exact.is_none());
        assert_eq!(
            p.sort_key,
            Some(Utc.with_ymd_and_hms(2025, 8, 20, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn meridiem_with_utc_is_converted() {
        let p = parse("July 4 2025 2:15 pm UTC", None);
        assert_eq!(
            p.exact,
            Some(Utc.with_ymd_and_hms(2025, 7, 4, 14, 15, 0).unwrap())
        );
        let p = parse("July 4 2025 12:05 am GMT", None);
        assert_eq!(
            p.exact,
            Some(Utc.with_ymd_and_hms(2025, 7, 4, 0, 5, 0).unwrap())
        );
    }

    #[test]
    fn compact_time_is_not_taken_as_year() {
        let p = parse("Aug 20 2230 GMT", None);
        assert_eq!(
            p.exact,
            Some(Utc.with_ymd_and_hms(2025, 8, 20, 22, 30, 0).unwrap())
        );
    }

    #[test]
    fn invalid_calendar_date_is_unknown() {
        let p = parse("February 30", None);
        assert!(p.sort_key.is_none());
        assert_eq!(p.display, "February 30");
    }

    #[test]
    fn empty_text_displays_tbd() {
        let p = parse("   ", None);
        assert_eq!(p.display, "TBD");
        assert_eq!(p.precision(), Precision::Approximate);
    }

    #[test]
    fn ordinal_suffix_is_accepted() {
        let p = parse("NET October 3rd", None);
        assert!(p.qualified);
        assert_eq!(p.display, "NET Oct 3, 2025");
    }

    #[test]
    fn rollover_boundary() {
        // now = 2025-06-15; cutoff = 2025-04-15 12:00
        let p = parse("April 16", None);
        assert_eq!(p.sort_key.unwrap().year(), 2025);
        let p = parse("April 15", None);
        assert_eq!(p.sort_key.unwrap().year(), 2026);
        let p = parse("January 2", None);
        assert_eq!(p.sort_key.unwrap().year(), 2026);
    }

    #[test]
    fn yearless_feb_29_always_sorts() {
        let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        let key = |now| {
            ScrapedDateParser
                .parse("February 29", None, now)
                .sort_key
                .map(|t| t.date_naive())
        };

        // Leap year, already past the cutoff: next year has no Feb 29.
        assert_eq!(key(at(2024, 6, 1)), NaiveDate::from_ymd_opt(2025, 2, 28));
        // Leap year, still ahead.
        assert_eq!(key(at(2024, 1, 10)), NaiveDate::from_ymd_opt(2024, 2, 29));
        // Non-leap year rolling into a leap year.
        assert_eq!(key(at(2027, 12, 1)), NaiveDate::from_ymd_opt(2028, 2, 29));
        // Non-leap year, not rolled.
        assert_eq!(key(at(2025, 1, 10)), NaiveDate::from_ymd_opt(2025, 2, 28));

        assert!(ScrapedDateParser
            .parse("February 29, 2025", None, at(2025, 1, 10))
            .sort_key
            .is_none());
    }

    #[test]
    fn zoned_nearby_time_beats_local_time_in_date() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let p = ScrapedDateParser.parse("Aug 20 8:30 pm EDT", Some("Launch time: 0030 GMT"), now);
        assert_eq!(
            p.exact,
            Some(Utc.with_ymd_and_hms(2025, 8, 20, 0, 30, 0).unwrap())
        );
        assert_eq!(p.display, "Aug 20, 2025 00:30 UTC");

        // Zoned in both: the date text wins.
        let p = ScrapedDateParser.parse("Aug 20 14:30 UTC", Some("0030 GMT"), now);
        assert_eq!(p.exact.map(|t| t.hour()), Some(14));

        // Nothing zoned anywhere stays approximate.
        let p = ScrapedDateParser.parse("Aug 20 8:30 pm EDT", Some("9:00 pm EDT"), now);
        assert!(p.exact.is_none());
    }
}
