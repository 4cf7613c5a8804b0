use std::{error, fmt};

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub enum TimeError {
    /// the date or time-of-day string could not be parsed, or the local time
    /// does not exist in the zone (spring-forward gap)
    InvalidDate(String),
    /// the zone name is not a known IANA identifier
    InvalidZone(String),
}

impl error::Error for TimeError {}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimeError::InvalidDate(what) => write!(f, "invalid date: {}", what),
            TimeError::InvalidZone(what) => write!(f, "invalid time zone: {}", what),
        }
    }
}

/// State-level zip ranges mapped to the dominant zone of each state. Split
/// states resolve to the zone of their larger share; a missing range falls
/// back to the booking's program zone at the call site.
static ZIP_TIMEZONES: &[(u32, u32, Tz)] = &[
    (501, 544, Tz::America__New_York),     // NY (Holtsville)
    (601, 988, Tz::America__Puerto_Rico),  // PR
    (1000, 2799, Tz::America__New_York),   // MA
    (2800, 2999, Tz::America__New_York),   // RI
    (3000, 3899, Tz::America__New_York),   // NH
    (3900, 4999, Tz::America__New_York),   // ME
    (5000, 5999, Tz::America__New_York),   // VT
    (6000, 6999, Tz::America__New_York),   // CT
    (7000, 8999, Tz::America__New_York),   // NJ
    (10000, 14999, Tz::America__New_York), // NY
    (15000, 19699, Tz::America__New_York), // PA
    (19700, 19999, Tz::America__New_York), // DE
    (20000, 20599, Tz::America__New_York), // DC
    (20600, 21999, Tz::America__New_York), // MD
    (22000, 24699, Tz::America__New_York), // VA
    (24700, 26899, Tz::America__New_York), // WV
    (27000, 28999, Tz::America__New_York), // NC
    (29000, 29999, Tz::America__New_York), // SC
    (30000, 31999, Tz::America__New_York), // GA
    (32000, 34999, Tz::America__New_York), // FL
    (35000, 36999, Tz::America__Chicago),  // AL
    (37000, 38599, Tz::America__Chicago),  // TN
    (38600, 39799, Tz::America__Chicago),  // MS
    (40000, 42799, Tz::America__New_York), // KY
    (43000, 45999, Tz::America__New_York), // OH
    (46000, 47999, Tz::America__New_York), // IN
    (48000, 49999, Tz::America__New_York), // MI
    (50000, 52899, Tz::America__Chicago),  // IA
    (53000, 54999, Tz::America__Chicago),  // WI
    (55000, 56799, Tz::America__Chicago),  // MN
    (57000, 57999, Tz::America__Chicago),  // SD
    (58000, 58899, Tz::America__Chicago),  // ND
    (59000, 59999, Tz::America__Denver),   // MT
    (60000, 62999, Tz::America__Chicago),  // IL
    (63000, 65899, Tz::America__Chicago),  // MO
    (66000, 67999, Tz::America__Chicago),  // KS
    (68000, 69399, Tz::America__Chicago),  // NE
    (70000, 71499, Tz::America__Chicago),  // LA
    (71600, 72999, Tz::America__Chicago),  // AR
    (73000, 74999, Tz::America__Chicago),  // OK
    (75000, 79799, Tz::America__Chicago),  // TX
    (79800, 79999, Tz::America__Denver),   // TX (El Paso)
    (80000, 81699, Tz::America__Denver),   // CO
    (82000, 83199, Tz::America__Denver),   // WY
    (83200, 83899, Tz::America__Denver),   // ID
    (84000, 84799, Tz::America__Denver),   // UT
    (85000, 86599, Tz::America__Phoenix),  // AZ
    (87000, 88499, Tz::America__Denver),   // NM
    (88500, 88599, Tz::America__Denver),   // TX (El Paso)
    (89000, 89899, Tz::America__Los_Angeles), // NV
    (90000, 96199, Tz::America__Los_Angeles), // CA
    (96700, 96899, Tz::Pacific__Honolulu),    // HI
    (97000, 97999, Tz::America__Los_Angeles), // OR
    (98000, 99499, Tz::America__Los_Angeles), // WA
    (99500, 99999, Tz::America__Anchorage),   // AK
];

/// Extracts the last run of exactly five digits from an address and looks it
/// up in the zip interval table. A nine-digit zip ("12345-6789") counts as
/// two runs, so the plus-four part never wins.
pub fn timezone_for_address(address: &str) -> Option<Tz> {
    let zip = last_five_digit_run(address)?;
    ZIP_TIMEZONES
        .iter()
        .find(|(start, end, _)| (*start..=*end).contains(&zip))
        .map(|(_, _, tz)| *tz)
}

fn last_five_digit_run(address: &str) -> Option<u32> {
    let mut result = None;
    let mut run = String::new();
    for ch in address.chars().chain(std::iter::once(' ')) {
        if ch.is_ascii_digit() {
            run.push(ch);
        } else {
            if run.len() == 5 {
                result = run.parse().ok().or(result);
            }
            run.clear();
        }
    }
    result
}

/// Parses an IANA zone name.
pub fn parse_zone(name: &str) -> Result<Tz, TimeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimeError::InvalidZone(name.to_owned()))
}

/// Combines a "Month Day, Year" date, an "HH:MM" time of day and a zone into
/// an absolute instant.
///
/// During fall-back the first occurrence of the ambiguous hour is chosen;
/// a time inside the spring-forward gap does not exist and is rejected.
pub fn resolve_instant(
    date: &str,
    time_of_day: &str,
    timezone: Tz,
) -> Result<DateTime<Utc>, TimeError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%B %d, %Y")
        .map_err(|why| TimeError::InvalidDate(format!("{}: {}", date, why)))?;
    let time = NaiveTime::parse_from_str(time_of_day.trim(), "%H:%M")
        .map_err(|why| TimeError::InvalidDate(format!("{}: {}", time_of_day, why)))?;

    match timezone.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _) => Ok(first.with_timezone(&Utc)),
        LocalResult::None => Err(TimeError::InvalidDate(format!(
            "{} {} does not exist in {}",
            date, time, timezone
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_is_the_last_five_digit_run() {
        assert_eq!(last_five_digit_run("742 Evergreen Terrace, 02134"), Some(2134));
        assert_eq!(last_five_digit_run("Suite 300, 90210 CA"), Some(90210));
        // plus-four suffix is a four-digit run and is skipped
        assert_eq!(last_five_digit_run("1 Main St 60601-1234"), Some(60601));
        assert_eq!(last_five_digit_run("123456 warehouse rd"), None);
        assert_eq!(last_five_digit_run("no digits here"), None);
    }

    #[test]
    fn address_resolves_through_the_interval_table() {
        assert_eq!(
            timezone_for_address("1060 W Addison St, Chicago, IL 60613"),
            Some(Tz::America__Chicago)
        );
        assert_eq!(
            timezone_for_address("350 5th Ave, New York, NY 10118"),
            Some(Tz::America__New_York)
        );
        assert_eq!(
            timezone_for_address("2 Marina Blvd, San Francisco, CA 94123"),
            Some(Tz::America__Los_Angeles)
        );
        assert_eq!(timezone_for_address("Rathausmarkt 1, Hamburg"), None);
    }

    #[test]
    fn instants_resolve_in_the_given_zone() {
        let instant =
            resolve_instant("January 15, 2025", "09:00", Tz::America__New_York).unwrap();
        // EST is UTC-5
        assert_eq!(instant.to_rfc3339(), "2025-01-15T14:00:00+00:00");
    }

    #[test]
    fn spring_forward_gap_is_rejected() {
        // 2025-03-09 02:30 does not exist in the eastern zone
        let result = resolve_instant("March 9, 2025", "02:30", Tz::America__New_York);
        assert!(matches!(result, Err(TimeError::InvalidDate(_))));

        let before = resolve_instant("March 9, 2025", "01:59", Tz::America__New_York).unwrap();
        assert_eq!(before.to_rfc3339(), "2025-03-09T06:59:00+00:00");
    }

    #[test]
    fn fall_back_picks_the_first_occurrence() {
        // 2025-11-02 01:30 happens twice; the EDT instant comes first
        let instant =
            resolve_instant("November 2, 2025", "01:30", Tz::America__New_York).unwrap();
        assert_eq!(instant.to_rfc3339(), "2025-11-02T05:30:00+00:00");
    }

    #[test]
    fn bad_inputs_are_typed() {
        assert!(matches!(
            resolve_instant("2025-01-15", "09:00", Tz::UTC),
            Err(TimeError::InvalidDate(_))
        ));
        assert!(matches!(
            resolve_instant("January 15, 2025", "9 o'clock", Tz::UTC),
            Err(TimeError::InvalidDate(_))
        ));
        assert!(matches!(parse_zone("Mars/Olympus_Mons"), Err(TimeError::InvalidZone(_))));
        assert!(parse_zone("America/Denver").is_ok());
    }
}
