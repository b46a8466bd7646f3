// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Functions to help with time.
 *
 * All times are UTC. Helioviewer is queried in UTC and frame file names
 * carry UTC timestamps, so naive date-times are used throughout.
 */

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Formats accepted for user-supplied timestamps.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y/%m/%d", "%Y-%m-%d"];

/// The timestamp prefix of frame file names, e.g. "2015_01_17_07_00_00".
pub const FRAME_STAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

#[derive(Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("Could not parse '{0}' as a timestamp; expected e.g. \"2015/01/17 07:00:00\" or \"2015-01-17\"")]
    BadTimestamp(String),

    #[error("The end time ({end}) is before the start time ({start})")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Could not parse cadence '{0}'; expected \"daily\" or a positive number of seconds")]
    BadCadence(String),

    #[error("The cadence must be longer than zero seconds")]
    ZeroCadence,

    #[error("A cadence of {0} seconds is too long")]
    CadenceTooLong(i64),
}

/// Parse a user-supplied timestamp. A bare date means midnight.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, TimeError> {
    let s = s.trim();
    for f in TIMESTAMP_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, f) {
            return Ok(dt);
        }
    }
    for f in DATE_FORMATS.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return Ok(d.and_hms(0, 0, 0));
        }
    }
    Err(TimeError::BadTimestamp(s.to_string()))
}

/// How often frames are sampled between the start and end of a range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cadence {
    /// One frame per calendar day, at the start time's time of day.
    Daily,
    /// One frame every fixed interval.
    Every(Duration),
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Daily
    }
}

impl FromStr for Cadence {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("daily") {
            return Ok(Cadence::Daily);
        }
        let secs: i64 = s.parse().map_err(|_| TimeError::BadCadence(s.to_string()))?;
        if secs <= 0 {
            return Err(TimeError::ZeroCadence);
        }
        Duration::try_seconds(secs)
            .map(Cadence::Every)
            .ok_or(TimeError::CadenceTooLong(secs))
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Daily => write!(f, "daily"),
            Cadence::Every(d) => write!(f, "{}", d.num_seconds()),
        }
    }
}

/// Expand a time range into the instants to sample, in increasing order.
///
/// With a daily cadence there is one instant per calendar day from the
/// start date to the end date inclusive, regardless of the time of day of
/// `end`. With a fixed cadence, every `start + k * step` that is not after
/// `end` is included. Either way `start == end` gives a single instant.
pub fn expand_range(
    start: NaiveDateTime,
    end: NaiveDateTime,
    cadence: Cadence,
) -> Result<Vec<NaiveDateTime>, TimeError> {
    if end < start {
        return Err(TimeError::InvalidRange { start, end });
    }

    match cadence {
        Cadence::Daily => {
            let num_days = (end.date() - start.date()).num_days();
            Ok((0..=num_days)
                .filter_map(|d| Duration::try_days(d).and_then(|d| start.checked_add_signed(d)))
                .collect())
        }

        Cadence::Every(step) => {
            if step <= Duration::zero() {
                return Err(TimeError::ZeroCadence);
            }
            let mut instants = vec![];
            let mut t = start;
            while t <= end {
                instants.push(t);
                // Stepping past the last representable date is also stepping
                // past the end.
                t = match t.checked_add_signed(step) {
                    Some(next) => next,
                    None => break,
                };
            }
            Ok(instants)
        }
    }
}

/// The timestamp part of a frame's file name.
pub fn frame_stamp(t: &NaiveDateTime) -> String {
    t.format(FRAME_STAMP_FORMAT).to_string()
}

/// Get the instant out of a frame file name like
/// "2015_01_17_07_00_00_AIA_171.png". Only the leading six fields are
/// inspected.
pub fn parse_frame_stamp(file_name: &str) -> Option<NaiveDateTime> {
    let stamp = file_name.get(..19)?;
    NaiveDateTime::parse_from_str(stamp, FRAME_STAMP_FORMAT).ok()
}

/// The text drawn onto timestamped frames, e.g. "2015/01/17   07:00:00".
pub fn display_stamp(t: &NaiveDateTime) -> String {
    t.format("%Y/%m/%d   %H:%M:%S").to_string()
}

/// The directory name used for movies covering a time range, e.g.
/// "2015_01_17_0700-2015_01_17_0830".
pub fn movie_span_name(start: &NaiveDateTime, end: &NaiveDateTime) -> String {
    format!(
        "{}-{}",
        start.format("%Y_%m_%d_%H%M"),
        end.format("%Y_%m_%d_%H%M")
    )
}

/// The date format used for run directories, e.g. "2017-07-09".
pub fn run_date_string(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd(2015, 1, 17).and_hms(7, 0, 0);
        assert_eq!(dt("2015/01/17 07:00:00"), expected);
        assert_eq!(dt("2015-01-17T07:00:00"), expected);
        assert_eq!(dt("2015-01-17 07:00:00"), expected);
        assert_eq!(dt("2015-01-17"), NaiveDate::from_ymd(2015, 1, 17).and_hms(0, 0, 0));
        assert_eq!(dt("2015/01/17"), NaiveDate::from_ymd(2015, 1, 17).and_hms(0, 0, 0));
        assert!(parse_timestamp("17/01/2015").is_err());
        assert!(parse_timestamp("2015/13/01 00:00:00").is_err());
    }

    #[test]
    fn test_daily_expansion() {
        let instants = expand_range(dt("2017-07-09"), dt("2017-07-11"), Cadence::Daily).unwrap();
        assert_eq!(
            instants,
            vec![dt("2017-07-09"), dt("2017-07-10"), dt("2017-07-11")]
        );
    }

    #[test]
    fn test_daily_expansion_counts_calendar_days() {
        // The time of day doesn't change how many days are covered.
        let start = dt("2017/02/27 18:30:00");
        let end = dt("2017/03/02 01:00:00");
        let instants = expand_range(start, end, Cadence::Daily).unwrap();
        assert_eq!(instants.len() as i64, (end.date() - start.date()).num_days() + 1);
        assert_eq!(instants.len(), 4);
        for pair in instants.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
        assert_eq!(instants[3], dt("2017/03/02 18:30:00"));
    }

    #[test]
    fn test_single_instant() {
        let t = dt("2015/01/17 07:00:00");
        assert_eq!(expand_range(t, t, Cadence::Daily).unwrap(), vec![t]);
        let every = Cadence::Every(Duration::seconds(12));
        assert_eq!(expand_range(t, t, every).unwrap(), vec![t]);
    }

    #[test]
    fn test_fixed_cadence_expansion() {
        let start = dt("2015/01/17 07:00:00");
        let end = dt("2015/01/17 07:01:00");
        let instants = expand_range(start, end, "12".parse().unwrap()).unwrap();
        assert_eq!(instants.len(), 6);
        assert_eq!(instants[5], end);

        // The end isn't included when the step overshoots it.
        let end = dt("2015/01/17 07:00:59");
        let instants = expand_range(start, end, "12".parse().unwrap()).unwrap();
        assert_eq!(instants.len(), 5);
        assert_eq!(*instants.last().unwrap(), dt("2015/01/17 07:00:48"));
    }

    #[test]
    fn test_bad_ranges() {
        let result = expand_range(dt("2017-07-11"), dt("2017-07-09"), Cadence::Daily);
        assert!(matches!(result, Err(TimeError::InvalidRange { .. })));

        let t = dt("2017-07-11");
        let result = expand_range(t, t, Cadence::Every(Duration::zero()));
        assert_eq!(result, Err(TimeError::ZeroCadence));
    }

    #[test]
    fn test_parse_cadence() {
        assert_eq!("daily".parse::<Cadence>().unwrap(), Cadence::Daily);
        assert_eq!(
            "3600".parse::<Cadence>().unwrap(),
            Cadence::Every(Duration::hours(1))
        );
        assert_eq!("0".parse::<Cadence>(), Err(TimeError::ZeroCadence));
        assert_eq!(
            "9223372036854775807".parse::<Cadence>(),
            Err(TimeError::CadenceTooLong(i64::MAX))
        );
        assert!("hourly".parse::<Cadence>().is_err());
    }

    #[test]
    fn test_step_past_the_last_date() {
        let start = dt("2017-07-09");
        let end = dt("2017-07-10");
        let huge = Cadence::Every(Duration::days(1_000_000_000));
        assert_eq!(expand_range(start, end, huge).unwrap(), vec![start]);
    }

    #[test]
    fn test_frame_stamps() {
        let t = dt("2015/01/17 07:00:12");
        assert_eq!(frame_stamp(&t), "2015_01_17_07_00_12");
        assert_eq!(parse_frame_stamp("2015_01_17_07_00_12_AIA_171.png"), Some(t));
        assert_eq!(parse_frame_stamp("2015_01_17_07_00_12_HMI_Mag.png"), Some(t));
        assert_eq!(parse_frame_stamp("notes.txt"), None);
        assert_eq!(display_stamp(&t), "2015/01/17   07:00:12");
    }

    #[test]
    fn test_movie_span_name() {
        let name = movie_span_name(&dt("2015/01/17 07:00:00"), &dt("2015/01/17 08:30:00"));
        assert_eq!(name, "2015_01_17_0700-2015_01_17_0830");
    }
}
