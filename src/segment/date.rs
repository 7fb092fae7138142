/*!
# Date Segments

`<?gen.date order=XXX type=TTT start=MM/DD/YYYY time=HH:MM:SS save=VVV ?>`

Computes a day offset the same way value segments compute integers, adds it
to the configured start date and renders the result in one of the fixed
layouts:

* `mdy` - `M/D/YYYY`, no zero padding (the default)
* `ymd` - `YYYYMMDD`
* `ymdh` - `YYYY-MM-DD`
* `ymdt` - `YYYY-MM-DDTHH:MM:SS`
* `oagi` - `<YEAR>..</YEAR><MONTH>..</MONTH>...<TIMEZONE>..</TIMEZONE>`
  element run with zero-padded fields, four-digit subseconds and the local
  timezone offset in centi-hours

Start date and time fields accept `$VAR` expansion. Out-of-range months and
days are folded back into the calendar (modulo 12 and 31), and a day like
`2/31` rolls forward into March, so template authors never see a hard error
from a computed start date.
*/

use std::io::Write;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Offset, Timelike};
use tracing::warn;

use crate::core::GenError;
use crate::segment::common::{warn_unrecognized, DecodeError, Distribution, SegmentCore};
use crate::vars::VarTable;

/// Output layout for a date segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    Mdy,
    Ymd,
    YmdHyphen,
    Ymdt,
    Oagi,
}

const DEFAULT_START: (i64, i64, i64) = (1, 1, 2000);
const DEFAULT_TIME: (i64, i64, i64) = (0, 0, 0);

#[derive(Debug)]
pub struct DateGen {
    core: SegmentCore,
    layout: DateLayout,
    /// Start date as (month, day, year), already folded into range.
    start: (i64, i64, i64),
    /// Start time as (hour, minute, second).
    time: (i64, i64, i64),
    /// Serial counter, advanced on every generate.
    count: i64,
}

impl DateGen {
    pub fn from_args(
        args: &str,
        id: u32,
        vars: &mut VarTable,
    ) -> Result<Option<Self>, DecodeError> {
        let mut core = SegmentCore::new("date", id);
        let Some(extras) = core.decode_args(args, vars)? else {
            return Ok(None);
        };
        let mut layout = DateLayout::Mdy;
        let mut start = DEFAULT_START;
        let mut time = DEFAULT_TIME;
        for (key, value) in &extras {
            match key.as_str() {
                "type" => match value.to_lowercase().as_str() {
                    "oagi" => layout = DateLayout::Oagi,
                    "mdy" => layout = DateLayout::Mdy,
                    "ymd" => layout = DateLayout::Ymd,
                    "ymdh" => layout = DateLayout::YmdHyphen,
                    "ymdt" => layout = DateLayout::Ymdt,
                    _ => warn!("invalid date format: {}", value),
                },
                "start" => start = decode_start(&mut core, value, vars),
                "time" => time = decode_time(&mut core, value, vars),
                _ => {
                    warn_unrecognized("date", key, value);
                    return Ok(None);
                }
            }
        }
        core.coerce_bounds();
        core.init_zipf(core.zipf_limit());
        Ok(Some(Self {
            core,
            layout,
            start,
            time,
            count: 0,
        }))
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn generate(
        &mut self,
        context: i64,
        vars: &mut VarTable,
        out: &mut dyn Write,
    ) -> Result<u64, GenError> {
        let raw = match self.core.dist {
            Distribution::Serial => self.count,
            Distribution::Random => self.core.uniform_long(),
            Distribution::Zipf => self.core.zipf_next(),
            // Context is the default; log order has no meaning for dates.
            _ => context,
        };
        // Day offsets wrap at 32 bits, like the integer calendar arithmetic
        // the benchmark templates were written against.
        let day_offset = self.core.transform(raw) as i32;
        self.count += 1;

        let stamp = self.start_datetime();
        let stamp = stamp
            .checked_add_signed(Duration::days(day_offset as i64))
            .unwrap_or_else(|| {
                warn!(
                    "date offset {} out of calendar range, using start date",
                    day_offset
                );
                self.start_datetime()
            });

        let rendered = self.render(stamp);
        self.core.save(vars, &rendered);
        self.core.write_bytes(out, rendered.as_bytes())
    }

    /// Start instant built leniently: the (already folded) month selects the
    /// first of that month and excess days roll forward, mirroring a lenient
    /// calendar.
    fn start_datetime(&self) -> NaiveDateTime {
        let (month, day, year) = self.start;
        let (hour, minute, second) = self.time;
        let date = NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid epoch"))
            + Duration::days(day - 1);
        date.and_hms_opt(
            hour.rem_euclid(24) as u32,
            minute.rem_euclid(60) as u32,
            second.rem_euclid(60) as u32,
        )
        .expect("time folded into range")
    }

    fn render(&self, stamp: NaiveDateTime) -> String {
        let (year, month, day) = (stamp.year(), stamp.month(), stamp.day());
        match self.layout {
            DateLayout::Mdy => format!("{}/{}/{}", month, day, year),
            DateLayout::Ymd => format!("{}{:02}{:02}", year, month, day),
            DateLayout::YmdHyphen => format!("{}-{:02}-{:02}", year, month, day),
            DateLayout::Ymdt => format!(
                "{}-{:02}-{:02}T{:02}:{:02}:{:02}",
                year,
                month,
                day,
                stamp.hour(),
                stamp.minute(),
                stamp.second()
            ),
            DateLayout::Oagi => {
                // Local offset in centi-hours, e.g. -500 for UTC-5.
                let offset_seconds = Local::now().offset().fix().local_minus_utc();
                format!(
                    "<YEAR>{}</YEAR><MONTH>{:02}</MONTH><DAY>{:02}</DAY>\
                     <HOUR>{:02}</HOUR><MINUTE>{:02}</MINUTE><SECOND>{:02}</SECOND>\
                     <SUBSECOND>0000</SUBSECOND><TIMEZONE>{}</TIMEZONE>",
                    year,
                    month,
                    day,
                    stamp.hour(),
                    stamp.minute(),
                    stamp.second(),
                    offset_seconds / 36
                )
            }
        }
    }
}

/// Decodes `start=MM/DD/YYYY`, folding month and day into calendar range.
fn decode_start(core: &mut SegmentCore, value: &str, vars: &VarTable) -> (i64, i64, i64) {
    let mut parts = value.splitn(3, '/');
    let (Some(m), Some(d), Some(y)) = (parts.next(), parts.next(), parts.next()) else {
        warn!("invalid start date {:?}, using default", value);
        return DEFAULT_START;
    };
    let month = (core.int_param(m, 1, vars) - 1).rem_euclid(12) + 1;
    let day = (core.int_param(d, 1, vars) - 1).rem_euclid(31) + 1;
    let year = core.int_param(y, 1950, vars);
    (month, day, year)
}

/// Decodes `time=HH:MM:SS`, folding fields into clock range.
fn decode_time(core: &mut SegmentCore, value: &str, vars: &VarTable) -> (i64, i64, i64) {
    let mut parts = value.splitn(3, ':');
    let (Some(h), Some(m), Some(s)) = (parts.next(), parts.next(), parts.next()) else {
        warn!("invalid time {:?}, using default", value);
        return DEFAULT_TIME;
    };
    let hour = core.int_param(h, 0, vars).rem_euclid(24);
    let minute = core.int_param(m, 0, vars).rem_euclid(60);
    let second = core.int_param(s, 0, vars).rem_euclid(60);
    (hour, minute, second)
}
