//! Module containing functionality related to BSON datetimes.
//! For more information, see the documentation for the [`DateTime`] type.

use std::{
    fmt::{self, Display},
    time::{SystemTime, UNIX_EPOCH},
};

use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

/// Struct representing a BSON datetime: a signed 64-bit count of milliseconds
/// since the Unix epoch. BSON datetimes have millisecond precision; anything
/// finer is truncated (not rounded) on conversion into this type.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone)]
pub struct DateTime(i64);

impl DateTime {
    /// The latest possible date that can be represented in BSON.
    pub const MAX: Self = Self::from_millis(i64::MAX);

    /// The earliest possible date that can be represented in BSON.
    pub const MIN: Self = Self::from_millis(i64::MIN);

    /// Makes a new [`DateTime`] from the number of non-leap milliseconds since
    /// January 1, 1970 0:00:00 UTC (aka "UNIX timestamp").
    pub const fn from_millis(date: i64) -> Self {
        Self(date)
    }

    /// Returns a [`DateTime`] which corresponds to the current date and time.
    pub fn now() -> DateTime {
        Self::from_system_time(SystemTime::now())
    }

    /// Convert the given [`std::time::SystemTime`] to a [`DateTime`],
    /// truncating sub-millisecond precision.
    pub fn from_system_time(st: SystemTime) -> Self {
        match st.duration_since(UNIX_EPOCH) {
            Ok(duration) => Self::from_millis(duration.as_millis() as i64),
            // handle SystemTime from before the Unix epoch
            Err(e) => {
                let millis = e.duration().as_millis() as i64;
                // if the sub-millisecond part was truncated, the floor is one
                // more millisecond in the past
                let rem = e.duration().subsec_nanos() % 1_000_000;
                Self::from_millis(-millis - if rem > 0 { 1 } else { 0 })
            }
        }
    }

    /// Convert the given [`time::OffsetDateTime`] into a [`DateTime`],
    /// truncating sub-millisecond precision.
    pub fn from_time_0_3(dt: time::OffsetDateTime) -> Self {
        Self::from_millis(dt.unix_timestamp_nanos().div_euclid(1_000_000) as i64)
    }

    /// Convert this [`DateTime`] to a [`time::OffsetDateTime`].
    ///
    /// Fails if this value is outside of the date range [`time`] supports.
    pub fn to_time_0_3(self) -> Result<time::OffsetDateTime> {
        time::OffsetDateTime::from_unix_timestamp_nanos(self.0 as i128 * 1_000_000).map_err(|e| {
            Error::malformed_value(format!("datetime exceeds representable range: {e}"))
        })
    }

    /// Returns the number of non-leap milliseconds since January 1, 1970 UTC.
    pub const fn timestamp_millis(self) -> i64 {
        self.0
    }

    /// Convert the given RFC 3339 formatted string to a [`DateTime`],
    /// truncating sub-millisecond precision.
    pub fn parse_rfc3339_str(s: impl AsRef<str>) -> Result<Self> {
        let odt = time::OffsetDateTime::parse(s.as_ref(), &Rfc3339)
            .map_err(|e| Error::malformed_value(format!("invalid RFC 3339 datetime: {e}")))?;
        Ok(Self::from_time_0_3(odt))
    }

    /// Convert this [`DateTime`] to an RFC 3339 formatted string.
    ///
    /// Fails if this value is outside of the date range RFC 3339 can express.
    pub fn try_to_rfc3339_string(self) -> Result<String> {
        self.to_time_0_3()?
            .format(&Rfc3339)
            .map_err(|e| Error::malformed_value(format!("cannot format datetime: {e}")))
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tup = f.debug_tuple("DateTime");
        match self.to_time_0_3() {
            Ok(dt) => tup.field(&format!("{dt}")),
            _ => tup.field(&self.0),
        };
        tup.finish()
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_time_0_3() {
            Ok(dt) => Display::fmt(&dt, f),
            _ => write!(f, "{} ms since epoch", self.0),
        }
    }
}

impl From<SystemTime> for DateTime {
    fn from(st: SystemTime) -> Self {
        Self::from_system_time(st)
    }
}

impl From<time::OffsetDateTime> for DateTime {
    fn from(dt: time::OffsetDateTime) -> Self {
        Self::from_time_0_3(dt)
    }
}
