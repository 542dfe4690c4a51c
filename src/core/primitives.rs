use chrono::{DateTime, Utc};

use crate::error::{OverlayError, OverlayResult};

/// Ticks (100 ns) between 0001-01-01T00:00:00Z and the Unix epoch.
pub const TICKS_AT_UNIX_EPOCH: f64 = 621_355_968_000_000_000.0;
pub const TICKS_PER_MILLISECOND: f64 = 10_000.0;

/// Encodes a UTC instant as high-resolution ticks, the x-axis domain unit of
/// time-series charts.
#[must_use]
pub fn datetime_to_ticks(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 * TICKS_PER_MILLISECOND + TICKS_AT_UNIX_EPOCH
}

/// Inverse of [`datetime_to_ticks`], truncated to millisecond precision.
pub fn ticks_to_datetime(ticks: f64) -> OverlayResult<DateTime<Utc>> {
    if !ticks.is_finite() {
        return Err(OverlayError::InvalidData("ticks must be finite".to_owned()));
    }
    let millis = ((ticks - TICKS_AT_UNIX_EPOCH) / TICKS_PER_MILLISECOND).round();
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .ok_or_else(|| OverlayError::InvalidData(format!("ticks {ticks} out of range")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn unix_epoch_maps_to_epoch_tick_offset() {
        let epoch = Utc.timestamp_opt(0, 0).single().expect("epoch");
        assert_eq!(datetime_to_ticks(epoch), TICKS_AT_UNIX_EPOCH);
    }

    #[test]
    fn ticks_round_trip_at_millisecond_precision() {
        let time = Utc
            .with_ymd_and_hms(2025, 3, 14, 15, 9, 26)
            .single()
            .expect("time");
        let recovered = ticks_to_datetime(datetime_to_ticks(time)).expect("from ticks");
        assert_eq!(recovered, time);
    }
}
