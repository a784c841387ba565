use chrono::{DateTime, Duration, Local, TimeZone, Timelike};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{error::RelayError, host::HostEvent};

/// The wearable's own refresh request, fired on minute ticks that are a
/// multiple of the interval (the watch face asks every half hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    interval_minutes: u32,
}

impl RefreshSchedule {
    pub fn new(interval_minutes: u32) -> Result<Self, RelayError> {
        if interval_minutes == 0 || 60 % interval_minutes != 0 {
            return Err(RelayError::Config(format!(
                "refresh interval must divide an hour evenly, got {interval_minutes} minutes"
            )));
        }

        Ok(Self { interval_minutes })
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    /// First boundary strictly after `now`.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let into_slot = Duration::minutes(i64::from(now.minute() % self.interval_minutes))
            + Duration::seconds(i64::from(now.second()))
            + Duration::nanoseconds(i64::from(now.nanosecond()));

        now.clone() - into_slot + Duration::minutes(i64::from(self.interval_minutes))
    }

    /// Emit `MessageReceived` at every boundary until the host stops listening.
    pub async fn drive(self, events: mpsc::Sender<HostEvent>) {
        loop {
            let now = Local::now();
            let next = self.next_after(&now);
            let wait = (next - now).to_std().unwrap_or_default();
            debug!(next = %next, "next scheduled refresh request");

            tokio::time::sleep(wait).await;

            if events.send(HostEvent::MessageReceived).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, s).unwrap()
    }

    #[test]
    fn half_hour_boundaries() {
        let schedule = RefreshSchedule::new(30).unwrap();

        assert_eq!(schedule.next_after(&at(10, 12, 40)), at(10, 30, 0));
        assert_eq!(schedule.next_after(&at(10, 30, 0)), at(11, 0, 0));
        assert_eq!(schedule.next_after(&at(23, 45, 1)), Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn quarter_hour_boundaries() {
        let schedule = RefreshSchedule::new(15).unwrap();
        assert_eq!(schedule.next_after(&at(8, 44, 59)), at(8, 45, 0));
    }

    #[test]
    fn rejects_uneven_intervals() {
        assert!(RefreshSchedule::new(0).is_err());
        assert!(RefreshSchedule::new(45).is_err());
        assert_eq!(RefreshSchedule::new(60).unwrap().interval_minutes(), 60);
    }

    #[tokio::test]
    async fn drive_stops_when_host_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // First send fails after the sleep; paused time makes it immediate.
        tokio::time::pause();
        RefreshSchedule::new(1).unwrap().drive(tx).await;
    }
}
