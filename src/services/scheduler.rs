use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::services::jobs::DailyJobs;

const ROLLOVER_ATTEMPTS: u32 = 3;
const ROLLOVER_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledJob {
    Rollover,
    Reminders,
}

/// Fires the rollover at local midnight and reminders once a day at
/// `reminder_time`.
pub struct JobScheduler {
    jobs: DailyJobs,
    clock: Arc<dyn Clock>,
    reminder_time: NaiveTime,
}

impl JobScheduler {
    pub fn new(jobs: DailyJobs, clock: Arc<dyn Clock>, reminder_time: NaiveTime) -> Self {
        Self {
            jobs,
            clock,
            reminder_time,
        }
    }

    /// Runs forever. Rolls over once at startup so a process started after
    /// midnight still opens today's logs.
    pub async fn start(self) {
        info!(
            "Starting job scheduler (rollover at midnight, reminders at {})",
            self.reminder_time
        );

        self.run(ScheduledJob::Rollover, self.clock.today()).await;

        let mut last = None;
        loop {
            let now = self.clock.now();
            let (job, at) = next_slot(now, self.reminder_time, last);
            let wait = (at - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            // the date comes from the slot, not from the wake-up time
            self.run(job, at.date()).await;
            last = Some((job, at));
        }
    }

    async fn run(&self, job: ScheduledJob, date: NaiveDate) {
        match job {
            ScheduledJob::Rollover => self.rollover(date).await,
            ScheduledJob::Reminders => match self.jobs.send_reminders(date).await {
                Ok(stats) => info!(
                    "Reminders {} - sent {}, failed {}",
                    date, stats.reminders_sent, stats.emails_failed
                ),
                Err(e) => warn!("Reminders for {} failed: {:?}", date, e),
            },
        }
    }

    /// Reruns the rollover while disciplines are left behind. Each run only
    /// touches what the previous one did not finish.
    async fn rollover(&self, date: NaiveDate) {
        for attempt in 1..=ROLLOVER_ATTEMPTS {
            match self.jobs.rollover(date).await {
                Ok(stats) if stats.disciplines_errored == 0 => {
                    info!(
                        "Rollover {} - opened {} logs, {} completed, {} failed, {} emails",
                        date,
                        stats.logs_opened,
                        stats.disciplines_completed,
                        stats.disciplines_failed,
                        stats.emails_sent
                    );
                    return;
                }
                Ok(stats) => warn!(
                    "Rollover {} attempt {} left {} disciplines behind",
                    date, attempt, stats.disciplines_errored
                ),
                Err(e) => warn!("Rollover {} attempt {} failed: {:?}", date, attempt, e),
            }
            if attempt < ROLLOVER_ATTEMPTS {
                tokio::time::sleep(ROLLOVER_RETRY_DELAY).await;
            }
        }
    }
}

/// Like `next_run`, but never hands out the slot that just ran, which a
/// clock stepped backwards would otherwise repeat.
pub fn next_slot(
    now: NaiveDateTime,
    reminder_time: NaiveTime,
    last: Option<(ScheduledJob, NaiveDateTime)>,
) -> (ScheduledJob, NaiveDateTime) {
    let slot = next_run(now, reminder_time);
    match last {
        Some((_, ran_at)) if slot.1 <= ran_at => next_run(ran_at, reminder_time),
        _ => slot,
    }
}

/// The next job after `now` and when it is due.
pub fn next_run(now: NaiveDateTime, reminder_time: NaiveTime) -> (ScheduledJob, NaiveDateTime) {
    let today = now.date();
    let next_midnight = (today + Days::new(1)).and_time(NaiveTime::MIN);

    let mut reminder_at = today.and_time(reminder_time);
    if reminder_at <= now {
        reminder_at = reminder_at + Days::new(1);
    }

    if reminder_at < next_midnight {
        (ScheduledJob::Reminders, reminder_at)
    } else {
        (ScheduledJob::Rollover, next_midnight)
    }
}
