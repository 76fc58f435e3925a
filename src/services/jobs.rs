use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::db::{days, disciplines, users};
use crate::error::AppError;
use crate::lifecycle::{self, Transition};
use crate::models::{Discipline, DisciplineStatus, User};
use crate::notify::{Email, Notifier, templates};
use crate::services::tracker;
use crate::streak;

/// Nightly and evening work: opening and closing day logs, streak
/// maintenance and the emails that go with them.
pub struct DailyJobs {
    db: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RolloverStats {
    pub disciplines_started: usize,
    pub logs_opened: usize,
    pub disciplines_completed: usize,
    pub disciplines_failed: usize,
    pub disciplines_errored: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderStats {
    pub reminders_sent: usize,
    pub emails_failed: usize,
}

impl DailyJobs {
    pub fn new(db: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Moves every active discipline to `today`. Safe to run more than once
    /// for the same date.
    pub async fn rollover(&self, today: NaiveDate) -> Result<RolloverStats, AppError> {
        info!("Starting rollover for {}", today);
        let mut stats = RolloverStats::default();

        let active = {
            let mut conn = self.db.acquire().await?;
            disciplines::fetch_active_disciplines(&mut conn).await?
        };

        // a failing discipline rolls back alone, the rest still move on
        for discipline in active {
            let id = discipline.id.clone();
            let step = lifecycle::transition(discipline.start_date, discipline.end_date, today);
            let result = match step {
                Transition::Wait => Ok(()),
                Transition::Run => self.advance(discipline, today, &mut stats).await,
                Transition::Close => self.close(discipline, &mut stats).await,
            };
            if let Err(e) = result {
                warn!("Rollover of discipline {} for {} failed: {}", id, today, e);
                stats.disciplines_errored += 1;
            }
        }

        info!("Rollover for {} completed: {:?}", today, stats);
        Ok(stats)
    }

    /// Opens today's log, settles yesterday into the streak and reports on it.
    async fn advance(
        &self,
        mut discipline: Discipline,
        today: NaiveDate,
        stats: &mut RolloverStats,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let (_, opened) = match tracker::ensure_day(&mut tx, &discipline, today).await {
            Ok(result) => result,
            Err(AppError::Conflict(msg)) => {
                warn!("Skipping discipline {}: {}", discipline.id, msg);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        tracker::refresh_streak(&mut tx, &mut discipline, today).await?;

        let yesterday = match today.pred_opt() {
            Some(date) => days::find_discipline_day(&mut tx, &discipline, date).await?,
            None => None,
        };
        let recipient = recipient(&mut tx, &discipline.user_id).await?;
        tx.commit().await?;

        if !opened {
            return Ok(());
        }
        stats.logs_opened += 1;
        if discipline.start_date == today {
            info!("Discipline {} starts today", discipline.id);
            stats.disciplines_started += 1;
        }

        if let (Some(day), Some(user)) = (yesterday, recipient) {
            let email = templates::daily_report(&user, &discipline, &day);
            self.deliver(&email, &mut stats.emails_sent, &mut stats.emails_failed)
                .await;
        }
        Ok(())
    }

    /// Final streak and verdict for a discipline past its end date.
    async fn close(
        &self,
        mut discipline: Discipline,
        stats: &mut RolloverStats,
    ) -> Result<(), AppError> {
        let (start, end) = (discipline.start_date, discipline.end_date);

        let mut tx = self.db.begin().await?;
        let history = tracker::load_history(&mut tx, &discipline.id).await?;
        // the streak as it stood the morning after the last day
        let settled_on = end.succ_opt().unwrap_or(end);
        let final_streak = streak::recompute_streak(&history, settled_on);
        tracker::store_streak(&mut tx, &mut discipline, final_streak).await?;

        let status = lifecycle::closing_status(&history, start, end);
        disciplines::set_status(&mut tx, &discipline.id, status).await?;
        discipline.status = status;
        let recipient = recipient(&mut tx, &discipline.user_id).await?;
        tx.commit().await?;

        info!(
            "Discipline {} ended as {:?} with streak {:?}",
            discipline.id, status, final_streak
        );
        match status {
            DisciplineStatus::Completed => stats.disciplines_completed += 1,
            DisciplineStatus::Failed => stats.disciplines_failed += 1,
            DisciplineStatus::Active => {}
        }

        if let Some(user) = recipient {
            let streak_days = streak::streak_days_between(&history, start, end);
            let email = templates::discipline_closed(&user, &discipline, streak_days);
            self.deliver(&email, &mut stats.emails_sent, &mut stats.emails_failed)
                .await;
        }
        Ok(())
    }

    /// Emails every user whose log for `today` is still below the threshold.
    pub async fn send_reminders(&self, today: NaiveDate) -> Result<ReminderStats, AppError> {
        info!("Sending reminders for {}", today);
        let mut stats = ReminderStats::default();
        let mut conn = self.db.acquire().await?;

        let running: Vec<Discipline> = disciplines::fetch_active_disciplines(&mut conn)
            .await?
            .into_iter()
            .filter(|d| d.covers(today))
            .collect();

        for discipline in running {
            let Some(day) = days::find_discipline_day(&mut conn, &discipline, today).await? else {
                continue;
            };
            if day.tasks.is_empty() || day.completion().is_streak_day() {
                continue;
            }
            let Some(user) = recipient(&mut conn, &discipline.user_id).await? else {
                continue;
            };

            let email = templates::reminder(&user, &discipline, &day);
            self.deliver(&email, &mut stats.reminders_sent, &mut stats.emails_failed)
                .await;
        }

        info!("Reminders for {} completed: {:?}", today, stats);
        Ok(stats)
    }

    async fn deliver(&self, email: &Email, sent: &mut usize, failed: &mut usize) {
        match self.notifier.send(email).await {
            Ok(()) => *sent += 1,
            Err(e) => {
                warn!("Failed to send \"{}\" to {}: {}", email.subject, email.to, e);
                *failed += 1;
            }
        }
    }
}

/// The owner of a discipline, if they accept emails.
async fn recipient(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<User>, AppError> {
    Ok(users::find_user(conn, user_id)
        .await?
        .filter(|u| u.email_notifications))
}
