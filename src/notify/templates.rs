use std::fmt::Write;

use crate::models::{Day, Discipline, DisciplineStatus, User};
use crate::notify::Email;
use crate::streak::STREAK_THRESHOLD_PERCENT;

fn plural(n: u32, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Evening nudge for a day that is still below the threshold.
pub fn reminder(user: &User, discipline: &Discipline, day: &Day) -> Email {
    let rate = day.completion();
    let needed = rate.remaining_for_streak();

    let mut text = format!("Hi {},\n\n", user.name);
    let _ = writeln!(
        text,
        "You have completed {} of {} tasks for \"{}\" today ({}%).",
        rate.completed, rate.total, discipline.name, rate.percent()
    );
    let _ = writeln!(
        text,
        "Finish {} more to reach {}% and keep your {}-day streak going.\n",
        plural(needed, "task"),
        STREAK_THRESHOLD_PERCENT,
        discipline.current_streak
    );
    let _ = writeln!(text, "Still open:");
    for task in day.pending_tasks() {
        let _ = writeln!(text, "  - {}", task.name);
    }

    Email {
        to: user.email.clone(),
        subject: format!("{}: {} left today", discipline.name, plural(needed, "task")),
        text,
    }
}

/// Summary of the day that just ended.
pub fn daily_report(user: &User, discipline: &Discipline, day: &Day) -> Email {
    let rate = day.completion();
    let verdict = if rate.is_streak_day() {
        "counted towards your streak"
    } else {
        "did not reach the streak threshold"
    };

    let mut text = format!("Hi {},\n\n", user.name);
    let _ = writeln!(
        text,
        "On {} you completed {} of {} tasks ({}%), which {}.",
        day.date.format("%A, %B %-d"),
        rate.completed,
        rate.total,
        rate.percent(),
        verdict
    );
    let _ = writeln!(
        text,
        "Current streak: {}. Longest streak: {}.",
        plural(discipline.current_streak, "day"),
        plural(discipline.longest_streak, "day")
    );
    let remaining_days = (discipline.end_date - day.date).num_days();
    if remaining_days > 0 {
        let _ = writeln!(text, "{} left in \"{}\".", plural(remaining_days as u32, "day"), discipline.name);
    }

    Email {
        to: user.email.clone(),
        subject: format!("{} report for {}", discipline.name, day.date),
        text,
    }
}

/// Sent once when a discipline's date range is over.
pub fn discipline_closed(user: &User, discipline: &Discipline, streak_days: u32) -> Email {
    let total_days = ((discipline.end_date - discipline.start_date).num_days() + 1).max(0) as u32;
    let headline = match discipline.status {
        DisciplineStatus::Completed => "Congratulations, you completed",
        _ => "Time is up for",
    };

    let mut text = format!("Hi {},\n\n", user.name);
    let _ = writeln!(text, "{} \"{}\".", headline, discipline.name);
    let _ = writeln!(
        text,
        "You hit your daily goal on {} of {} days; your longest streak was {}.",
        streak_days,
        total_days,
        plural(discipline.longest_streak, "day")
    );

    Email {
        to: user.email.clone(),
        subject: format!("{} has ended", discipline.name),
        text,
    }
}
