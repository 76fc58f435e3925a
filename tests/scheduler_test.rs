use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use streakify::clock::FixedClock;
use streakify::db;
use streakify::models::{NewDisciplineRequest, NewTaskRequest, NewUserRequest, Priority};
use streakify::notify::NoopNotifier;
use streakify::services::{DailyJobs, JobScheduler, Tracker};

#[tokio::test]
async fn test_scheduler_initialization() {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    let jobs = DailyJobs::new(pool, Arc::new(NoopNotifier));
    let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()));

    // constructed only, never started
    let _scheduler = JobScheduler::new(jobs, clock, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
}

#[tokio::test]
async fn test_scheduler_rolls_over_on_startup() {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    db::migrate(&pool).await.expect("Failed to run migrations");

    let created_on = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
    let started_on = NaiveDate::from_ymd_opt(2026, 10, 2).unwrap();

    let user = {
        let mut conn = pool.acquire().await.unwrap();
        db::users::insert_user(
            &mut conn,
            NewUserRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
        )
        .await
        .unwrap()
    };
    let tracker = Tracker::new(pool.clone());
    tracker
        .create_discipline(
            &user.id,
            NewDisciplineRequest {
                name: "Stretching".to_string(),
                description: Some("Ten minutes after waking up".to_string()),
                start_date: started_on,
                end_date: NaiveDate::from_ymd_opt(2026, 10, 31).unwrap(),
                tasks: vec![NewTaskRequest {
                    name: "Stretch".to_string(),
                    priority: Priority::High,
                }],
            },
            created_on,
        )
        .await
        .expect("Failed to create discipline");

    let jobs = DailyJobs::new(pool.clone(), Arc::new(NoopNotifier));
    let clock = Arc::new(FixedClock::on(started_on));
    let scheduler = JobScheduler::new(jobs, clock, NaiveTime::from_hms_opt(20, 0, 0).unwrap());

    let scheduler_task = tokio::spawn(async move {
        scheduler.start().await;
    });

    // the startup rollover runs before the first sleep
    tokio::time::sleep(Duration::from_millis(300)).await;
    scheduler_task.abort();

    let today = tracker
        .today(&user.id, started_on)
        .await
        .expect("today's log should have been opened");
    assert_eq!(today.day.tasks.len(), 1);
    assert_eq!(today.day.tasks[0].name, "Stretch");
}
