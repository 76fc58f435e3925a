use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streakify::api::router;
use streakify::clock::{Clock, SystemClock};
use streakify::config::Config;
use streakify::db;
use streakify::notify::{HttpNotifier, NoopNotifier, Notifier};
use streakify::services::{DailyJobs, JobScheduler};
use streakify::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "streakify=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new_from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await?;

    let notifier: Arc<dyn Notifier> = match config.mail.clone() {
        Some(mail) => {
            info!("Mail delivery through {}", mail.api_url);
            Arc::new(HttpNotifier::new(mail)?)
        }
        None => {
            info!("MAIL_API_URL, MAIL_API_TOKEN or MAIL_FROM not set, emails are disabled");
            Arc::new(NoopNotifier)
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if config.scheduler_enabled {
        let jobs = DailyJobs::new(pool.clone(), notifier.clone());
        let scheduler = JobScheduler::new(jobs, clock.clone(), config.reminder_time);
        tokio::spawn(scheduler.start());
    }

    let state = AppState {
        db: pool.clone(),
        notifier,
        clock,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
