//! Periodic notifier (spec.md §4.8): a cooperative poller that emits
//! at-most-once reminders. Loop shape grounded in
//! `Xevion-Banner/src/scraper/scheduler.rs`'s `tokio::select!` +
//! `broadcast::Receiver<()>` shutdown pattern; job semantics grounded in
//! `original_source/internal/notifications/meeting_reminder.go`
//! (register/invite reminders have no Go counterpart in the retrieved
//! pack and are built directly from spec.md §4.8).

pub mod jobs;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time;
use tracing::{info, warn};

use crate::chat::ChatAdapter;
use crate::repo::{MeetingRepo, UserRepo};
use crate::utils::log_if_slow;

const SLOW_TICK_THRESHOLD: Duration = Duration::from_secs(5);

pub struct Notifier {
    meetings: Arc<dyn MeetingRepo>,
    users: Arc<dyn UserRepo>,
    chat: Arc<dyn ChatAdapter>,
    poll_interval: Duration,
    date_upcoming_in: Duration,
    registration_reminder_in: Duration,
    invite_reminder_in: Duration,
}

impl Notifier {
    pub fn new(
        meetings: Arc<dyn MeetingRepo>,
        users: Arc<dyn UserRepo>,
        chat: Arc<dyn ChatAdapter>,
        poll_interval: Duration,
        date_upcoming_in: Duration,
        registration_reminder_in: Duration,
        invite_reminder_in: Duration,
    ) -> Self {
        Self {
            meetings,
            users,
            chat,
            poll_interval,
            date_upcoming_in,
            registration_reminder_in,
            invite_reminder_in,
        }
    }

    /// Runs the poll loop until `shutdown_rx` fires. Each job's errors are
    /// logged and skipped; one job failing never stops the others or the
    /// loop itself (spec.md §7: notifier jobs never abort the loop).
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!("notifier started");
        let mut interval = time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let tick_start = Instant::now();
                    if let Err(e) = jobs::meeting_reminder(&*self.meetings, &*self.chat, self.date_upcoming_in).await {
                        warn!(error = %e, "meeting reminder tick failed");
                    }
                    if let Err(e) = jobs::register_reminder(&*self.users, &*self.chat, self.registration_reminder_in).await {
                        warn!(error = %e, "register reminder tick failed");
                    }
                    if let Err(e) = jobs::invite_reminder(&*self.users, &*self.chat, self.invite_reminder_in).await {
                        warn!(error = %e, "invite reminder tick failed");
                    }
                    log_if_slow(tick_start, SLOW_TICK_THRESHOLD, "notifier tick");
                }
                _ = shutdown_rx.recv() => {
                    info!("notifier shutting down");
                    break;
                }
            }
        }
    }
}
