use crate::clock::Clock;
use crate::errors::{AppError, AppResult};
use crate::models::{NewNotification, NotificationKind, NotificationPreferences, ReminderFrequency};
use crate::notification_store::NotificationStore;
use chrono::{DateTime, Days, NaiveDate, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Duration;

pub const DAILY_REMINDER_TITLE: &str = "Daily Reminder";
pub const WEEKLY_REMINDER_TITLE: &str = "Weekly Reminder";
const DAILY_REMINDER_MESSAGE: &str = "Don't forget to log your activities for today!";
const WEEKLY_REMINDER_MESSAGE: &str = "Don't forget to review your activities for this week!";
const MAX_SKIPPED_DAYS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Disarmed,
    Armed {
        fire_at: DateTime<Utc>,
        frequency: ReminderFrequency,
    },
}

pub fn next_fire_at(
    preferences: &NotificationPreferences,
    clock: &dyn Clock,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    period_days(preferences)?;
    let today = clock.local_date(now);
    (0..=MAX_SKIPPED_DAYS)
        .filter_map(|offset| fire_on(preferences, clock, today, offset))
        .find(|candidate| *candidate > now)
}

pub fn following_fire_at(
    preferences: &NotificationPreferences,
    clock: &dyn Clock,
    fired_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let period = period_days(preferences)?;
    let fired_on = clock.local_date(fired_at);
    match fire_on(preferences, clock, fired_on, period) {
        Some(next) if next > now => Some(next),
        _ => next_fire_at(preferences, clock, now),
    }
}

fn fire_on(
    preferences: &NotificationPreferences,
    clock: &dyn Clock,
    base: NaiveDate,
    offset_days: u64,
) -> Option<DateTime<Utc>> {
    let date = base.checked_add_days(Days::new(offset_days))?;
    clock.resolve_local(date, preferences.reminder_time.as_naive_time())
}

fn period_days(preferences: &NotificationPreferences) -> Option<u64> {
    if !preferences.enabled {
        return None;
    }
    match preferences.reminder_frequency {
        ReminderFrequency::Daily => Some(1),
        ReminderFrequency::Weekly => Some(7),
        ReminderFrequency::None => None,
    }
}

fn reminder_notification(frequency: ReminderFrequency) -> NewNotification {
    match frequency {
        ReminderFrequency::Weekly => NewNotification::new(
            WEEKLY_REMINDER_TITLE,
            WEEKLY_REMINDER_MESSAGE,
            NotificationKind::Info,
        ),
        _ => NewNotification::new(
            DAILY_REMINDER_TITLE,
            DAILY_REMINDER_MESSAGE,
            NotificationKind::Info,
        ),
    }
}

struct TimerSlot {
    state: ReminderState,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    watcher: Option<JoinHandle<()>>,
    applied: Option<NotificationPreferences>,
}

impl TimerSlot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.state = ReminderState::Disarmed;
    }
}

struct SchedulerCore {
    notifications: NotificationStore,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    slot: Mutex<TimerSlot>,
}

impl SchedulerCore {
    fn slot(&self) -> MutexGuard<'_, TimerSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SchedulerCore {
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(watcher) = slot.watcher.take() {
            watcher.abort();
        }
        slot.cancel_timer();
    }
}

#[derive(Clone)]
pub struct ReminderScheduler {
    core: Arc<SchedulerCore>,
}

impl ReminderScheduler {
    pub fn new(notifications: NotificationStore, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            AppError::Usage("reminder scheduler must be created inside a tokio runtime".to_string())
        })?;
        Ok(Self {
            core: Arc::new(SchedulerCore {
                notifications,
                clock,
                runtime,
                slot: Mutex::new(TimerSlot {
                    state: ReminderState::Disarmed,
                    generation: 0,
                    timer: None,
                    watcher: None,
                    applied: None,
                }),
            }),
        })
    }

    pub fn start(&self) {
        let mut receiver = self.core.notifications.subscribe();
        self.sync();

        let weak = Arc::downgrade(&self.core);
        let watcher = self.core.runtime.spawn(async move {
            while receiver.changed().await.is_ok() {
                let preferences = receiver.borrow_and_update().preferences.clone();
                let Some(core) = weak.upgrade() else {
                    break;
                };
                ReminderScheduler { core }.sync_with(&preferences);
            }
        });

        let mut slot = self.core.slot();
        if let Some(previous) = slot.watcher.replace(watcher) {
            previous.abort();
        }
    }

    pub fn sync(&self) -> ReminderState {
        let preferences = self.core.notifications.preferences();
        self.sync_with(&preferences)
    }

    fn sync_with(&self, preferences: &NotificationPreferences) -> ReminderState {
        let unchanged = {
            let slot = self.core.slot();
            slot.applied
                .as_ref()
                .is_some_and(|applied| !applied.schedule_differs(preferences))
        };
        if unchanged {
            return self.state();
        }
        self.apply(preferences)
    }

    fn apply(&self, preferences: &NotificationPreferences) -> ReminderState {
        let now = self.core.clock.now();
        let mut slot = self.core.slot();
        slot.cancel_timer();
        slot.applied = Some(preferences.clone());

        match next_fire_at(preferences, self.core.clock.as_ref(), now) {
            Some(fire_at) => self.arm(&mut slot, fire_at, preferences.reminder_frequency, now),
            None => tracing::info!(
                enabled = preferences.enabled,
                frequency = ?preferences.reminder_frequency,
                "reminder disarmed"
            ),
        }
        slot.state
    }

    pub fn state(&self) -> ReminderState {
        self.core.slot().state
    }

    pub fn shutdown(&self) -> bool {
        let mut slot = self.core.slot();
        let active = slot.watcher.is_some() || slot.timer.is_some();
        if let Some(watcher) = slot.watcher.take() {
            watcher.abort();
        }
        slot.cancel_timer();
        slot.applied = None;
        if active {
            tracing::info!("reminder scheduler shut down");
        }
        active
    }

    fn arm(
        &self,
        slot: &mut TimerSlot,
        fire_at: DateTime<Utc>,
        frequency: ReminderFrequency,
        now: DateTime<Utc>,
    ) {
        let delay = (fire_at - now).to_std().unwrap_or(Duration::ZERO);
        let generation = slot.generation;
        let weak: Weak<SchedulerCore> = Arc::downgrade(&self.core);

        slot.timer = Some(self.core.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(core) = weak.upgrade() {
                ReminderScheduler { core }.fire(generation);
            }
        }));
        slot.state = ReminderState::Armed { fire_at, frequency };
        tracing::info!(
            fire_at = %fire_at,
            frequency = ?frequency,
            delay_secs = delay.as_secs(),
            "reminder armed"
        );
    }

    fn fire(&self, generation: u64) {
        let now = self.core.clock.now();
        let mut slot = self.core.slot();
        if slot.generation != generation {
            return;
        }
        let ReminderState::Armed { fire_at, .. } = slot.state else {
            return;
        };
        // Detach rather than abort: this is the running timer task.
        slot.timer = None;
        slot.generation = slot.generation.wrapping_add(1);
        slot.state = ReminderState::Disarmed;

        let preferences = self.core.notifications.preferences();
        if period_days(&preferences).is_none() {
            tracing::info!("reminder due but preferences no longer schedule one");
            slot.applied = Some(preferences);
            return;
        }

        let notification = self
            .core
            .notifications
            .add(reminder_notification(preferences.reminder_frequency));
        tracing::info!(notification_id = %notification.id, fire_at = %fire_at, "reminder fired");

        if let Some(next) = following_fire_at(&preferences, self.core.clock.as_ref(), fire_at, now) {
            self.arm(&mut slot, next, preferences.reminder_frequency, now);
        }
    }
}
