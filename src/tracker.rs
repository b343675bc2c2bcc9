use crate::activity_store::ActivityStore;
use crate::aggregation::classify;
use crate::clock::Clock;
use crate::config::TrackerSettings;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Activity, ActivityDraft, CarbonSummary, Category, NewNotification, Notification,
    NotificationKind, PreferencesPatch,
};
use crate::notification_store::NotificationStore;
use crate::reminder::{ReminderScheduler, ReminderState};
use crate::samples::{sample_activities, sample_notifications};
use std::sync::Arc;

const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";

pub struct CarbonTracker {
    activities: ActivityStore,
    notifications: NotificationStore,
    reminders: ReminderScheduler,
    clock: Arc<dyn Clock>,
}

impl CarbonTracker {
    pub fn start(settings: &TrackerSettings, clock: Arc<dyn Clock>) -> AppResult<Self> {
        if let Some(log_dir) = settings.log_dir.as_deref() {
            if let Err(error) = crate::init_tracing(log_dir, &settings.log_level) {
                tracing::warn!(error = %error, "tracing initialization skipped");
            }
        }

        let preferences = settings.notification_preferences.clone();
        let (activities, notifications) = if settings.seed_sample_data {
            (
                ActivityStore::with_activities(sample_activities())?,
                NotificationStore::with_feed(
                    sample_notifications(clock.now()),
                    preferences,
                    clock.clone(),
                ),
            )
        } else {
            (
                ActivityStore::new(),
                NotificationStore::new(preferences, clock.clone()),
            )
        };

        let reminders = ReminderScheduler::new(notifications.clone(), clock.clone())?;
        reminders.start();

        tracing::info!(
            activity_count = activities.list().len(),
            notification_count = notifications.notifications().len(),
            reminder = ?reminders.state(),
            "carbon tracker started"
        );

        Ok(Self {
            activities,
            notifications,
            reminders,
            clock,
        })
    }

    pub fn activities(&self) -> &ActivityStore {
        &self.activities
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    pub fn log_activity(&self, draft: &ActivityDraft) -> AppResult<Activity> {
        let result = draft.parse().and_then(|activity| self.activities.add(activity));
        match &result {
            Ok(activity) => {
                self.notifications.add(NewNotification::new(
                    "Activity Logged",
                    format!("You've successfully logged {}", activity.r#type),
                    NotificationKind::Success,
                ));
            }
            Err(error) => {
                tracing::warn!(error = %error, "activity rejected");
                self.notifications.add(NewNotification::new(
                    "Error",
                    error.detail(),
                    NotificationKind::Error,
                ));
            }
        }
        result
    }

    pub fn quick_log(
        &self,
        activity_type: &str,
        carbon_value: &str,
        category: Category,
    ) -> AppResult<Activity> {
        if activity_type.trim().is_empty() || carbon_value.trim().is_empty() {
            self.notifications.add(NewNotification::new(
                "Error",
                MISSING_FIELDS_MESSAGE,
                NotificationKind::Error,
            ));
            return Err(AppError::InvalidInput(MISSING_FIELDS_MESSAGE.to_string()));
        }

        let draft = ActivityDraft {
            r#type: activity_type.trim().to_string(),
            description: format!("Quick log: {}", activity_type.trim()),
            carbon_value: carbon_value.to_string(),
            date: self.clock.today().format("%Y-%m-%d").to_string(),
            category: category.as_str().to_string(),
        };
        self.log_activity(&draft)
    }

    pub fn update_preferences(&self, patch: PreferencesPatch) -> ReminderState {
        self.notifications.update_preferences(patch);
        self.reminders.sync()
    }

    pub fn share_progress(&self) -> Notification {
        self.notifications.add(NewNotification::new(
            "Progress Shared",
            "Your carbon footprint summary has been saved!",
            NotificationKind::Success,
        ))
    }

    pub fn summary(&self) -> CarbonSummary {
        let snapshot = self.activities.snapshot();
        let level = classify(snapshot.view.total_carbon);
        CarbonSummary {
            total_carbon: snapshot.view.total_carbon,
            activity_count: snapshot.activities.len(),
            level,
            message: level.message().to_string(),
        }
    }

    pub fn shutdown(&self) {
        if self.reminders.shutdown() {
            tracing::info!("carbon tracker stopped");
        }
    }
}

impl Drop for CarbonTracker {
    fn drop(&mut self) {
        self.reminders.shutdown();
    }
}
