use crate::clock::{Clock, SystemClock};
use crate::models::{NewNotification, Notification, NotificationPreferences, PreferencesPatch};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    pub preferences: NotificationPreferences,
}

impl NotificationSnapshot {
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|entry| !entry.read).count()
    }
}

#[derive(Clone)]
pub struct NotificationStore {
    state: Arc<watch::Sender<Arc<NotificationSnapshot>>>,
    clock: Arc<dyn Clock>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(NotificationPreferences::default(), Arc::new(SystemClock))
    }
}

impl NotificationStore {
    pub fn new(preferences: NotificationPreferences, clock: Arc<dyn Clock>) -> Self {
        Self::with_feed(Vec::new(), preferences, clock)
    }

    pub fn with_feed(
        notifications: Vec<Notification>,
        preferences: NotificationPreferences,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (sender, _) = watch::channel(Arc::new(NotificationSnapshot {
            notifications,
            preferences,
        }));
        Self {
            state: Arc::new(sender),
            clock,
        }
    }

    pub fn add(&self, notification: NewNotification) -> Notification {
        let created = Notification {
            id: Uuid::new_v4().to_string(),
            title: notification.title,
            message: notification.message,
            r#type: notification.r#type,
            timestamp: self.clock.now(),
            read: false,
        };

        self.mutate(|snapshot| {
            snapshot.notifications.insert(0, created.clone());
            true
        });
        tracing::info!(
            notification_id = %created.id,
            kind = ?created.r#type,
            title = %created.title,
            "notification added"
        );
        created
    }

    pub fn remove(&self, id: &str) {
        let removed = self.mutate(|snapshot| {
            let before = snapshot.notifications.len();
            snapshot.notifications.retain(|entry| entry.id != id);
            snapshot.notifications.len() != before
        });
        if !removed {
            tracing::debug!(notification_id = %id, "remove ignored; no matching notification");
        }
    }

    pub fn mark_read(&self, id: &str) {
        let changed = self.mutate(|snapshot| {
            match snapshot.notifications.iter_mut().find(|entry| entry.id == id) {
                Some(entry) if !entry.read => {
                    entry.read = true;
                    true
                }
                _ => false,
            }
        });
        if !changed {
            tracing::debug!(notification_id = %id, "mark read ignored");
        }
    }

    pub fn mark_all_read(&self) {
        let marked = self.mutate(|snapshot| {
            let mut changed = false;
            for entry in snapshot.notifications.iter_mut().filter(|entry| !entry.read) {
                entry.read = true;
                changed = true;
            }
            changed
        });
        if marked {
            tracing::info!("all notifications marked read");
        }
    }

    pub fn update_preferences(&self, patch: PreferencesPatch) {
        let changed = self.mutate(|snapshot| {
            let before = snapshot.preferences.clone();
            patch.apply_to(&mut snapshot.preferences);
            snapshot.preferences != before
        });
        if changed {
            let preferences = self.preferences();
            tracing::info!(
                enabled = preferences.enabled,
                frequency = ?preferences.reminder_frequency,
                reminder_time = %preferences.reminder_time,
                "notification preferences updated"
            );
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.snapshot().notifications.clone()
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.snapshot().preferences.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.snapshot().unread_count()
    }

    pub fn snapshot(&self) -> Arc<NotificationSnapshot> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<NotificationSnapshot>> {
        self.state.subscribe()
    }

    fn mutate<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut NotificationSnapshot) -> bool,
    {
        self.state.send_if_modified(|current| {
            let mut next = (**current).clone();
            if !apply(&mut next) {
                return false;
            }
            *current = Arc::new(next);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationStore;
    use crate::clock::ManualClock;
    use crate::models::{
        NewNotification, NotificationKind, NotificationPreferences, PreferencesPatch,
        ReminderFrequency,
    };
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::Europe::Berlin;
    use std::sync::Arc;

    fn info(title: &str) -> NewNotification {
        NewNotification::new(title, "message", NotificationKind::Info)
    }

    #[test]
    fn add_assigns_id_timestamp_and_unread() {
        let store = NotificationStore::default();
        let before = Utc::now();
        let created = store.add(info("Welcome!"));

        assert!(!created.id.is_empty());
        assert!(!created.read);
        assert!(created.timestamp >= before);
        assert!(created.timestamp <= Utc::now());
        assert_eq!(store.notifications(), vec![created]);
    }

    #[test]
    fn timestamps_come_from_the_store_clock() {
        let start = Berlin
            .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid instant");
        let clock = Arc::new(ManualClock::new(start));
        let store = NotificationStore::new(NotificationPreferences::default(), clock.clone());

        let first = store.add(info("first"));
        clock.advance(Duration::minutes(5));
        let second = store.add(info("second"));

        assert_eq!(first.timestamp, start);
        assert_eq!(second.timestamp, start + Duration::minutes(5));
    }

    #[test]
    fn feed_is_most_recent_first() {
        let store = NotificationStore::default();
        store.add(info("first"));
        store.add(info("second"));
        store.add(info("third"));

        let titles: Vec<String> = store.notifications().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[test]
    fn mark_read_and_remove_by_id() {
        let store = NotificationStore::default();
        let first = store.add(info("first"));
        let second = store.add(info("second"));

        store.mark_read(&first.id);
        store.mark_read("missing");
        assert_eq!(store.unread_count(), 1);

        store.remove(&second.id);
        store.remove("missing");
        let feed = store.notifications();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, first.id);
        assert!(feed[0].read);
    }

    #[test]
    fn mark_all_read_keeps_length_and_order() {
        let store = NotificationStore::default();
        for title in ["a", "b", "c", "d"] {
            store.add(info(title));
        }
        let ids_before: Vec<String> = store.notifications().into_iter().map(|n| n.id).collect();

        store.mark_all_read();
        let feed = store.notifications();
        assert_eq!(feed.len(), 4);
        assert!(feed.iter().all(|n| n.read));
        let ids_after: Vec<String> = feed.into_iter().map(|n| n.id).collect();
        assert_eq!(ids_before, ids_after);
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn update_preferences_merges_partial_fields() {
        let store = NotificationStore::default();
        store.update_preferences(PreferencesPatch {
            enabled: Some(false),
            reminder_time: Some("07:45".parse().expect("valid time")),
            ..PreferencesPatch::default()
        });

        let prefs = store.preferences();
        assert!(!prefs.enabled);
        assert_eq!(prefs.reminder_time.to_string(), "07:45");
        assert_eq!(prefs.reminder_frequency, ReminderFrequency::Daily);
        assert!(prefs.show_activity && prefs.show_goals && prefs.show_tips);
    }

    #[tokio::test]
    async fn unchanged_preferences_do_not_notify_subscribers() {
        let store = NotificationStore::default();
        let receiver = store.subscribe();
        store.update_preferences(PreferencesPatch {
            enabled: Some(true),
            ..PreferencesPatch::default()
        });
        store.mark_all_read();
        assert!(!receiver.has_changed().expect("sender alive"));
    }
}
