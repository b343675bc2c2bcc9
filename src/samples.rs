use crate::models::{Activity, Category, Notification, NotificationKind};
use chrono::{DateTime, Duration, NaiveDate, Utc};

pub fn sample_activities() -> Vec<Activity> {
    [
        ("1", "Commute", "Drive to work", 3.5, 18, Category::Transport),
        ("2", "Meal", "Vegetarian lunch", 1.2, 18, Category::Food),
        ("3", "Electricity", "Home energy use", 2.8, 19, Category::Household),
        ("4", "Shopping", "Clothing purchase", 5.2, 19, Category::Shopping),
        ("5", "Transport", "Bus ride", 1.5, 20, Category::Transport),
    ]
    .into_iter()
    .filter_map(|(id, activity_type, description, carbon_value, day, category)| {
        Some(Activity {
            id: id.to_string(),
            r#type: activity_type.to_string(),
            description: description.to_string(),
            carbon_value,
            date: NaiveDate::from_ymd_opt(2025, 3, day)?,
            category,
        })
    })
    .collect()
}

pub fn sample_notifications(now: DateTime<Utc>) -> Vec<Notification> {
    let mut feed = vec![
        Notification {
            id: "1".to_string(),
            title: "Welcome!".to_string(),
            message: "Welcome to your Carbon Footprint Tracker. Start logging your activities now."
                .to_string(),
            r#type: NotificationKind::Info,
            timestamp: now - Duration::hours(24),
            read: false,
        },
        Notification {
            id: "2".to_string(),
            title: "Reminder".to_string(),
            message: "Don't forget to log your activities for today.".to_string(),
            r#type: NotificationKind::Warning,
            timestamp: now - Duration::hours(1),
            read: false,
        },
        Notification {
            id: "3".to_string(),
            title: "Tip of the Day".to_string(),
            message: "Using public transport can reduce your carbon footprint by up to 30%."
                .to_string(),
            r#type: NotificationKind::Success,
            timestamp: now - Duration::hours(2),
            read: true,
        },
    ];
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed
}
