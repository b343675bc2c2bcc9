use crate::aggregation::aggregate;
use crate::errors::{AppError, AppResult};
use crate::models::{Activity, AggregateView, NewActivity};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySnapshot {
    pub activities: Vec<Activity>,
    pub view: AggregateView,
}

impl ActivitySnapshot {
    fn from_activities(activities: Vec<Activity>) -> Self {
        let view = aggregate(&activities);
        Self { activities, view }
    }
}

#[derive(Clone)]
pub struct ActivityStore {
    state: Arc<watch::Sender<Arc<ActivitySnapshot>>>,
}

impl Default for ActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityStore {
    pub fn new() -> Self {
        Self::from_snapshot(ActivitySnapshot::default())
    }

    pub fn with_activities(activities: Vec<Activity>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(activities.len());
        for activity in &activities {
            activity.validate()?;
            if !seen.insert(activity.id.as_str()) {
                return Err(AppError::InvalidInput(format!(
                    "duplicate activity id: {}",
                    activity.id
                )));
            }
        }
        Ok(Self::from_snapshot(ActivitySnapshot::from_activities(
            activities,
        )))
    }

    fn from_snapshot(snapshot: ActivitySnapshot) -> Self {
        let (sender, _) = watch::channel(Arc::new(snapshot));
        Self {
            state: Arc::new(sender),
        }
    }

    pub fn add(&self, activity: NewActivity) -> AppResult<Activity> {
        activity.validate()?;
        let created = activity.into_activity(Uuid::new_v4().to_string());

        self.mutate(|activities| {
            activities.push(created.clone());
            true
        });
        tracing::info!(
            activity_id = %created.id,
            category = %created.category,
            carbon_value = created.carbon_value,
            "activity added"
        );
        Ok(created)
    }

    pub fn remove(&self, id: &str) {
        let removed = self.mutate(|activities| {
            let before = activities.len();
            activities.retain(|activity| activity.id != id);
            activities.len() != before
        });
        if removed {
            tracing::info!(activity_id = %id, "activity removed");
        } else {
            tracing::debug!(activity_id = %id, "remove ignored; no matching activity");
        }
    }

    pub fn update(&self, activity: Activity) -> AppResult<()> {
        activity.validate()?;
        let id = activity.id.clone();

        let updated = self.mutate(|activities| {
            match activities.iter_mut().find(|existing| existing.id == activity.id) {
                Some(existing) => {
                    *existing = activity;
                    true
                }
                None => false,
            }
        });
        if updated {
            tracing::info!(activity_id = %id, "activity updated");
        } else {
            tracing::debug!(activity_id = %id, "update ignored; no matching activity");
        }
        Ok(())
    }

    pub fn list(&self) -> Vec<Activity> {
        self.snapshot().activities.clone()
    }

    pub fn view(&self) -> AggregateView {
        self.snapshot().view.clone()
    }

    pub fn snapshot(&self) -> Arc<ActivitySnapshot> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ActivitySnapshot>> {
        self.state.subscribe()
    }

    fn mutate<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut Vec<Activity>) -> bool,
    {
        self.state.send_if_modified(|current| {
            let mut activities = current.activities.clone();
            if !apply(&mut activities) {
                return false;
            }
            *current = Arc::new(ActivitySnapshot::from_activities(activities));
            true
        })
    }
}
