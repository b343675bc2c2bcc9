use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static REMINDER_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid reminder time regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transport,
    Food,
    Household,
    Shopping,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Food => "food",
            Self::Household => "household",
            Self::Shopping => "shopping",
            Self::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transport" => Ok(Self::Transport),
            "food" => Ok(Self::Food),
            "household" => Ok(Self::Household),
            "shopping" => Ok(Self::Shopping),
            "other" => Ok(Self::Other),
            other => Err(AppError::InvalidInput(format!("Unknown category `{}`", other))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub r#type: String,
    #[serde(default)]
    pub description: String,
    pub carbon_value: f64,
    pub date: NaiveDate,
    pub category: Category,
}

impl Activity {
    pub fn validate(&self) -> AppResult<()> {
        validate_activity_fields(&self.r#type, self.carbon_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub r#type: String,
    #[serde(default)]
    pub description: String,
    pub carbon_value: f64,
    pub date: NaiveDate,
    pub category: Category,
}

impl NewActivity {
    pub fn validate(&self) -> AppResult<()> {
        validate_activity_fields(&self.r#type, self.carbon_value)
    }

    pub fn into_activity(self, id: String) -> Activity {
        Activity {
            id,
            r#type: self.r#type,
            description: self.description,
            carbon_value: self.carbon_value,
            date: self.date,
            category: self.category,
        }
    }
}

fn validate_activity_fields(activity_type: &str, carbon_value: f64) -> AppResult<()> {
    if activity_type.trim().is_empty() {
        return Err(AppError::InvalidInput("Activity type is required".to_string()));
    }
    if !carbon_value.is_finite() {
        return Err(AppError::InvalidInput(format!(
            "Carbon value must be a finite number, got {}",
            carbon_value
        )));
    }
    if carbon_value < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "Carbon value must not be negative, got {}",
            carbon_value
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityDraft {
    pub r#type: String,
    pub description: String,
    pub carbon_value: String,
    pub date: String,
    pub category: String,
}

impl ActivityDraft {
    pub fn parse(&self) -> AppResult<NewActivity> {
        let carbon_value = self.carbon_value.trim().parse::<f64>().map_err(|_| {
            AppError::InvalidInput(format!("Carbon value `{}` is not a number", self.carbon_value))
        })?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            AppError::InvalidInput(format!("Date `{}` is not a valid YYYY-MM-DD date", self.date))
        })?;
        let activity = NewActivity {
            r#type: self.r#type.trim().to_string(),
            description: self.description.clone(),
            carbon_value,
            date,
            category: self.category.parse()?,
        };
        activity.validate()?;
        Ok(activity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTotal {
    pub week: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub month: String,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    pub total_carbon: f64,
    pub by_date: Vec<DailyTotal>,
    pub by_category: Vec<CategoryTotal>,
    pub by_week: Vec<WeeklyTotal>,
    pub by_month: Vec<MonthlyTotal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootprintLevel {
    Low,
    Medium,
    High,
}

impl FootprintLevel {
    pub fn message(self) -> &'static str {
        match self {
            Self::Low => "Great job keeping your carbon footprint low!",
            Self::Medium => "Your carbon footprint is moderate.",
            Self::High => {
                "Your carbon footprint is high. Consider reducing carbon-intensive activities."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonSummary {
    pub total_carbon: f64,
    pub activity_count: usize,
    pub level: FootprintLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub r#type: NotificationKind,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub r#type: NotificationKind,
}

impl NewNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            r#type: kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    pub fn from_hm(hour: u32, minute: u32) -> AppResult<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid reminder time {}:{}", hour, minute)))
    }

    pub fn as_naive_time(self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ReminderTime {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let caps = REMINDER_TIME_RE.captures(value.trim()).ok_or_else(|| {
            AppError::InvalidInput(format!("Reminder time `{}` must be formatted as HH:MM", value))
        })?;
        let hour = caps[1].parse::<u32>().map_err(|_| {
            AppError::InvalidInput(format!("Reminder time `{}` has an invalid hour", value))
        })?;
        let minute = caps[2].parse::<u32>().map_err(|_| {
            AppError::InvalidInput(format!("Reminder time `{}` has an invalid minute", value))
        })?;
        Self::from_hm(hour, minute)
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub enabled: bool,
    pub reminder_frequency: ReminderFrequency,
    pub reminder_time: ReminderTime,
    pub show_activity: bool,
    pub show_goals: bool,
    pub show_tips: bool,
}

impl NotificationPreferences {
    pub fn schedule_differs(&self, other: &Self) -> bool {
        self.enabled != other.enabled
            || self.reminder_frequency != other.reminder_frequency
            || self.reminder_time != other.reminder_time
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_frequency: ReminderFrequency::Daily,
            reminder_time: ReminderTime(NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()),
            show_activity: true,
            show_goals: true,
            show_tips: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub enabled: Option<bool>,
    pub reminder_frequency: Option<ReminderFrequency>,
    pub reminder_time: Option<ReminderTime>,
    pub show_activity: Option<bool>,
    pub show_goals: Option<bool>,
    pub show_tips: Option<bool>,
}

impl PreferencesPatch {
    pub fn apply_to(&self, preferences: &mut NotificationPreferences) {
        if let Some(enabled) = self.enabled {
            preferences.enabled = enabled;
        }
        if let Some(frequency) = self.reminder_frequency {
            preferences.reminder_frequency = frequency;
        }
        if let Some(time) = self.reminder_time {
            preferences.reminder_time = time;
        }
        if let Some(show) = self.show_activity {
            preferences.show_activity = show;
        }
        if let Some(show) = self.show_goals {
            preferences.show_goals = show;
        }
        if let Some(show) = self.show_tips {
            preferences.show_tips = show;
        }
    }
}
