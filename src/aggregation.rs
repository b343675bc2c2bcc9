use crate::models::{
    Activity, AggregateView, Category, CategoryTotal, DailyTotal, FootprintLevel, MonthlyTotal,
    WeeklyTotal,
};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::hash::Hash;

const MEDIUM_FOOTPRINT_KG: f64 = 10.0;
const HIGH_FOOTPRINT_KG: f64 = 30.0;

pub fn aggregate(activities: &[Activity]) -> AggregateView {
    let total_carbon = activities.iter().map(|activity| activity.carbon_value).sum();

    let by_date = group_in_first_seen_order(activities, |activity| activity.date)
        .into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect();

    let by_category = group_in_first_seen_order(activities, |activity| activity.category)
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();

    let by_week = group_in_first_seen_order(activities, |activity| week_label(activity.date))
        .into_iter()
        .map(|(week, total)| WeeklyTotal { week, total })
        .collect();

    let by_month = group_in_first_seen_order(activities, |activity| month_label(activity.date))
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect();

    AggregateView {
        total_carbon,
        by_date,
        by_category,
        by_week,
        by_month,
    }
}

pub fn classify(total_carbon: f64) -> FootprintLevel {
    if total_carbon < MEDIUM_FOOTPRINT_KG {
        FootprintLevel::Low
    } else if total_carbon < HIGH_FOOTPRINT_KG {
        FootprintLevel::Medium
    } else {
        FootprintLevel::High
    }
}

pub fn category_total(view: &AggregateView, category: Category) -> f64 {
    view.by_category
        .iter()
        .find(|entry| entry.category == category)
        .map(|entry| entry.total)
        .unwrap_or(0.0)
}

fn group_in_first_seen_order<K, F>(activities: &[Activity], key_of: F) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Activity) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, f64)> = Vec::new();

    for activity in activities {
        let key = key_of(activity);
        match index.get(&key) {
            Some(&slot) => groups[slot].1 += activity.carbon_value,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, activity.carbon_value));
            }
        }
    }

    groups
}

fn week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

fn month_label(date: NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::{aggregate, category_total, classify};
    use crate::models::{Activity, Category, FootprintLevel};
    use chrono::NaiveDate;

    const EPSILON: f64 = 1e-9;

    fn activity(id: &str, value: f64, date: (i32, u32, u32), category: Category) -> Activity {
        Activity {
            id: id.to_string(),
            r#type: "Test".to_string(),
            description: String::new(),
            carbon_value: value,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("valid date"),
            category,
        }
    }

    fn fixture() -> Vec<Activity> {
        vec![
            activity("1", 3.5, (2025, 3, 19), Category::Transport),
            activity("2", 1.2, (2025, 3, 18), Category::Food),
            activity("3", 2.8, (2025, 3, 19), Category::Household),
            activity("4", 5.2, (2025, 4, 2), Category::Transport),
        ]
    }

    #[test]
    fn empty_collection_yields_zero_view() {
        let view = aggregate(&[]);
        assert_eq!(view.total_carbon, 0.0);
        assert!(view.by_date.is_empty());
        assert!(view.by_category.is_empty());
        assert!(view.by_week.is_empty());
        assert!(view.by_month.is_empty());
    }

    #[test]
    fn groups_keep_first_occurrence_order() {
        let view = aggregate(&fixture());
        let dates: Vec<String> = view.by_date.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-03-19", "2025-03-18", "2025-04-02"]);

        let categories: Vec<Category> = view.by_category.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![Category::Transport, Category::Food, Category::Household]
        );
        assert!((view.by_date[0].total - 6.3).abs() < EPSILON);
        assert!((category_total(&view, Category::Transport) - 8.7).abs() < EPSILON);
        assert_eq!(category_total(&view, Category::Shopping), 0.0);
    }

    #[test]
    fn every_grouping_sums_back_to_total() {
        let view = aggregate(&fixture());
        assert!((view.total_carbon - 12.7).abs() < EPSILON);
        let sums = [
            view.by_date.iter().map(|e| e.total).sum::<f64>(),
            view.by_category.iter().map(|e| e.total).sum::<f64>(),
            view.by_week.iter().map(|e| e.total).sum::<f64>(),
            view.by_month.iter().map(|e| e.total).sum::<f64>(),
        ];
        for sum in sums {
            assert!((sum - view.total_carbon).abs() < EPSILON);
        }
    }

    #[test]
    fn rollups_use_iso_weeks_and_calendar_months() {
        let view = aggregate(&fixture());
        let weeks: Vec<&str> = view.by_week.iter().map(|w| w.week.as_str()).collect();
        assert_eq!(weeks, vec!["2025-W12", "2025-W14"]);
        let months: Vec<&str> = view.by_month.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2025-03", "2025-04"]);
    }

    #[test]
    fn iso_week_label_uses_week_based_year() {
        let view = aggregate(&[activity("1", 1.0, (2024, 12, 30), Category::Other)]);
        assert_eq!(view.by_week[0].week, "2025-W01");
        assert_eq!(view.by_month[0].month, "2024-12");
    }

    #[test]
    fn identical_input_gives_identical_output() {
        assert_eq!(aggregate(&fixture()), aggregate(&fixture()));
    }

    #[test]
    fn footprint_thresholds() {
        assert_eq!(classify(0.0), FootprintLevel::Low);
        assert_eq!(classify(9.99), FootprintLevel::Low);
        assert_eq!(classify(10.0), FootprintLevel::Medium);
        assert_eq!(classify(29.9), FootprintLevel::Medium);
        assert_eq!(classify(30.0), FootprintLevel::High);
    }
}
