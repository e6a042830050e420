//! Statistics aggregation.
//!
//! Pure fold over a slice of notification records. The repository
//! supplies the records; everything here is arithmetic, so the shape of
//! every report section is testable with in-memory data.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use nightingale_entity::notification::{Notification, Priority};

/// Days covered by the daily-activity section, today included.
const ACTIVITY_WINDOW_DAYS: u64 = 7;

/// Headline counters across all records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    /// Total notification records.
    pub total: u64,
    /// Records flagged active. Counted independently of schedule and
    /// expiry, so an expired record still flagged active lands in both
    /// counters.
    pub active: u64,
    /// Records with a future schedule time.
    pub scheduled: u64,
    /// Records past their expiry date.
    pub expired: u64,
    /// Sum of receiver counts across all records.
    pub total_sent: i64,
    /// Sum of read flags across all records.
    pub total_read: i64,
    /// `total_read / total_sent`, zero when nothing was sent.
    pub read_rate: f64,
}

/// Per-category engagement rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStat {
    /// Category label.
    pub category: String,
    /// Records in this category.
    pub count: u64,
    /// Receivers reached by this category.
    pub sent: i64,
    /// Reads recorded in this category.
    pub read: i64,
    /// `read / sent`, zero when the category reached nobody.
    pub read_rate: f64,
}

/// Per-priority record count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityStat {
    /// Priority level.
    pub priority: Priority,
    /// Records at this priority.
    pub count: u64,
}

/// One day of creation/engagement activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyActivity {
    /// Calendar day (UTC).
    pub date: NaiveDate,
    /// Records created that day.
    pub created: u64,
    /// Receivers reached by records created that day.
    pub sent: i64,
    /// Reads recorded against records created that day.
    pub read: i64,
}

/// Full statistics report for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub overview: Overview,
    /// Categories sorted by label.
    pub categories: Vec<CategoryStat>,
    /// Priorities in ascending severity, zero-count levels included.
    pub priorities: Vec<PriorityStat>,
    /// Trailing seven days, oldest first, gap days at zero.
    pub daily_activity: Vec<DailyActivity>,
}

/// Fold a record slice into a [`StatisticsReport`] as of `now`.
pub fn aggregate(records: &[Notification], now: DateTime<Utc>) -> StatisticsReport {
    let mut active = 0u64;
    let mut scheduled = 0u64;
    let mut expired = 0u64;
    let mut total_sent = 0i64;
    let mut total_read = 0i64;

    let mut by_category: BTreeMap<&str, (u64, i64, i64)> = BTreeMap::new();
    let mut by_priority: BTreeMap<Priority, u64> = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, (u64, i64, i64)> = BTreeMap::new();

    for record in records {
        if record.is_active {
            active += 1;
        }
        if record.is_scheduled(now) {
            scheduled += 1;
        }
        if record.is_expired(now) {
            expired += 1;
        }

        total_sent += record.sent_count;
        total_read += record.read_count;

        let cat = by_category.entry(record.category.as_str()).or_default();
        cat.0 += 1;
        cat.1 += record.sent_count;
        cat.2 += record.read_count;

        *by_priority.entry(record.priority).or_default() += 1;

        let day = by_day.entry(record.created_at.date_naive()).or_default();
        day.0 += 1;
        day.1 += record.sent_count;
        day.2 += record.read_count;
    }

    let categories = by_category
        .into_iter()
        .map(|(category, (count, sent, read))| CategoryStat {
            category: category.to_string(),
            count,
            sent,
            read,
            read_rate: if sent > 0 { read as f64 / sent as f64 } else { 0.0 },
        })
        .collect();

    let priorities = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent]
        .into_iter()
        .map(|priority| PriorityStat {
            priority,
            count: by_priority.get(&priority).copied().unwrap_or(0),
        })
        .collect();

    let today = now.date_naive();
    let daily_activity = (0..ACTIVITY_WINDOW_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| {
            let (created, sent, read) = by_day.get(&date).copied().unwrap_or((0, 0, 0));
            DailyActivity {
                date,
                created,
                sent,
                read,
            }
        })
        .collect();

    StatisticsReport {
        overview: Overview {
            total: records.len() as u64,
            active,
            scheduled,
            expired,
            total_sent,
            total_read,
            read_rate: if total_sent > 0 {
                total_read as f64 / total_sent as f64
            } else {
                0.0
            },
        },
        categories,
        priorities,
        daily_activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    use nightingale_entity::notification::{NotificationKind, SendMethod, TargetType};

    fn record(
        category: &str,
        priority: Priority,
        created_at: DateTime<Utc>,
        sent: i64,
        read: i64,
    ) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            title: "t".into(),
            message: "m".into(),
            kind: NotificationKind::Info,
            category: category.into(),
            priority,
            sender_id: Uuid::new_v4(),
            target_type: TargetType::All,
            target_ids: vec![],
            send_methods: vec![SendMethod::Dashboard],
            action_url: None,
            action_text: None,
            schedule_at: None,
            expiry_date: None,
            sent_at: None,
            is_active: true,
            sent_count: sent,
            read_count: read,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_empty_input_yields_zeroed_report() {
        let now = Utc::now();
        let report = aggregate(&[], now);
        assert_eq!(report.overview.total, 0);
        assert_eq!(report.overview.read_rate, 0.0);
        assert!(report.categories.is_empty());
        assert_eq!(report.priorities.len(), 4);
        assert!(report.priorities.iter().all(|p| p.count == 0));
        assert_eq!(report.daily_activity.len(), 7);
    }

    #[test]
    fn test_overview_counts_states_independently() {
        let now = Utc::now();
        let mut scheduled = record("General", Priority::Medium, now, 0, 0);
        scheduled.schedule_at = Some(now + Duration::hours(2));
        let mut expired = record("General", Priority::Medium, now, 5, 5);
        expired.expiry_date = Some(now - Duration::hours(1));
        let mut suppressed = record("General", Priority::Medium, now, 2, 0);
        suppressed.is_active = false;
        let plain = record("General", Priority::Medium, now, 10, 4);

        let report = aggregate(&[scheduled, expired, suppressed, plain], now);
        assert_eq!(report.overview.total, 4);
        // The scheduled and expired records still carry the active flag.
        assert_eq!(report.overview.active, 3);
        assert_eq!(report.overview.scheduled, 1);
        assert_eq!(report.overview.expired, 1);
    }

    #[test]
    fn test_expired_record_still_counts_as_active_when_flagged() {
        let now = Utc::now();
        let mut rec = record("General", Priority::Medium, now, 1, 0);
        rec.expiry_date = Some(now - Duration::hours(1));

        let report = aggregate(&[rec], now);
        assert_eq!(report.overview.active, 1);
        assert_eq!(report.overview.expired, 1);
    }

    #[test]
    fn test_category_read_rate_guards_division_by_zero() {
        let now = Utc::now();
        let report = aggregate(
            &[
                record("Exams", Priority::High, now, 10, 5),
                record("Holidays", Priority::Low, now, 0, 0),
            ],
            now,
        );
        let exams = report.categories.iter().find(|c| c.category == "Exams").unwrap();
        assert!((exams.read_rate - 0.5).abs() < f64::EPSILON);
        let holidays = report
            .categories
            .iter()
            .find(|c| c.category == "Holidays")
            .unwrap();
        assert_eq!(holidays.read_rate, 0.0);
    }

    #[test]
    fn test_daily_activity_is_ascending_with_gap_days_at_zero() {
        let now = Utc::now();
        let report = aggregate(
            &[
                record("General", Priority::Medium, now, 3, 0),
                record("General", Priority::Medium, now - Duration::days(2), 7, 1),
                // Outside the window, must not appear.
                record("General", Priority::Medium, now - Duration::days(30), 9, 9),
            ],
            now,
        );

        assert_eq!(report.daily_activity.len(), 7);
        let days: Vec<NaiveDate> = report.daily_activity.iter().map(|d| d.date).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);

        let today = report.daily_activity.last().unwrap();
        assert_eq!(today.created, 1);
        assert_eq!(today.sent, 3);
        assert_eq!(today.read, 0);

        let two_back = &report.daily_activity[4];
        assert_eq!(two_back.created, 1);
        assert_eq!(two_back.sent, 7);
        assert_eq!(two_back.read, 1);

        let gap = &report.daily_activity[5];
        assert_eq!(gap.created, 0);
        assert_eq!(gap.read, 0);
    }
}
