//! Administrator dashboard counters and chart series.

use super::{ServiceResult, require_admin};
use crate::{
    access::Principal,
    models::{asset::AssetCategory, story::StoryStatus, will::WillStatus},
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub total: i64,
    pub active: i64,
    pub admins: i64,
    pub new_last_7_days: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ContentStats {
    pub policies: i64,
    pub faqs: i64,
    pub stories: i64,
    pub pending_stories: i64,
}

#[derive(Serialize, Debug, Clone)]
pub struct DashboardStats {
    pub users: UserStats,
    pub assets_total: i64,
    /// Every category is present, zero when unused.
    pub assets_by_category: BTreeMap<&'static str, i64>,
    pub wills_total: i64,
    pub wills_by_status: BTreeMap<&'static str, i64>,
    pub content: ContentStats,
}

/// Days covered by the registration chart.
pub const USER_GROWTH_DAYS: u32 = 30;
/// Days covered by the activity chart.
pub const ACTIVITY_DAYS: u32 = 7;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Rows created on one day, per table.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub users: i64,
    pub assets: i64,
    pub wills: i64,
}

/// Per-day series, oldest day first, ending today (UTC). Days without rows
/// are present with a zero count.
#[derive(Serialize, Debug, Clone)]
pub struct ChartSeries {
    pub user_growth: Vec<DailyCount>,
    pub activity: Vec<DailyActivity>,
    pub category_distribution: BTreeMap<&'static str, i64>,
}

#[derive(Clone)]
pub struct StatsService {
    db: Arc<SqlitePool>,
}

impl StatsService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn dashboard_stats(&self, principal: &Principal) -> ServiceResult<DashboardStats> {
        require_admin(principal)?;

        let week_ago = Utc::now() - Duration::days(7);
        let (total, active, admins, new_last_7_days): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_active), 0),
                    COALESCE(SUM(is_admin), 0),
                    COALESCE(SUM(created_at >= ?), 0)
             FROM users",
        )
        .bind(week_ago)
        .fetch_one(&*self.db)
        .await?;

        let assets_by_category = self.assets_by_category().await?;

        let mut wills_by_status: BTreeMap<&'static str, i64> = WillStatus::ALL
            .iter()
            .map(|status| (status.as_str(), 0))
            .collect();
        let rows: Vec<(WillStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM digital_wills GROUP BY status")
                .fetch_all(&*self.db)
                .await?;
        for (status, count) in rows {
            wills_by_status.insert(status.as_str(), count);
        }

        let (policies, faqs, stories, pending_stories): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM platform_policies),
                    (SELECT COUNT(*) FROM faqs),
                    (SELECT COUNT(*) FROM stories),
                    (SELECT COUNT(*) FROM stories WHERE status = ?)",
        )
        .bind(StoryStatus::Pending)
        .fetch_one(&*self.db)
        .await?;

        Ok(DashboardStats {
            users: UserStats {
                total,
                active,
                admins,
                new_last_7_days,
            },
            assets_total: assets_by_category.values().sum(),
            assets_by_category,
            wills_total: wills_by_status.values().sum(),
            wills_by_status,
            content: ContentStats {
                policies,
                faqs,
                stories,
                pending_stories,
            },
        })
    }

    pub async fn chart_series(&self, principal: &Principal) -> ServiceResult<ChartSeries> {
        require_admin(principal)?;

        let user_growth = self.daily_counts("users", USER_GROWTH_DAYS).await?;
        let users = self.daily_counts("users", ACTIVITY_DAYS).await?;
        let assets = self.daily_counts("digital_assets", ACTIVITY_DAYS).await?;
        let wills = self.daily_counts("digital_wills", ACTIVITY_DAYS).await?;
        let activity = users
            .into_iter()
            .zip(assets)
            .zip(wills)
            .map(|((users, assets), wills)| DailyActivity {
                date: users.date,
                users: users.count,
                assets: assets.count,
                wills: wills.count,
            })
            .collect();

        Ok(ChartSeries {
            user_growth,
            activity,
            category_distribution: self.assets_by_category().await?,
        })
    }

    /// Every category is present, zero when unused.
    async fn assets_by_category(&self) -> ServiceResult<BTreeMap<&'static str, i64>> {
        let mut counts: BTreeMap<&'static str, i64> = AssetCategory::ALL
            .iter()
            .map(|category| (category.as_str(), 0))
            .collect();
        let rows: Vec<(AssetCategory, i64)> =
            sqlx::query_as("SELECT category, COUNT(*) FROM digital_assets GROUP BY category")
                .fetch_all(&*self.db)
                .await?;
        for (category, count) in rows {
            counts.insert(category.as_str(), count);
        }
        Ok(counts)
    }

    /// Rows of `table` created on each of the last `days` days.
    async fn daily_counts(&self, table: &'static str, days: u32) -> ServiceResult<Vec<DailyCount>> {
        if days == 0 {
            return Ok(Vec::new());
        }
        let today = Utc::now().date_naive();
        let first = today - Duration::days(i64::from(days - 1));

        // Timestamps are stored as RFC 3339 text, so the first ten characters are the date.
        let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
            "SELECT substr(created_at, 1, 10), COUNT(*) FROM {} WHERE created_at >= ? GROUP BY 1",
            table
        ))
        .bind(first.and_time(NaiveTime::MIN).and_utc())
        .fetch_all(&*self.db)
        .await?;
        let by_day: BTreeMap<String, i64> = rows.into_iter().collect();

        Ok(first
            .iter_days()
            .take(days as usize)
            .map(|date| DailyCount {
                date,
                count: by_day
                    .get(&date.format("%Y-%m-%d").to_string())
                    .copied()
                    .unwrap_or(0),
            })
            .collect())
    }
}
