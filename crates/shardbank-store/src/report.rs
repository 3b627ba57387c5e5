//! Catalog reports backing the dashboard read surface.

use crate::error::Result;
use crate::record::{Normalizer, Record};
use crate::CatalogGateway;

/// A read-only catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    /// Aggregates per region.
    RegionalStats,
    /// Single-row system aggregates.
    OverallStats,
    /// Latest transactions.
    RecentTransactions,
    /// Account breakdown per region.
    AccountsByRegion,
    /// Daily transaction volume.
    TransactionsByDate,
    /// `(user_id, username, full_name)` ordered by username.
    UserDirectory,
    /// Users with account count and total balance, ordered by user id.
    UserSummaries,
    /// Accounts joined with their owner, ordered by account id.
    AccountListing,
}

impl Report {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RegionalStats => "regional_stats",
            Self::OverallStats => "overall_stats",
            Self::RecentTransactions => "recent_transactions",
            Self::AccountsByRegion => "accounts_by_region",
            Self::TransactionsByDate => "transactions_by_date",
            Self::UserDirectory => "user_directory",
            Self::UserSummaries => "user_summaries",
            Self::AccountListing => "account_listing",
        }
    }

    /// The catalog SQL for this report.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::RegionalStats => "SELECT * FROM dashboard_regional_stats",
            Self::OverallStats => "SELECT * FROM dashboard_overall_stats",
            Self::RecentTransactions => "SELECT * FROM dashboard_recent_transactions",
            Self::AccountsByRegion => "SELECT * FROM dashboard_accounts_by_region",
            Self::TransactionsByDate => "SELECT * FROM dashboard_transactions_by_date",
            Self::UserDirectory => {
                "SELECT user_id, username, full_name FROM users_all ORDER BY username"
            }
            Self::UserSummaries => {
                "SELECT u.user_id, u.username, u.email, u.full_name, u.phone, u.address, \
                 u.region, u.created_date, \
                 COUNT(DISTINCT a.account_number) AS account_count, \
                 COALESCE(SUM(a.balance), 0) AS total_balance \
                 FROM users_all u \
                 LEFT JOIN accounts_all a ON u.user_id = a.user_id \
                 GROUP BY u.user_id, u.username, u.email, u.full_name, u.phone, u.address, \
                 u.region, u.created_date \
                 ORDER BY u.user_id"
            }
            Self::AccountListing => {
                "SELECT a.account_id, a.account_number, a.account_type, a.balance, a.currency, \
                 a.region, a.status, a.created_date, u.user_id, u.username, u.full_name \
                 FROM accounts_all a \
                 LEFT JOIN users_all u ON a.user_id = u.user_id \
                 ORDER BY a.account_id, a.shard_location"
            }
        }
    }

    /// How this report's numeric columns are rendered.
    #[must_use]
    pub const fn normalizer(self) -> Normalizer {
        match self {
            Self::UserDirectory => Normalizer::keeping_integers(&["user_id"]),
            Self::UserSummaries => Normalizer::keeping_integers(&["user_id", "account_count"]),
            Self::AccountListing => Normalizer::keeping_integers(&["account_id", "user_id"]),
            Self::RegionalStats
            | Self::OverallStats
            | Self::RecentTransactions
            | Self::AccountsByRegion
            | Self::TransactionsByDate => Normalizer::WIDEN_ALL,
        }
    }
}

/// Run a report against the catalog and normalize its rows.
///
/// # Errors
///
/// Propagates the catalog's connection or query error.
pub async fn fetch(catalog: &dyn CatalogGateway, report: Report) -> Result<Vec<Record>> {
    let rows = catalog.report_rows(report).await?;
    tracing::debug!(report = report.name(), rows = rows.len(), "Report fetched");
    Ok(report.normalizer().normalize(rows))
}

/// Run a single-row report; an empty result is an empty record.
///
/// # Errors
///
/// Propagates the catalog's connection or query error.
pub async fn fetch_one(catalog: &dyn CatalogGateway, report: Report) -> Result<Record> {
    Ok(fetch(catalog, report)
        .await?
        .into_iter()
        .next()
        .unwrap_or_default())
}
