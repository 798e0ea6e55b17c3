use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-visitor page view counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisitStats {
    pub total_visits: u64,
    pub today_visits: u64,
    pub last_visit_date: Option<NaiveDate>,
}

impl VisitStats {
    /// Count one page load on `today`.
    ///
    /// The daily counter restarts at one whenever the stored date differs
    /// from `today`.
    pub fn record_visit(&mut self, today: NaiveDate) {
        if self.last_visit_date == Some(today) {
            self.today_visits += 1;
        } else {
            self.last_visit_date = Some(today);
            self.today_visits = 1;
        }
        self.total_visits += 1;
    }
}

/// Aggregated counters shown on the home page and in the admin panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub mods_count: usize,
    pub versions_count: usize,
    pub total_downloads: i64,
    /// Title of the most downloaded mod, if any mod was downloaded.
    pub top_mod: Option<String>,
    /// Title of the most downloaded version, if any version was downloaded.
    pub top_version: Option<String>,
}
