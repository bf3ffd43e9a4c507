use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::mission::{Mission, MissionStatus};
use crate::state::AppState;

pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Conjunction of filters: every supplied field must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionFilter {
    pub status: Option<MissionStatus>,
    pub expediteur_id: Option<Uuid>,
    pub gp_id: Option<Uuid>,
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
}

impl MissionFilter {
    fn matches(&self, mission: &Mission) -> bool {
        if let Some(status) = self.status {
            if mission.status != status {
                return false;
            }
        }
        if let Some(expediteur_id) = self.expediteur_id {
            if mission.expediteur_id != expediteur_id {
                return false;
            }
        }
        if let Some(gp_id) = self.gp_id {
            if mission.gp_id != Some(gp_id) {
                return false;
            }
        }
        if let Some(city) = &self.departure_city {
            if !contains_ci(&mission.departure_city, city) {
                return false;
            }
        }
        if let Some(city) = &self.arrival_city {
            if !contains_ci(&mission.arrival_city, city) {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Filtered, paginated read over missions, newest first. Never mutates.
///
/// Page is clamped to a minimum of 1 and limit to [1, 100]; the total counts
/// everything matching the filter, not just the returned page.
pub fn list_missions(
    state: &AppState,
    filter: &MissionFilter,
    page: i64,
    limit: i64,
) -> Paginated<Mission> {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);

    let mut matching: Vec<Mission> = state
        .missions
        .iter()
        .filter(|entry| filter.matches(entry.value()))
        .map(|entry| entry.value().clone())
        .collect();

    // id as tiebreaker keeps paging stable for equal timestamps
    matching.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let total = matching.len();
    let total_pages = total.div_ceil(limit as usize);
    let offset = ((page - 1) * limit) as usize;
    let data = matching.into_iter().skip(offset).take(limit as usize).collect();

    Paginated {
        data,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages,
        },
    }
}
