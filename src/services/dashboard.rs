use crate::domain::category::Category;
use crate::domain::score::{CategoryCounts, ScoreSnapshot, calculate_score};
use crate::domain::types::TrainerId;
use crate::repository::{ListingInvalidator, TrainerDataReader};

/// Row counts of every category owned by `trainer_id`.
///
/// Each category is counted on its own; a failing count is logged and read
/// as zero so one broken table never hides the rest of the dashboard.
pub fn count_by_owner<R>(trainer_id: &TrainerId, repo: &R) -> CategoryCounts
where
    R: TrainerDataReader,
{
    Category::ALL
        .into_iter()
        .map(|category| match repo.count_rows(trainer_id, category) {
            Ok(count) => (category, count),
            Err(e) => {
                log::warn!("Failed to count {category} rows of {trainer_id}: {e}");
                (category, 0)
            }
        })
        .collect()
}

/// Core business logic for rendering the overview page.
pub fn show_overview<R>(trainer_id: &TrainerId, repo: &R) -> ScoreSnapshot
where
    R: TrainerDataReader,
{
    calculate_score(&count_by_owner(trainer_id, repo))
}

/// Drop every cached listing so the next page load reads the store.
pub fn refresh_listings<R>(repo: &R)
where
    R: ListingInvalidator,
{
    repo.invalidate_listings();
}
