//! Completion aggregates derived from a `Catalog` and a `ProgressStore`.
//!
//! Nothing here is stored; every value is recomputed from the two inputs.

use crate::model::{Catalog, CategoryId, Phase, PhaseKey, ProgressStore, SubtopicKey};

/// `completed / total` as a whole percentage, rounding halves up.
///
/// Returns 0 when `total` is 0. The result is not clamped: the global figure
/// counts orphaned progress entries and can exceed 100.
#[must_use]
pub fn compute_percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed as u128;
    let total = total as u128;
    // floor(100c/t + 1/2) without floating point.
    let pct = (200 * completed + total) / (2 * total);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseProgress {
    pub key: PhaseKey,
    pub title: String,
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryProgress {
    pub id: CategoryId,
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
    pub phases: Vec<PhaseProgress>,
}

/// Global completion: numerator over the whole store, denominator over the
/// current catalog only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverallProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

#[must_use]
pub fn phase_progress(category: &CategoryId, phase: &Phase, progress: &ProgressStore) -> PhaseProgress {
    let completed = progress.count_completed(&SubtopicKey::phase_prefix(category, phase.key()));
    let total = phase.subtopic_count();
    PhaseProgress {
        key: phase.key().clone(),
        title: phase.title().to_owned(),
        completed,
        total,
        percentage: compute_percentage(completed, total),
    }
}

/// Per-category rollup. Only keys under one of the category's phases count,
/// so orphaned entries never inflate a category.
#[must_use]
pub fn category_progress(
    catalog: &Catalog,
    category: &CategoryId,
    progress: &ProgressStore,
) -> CategoryProgress {
    let phases: Vec<PhaseProgress> = catalog
        .phases(category)
        .iter()
        .map(|phase| phase_progress(category, phase, progress))
        .collect();
    let completed = phases.iter().map(|p| p.completed).sum();
    let total = phases.iter().map(|p| p.total).sum();
    CategoryProgress {
        id: category.clone(),
        completed,
        total,
        percentage: compute_percentage(completed, total),
        phases,
    }
}

#[must_use]
pub fn overall_progress(catalog: &Catalog, progress: &ProgressStore) -> OverallProgress {
    let completed = progress.count_completed_all();
    let total = catalog.total_subtopic_count();
    OverallProgress {
        completed,
        total,
        percentage: compute_percentage(completed, total),
    }
}
