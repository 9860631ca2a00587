use services::Tracker;
use tracker_core::aggregate::{CategoryProgress, OverallProgress};
use tracker_core::model::{Catalog, CategoryId, CategoryMeta, ProgressStore, SubtopicKey, Theme};

/// One entry of the category navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryNavVm {
    pub id: CategoryId,
    pub label: String,
    pub icon: &'static str,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryHeaderVm {
    pub label: String,
    pub description: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtopicVm {
    pub key: SubtopicKey,
    pub dom_id: String,
    pub label: String,
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseCardVm {
    pub badge: String,
    pub title: String,
    pub percentage: u32,
    pub subtopics: Vec<SubtopicVm>,
}

/// Global counters and the width of the progress bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatsVm {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
    pub bar_width: u32,
}

impl From<OverallProgress> for StatsVm {
    fn from(overall: OverallProgress) -> Self {
        Self {
            completed: overall.completed,
            total: overall.total,
            percentage: overall.percentage,
            // Orphaned entries can push the figure past 100; the bar cannot.
            bar_width: overall.percentage.min(100),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardVm {
    pub theme: Theme,
    pub nav: Vec<CategoryNavVm>,
    pub header: Option<CategoryHeaderVm>,
    pub phases: Vec<PhaseCardVm>,
    pub stats: StatsVm,
}

#[must_use]
pub fn map_dashboard(tracker: &Tracker) -> DashboardVm {
    let catalog = tracker.catalog();
    let current = tracker.current_category();
    let nav = map_category_nav(catalog, current);
    let header = current.map(|id| {
        let meta = CategoryMeta::for_category(id);
        CategoryHeaderVm {
            label: meta.label().to_owned(),
            description: meta.description(),
        }
    });
    let phases = tracker
        .current_category_progress()
        .map(|progress| map_phase_cards(catalog, &progress, tracker.progress()))
        .unwrap_or_default();

    DashboardVm {
        theme: tracker.theme(),
        nav,
        header,
        phases,
        stats: StatsVm::from(tracker.overall_progress()),
    }
}

#[must_use]
pub fn map_category_nav(catalog: &Catalog, current: Option<&CategoryId>) -> Vec<CategoryNavVm> {
    catalog
        .categories()
        .map(|id| {
            let meta = CategoryMeta::for_category(id);
            CategoryNavVm {
                id: id.clone(),
                label: meta.label().to_owned(),
                icon: meta.icon(),
                active: Some(id) == current,
            }
        })
        .collect()
}

fn map_phase_cards(
    catalog: &Catalog,
    category: &CategoryProgress,
    store: &ProgressStore,
) -> Vec<PhaseCardVm> {
    catalog
        .phases(&category.id)
        .iter()
        .zip(&category.phases)
        .map(|(phase, progress)| PhaseCardVm {
            badge: phase.key().to_string(),
            title: phase.title().to_owned(),
            percentage: progress.percentage,
            subtopics: phase
                .subtopics()
                .iter()
                .enumerate()
                .map(|(idx, label)| {
                    let key = phase.subtopic_key(&category.id, idx);
                    let dom_id = key.to_string();
                    SubtopicVm {
                        checked: store.is_completed(&dom_id),
                        key,
                        dom_id,
                        label: label.clone(),
                    }
                })
                .collect(),
        })
        .collect()
}
