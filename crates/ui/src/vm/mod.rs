mod dashboard_vm;

pub use dashboard_vm::{
    CategoryHeaderVm, CategoryNavVm, DashboardVm, PhaseCardVm, StatsVm, SubtopicVm,
    map_category_nav, map_dashboard,
};
