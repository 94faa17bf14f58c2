mod dashboard_vm;
mod time_fmt;
mod wizard_vm;

pub use dashboard_vm::{
    CategoryRowVm, DashboardVm, DepartmentRowVm, DistributionBarVm, SummaryCardVm, TokenRowVm,
    TrendBarVm, map_dashboard,
};
pub use wizard_vm::{StepOutcome, WizardIntent, WizardVm, start_wizard};
