//! Returns projection for NPS and index fund contributions

mod engine;
mod profile;
mod report;
mod tax;

pub use engine::{
    growth_factor, project_index_returns, project_nps_returns, project_returns,
    ProjectedReturns, ReturnsEngine,
};
pub use profile::{
    FundKind, FundProfile, InvestorProfile, INDEX_ANNUAL_RATE, NPS_ANNUAL_RATE,
    TAX_BENEFIT_ABSOLUTE_CAP, TAX_BENEFIT_WAGE_FRACTION,
};
pub use report::{money, ReturnsReport, WindowSavings, REPORT_DECIMALS};
pub use tax::{TaxSchedule, TaxSlab};
