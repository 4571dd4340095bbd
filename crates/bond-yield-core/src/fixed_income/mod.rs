pub mod metrics;
pub mod periods;
pub mod schedule;
pub mod yields;

pub use metrics::{
    analyze_bond, calculate_bond_metrics, calculate_bond_metrics_with_config, BondMetricsResult,
    BondRequest, PremiumOrDiscount, RawBondMetrics,
};
pub use periods::{
    validate_bond_input, validate_bond_terms, BondInput, CouponFrequency, PeriodDecomposition,
};
pub use schedule::{generate_cash_flow_schedule, CashFlowScheduleEntry};
pub use yields::{
    price_at_yield, solve_ytm, solve_ytm_for_periods, validate_solver_config, PriceAtYieldInput,
    PriceAtYieldOutput, SolverConfig, YtmSolution,
};
