use chrono::Utc;
use napi::Result as NapiResult;
use napi_derive::napi;

use bond_yield_core::fixed_income::{
    analyze_bond, generate_cash_flow_schedule, price_at_yield, solve_ytm_for_periods,
    validate_bond_input, validate_solver_config, BondRequest, PeriodDecomposition,
    PriceAtYieldInput,
};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Bond metrics
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_bond_metrics(input_json: String) -> NapiResult<String> {
    let request: BondRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analyze_bond(&request, Utc::now()).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_ytm(input_json: String) -> NapiResult<String> {
    let request: BondRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    validate_bond_input(&request.bond).map_err(to_napi_error)?;
    validate_solver_config(&request.solver).map_err(to_napi_error)?;
    let periods = PeriodDecomposition::from_input(&request.bond);
    let solution = solve_ytm_for_periods(
        request.bond.face_value,
        request.bond.market_price,
        &periods,
        &request.solver,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&solution).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pricing and schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn bond_price(input_json: String) -> NapiResult<String> {
    let input: PriceAtYieldInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = price_at_yield(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn cash_flow_schedule(input_json: String) -> NapiResult<String> {
    let request: BondRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    validate_bond_input(&request.bond).map_err(to_napi_error)?;
    let start = request.start_date.unwrap_or_else(Utc::now);
    let schedule = generate_cash_flow_schedule(&request.bond, start).map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}
