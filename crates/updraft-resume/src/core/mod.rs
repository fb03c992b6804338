//! Pure decision logic: no I/O, no clocks, no network.

mod decision;

pub use decision::{
    Reconciliation, RequestPlan, RestartReason, Resumability, plan_request, range_header,
    reconcile, resumability,
};
