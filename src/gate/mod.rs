//! Navigation gate: which screen area the user may see.

pub mod machine;
pub mod route;

pub use machine::{Gate, GateInputs, GateState, Navigator, decide};
pub use route::{RouteArea, RouteLocation};
