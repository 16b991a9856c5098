//! Direct solvers for small dense systems
//!
//! - [`lu_solve`]: LU decomposition with partial pivoting
//! - [`residual_norm`]: ‖Ax − b‖₂ for checking a solution

mod lu;

pub use lu::{LuError, LuFactorization, lu_factorize, lu_solve, residual_norm};
