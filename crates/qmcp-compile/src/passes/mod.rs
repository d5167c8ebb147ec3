//! Built-in optimization passes.

mod cancel;
mod optimize_1q;
mod unroll;

pub use cancel::{CancelTwoQubitInverses, CommutativeCancellation};
pub use optimize_1q::Optimize1qGates;
pub use unroll::UnrollComposites;
