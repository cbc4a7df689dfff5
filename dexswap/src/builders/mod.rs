pub mod approve;
pub mod swap;

pub use approve::ApproveBuilder;
pub use swap::SwapTxBuilder;
