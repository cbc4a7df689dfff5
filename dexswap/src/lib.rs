pub mod aggregator;
pub mod builders;
pub mod chain;
pub mod prelude;
pub mod service;
pub mod tokens;
pub mod wallet;

pub use aggregator::*;
pub use builders::*;
pub use chain::*;
pub use prelude::*;
pub use service::*;
pub use wallet::*;
