pub mod errors;
pub mod metrics;
pub mod params;

pub use errors::*;
pub use metrics::*;
pub use params::*;
