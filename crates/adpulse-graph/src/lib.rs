pub mod client;
pub mod error;
pub mod insights;
pub mod probe;
mod proof;
pub mod source;
pub mod types;

pub use client::{Credentials, GraphClient};
pub use error::GraphError;
pub use insights::InsightsWindow;
pub use probe::{ConnectionProbe, ProbeAccount};
pub use source::AccountSource;
pub use types::{Ad, AdAccount, AdImage, AdSet, Campaign, CustomAudience, InsightsRow};
