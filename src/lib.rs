mod config;
mod consensus;
mod constants;
mod dissemination;
mod errors;
mod membership;
mod metadata;
mod metrics;
mod network;
mod node;
pub mod proto;
pub mod utils;

pub use config::*;
pub use consensus::*;
pub use dissemination::*;
pub use errors::*;
pub use membership::*;
pub use metadata::*;
pub use metrics::*;
pub use network::*;
pub use node::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
//-----------------------------------------------------------
// Autometrics
/// autometrics: https://docs.autometrics.dev/rust/adding-alerts-and-slos
use autometrics::objectives::Objective;
use autometrics::objectives::ObjectiveLatency;
use autometrics::objectives::ObjectivePercentile;
const API_SLO: Objective = Objective::new("api")
    .success_rate(ObjectivePercentile::P99_9)
    .latency(ObjectiveLatency::Ms10, ObjectivePercentile::P99);
