use chat_core::Catalogue;
use tracing::{info, warn};

use crate::http::health::HealthState;

/// Announce the loaded catalogue and mark the service ready.
pub fn init(health: &HealthState, catalogue: &Catalogue) {
    if catalogue.is_empty() {
        warn!("culture catalogue is empty; every question will get the general answer");
    } else {
        info!(
            cultures = catalogue.len(),
            names = ?catalogue.display_names().collect::<Vec<_>>(),
            "culture catalogue loaded"
        );
    }
    health.set_ready();
}
