//! Business logic services

pub mod clock;
pub mod seed;
pub mod visits;

use std::sync::Arc;

use crate::repository::VisitStore;

use self::clock::Clock;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub visits: visits::VisitsService,
}

impl Services {
    /// Create all services on top of the given visit store
    pub fn new(store: Arc<dyn VisitStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            visits: visits::VisitsService::new(store, clock),
        }
    }
}
