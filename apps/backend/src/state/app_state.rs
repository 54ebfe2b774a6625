use std::sync::Arc;

use crate::ai::{create_ai, AiPlayer};
use crate::config::EngineConfig;
use crate::error::AppError;
use crate::services::{
    ComputerGameService, IdentityService, InMemoryReservationStore, InMemoryResultStore,
    ReservationService, ResultStore, StaticIdentityService, TableEngine,
};

/// Computer strategy used at live tables and in computer games.
pub const AI_KIND: &str = "heuristic";

/// Shared services handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TableEngine>,
    pub computer: Arc<ComputerGameService>,
    pub reservations: Arc<ReservationService>,
    pub identity: Arc<dyn IdentityService>,
    pub config: EngineConfig,
}

impl AppState {
    /// Wire the engine to its collaborators.
    pub fn new(
        config: EngineConfig,
        identity: Arc<dyn IdentityService>,
        results: Arc<dyn ResultStore>,
    ) -> Result<Self, AppError> {
        let ai: Arc<dyn AiPlayer> = create_ai(AI_KIND, config.ai_seed)
            .map(Arc::from)
            .ok_or_else(|| AppError::config(format!("unknown AI kind {AI_KIND}")))?;
        let reservations = Arc::new(ReservationService::new(
            Arc::new(InMemoryReservationStore::new()),
            config.reservation_horizon_days,
        ));
        let engine = TableEngine::new(
            config.clone(),
            Arc::clone(&ai),
            Arc::clone(&identity),
            Arc::clone(&reservations),
            results,
        );
        Ok(Self {
            engine: Arc::new(engine),
            computer: Arc::new(ComputerGameService::new(ai, config.ai_seed)),
            reservations,
            identity,
            config,
        })
    }

    /// In-memory collaborators: users from `SKAT_USERS`, results kept in memory.
    pub fn in_memory(config: EngineConfig) -> Result<Self, AppError> {
        let identity = StaticIdentityService::new(crate::config::identity::users_from_env());
        Self::new(
            config,
            Arc::new(identity),
            Arc::new(InMemoryResultStore::new()),
        )
    }
}
