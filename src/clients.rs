//! Per-actor client registry.
//!
//! The platform runs two independent pipelines, passenger and driver. Each
//! has its own transport (and cookie jar) and its own refresh state. They
//! share one connectivity flag.

use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::schema::ClientConfig;
use crate::http::{ReqwestTransport, Transport};
use crate::net::Connectivity;
use crate::pipeline::Pipeline;
use crate::routing::Actor;

/// The passenger and driver pipelines.
#[derive(Debug)]
pub struct ApiClients<T: Transport> {
    passenger: Arc<Pipeline<T>>,
    driver: Arc<Pipeline<T>>,
    connectivity: Arc<Connectivity>,
}

impl ApiClients<ReqwestTransport> {
    /// Build both clients over reqwest from a validated configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let passenger = ReqwestTransport::new(&config.transport)?;
        let driver = ReqwestTransport::new(&config.transport)?;
        Self::with_transports(config, passenger, driver)
    }
}

impl<T: Transport> ApiClients<T> {
    pub fn with_transports(
        config: &ClientConfig,
        passenger: T,
        driver: T,
    ) -> Result<Self, ConfigError> {
        let connectivity = Arc::new(Connectivity::new());
        let passenger = Pipeline::new(Actor::Passenger, config, passenger, connectivity.clone())?;
        let driver = Pipeline::new(Actor::Driver, config, driver, connectivity.clone())?;

        tracing::info!(base_url = %config.transport.base_url, "API clients ready");

        Ok(Self {
            passenger: Arc::new(passenger),
            driver: Arc::new(driver),
            connectivity,
        })
    }

    pub fn get(&self, actor: Actor) -> &Arc<Pipeline<T>> {
        match actor {
            Actor::Passenger => &self.passenger,
            Actor::Driver => &self.driver,
        }
    }

    pub fn passenger(&self) -> &Arc<Pipeline<T>> {
        &self.passenger
    }

    pub fn driver(&self) -> &Arc<Pipeline<T>> {
        &self.driver
    }

    /// Shared flag; feed runtime online/offline signals here.
    pub fn connectivity(&self) -> &Arc<Connectivity> {
        &self.connectivity
    }
}
