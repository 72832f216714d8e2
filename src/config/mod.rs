//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → VITE_API_BASE_URL / CLI overrides
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → read once by each actor's pipeline at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError, BASE_URL_ENV};
pub use schema::{
    ActorConfig, ClientConfig, NotificationConfig, ObservabilityConfig, RetryConfig,
    TransportConfig,
};
pub use validation::{validate_config, ValidationError};
