//! API actors and their auth endpoints.
//!
//! The platform exposes two independent API surfaces: passengers under
//! `/api/user` and drivers under `/api/driver`. Each one has its own
//! credentials and its own login / logout / refresh-token endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::schema::ActorConfig;
use crate::routing::matcher::{AnyMatcher, ExactPathMatcher, Matcher, PathPrefixMatcher};

/// The party an API client acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Passenger,
    Driver,
}

impl Actor {
    /// Both actors, in a stable order.
    pub const ALL: [Actor; 2] = [Actor::Passenger, Actor::Driver];

    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Passenger => "passenger",
            Actor::Driver => "driver",
        }
    }

    /// Path prefix the backend mounts this actor's routes under.
    pub fn default_prefix(&self) -> &'static str {
        match self {
            Actor::Passenger => "/api/user",
            Actor::Driver => "/api/driver",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved endpoint paths for one actor.
#[derive(Debug)]
pub struct AuthEndpoints {
    pub login: String,
    pub logout: String,
    pub refresh: String,
    pub profile: String,
    auth_matcher: AnyMatcher,
    scope: PathPrefixMatcher,
}

impl AuthEndpoints {
    /// Build the endpoint set from an actor's configuration.
    pub fn from_config(config: &ActorConfig) -> Self {
        let login = config.endpoint(&config.login_path);
        let logout = config.endpoint(&config.logout_path);
        let refresh = config.endpoint(&config.refresh_path);
        let profile = config.endpoint(&config.profile_path);

        let auth_matcher = AnyMatcher::new(vec![
            Box::new(ExactPathMatcher::new(login.clone())),
            Box::new(ExactPathMatcher::new(logout.clone())),
            Box::new(ExactPathMatcher::new(refresh.clone())),
        ]);

        Self {
            login,
            logout,
            refresh,
            profile,
            auth_matcher,
            scope: PathPrefixMatcher::new(config.path_prefix.clone()),
        }
    }

    /// True for login, logout and refresh-token. Failures on these never
    /// start a refresh.
    pub fn is_auth_endpoint(&self, path: &str) -> bool {
        self.auth_matcher.matches(path)
    }

    /// True for paths under the actor's prefix.
    pub fn is_actor_path(&self, path: &str) -> bool {
        self.scope.matches(path)
    }
}
