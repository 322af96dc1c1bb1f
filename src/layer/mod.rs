//! Tower Layer implementations for the outbound provider stack

pub mod auth;
pub mod user_agent;

pub use auth::{AuthCredentials, AuthLayer, AuthService};
pub use user_agent::{
    FixedUserAgent, RotatingUserAgent, UserAgentLayer, UserAgentService, UserAgentSource,
};
