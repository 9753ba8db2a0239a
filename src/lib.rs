// Shared components
pub mod config;
pub mod error;
pub mod metrics;
pub mod persistence;

// Domain layer (builder logic)
pub mod flow;
pub mod onboarding;
pub mod template;

// Application layer
pub mod api;
pub mod server;
