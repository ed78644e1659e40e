pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod models;
pub mod newsletter;
pub mod observability;
pub mod state;
pub mod workflow;
