//! # Yatube Web Server
//!
//! Routes, extractors and wiring of the blog over actix-web. The binary in
//! `main.rs` only loads configuration and starts the server.

pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod presenter;
pub mod state;
pub mod telemetry;

#[cfg(feature = "scheduler")]
pub mod background;

use std::sync::Arc;

use actix_web::web;

use yatube_core::ports::TokenService;

use state::AppState;

/// Register application state and every route on an `App`.
pub fn configure_app(state: AppState) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        let tokens: Arc<dyn TokenService> = state.tokens.clone();
        cfg.app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens))
            .configure(handlers::configure_routes);
    }
}
