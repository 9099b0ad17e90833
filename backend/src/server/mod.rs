//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use mockable::DefaultClock;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{IdentityService, ScoreboardService};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{error, games, rankings, stats, users};
use crate::inbound::ws;
use crate::inbound::ws::state::WsState;
use crate::middleware::Trace;
use crate::outbound::broadcast::BroadcastPublisher;
use crate::outbound::cache::InMemorySnapshotCache;
use crate::outbound::persistence::{DbPool, DieselRecordStore};

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        ws_state,
    } = deps;

    let api = web::scope("/api")
        .service(users::login)
        .service(users::list_users)
        .service(users::delete_user)
        .service(games::submit_game)
        .service(games::list_games)
        .service(games::delete_all_games)
        .service(games::delete_game)
        .service(rankings::get_rankings)
        .service(rankings::get_all_time_rankings)
        .service(rankings::reset_rankings)
        .service(stats::get_stats);

    let app = App::new()
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .wrap(Trace)
        .service(api)
        .service(ws::ws_entry)
        .default_service(web::route().to(error::not_found));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server over a live database pool.
///
/// # Errors
/// Propagates [`std::io::Error`] when the pool cannot be built or the
/// socket cannot be bound.
pub async fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let pool = DbPool::new(config.pool_config())
        .await
        .map_err(std::io::Error::other)?;
    let store = Arc::new(DieselRecordStore::new(pool));
    let clock = Arc::new(DefaultClock);
    let cache = Arc::new(InMemorySnapshotCache::new(
        config.cache_ttls(),
        clock.clone(),
    ));
    let events = BroadcastPublisher::new();

    let identity = IdentityService::new(store.clone(), clock.clone());
    let scoreboard =
        ScoreboardService::new(store, cache, Arc::new(events.clone()), clock);
    let http_state = web::Data::new(HttpState::new(identity, scoreboard));
    let ws_state = web::Data::new(WsState::new(events));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    Ok(server)
}
