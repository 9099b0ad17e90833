//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use actix_web::{web, App};

use crate::domain::scoreboard::NoOpSnapshotCache;
use crate::domain::test_support::{fixed_clock, CountingPublisher, InMemoryRecordStore};
use crate::domain::{IdentityService, ScoreboardService};

use super::state::HttpState;

pub(crate) struct TestHarness {
    pub store: Arc<InMemoryRecordStore>,
    pub publisher: Arc<CountingPublisher>,
    pub state: web::Data<HttpState>,
}

/// Build handler state over in-memory doubles. The cache is a no-op so
/// every read observes the latest store contents.
pub(crate) fn test_harness() -> TestHarness {
    let store = Arc::new(InMemoryRecordStore::default());
    let publisher = Arc::new(CountingPublisher::default());
    let clock = fixed_clock();
    let identity = IdentityService::new(store.clone(), clock.clone());
    let scoreboard = ScoreboardService::new(
        store.clone(),
        Arc::new(NoOpSnapshotCache),
        publisher.clone(),
        clock,
    );
    TestHarness {
        store,
        publisher,
        state: web::Data::new(HttpState::new(identity, scoreboard)),
    }
}

/// Assemble an app mirroring the production route table.
pub(crate) fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(super::error::json_error_handler))
        .service(
            web::scope("/api")
                .service(super::users::login)
                .service(super::users::list_users)
                .service(super::users::delete_user)
                .service(super::games::submit_game)
                .service(super::games::list_games)
                .service(super::games::delete_all_games)
                .service(super::games::delete_game)
                .service(super::rankings::get_rankings)
                .service(super::rankings::get_all_time_rankings)
                .service(super::rankings::reset_rankings)
                .service(super::stats::get_stats),
        )
        .default_service(web::route().to(super::error::not_found))
}
