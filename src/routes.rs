use crate::{
    api::{attendance, cahiers, calendar, devoir, journal, materials, rapports, teachers},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{guard, http::Method, web};
use std::sync::Arc;

// Per-IP limiter allowing `requests_per_min` with a burst of the same size
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // only fails on a zero period or burst, both clamped above
        .expect("valid governor config");
    Governor::new(&cfg)
}

fn is_read(ctx: &guard::GuardContext) -> bool {
    let method = &ctx.head().method;
    *method == Method::GET || *method == Method::HEAD
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));
    let write_limiter = Arc::new(build_limiter(config.rate_write_per_min));

    // Reads and writes are split into two scopes under the same prefix so each
    // gets its own budget. The guard routes a request to the first scope
    // whose method class matches.
    cfg.service(
        web::scope(&config.api_prefix)
            .guard(guard::fn_guard(is_read))
            .wrap(read_limiter)
            .configure(read_routes),
    );
    cfg.service(
        web::scope(&config.api_prefix)
            .guard(guard::fn_guard(|ctx| !is_read(ctx)))
            .wrap(write_limiter)
            .configure(write_routes),
    );
}

fn read_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            // static segments first, {date} would swallow them
            .route("/classify", web::get().to(attendance::classify_time))
            .route("/{date}", web::get().to(attendance::day_records))
            .route("/{date}/roster", web::get().to(attendance::roster)),
    )
    .service(
        web::scope("/teachers")
            .route("", web::get().to(teachers::list_teachers))
            .route("/by-name/{name}/classes", web::get().to(teachers::teacher_classes))
            .route("/by-name/{name}/attendance", web::get().to(attendance::teacher_history)),
    )
    .route("/journal", web::get().to(journal::list_entries))
    .route("/cahiers", web::get().to(cahiers::list_cahiers))
    .route("/materials", web::get().to(materials::list_materials))
    .route("/rapports", web::get().to(rapports::list_rapports))
    .route("/deliveries", web::get().to(rapports::list_deliveries))
    .route("/devoir", web::get().to(devoir::list_devoir))
    .route("/calendar/overrides", web::get().to(calendar::list_overrides));
}

fn write_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .route("/adjust", web::post().to(attendance::adjust_time))
            // /attendance/pending/{token}
            .service(
                web::resource("/pending/{token}")
                    .route(web::post().to(attendance::confirm_pending))
                    .route(web::delete().to(attendance::cancel_pending)),
            )
            .route("/{date}", web::put().to(attendance::save_table))
            .route("/{date}/sign-in", web::post().to(attendance::sign_in))
            .route("/{date}/mark", web::post().to(attendance::mark))
            .route("/{date}/preview", web::post().to(attendance::preview_table)),
    )
    .service(
        web::scope("/teachers")
            .route("", web::post().to(teachers::create_teacher))
            // /teachers/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(teachers::update_teacher))
                    .route(web::delete().to(teachers::delete_teacher)),
            ),
    )
    .route("/journal", web::post().to(journal::create_entry))
    .route("/cahiers", web::post().to(cahiers::create_cahier))
    .route("/materials", web::post().to(materials::create_material))
    .route("/rapports", web::post().to(rapports::create_rapport))
    // /rapports/{id}
    .service(
        web::resource("/rapports/{id}")
            .route(web::put().to(rapports::update_rapport))
            .route(web::delete().to(rapports::delete_rapport)),
    )
    .route("/deliveries", web::post().to(rapports::create_delivery))
    .route("/devoir", web::post().to(devoir::create_devoir))
    .route("/calendar/overrides", web::post().to(calendar::create_override))
    .route("/calendar/overrides/{id}", web::delete().to(calendar::delete_override));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test as atest};
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            database_url: "mysql://unused".into(),
            server_addr: "127.0.0.1:0".into(),
            api_prefix: "/api".into(),
            log_dir: "logs".into(),
            rate_read_per_min: 1000,
            rate_write_per_min: 120,
            roster_cache_ttl: Duration::from_secs(60),
            pending_ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn zero_rate_is_clamped() {
        // must not panic
        let _ = build_limiter(0);
        let _ = build_limiter(100_000);
    }

    #[actix_web::test]
    async fn classify_is_not_taken_for_a_date() {
        let app = atest::init_service(
            App::new().configure(|cfg| configure(cfg, test_config())),
        )
        .await;

        let req = atest::TestRequest::get()
            .uri("/api/attendance/classify?time=08:45")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = atest::read_body_json(resp).await;
        assert_eq!(body["status"], "Late");
        assert_eq!(body["time"], "08:45");
    }

    #[actix_web::test]
    async fn adjust_goes_through_the_write_scope() {
        let app = atest::init_service(
            App::new().configure(|cfg| configure(cfg, test_config())),
        )
        .await;

        let req = atest::TestRequest::post()
            .uri("/api/attendance/adjust")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .set_json(serde_json::json!({ "time": "08:30", "delta": 1 }))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = atest::read_body_json(resp).await;
        assert_eq!(body["time"], "08:31");
        assert_eq!(body["status"], "Late");
    }

    #[actix_web::test]
    async fn malformed_time_is_a_bad_request() {
        let app = atest::init_service(
            App::new().configure(|cfg| configure(cfg, test_config())),
        )
        .await;

        let req = atest::TestRequest::get()
            .uri("/api/attendance/classify?time=8:45")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
