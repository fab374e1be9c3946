use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::{AppConfig, AssetBackend};
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let router = OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/uploads", upload_routes(config))
        .nest("/machines", machine_routes())
        .nest("/parts", part_routes())
        .nest("/blogs", blog_routes())
        .nest("/enquiries", enquiry_routes())
        .nest("/dashboard", dashboard_routes());

    // S3 backends serve images from the bucket's own URL.
    match config.assets.backend {
        AssetBackend::Filesystem => {
            router.route("/media/{*path}", get(handlers::media::serve_media))
        }
        AssetBackend::S3 => router,
    }
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn upload_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::upload::upload_images))
        .layer(handlers::upload::upload_body_limit(&config.assets))
}

fn machine_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::machine::list_machines,
            handlers::machine::create_machine
        ))
        .routes(routes!(
            handlers::machine::get_machine,
            handlers::machine::update_machine,
            handlers::machine::delete_machine
        ))
}

fn part_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::part::list_parts, handlers::part::create_part))
        .routes(routes!(handlers::part::update_part, handlers::part::delete_part))
}

fn blog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::blog::list_blogs, handlers::blog::create_blog))
        .routes(routes!(
            handlers::blog::get_blog,
            handlers::blog::update_blog,
            handlers::blog::delete_blog
        ))
}

fn enquiry_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::enquiry::submit_enquiry,
            handlers::enquiry::list_enquiries
        ))
        .routes(routes!(handlers::enquiry::mark_read))
}

fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::dashboard::counts))
}
