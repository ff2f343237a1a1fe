use actix_web::error::InternalError;
use actix_web::HttpResponse;
use paperclip::actix::web;

use crate::api::MessageResponse;
use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/books")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::get_all_books))
                        .route(web::post().to(handlers::add_book)),
                )
                .service(
                    web::resource("/{book_id}")
                        .route(web::get().to(handlers::get_book))
                        .route(web::put().to(handlers::update_book))
                        .route(web::delete().to(handlers::delete_book)),
                ),
        );
}

/// Answers unparsable request bodies with the same fail envelope as validation errors.
/// Bodies without a content type are read as JSON.
pub fn json_config() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| {
            tracing::warn!("Rejected request body: {}", err);
            let response = HttpResponse::BadRequest().json(MessageResponse::fail(format!(
                "{} {}",
                handlers::MALFORMED_BODY,
                err
            )));
            InternalError::from_response(err, response).into()
        })
}
