use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::domain::types::TrainerId;
use crate::dto::dashboard::category_links;
use crate::services::{Notice, NoticeLevel};

pub mod main;
pub mod tone;
pub mod trainer_data;

/// Query string selecting the trainer a page shows.
#[derive(Debug, Default, Deserialize)]
pub struct TrainerQuery {
    pub trainer_id: Option<String>,
}

impl TrainerQuery {
    /// The requested trainer, or `default` when none or an invalid one was
    /// given.
    pub fn resolve(&self, default: &TrainerId) -> TrainerId {
        let requested = self
            .trainer_id
            .as_deref()
            .filter(|value| !value.trim().is_empty());
        match requested.map(TrainerId::new) {
            Some(Ok(trainer_id)) => trainer_id,
            Some(Err(e)) => {
                log::warn!("Ignoring invalid trainer id: {e}");
                default.clone()
            }
            None => default.clone(),
        }
    }
}

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("Failed to render template '{template}': {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    trainer_id: &TrainerId,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("trainer_id", trainer_id.as_str());
    context.insert("current_page", current_page);
    context.insert("categories", &category_links());
    context
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Location of a page scoped to `trainer_id`.
pub fn trainer_url(path: &str, trainer_id: &TrainerId) -> String {
    format!("{path}?trainer_id={trainer_id}")
}

pub fn send_notice(notice: Notice) {
    match notice.level {
        NoticeLevel::Success => FlashMessage::success(notice.message).send(),
        NoticeLevel::Warning => FlashMessage::warning(notice.message).send(),
    }
}
