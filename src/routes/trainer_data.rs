use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::category::Category;
use crate::domain::types::{RowId, TrainerId};
use crate::dto::dashboard::{CategoryLinkDto, RowDto, add_form_fields};
use crate::forms::trainer_data::{
    AddRowForm, AddRowFormPayload, DeleteRowForm, DeleteRowFormPayload, UpdateRowForm,
    UpdateRowFormPayload,
};
use crate::models::config::ServerConfig;
use crate::repository::AppRepository;
use crate::routes::{
    TrainerQuery, base_context, redirect, render_template, send_notice, trainer_url,
};
use crate::services::ServiceError;
use crate::services::dashboard::count_by_owner;
use crate::services::trainer_data::{
    add_row as add_row_service, delete_row as delete_row_service,
    list_rows as list_rows_service, resolve_category, update_row as update_row_service,
};
use crate::tone::ToneAnalysisClient;

fn data_url(category: Category, trainer_id: &TrainerId) -> String {
    trainer_url(&format!("/data/{}", category.slug()), trainer_id)
}

/// Where to send the user back to when a submitted form is rejected.
fn back_url(path: &str, raw_trainer_id: &str) -> String {
    match TrainerId::new(raw_trainer_id) {
        Ok(trainer_id) => trainer_url(path, &trainer_id),
        Err(_) => path.to_string(),
    }
}

#[get("/data/{slug}")]
pub async fn show_rows(
    slug: web::Path<String>,
    query: web::Query<TrainerQuery>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<AppRepository>,
    default_trainer: web::Data<TrainerId>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let category = match resolve_category(&slug) {
        Ok(category) => category,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    let trainer_id = query.resolve(&default_trainer);

    let mut context = base_context(&flash_messages, &trainer_id, category.slug());
    match list_rows_service(&trainer_id, category.slug(), repo.get_ref()) {
        Ok(rows) => {
            context.insert("rows", &rows.iter().map(RowDto::from).collect::<Vec<_>>());
        }
        Err(e) => {
            // The page still renders, with the failure in place of the listing.
            context.insert("rows", &Vec::<RowDto>::new());
            context.insert("load_error", &e.to_string());
        }
    }
    let count = count_by_owner(&trainer_id, repo.get_ref()).get(category);
    context.insert("category", &CategoryLinkDto::from(category));
    context.insert("count", &count);
    context.insert("is_tone", &(category == Category::Tone));
    render_template(&tera, "data/index.html", &context)
}

#[get("/data/{slug}/new")]
pub async fn new_row(
    slug: web::Path<String>,
    query: web::Query<TrainerQuery>,
    flash_messages: IncomingFlashMessages,
    default_trainer: web::Data<TrainerId>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let category = match resolve_category(&slug) {
        Ok(category) => category,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    let trainer_id = query.resolve(&default_trainer);

    let mut context = base_context(&flash_messages, &trainer_id, category.slug());
    context.insert("category", &CategoryLinkDto::from(category));
    context.insert("fields", &add_form_fields(category));
    context.insert("is_tone", &(category == Category::Tone));
    render_template(&tera, "data/new.html", &context)
}

#[post("/data/{slug}")]
pub async fn add_row(
    slug: web::Path<String>,
    repo: web::Data<AppRepository>,
    tone: web::Data<ToneAnalysisClient>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<AddRowForm>,
) -> impl Responder {
    let category = match resolve_category(&slug) {
        Ok(category) => category,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    let back = back_url(&format!("/data/{}/new", category.slug()), &form.trainer_id);
    let payload: AddRowFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&back);
        }
    };
    let trainer_id = payload.trainer_id.clone();
    let timeout = server_config.tone_after_insert_timeout();

    match add_row_service(payload, category, repo.get_ref(), tone.get_ref(), timeout).await {
        Ok(notice) => {
            send_notice(notice);
            redirect(&data_url(category, &trainer_id))
        }
        Err(ServiceError::Validation(message)) => {
            FlashMessage::error(message).send();
            redirect(&back)
        }
        Err(err) => {
            FlashMessage::error(format!("Failed to add the row: {err}")).send();
            redirect(&back)
        }
    }
}

#[post("/data/{slug}/{row_id}/update")]
pub async fn update_row(
    path: web::Path<(String, i32)>,
    repo: web::Data<AppRepository>,
    web::Form(form): web::Form<UpdateRowForm>,
) -> impl Responder {
    let (slug, row_id) = path.into_inner();
    let category = match resolve_category(&slug) {
        Ok(category) => category,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    let back = back_url(&format!("/data/{}", category.slug()), &form.trainer_id);
    let payload: UpdateRowFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&back);
        }
    };
    let trainer_id = payload.trainer_id.clone();
    let row_id = match RowId::new(row_id) {
        Ok(id) => id,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&data_url(category, &trainer_id));
        }
    };

    match update_row_service(category, row_id, payload, repo.get_ref()) {
        Ok(()) => FlashMessage::success("Row updated.").send(),
        Err(err) => FlashMessage::error(format!("Update failed: {err}")).send(),
    }

    redirect(&data_url(category, &trainer_id))
}

#[post("/data/{slug}/{row_id}/delete")]
pub async fn delete_row(
    path: web::Path<(String, i32)>,
    repo: web::Data<AppRepository>,
    web::Form(form): web::Form<DeleteRowForm>,
) -> impl Responder {
    let (slug, row_id) = path.into_inner();
    let category = match resolve_category(&slug) {
        Ok(category) => category,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    let back = back_url(&format!("/data/{}", category.slug()), &form.trainer_id);
    let payload: DeleteRowFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::warning(e.to_string()).send();
            return redirect(&back);
        }
    };
    let row_id = match RowId::new(row_id) {
        Ok(id) => id,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&data_url(category, &payload.trainer_id));
        }
    };

    match delete_row_service(category, row_id, repo.get_ref()) {
        Ok(()) => FlashMessage::success("Row deleted.").send(),
        Err(err) => FlashMessage::error(format!("Delete failed: {err}")).send(),
    }

    redirect(&data_url(category, &payload.trainer_id))
}
