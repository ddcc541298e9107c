use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::category::Category;
use crate::domain::score::{ScoringTable, Tier};
use crate::domain::types::TrainerId;
use crate::dto::dashboard::OverviewDto;
use crate::forms::trainer_data::{TrainerForm, TrainerFormPayload};
use crate::repository::AppRepository;
use crate::routes::{TrainerQuery, base_context, redirect, render_template, trainer_url};
use crate::services::dashboard::{refresh_listings, show_overview};

#[get("/")]
pub async fn index(
    query: web::Query<TrainerQuery>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<AppRepository>,
    default_trainer: web::Data<TrainerId>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let trainer_id = query.resolve(&default_trainer);
    let snapshot = show_overview(&trainer_id, repo.get_ref());

    let mut context = base_context(&flash_messages, &trainer_id, "index");
    context.insert("overview", &OverviewDto::from(&snapshot));
    render_template(&tera, "main/index.html", &context)
}

#[get("/guide")]
pub async fn guide(
    query: web::Query<TrainerQuery>,
    flash_messages: IncomingFlashMessages,
    default_trainer: web::Data<TrainerId>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let trainer_id = query.resolve(&default_trainer);
    let table = ScoringTable::default();
    let tiers = [Tier::Gold, Tier::Silver, Tier::Bronze]
        .into_iter()
        .map(|tier| (tier.as_str(), tier.threshold()))
        .collect::<Vec<_>>();
    let targets = Category::ALL
        .into_iter()
        .filter_map(|category| {
            table
                .rule(category)
                .map(|rule| (category.display_name(), rule.target, rule.weight * 100.0))
        })
        .collect::<Vec<_>>();

    let mut context = base_context(&flash_messages, &trainer_id, "guide");
    context.insert("tiers", &tiers);
    context.insert("targets", &targets);
    render_template(&tera, "main/guide.html", &context)
}

#[post("/refresh")]
pub async fn refresh(
    repo: web::Data<AppRepository>,
    web::Form(form): web::Form<TrainerForm>,
) -> impl Responder {
    let payload: TrainerFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect("/");
        }
    };

    refresh_listings(repo.get_ref());
    FlashMessage::info("Listings reloaded.").send();
    redirect(&trainer_url("/", &payload.trainer_id))
}
