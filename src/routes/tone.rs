use actix_web::{Responder, post, web};
use actix_web_flash_messages::FlashMessage;

use crate::domain::category::Category;
use crate::forms::trainer_data::{TrainerForm, TrainerFormPayload};
use crate::models::config::ServerConfig;
use crate::routes::{redirect, send_notice, trainer_url};
use crate::services::tone::trigger_tone_analysis;
use crate::tone::ToneAnalysisClient;

#[post("/tone/analyze")]
pub async fn analyze_tone(
    tone: web::Data<ToneAnalysisClient>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<TrainerForm>,
) -> impl Responder {
    let tone_page = format!("/data/{}", Category::Tone.slug());
    let payload: TrainerFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&tone_page);
        }
    };
    let back = trainer_url(&tone_page, &payload.trainer_id);

    match trigger_tone_analysis(payload, tone.get_ref(), server_config.tone_manual_timeout()).await
    {
        Ok(notice) => send_notice(notice),
        Err(err) => FlashMessage::error(err.to_string()).send(),
    }

    redirect(&back)
}
