use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::bot::handlers::BotHandler;
use crate::database::models::{Event, Member};
use crate::database::RepositoryError;
use crate::services::reminder::{BatchReport, ReminderRunner};
use crate::utils::logging::log_database_error;

#[derive(Clone)]
pub struct ApiState {
    pub handler: BotHandler,
    pub reminders: ReminderRunner,
}

/// Inbound message as posted by the Twilio webhook.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventWithMembers {
    #[serde(flatten)]
    pub event: Event,
    pub members: Vec<Member>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/webhook", post(receive_message))
        .route("/events", get(list_events))
        .route("/send_reminders/:event_id", post(send_reminders))
        .with_state(state)
}

/// The served application: health routes and the api behind request tracing.
pub fn app(health: Router, state: ApiState) -> Router {
    health
        .merge(router(state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Always answers 200; handling failures are logged and replied to in-channel.
async fn receive_message(
    State(state): State<ApiState>,
    Form(message): Form<InboundMessage>,
) -> Json<Value> {
    state.handler.handle_message(&message.from, &message.body).await;
    Json(json!({ "status": "ok" }))
}

async fn list_events(State(state): State<ApiState>) -> Result<Json<Vec<EventWithMembers>>, StatusCode> {
    let pool = &state.handler.db.pool;
    let events = Event::list_all(pool).await.map_err(|e| {
        log_database_error("list_all", "events", &e.to_string(), None);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut listing = Vec::with_capacity(events.len());
    for event in events {
        let members = Member::find_by_event(pool, &event.id).await.map_err(|e| {
            log_database_error("find_by_event", "members", &e.to_string(), Some(&event.id));
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        listing.push(EventWithMembers { event, members });
    }

    Ok(Json(listing))
}

async fn send_reminders(
    State(state): State<ApiState>,
    Path(event_id): Path<String>,
) -> Result<Json<BatchReport>, StatusCode> {
    match state.reminders.send_event_reminders(&event_id).await {
        Ok(report) => Ok(Json(report)),
        Err(RepositoryError::NotFound(what)) => {
            tracing::debug!("Manual reminder for unknown {}", what);
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            tracing::error!("Manual reminder for {} failed: {}", event_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
