use api_types::contact::{ContactNew, ContactView};
use axum::{Json, extract::State, http::StatusCode};
use engine::{ContactMessage, NewContactCmd};

use crate::{ServerError, server::ServerState};

fn contact_view(contact: ContactMessage) -> ContactView {
    ContactView {
        id: contact.id,
        name: contact.name,
        email: contact.email,
        message: contact.message,
        created_at: contact.created_at.fixed_offset(),
    }
}

/// Public contact form; no session required.
pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<ContactNew>,
) -> Result<(StatusCode, Json<ContactView>), ServerError> {
    let cmd = NewContactCmd::new(payload.name, payload.email, payload.message);
    let contact = state.engine.submit_contact(cmd).await?;
    Ok((StatusCode::CREATED, Json(contact_view(contact))))
}
