//! Direct-message handlers.
//!
//! # Purpose
//! Contact list, conversation summaries, threads, sending, and read receipts.
//! Every operation that names another user checks the contact matrix first.
use crate::api::error::{
    ApiError, api_forbidden, api_internal, api_not_found, api_store_error, api_validation_error,
};
use crate::api::types::{
    ContactListResponse, ConversationListResponse, MarkReadRequest, MarkReadResponse,
    MessageCreateRequest, MessageListResponse, MessageQuery,
};
use crate::api::types::ErrorResponse;
use crate::app::AppState;
use crate::auth::session::require_session;
use crate::model::{ChatMessage, Conversation};
use crate::store::StoreError;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use internhub_policy::{Identity, can_message, chat_contact_roles};

async fn contacts_for(state: &AppState, identity: &Identity) -> Result<Vec<Identity>, ApiError> {
    let roles = chat_contact_roles(identity.role);
    if roles.is_empty() {
        return Ok(Vec::new());
    }
    Ok(state
        .store
        .list_users()
        .await
        .map_err(|err| api_internal("failed to list users", &err))?
        .into_iter()
        .map(|account| account.identity)
        .filter(|candidate| candidate.id != identity.id && roles.contains(&candidate.role))
        .collect())
}

/// Resolve `contact_id` and check the caller may talk to it.
async fn permitted_contact(
    state: &AppState,
    identity: &Identity,
    contact_id: &str,
) -> Result<Identity, ApiError> {
    let contact = match state.store.get_user(contact_id).await {
        Ok(account) => account.identity,
        Err(StoreError::NotFound(_)) => return Err(api_not_found("contact not found")),
        Err(err) => return Err(api_internal("failed to load contact", &err)),
    };
    if contact.id == identity.id || !can_message(identity.role, contact.role) {
        return Err(api_forbidden("contact is outside your chat list"));
    }
    Ok(contact)
}

#[utoipa::path(
    get,
    path = "/v1/contacts",
    tag = "chat",
    responses(
        (status = 200, description = "Users the caller may message", body = ContactListResponse)
    )
)]
pub(crate) async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ContactListResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let items = contacts_for(&state, &session.identity).await?;
    Ok(Json(ContactListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/conversations",
    tag = "chat",
    responses(
        (
            status = 200,
            description = "One summary per contact, most recent activity first",
            body = ConversationListResponse
        )
    )
)]
pub(crate) async fn list_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConversationListResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = &session.identity;
    let contacts = contacts_for(&state, identity).await?;
    let messages = state
        .store
        .list_messages_for(&identity.id)
        .await
        .map_err(|err| api_internal("failed to list messages", &err))?;

    let mut items: Vec<Conversation> = contacts
        .into_iter()
        .map(|contact| Conversation::summarize(&identity.id, contact, &messages))
        .collect();
    // Threads without messages sort last.
    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(Json(ConversationListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/messages",
    tag = "chat",
    params(MessageQuery),
    responses(
        (
            status = 200,
            description = "Thread with one contact, oldest first",
            body = MessageListResponse
        ),
        (
            status = 403,
            description = "Contact outside the caller's chat list",
            body = ErrorResponse
        ),
        (status = 404, description = "Unknown contact", body = ErrorResponse)
    )
)]
pub(crate) async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MessageQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = &session.identity;
    let contact = permitted_contact(&state, identity, &query.contact).await?;
    let items = state
        .store
        .list_messages_for(&identity.id)
        .await
        .map_err(|err| api_internal("failed to list messages", &err))?
        .into_iter()
        .filter(|message| message.is_between(&identity.id, &contact.id))
        .collect();
    Ok(Json(MessageListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/messages",
    tag = "chat",
    request_body = MessageCreateRequest,
    responses(
        (status = 201, description = "Message sent", body = ChatMessage),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (
            status = 403,
            description = "Receiver outside the caller's chat list",
            body = ErrorResponse
        )
    )
)]
pub(crate) async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MessageCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = &session.identity;
    let content = body.content.trim();
    if content.is_empty() {
        return Err(api_validation_error("message content is required"));
    }
    let receiver = permitted_contact(&state, identity, &body.receiver_id).await?;

    let message = ChatMessage::new(identity, &receiver.id, content.to_string(), Utc::now());
    let sent = state
        .store
        .create_message(message)
        .await
        .map_err(|err| api_store_error("message", err))?;
    tracing::debug!(
        message_id = %sent.id,
        sender = %identity.id,
        receiver = %receiver.id,
        "message sent"
    );
    Ok((StatusCode::CREATED, Json(sent)))
}

#[utoipa::path(
    post,
    path = "/v1/messages/read",
    tag = "chat",
    request_body = MarkReadRequest,
    responses(
        (
            status = 200,
            description = "Messages from the contact marked read",
            body = MarkReadResponse
        )
    )
)]
pub(crate) async fn mark_messages_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let contact = permitted_contact(&state, &session.identity, &body.contact_id).await?;
    let updated = state
        .store
        .mark_messages_read(&session.identity.id, &contact.id)
        .await
        .map_err(|err| api_internal("failed to mark messages read", &err))?;
    Ok(Json(MarkReadResponse { updated }))
}
