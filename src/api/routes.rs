//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AdminRole, CreditLedgerEntry, OperationContext, PriceTable, Wedding, WeddingStatus};
use crate::error::AppError;
use crate::handlers::{
    AdminProfile, AdminQueryHandler, AuthResult, BalanceResult, CreateWeddingCommand,
    CreditQueryHandler, EstimateResult, GrantCreditsCommand, GrantCreditsHandler,
    GrantCreditsResult, LoginCommand, LoginHandler, PublishCommand, PublishHandler,
    PublishResult, ReconcileResult, RegisterCommand, RegisterHandler, UpdateWeddingCommand,
    WeddingHandler,
};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Option<AdminRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWeddingRequest {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWeddingRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub selected_design_key: Option<String>,
    #[serde(default)]
    pub selected_features: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<WeddingStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub wedding_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GrantCreditsRequest {
    pub amount: i64,
}

/// `?amount=N`, accepted in place of a JSON body
#[derive(Debug, Default, Deserialize)]
pub struct GrantCreditsQuery {
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

// =========================================================================
// API Routers
// =========================================================================

/// Routes reachable without a bearer token
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/credits/config", get(price_config))
}

/// Routes behind bearer authentication
pub fn protected_router() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/me", get(me))
        // Admins
        .route("/admins", get(list_admins))
        .route("/admins/:admin_id/credits", post(grant_credits))
        // Weddings
        .route("/weddings", post(create_wedding).get(list_weddings))
        .route("/weddings/publish", post(publish_wedding))
        .route("/weddings/:wedding_id", get(get_wedding).put(update_wedding))
        .route("/weddings/:wedding_id/upgrade", post(upgrade_wedding))
        .route("/weddings/:wedding_id/archive", post(archive_wedding))
        .route("/weddings/:wedding_id/estimate", get(estimate_wedding))
        // Credits
        .route("/credits/ledger", get(get_ledger))
        .route("/credits/balance", get(get_balance))
        .route("/credits/reconcile", get(reconcile_ledger))
}

// =========================================================================
// GET /health
// =========================================================================

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "wedding-platform",
    })
}

// =========================================================================
// Auth: POST /auth/register, POST /auth/login, GET /auth/me
// =========================================================================

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResult>), AppError> {
    let handler = RegisterHandler::new(
        state.store,
        state.tokens,
        state.settings.allow_super_admin_signup,
    );

    let command = RegisterCommand::new(request.email, request.password, request.full_name);
    let command = match request.role {
        Some(role) => command.with_role(role),
        None => command,
    };

    let result = handler.execute(command).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResult>, AppError> {
    let handler = LoginHandler::new(state.store, state.tokens);
    let result = handler
        .execute(LoginCommand::new(request.email, request.password))
        .await?;
    Ok(Json(result))
}

async fn me(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<AdminProfile>, AppError> {
    let handler = AdminQueryHandler::new(state.store);
    Ok(Json(handler.me(&context).await?))
}

// =========================================================================
// Admins: GET /admins, POST /admins/:admin_id/credits
// =========================================================================

async fn list_admins(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<AdminProfile>>, AppError> {
    let handler = AdminQueryHandler::new(state.store);
    Ok(Json(handler.list(&context).await?))
}

async fn grant_credits(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(admin_id): Path<Uuid>,
    Query(query): Query<GrantCreditsQuery>,
    body: Option<Json<GrantCreditsRequest>>,
) -> Result<Json<GrantCreditsResult>, AppError> {
    let amount = query
        .amount
        .or(body.map(|Json(request)| request.amount))
        .ok_or_else(|| AppError::InvalidRequest("amount is required".to_string()))?;

    let handler = GrantCreditsHandler::new(state.store, state.locks);
    let result = handler
        .execute(GrantCreditsCommand::new(admin_id, amount), &context)
        .await?;
    Ok(Json(result))
}

// =========================================================================
// Weddings
// =========================================================================

fn wedding_handler(state: AppState) -> WeddingHandler {
    WeddingHandler::new(state.store, state.prices)
}

async fn create_wedding(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateWeddingRequest>,
) -> Result<(StatusCode, Json<Wedding>), AppError> {
    let wedding = wedding_handler(state)
        .create(CreateWeddingCommand::new(request.title, request.slug), &context)
        .await?;
    Ok((StatusCode::CREATED, Json(wedding)))
}

async fn list_weddings(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Wedding>>, AppError> {
    Ok(Json(wedding_handler(state).list(&context).await?))
}

async fn get_wedding(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(wedding_id): Path<Uuid>,
) -> Result<Json<Wedding>, AppError> {
    Ok(Json(wedding_handler(state).get(wedding_id, &context).await?))
}

async fn update_wedding(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(wedding_id): Path<Uuid>,
    Json(request): Json<UpdateWeddingRequest>,
) -> Result<Json<Wedding>, AppError> {
    let command = UpdateWeddingCommand {
        title: request.title,
        slug: request.slug,
        selected_design_key: request.selected_design_key,
        selected_features: request.selected_features,
        status: request.status,
    };
    let wedding = wedding_handler(state)
        .update(wedding_id, command, &context)
        .await?;
    Ok(Json(wedding))
}

async fn archive_wedding(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(wedding_id): Path<Uuid>,
) -> Result<Json<Wedding>, AppError> {
    Ok(Json(wedding_handler(state).archive(wedding_id, &context).await?))
}

async fn estimate_wedding(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(wedding_id): Path<Uuid>,
) -> Result<Json<EstimateResult>, AppError> {
    Ok(Json(wedding_handler(state).estimate(wedding_id, &context).await?))
}

// =========================================================================
// Publish: POST /weddings/publish, POST /weddings/:wedding_id/upgrade
// =========================================================================

fn publish_handler(state: AppState) -> PublishHandler {
    PublishHandler::new(
        state.store,
        state.prices,
        state.locks,
        state.settings.allow_published_upgrade,
    )
}

async fn publish_wedding(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<PublishResult>, AppError> {
    let result = publish_handler(state)
        .execute(PublishCommand::publish(request.wedding_id), &context)
        .await?;
    Ok(Json(result))
}

async fn upgrade_wedding(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(wedding_id): Path<Uuid>,
) -> Result<Json<PublishResult>, AppError> {
    let result = publish_handler(state)
        .execute(PublishCommand::upgrade(wedding_id), &context)
        .await?;
    Ok(Json(result))
}

// =========================================================================
// Credits
// =========================================================================

async fn get_ledger(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<CreditLedgerEntry>>, AppError> {
    let handler = CreditQueryHandler::new(state.store);
    Ok(Json(handler.ledger(&context).await?))
}

async fn get_balance(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<BalanceResult>, AppError> {
    let handler = CreditQueryHandler::new(state.store);
    Ok(Json(handler.balance(&context).await?))
}

async fn reconcile_ledger(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<ReconcileResult>, AppError> {
    let handler = CreditQueryHandler::new(state.store);
    Ok(Json(handler.reconcile(&context).await?))
}

async fn price_config(State(state): State<AppState>) -> Json<PriceTable> {
    Json(state.prices.as_ref().clone())
}
