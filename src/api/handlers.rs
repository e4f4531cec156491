use crate::advisory::{disease, recommendation, yield_forecast, YieldConditions};
use crate::api::AppState;
use crate::chatbot::{ChatResponse, Exchange};
use crate::error::{AppError, Result};
use crate::ml::ArtifactReport;
use crate::models::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: state.config.observability.service_name.clone(),
        uptime_seconds: state.uptime_seconds(),
        models: state.models.report.clone(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub uptime_seconds: u64,
    pub models: Vec<ArtifactReport>,
}

/// Prometheus metrics in text exposition format
pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    crate::metrics::UPTIME_SECONDS.set(state.uptime_seconds() as f64);
    (StatusCode::OK, crate::metrics::gather_metrics())
}

/// Required keys present and parseable as numbers
fn require_numbers(input: &PredictionInput, fields: &[&str]) -> Result<()> {
    input.ensure_present(fields)?;
    for field in fields {
        input.number(field)?;
    }
    Ok(())
}

/// Key naming the user whose history receives the answer
const OWNER_FIELD: &str = "user_id";

/// Keep the answer in the caller's history when the input names a user
async fn remember(
    state: &AppState,
    input: &PredictionInput,
    prediction_type: PredictionType,
    output: Value,
    confidence_score: Option<f64>,
) -> Result<()> {
    let Some(owner) = input.text_opt(OWNER_FIELD) else {
        return Ok(());
    };
    let record = PredictionRecord::new(
        &owner,
        prediction_type,
        input.as_value(),
        output,
        confidence_score,
    );
    state.predictions.record(record).await
}

/// Ranked crop suggestions
pub async fn recommend_crops(
    State(state): State<AppState>,
    Json(input): Json<PredictionInput>,
) -> Result<Json<Value>> {
    require_numbers(&input, &recommendation::REQUIRED_FIELDS)?;

    let recommendations = state.advisory.recommendations.recommend(&input);
    remember(
        &state,
        &input,
        PredictionType::CropRecommendation,
        serde_json::to_value(&recommendations)?,
        recommendations.first().map(|r| r.confidence),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "recommendations": recommendations,
        "input": input,
    })))
}

/// Yield forecast for one crop on one area
pub async fn predict_yield(
    State(state): State<AppState>,
    Json(input): Json<PredictionInput>,
) -> Result<Json<Value>> {
    input.ensure_present(&yield_forecast::REQUIRED_FIELDS)?;
    YieldConditions::from_input(&input)?;

    let prediction = state.advisory.yields.forecast(&input);
    if !prediction.is_degraded() {
        remember(
            &state,
            &input,
            PredictionType::YieldForecast,
            serde_json::to_value(&prediction)?,
            Some(prediction.confidence),
        )
        .await?;
    }

    Ok(Json(json!({
        "success": true,
        "prediction": prediction,
        "input": input,
    })))
}

pub async fn disease_risk(
    State(state): State<AppState>,
    Json(input): Json<PredictionInput>,
) -> Result<Json<Value>> {
    input.ensure_present(&disease::REQUIRED_FIELDS)?;

    let risk = state.advisory.disease.predict(&input)?;
    remember(
        &state,
        &input,
        PredictionType::DiseaseRisk,
        serde_json::to_value(&risk)?,
        Some(risk.risk_score),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "risk": risk,
        "input": input,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub user_id: Option<String>,
    pub language: Option<String>,
}

/// Ask the assistant a question
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("Le message est requis".to_string()));
    }

    let response = state.chatbot.respond(
        &request.message,
        request.user_id.as_deref(),
        request.language.as_deref(),
    );
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub success: bool,
    pub user_id: String,
    pub count: usize,
    pub history: Vec<Exchange>,
}

pub async fn chat_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ChatHistoryResponse>> {
    let history = state.chatbot.history(&user_id)?;
    Ok(Json(ChatHistoryResponse {
        success: true,
        user_id,
        count: history.len(),
        history,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct CropsQuery {
    /// Keep only crops whose optimal ranges contain both values
    pub temperature: Option<f64>,
    pub soil_ph: Option<f64>,
}

/// Crop catalogue
pub async fn list_crops(Query(query): Query<CropsQuery>) -> Result<Json<Value>> {
    let crops: Vec<&Crop> = match (query.temperature, query.soil_ph) {
        (Some(t), Some(ph)) => crop_catalogue().iter().filter(|c| c.suits(t, ph)).collect(),
        (None, None) => crop_catalogue().iter().collect(),
        _ => {
            return Err(AppError::Validation(
                "temperature and soil_ph must be given together".to_string(),
            ))
        }
    };

    Ok(Json(json!({
        "success": true,
        "count": crops.len(),
        "crops": crops,
    })))
}

pub async fn market_prices(
    State(state): State<AppState>,
    Query(filter): Query<MarketFilter>,
) -> Result<Json<Value>> {
    let prices = state.market.query(&filter).await?;

    Ok(Json(json!({
        "success": true,
        "count": prices.len(),
        "prices": prices,
    })))
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: Option<String>,
}

/// Register a farm
pub async fn create_farm(
    State(state): State<AppState>,
    Json(request): Json<NewFarm>,
) -> Result<(StatusCode, Json<Value>)> {
    request.validate()?;

    let farm = request.into_farm();
    state.farms.save_farm(&farm).await?;
    tracing::info!(farm_id = %farm.id, owner = %farm.owner, "Farm created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "farm": farm })),
    ))
}

/// Farms of the owner named in `?owner=`
pub async fn list_farms(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Value>> {
    let owner = query
        .owner
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Query parameter 'owner' is required".to_string()))?;

    let farms = state.farms.list_farms(&owner).await?;

    Ok(Json(json!({
        "success": true,
        "count": farms.len(),
        "farms": farms,
    })))
}

async fn load_farm(state: &AppState, id: &Uuid) -> Result<Farm> {
    state
        .farms
        .get_farm(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Farm {} not found", id)))
}

pub async fn get_farm(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let farm = load_farm(&state, &id).await?;
    Ok(Json(json!({ "success": true, "farm": farm })))
}

/// Replace a farm's fields, keeping its id and creation time
pub async fn replace_farm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NewFarm>,
) -> Result<Json<Value>> {
    request.validate()?;
    let existing = load_farm(&state, &id).await?;

    let farm = Farm {
        id,
        created_at: existing.created_at,
        updated_at: Utc::now(),
        ..request.into_farm()
    };
    state.farms.save_farm(&farm).await?;

    Ok(Json(json!({ "success": true, "farm": farm })))
}

pub async fn delete_farm(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.farms.delete_farm(&id).await?;
    tracing::info!(farm_id = %id, "Farm deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Record a crop season on a farm
pub async fn create_season(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Json(request): Json<NewCropSeason>,
) -> Result<(StatusCode, Json<Value>)> {
    request.validate()?;
    if request.expected_harvest_date < request.planting_date {
        return Err(AppError::Validation(
            "expected_harvest_date is before planting_date".to_string(),
        ));
    }
    load_farm(&state, &farm_id).await?;

    let season = state.farms.save_season(request.into_season(farm_id)).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "season": season })),
    ))
}

pub async fn list_seasons(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> Result<Json<Value>> {
    load_farm(&state, &farm_id).await?;
    let seasons = state.farms.list_seasons(&farm_id).await?;

    Ok(Json(json!({
        "success": true,
        "count": seasons.len(),
        "seasons": seasons,
    })))
}

pub async fn user_stats(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Value>> {
    let mut stats = state.farms.user_stats(&owner).await?;
    stats.total_predictions = state.predictions.count(&owner).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Recent advisory answers given to one user, newest first
pub async fn user_predictions(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.unwrap_or(DEFAULT_PREDICTION_LIMIT).max(1);
    let predictions = state.predictions.list(&owner, limit).await?;

    Ok(Json(json!({
        "success": true,
        "owner": owner,
        "count": predictions.len(),
        "predictions": predictions,
    })))
}
