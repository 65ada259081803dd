use crate::{
    access::Principal,
    errors::AppError,
    services::{
        AppState,
        stats_service::{ChartSeries, DashboardStats},
    },
};
use axum::{Json, extract::State};

/// GET `/admin/stats`
pub async fn dashboard_stats(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(state.stats.dashboard_stats(&principal).await?))
}

/// GET `/admin/stats/charts`
pub async fn chart_series(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<ChartSeries>, AppError> {
    Ok(Json(state.stats.chart_series(&principal).await?))
}
