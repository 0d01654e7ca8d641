//! Region and commune endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use ecocomb_common::AppResult;
use ecocomb_db::entities::{commune, region};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Region response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionResponse {
    pub id: String,
    pub name: String,
}

impl From<region::Model> for RegionResponse {
    fn from(region: region::Model) -> Self {
        Self {
            id: region.id,
            name: region.name,
        }
    }
}

/// Commune response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneResponse {
    pub id: String,
    pub region_id: Option<String>,
    pub name: String,
}

impl From<commune::Model> for CommuneResponse {
    fn from(commune: commune::Model) -> Self {
        Self {
            id: commune.id,
            region_id: commune.region_id,
            name: commune.name,
        }
    }
}

async fn regions(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<RegionResponse>>> {
    let regions = state.geo_service.regions().await?;
    Ok(ApiResponse::ok(regions.into_iter().map(Into::into).collect()))
}

async fn communes(
    State(state): State<AppState>,
    Path(region_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommuneResponse>>> {
    let communes = state.geo_service.communes(&region_id).await?;
    Ok(ApiResponse::ok(communes.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/regions", get(regions))
        .route("/regions/{id}/communes", get(communes))
}
