use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;

use crate::app::AppState;
use crate::authz::Caller;
use crate::errors::AppResult;
use crate::filters::scopes;
use crate::models::Data;
use crate::reports::{self, AnimaisPorEspecie, HectaresPorCultura, PropriedadesPorMunicipio};

#[utoipa::path(
    get,
    path = "/relatorios/propriedades-por-municipio",
    tag = "Relatorios",
    params(
        ("uf" = Option<String>, Query, description = "Exact state code"),
        ("municipio" = Option<String>, Query, description = "Exact municipality name")
    ),
    responses((status = 200, description = "Properties grouped by municipality", body = [PropriedadesPorMunicipio]))
)]
pub async fn propriedades_por_municipio(
    State(state): State<AppState>,
    _caller: Caller,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Data<Vec<PropriedadesPorMunicipio>>>> {
    let scope = state.filters.resolve(scopes::PROPRIEDADES_POR_MUNICIPIO, &params)?;
    let rows = reports::propriedades_por_municipio(&state.pool, &scope).await?;
    Ok(Json(Data::new(rows)))
}

#[utoipa::path(
    get,
    path = "/relatorios/animais-por-especie",
    tag = "Relatorios",
    params(("especie" = Option<String>, Query, description = "Exact species")),
    responses((status = 200, description = "Herds grouped by species", body = [AnimaisPorEspecie]))
)]
pub async fn animais_por_especie(
    State(state): State<AppState>,
    _caller: Caller,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Data<Vec<AnimaisPorEspecie>>>> {
    let scope = state.filters.resolve(scopes::ANIMAIS_POR_ESPECIE, &params)?;
    let rows = reports::animais_por_especie(&state.pool, &scope).await?;
    Ok(Json(Data::new(rows)))
}

#[utoipa::path(
    get,
    path = "/relatorios/hectares-por-cultura",
    tag = "Relatorios",
    params(("cultura" = Option<String>, Query, description = "Exact crop name")),
    responses((status = 200, description = "Production units grouped by crop", body = [HectaresPorCultura]))
)]
pub async fn hectares_por_cultura(
    State(state): State<AppState>,
    _caller: Caller,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Data<Vec<HectaresPorCultura>>>> {
    let scope = state.filters.resolve(scopes::HECTARES_POR_CULTURA, &params)?;
    let rows = reports::hectares_por_cultura(&state.pool, &scope).await?;
    Ok(Json(Data::new(rows)))
}
