use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::engine::{aggregate, AggregateSpec, GroupResult, Measure, MeasureKind};
use crate::errors::{AppError, AppResult};
use crate::filters::Predicate;

pub const PROPRIEDADES_POR_MUNICIPIO: AggregateSpec = AggregateSpec {
    table: "propriedades",
    group_by: &["municipio", "uf"],
    measures: &[
        Measure::new(MeasureKind::Count, "total_propriedades"),
        Measure::new(MeasureKind::Sum("area_total"), "area_total_ha"),
        Measure::new(MeasureKind::CountDistinct("produtor_id"), "total_produtores"),
    ],
};

pub const ANIMAIS_POR_ESPECIE: AggregateSpec = AggregateSpec {
    table: "rebanhos",
    group_by: &["especie"],
    measures: &[
        Measure::new(MeasureKind::Sum("quantidade"), "total_animais"),
        Measure::new(MeasureKind::Count, "total_rebanhos"),
        Measure::new(MeasureKind::CountDistinct("propriedade_id"), "total_propriedades"),
        Measure::new(MeasureKind::Avg("quantidade"), "media_animais_por_rebanho"),
    ],
};

pub const HECTARES_POR_CULTURA: AggregateSpec = AggregateSpec {
    table: "unidades_producao",
    group_by: &["nome_cultura"],
    measures: &[
        Measure::new(MeasureKind::Sum("area_total_ha"), "total_hectares"),
        Measure::new(MeasureKind::Count, "total_unidades"),
        Measure::new(MeasureKind::CountDistinct("propriedade_id"), "total_propriedades"),
        Measure::new(MeasureKind::Avg("area_total_ha"), "media_hectares_por_unidade"),
    ],
};

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct PropriedadesPorMunicipio {
    pub municipio: String,
    pub uf: String,
    pub total_propriedades: i64,
    pub area_total_ha: f64,
    pub total_produtores: i64,
}

impl TryFrom<&GroupResult> for PropriedadesPorMunicipio {
    type Error = AppError;

    fn try_from(group: &GroupResult) -> AppResult<Self> {
        Ok(Self {
            municipio: group.key(0).to_string(),
            uf: group.key(1).to_string(),
            total_propriedades: group.value("total_propriedades")?.as_i64(),
            area_total_ha: group.value("area_total_ha")?.as_f64(),
            total_produtores: group.value("total_produtores")?.as_i64(),
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct AnimaisPorEspecie {
    pub especie: String,
    pub total_animais: i64,
    pub total_rebanhos: i64,
    pub total_propriedades: i64,
    pub media_animais_por_rebanho: f64,
}

impl TryFrom<&GroupResult> for AnimaisPorEspecie {
    type Error = AppError;

    fn try_from(group: &GroupResult) -> AppResult<Self> {
        Ok(Self {
            especie: group.key(0).to_string(),
            // head counts are whole animals
            total_animais: group.value("total_animais")?.as_i64(),
            total_rebanhos: group.value("total_rebanhos")?.as_i64(),
            total_propriedades: group.value("total_propriedades")?.as_i64(),
            media_animais_por_rebanho: group.value("media_animais_por_rebanho")?.as_f64(),
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct HectaresPorCultura {
    pub cultura: String,
    pub total_hectares: f64,
    pub total_unidades: i64,
    pub total_propriedades: i64,
    pub media_hectares_por_unidade: f64,
}

impl TryFrom<&GroupResult> for HectaresPorCultura {
    type Error = AppError;

    fn try_from(group: &GroupResult) -> AppResult<Self> {
        Ok(Self {
            cultura: group.key(0).to_string(),
            total_hectares: group.value("total_hectares")?.as_f64(),
            total_unidades: group.value("total_unidades")?.as_i64(),
            total_propriedades: group.value("total_propriedades")?.as_i64(),
            media_hectares_por_unidade: group.value("media_hectares_por_unidade")?.as_f64(),
        })
    }
}

async fn run<T>(pool: &SqlitePool, spec: &AggregateSpec, scope: &Predicate) -> AppResult<Vec<T>>
where
    T: for<'a> TryFrom<&'a GroupResult, Error = AppError>,
{
    let groups = aggregate(pool, spec, scope).await?;
    groups.iter().map(T::try_from).collect()
}

pub async fn propriedades_por_municipio(
    pool: &SqlitePool,
    scope: &Predicate,
) -> AppResult<Vec<PropriedadesPorMunicipio>> {
    run(pool, &PROPRIEDADES_POR_MUNICIPIO, scope).await
}

pub async fn animais_por_especie(
    pool: &SqlitePool,
    scope: &Predicate,
) -> AppResult<Vec<AnimaisPorEspecie>> {
    run(pool, &ANIMAIS_POR_ESPECIE, scope).await
}

pub async fn hectares_por_cultura(
    pool: &SqlitePool,
    scope: &Predicate,
) -> AppResult<Vec<HectaresPorCultura>> {
    run(pool, &HECTARES_POR_CULTURA, scope).await
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_produtores: i64,
    pub total_propriedades: i64,
    pub total_animais: i64,
    pub total_hectares: f64,
}

/// Registry totals. Hectares are the cultivated area of production units,
/// not the declared property area.
pub async fn dashboard_totals(pool: &SqlitePool) -> AppResult<DashboardStats> {
    let (total_produtores, total_propriedades, total_animais, total_hectares): (i64, i64, i64, f64) =
        sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM produtores_rurais), \
                (SELECT COUNT(*) FROM propriedades), \
                (SELECT COALESCE(SUM(quantidade), 0) FROM rebanhos), \
                (SELECT CAST(COALESCE(SUM(area_total_ha), 0) AS REAL) FROM unidades_producao)",
        )
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        total_produtores,
        total_propriedades,
        total_animais,
        total_hectares,
    })
}
