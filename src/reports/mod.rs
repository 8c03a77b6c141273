//! Aggregation engine and the report catalog built on it.

mod catalog;
mod engine;

pub use catalog::{
    animais_por_especie, dashboard_totals, hectares_por_cultura, propriedades_por_municipio,
    AnimaisPorEspecie, DashboardStats, HectaresPorCultura, PropriedadesPorMunicipio,
    ANIMAIS_POR_ESPECIE, HECTARES_POR_CULTURA, PROPRIEDADES_POR_MUNICIPIO,
};
pub use engine::{aggregate, AggregateSpec, AggregateValue, GroupResult, Measure, MeasureKind};
