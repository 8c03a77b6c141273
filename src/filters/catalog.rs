use super::registry::{FieldFilter, FilterRegistry, FilterSpec};

/// Resource names as they appear in the URL.
pub mod resources {
    pub const PRODUTORES: &str = "produtores-rurais";
    pub const PROPRIEDADES: &str = "propriedades";
    pub const REBANHOS: &str = "rebanhos";
    pub const UNIDADES: &str = "unidades-producao";
    pub const USERS: &str = "users";
}

/// Report scopes share the registry with resources.
pub mod scopes {
    pub const PROPRIEDADES_POR_MUNICIPIO: &str = "relatorios/propriedades-por-municipio";
    pub const ANIMAIS_POR_ESPECIE: &str = "relatorios/animais-por-especie";
    pub const HECTARES_POR_CULTURA: &str = "relatorios/hectares-por-cultura";
}

/// Filters for every resource and report. Users have none and resolve to identity.
pub fn default_registry() -> FilterRegistry {
    FilterRegistry::new()
        .register(
            resources::PRODUTORES,
            FilterSpec::new()
                .field(FieldFilter::contains("nome", "nome"))
                .field(FieldFilter::exact_text("cpf_cnpj", "cpf_cnpj"))
                .field(FieldFilter::exact_text("email", "email")),
        )
        .register(
            resources::PROPRIEDADES,
            FilterSpec::new()
                .field(FieldFilter::contains("nome", "nome"))
                .field(FieldFilter::contains("municipio", "municipio"))
                .field(FieldFilter::exact_text("uf", "uf"))
                .field(FieldFilter::exact_text("inscricao_estadual", "inscricao_estadual"))
                .field(FieldFilter::exact_integer("produtor_id", "produtor_id"))
                .field(FieldFilter::same_day("created_at", "created_at")),
        )
        .register(
            resources::REBANHOS,
            FilterSpec::new()
                .field(FieldFilter::contains("especie", "especie"))
                .field(FieldFilter::contains("finalidade", "finalidade"))
                .field(FieldFilter::exact_integer("propriedade_id", "propriedade_id"))
                .field(FieldFilter::owned_through(
                    "produtor_id",
                    "propriedade_id",
                    "propriedades",
                    "produtor_id",
                ))
                .field(FieldFilter::same_day("created_at", "created_at")),
        )
        .register(
            resources::UNIDADES,
            FilterSpec::new()
                .field(FieldFilter::contains("nome_cultura", "nome_cultura"))
                .field(FieldFilter::exact_number("area_total_ha", "area_total_ha"))
                .field(FieldFilter::contains(
                    "coordenadas_geograficas",
                    "coordenadas_geograficas",
                ))
                .field(FieldFilter::exact_integer("propriedade_id", "propriedade_id"))
                .field(FieldFilter::same_day("created_at", "created_at")),
        )
        .register(
            scopes::PROPRIEDADES_POR_MUNICIPIO,
            FilterSpec::new()
                .field(FieldFilter::exact_text("uf", "uf"))
                .field(FieldFilter::exact_text("municipio", "municipio")),
        )
        .register(
            scopes::ANIMAIS_POR_ESPECIE,
            FilterSpec::new().field(FieldFilter::exact_text("especie", "especie")),
        )
        .register(
            scopes::HECTARES_POR_CULTURA,
            FilterSpec::new().field(FieldFilter::exact_text("cultura", "nome_cultura")),
        )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sqlx::{QueryBuilder, Sqlite};

    use super::*;
    use crate::filters::{FilterValue, Predicate};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn property_filters_are_order_independent() {
        let registry = default_registry();
        let a = registry
            .resolve(
                resources::PROPRIEDADES,
                &params(&[("municipio", "Fortaleza"), ("produtor_id", "7")]),
            )
            .unwrap();
        let b = registry
            .resolve(
                resources::PROPRIEDADES,
                &params(&[("produtor_id", "7"), ("municipio", "Fortaleza")]),
            )
            .unwrap();
        assert_eq!(a, b);

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM propriedades WHERE 1=1");
        a.push_sql(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT id FROM propriedades WHERE 1=1 AND instr(municipio, ?) > 0 AND produtor_id = ?"
        );
    }

    #[test]
    fn herd_producer_filter_goes_through_the_property() {
        let predicate = default_registry()
            .resolve(resources::REBANHOS, &params(&[("produtor_id", "4")]))
            .unwrap();
        assert_eq!(
            predicate,
            Predicate::All(vec![Predicate::Related {
                column: "propriedade_id",
                parent_table: "propriedades",
                parent_column: "produtor_id",
                value: 4,
            }])
        );
    }

    #[test]
    fn users_have_no_filters() {
        let registry = default_registry();
        assert!(registry.spec(resources::USERS).is_none());
        let predicate = registry
            .resolve(resources::USERS, &params(&[("name", "Ana")]))
            .unwrap();
        assert!(predicate.is_identity());
    }

    #[test]
    fn report_scope_maps_cultura_to_column() {
        let predicate = default_registry()
            .resolve(scopes::HECTARES_POR_CULTURA, &params(&[("cultura", "Milho")]))
            .unwrap();
        assert_eq!(
            predicate,
            Predicate::All(vec![Predicate::Equals {
                column: "nome_cultura",
                value: FilterValue::Text("Milho".to_string()),
            }])
        );
    }

    #[test]
    fn registered_field_order_is_stable() {
        let registry = default_registry();
        let fields: Vec<_> = registry
            .spec(resources::UNIDADES)
            .map(|spec| spec.fields().collect())
            .unwrap_or_default();
        assert_eq!(
            fields,
            vec![
                "nome_cultura",
                "area_total_ha",
                "coordenadas_geograficas",
                "propriedade_id",
                "created_at"
            ]
        );
    }
}
