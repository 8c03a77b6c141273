//! Demo data set: one account per role plus a small registry of producers,
//! properties, herds and production units in Ceará.

use anyhow::Context;
use chrono::Duration;
use sqlx::SqlitePool;

use crate::authz::Role;
use crate::utils::{hash_password, utc_now};

pub const DEFAULT_PASSWORD: &str = "password123";

const USERS: [(&str, &str, Role); 4] = [
    ("Admin do Sistema", "admin@adagri.ce.gov.br", Role::Admin),
    ("Gestor Agropecuário", "gestor@adagri.ce.gov.br", Role::Manager),
    ("Técnico de Campo", "tecnico@adagri.ce.gov.br", Role::Technician),
    ("Extensionista Rural", "extensionista@adagri.ce.gov.br", Role::ExtensionAgent),
];

const PRODUTORES: [(&str, &str, &str); 8] = [
    ("12345678901", "João Silva Santos", "joao.silva@email.com"),
    ("98765432100", "Maria Oliveira Costa", "maria.oliveira@email.com"),
    ("11223344556", "Pedro Alves Lima", "pedro.alves@email.com"),
    ("22334455667", "Ana Paula Ferreira", "ana.ferreira@email.com"),
    ("33445566778", "Carlos Eduardo Souza", "carlos.souza@email.com"),
    ("12345678000190", "Agropecuária Vale Verde Ltda", "contato@valeverde.com.br"),
    ("98765432000180", "Fazenda São José LTDA", "contato@fazendasaojose.com.br"),
    ("11122233000145", "Cooperativa Agrícola do Sertão", "contato@coopsertao.com.br"),
];

const PROPRIEDADES: [(&str, &str, f64, Option<&str>); 12] = [
    ("Fazenda Boa Vista", "Fortaleza", 125.50, Some("123456789")),
    ("Sítio Santa Clara", "Caucaia", 45.75, Some("234567890")),
    ("Fazenda São Pedro", "Aquiraz", 280.00, Some("345678901")),
    ("Chácara Recanto Verde", "Fortaleza", 15.25, None),
    ("Fazenda Vale do Sol", "Sobral", 450.00, Some("456789012")),
    ("Sítio Flores do Campo", "Juazeiro do Norte", 32.50, Some("567890123")),
    ("Fazenda Terra Fértil", "Crato", 380.75, Some("678901234")),
    ("Propriedade Rural Esperança", "Iguatu", 210.00, Some("789012345")),
    ("Sítio Bela Vista", "Quixadá", 55.00, None),
    ("Fazenda Monte Alto", "Fortaleza", 320.00, Some("901234567")),
    ("Sítio Primavera", "Caucaia", 68.25, Some("012345678")),
    ("Fazenda Nova Esperança", "Sobral", 500.00, Some("112233445")),
];

const ESPECIES: [(&str, &str, i64, i64); 5] = [
    ("Bovino", "Corte", 50, 500),
    ("Caprino", "Leite", 80, 400),
    ("Ovino", "Lã", 100, 600),
    ("Suíno", "Reprodução", 100, 800),
    ("Avícola", "Postura", 500, 5000),
];

const CULTURAS: [&str; 6] = ["Milho", "Feijão", "Mandioca", "Caju", "Algodão", "Sorgo"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub produtores: usize,
    pub propriedades: usize,
    pub rebanhos: usize,
    pub unidades: usize,
}

/// Inserts the demo data set in one transaction. Fails if it was already applied.
pub async fn run(pool: &SqlitePool, password: &str) -> anyhow::Result<SeedSummary> {
    let password_hash = hash_password(password)?;
    let now = utc_now();
    let mut summary = SeedSummary::default();
    let mut tx = pool.begin().await?;

    for (name, email, role) in USERS {
        sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(role)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to seed user {email}"))?;
        summary.users += 1;
    }

    let mut produtor_ids = Vec::with_capacity(PRODUTORES.len());
    for (index, (cpf_cnpj, nome, email)) in PRODUTORES.into_iter().enumerate() {
        let id: i64 = sqlx::query(
            "INSERT INTO produtores_rurais (nome, cpf_cnpj, telefone, email, endereco, data_cadastro, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(nome)
        .bind(cpf_cnpj)
        .bind(format!("859876543{:02}", 21 + index))
        .bind(email)
        .bind(Option::<String>::None)
        .bind((now - Duration::days(30 * index as i64)).date_naive())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to seed producer {cpf_cnpj}"))?
        .last_insert_rowid();
        produtor_ids.push(id);
        summary.produtores += 1;
    }

    let mut propriedade_ids = Vec::with_capacity(PROPRIEDADES.len());
    for (index, (nome, municipio, area_total, inscricao)) in PROPRIEDADES.into_iter().enumerate() {
        let produtor_id = produtor_ids[index % produtor_ids.len()];
        let id: i64 = sqlx::query(
            "INSERT INTO propriedades (nome, municipio, uf, inscricao_estadual, area_total, produtor_id, created_at, updated_at) \
             VALUES (?, ?, 'CE', ?, ?, ?, ?, ?)",
        )
        .bind(nome)
        .bind(municipio)
        .bind(inscricao)
        .bind(area_total)
        .bind(produtor_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to seed property {nome}"))?
        .last_insert_rowid();
        propriedade_ids.push((id, area_total));
        summary.propriedades += 1;
    }

    for (index, (propriedade_id, area_total)) in propriedade_ids.iter().copied().enumerate() {
        // two species per property, rotating through the list
        for offset in 0..2 {
            let (especie, finalidade, min, max) = ESPECIES[(index + offset * 2) % ESPECIES.len()];
            let quantidade = min + ((index as i64 * 97 + offset as i64 * 53) % (max - min + 1));
            sqlx::query(
                "INSERT INTO rebanhos (especie, quantidade, finalidade, data_atualizacao, propriedade_id, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(especie)
            .bind(quantidade)
            .bind(finalidade)
            .bind((now - Duration::days(index as i64)).date_naive())
            .bind(propriedade_id)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            summary.rebanhos += 1;
        }

        let cultura = CULTURAS[index % CULTURAS.len()];
        let area = (area_total * 0.4 * 100.0).round() / 100.0;
        sqlx::query(
            "INSERT INTO unidades_producao (nome_cultura, area_total_ha, coordenadas_geograficas, propriedade_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(cultura)
        .bind(area)
        .bind(format!("-3.{:04},-38.{:04}", 7000 + index * 37, 5000 + index * 41))
        .bind(propriedade_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        summary.unidades += 1;
    }

    tx.commit().await?;
    tracing::info!(?summary, "demo data seeded");
    Ok(summary)
}
