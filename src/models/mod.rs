pub mod produtor;
pub mod propriedade;
pub mod rebanho;
pub mod unidade_producao;
pub mod user;

use serde::Serialize;
use utoipa::ToSchema;

/// `{ "data": ... }` envelope used by show/store/update and report endpoints.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl PageMeta {
    pub fn new(current_page: i64, per_page: i64, total: i64) -> Self {
        let last_page = ((total + per_page - 1) / per_page).max(1);
        Self {
            current_page,
            per_page,
            total,
            last_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
