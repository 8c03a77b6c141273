use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::authz::{roles_with, Capability, Role};
use crate::filters::{default_registry, FilterRegistry};
use crate::models;
use crate::reports;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::health::health,
		routes::auth::register,
		routes::auth::login,
		routes::auth::me,
		routes::auth::logout,
		routes::users::index,
		routes::users::store,
		routes::users::show,
		routes::users::update,
		routes::users::destroy,
		routes::reports::propriedades_por_municipio,
		routes::reports::animais_por_especie,
		routes::reports::hectares_por_cultura,
		routes::dashboard::stats
	),
	components(
		schemas(
			crate::authz::Role,
			models::PageMeta,
			models::MessageResponse,
			models::user::User,
			models::user::AuthResponse,
			models::user::LoginRequest,
			models::user::RegisterRequest,
			models::user::CreateUserRequest,
			models::user::UpdateUserRequest,
			routes::users::UserPage,
			routes::users::UserMessage,
			routes::health::HealthResponse,
			models::produtor::ProdutorRural,
			models::produtor::ProdutorRequest,
			models::propriedade::Propriedade,
			models::propriedade::PropriedadeRequest,
			models::rebanho::Rebanho,
			models::rebanho::RebanhoRequest,
			models::unidade_producao::UnidadeProducao,
			models::unidade_producao::UnidadeProducaoRequest,
			reports::PropriedadesPorMunicipio,
			reports::AnimaisPorEspecie,
			reports::HectaresPorCultura,
			reports::DashboardStats
		)
	),
	tags(
		(name = "Health", description = "Liveness and storage probe"),
		(name = "Auth", description = "Authentication endpoints"),
		(name = "Users", description = "Account management (admin only)"),
		(name = "Produtores", description = "Rural producers"),
		(name = "Propriedades", description = "Rural properties"),
		(name = "Rebanhos", description = "Herds"),
		(name = "Unidades de Produção", description = "Production units"),
		(name = "Relatorios", description = "Aggregate reports"),
		(name = "Dashboard", description = "Registry totals")
	)
)]
pub struct ApiDoc;

/// Documentation for one generic CRUD resource.
struct ResourceDoc {
	name: &'static str,
	tag: &'static str,
	schema: &'static str,
	request: &'static str,
}

const RESOURCE_DOCS: [ResourceDoc; 4] = [
	ResourceDoc {
		name: "produtores-rurais",
		tag: "Produtores",
		schema: "ProdutorRural",
		request: "ProdutorRequest",
	},
	ResourceDoc {
		name: "propriedades",
		tag: "Propriedades",
		schema: "Propriedade",
		request: "PropriedadeRequest",
	},
	ResourceDoc {
		name: "rebanhos",
		tag: "Rebanhos",
		schema: "Rebanho",
		request: "RebanhoRequest",
	},
	ResourceDoc {
		name: "unidades-producao",
		tag: "Unidades de Produção",
		schema: "UnidadeProducao",
		request: "UnidadeProducaoRequest",
	},
];

pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = serde_json::to_value(&ApiDoc::openapi())?;

	add_resource_paths(&mut doc, &default_registry())?;
	normalize_path_operations(&mut doc);
	ensure_security_components(&mut doc)?;
	ensure_global_security(&mut doc)?;
	ensure_servers(&mut doc, port);

	Ok(serde_json::from_value(doc)?)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> anyhow::Result<Router> {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true)
		.persist_authorization(true);

	let doc_json = Arc::new(serde_json::to_value(&doc).context("OpenAPI serialization failed")?);

	let json_route = {
		let doc_json = Arc::clone(&doc_json);
		get(move || {
			let doc_json = Arc::clone(&doc_json);
			async move { Json((*doc_json).clone()) }
		})
	};

	Ok(Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config)))
}

fn object_entry<'a>(value: &'a mut Value, key: &str) -> anyhow::Result<&'a mut Map<String, Value>> {
	value
		.as_object_mut()
		.context("OpenAPI node must be an object")?
		.entry(key.to_string())
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
		.with_context(|| format!("{key} must be an object"))
}

fn add_resource_paths(doc: &mut Value, registry: &FilterRegistry) -> anyhow::Result<()> {
	let paths = object_entry(doc, "paths")?;

	for resource in &RESOURCE_DOCS {
		let (collection, item) = resource_paths(resource, registry);
		for (path, value) in [(format!("/{}", resource.name), collection), (format!("/{}/{{id}}", resource.name), item)] {
			if let Some(existing) = paths.get_mut(path.as_str()) {
				merge_values(existing, &value);
			} else {
				paths.insert(path, value);
			}
		}
	}

	Ok(())
}

/// Operation description naming every role the gate admits.
fn requires_role(capability: Capability) -> String {
	let roles: Vec<&str> = roles_with(capability).iter().map(Role::as_str).collect();
	format!("Requires role: {}", roles.join(" or "))
}

fn resource_paths(resource: &ResourceDoc, registry: &FilterRegistry) -> (Value, Value) {
	let schema_ref = format!("#/components/schemas/{}", resource.schema);
	let request_ref = format!("#/components/schemas/{}", resource.request);
	let data = json!({"type": "object", "properties": {"data": {"$ref": schema_ref}}});
	let id_param = json!({"name": "id", "in": "path", "required": true, "schema": {"type": "integer", "format": "int64"}, "example": 1});

	let mut list_params = vec![
		json!({"name": "page", "in": "query", "required": false, "schema": {"type": "integer", "default": 1}}),
		json!({"name": "per_page", "in": "query", "required": false, "schema": {"type": "integer", "default": 15, "maximum": 100}}),
	];
	if let Some(spec) = registry.spec(resource.name) {
		list_params.extend(
			spec.fields()
				.map(|field| json!({"name": field, "in": "query", "required": false, "schema": {"type": "string"}})),
		);
	}

	let collection = json!({
		"get": {
			"tags": [resource.tag],
			"parameters": list_params,
			"responses": {
				"200": {
					"description": "Filtered, paginated list",
					"content": {"application/json": {"schema": {
						"type": "object",
						"properties": {
							"data": {"type": "array", "items": {"$ref": schema_ref}},
							"meta": {"$ref": "#/components/schemas/PageMeta"}
						}
					}}}
				},
				"401": {"description": "Unauthenticated"},
				"422": {"description": "Malformed filter value"}
			}
		},
		"post": {
			"tags": [resource.tag],
			"description": requires_role(Capability::Create),
			"requestBody": {"content": {"application/json": {"schema": {"$ref": request_ref}}}},
			"responses": {
				"201": {"description": "Created", "content": {"application/json": {"schema": data}}},
				"403": {"description": "Role lacks create"},
				"422": {"description": "Invalid payload"}
			}
		}
	});

	let item = json!({
		"get": {
			"tags": [resource.tag],
			"parameters": [id_param],
			"responses": {
				"200": {"description": "Detail", "content": {"application/json": {"schema": data}}},
				"404": {"description": "Not found"}
			}
		},
		"put": {
			"tags": [resource.tag],
			"description": requires_role(Capability::Edit),
			"parameters": [id_param],
			"requestBody": {"content": {"application/json": {"schema": {"$ref": request_ref}}}},
			"responses": {
				"200": {"description": "Updated", "content": {"application/json": {"schema": data}}},
				"403": {"description": "Role lacks edit"},
				"404": {"description": "Not found"},
				"422": {"description": "Invalid payload"}
			}
		},
		"delete": {
			"tags": [resource.tag],
			"description": requires_role(Capability::Delete),
			"parameters": [id_param],
			"responses": {
				"204": {"description": "Deleted"},
				"403": {"description": "Role lacks delete"},
				"404": {"description": "Not found"}
			}
		}
	});

	(collection, item)
}

fn normalize_path_operations(doc: &mut Value) {
	if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
		let snapshot = paths.clone();
		for (path, item) in snapshot {
			if let Some(ops) = item.as_object() {
				let mut normalized = Map::new();
				for (method, val) in ops {
					let key = method.to_lowercase();
					if let Some(existing) = normalized.get_mut(&key) {
						merge_values(existing, val);
					} else {
						normalized.insert(key, val.clone());
					}
				}
				paths.insert(path, Value::Object(normalized));
			}
		}
	}
}

fn ensure_security_components(doc: &mut Value) -> anyhow::Result<()> {
	let components = object_entry(doc, "components")?;
	let schemes = components
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
		.context("securitySchemes must be an object")?;

	schemes.insert(
		"bearerAuth".to_string(),
		json!({
			"type": "http",
			"scheme": "bearer",
			"bearerFormat": "JWT"
		}),
	);
	Ok(())
}

fn ensure_global_security(doc: &mut Value) -> anyhow::Result<()> {
	doc
		.as_object_mut()
		.context("OpenAPI root must be an object")?
		.entry("security")
		.or_insert_with(|| json!([{ "bearerAuth": [] }]));
	Ok(())
}

fn ensure_servers(doc: &mut Value, port: u16) {
	let server_url = format!("http://localhost:{}", port);

	match doc.get_mut("servers") {
		Some(Value::Array(arr)) => {
			let has = arr.iter().any(|v| v.get("url").and_then(Value::as_str) == Some(server_url.as_str()));
			if !has {
				arr.push(json!({ "url": server_url }));
			}
		}
		_ => {
			doc["servers"] = json!([{ "url": server_url }]);
		}
	}
}

fn merge_values(target: &mut Value, addition: &Value) {
	match (target, addition) {
		(Value::Object(dest), Value::Object(src)) => {
			for (key, value) in src {
				if let Some(existing) = dest.get_mut(key) {
					merge_values(existing, value);
				} else {
					dest.insert(key.clone(), value.clone());
				}
			}
		}
		(Value::Array(dest), Value::Array(src)) => {
			for item in src {
				if !dest.contains(item) {
					dest.push(item.clone());
				}
			}
		}
		_ => {}
	}
}
