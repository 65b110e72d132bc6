use std::fs;
use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chart::{self, ChartKind, ChartRequest};
use crate::error::AppError;
use crate::render;
use crate::table::Table;
use crate::RenderOptions;

/// Rows shown in the upload preview.
pub const PREVIEW_ROWS: usize = 5;

/// Read-only server configuration. No request state survives between
/// invocations; every request re-evaluates from the posted bytes.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// CSV shown when nothing has been uploaded yet.
    pub sample_data: PathBuf,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            AppError::FileLoad(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        warn!(kind = self.kind(), "request failed: {}", self);
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "kind": self.kind(),
            "error": self.to_string(),
        }))
    }
}

#[derive(Debug, Deserialize)]
pub struct InspectRequest {
    pub csv: String,
}

#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub headers: Vec<String>,
    pub categorical: Vec<String>,
    pub numeric: Vec<String>,
    pub row_count: usize,
    pub preview: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct BuildChartRequest {
    pub csv: String,
    pub category_column: String,
    pub value_column: String,
    pub kind: ChartKind,
    #[serde(default)]
    pub options: RenderOptions,
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../assets/index.html"))
}

/// Load the posted CSV and report its columns and first rows.
#[post("/api/inspect")]
async fn inspect(request: web::Json<InspectRequest>) -> Result<HttpResponse, AppError> {
    let table = Table::from_reader(request.csv.as_bytes())?;
    info!(
        rows = table.row_count(),
        columns = table.headers.len(),
        "loaded table"
    );
    Ok(HttpResponse::Ok().json(InspectResponse {
        categorical: table.categorical_columns(),
        numeric: table.numeric_columns(),
        row_count: table.row_count(),
        preview: table.preview(PREVIEW_ROWS).to_vec(),
        headers: table.headers,
    }))
}

/// Re-evaluate from the posted bytes and selections, returning image bytes.
#[post("/api/chart")]
async fn build_chart(request: web::Json<BuildChartRequest>) -> Result<HttpResponse, AppError> {
    let BuildChartRequest {
        csv,
        category_column,
        value_column,
        kind,
        options,
    } = request.into_inner();

    let table = Table::from_reader(csv.as_bytes())?;
    let spec = chart::build(
        &table,
        &ChartRequest {
            category_column,
            value_column,
            kind,
        },
    )?;
    info!(title = %spec.title, "built chart");

    let bytes = render::render(&spec, &options)?;
    Ok(HttpResponse::Ok()
        .content_type(options.format.mime())
        .body(bytes))
}

/// The bundled fallback CSV, served raw so the page can drive the normal
/// inspect/chart flow with it.
#[get("/api/sample")]
async fn sample_data(config: web::Data<ServerConfig>) -> Result<HttpResponse, AppError> {
    let path = &config.sample_data;
    let text = fs::read_to_string(path).map_err(|err| {
        warn!(path = %path.display(), "sample data unavailable: {}", err);
        AppError::FileLoad(format!(
            "sample file '{}' not found; upload a CSV to begin",
            path.display()
        ))
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .body(text))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(inspect)
        .service(build_chart)
        .service(sample_data);
}
