use axum::{extract::Path, routing::get, Json, Router};
use serde::Serialize;
use site_builder_core::document::templates::Template;
use site_builder_core::Document;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/templates", get(list_templates))
        .route("/v1/templates/{id}", get(get_template))
}

#[derive(Serialize)]
struct TemplateSummary {
    id: &'static str,
    name: &'static str,
}

async fn list_templates() -> Json<Vec<TemplateSummary>> {
    Json(
        Template::ALL
            .into_iter()
            .map(|t| TemplateSummary {
                id: t.id(),
                name: t.name(),
            })
            .collect(),
    )
}

/// A fresh document built from the template, with new ids every call.
async fn get_template(Path(id): Path<String>) -> ApiResult<Json<Document>> {
    let template =
        Template::from_id(&id).ok_or_else(|| ApiError::NotFound(format!("template {id:?}")))?;
    Ok(Json(template.create_config()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::routes::testing::{app, send, state};

    #[tokio::test]
    async fn lists_all_templates() {
        let (status, body) = send(app(state()), "GET", "/v1/templates", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["classic", "minimal", "full"]);
    }

    #[tokio::test]
    async fn fetches_one_template() {
        let (status, body) = send(app(state()), "GET", "/v1/templates/full", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], 2);
        assert_eq!(body["templateId"], "full");
        assert_eq!(body["pages"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let (status, body) = send(app(state()), "GET", "/v1/templates/brutalist", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], json!("notFound"));
    }
}
