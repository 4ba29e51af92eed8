mod config;

use crate::config::Config;
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use doubt_core::prompts::{PromptSet, load_prompts};
use doubt_core::{Assistant, Cues, Outcome, Transcript, build_oracle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
struct AppState {
    assistant: Arc<Assistant>,
    videos: Arc<Videos>,
}

#[derive(Debug, Clone, Serialize)]
struct Videos {
    physics_video: String,
    avatar_video: String,
}

#[derive(Debug, Deserialize)]
struct QuestionRequest {
    #[serde(default)]
    question: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum QuestionResponse {
    Success {
        response_text: String,
        avatar_video: String,
        outcome: Outcome,
        topic: Option<&'static str>,
        cues: Cues,
    },
    Error {
        message: String,
    },
}

/// Returns the lesson and avatar video URLs.
async fn get_videos(State(state): State<AppState>) -> Json<Videos> {
    Json(state.videos.as_ref().clone())
}

/// Answers one question from the frontend.
///
/// The request body is `{"question": "..."}`; an empty question is a 400.
/// A body that does not parse gets the same error envelope with axum's status.
async fn save_question(
    State(state): State<AppState>,
    request: Result<Json<QuestionRequest>, JsonRejection>,
) -> (StatusCode, Json<QuestionResponse>) {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Rejected question body: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(QuestionResponse::Error {
                    message: rejection.body_text(),
                }),
            );
        }
    };

    let question = request.question.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(QuestionResponse::Error {
                message: "Empty question received".to_string(),
            }),
        );
    }

    info!("Received question: {:?}", question);
    let answer = state.assistant.answer(question).await;
    info!(outcome = ?answer.outcome, "Responding: {:?}", answer.response);

    (
        StatusCode::OK,
        Json(QuestionResponse::Success {
            response_text: answer.response,
            avatar_video: state.videos.avatar_video.clone(),
            outcome: answer.outcome,
            topic: answer.topic.map(|t| t.section),
            cues: answer.cues,
        }),
    )
}

async fn health() -> &'static str {
    "ok"
}

fn app(state: AppState) -> Router {
    // Configure a permissive CORS policy so a separately hosted frontend can call the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get_videos", get(get_videos))
        .route("/save_question", post(save_question))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    // --- 3. Load the Lesson ---
    let transcript = Transcript::from_path(&config.transcript_path)
        .context("Failed to load lesson transcript")?;

    let mut prompts = PromptSet::default();
    if let Some(dir) = &config.prompts_dir {
        let overrides = load_prompts(dir).context("Failed to load prompt overrides")?;
        info!("Loaded {} prompt overrides.", overrides.len());
        prompts = prompts.with_overrides(&overrides);
    }

    // --- 4. Build the Assistant ---
    let timeout = config.oracle.timeout();
    let assistant = Assistant::new(Arc::new(transcript), build_oracle(config.oracle))
        .with_prompts(prompts)
        .with_oracle_timeout(timeout);

    let state = AppState {
        assistant: Arc::new(assistant),
        videos: Arc::new(Videos {
            physics_video: config.physics_video_url,
            avatar_video: config.avatar_video_url,
        }),
    };

    // --- 5. Serve ---
    info!("Starting API server, listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use doubt_core::{Oracle, OracleError, TranscriptSegment};
    use tower::ServiceExt;

    // Always classifies as physics and answers with a fixed sentence.
    struct PhysicsOracle;

    #[async_trait]
    impl Oracle for PhysicsOracle {
        async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
            if prompt.starts_with("Classify") {
                Ok("physics".to_string())
            } else {
                Ok("Momentum is mass times velocity.".to_string())
            }
        }
    }

    fn test_app() -> Router {
        let transcript = Transcript::new(vec![TranscriptSegment::new(
            "Momentum is the product of mass and velocity.",
            340.0,
            350.0,
        )])
        .unwrap();
        let assistant = Assistant::new(Arc::new(transcript), Arc::new(PhysicsOracle));
        app(AppState {
            assistant: Arc::new(assistant),
            videos: Arc::new(Videos {
                physics_video: "https://videos.test/lesson.mp4".to_string(),
                avatar_video: "https://videos.test/avatar.mp4".to_string(),
            }),
        })
    }

    async fn post_question(body: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/save_question")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_videos() {
        let req = Request::builder()
            .uri("/get_videos")
            .body(Body::empty())
            .unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["physics_video"], "https://videos.test/lesson.mp4");
        assert_eq!(json["avatar_video"], "https://videos.test/avatar.mp4");
    }

    #[tokio::test]
    async fn test_question_is_answered() {
        let (status, json) = post_question(r#"{"question": "What is the formula for momentum?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["response_text"], "Momentum is mass times velocity.");
        assert_eq!(json["avatar_video"], "https://videos.test/avatar.mp4");
        assert_eq!(json["outcome"], "answered");
        assert_eq!(json["topic"], "Momentum");
        assert_eq!(json["cues"]["derivation"], true);
    }

    #[tokio::test]
    async fn test_statement_is_acknowledged() {
        let (status, json) = post_question(r#"{"question": "thanks!"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response_text"], "You're welcome! Let's keep going.");
        assert_eq!(json["outcome"], "statement");
        assert!(json["topic"].is_null());
    }

    #[tokio::test]
    async fn test_unparseable_body_gets_error_envelope() {
        let (status, json) = post_question(r#"{"question": 5}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));

        let (status, json) = post_question("{ not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_empty_question_is_rejected() {
        for body in [r#"{"question": "   "}"#, "{}"] {
            let (status, json) = post_question(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["status"], "error");
            assert_eq!(json["message"], "Empty question received");
        }
    }
}
