#![forbid(unsafe_code)]

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use transcript_contracts::{Course, GradeValue, StudentId, StudentName};
use transcript_service::{ServiceError, TranscriptView};

use crate::AdapterRuntime;

pub const MSG_STUDENT_ADDED: &str = "Student added successfully";
pub const MSG_GRADE_ADDED: &str = "Grade added successfully";
pub const ERR_NAME_REQUIRED: &str = "Student name is required";
pub const ERR_INVALID_ID: &str = "Invalid ID format";
pub const ERR_INVALID_PARAMS: &str = "Invalid request parameters";
pub const ERR_STUDENT_NOT_FOUND: &str = "Student not found";
pub const ERR_COURSE_NOT_FOUND: &str = "Course not found";
pub const ERR_SERVER: &str = "Server error";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateStudentResponse {
    pub id: StudentId,
    pub message: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StudentIdsResponse {
    pub ids: Vec<StudentId>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// `grade` arrives as a JSON string or number; anything else is rejected.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AddGradeRequest {
    pub course: Option<String>,
    pub grade: Option<serde_json::Value>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub students: usize,
}

/// A request that ends in a non-2xx status with an `{error}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterFailure {
    pub status: StatusCode,
    pub error: &'static str,
}

impl AdapterFailure {
    fn bad_request(error: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    fn server_error(reason: &str) -> Self {
        tracing::error!(%reason, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ERR_SERVER,
        }
    }
}

impl From<ServiceError> for AdapterFailure {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UnknownId(id) => {
                tracing::warn!(student_id = id.0, "student not found");
                Self {
                    status: StatusCode::NOT_FOUND,
                    error: ERR_STUDENT_NOT_FOUND,
                }
            }
            ServiceError::CourseNotFound { student_id, course } => {
                tracing::warn!(student_id = student_id.0, %course, "course not found");
                Self {
                    status: StatusCode::NOT_FOUND,
                    error: ERR_COURSE_NOT_FOUND,
                }
            }
            ServiceError::Store(store_err) => Self::server_error(&store_err.to_string()),
        }
    }
}

impl IntoResponse for AdapterFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.error.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(runtime: AdapterRuntime) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/students", post(create_student).get(list_students))
        .route("/students/search", get(search_students))
        .route("/transcripts/:id", get(get_transcript))
        .route("/transcripts/:id/grades", post(add_grade))
        .with_state(runtime)
}

/// Strict base-10 student id; signs, blanks and anything non-numeric are rejected.
pub fn parse_student_id(raw: &str) -> Option<StudentId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok().map(StudentId)
}

/// Text form of a received grade. Numbers keep their JSON spelling (`95`, `3.7`).
pub fn grade_from_json(value: &serde_json::Value) -> Option<GradeValue> {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    GradeValue::new(text).ok()
}

async fn healthz(
    State(runtime): State<AdapterRuntime>,
) -> Result<Json<HealthResponse>, AdapterFailure> {
    let svc = runtime
        .lock()
        .map_err(|reason| AdapterFailure::server_error(&reason))?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        students: svc.student_count(),
    }))
}

async fn create_student(
    State(runtime): State<AdapterRuntime>,
    body: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateStudentResponse>), AdapterFailure> {
    let name = body
        .ok()
        .and_then(|Json(req)| req.name)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AdapterFailure::bad_request(ERR_NAME_REQUIRED))?;
    let name =
        StudentName::new(name).map_err(|_| AdapterFailure::bad_request(ERR_NAME_REQUIRED))?;
    let mut svc = runtime
        .lock()
        .map_err(|reason| AdapterFailure::server_error(&reason))?;
    let id = svc.add_student(name)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateStudentResponse {
            id,
            message: MSG_STUDENT_ADDED.to_string(),
        }),
    ))
}

async fn list_students(
    State(runtime): State<AdapterRuntime>,
) -> Result<Json<StudentIdsResponse>, AdapterFailure> {
    let svc = runtime
        .lock()
        .map_err(|reason| AdapterFailure::server_error(&reason))?;
    Ok(Json(StudentIdsResponse {
        ids: svc.all_student_ids(),
    }))
}

async fn search_students(
    State(runtime): State<AdapterRuntime>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<StudentIdsResponse>, AdapterFailure> {
    let name = query
        .ok()
        .and_then(|Query(q)| q.name)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AdapterFailure::bad_request(ERR_NAME_REQUIRED))?;
    let svc = runtime
        .lock()
        .map_err(|reason| AdapterFailure::server_error(&reason))?;
    Ok(Json(StudentIdsResponse {
        ids: svc.name_to_ids(&name),
    }))
}

async fn get_transcript(
    State(runtime): State<AdapterRuntime>,
    Path(raw_id): Path<String>,
) -> Result<Json<TranscriptView>, AdapterFailure> {
    let id =
        parse_student_id(&raw_id).ok_or_else(|| AdapterFailure::bad_request(ERR_INVALID_ID))?;
    let svc = runtime
        .lock()
        .map_err(|reason| AdapterFailure::server_error(&reason))?;
    Ok(Json(svc.transcript(id)?))
}

async fn add_grade(
    State(runtime): State<AdapterRuntime>,
    Path(raw_id): Path<String>,
    body: Result<Json<AddGradeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AdapterFailure> {
    let invalid = || AdapterFailure::bad_request(ERR_INVALID_PARAMS);
    let id = parse_student_id(&raw_id).ok_or_else(invalid)?;
    let Json(req) = body.map_err(|_| invalid())?;
    let course = req
        .course
        .and_then(|c| Course::new(c).ok())
        .ok_or_else(invalid)?;
    let grade = req
        .grade
        .as_ref()
        .and_then(grade_from_json)
        .ok_or_else(invalid)?;
    let mut svc = runtime
        .lock()
        .map_err(|reason| AdapterFailure::server_error(&reason))?;
    svc.add_grade(id, course, grade)?;
    Ok(Json(MessageResponse {
        message: MSG_GRADE_ADDED.to_string(),
    }))
}
