#![allow(dead_code)]

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// One request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

impl Call {
    pub fn line(&self) -> String {
        match &self.query {
            Some(query) => format!("{} {}?{}", self.method, self.path, query),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

#[derive(Default)]
pub struct BackendData {
    pub users: HashMap<String, (i64, String)>,
    pub habits: Vec<Value>,
    pub next_habit_id: i64,
    pub current_date: String,
    pub counts: BTreeMap<String, u32>,
    /// Served before `counts`, one entry per completions request.
    pub scripted_counts: VecDeque<(Duration, BTreeMap<String, u32>)>,
    /// Forced responses keyed by request line without query, e.g. `GET /api/habits`.
    pub failures: HashMap<String, (StatusCode, String)>,
    /// Held before the route runs, keyed like `failures`.
    pub delays: HashMap<String, Duration>,
    pub calls: Vec<Call>,
}

#[derive(Clone)]
pub struct FakeBackend {
    pub base_url: String,
    pub data: Arc<Mutex<BackendData>>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let data = Arc::new(Mutex::new(BackendData {
            next_habit_id: 1,
            current_date: "2025-03-13".to_string(),
            ..BackendData::default()
        }));

        let app = Router::new()
            .route("/login", post(login))
            .route("/register", post(register))
            .route("/api/habits", get(list_habits).post(create_habit))
            .route("/api/habits/:id", delete(delete_habit))
            .route("/api/habits/complete/:id", post(complete_habit))
            .route("/api/habits/completions", get(completions))
            .route("/api/habits/current-date", get(current_date))
            .route("/api/habits/set-date", post(set_date))
            .layer(middleware::from_fn_with_state(Arc::clone(&data), record))
            .with_state(Arc::clone(&data));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend crashed");
        });

        Self {
            base_url: format!("http://{addr}"),
            data,
        }
    }

    pub async fn add_user(&self, username: &str, password: &str) -> i64 {
        let mut data = self.data.lock().await;
        let id = data.users.len() as i64 + 1;
        data.users
            .insert(username.to_string(), (id, password.to_string()));
        id
    }

    pub async fn add_habit(&self, name: &str, streak: u32) -> i64 {
        let mut data = self.data.lock().await;
        let id = data.next_habit_id;
        data.next_habit_id += 1;
        data.habits.push(json!({
            "id": id,
            "name": name,
            "streak": streak,
            "xp": streak * 10,
            "level": 1,
            "completionDates": [],
        }));
        id
    }

    pub async fn set_counts(&self, counts: &[(&str, u32)]) {
        let mut data = self.data.lock().await;
        data.counts = counts
            .iter()
            .map(|(date, count)| (date.to_string(), *count))
            .collect();
    }

    pub async fn script_counts(&self, delay: Duration, counts: &[(&str, u32)]) {
        let counts = counts
            .iter()
            .map(|(date, count)| (date.to_string(), *count))
            .collect();
        self.data.lock().await.scripted_counts.push_back((delay, counts));
    }

    pub async fn fail_route(&self, route: &str, status: StatusCode, body: &str) {
        self.data
            .lock()
            .await
            .failures
            .insert(route.to_string(), (status, body.to_string()));
    }

    pub async fn delay_route(&self, route: &str, delay: Duration) {
        self.data.lock().await.delays.insert(route.to_string(), delay);
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.data.lock().await.calls.clone()
    }

    /// Request lines under `/api`, in arrival order.
    pub async fn api_lines(&self) -> Vec<String> {
        self.calls()
            .await
            .iter()
            .filter(|call| call.path.starts_with("/api/"))
            .map(Call::line)
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.data.lock().await.calls.clear();
    }
}

type Shared = Arc<Mutex<BackendData>>;

async fn record(State(data): State<Shared>, request: Request, next: Next) -> Response {
    let call = Call {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };
    let route = format!("{} {}", call.method, call.path);
    let (failure, delay) = {
        let mut data = data.lock().await;
        data.calls.push(call);
        (data.failures.get(&route).cloned(), data.delays.get(&route).copied())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((status, body)) = failure {
        return (status, body).into_response();
    }
    next.run(request).await
}

fn authorized(data: &BackendData, headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let Some(token) = value.strip_prefix("Bearer token-") else {
        return false;
    };
    data.users.contains_key(token)
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(State(data): State<Shared>, Json(creds): Json<Credentials>) -> Response {
    let data = data.lock().await;
    match data.users.get(&creds.username) {
        Some((id, password)) if *password == creds.password => Json(json!({
            "token": format!("token-{}", creds.username),
            "user": { "id": id, "username": creds.username },
        }))
        .into_response(),
        _ => (StatusCode::UNAUTHORIZED, "bad credentials").into_response(),
    }
}

async fn register(State(data): State<Shared>, Json(creds): Json<Credentials>) -> Response {
    let mut data = data.lock().await;
    if data.users.contains_key(&creds.username) {
        return (StatusCode::CONFLICT, "username taken").into_response();
    }
    let id = data.users.len() as i64 + 1;
    data.users
        .insert(creds.username.clone(), (id, creds.password));
    Json(json!({
        "token": format!("token-{}", creds.username),
        "user": { "id": id, "username": creds.username },
    }))
    .into_response()
}

async fn list_habits(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = data.lock().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(data.habits.clone()).into_response()
}

#[derive(Deserialize)]
struct NewHabit {
    name: String,
    streak: u32,
}

async fn create_habit(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewHabit>,
) -> Response {
    let mut data = data.lock().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = data.next_habit_id;
    data.next_habit_id += 1;
    let habit = json!({
        "id": id,
        "name": body.name,
        "streak": body.streak,
        "xp": 0,
        "level": 1,
        "completionDates": [],
    });
    data.habits.push(habit.clone());
    Json(habit).into_response()
}

async fn delete_habit(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut data = data.lock().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let before = data.habits.len();
    data.habits.retain(|habit| habit["id"] != json!(id));
    if data.habits.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn complete_habit(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut data = data.lock().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let today = data.current_date.clone();
    let Some(habit) = data.habits.iter_mut().find(|habit| habit["id"] == json!(id)) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let streak = habit["streak"].as_u64().unwrap_or(0) + 1;
    let xp = habit["xp"].as_u64().unwrap_or(0) + 10;
    habit["streak"] = json!(streak);
    habit["xp"] = json!(xp);
    habit["level"] = json!(xp / 100 + 1);
    if let Some(dates) = habit["completionDates"].as_array_mut() {
        dates.push(json!(today));
    }
    let updated = habit.clone();
    *data.counts.entry(today).or_insert(0) += 1;
    Json(updated).into_response()
}

#[derive(Deserialize)]
struct Range {
    start: String,
    end: String,
}

async fn completions(
    State(data): State<Shared>,
    headers: HeaderMap,
    Query(range): Query<Range>,
) -> Response {
    let scripted = {
        let mut guard = data.lock().await;
        if !authorized(&guard, &headers) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        guard.scripted_counts.pop_front()
    };
    if let Some((delay, counts)) = scripted {
        tokio::time::sleep(delay).await;
        return Json(counts).into_response();
    }

    let data = data.lock().await;
    let counts: BTreeMap<String, u32> = data
        .counts
        .iter()
        .filter(|(date, _)| date.as_str() >= range.start.as_str() && date.as_str() <= range.end.as_str())
        .map(|(date, count)| (date.clone(), *count))
        .collect();
    Json(counts).into_response()
}

async fn current_date(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = data.lock().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(data.current_date.clone()).into_response()
}

#[derive(Deserialize)]
struct SetDate {
    date: String,
}

async fn set_date(State(data): State<Shared>, Query(query): Query<SetDate>) -> Response {
    if chrono::NaiveDate::parse_from_str(&query.date, "%Y-%m-%d").is_err() {
        return (StatusCode::BAD_REQUEST, r#"{"error":"Invalid date"}"#).into_response();
    }
    data.lock().await.current_date = query.date.clone();
    format!("Date set to {}", query.date).into_response()
}

static TEMP_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let mut path = std::env::temp_dir();
    path.push(format!("habit_web_tests_{}", std::process::id()));
    std::fs::create_dir_all(&path).expect("create temp dir");
    path
});

pub fn unique_store_path(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    TEMP_ROOT.join(format!("{tag}_{nanos}.json"))
}

/// Writes a store file as a signed-in client would have left it.
pub fn seed_session(path: &std::path::Path, username: &str, user_id: i64) {
    let user = json!({ "id": user_id, "username": username }).to_string();
    let store = json!({ "token": format!("token-{username}"), "user": user });
    std::fs::write(path, serde_json::to_vec_pretty(&store).unwrap()).unwrap();
}
