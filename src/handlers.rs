use crate::calendar::{month_view, MonthView};
use crate::controller::ViewState;
use crate::errors::AppError;
use crate::models::{CredentialsForm, NewHabitForm, TestDateForm};
use crate::state::AppState;
use crate::theme::{load_theme, toggle_theme};
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let notice = state.controller.take_notice().await;
    let view = state.controller.snapshot().await;
    let theme = load_theme(state.controller.session().store()).await;
    Html(render_index(&view, theme, notice.as_deref(), local_today()))
}

pub async fn login(State(state): State<AppState>, Form(form): Form<CredentialsForm>) -> Redirect {
    state.controller.login(&form.username, &form.password).await;
    Redirect::to("/")
}

pub async fn register(State(state): State<AppState>, Form(form): Form<CredentialsForm>) -> Redirect {
    state.controller.register(&form.username, &form.password).await;
    Redirect::to("/")
}

pub async fn logout(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.controller.logout().await?;
    Ok(Redirect::to("/"))
}

pub async fn add_habit(State(state): State<AppState>, Form(form): Form<NewHabitForm>) -> Redirect {
    state.controller.add_habit(&form.name).await;
    Redirect::to("/")
}

pub async fn complete_habit(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    state.controller.complete_habit(id).await;
    Redirect::to("/")
}

pub async fn delete_habit(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    state.controller.remove_habit(id).await;
    Redirect::to("/")
}

pub async fn set_test_date(State(state): State<AppState>, Form(form): Form<TestDateForm>) -> Redirect {
    state.controller.set_test_date(&form.date).await;
    Redirect::to("/")
}

pub async fn switch_theme(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let theme = toggle_theme(state.controller.session().store()).await?;
    info!(theme = theme.as_str(), "theme switched");
    Ok(Redirect::to("/"))
}

pub async fn get_state(State(state): State<AppState>) -> Json<ViewState> {
    Json(state.controller.snapshot().await)
}

pub async fn get_calendar(State(state): State<AppState>) -> Json<MonthView> {
    let view = state.controller.snapshot().await;
    let today = view.current_date.unwrap_or_else(local_today);
    Json(month_view(today, &view.completion_counts, view.habits.len()))
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
