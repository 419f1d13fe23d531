use crate::calendar::{month_view, MonthView, WEEKDAY_LABELS};
use crate::controller::{DateToolStatus, LoadingFlags, ViewState};
use crate::models::Habit;
use crate::theme::Theme;
use chrono::NaiveDate;
use std::fmt::Write;

/// Dots drawn under a card; the label still shows the full streak.
const MAX_STREAK_DOTS: u32 = 60;

pub fn render_index(view: &ViewState, theme: Theme, notice: Option<&str>, fallback_today: NaiveDate) -> String {
    let body = match view.user() {
        Some(user) => {
            let today = view.current_date.unwrap_or(fallback_today);
            render_dashboard(&user.username, view, today)
        }
        None => render_login(&view.loading),
    };
    render_shell(theme, notice, &body)
}

fn render_shell(theme: Theme, notice: Option<&str>, body: &str) -> String {
    let notice_html = notice
        .map(|message| {
            format!(
                r#"<div class="notice" role="alert">{}</div>"#,
                escape_html(message)
            )
        })
        .unwrap_or_default();

    PAGE_HTML
        .replace("{{THEME_CLASS}}", theme.css_class())
        .replace("{{THEME_TOGGLE}}", &render_theme_toggle(theme))
        .replace("{{NOTICE}}", &notice_html)
        .replace("{{BODY}}", body)
}

fn render_theme_toggle(theme: Theme) -> String {
    let label = match theme {
        Theme::Dark => "Light mode",
        Theme::Light => "Dark mode",
    };
    format!(
        r#"<form method="post" action="/theme/toggle" class="theme-toggle"><button type="submit" class="btn-ghost">{label}</button></form>"#
    )
}

fn render_login(loading: &LoadingFlags) -> String {
    let disabled = if loading.authenticating { " disabled" } else { "" };
    LOGIN_HTML.replace("{{DISABLED}}", disabled)
}

fn render_dashboard(username: &str, view: &ViewState, today: NaiveDate) -> String {
    let mut html = String::new();

    if view.loading.initializing {
        html.push_str(
            r#"<div class="overlay" id="loading"><div class="spinner"></div><p>Loading your habits...</p></div>"#,
        );
    }

    let _ = write!(
        html,
        r#"<header class="top">
  <h1>Habit Tracker (User: {})</h1>
  <form method="post" action="/logout"><button type="submit" class="btn-delete">Logout</button></form>
</header>"#,
        escape_html(username)
    );

    let add_disabled = if view.loading.adding { " disabled" } else { "" };
    let _ = write!(
        html,
        r#"<form method="post" action="/habits" class="add-habit">
  <input type="text" name="name" placeholder="New habit..." />
  <button type="submit" class="btn-primary"{add_disabled}>Add</button>
</form>"#
    );

    html.push_str(r#"<section class="habits">"#);
    for habit in &view.habits {
        html.push_str(&render_habit_card(habit));
    }
    html.push_str("</section>");

    let month = month_view(today, &view.completion_counts, view.habits.len());
    html.push_str(&render_calendar(&month));

    html.push_str(&render_date_tool(view.current_date, &view.date_tool));
    html.push_str(ABOUT_HTML);
    html
}

fn render_habit_card(habit: &Habit) -> String {
    let dots = r#"<span class="dot"></span>"#.repeat(habit.streak.min(MAX_STREAK_DOTS) as usize);
    format!(
        r#"<div class="habit-row" data-habit-id="{id}">
  <div class="habit-card">
    <h3>{name}</h3>
    <p class="level">Level {level} ({xp} XP)</p>
    <p class="streak">Streak: {streak}</p>
    <div class="dots">{dots}</div>
    <form method="post" action="/habits/{id}/complete"><button type="submit" class="btn-complete">Complete</button></form>
  </div>
  <form method="post" action="/habits/{id}/delete"><button type="submit" class="btn-link-delete">Delete</button></form>
</div>"#,
        id = habit.id,
        name = escape_html(&habit.name),
        level = habit.level,
        xp = habit.xp,
        streak = habit.streak,
    )
}

fn render_calendar(month: &MonthView) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<section class="calendar"><h2>{} {}</h2><div class="grid">"#,
        month.month_name, month.year
    );
    for label in WEEKDAY_LABELS {
        let _ = write!(html, r#"<div class="weekday">{label}</div>"#);
    }
    for _ in 0..month.leading_blanks {
        html.push_str(r#"<div class="blank"></div>"#);
    }
    for cell in &month.days {
        let marker = cell
            .indicator
            .map(|indicator| {
                format!(
                    r#"<div class="marker" style="{}" title="{}"></div>"#,
                    indicator.css(),
                    cell.title(month.total_habits)
                )
            })
            .unwrap_or_default();
        let _ = write!(
            html,
            r#"<div class="day" data-date="{}">{marker}<span class="numeral">{}</span></div>"#,
            cell.date, cell.day
        );
    }
    html.push_str("</div></section>");
    html
}

fn render_date_tool(current_date: Option<NaiveDate>, status: &DateToolStatus) -> String {
    let value = current_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let mut html = format!(
        r#"<section class="testing">
  <h2>Testing Tools</h2>
  <form method="post" action="/testing/date" class="date-tool">
    <input type="date" name="date" value="{value}" />
    <button type="submit" class="btn-primary">Set Test Date</button>
  </form>"#
    );
    if let Some(error) = &status.error {
        let _ = write!(html, r#"<div class="tool-error">Error: {}</div>"#, escape_html(error));
    }
    if let Some(success) = &status.success {
        let _ = write!(html, r#"<div class="tool-success">{}</div>"#, escape_html(success));
    }
    html.push_str("</section>");
    html
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const LOGIN_HTML: &str = r#"<section class="login">
  <h1>Login or Register</h1>
  <form method="post" class="credentials">
    <input type="text" name="username" placeholder="Username" />
    <input type="password" name="password" placeholder="Password" />
    <div class="row">
      <button type="submit" class="btn-primary" formaction="/login"{{DISABLED}}>Login</button>
      <button type="submit" class="btn-primary" formaction="/register"{{DISABLED}}>Register</button>
    </div>
  </form>
</section>"#;

const ABOUT_HTML: &str = r#"<section class="about">
  <h2>About this client</h2>
  <details>
    <summary>Server</summary>
    <ul>
      <li>Habits, streaks, XP and levels are computed by the habit backend.</li>
      <li>The backend's logical date can be moved with the testing tools.</li>
    </ul>
  </details>
  <details>
    <summary>Client</summary>
    <ul>
      <li>Pages are rendered on a small axum server that talks to the backend with reqwest.</li>
      <li>The session token, profile and theme live in a local JSON store.</li>
      <li>The calendar colors each past day by the share of habits completed.</li>
    </ul>
  </details>
</section>"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" class="{{THEME_CLASS}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    .dark-mode {
      --bg-primary: #111827;
      --bg-secondary: #1f2937;
      --bg-tertiary: #374151;
      --text-primary: #f9fafb;
      --input-bg: #374151;
      --button-primary: #3b82f6;
      --button-delete: #ef4444;
      --card-from: #7c3aed;
      --card-to: #2563eb;
      --calendar-color-red: #dc2626;
      --calendar-color-yellow: #facc15;
      --calendar-color-green: #16a34a;
    }

    .light-mode {
      --bg-primary: #f3f4f6;
      --bg-secondary: #ffffff;
      --bg-tertiary: #e5e7eb;
      --text-primary: #111827;
      --input-bg: #f9fafb;
      --button-primary: #2563eb;
      --button-delete: #dc2626;
      --card-from: #8b5cf6;
      --card-to: #3b82f6;
      --calendar-color-red: #f87171;
      --calendar-color-yellow: #fde047;
      --calendar-color-green: #4ade80;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg-primary);
      color: var(--text-primary);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px;
    }

    main {
      max-width: 42rem;
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    .theme-toggle {
      display: flex;
      justify-content: flex-end;
    }

    .notice {
      padding: 12px 16px;
      border-radius: 8px;
      background: var(--button-delete);
      color: white;
    }

    input {
      padding: 8px;
      border: none;
      border-radius: 6px;
      background: var(--input-bg);
      color: var(--text-primary);
    }

    button {
      border: none;
      border-radius: 6px;
      padding: 8px 16px;
      cursor: pointer;
      font-weight: 600;
    }

    button:disabled {
      opacity: 0.5;
      cursor: not-allowed;
    }

    .btn-primary {
      background: var(--button-primary);
      color: white;
    }

    .btn-delete {
      background: var(--button-delete);
      color: white;
    }

    .btn-ghost {
      background: var(--bg-tertiary);
      color: var(--text-primary);
    }

    .btn-link-delete {
      background: none;
      color: var(--button-delete);
    }

    .btn-complete {
      margin-top: 12px;
      border-radius: 999px;
      background: white;
      color: var(--card-from);
    }

    .login {
      background: var(--bg-secondary);
      padding: 24px;
      border-radius: 12px;
    }

    .credentials {
      display: grid;
      gap: 8px;
    }

    .row,
    .top,
    .add-habit,
    .date-tool,
    .habit-row {
      display: flex;
      align-items: center;
      gap: 12px;
    }

    .top {
      justify-content: space-between;
    }

    .add-habit input {
      flex: 1;
    }

    .habits {
      display: grid;
      gap: 16px;
    }

    .habit-card {
      flex: 1;
      padding: 20px;
      border-radius: 14px;
      color: white;
      background: linear-gradient(to bottom right, var(--card-from), var(--card-to));
    }

    .habit-card h3 {
      margin: 0;
    }

    .streak {
      font-size: 1.8rem;
      margin: 8px 0 0;
    }

    .dots {
      display: flex;
      gap: 4px;
      margin-top: 8px;
    }

    .dot {
      width: 12px;
      height: 12px;
      border-radius: 50%;
      background: #4ade80;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 8px;
      text-align: center;
    }

    .weekday {
      font-weight: 700;
    }

    .day {
      position: relative;
      display: flex;
      align-items: center;
      justify-content: center;
      height: 40px;
    }

    .marker {
      width: 24px;
      height: 24px;
      border-radius: 50%;
    }

    .numeral {
      position: absolute;
      z-index: 1;
    }

    .testing {
      border-top: 1px solid var(--bg-tertiary);
      padding-top: 24px;
    }

    .tool-error {
      margin-top: 8px;
      color: #f87171;
    }

    .tool-success {
      margin-top: 8px;
      color: #4ade80;
    }

    .about {
      background: var(--bg-secondary);
      padding: 24px;
      border-radius: 12px;
    }

    .about details {
      background: var(--bg-tertiary);
      border-radius: 8px;
      padding: 12px 16px;
      margin-top: 12px;
    }

    .overlay {
      position: fixed;
      inset: 0;
      display: grid;
      place-content: center;
      justify-items: center;
      background: rgba(0, 0, 0, 0.6);
      z-index: 50;
    }

    .spinner {
      width: 48px;
      height: 48px;
      border: 4px solid var(--bg-tertiary);
      border-top-color: var(--button-primary);
      border-radius: 50%;
      animation: spin 900ms linear infinite;
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }
  </style>
</head>
<body>
  <main>
    {{THEME_TOGGLE}}
    {{NOTICE}}
    {{BODY}}
  </main>
</body>
</html>
"#;
