/// Server-rendered HTML pages
///
/// Every value that came from a user passes through [`html_escape`] before
/// it is interpolated.

use taskdeck_shared::{
    flash::Flash,
    models::{
        account::Account,
        task::{Task, TaskStats, TaskStatus},
    },
};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
nav { display: flex; gap: 1rem; align-items: center; border-bottom: 1px solid #ddd; padding-bottom: .5rem; margin-bottom: 1rem; }
nav .brand { font-weight: bold; margin-right: auto; }
.flash { padding: .6rem .8rem; border-radius: 4px; margin-bottom: 1rem; }
.flash.success { background: #e6f4ea; color: #1e6b34; }
.flash.danger { background: #fbe9e7; color: #a12b1f; }
.flash.info { background: #e8f0fe; color: #1a4f9c; }
form.stack { display: flex; flex-direction: column; gap: .5rem; max-width: 24rem; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: .4rem; border-bottom: 1px solid #eee; vertical-align: top; }
.status.completed { color: #1e6b34; }
.status.pending { color: #8a6d00; }
.empty-state { color: #777; font-style: italic; }
"#;

/// Escapes text for use in HTML content and attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn flash_html(flash: Option<Flash>) -> String {
    match flash {
        Some(flash) => format!(
            r#"<div class="flash {}">{}</div>"#,
            flash.category().as_str(),
            html_escape(&flash.message())
        ),
        None => String::new(),
    }
}

fn nav_html(account: Option<&Account>) -> String {
    match account {
        Some(account) => format!(
            r#"<nav><span class="brand">Taskdeck</span>
            <a href="/">Tasks</a>
            <a href="/profile">{}</a>
            <a href="/logout">Log out</a></nav>"#,
            html_escape(&account.username)
        ),
        None => r#"<nav><span class="brand">Taskdeck</span>
            <a href="/login">Log in</a>
            <a href="/register">Register</a></nav>"#
            .to_string(),
    }
}

fn layout(title: &str, account: Option<&Account>, flash: Option<Flash>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - Taskdeck</title>
<style>{STYLE}</style>
</head>
<body>
{nav}
{flash}
<main>
{body}
</main>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav_html(account),
        flash = flash_html(flash),
    )
}

pub fn register_page(flash: Option<Flash>) -> String {
    layout(
        "Register",
        None,
        flash,
        r#"<h1>Create an account</h1>
<form class="stack" method="post" action="/register">
  <label>Username <input name="username" maxlength="150" required></label>
  <label>Email <input name="email" type="email" maxlength="150" required></label>
  <label>Name <input name="name" maxlength="150" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
    )
}

pub fn login_page(flash: Option<Flash>) -> String {
    layout(
        "Log in",
        None,
        flash,
        r#"<h1>Log in</h1>
<form class="stack" method="post" action="/login">
  <label>Username <input name="username" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
    )
}

fn task_row(task: &Task) -> String {
    let (status_class, toggle_label) = match task.status {
        TaskStatus::Completed => ("completed", "Reopen"),
        TaskStatus::Pending => ("pending", "Complete"),
    };

    format!(
        r#"<tr>
  <td>{content}<br><small>{description}</small></td>
  <td>{deadline}</td>
  <td><span class="status {status_class}">{status}</span></td>
  <td>
    <a href="/complete/{id}">{toggle_label}</a>
    <a href="/update/{id}">Edit</a>
    <a href="/delete/{id}">Delete</a>
  </td>
</tr>"#,
        id = task.id,
        content = html_escape(&task.content),
        description = html_escape(&task.description),
        deadline = html_escape(&task.deadline),
        status = task.status.as_str(),
    )
}

pub fn index_page(account: &Account, tasks: &[Task], flash: Option<Flash>) -> String {
    let list = if tasks.is_empty() {
        r#"<p class="empty-state">No tasks yet.</p>"#.to_string()
    } else {
        let rows: String = tasks.iter().map(task_row).collect();
        format!(
            r#"<table>
<thead><tr><th>Task</th><th>Deadline</th><th>Status</th><th></th></tr></thead>
<tbody>{rows}</tbody>
</table>"#
        )
    };

    let body = format!(
        r#"<h1>Tasks</h1>
<form class="stack" method="post" action="/">
  <label>Task <input name="content" maxlength="200" required></label>
  <label>Description <textarea name="description"></textarea></label>
  <label>Deadline <input name="deadline" maxlength="50"></label>
  <button type="submit">Add task</button>
</form>
{list}"#
    );

    layout("Tasks", Some(account), flash, &body)
}

pub fn update_page(account: &Account, task: &Task, flash: Option<Flash>) -> String {
    let body = format!(
        r#"<h1>Edit task</h1>
<form class="stack" method="post" action="/update/{id}">
  <label>Task <input name="content" maxlength="200" value="{content}" required></label>
  <label>Description <textarea name="description">{description}</textarea></label>
  <label>Deadline <input name="deadline" maxlength="50" value="{deadline}"></label>
  <button type="submit">Save</button>
</form>
<p><a href="/">Back to tasks</a></p>"#,
        id = task.id,
        content = html_escape(&task.content),
        description = html_escape(&task.description),
        deadline = html_escape(&task.deadline),
    );

    layout("Edit task", Some(account), flash, &body)
}

pub fn profile_page(account: &Account, stats: TaskStats, flash: Option<Flash>) -> String {
    let body = format!(
        r#"<h1>Profile</h1>
<dl>
  <dt>Name</dt><dd>{name}</dd>
  <dt>Username</dt><dd>{username}</dd>
  <dt>Email</dt><dd>{email}</dd>
  <dt>Member since</dt><dd>{since}</dd>
  <dt>Tasks</dt><dd>{total} total, {completed} completed, {pending} pending</dd>
</dl>"#,
        name = html_escape(&account.name),
        username = html_escape(&account.username),
        email = html_escape(&account.email),
        since = account.created_at.format("%Y-%m-%d"),
        total = stats.total,
        completed = stats.completed,
        pending = stats.pending(),
    );

    layout("Profile", Some(account), flash, &body)
}

pub fn error_page() -> String {
    layout(
        "Error",
        None,
        None,
        r#"<h1>Something went wrong</h1>
<p>The request could not be completed. Please try again later.</p>
<p><a href="/">Back to tasks</a></p>"#,
    )
}
