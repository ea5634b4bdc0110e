//! Server-rendered HTML pages.
//!
//! Every piece of user-supplied text goes through `escape` before it is
//! interpolated.

use std::fmt::Write;

use crate::services::session::Flash;

/// Per-render context shared by all pages.
pub struct PageContext<'a> {
    pub username: Option<&'a str>,
    pub flashes: &'a [Flash],
    pub registration_enabled: bool,
}

#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn nav(ctx: &PageContext<'_>) -> String {
    let mut links = String::from(r#"<a href="/">Home</a>"#);
    match ctx.username {
        Some(username) => {
            let _ = write!(
                links,
                r#" <a href="/dashboard">Dashboard</a> <span class="user">{}</span> <a href="/logout">Log out</a>"#,
                escape(username)
            );
        }
        None => {
            links.push_str(r#" <a href="/login">Log in</a>"#);
            if ctx.registration_enabled {
                links.push_str(r#" <a href="/register">Register</a>"#);
            }
        }
    }
    format!("<nav>{links}</nav>")
}

fn banners(flashes: &[Flash], error: Option<&str>) -> String {
    let mut out = String::new();
    for flash in flashes {
        let _ = write!(out, r#"<p class="flash {}">{}</p>"#, flash.kind.as_str(), escape(&flash.text));
    }
    if let Some(error) = error {
        let _ = write!(out, r#"<p class="flash error">{}</p>"#, escape(error));
    }
    out
}

fn layout(title: &str, ctx: &PageContext<'_>, error: Option<&str>, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body>{nav}{banners}<main>{body}</main></body></html>",
        title = escape(title),
        nav = nav(ctx),
        banners = banners(ctx.flashes, error),
    )
}

#[must_use]
pub fn home_page(ctx: &PageContext<'_>) -> String {
    let body = match ctx.username {
        Some(username) => format!("<h1>Welcome back, {}</h1>", escape(username)),
        None => "<h1>Welcome</h1><p>Log in to see your dashboard.</p>".to_owned(),
    };
    layout("Home", ctx, None, &body)
}

#[must_use]
pub fn login_page(ctx: &PageContext<'_>, error: Option<&str>, username: &str, next: Option<&str>) -> String {
    let next_field = next
        .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(n)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/login">{next_field}
<label>Username <input name="username" value="{username}" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        username = escape(username),
    );
    layout("Log in", ctx, error, &body)
}

#[must_use]
pub fn register_page(ctx: &PageContext<'_>, error: Option<&str>, username: &str) -> String {
    let body = format!(
        r#"<h1>Register</h1>
<form method="post" action="/register">
<label>Username <input name="username" value="{username}" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Create account</button>
</form>"#,
        username = escape(username),
    );
    layout("Register", ctx, error, &body)
}

#[must_use]
pub fn dashboard_page(ctx: &PageContext<'_>, username: &str) -> String {
    let body = format!("<h1>Dashboard</h1><p>Signed in as <strong>{}</strong>.</p>", escape(username));
    layout("Dashboard", ctx, None, &body)
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;
