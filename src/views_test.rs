use super::*;
use crate::services::session::FlashKind;

fn anon() -> PageContext<'static> {
    PageContext { username: None, flashes: &[], registration_enabled: true }
}

#[test]
fn escape_replaces_markup() {
    assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    assert_eq!(escape("plain"), "plain");
}

#[test]
fn home_page_anonymous_offers_login_and_register() {
    let html = home_page(&anon());
    assert!(html.contains(r#"href="/login""#));
    assert!(html.contains(r#"href="/register""#));
    assert!(!html.contains("/logout"));
}

#[test]
fn home_page_hides_register_when_disabled() {
    let ctx = PageContext { registration_enabled: false, ..anon() };
    assert!(!home_page(&ctx).contains("/register"));
}

#[test]
fn home_page_authenticated_greets_user_escaped() {
    let ctx = PageContext { username: Some("<Luis>"), ..anon() };
    let html = home_page(&ctx);
    assert!(html.contains("Welcome back, &lt;Luis&gt;"));
    assert!(html.contains(r#"href="/logout""#));
    assert!(!html.contains("<Luis>"));
}

#[test]
fn flashes_render_with_category() {
    let flashes = vec![Flash::new(FlashKind::Success, "Logged in"), Flash::new(FlashKind::Info, "a < b")];
    let ctx = PageContext { flashes: &flashes, ..anon() };
    let html = home_page(&ctx);
    assert!(html.contains(r#"<p class="flash success">Logged in</p>"#));
    assert!(html.contains(r#"<p class="flash info">a &lt; b</p>"#));
}

#[test]
fn login_page_renders_error_and_next() {
    let html = login_page(&anon(), Some("invalid username or password"), "Luis", Some("/dashboard"));
    assert!(html.contains(r#"<p class="flash error">invalid username or password</p>"#));
    assert!(html.contains(r#"name="next" value="/dashboard""#));
    assert!(html.contains(r#"value="Luis""#));
}

#[test]
fn login_page_without_next_has_no_hidden_field() {
    let html = login_page(&anon(), None, "", None);
    assert!(!html.contains(r#"name="next""#));
}

#[test]
fn register_page_posts_to_register() {
    let html = register_page(&anon(), None, "");
    assert!(html.contains(r#"action="/register""#));
}

#[test]
fn dashboard_page_shows_username() {
    let ctx = PageContext { username: Some("Luis"), ..anon() };
    let html = dashboard_page(&ctx, "Luis");
    assert!(html.contains("<strong>Luis</strong>"));
}
