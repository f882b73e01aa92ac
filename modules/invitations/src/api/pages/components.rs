//! Shared page chrome: CSS, the document shell and small widgets.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::contract::model::{Account, CardTheme};

pub const PAGE_CSS: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: 'Crimson Text', Georgia, serif; color: #2d2d2d;
  background: linear-gradient(135deg, var(--from) 0%, var(--to) 100%); min-height: 100vh; }
.container { max-width: 760px; margin: 0 auto; padding: 24px 16px 48px; }
nav.top { display: flex; justify-content: flex-end; gap: 14px; padding: 12px 16px; font-size: 15px; }
nav.top a, nav.top span { color: var(--ink); text-decoration: none; }
.card { background: #fffdf9; border-radius: 14px; padding: 28px; margin-bottom: 22px;
  box-shadow: 0 12px 30px rgba(0,0,0,.18); }
.card h1, .card h2 { font-family: 'Playfair Display', Georgia, serif; margin-top: 0; }
.header-image { width: 100%; border-radius: 10px; margin-bottom: 18px; }
.eyebrow { text-transform: uppercase; letter-spacing: .2em; font-size: 13px; color: var(--accent-dark); }
.meta p { margin: 6px 0; }
.description { white-space: pre-line; font-size: 18px; }
.banner { padding: 12px 16px; border-radius: 8px; margin-bottom: 18px; }
.banner.success { background: #e6f6ea; color: #1e6b34; }
.banner.warning { background: #fff4d6; color: #7a5a00; }
.banner.error { background: #fde8e8; color: #9b1c1c; }
form.stack label { display: block; margin: 12px 0 4px; font-weight: 600; }
form.stack input[type=text], form.stack input[type=email], form.stack input[type=password],
form.stack input[type=tel], form.stack input[type=number], form.stack input[type=datetime-local],
form.stack textarea, form.stack select { width: 100%; padding: 9px 10px; border: 1px solid #ccc;
  border-radius: 6px; font: inherit; }
.choices label { display: inline-block; margin-right: 16px; font-weight: normal; }
button, .button { display: inline-block; margin-top: 16px; padding: 10px 20px; border: 0; border-radius: 6px;
  background: var(--from); color: #fff; font: inherit; cursor: pointer; text-decoration: none; }
button.danger { background: #b42318; }
.links a { margin-right: 14px; }
.comment { border-top: 1px solid #eee; padding: 10px 0; }
.comment .who { font-weight: 600; }
.comment .when { color: #888; font-size: 14px; margin-left: 6px; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #eee; }
.stats { display: flex; flex-wrap: wrap; gap: 12px; }
.stats div { background: #f5f3ef; border-radius: 8px; padding: 10px 14px; }
.muted { color: #777; }
"#;

/// Open Graph metadata for a page.
pub struct OpenGraph<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
    pub image: &'a str,
}

fn theme_vars(theme: CardTheme) -> String {
    let p = theme.palette();
    format!(
        ":root {{ --from: {}; --to: {}; --accent-dark: {}; --ink: {}; }}",
        p.from, p.to, p.from, p.ink
    )
}

fn nav(user: Option<&Account>) -> Markup {
    html! {
        nav class="top" {
            @match user {
                Some(account) => {
                    span { "Hi, " (account.name) }
                    @if account.is_admin {
                        a href="/admin" { "Admin" }
                    }
                    a href="/logout" { "Log out" }
                }
                None => {
                    a href="/login" { "Log in" }
                    a href="/register" { "Register" }
                }
            }
        }
    }
}

/// Full HTML document around `body`.
pub fn page_shell(
    title: &str,
    theme: CardTheme,
    user: Option<&Account>,
    og: Option<OpenGraph<'_>>,
    body: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                @if let Some(og) = og {
                    meta name="description" content=(og.description);
                    meta property="og:type" content="website";
                    meta property="og:title" content=(og.title);
                    meta property="og:description" content=(og.description);
                    meta property="og:url" content=(og.url);
                    meta property="og:image" content=(og.image);
                    meta property="og:image:width" content="1200";
                    meta property="og:image:height" content="630";
                    meta name="twitter:card" content="summary_large_image";
                    meta name="twitter:title" content=(og.title);
                    meta name="twitter:image" content=(og.image);
                }
                link rel="stylesheet" href="/static/css/style.css";
                style { (PreEscaped(theme_vars(theme))) (PreEscaped(PAGE_CSS)) }
            }
            body {
                (nav(user))
                div class="container" { (body) }
            }
        }
    }
}

pub fn banner(kind: &str, message: &str) -> Markup {
    html! { div class={ "banner " (kind) } role="status" { (message) } }
}

/// Cuts `s` to at most `max` characters, adding an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Registry links are only rendered when they are plain http(s) URLs.
pub fn is_safe_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}
