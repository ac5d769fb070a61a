use std::fmt::Write;
use std::sync::Arc;

use crate::i18n::{self, Translator};
use crate::model::{Credentials, WeightedTerm, TERM_FIELD_PREFIX};

/// Severity of a flash notice shown at the top of the admin page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Everything the full admin page needs
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub terms: &'a [WeightedTerm],
    pub credentials: &'a Credentials,
    pub notices: &'a [Notice],
    pub assets_path: &'a str,
}

/// Produces the markup served for the tag list and the admin page
pub trait TagListRenderer: Send + Sync {
    fn render_collection(&self, terms: &[WeightedTerm]) -> String;
    fn render_page(&self, view: &PageView<'_>) -> String;
}

pub struct HtmlRenderer {
    translator: Arc<dyn Translator>,
}

impl HtmlRenderer {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    fn render_item(&self, out: &mut String, item: &WeightedTerm) {
        let term = &item.term;
        let display = html_escape(&term.display_text);
        let title = self
            .translator
            .translate(i18n::MSG_MANAGE_POSTS, &[&term.display_text]);
        let _ = write!(
            out,
            r#"<li class="item tag {weight}"><label><input type="checkbox" name="{prefix}{id}" value="1"> {display}</label><span class="count"><a href="/admin/posts?search=tag:{search}" title="{title}">{count}</a></span></li>"#,
            weight = item.weight.css_class(),
            prefix = TERM_FIELD_PREFIX,
            id = term.id,
            display = display,
            search = urlencoding::encode(&term.searchable_text),
            title = html_escape(&title),
            count = term.count,
        );
    }
}

impl TagListRenderer for HtmlRenderer {
    fn render_collection(&self, terms: &[WeightedTerm]) -> String {
        if terms.is_empty() {
            return format!(
                "<p>{}</p>",
                html_escape(&self.translator.translate(i18n::MSG_NO_TAGS, &[]))
            );
        }

        let mut out = String::from(r#"<ul class="container items">"#);
        for item in terms {
            self.render_item(&mut out, item);
        }
        out.push_str("</ul>");
        out
    }

    fn render_page(&self, view: &PageView<'_>) -> String {
        let t = |key: &str| html_escape(&self.translator.translate(key, &[]));

        let mut notices = String::new();
        for notice in view.notices {
            let class = match notice.kind {
                NoticeKind::Info => "notice",
                NoticeKind::Error => "notice error",
            };
            let _ = write!(
                notices,
                r#"<div class="{}">{}</div>"#,
                class,
                html_escape(&notice.message)
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{assets}/manage.js" defer></script>
</head>
<body>
{notices}
<form method="post" action="/admin/tags" id="tags">
<input type="hidden" name="nonce" value="{nonce}">
<input type="hidden" name="timestamp" value="{timestamp}">
<input type="hidden" name="digest" value="{digest}">
<input type="search" id="tag-search" placeholder="{search}">
<button type="submit" name="action" value="delete">{delete}</button>
<input type="text" name="master" placeholder="{new_name}">
<button type="submit" name="action" value="rename">{rename}</button>
<div id="tag_collection">{collection}</div>
</form>
</body>
</html>
"#,
            title = t("Tags"),
            assets = html_escape(view.assets_path),
            notices = notices,
            nonce = html_escape(&view.credentials.nonce),
            timestamp = html_escape(&view.credentials.timestamp),
            digest = html_escape(&view.credentials.digest),
            search = t("Search tags"),
            delete = t("Delete selected"),
            new_name = t("New name"),
            rename = t("Rename selected"),
            collection = self.render_collection(view.terms),
        )
    }
}

pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
