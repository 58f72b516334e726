//! Syntax highlighting for generated documents
//!
//! A single-file page mixes HTML tags, Tailwind classes and inline
//! JavaScript, so the highlighter knows a little of each.

use egui_code_editor::Syntax;
use once_cell::sync::Lazy;
use std::collections::BTreeSet;

const HTML_TAGS: &[&str] = &[
    "html", "head", "body", "title", "meta", "link", "script", "style", "div", "span", "p", "a",
    "img", "ul", "ol", "li", "nav", "header", "footer", "main", "section", "article", "aside",
    "h1", "h2", "h3", "h4", "h5", "h6", "button", "input", "form", "label", "select", "option",
    "textarea", "table", "thead", "tbody", "tr", "td", "th", "svg", "path", "canvas", "i", "br",
    "hr", "DOCTYPE",
];

const JS_KEYWORDS: &[&str] = &[
    "const", "let", "var", "function", "return", "if", "else", "for", "while", "do", "switch",
    "case", "break", "continue", "new", "this", "class", "extends", "async", "await", "try",
    "catch", "finally", "throw", "typeof", "instanceof", "of", "in", "true", "false", "null",
    "undefined",
];

const ATTRIBUTES: &[&str] = &[
    "class", "id", "href", "src", "rel", "type", "name", "value", "placeholder", "charset",
    "content", "lang", "alt", "onclick", "onchange", "oninput", "onsubmit", "disabled", "style",
];

const DOM_GLOBALS: &[&str] = &[
    "document", "window", "console", "localStorage", "setTimeout", "setInterval",
    "clearInterval", "clearTimeout", "addEventListener", "querySelector",
    "querySelectorAll", "getElementById", "fetch", "JSON", "Math", "Date", "tailwind",
];

static HTML_SYNTAX: Lazy<Syntax> = Lazy::new(|| {
    let keywords: BTreeSet<&'static str> = HTML_TAGS.iter().chain(JS_KEYWORDS).copied().collect();
    let types: BTreeSet<&'static str> = ATTRIBUTES.iter().copied().collect();
    let special: BTreeSet<&'static str> = DOM_GLOBALS.iter().copied().collect();

    Syntax::new("html")
        .with_comment("//")
        .with_comment_multiline(["<!--", "-->"])
        .with_keywords(keywords)
        .with_types(types)
        .with_special(special)
});

/// Highlighter for single-file HTML documents with inline script
pub fn html_syntax() -> Syntax {
    HTML_SYNTAX.clone()
}
