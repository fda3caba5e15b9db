use crate::core::fields::ValueTree;
use crate::utils::error::Result;
use axum::http::{HeaderMap, StatusCode};
use handlebars::{
    html_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext,
};
use serde_json::{json, Map, Value};
use std::path::Path;

/// 編碼後的回應：本體、狀態碼、標頭
#[derive(Debug, Clone)]
pub struct Rendered {
    pub body: Vec<u8>,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

pub trait Renderer: Send + Sync {
    fn render(&self, data: &ValueTree, status: StatusCode, headers: HeaderMap) -> Result<Rendered>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, data: &ValueTree, status: StatusCode, headers: HeaderMap) -> Result<Rendered> {
        Ok(Rendered {
            body: serde_json::to_vec(data)?,
            status,
            headers,
        })
    }
}

pub const DATA_TEMPLATE: &str = "data.xhtml";

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/data.xhtml.hbs");

/// 以 Handlebars 模板輸出 XHTML；模板以 `data` 取得原始值樹
pub struct XhtmlRenderer {
    handlebars: Handlebars<'static>,
}

impl XhtmlRenderer {
    pub fn new() -> Result<Self> {
        Self::from_template_str(DEFAULT_TEMPLATE)
    }

    pub fn from_template_str(source: &str) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_helper("tree", Box::new(tree_helper));
        handlebars.register_template_string(DATA_TEMPLATE, source)?;
        Ok(Self { handlebars })
    }

    pub fn from_template_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(&path)?;
        tracing::info!("📄 Loaded XHTML template from {}", path.as_ref().display());
        Self::from_template_str(&source)
    }
}

impl Renderer for XhtmlRenderer {
    fn render(&self, data: &ValueTree, status: StatusCode, headers: HeaderMap) -> Result<Rendered> {
        let html = self
            .handlebars
            .render(DATA_TEMPLATE, &json!({ "data": data }))?;

        Ok(Rendered {
            body: html.into_bytes(),
            status,
            headers,
        })
    }
}

fn tree_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(param) = h.param(0) {
        out.write(&render_tree(param.value()))?;
    }
    Ok(())
}

/// 將值樹輸出為巢狀 `<dl>`/`<ul>`，連結三元組輸出為 `<a>`；所有文字皆跳脫
pub fn render_tree(value: &Value) -> String {
    let mut buf = String::new();
    write_node(&mut buf, value);
    buf
}

fn write_node(buf: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => buf.push_str(&n.to_string()),
        Value::String(s) => buf.push_str(&html_escape(s)),
        Value::Array(items) => {
            buf.push_str("<ul>");
            for item in items {
                buf.push_str("<li>");
                write_node(buf, item);
                buf.push_str("</li>");
            }
            buf.push_str("</ul>");
        }
        Value::Object(map) => match as_link(map) {
            Some((rel, href, description)) => {
                buf.push_str(&format!(
                    "<a rel=\"{}\" href=\"{}\">{}</a>",
                    html_escape(rel),
                    html_escape(href),
                    html_escape(description)
                ));
            }
            None => {
                buf.push_str("<dl>");
                for (key, item) in map {
                    buf.push_str(&format!("<dt>{}</dt><dd>", html_escape(key)));
                    write_node(buf, item);
                    buf.push_str("</dd>");
                }
                buf.push_str("</dl>");
            }
        },
    }
}

fn as_link(map: &Map<String, Value>) -> Option<(&str, &str, &str)> {
    if map.len() != 3 {
        return None;
    }
    Some((
        map.get("rel")?.as_str()?,
        map.get("href")?.as_str()?,
        map.get("description")?.as_str()?,
    ))
}
