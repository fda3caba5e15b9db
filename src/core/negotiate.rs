use crate::core::fields::ValueTree;
use crate::core::render::{Rendered, Renderer};
use crate::utils::error::{ApiError, Result};
use axum::http::header::{CONTENT_TYPE, VARY};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::json;
use std::sync::Arc;

/// `Accept` 標頭中的一個媒體範圍
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
}

impl MediaRange {
    fn parse(item: &str) -> Option<Self> {
        let mut parts = item.split(';');
        let media = parts.next()?.trim().to_ascii_lowercase();
        let (kind, subtype) = media.split_once('/')?;
        let (kind, subtype) = (kind.trim(), subtype.trim());

        if kind.is_empty() || subtype.is_empty() || (kind == "*" && subtype != "*") {
            return None;
        }

        let mut quality = 1.0;
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().ok()?.clamp(0.0, 1.0);
                }
            }
        }

        Some(Self {
            kind: kind.to_string(),
            subtype: subtype.to_string(),
            quality,
        })
    }

    fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }

    fn matches(&self, media_type: &str) -> bool {
        let Some((kind, subtype)) = media_type.split_once('/') else {
            return false;
        };
        (self.kind == "*" || self.kind.eq_ignore_ascii_case(kind))
            && (self.subtype == "*" || self.subtype.eq_ignore_ascii_case(subtype))
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }
}

/// 解析 `Accept`；無法解析的項目略過，空白或缺少的標頭視為 `*/*`
pub fn parse_accept(header: Option<&str>) -> Vec<MediaRange> {
    let header = header.map(str::trim).unwrap_or_default();
    if header.is_empty() {
        return vec![MediaRange {
            kind: "*".to_string(),
            subtype: "*".to_string(),
            quality: 1.0,
        }];
    }

    header.split(',').filter_map(MediaRange::parse).collect()
}

/// 以最具體的相符範圍決定品質值；沒有相符範圍時為 0
pub fn quality_of(ranges: &[MediaRange], media_type: &str) -> f32 {
    ranges
        .iter()
        .filter(|range| range.matches(media_type))
        .max_by_key(|range| range.specificity())
        .map(|range| range.quality)
        .unwrap_or(0.0)
}

/// 品質最高者勝出，同分時依提供順序
pub fn best_match<'a, I>(accept: Option<&str>, offered: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let ranges = parse_accept(accept);
    let mut best: Option<(&'a str, f32)> = None;

    for media_type in offered {
        let quality = quality_of(&ranges, media_type);
        if quality > 0.0 && best.map_or(true, |(_, q)| quality > q) {
            best = Some((media_type, quality));
        }
    }

    best.map(|(media_type, _)| media_type)
}

/// 媒體型別 -> 編碼器的註冊表
#[derive(Clone, Default)]
pub struct RendererRegistry {
    entries: Vec<(String, Arc<dyn Renderer>)>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, media_type: &str, renderer: Arc<dyn Renderer>) -> Self {
        let media_type = media_type.trim().to_ascii_lowercase();
        self.entries.retain(|(existing, _)| *existing != media_type);
        self.entries.push((media_type, renderer));
        self
    }

    /// `application/json` 與 `text/plain` 共用同一個 JSON 編碼器
    pub fn standard(xhtml: Arc<dyn Renderer>) -> Self {
        let json: Arc<dyn Renderer> = Arc::new(crate::core::render::JsonRenderer);
        Self::new()
            .register("application/json", json.clone())
            .register("text/plain", json)
            .register("application/xhtml+xml", xhtml)
    }

    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(media_type, _)| media_type.as_str())
    }

    pub fn get(&self, media_type: &str) -> Option<&Arc<dyn Renderer>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(media_type))
            .map(|(_, renderer)| renderer)
    }

    /// 不會退回預設表示法：沒有相符型別時回傳 `NotAcceptable`
    pub fn negotiate(&self, accept: Option<&str>) -> Result<(&str, &Arc<dyn Renderer>)> {
        let media_type = best_match(accept, self.media_types()).ok_or(ApiError::NotAcceptable)?;
        let renderer = self.get(media_type).ok_or(ApiError::NotAcceptable)?;
        Ok((media_type, renderer))
    }

    /// 第一個註冊的型別；只用於錯誤回應
    pub fn fallback(&self) -> Option<(&str, &Arc<dyn Renderer>)> {
        self.entries
            .first()
            .map(|(media_type, renderer)| (media_type.as_str(), renderer))
    }

    pub fn render(
        &self,
        accept: Option<&str>,
        data: &ValueTree,
        status: StatusCode,
    ) -> Result<Rendered> {
        let (media_type, renderer) = self.negotiate(accept)?;
        Self::render_with(media_type, renderer.as_ref(), data, status)
    }

    /// 錯誤本體 `{"message": ...}` 走同一條管線；協商失敗時改用第一個註冊的型別
    pub fn render_error(&self, accept: Option<&str>, err: &ApiError) -> Result<Rendered> {
        let (media_type, renderer) = match self.negotiate(accept) {
            Ok(selected) => selected,
            Err(_) => self.fallback().ok_or(ApiError::NotAcceptable)?,
        };

        let body = json!({ "message": err.user_friendly_message() });
        Self::render_with(media_type, renderer.as_ref(), &body, err.status_code())
    }

    fn render_with(
        media_type: &str,
        renderer: &dyn Renderer,
        data: &ValueTree,
        status: StatusCode,
    ) -> Result<Rendered> {
        let mut rendered = renderer.render(data, status, HeaderMap::new())?;

        let content_type =
            HeaderValue::from_str(media_type).map_err(|e| ApiError::ConfigError {
                message: format!("invalid media type '{}': {}", media_type, e),
            })?;
        rendered.headers.insert(CONTENT_TYPE, content_type);
        rendered.headers.insert(VARY, HeaderValue::from_static("accept"));

        Ok(rendered)
    }
}
