//! Asset download through the browser `fetch` API

use labelsheet_core::LabelAssets;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// URLs an asset set was fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrls {
    pub template: Option<String>,
    pub font: Option<String>,
    pub logo: String,
}

/// Assets held by a session along with where they came from
#[derive(Debug, Default)]
pub struct AssetCache {
    urls: Option<AssetUrls>,
    assets: Option<LabelAssets>,
}

impl AssetCache {
    /// Whether the cached set was fetched from exactly these URLs
    pub fn is_current(&self, urls: &AssetUrls) -> bool {
        self.assets.is_some() && self.urls.as_ref() == Some(urls)
    }

    /// Replace the cached set; `urls` is `None` for directly supplied bytes
    pub fn store(&mut self, urls: Option<AssetUrls>, assets: LabelAssets) {
        self.urls = urls;
        self.assets = Some(assets);
    }

    pub fn assets(&self) -> Option<&LabelAssets> {
        self.assets.as_ref()
    }
}

/// Fetch every asset in turn; the first failure aborts
pub async fn fetch_assets(urls: &AssetUrls) -> Result<LabelAssets, JsValue> {
    let template = match &urls.template {
        Some(url) => Some(fetch_bytes(url).await?),
        None => None,
    };
    let font = match &urls.font {
        Some(url) => Some(fetch_bytes(url).await?),
        None => None,
    };
    let logo = fetch_bytes(&urls.logo).await?;

    Ok(LabelAssets {
        template,
        font,
        logo,
    })
}

/// GET `url` and return the response body
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);
    let request = Request::new_with_str_and_init(url, &opts)?;

    let response = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response: Response = response.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "Failed to fetch {}: HTTP {}",
            url,
            response.status()
        )));
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(logo: &str) -> AssetUrls {
        AssetUrls {
            template: Some("template.pdf".into()),
            font: None,
            logo: logo.to_string(),
        }
    }

    #[test]
    fn test_empty_cache_is_never_current() {
        let cache = AssetCache::default();
        assert!(!cache.is_current(&urls("logo.png")));
        assert!(cache.assets().is_none());
    }

    #[test]
    fn test_cache_current_only_for_same_urls() {
        let mut cache = AssetCache::default();
        cache.store(Some(urls("logo.png")), LabelAssets::default());
        assert!(cache.is_current(&urls("logo.png")));
        assert!(!cache.is_current(&urls("other.png")));
    }

    #[test]
    fn test_direct_assets_invalidate_urls() {
        let mut cache = AssetCache::default();
        cache.store(Some(urls("logo.png")), LabelAssets::default());
        cache.store(None, LabelAssets::default());
        assert!(!cache.is_current(&urls("logo.png")));
        assert!(cache.assets().is_some());
    }
}
