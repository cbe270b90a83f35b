use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("javascript error: {0}")]
    Js(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for PageError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        PageError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}
