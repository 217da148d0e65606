//! `window.fetch` transport
//!
//! Mirrors the native transport's contract: non-2xx is
//! [`NetworkError::Status`] and the body is not read.

use sentiview::NetworkError;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Headers, Request, RequestInit, Response};

fn js_err(value: JsValue) -> NetworkError {
    let message = match value.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    };
    NetworkError::Transport(message)
}

pub async fn post_json(url: &str, body: &Value) -> Result<Value, NetworkError> {
    let headers = Headers::new().map_err(js_err)?;
    headers
        .set("Content-Type", "application/json")
        .map_err(js_err)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body.to_string()));

    send(url, &init).await
}

pub async fn post_file(url: &str, field: &str, file: &File) -> Result<Value, NetworkError> {
    let form = FormData::new().map_err(js_err)?;
    form.append_with_blob_and_filename(field, file, &file.name())
        .map_err(js_err)?;

    // No Content-Type header: the browser adds the multipart boundary
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);

    send(url, &init).await
}

async fn send(url: &str, init: &RequestInit) -> Result<Value, NetworkError> {
    let request = Request::new_with_str_and_init(url, init).map_err(js_err)?;
    let window = web_sys::window()
        .ok_or_else(|| NetworkError::Transport("no window".to_string()))?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;

    if !response.ok() {
        return Err(NetworkError::Status(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .ok_or_else(|| NetworkError::Decode("response body is not text".to_string()))?;

    serde_json::from_str(&text).map_err(|e| NetworkError::Decode(e.to_string()))
}
