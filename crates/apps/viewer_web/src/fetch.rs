use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use gloo_net::http::Request;
use http::StatusCode;
use js_sys::{Reflect, Uint8Array};
use streaming::{FetchError, FetchResponse, Transport};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

/// Browser `fetch` transport reading the body through a stream reader.
#[derive(Debug, Default, Copy, Clone)]
pub struct FetchTransport;

fn js_error(err: JsValue) -> FetchError {
    FetchError::Transport(format!("{err:?}"))
}

async fn read_chunk(reader: ReadableStreamDefaultReader) -> Option<(Result<Bytes, FetchError>, Option<ReadableStreamDefaultReader>)> {
    let result = match JsFuture::from(reader.read()).await {
        Ok(result) => result,
        Err(err) => return Some((Err(js_error(err)), None)),
    };
    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    if done {
        return None;
    }
    let value = match Reflect::get(&result, &JsValue::from_str("value")) {
        Ok(value) => value,
        Err(err) => return Some((Err(js_error(err)), None)),
    };
    let chunk = Uint8Array::new(&value).to_vec();
    Some((Ok(Bytes::from(chunk)), Some(reader)))
}

impl Transport for FetchTransport {
    async fn open(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let resp = Request::get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = StatusCode::from_u16(resp.status())
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let content_length = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = match resp.body() {
            Some(body) => {
                let reader = body.get_reader().unchecked_into::<ReadableStreamDefaultReader>();
                stream::unfold(Some(reader), |reader| async move {
                    read_chunk(reader?).await
                })
                .boxed_local()
            }
            None => stream::empty::<Result<Bytes, FetchError>>().boxed_local(),
        };

        Ok(FetchResponse {
            status,
            content_length,
            body,
        })
    }
}
