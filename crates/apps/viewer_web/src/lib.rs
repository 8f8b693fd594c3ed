use catalog::DatasetSummary;
use console_error_panic_hook::set_once;
use js_sys::{Array, Function};
use runtime::{load_dataset, ComparisonController, Input, UiSink, ViewerConfig};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

mod canvas;
mod fetch;

use canvas::CanvasSurface;
use fetch::FetchTransport;

#[derive(Debug, Default)]
pub struct ViewerState {
    pub controller: ComparisonController,
    left: Option<CanvasSurface>,
    right: Option<CanvasSurface>,
}

thread_local! {
    static STATE: RefCell<ViewerState> = RefCell::new(ViewerState::default());
}

/// Lifecycle notifications collected while the state is borrowed and
/// delivered to JS afterwards, so callbacks may call back into the viewer.
#[derive(Debug)]
enum UiEvent {
    Progress(u8),
    Error(String),
    Complete(DatasetSummary),
}

#[derive(Debug, Default)]
struct Deferred(Vec<UiEvent>);

impl UiSink for Deferred {
    fn on_load_progress(&mut self, percent: u8) {
        self.0.push(UiEvent::Progress(percent));
    }

    fn on_load_error(&mut self, message: &str) {
        self.0.push(UiEvent::Error(message.to_string()));
    }

    fn on_load_complete(&mut self, summary: &DatasetSummary) {
        self.0.push(UiEvent::Complete(summary.clone()));
    }
}

struct JsCallbacks {
    on_progress: Function,
    on_error: Function,
    on_complete: Function,
}

impl JsCallbacks {
    fn flush(&self, pending: Deferred) {
        for event in pending.0 {
            let result = match event {
                UiEvent::Progress(pct) => self.on_progress.call1(&JsValue::NULL, &JsValue::from(pct)),
                UiEvent::Error(message) => self.on_error.call1(&JsValue::NULL, &JsValue::from_str(&message)),
                UiEvent::Complete(summary) => {
                    let years: Array = summary.years.iter().map(|y| JsValue::from(*y)).collect();
                    let scenarios: Array = summary
                        .scenarios
                        .iter()
                        .map(|s| JsValue::from_str(s))
                        .collect();
                    self.on_complete.call2(&JsValue::NULL, &years, &scenarios)
                }
            };
            if let Err(err) = result {
                web_sys::console::error_1(&err);
            }
        }
    }
}

fn with_state<R>(f: impl FnOnce(&mut ViewerState) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

fn canvas_surface(document: &web_sys::Document, id: &str) -> Result<CanvasSurface, JsValue> {
    let canvas = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing {id}")))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok(CanvasSurface::new(canvas, ctx))
}

/// Repaints both canvases. Returns the year painted, or `None` when the
/// canvases are not attached or no dataset is loaded yet.
fn render_scene() -> Option<i32> {
    with_state(|s| {
        let (Some(left), Some(right)) = (s.left.as_mut(), s.right.as_mut()) else {
            return None;
        };
        s.controller.render(left, right).map(|outcome| outcome.year)
    })
}

fn apply(input: Input) {
    if with_state(|s| s.controller.on_input(input)) {
        render_scene();
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Binds the two map canvases by element id.
#[wasm_bindgen]
pub fn attach_canvases(left_id: &str, right_id: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let left = canvas_surface(&document, left_id)?;
    let right = canvas_surface(&document, right_id)?;
    with_state(|s| {
        s.left = Some(left);
        s.right = Some(right);
    });
    render_scene();
    Ok(())
}

/// Replaces the viewer configuration from JSON. Missing fields take defaults.
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let config = ViewerConfig::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    if with_state(|s| s.controller.configure(config)) {
        render_scene();
    }
    Ok(())
}

/// Streams the CSV at `url`, reporting through the three callbacks:
/// `on_progress(percent)`, `on_error(message)` and
/// `on_complete(years, scenarios)`.
#[wasm_bindgen]
pub fn load_csv(url: String, on_progress: Function, on_error: Function, on_complete: Function) {
    let callbacks = JsCallbacks {
        on_progress,
        on_error,
        on_complete,
    };
    spawn_local(async move {
        let (token, strict) = with_state(|s| (s.controller.begin_load(), s.controller.config().strict_rows));

        let result = load_dataset(&FetchTransport, &url, strict, |pct| {
            let mut pending = Deferred::default();
            with_state(|s| s.controller.on_load_progress(token, pct, &mut pending));
            callbacks.flush(pending);
        })
        .await;

        let mut pending = Deferred::default();
        match result {
            Ok(dataset) => {
                if with_state(|s| s.controller.on_load_complete(token, dataset, &mut pending)).is_some() {
                    render_scene();
                }
            }
            Err(err) => {
                let msg = format!("Failed to load {url}: {err}");
                web_sys::console::error_1(&JsValue::from_str(&msg));
                let keeps_previous = with_state(|s| {
                    s.controller.on_load_error(token, &msg, &mut pending) && s.controller.is_ready()
                });
                if keeps_previous {
                    render_scene();
                }
            }
        }
        callbacks.flush(pending);
    });
}

#[wasm_bindgen]
pub fn set_canvas_sizes(width: f64, height: f64) {
    let repaint = with_state(|s| {
        for surface in [s.left.as_ref(), s.right.as_ref()].into_iter().flatten() {
            surface.resize(width, height);
        }
        s.controller.on_resize(width, height)
    });
    if repaint {
        render_scene();
    }
}

#[wasm_bindgen]
pub fn set_year_index(index: usize) {
    apply(Input::SetYearIndex(index));
}

/// Previous (`-1`) or next (`1`) year.
#[wasm_bindgen]
pub fn step_year(delta: i32) {
    apply(Input::StepYear(delta));
}

/// Playback tick. Returns the year now shown.
#[wasm_bindgen]
pub fn advance_year() -> Option<i32> {
    apply(Input::AdvanceYear);
    with_state(|s| s.controller.current_year())
}

#[wasm_bindgen]
pub fn set_scenarios(left: String, right: String) {
    apply(Input::SetScenarios { left, right });
}

/// Moves the comparison divider. Returns the clamped percentage for the
/// page to position the divider line and clip the right map.
#[wasm_bindgen]
pub fn set_divider(percent: f64) -> f64 {
    apply(Input::SetDivider(percent));
    with_state(|s| s.controller.divider().percent())
}

/// Repaints both maps. Returns the year shown, or `undefined` before the
/// canvases are attached and a dataset is loaded.
#[wasm_bindgen]
pub fn render() -> Option<i32> {
    render_scene()
}

/// CSS colors for the legend, low to high.
#[wasm_bindgen]
pub fn legend_css() -> Array {
    with_state(|s| {
        let steps = s.controller.config().legend_steps;
        s.controller
            .legend(steps)
            .into_iter()
            .map(|c| JsValue::from_str(&c.to_css()))
            .collect()
    })
}

/// `{ year, index, can_prev, can_next }` for the year controls, or `null`
/// before a dataset is loaded.
#[wasm_bindgen]
pub fn year_navigation() -> JsValue {
    with_state(|s| {
        let (Some(index), Some(selection)) = (s.controller.index(), s.controller.selection()) else {
            return JsValue::NULL;
        };
        let axis_len = index.years().len();
        let o = js_sys::Object::new();
        let year = selection.year(index.years()).map_or(JsValue::NULL, JsValue::from);
        let _ = js_sys::Reflect::set(&o, &JsValue::from_str("year"), &year);
        let _ = js_sys::Reflect::set(
            &o,
            &JsValue::from_str("index"),
            &JsValue::from(selection.year_index as u32),
        );
        let _ = js_sys::Reflect::set(
            &o,
            &JsValue::from_str("can_prev"),
            &JsValue::from_bool(selection.can_step_back()),
        );
        let _ = js_sys::Reflect::set(
            &o,
            &JsValue::from_str("can_next"),
            &JsValue::from_bool(selection.can_step_forward(axis_len)),
        );
        o.into()
    })
}

/// Summary of the loaded dataset as JSON, or `None` before a load completes.
#[wasm_bindgen]
pub fn dataset_summary() -> Result<Option<String>, JsValue> {
    with_state(|s| {
        s.controller
            .summary()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    })
}
