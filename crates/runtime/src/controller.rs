use catalog::{DatasetSummary, ScenarioYearIndex};
use foundation::color::{LinearRamp, Rgba};
use layers::{DrawSurface, FrameStats, MapRenderer, SideFrame};
use streaming::{FetchToken, TokenIssuer};
use tracing::{debug, error, info, warn};

use crate::config::ViewerConfig;
use crate::load::LoadedDataset;
use crate::selection::{Divider, Selection};

/// Where the controller is in the load lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading { token: FetchToken, percent: u8 },
    Ready,
    Failed { message: String },
}

/// Receives load lifecycle notifications for the UI.
pub trait UiSink {
    fn on_load_progress(&mut self, percent: u8);
    fn on_load_error(&mut self, message: &str);
    fn on_load_complete(&mut self, summary: &DatasetSummary);
}

/// User interactions that can change what is on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    SetYearIndex(usize),
    /// Previous/next buttons; clamped at either end of the axis.
    StepYear(i32),
    /// Playback tick; wraps to the first year.
    AdvanceYear,
    SetScenarios { left: String, right: String },
    SetDivider(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub year: i32,
    pub left: FrameStats,
    pub right: FrameStats,
    /// Scale both sides were painted with.
    pub scale: LinearRamp,
}

/// Owns everything the comparison view needs between events.
#[derive(Debug)]
pub struct ComparisonController {
    config: ViewerConfig,
    renderer: MapRenderer,
    tokens: TokenIssuer,
    state: LoadState,
    dataset: Option<LoadedDataset>,
    selection: Option<Selection>,
    divider: Divider,
    size: (f64, f64),
    last_error: Option<String>,
}

impl Default for ComparisonController {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl ComparisonController {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            renderer: MapRenderer::new(config.style.clone()),
            config,
            tokens: TokenIssuer::new(),
            state: LoadState::Idle,
            dataset: None,
            selection: None,
            divider: Divider::default(),
            size: (0.0, 0.0),
            last_error: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Replaces the configuration. The current selection is kept.
    pub fn configure(&mut self, config: ViewerConfig) -> bool {
        self.renderer = MapRenderer::new(config.style.clone());
        self.config = config;
        self.is_ready()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn index(&self) -> Option<&ScenarioYearIndex> {
        self.dataset.as_ref().map(|d| &d.index)
    }

    pub fn summary(&self) -> Option<&DatasetSummary> {
        self.dataset.as_ref().map(|d| &d.summary)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn divider(&self) -> Divider {
        self.divider
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    /// Message of the most recent failed load, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn current_year(&self) -> Option<i32> {
        let index = self.index()?;
        self.selection.as_ref()?.year(index.years())
    }

    /// Starts a load, superseding any in flight.
    ///
    /// The previous dataset stays on screen until the new one completes.
    pub fn begin_load(&mut self) -> FetchToken {
        let token = self.tokens.issue();
        self.state = LoadState::Loading { token, percent: 0 };
        info!(token = token.0, "load started");
        token
    }

    /// Returns whether the update was accepted and forwarded to `sink`.
    pub fn on_load_progress(&mut self, token: FetchToken, percent: u8, sink: &mut dyn UiSink) -> bool {
        match &mut self.state {
            LoadState::Loading { token: current, percent: last } if *current == token => {
                let percent = percent.min(100);
                if percent < *last {
                    return false;
                }
                *last = percent;
                sink.on_load_progress(percent);
                true
            }
            _ => {
                debug!(token = token.0, "ignoring progress for superseded load");
                false
            }
        }
    }

    pub fn on_load_complete(
        &mut self,
        token: FetchToken,
        dataset: LoadedDataset,
        sink: &mut dyn UiSink,
    ) -> Option<DatasetSummary> {
        if !self.tokens.is_current(token) || !matches!(self.state, LoadState::Loading { .. }) {
            warn!(token = token.0, "discarding result of superseded load");
            return None;
        }

        self.selection = Selection::initial(
            &dataset.index,
            &self.config.left_scenario,
            &self.config.right_scenario,
        );
        let summary = dataset.summary.clone();
        self.dataset = Some(dataset);
        self.state = LoadState::Ready;
        self.last_error = None;

        info!(
            records = summary.record_count,
            years = summary.years.len(),
            "dataset ready"
        );
        sink.on_load_complete(&summary);
        Some(summary)
    }

    pub fn on_load_error(&mut self, token: FetchToken, message: &str, sink: &mut dyn UiSink) -> bool {
        if !self.tokens.is_current(token) || !matches!(self.state, LoadState::Loading { .. }) {
            warn!(token = token.0, "discarding error of superseded load");
            return false;
        }
        if self.dataset.is_some() {
            error!(reason = message, "reload failed; keeping the previous dataset");
            self.state = LoadState::Ready;
        } else {
            error!(reason = message, "load failed");
            self.state = LoadState::Failed {
                message: message.to_string(),
            };
        }
        self.last_error = Some(message.to_string());
        sink.on_load_error(message);
        true
    }

    /// Applies one input. Returns whether the maps need repainting.
    ///
    /// Inputs before a dataset is ready are ignored.
    pub fn on_input(&mut self, input: Input) -> bool {
        if !self.is_ready() {
            debug!(?input, "input ignored before load completes");
            return false;
        }
        let axis_len = self.index().map_or(0, |i| i.years().len());
        if let Input::SetDivider(percent) = input {
            let divider = Divider::new(percent);
            let moved = divider != self.divider;
            self.divider = divider;
            return moved;
        }
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        match input {
            Input::SetYearIndex(i) => selection.set_year_index(i, axis_len),
            Input::StepYear(delta) => selection.step(delta, axis_len),
            Input::AdvanceYear => selection.advance(axis_len),
            Input::SetScenarios { left, right } => selection.set_scenarios(&left, &right),
            Input::SetDivider(_) => false,
        }
    }

    /// Records the map surface size. Returns whether it changed.
    pub fn on_resize(&mut self, width: f64, height: f64) -> bool {
        let size = (width.max(0.0), height.max(0.0));
        let changed = size != self.size;
        self.size = size;
        changed && self.is_ready()
    }

    /// Scale for the current frame, shared by both sides.
    pub fn scale(&self) -> LinearRamp {
        let observed = self.index().zip(self.selection.as_ref()).and_then(|(index, sel)| {
            let year = sel.year(index.years())?;
            index.max_value([(sel.left.as_str(), year), (sel.right.as_str(), year)])
        });
        self.config.domain.resolve(observed)
    }

    /// Color stops of the active scale, low to high.
    pub fn legend(&self, steps: usize) -> Vec<Rgba> {
        self.scale().legend(steps)
    }

    /// Paints both sides for the current selection. `None` until ready.
    pub fn render<L, R>(&self, left: &mut L, right: &mut R) -> Option<RenderOutcome>
    where
        L: DrawSurface + ?Sized,
        R: DrawSurface + ?Sized,
    {
        if !self.is_ready() {
            return None;
        }
        let index = self.index()?;
        let selection = self.selection.as_ref()?;
        let year = selection.year(index.years())?;
        let scale = self.scale();
        let projection = &self.config.projection;
        let split = self.divider.percent() / 100.0;

        let left_stats = self.renderer.render_side(
            left,
            projection,
            &scale,
            index.lookup(&selection.left, year),
            &selection.left,
            SideFrame::left_of(split),
        );
        let right_stats = self.renderer.render_side(
            right,
            projection,
            &scale,
            index.lookup(&selection.right, year),
            &selection.right,
            SideFrame::right_of(split),
        );

        debug!(
            year,
            left = left_stats.painted,
            right = right_stats.painted,
            "frame rendered"
        );
        Some(RenderOutcome {
            year,
            left: left_stats,
            right: right_stats,
            scale,
        })
    }
}
