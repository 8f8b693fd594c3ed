use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;
use catalog::DatasetSummary;
use foundation::color::{ColorScale, Rgba};
use futures_util::StreamExt;
use futures_util::stream;
use http::StatusCode;
use layers::RasterSurface;
use runtime::{load_dataset, ComparisonController, Input, LoadState, UiSink, ViewerConfig};
use streaming::{FetchError, FetchResponse, MemoryTransport, Transport};

const CSV: &str = "year,lat,lon,pr_mm_day,scenario\n2020,10,20,0.5,ssp126\n2020,10,20,0.8,ssp245\n";

#[derive(Default)]
struct Sink {
    progress: Vec<u8>,
    completed: Option<DatasetSummary>,
}

impl UiSink for Sink {
    fn on_load_progress(&mut self, percent: u8) {
        self.progress.push(percent);
    }
    fn on_load_error(&mut self, message: &str) {
        panic!("unexpected load error: {message}");
    }
    fn on_load_complete(&mut self, summary: &DatasetSummary) {
        self.completed = Some(summary.clone());
    }
}

fn count(surface: &RasterSurface, color: Option<Rgba>) -> usize {
    let Some(color) = color else { return 0 };
    (0..surface.height())
        .flat_map(|y| (0..surface.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| surface.pixel(x, y) == Some(color))
        .count()
}

#[tokio::test]
async fn load_index_and_render_both_sides() {
    let mut controller = ComparisonController::new(ViewerConfig {
        style: layers::MapStyle {
            marker: layers::MarkerStyle {
                opacity: 1.0,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    });
    let mut sink = Sink::default();

    let token = controller.begin_load();
    let transport = MemoryTransport::from_text(CSV, 8);
    let loaded = load_dataset(&transport, "mem://pr.csv", false, |pct| {
        controller.on_load_progress(token, pct, &mut sink);
    })
    .await
    .expect("load");
    assert!(sink.completed.is_none());
    controller
        .on_load_complete(token, loaded, &mut sink)
        .expect("current load");

    assert_eq!(sink.progress.last(), Some(&100));
    assert!(sink.progress.windows(2).all(|w| w[0] <= w[1]));
    let summary = sink.completed.as_ref().expect("completed");
    assert_eq!(summary.years, vec![2020]);
    assert_eq!(controller.state(), &LoadState::Ready);

    let mut left = RasterSurface::new(720, 360);
    let mut right = RasterSurface::new(720, 360);
    let outcome = controller.render(&mut left, &mut right).expect("ready");
    assert_eq!(outcome.year, 2020);
    assert_eq!(outcome.left.painted, 1);
    assert_eq!(outcome.right.painted, 1);

    // lon 20, lat 10 lands at (400, 160); markers are 10 px squares.
    assert_eq!(left.pixel(400, 160), outcome.scale.color(0.5));
    assert_eq!(right.pixel(400, 160), outcome.scale.color(0.8));
    assert_eq!(count(&left, outcome.scale.color(0.5)), 100);

    let first = left.pixels().to_vec();
    controller.render(&mut left, &mut right).expect("ready");
    assert_eq!(left.pixels(), first.as_slice());

    assert!(controller.on_input(Input::SetDivider(25.0)));
    let split = RasterSurface::compose_split(&left, &right, controller.divider().px(720.0))
        .expect("same size");
    assert_eq!(split.pixel(400, 160), outcome.scale.color(0.8));
}

#[tokio::test]
async fn missing_year_paints_no_data() {
    let mut controller = ComparisonController::default();
    let token = controller.begin_load();
    let csv = format!("{CSV}2019,0,0,1.0,ssp126\n");
    let transport = MemoryTransport::from_text(&csv, 1000);
    let loaded = load_dataset(&transport, "mem://pr.csv", false, |_| {})
        .await
        .expect("load");
    controller
        .on_load_complete(token, loaded, &mut Sink::default())
        .expect("current load");

    // 2019 only exists for ssp126.
    assert_eq!(controller.current_year(), Some(2019));
    let mut left = RasterSurface::new(360, 180);
    let mut right = RasterSurface::new(360, 180);
    let outcome = controller.render(&mut left, &mut right).expect("ready");
    assert_eq!(outcome.left.painted, 1);
    assert_eq!(outcome.right.painted, 0);
    assert_ne!(left.pixels(), right.pixels());
}

#[derive(Debug, PartialEq)]
enum Event {
    Chunk,
    Progress(u8),
    Complete,
}

/// Serves fixed chunks and logs each one as the body is pulled.
struct LoggedTransport {
    chunks: Vec<Bytes>,
    log: Rc<RefCell<Vec<Event>>>,
}

impl Transport for LoggedTransport {
    async fn open(&self, _url: &str) -> Result<FetchResponse, FetchError> {
        let log = Rc::clone(&self.log);
        let len = self.chunks.iter().map(|c| c.len() as u64).sum();
        let body = stream::iter(self.chunks.clone())
            .map(move |chunk| {
                log.borrow_mut().push(Event::Chunk);
                Ok(chunk)
            })
            .boxed_local();
        Ok(FetchResponse {
            status: StatusCode::OK,
            content_length: Some(len),
            body,
        })
    }
}

struct LoggedSink(Rc<RefCell<Vec<Event>>>);

impl UiSink for LoggedSink {
    fn on_load_progress(&mut self, percent: u8) {
        self.0.borrow_mut().push(Event::Progress(percent));
    }
    fn on_load_error(&mut self, message: &str) {
        panic!("unexpected load error: {message}");
    }
    fn on_load_complete(&mut self, _: &DatasetSummary) {
        self.0.borrow_mut().push(Event::Complete);
    }
}

#[tokio::test]
async fn progress_reaches_the_sink_while_bytes_arrive() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let transport = LoggedTransport {
        chunks: CSV.as_bytes().chunks(20).map(Bytes::copy_from_slice).collect(),
        log: Rc::clone(&log),
    };
    let mut sink = LoggedSink(Rc::clone(&log));
    let mut controller = ComparisonController::default();

    let token = controller.begin_load();
    let loaded = load_dataset(&transport, "mem://pr.csv", false, |pct| {
        controller.on_load_progress(token, pct, &mut sink);
    })
    .await
    .expect("load");
    controller
        .on_load_complete(token, loaded, &mut sink)
        .expect("current load");

    let events = log.borrow();
    let chunks = events.iter().filter(|e| **e == Event::Chunk).count();
    assert_eq!(chunks, CSV.len().div_ceil(20));
    let first_progress = events
        .iter()
        .position(|e| matches!(e, Event::Progress(_)))
        .expect("progress reported");
    let last_chunk = events
        .iter()
        .rposition(|e| *e == Event::Chunk)
        .expect("chunks pulled");
    assert!(first_progress < last_chunk, "{events:?}");
    assert!(matches!(events[1], Event::Progress(p) if p < 99), "{events:?}");
    assert_eq!(events.last(), Some(&Event::Complete));
    assert_eq!(events[events.len() - 2], Event::Progress(100));
}
