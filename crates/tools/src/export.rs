use std::path::Path;

use foundation::color::Rgba;
use layers::{DrawSurface, RasterSurface};
use runtime::ComparisonController;
use thiserror::Error;

const DIVIDER_WIDTH_PX: f64 = 2.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("png encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Renders both sides at `width` x `height` and joins them at the
/// controller's divider, with a divider line on top.
///
/// `None` until the controller has a dataset.
pub fn render_split(controller: &ComparisonController, width: u32, height: u32) -> Option<RasterSurface> {
    let mut left = RasterSurface::new(width, height);
    let mut right = RasterSurface::new(width, height);
    controller.render(&mut left, &mut right)?;

    let x = controller.divider().px(f64::from(width));
    let mut out = RasterSurface::compose_split(&left, &right, x)?;
    out.stroke_polyline(&[(x, 0.0), (x, f64::from(height))], DIVIDER_WIDTH_PX, Rgba::WHITE);
    Some(out)
}

pub fn write_png(surface: &RasterSurface, path: &Path) -> Result<(), ExportError> {
    surface.image().save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_split, write_png};
    use foundation::color::Rgba;
    use layers::{MapStyle, RasterSurface};
    use runtime::{build_dataset, ComparisonController, Input, UiSink, ViewerConfig};

    struct Quiet;

    impl UiSink for Quiet {
        fn on_load_progress(&mut self, _: u8) {}
        fn on_load_error(&mut self, _: &str) {}
        fn on_load_complete(&mut self, _: &catalog::DatasetSummary) {}
    }

    fn loaded() -> ComparisonController {
        let csv = "year,lat,lon,pr,scenario\n2020,10,20,0.5,ssp126\n2020,10,20,0.8,ssp245\n";
        let mut c = ComparisonController::default();
        let token = c.begin_load();
        c.on_load_complete(token, build_dataset(csv, false).expect("csv"), &mut Quiet)
            .expect("current");
        c
    }

    #[test]
    fn split_has_divider_line() {
        let mut c = loaded();
        assert!(c.on_input(Input::SetDivider(25.0)));
        let out = render_split(&c, 200, 100).expect("ready");
        assert_eq!(out.pixel(50, 80), Some(Rgba::WHITE));
        assert_ne!(out.pixel(60, 80), Some(Rgba::WHITE));
    }

    fn bright_in(out: &RasterSurface, cols: std::ops::Range<u32>, rows: std::ops::Range<u32>) -> bool {
        rows.flat_map(|y| cols.clone().map(move |x| (x, y)))
            .filter_map(|(x, y)| out.pixel(x, y))
            .any(|p| p.r >= 240 && p.g >= 240 && p.b >= 240)
    }

    #[test]
    fn both_labels_survive_the_split() {
        let c = loaded();
        let out = render_split(&c, 720, 360).expect("ready");
        // Left label near the top-left corner, right label near the top-right.
        assert!(bright_in(&out, 15..200, 10..42));
        assert!(bright_in(&out, 520..705, 10..42));
    }

    #[test]
    fn no_data_sits_inside_the_visible_half() {
        let csv = "year,lat,lon,pr,scenario
2020,10,20,0.5,ssp126
2021,10,20,0.8,ssp245
";
        let mut c = ComparisonController::new(ViewerConfig {
            style: MapStyle {
                no_data_color: Rgba::WHITE,
                ..MapStyle::default()
            },
            ..ViewerConfig::default()
        });
        let token = c.begin_load();
        c.on_load_complete(token, build_dataset(csv, false).expect("csv"), &mut Quiet)
            .expect("current");
        assert_eq!(c.current_year(), Some(2020));
        let out = render_split(&c, 720, 360).expect("ready");
        // 2020 has no ssp245 rows; the notice is centred on x = 540, clear
        // of the divider at x = 360.
        assert!(bright_in(&out, 480..600, 160..200));
        assert!(!bright_in(&out, 366..440, 160..200));
    }

    #[test]
    fn nothing_to_render_before_load() {
        assert!(render_split(&ComparisonController::default(), 10, 10).is_none());
    }

    #[test]
    fn png_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.png");
        let mut surface = RasterSurface::new(4, 2);
        layers::DrawSurface::clear(&mut surface, Rgba::rgb(0x1a, 0x1a, 0x2e));
        write_png(&surface, &path).expect("write");

        let img = image::open(&path).expect("decode").to_rgba8();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(3, 1).0, [0x1a, 0x1a, 0x2e, 0xff]);
    }
}
