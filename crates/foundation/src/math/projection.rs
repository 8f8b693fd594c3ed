use serde::{Deserialize, Serialize};

use super::geodesy::{LonLat, wrap_lon_deg};

/// Fraction of the shorter surface side used as the orthographic globe radius.
const ORTHO_RADIUS_FRACTION: f64 = 0.48;
/// Angular step used when sampling graticule and limb polylines.
const SAMPLE_STEP_DEG: f64 = 2.0;

/// Maps geographic coordinates onto a `width` x `height` pixel surface.
///
/// `project` returns `None` for points that are off-surface (for example on
/// the far side of a globe) and for non-finite input.
pub trait Projection {
    fn project(&self, lon_deg: f64, lat_deg: f64, width: f64, height: f64) -> Option<(f64, f64)>;

    /// Outline of the visible map area in pixel space.
    fn boundary(&self, width: f64, height: f64) -> Vec<(f64, f64)>;
}

/// Plate carrée: longitude and latitude map linearly onto x and y.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Equirectangular;

impl Projection for Equirectangular {
    fn project(&self, lon_deg: f64, lat_deg: f64, width: f64, height: f64) -> Option<(f64, f64)> {
        let p = LonLat::new(lon_deg, lat_deg);
        if !p.is_plottable() {
            return None;
        }
        let lon = wrap_lon_deg(lon_deg);
        let x = ((lon + 180.0) / 360.0) * width;
        let y = ((90.0 - lat_deg) / 180.0) * height;
        Some((x, y))
    }

    fn boundary(&self, width: f64, height: f64) -> Vec<(f64, f64)> {
        vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, height),
            (0.0, height),
            (0.0, 0.0),
        ]
    }
}

/// Orthographic globe view centred on a given point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orthographic {
    pub center_lon_deg: f64,
    pub center_lat_deg: f64,
}

impl Orthographic {
    pub fn new(center_lon_deg: f64, center_lat_deg: f64) -> Self {
        Self {
            center_lon_deg,
            center_lat_deg,
        }
    }

    fn radius(width: f64, height: f64) -> f64 {
        width.min(height) * ORTHO_RADIUS_FRACTION
    }
}

impl Projection for Orthographic {
    fn project(&self, lon_deg: f64, lat_deg: f64, width: f64, height: f64) -> Option<(f64, f64)> {
        if !LonLat::new(lon_deg, lat_deg).is_plottable() {
            return None;
        }
        let phi = lat_deg.to_radians();
        let phi0 = self.center_lat_deg.to_radians();
        let dlambda = (lon_deg - self.center_lon_deg).to_radians();

        // Points with a negative cosine of the angular distance sit on the
        // hidden hemisphere.
        let cos_c = phi0.sin() * phi.sin() + phi0.cos() * phi.cos() * dlambda.cos();
        if cos_c < 0.0 {
            return None;
        }

        let r = Self::radius(width, height);
        let x = r * phi.cos() * dlambda.sin();
        let y = r * (phi0.cos() * phi.sin() - phi0.sin() * phi.cos() * dlambda.cos());
        Some((width * 0.5 + x, height * 0.5 - y))
    }

    fn boundary(&self, width: f64, height: f64) -> Vec<(f64, f64)> {
        let r = Self::radius(width, height);
        let steps = (360.0 / SAMPLE_STEP_DEG) as usize;
        (0..=steps)
            .map(|i| {
                let a = (i as f64 * SAMPLE_STEP_DEG).to_radians();
                (width * 0.5 + r * a.cos(), height * 0.5 + r * a.sin())
            })
            .collect()
    }
}

/// Serializable projection choice used by viewer configuration.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionKind {
    #[default]
    Equirectangular,
    Orthographic {
        center_lon_deg: f64,
        center_lat_deg: f64,
    },
}

impl Projection for ProjectionKind {
    fn project(&self, lon_deg: f64, lat_deg: f64, width: f64, height: f64) -> Option<(f64, f64)> {
        match *self {
            ProjectionKind::Equirectangular => Equirectangular.project(lon_deg, lat_deg, width, height),
            ProjectionKind::Orthographic {
                center_lon_deg,
                center_lat_deg,
            } => Orthographic::new(center_lon_deg, center_lat_deg)
                .project(lon_deg, lat_deg, width, height),
        }
    }

    fn boundary(&self, width: f64, height: f64) -> Vec<(f64, f64)> {
        match *self {
            ProjectionKind::Equirectangular => Equirectangular.boundary(width, height),
            ProjectionKind::Orthographic {
                center_lon_deg,
                center_lat_deg,
            } => Orthographic::new(center_lon_deg, center_lat_deg).boundary(width, height),
        }
    }
}

/// Samples meridians and parallels every `step_deg` through `projection`.
///
/// Lines are split wherever they leave the visible surface, so every returned
/// polyline is continuous in pixel space.
pub fn graticule<P: Projection + ?Sized>(
    projection: &P,
    width: f64,
    height: f64,
    step_deg: f64,
) -> Vec<Vec<(f64, f64)>> {
    let mut lines = Vec::new();
    if !(step_deg.is_finite() && step_deg > 0.0) {
        return lines;
    }

    let mut lon = -180.0;
    while lon < 180.0 {
        let samples = sample_range(-90.0, 90.0).map(|lat| (lon, lat));
        split_visible(projection, width, height, samples, &mut lines);
        lon += step_deg;
    }

    let mut lat = -90.0 + step_deg;
    while lat < 90.0 {
        let samples = sample_range(-180.0, 180.0).map(|lon| (lon, lat));
        split_visible(projection, width, height, samples, &mut lines);
        lat += step_deg;
    }

    lines
}

fn sample_range(from: f64, to: f64) -> impl Iterator<Item = f64> {
    let steps = ((to - from) / SAMPLE_STEP_DEG).ceil() as usize;
    (0..=steps).map(move |i| (from + i as f64 * SAMPLE_STEP_DEG).min(to))
}

fn split_visible<P: Projection + ?Sized>(
    projection: &P,
    width: f64,
    height: f64,
    samples: impl Iterator<Item = (f64, f64)>,
    out: &mut Vec<Vec<(f64, f64)>>,
) {
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (lon, lat) in samples {
        // The antimeridian wraps to the left edge under equirectangular, so
        // stop just short of it.
        let lon = if lon >= 180.0 { 179.999 } else { lon };
        match projection.project(lon, lat, width, height) {
            Some(p) => current.push(p),
            None => {
                if current.len() >= 2 {
                    out.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() >= 2 {
        out.push(current);
    }
}
