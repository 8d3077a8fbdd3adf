use std::fmt;

use glam::DVec2;

/// Renderable outline of one wave layer, in SVG path syntax.
///
/// A fresh value is produced on every accepted frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WavePath {
    data: String,
}

impl WavePath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_string(self) -> String {
        self.data
    }
}

impl fmt::Display for WavePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

impl AsRef<str> for WavePath {
    fn as_ref(&self) -> &str {
        &self.data
    }
}

/// Join sampled points into a closed, fillable silhouette.
///
/// Successive points are connected by cubic segments whose (doubled) control
/// point is the previous control point mirrored through the current sample.
/// The outline then drops to the bottom-right corner, runs across to the
/// bottom-left corner and closes. `bleed` pushes both bottom corners
/// horizontally outside the container.
///
/// Fewer than two points give an empty path.
pub fn build_path(points: &[DVec2], width: f64, height: f64, bleed: f64) -> WavePath {
    let [first, second, ..] = points else {
        return WavePath::empty();
    };

    let mut svg = format!("M {} {}", first.x, first.y);

    let mut control = DVec2::new(
        (second.x - first.x) / 2.0,
        second.y - first.y + first.y + (second.y - first.y),
    );
    svg.push_str(&cubic(control, *second));

    for i in 1..points.len() - 1 {
        control = points[i] - control + points[i];
        svg.push_str(&cubic(control, points[i + 1]));
    }

    svg.push_str(&format!(" L {} {}", width + bleed, height));
    svg.push_str(&format!(" L {} {} Z", 0.0 - bleed, height));

    WavePath { data: svg }
}

fn cubic(control: DVec2, to: DVec2) -> String {
    format!(
        " C {} {} {} {} {} {}",
        control.x, control.y, control.x, control.y, to.x, to.y
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_two_points_is_empty() {
        assert!(build_path(&[], 200.0, 80.0, 0.0).is_empty());
        assert!(build_path(&[DVec2::new(0.0, 50.0)], 200.0, 80.0, 0.0).is_empty());
    }

    #[test]
    fn two_points_form_a_single_segment() {
        let points = [DVec2::new(0.0, 50.0), DVec2::new(100.0, 60.0)];
        let path = build_path(&points, 100.0, 80.0, 0.0);

        assert_eq!(path.as_str(), "M 0 50 C 50 70 50 70 100 60 L 100 80 L 0 80 Z");
    }

    #[test]
    fn control_points_mirror_through_each_sample() {
        let points = [
            DVec2::new(0.0, 50.0),
            DVec2::new(100.0, 60.0),
            DVec2::new(200.0, 50.0),
        ];
        let path = build_path(&points, 200.0, 80.0, 0.0);

        assert_eq!(
            path.to_string(),
            "M 0 50 C 50 70 50 70 100 60 C 150 50 150 50 200 50 L 200 80 L 0 80 Z"
        );
    }

    #[test]
    fn bleed_extends_the_bottom_corners() {
        let points = [DVec2::new(0.0, 10.0), DVec2::new(50.0, 10.0)];
        let path = build_path(&points, 50.0, 40.0, 1.0);

        assert!(path.as_str().ends_with(" L 51 40 L -1 40 Z"));
    }
}
