//! Pure scene composition: maps store state to renderable primitives.
//!
//! The composer owns no entities. The renderer is expected to tear down and
//! respawn point-derived primitives whenever the store changes, and to
//! regenerate the backdrop only when axis labels change.

use crate::geometry::{direction_angles, Axis, Line3, Point3};
use crate::store::{AxisLabels, RenderMode, ScenePoint};

/// Half-length of each labeled axis line, in scene units.
pub const AXIS_HALF_LENGTH: f64 = 5.0;
/// Radius of a point marker sphere.
pub const MARKER_RADIUS: f64 = 0.1;
/// Length of a vector arrowhead cone.
pub const ARROWHEAD_LENGTH: f64 = 0.3;
/// Radius of a vector arrowhead cone.
pub const ARROWHEAD_RADIUS: f64 = 0.1;
/// Side length of each reference grid plane.
pub const GRID_EXTENT: f64 = 10.0;
/// Number of grid cells along each side of a plane.
pub const GRID_DIVISIONS: u32 = 10;

/// A single renderable primitive produced by the composer.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenePrimitive {
    /// Sphere marker at a point.
    Marker { position: Point3 },
    /// One open polyline visiting vertices in order.
    Polyline { vertices: Vec<Point3> },
    /// Straight segment, used for origin-anchored vectors.
    Segment { line: Line3 },
    /// Arrowhead cone at `position`, oriented by yaw/pitch in radians.
    Arrowhead { position: Point3, yaw: f64, pitch: f64 },
    /// Reference grid plane through the origin, perpendicular to `normal`.
    GridPlane { normal: Axis },
    /// Axis line from the origin to `end`.
    AxisLine { axis: Axis, end: Point3 },
    /// Axis label text placed just past the line end.
    AxisLabel {
        axis: Axis,
        text: String,
        position: Point3,
    },
    /// Tick numeral along an axis.
    Tick {
        axis: Axis,
        value: f64,
        position: Point3,
    },
}

/// Composes the point-derived primitives for the current render mode.
pub fn compose(points: &[ScenePoint], mode: RenderMode) -> Vec<ScenePrimitive> {
    let mut out = Vec::new();
    match mode {
        RenderMode::Points => {
            markers(points, &mut out);
        }
        RenderMode::Lines => {
            // Fewer than two points cannot form a line; markers only.
            if points.len() >= 2 {
                out.push(ScenePrimitive::Polyline {
                    vertices: points.iter().map(|p| p.position).collect(),
                });
            }
            markers(points, &mut out);
        }
        RenderMode::Vectors => {
            for p in points {
                // A point at the origin has no direction; skip the shaft
                // and arrowhead but keep the marker.
                if let Some((yaw, pitch)) = direction_angles(p.position) {
                    out.push(ScenePrimitive::Segment {
                        line: Line3::new(Point3::ORIGIN, p.position),
                    });
                    out.push(ScenePrimitive::Arrowhead {
                        position: p.position,
                        yaw,
                        pitch,
                    });
                }
                out.push(ScenePrimitive::Marker {
                    position: p.position,
                });
            }
        }
    }
    out
}

/// Composes the static backdrop: three grid planes, three labeled axis
/// lines and tick numerals at unit intervals.
///
/// Regenerate only when axis labels change.
pub fn backdrop(labels: &AxisLabels) -> Vec<ScenePrimitive> {
    let mut out = Vec::new();
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        out.push(ScenePrimitive::GridPlane { normal: axis });
    }
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        let unit = axis.unit();
        out.push(ScenePrimitive::AxisLine {
            axis,
            end: crate::geometry::scale(unit, AXIS_HALF_LENGTH),
        });
        out.push(ScenePrimitive::AxisLabel {
            axis,
            text: labels.get(axis).to_string(),
            position: crate::geometry::scale(unit, AXIS_HALF_LENGTH + 0.5),
        });
        for step in 1..=(AXIS_HALF_LENGTH as i64) {
            let value = step as f64;
            out.push(ScenePrimitive::Tick {
                axis,
                value,
                position: crate::geometry::scale(unit, value),
            });
        }
    }
    out
}

fn markers(points: &[ScenePoint], out: &mut Vec<ScenePrimitive>) {
    out.extend(points.iter().map(|p| ScenePrimitive::Marker {
        position: p.position,
    }));
}
