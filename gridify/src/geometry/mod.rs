//! Basic geometry primitives for scene composition.

/// Representation of a 3D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The coordinate origin.
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

/// Representation of a 3D line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    /// Creates a new line segment.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Returns the length of the line segment.
    pub fn length(&self) -> f64 {
        distance3(self.start, self.end)
    }
}

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit point along the axis.
    pub fn unit(self) -> Point3 {
        match self {
            Axis::X => Point3::new(1.0, 0.0, 0.0),
            Axis::Y => Point3::new(0.0, 1.0, 0.0),
            Axis::Z => Point3::new(0.0, 0.0, 1.0),
        }
    }
}

/// Calculates the Euclidean distance between two 3D points.
pub fn distance3(a: Point3, b: Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

/// Scales the coordinates of `p` by `s`.
pub fn scale(p: Point3, s: f64) -> Point3 {
    Point3::new(p.x * s, p.y * s, p.z * s)
}

/// Length of the vector from the origin to `p`.
pub fn length(p: Point3) -> f64 {
    distance3(Point3::ORIGIN, p)
}

/// Normalizes the vector from the origin to `p`.
///
/// Returns `None` for the zero vector, whose direction is undefined.
pub fn normalize(p: Point3) -> Option<Point3> {
    let len = length(p);
    if len == 0.0 {
        None
    } else {
        Some(scale(p, 1.0 / len))
    }
}

/// Orientation of a direction vector as `(yaw, pitch)` in radians.
///
/// Yaw is measured in the XY plane from the +X axis; pitch is the angle
/// above the plane. Returns `None` for the zero vector.
pub fn direction_angles(v: Point3) -> Option<(f64, f64)> {
    let dir = normalize(v)?;
    let yaw = dir.y.atan2(dir.x);
    let pitch = dir.z.atan2((dir.x * dir.x + dir.y * dir.y).sqrt());
    Some((yaw, pitch))
}
