//! In-memory state container for points, render mode, axis labels and
//! camera mode.
//!
//! The store is constructor-injected into its consumers rather than kept as
//! ambient global state. Every mutation is synchronous; none can fail.
//! Invalid input degrades to a no-op or an empty result by design.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::geometry::{Axis, Point3};
use crate::parse;

/// Opaque identifier for a stored point. Assigned once, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct PointId(u64);

/// A user-entered point together with its identifier.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScenePoint {
    pub id: PointId,
    pub position: Point3,
}

/// Visualization style applied to the current point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Points,
    Lines,
    Vectors,
}

/// Camera control scheme. The enum makes mutual exclusion structural:
/// `Locked` stands for "no scheme active".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Orbit,
    Fly,
    Locked,
}

/// Display labels for the three axes. Purely cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            x: "X".to_string(),
            y: "Y".to_string(),
            z: "Z".to_string(),
        }
    }
}

impl AxisLabels {
    /// Returns the label for one axis.
    pub fn get(&self, axis: Axis) -> &str {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Change notification delivered to store subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    PointsChanged,
    RenderModeChanged(RenderMode),
    AxisLabelsChanged,
    CameraModeChanged(CameraMode),
}

/// Process-wide visualization state.
#[derive(Debug, Default)]
pub struct PointStore {
    points: Vec<ScenePoint>,
    render_mode: RenderMode,
    axis_labels: AxisLabels,
    camera_mode: CameraMode,
    next_id: u64,
    revision: u64,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl PointStore {
    /// Creates an empty store with default mode and labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all points in insertion order.
    pub fn points(&self) -> &[ScenePoint] {
        &self.points
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn axis_labels(&self) -> &AxisLabels {
        &self.axis_labels
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.camera_mode
    }

    /// Monotonic counter bumped on every mutation, for poll-style consumers.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers an observer. Events for every subsequent mutation are sent
    /// synchronously; dropped receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, event: StoreEvent) {
        self.revision += 1;
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    fn fresh_id(&mut self) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a point and returns its identifier. Never fails.
    pub fn add_point(&mut self, x: f64, y: f64, z: f64) -> PointId {
        let id = self.fresh_id();
        self.points.push(ScenePoint {
            id,
            position: Point3::new(x, y, z),
        });
        self.notify(StoreEvent::PointsChanged);
        id
    }

    /// Updates the given coordinates of a point in place. Missing fields are
    /// left untouched; an unknown id is a no-op.
    pub fn update_point(&mut self, id: PointId, x: Option<f64>, y: Option<f64>, z: Option<f64>) {
        if let Some(p) = self.points.iter_mut().find(|p| p.id == id) {
            if let Some(x) = x {
                p.position.x = x;
            }
            if let Some(y) = y {
                p.position.y = y;
            }
            if let Some(z) = z {
                p.position.z = z;
            }
            self.notify(StoreEvent::PointsChanged);
        }
    }

    /// Removes a point. An unknown id is a no-op.
    pub fn remove_point(&mut self, id: PointId) {
        let before = self.points.len();
        self.points.retain(|p| p.id != id);
        if self.points.len() != before {
            self.notify(StoreEvent::PointsChanged);
        }
    }

    /// Empties the point list. Axis labels, render mode and camera mode
    /// persist.
    pub fn clear_all(&mut self) {
        self.points.clear();
        self.notify(StoreEvent::PointsChanged);
    }

    /// Replaces the current render mode unconditionally.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
        self.notify(StoreEvent::RenderModeChanged(mode));
    }

    /// Replaces the label of one axis; the others are untouched.
    pub fn set_axis_label(&mut self, axis: Axis, value: impl Into<String>) {
        let value = value.into();
        match axis {
            Axis::X => self.axis_labels.x = value,
            Axis::Y => self.axis_labels.y = value,
            Axis::Z => self.axis_labels.z = value,
        }
        self.notify(StoreEvent::AxisLabelsChanged);
    }

    /// Enables or disables the orbit ("grab") scheme. Enabling it turns the
    /// fly scheme off; disabling it only locks the camera if orbit was the
    /// active scheme.
    pub fn set_grab_mode(&mut self, enabled: bool) {
        let mode = if enabled {
            CameraMode::Orbit
        } else if self.camera_mode == CameraMode::Orbit {
            CameraMode::Locked
        } else {
            self.camera_mode
        };
        self.set_camera_mode(mode);
    }

    /// Enables or disables the fly ("move") scheme, symmetric to
    /// [`set_grab_mode`](Self::set_grab_mode).
    pub fn set_move_mode(&mut self, enabled: bool) {
        let mode = if enabled {
            CameraMode::Fly
        } else if self.camera_mode == CameraMode::Fly {
            CameraMode::Locked
        } else {
            self.camera_mode
        };
        self.set_camera_mode(mode);
    }

    fn set_camera_mode(&mut self, mode: CameraMode) {
        if self.camera_mode != mode {
            self.camera_mode = mode;
            self.notify(StoreEvent::CameraModeChanged(mode));
        }
    }

    /// Replaces the entire point list from bracketed coordinate text, even
    /// when the parse yields nothing.
    pub fn replace_all_from_text(&mut self, text: &str) {
        let parsed = parse::parse_bracketed(text);
        let mut points = Vec::with_capacity(parsed.len());
        for position in parsed {
            let id = self.fresh_id();
            points.push(ScenePoint { id, position });
        }
        self.points = points;
        self.notify(StoreEvent::PointsChanged);
    }

    /// Appends every valid tab-separated row to the point list.
    pub fn append_from_table(&mut self, text: &str) {
        for position in parse::parse_table_rows(text) {
            let id = self.fresh_id();
            self.points.push(ScenePoint { id, position });
        }
        self.notify(StoreEvent::PointsChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_update_remove() {
        let mut store = PointStore::new();
        let a = store.add_point(1.0, 2.0, 3.0);
        let b = store.add_point(4.0, 5.0, 6.0);
        assert_ne!(a, b);

        store.update_point(a, Some(9.0), None, None);
        let p = store.points()[0];
        assert_eq!(p.id, a);
        assert_eq!(p.position, Point3::new(9.0, 2.0, 3.0));

        store.remove_point(a);
        assert_eq!(store.points().len(), 1);
        assert_eq!(store.points()[0].id, b);
    }

    #[test]
    fn missing_id_is_noop() {
        let mut store = PointStore::new();
        let a = store.add_point(1.0, 1.0, 1.0);
        store.remove_point(a);
        store.remove_point(a);
        store.update_point(a, Some(2.0), Some(2.0), Some(2.0));
        assert!(store.points().is_empty());
    }

    #[test]
    fn ids_never_reused() {
        let mut store = PointStore::new();
        let a = store.add_point(0.0, 0.0, 0.0);
        store.remove_point(a);
        let b = store.add_point(0.0, 0.0, 0.0);
        assert_ne!(a, b);
    }

    #[test]
    fn clear_keeps_mode_and_labels() {
        let mut store = PointStore::new();
        store.add_point(1.0, 2.0, 3.0);
        store.set_render_mode(RenderMode::Vectors);
        store.set_axis_label(Axis::Y, "Height");
        store.clear_all();
        assert!(store.points().is_empty());
        assert_eq!(store.render_mode(), RenderMode::Vectors);
        assert_eq!(store.axis_labels().y, "Height");
    }

    #[test]
    fn camera_modes_mutually_exclusive() {
        let mut store = PointStore::new();
        assert_eq!(store.camera_mode(), CameraMode::Orbit);

        store.set_move_mode(true);
        assert_eq!(store.camera_mode(), CameraMode::Fly);

        store.set_grab_mode(true);
        assert_eq!(store.camera_mode(), CameraMode::Orbit);

        // Disabling a scheme only affects itself.
        store.set_move_mode(false);
        assert_eq!(store.camera_mode(), CameraMode::Orbit);
        store.set_grab_mode(false);
        assert_eq!(store.camera_mode(), CameraMode::Locked);
    }

    #[test]
    fn replace_all_replaces_even_with_empty_result() {
        let mut store = PointStore::new();
        store.add_point(1.0, 1.0, 1.0);
        store.replace_all_from_text("[1,2,3],[4,5,6]");
        assert_eq!(store.points().len(), 2);
        assert_eq!(store.points()[0].position, Point3::new(1.0, 2.0, 3.0));

        store.replace_all_from_text("not coordinates");
        assert!(store.points().is_empty());
    }

    #[test]
    fn append_from_table_is_additive() {
        let mut store = PointStore::new();
        store.add_point(0.0, 0.0, 0.0);
        store.append_from_table("1\t2\t3\nbad\trow\n4\t5\t6");
        assert_eq!(store.points().len(), 3);
        assert_eq!(store.points()[2].position, Point3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let mut store = PointStore::new();
        let rx = store.subscribe();
        store.add_point(1.0, 1.0, 1.0);
        store.set_render_mode(RenderMode::Lines);
        store.set_axis_label(Axis::X, "Time");

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                StoreEvent::PointsChanged,
                StoreEvent::RenderModeChanged(RenderMode::Lines),
                StoreEvent::AxisLabelsChanged,
            ]
        );
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut store = PointStore::new();
        let rx = store.subscribe();
        drop(rx);
        store.add_point(1.0, 1.0, 1.0);
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn revision_bumps_on_mutation() {
        let mut store = PointStore::new();
        let r0 = store.revision();
        store.add_point(1.0, 2.0, 3.0);
        assert!(store.revision() > r0);
    }
}
