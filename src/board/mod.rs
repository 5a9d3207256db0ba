//! The marker board: placement, absorption, selection and dragging
//!
//! All mutation happens through `&mut self` on the input-handling thread.

mod selection;

pub use selection::{Drag, DragMode, Selection};

use crate::config::{FlyTrapConfig, Rgb};
use crate::domain::{Marker, MarkerId, MarkerRecord, Point};

/// Outcome of placing a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The marker was appended to the board
    Placed(MarkerId),
    /// The marker merged into an existing one and was discarded
    Absorbed {
        /// First marker that absorbed the placed one
        into: MarkerId,
        /// Marker that grew last once the cascade settled
        settled: MarkerId,
        /// Number of further markers swallowed by the cascade
        cascaded: usize,
    },
}

/// Ordered collection of markers in creation order
#[derive(Debug, Clone)]
pub struct MarkerBoard {
    markers: Vec<Marker>,
    last_id: u32,
    default_radius: f32,
    accent_color: Rgb,
    selection: Selection,
    drag: Option<Drag>,
}

impl MarkerBoard {
    pub fn new(config: &FlyTrapConfig) -> Self {
        Self {
            markers: Vec::new(),
            last_id: 0,
            default_radius: config.default_radius,
            accent_color: config.accent_color,
            selection: Selection::Idle,
            drag: None,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id() == id)
    }

    fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| m.id() == id)
    }

    fn index_of(&self, id: MarkerId) -> Option<usize> {
        self.markers.iter().position(|m| m.id() == id)
    }

    /// Next id after `last_id` not used on the board, wrapping past `u32::MAX`
    fn allocate_id(&mut self) -> MarkerId {
        let mut candidate = self.last_id;
        loop {
            candidate = candidate.checked_add(1).unwrap_or(1);
            if self.index_of(MarkerId(candidate)).is_none() {
                break;
            }
        }
        self.last_id = candidate;
        MarkerId(candidate)
    }

    /// Create a marker at `center` with a fresh id and the configured defaults
    ///
    /// The marker is not on the board until passed to [`Self::add_or_absorb`].
    pub fn next_marker(&mut self, center: Point) -> Marker {
        let id = self.allocate_id();
        Marker::place(id, center, self.default_radius, self.accent_color)
    }

    /// Index of the first marker overlapping `marker`, skipping `skip`
    fn first_overlap(&self, marker: &Marker, skip: Option<usize>) -> Option<usize> {
        self.markers
            .iter()
            .enumerate()
            .find(|(i, other)| Some(*i) != skip && marker.overlaps(other))
            .map(|(i, _)| i)
    }

    /// Grow the marker at `index` by half of `absorbed` and pull it halfway toward it
    fn absorb_into(&mut self, index: usize, absorbed: &Marker) {
        let target = &mut self.markers[index];
        let radius = target.radius() + absorbed.radius() / 2.0;
        let center = target.center() - (target.center() - absorbed.center()) / 2.0;
        log::debug!(
            "Marker {} absorbed {}: radius {} -> {}",
            target.id(),
            absorbed.id(),
            target.radius(),
            radius
        );
        target.set_radius(radius);
        target.set_center(center);
    }

    /// Drop every reference the board holds to a marker that left the collection
    fn forget(&mut self, removed: MarkerId) {
        if self.selection.active() == Some(removed) {
            log::debug!("Active marker {} was absorbed, leaving edit mode", removed);
            self.selection = Selection::Idle;
        }
        if self.drag.is_some_and(|d| d.marker == removed) {
            self.drag = None;
        }
    }

    /// Keep absorbing until the marker at `grown` overlaps nothing else
    ///
    /// Each step removes one marker from the board, so the loop is bounded by
    /// the board size. Returns the index of the marker that grew last and the
    /// number of markers absorbed.
    fn cascade(&mut self, mut grown: usize) -> (usize, usize) {
        let mut cascaded = 0;
        while let Some(other) = self.first_overlap(&self.markers[grown], Some(grown)) {
            let absorbed = self.markers.remove(other);
            if other < grown {
                grown -= 1;
            }
            // `absorbed` still overlaps the grown marker, so a target always exists
            let absorber = self.first_overlap(&absorbed, None).unwrap_or(grown);
            self.absorb_into(absorber, &absorbed);
            self.forget(absorbed.id());
            cascaded += 1;
            grown = absorber;
        }
        (grown, cascaded)
    }

    /// Absorb an off-board marker into the first marker it overlaps
    fn absorb(&mut self, marker: &Marker) -> Option<Placement> {
        let target = self.first_overlap(marker, None)?;
        let into = self.markers[target].id();
        self.absorb_into(target, marker);
        let (settled, cascaded) = self.cascade(target);
        Some(Placement::Absorbed {
            into,
            settled: self.markers[settled].id(),
            cascaded,
        })
    }

    /// Place a marker, merging it into the first existing marker it overlaps
    pub fn add_or_absorb(&mut self, mut marker: Marker) -> Placement {
        if self.index_of(marker.id()).is_some() {
            let fresh = self.allocate_id();
            log::debug!("Marker id {} already in use, re-stamped as {}", marker.id(), fresh);
            marker.set_id(fresh);
        }
        if let Some(placement) = self.absorb(&marker) {
            return placement;
        }
        self.last_id = self.last_id.max(marker.id().0);

        let id = marker.id();
        log::debug!(
            "Placed marker {} at ({}, {})",
            id,
            marker.center().x,
            marker.center().y
        );
        self.markers.push(marker);
        Placement::Placed(id)
    }

    /// Re-run absorption for a marker already on the board
    ///
    /// A marker that overlaps nothing keeps its position in the collection.
    pub fn settle(&mut self, id: MarkerId) -> Option<Placement> {
        let index = self.index_of(id)?;
        let marker = self.markers.remove(index);
        match self.absorb(&marker) {
            Some(placement) => {
                self.forget(id);
                Some(placement)
            }
            None => {
                self.markers.insert(index, marker);
                None
            }
        }
    }

    /// First marker, in creation order, containing `point`
    pub fn hit_test(&self, point: Point) -> Option<&Marker> {
        self.markers.iter().find(|m| m.hit_test(point))
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Marker whose comment is being edited
    pub fn active(&self) -> Option<&Marker> {
        self.selection.active().and_then(|id| self.get(id))
    }

    fn commit_pending(&mut self) {
        if let Selection::Editing { marker, pending } = std::mem::take(&mut self.selection) {
            match self.get_mut(marker) {
                Some(m) => m.set_comment(pending),
                None => log::warn!("Dropping comment for missing marker {}", marker),
            }
        }
    }

    /// Open `id` for editing, committing any comment pending on another marker
    ///
    /// Returns false, leaving the selection untouched, if `id` is not on the board.
    pub fn begin_edit(&mut self, id: MarkerId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.commit_pending();
        let pending = self.get(id).map(|m| m.comment().to_string()).unwrap_or_default();
        log::debug!("Editing marker {}", id);
        self.selection = Selection::Editing {
            marker: id,
            pending,
        };
        true
    }

    /// Replace the not-yet-committed comment text
    pub fn set_pending_comment(&mut self, text: impl Into<String>) -> bool {
        match &mut self.selection {
            Selection::Editing { pending, .. } => {
                *pending = text.into();
                true
            }
            Selection::Idle => false,
        }
    }

    /// Apply `text` to the active marker and return to idle
    ///
    /// Callers must only call this after [`Self::begin_edit`]; in idle it does
    /// nothing and returns false.
    pub fn end_edit(&mut self, text: impl Into<String>) -> bool {
        if !self.set_pending_comment(text) {
            log::debug!("end_edit called while idle");
            return false;
        }
        self.commit_pending();
        true
    }

    /// Leave edit mode, keeping whatever text is pending
    pub fn dismiss_edit(&mut self) {
        self.commit_pending();
    }

    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    /// Grab the marker under `point`
    ///
    /// Pressing the active marker resizes it; any other marker is moved.
    pub fn press(&mut self, point: Point) -> bool {
        let Some(id) = self.hit_test(point).map(Marker::id) else {
            self.drag = None;
            return false;
        };
        let mode = if self.selection.active() == Some(id) {
            DragMode::Resize
        } else {
            DragMode::Move { last: point }
        };
        self.drag = Some(Drag { marker: id, mode });
        true
    }

    /// Follow the pointer with the grabbed marker
    pub fn drag_to(&mut self, point: Point) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let Some(marker) = self.markers.iter_mut().find(|m| m.id() == drag.marker) else {
            self.drag = None;
            return false;
        };
        match &mut drag.mode {
            DragMode::Resize => marker.set_radius(marker.center().distance(point)),
            DragMode::Move { last } => {
                marker.translate(point.x - last.x, point.y - last.y);
                *last = point;
            }
        }
        true
    }

    /// Let go of the grabbed marker and settle it against its neighbours
    pub fn release(&mut self) -> Option<Placement> {
        let drag = self.drag.take()?;
        self.settle(drag.marker)
    }

    /// Records of all markers in creation order
    pub fn snapshot(&self) -> Vec<MarkerRecord> {
        self.markers.iter().map(Marker::to_record).collect()
    }
}
