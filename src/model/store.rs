//! Ordered point collection and its numbering rules.
//!
//! The store exclusively owns the points of a project. Every operation leaves
//! the collection in a state where:
//! - no two points share a number,
//! - iterating yields points in strictly ascending number order,
//! - every committed position lies within `[0,1]×[0,1]`.

use std::collections::HashSet;

use thiserror::Error;

use crate::constants::{DEFAULT_STARTING_NUMBER, MAX_POINT_NUMBER};
use crate::model::point::{IdGenerator, Point, PointEdit, PointId, Position};

/// Errors produced by point store operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No point with the given id exists
    #[error("Point not found: {id}")]
    PointNotFound {
        /// The id that was looked up
        id: PointId,
    },

    /// Number outside the accepted range
    #[error("Invalid point number {number}: must be between 1 and {max}")]
    InvalidNumber {
        /// The rejected number
        number: u32,
        /// Largest accepted number
        max: u32,
    },

    /// Position outside the image
    #[error("Position ({x}, {y}) is outside the image")]
    OutOfBounds {
        /// Rejected normalized x
        x: f64,
        /// Rejected normalized y
        y: f64,
    },

    /// Two points with the same id
    #[error("Duplicate point id: {id}")]
    DuplicateId {
        /// The repeated id
        id: PointId,
    },

    /// Two points with the same number
    #[error("Duplicate point number: {number}")]
    DuplicateNumber {
        /// The repeated number
        number: u32,
    },
}

/// Navigation direction through the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// What `set_number` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberChange {
    /// The point already had the requested number.
    Unchanged,
    /// The number was free and has been assigned.
    Assigned,
    /// The number was taken; `shifted` other points moved up by one.
    Cascaded { shifted: usize },
}

/// Storage for the numbered points of one project.
#[derive(Debug, Clone)]
pub struct PointStore {
    /// Points sorted ascending by number.
    points: Vec<Point>,
    /// Number given to the first point when renumbering.
    starting_number: u32,
    /// Source of ids for new points.
    ids: IdGenerator,
    /// Set when points change, cleared by the renderer.
    dirty: bool,
}

impl Default for PointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PointStore {
    pub fn new() -> Self {
        Self::with_starting_number(DEFAULT_STARTING_NUMBER)
    }

    /// Create an empty store; out-of-range starting numbers are clamped.
    pub fn with_starting_number(starting_number: u32) -> Self {
        Self {
            points: Vec::new(),
            starting_number: starting_number.clamp(1, MAX_POINT_NUMBER),
            ids: IdGenerator::new(),
            dirty: true,
        }
    }

    /// Check that a number may be carried by a point.
    pub fn validate_number(number: u32) -> Result<(), StoreError> {
        if (1..=MAX_POINT_NUMBER).contains(&number) {
            Ok(())
        } else {
            Err(StoreError::InvalidNumber {
                number,
                max: MAX_POINT_NUMBER,
            })
        }
    }

    /// Check that `len` points numbered from `starting_number` upwards all
    /// stay within range.
    pub fn validate_sequence(starting_number: u32, len: usize) -> Result<(), StoreError> {
        Self::validate_number(starting_number)?;
        let span = u64::try_from(len.saturating_sub(1)).unwrap_or(u64::MAX);
        let last = u64::from(starting_number).saturating_add(span);
        if last > u64::from(MAX_POINT_NUMBER) {
            return Err(StoreError::InvalidNumber {
                number: u32::try_from(last).unwrap_or(u32::MAX),
                max: MAX_POINT_NUMBER,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn starting_number(&self) -> u32 {
        self.starting_number
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points, ascending by number.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn get(&self, id: &PointId) -> Option<&Point> {
        self.points.iter().find(|p| &p.id == id)
    }

    pub fn index_of(&self, id: &PointId) -> Option<usize> {
        self.points.iter().position(|p| &p.id == id)
    }

    pub fn find_by_number(&self, number: u32) -> Option<&Point> {
        self.points
            .binary_search_by_key(&number, |p| p.number)
            .ok()
            .map(|index| &self.points[index])
    }

    /// The point before `id` in number order, `None` at the first point.
    pub fn previous(&self, id: &PointId) -> Option<&Point> {
        let index = self.index_of(id)?;
        index.checked_sub(1).and_then(|i| self.points.get(i))
    }

    /// The point after `id` in number order, `None` at the last point.
    pub fn next(&self, id: &PointId) -> Option<&Point> {
        let index = self.index_of(id)?;
        self.points.get(index + 1)
    }

    pub fn step(&self, id: &PointId, direction: Direction) -> Option<&Point> {
        match direction {
            Direction::Previous => self.previous(id),
            Direction::Next => self.next(id),
        }
    }

    /// Move among the points that carry an image, wrapping at both ends.
    ///
    /// Returns `None` when fewer than two points carry an image. If `id` has
    /// no image itself, stepping forward lands on the first image and stepping
    /// back on the last.
    pub fn cycle_image(&self, id: &PointId, direction: Direction) -> Option<&Point> {
        let with_images: Vec<&Point> = self.points.iter().filter(|p| p.has_image()).collect();
        let count = with_images.len();
        if count <= 1 {
            return None;
        }

        let target = match with_images.iter().position(|p| &p.id == id) {
            Some(current) => match direction {
                Direction::Previous => (current + count - 1) % count,
                Direction::Next => (current + 1) % count,
            },
            None => match direction {
                Direction::Previous => count - 1,
                Direction::Next => 0,
            },
        };
        Some(with_images[target])
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a point at a normalized position.
    ///
    /// The point gets `starting_number + len()`, or the next number above the
    /// current maximum if that one is already taken. When neither is in range
    /// the lowest free number from `starting_number` up is used. Returns
    /// `None` without touching the store if the position is outside the image
    /// or the sequence starting at `starting_number` is full.
    pub fn add(&mut self, x: f64, y: f64) -> Option<&Point> {
        let Some(position) = Position::new(x, y).checked() else {
            log::debug!("Ignoring point outside the image at ({:.3}, {:.3})", x, y);
            return None;
        };
        if let Err(e) = Self::validate_sequence(self.starting_number, self.points.len() + 1) {
            log::warn!("Cannot add point: {}", e);
            return None;
        }

        let count = u32::try_from(self.points.len()).unwrap_or(u32::MAX);
        let default_number = self.starting_number.saturating_add(count);
        let number = if self.find_by_number(default_number).is_none() {
            default_number
        } else {
            let above_max = self
                .points
                .last()
                .map_or(default_number, |p| p.number.saturating_add(1));
            if Self::validate_number(above_max).is_ok() {
                above_max
            } else {
                self.first_free_from(self.starting_number)?
            }
        };

        let id = self.ids.next_id();
        let index = self.points.partition_point(|p| p.number < number);
        self.points.insert(index, Point::new(id, number, position));
        self.mark_dirty();

        let point = &self.points[index];
        log::debug!(
            "Added point {} (id {}) at ({:.3}, {:.3})",
            point.number,
            point.id,
            point.x,
            point.y
        );
        Some(point)
    }

    /// Remove a point and renumber the rest as `starting_number + index`.
    pub fn remove(&mut self, id: &PointId) -> Option<Point> {
        let index = self.index_of(id)?;
        let removed = self.points.remove(index);
        self.renumber_sequential();
        self.mark_dirty();
        log::debug!(
            "Removed point {} (id {}), {} points left",
            removed.number,
            removed.id,
            self.points.len()
        );
        Some(removed)
    }

    /// Overwrite a point's position. Numbers are not affected.
    pub fn move_point(&mut self, id: &PointId, x: f64, y: f64) -> Result<(), StoreError> {
        let position = Position::new(x, y)
            .checked()
            .ok_or(StoreError::OutOfBounds { x, y })?;
        let point = self.point_mut(id)?;
        point.x = position.x;
        point.y = position.y;
        self.mark_dirty();
        Ok(())
    }

    /// Look up which other point already holds `number`, if any.
    ///
    /// A `Some` answer means `set_number` will shift other points; callers
    /// should let the user confirm before applying it.
    pub fn number_conflict(&self, id: &PointId, number: u32) -> Result<Option<&Point>, StoreError> {
        Self::validate_number(number)?;
        if self.get(id).is_none() {
            return Err(StoreError::PointNotFound { id: id.clone() });
        }
        let Some(holder) = self.find_by_number(number).filter(|p| &p.id != id) else {
            return Ok(None);
        };

        let highest_shifted = self
            .points
            .iter()
            .rev()
            .find(|p| &p.id != id)
            .map_or(number, |p| p.number);
        if highest_shifted >= MAX_POINT_NUMBER {
            return Err(StoreError::InvalidNumber {
                number: highest_shifted.saturating_add(1),
                max: MAX_POINT_NUMBER,
            });
        }
        Ok(Some(holder))
    }

    /// Give a point a new number.
    ///
    /// If another point holds `number`, every other point numbered
    /// `>= number` is shifted up by one, highest first, before the target
    /// takes `number`. The collection is re-sorted afterwards. A shift that
    /// would push a number past the maximum is rejected before anything
    /// changes.
    pub fn set_number(&mut self, id: &PointId, number: u32) -> Result<NumberChange, StoreError> {
        let conflict = self.number_conflict(id, number)?.is_some();
        let index = self
            .index_of(id)
            .ok_or_else(|| StoreError::PointNotFound { id: id.clone() })?;
        if self.points[index].number == number {
            return Ok(NumberChange::Unchanged);
        }

        let mut shifted = 0;
        if conflict {
            for point in self.points.iter_mut().rev() {
                if &point.id != id && point.number >= number {
                    point.number += 1;
                    shifted += 1;
                }
            }
        }

        self.points[index].number = number;
        self.points.sort_by_key(|p| p.number);
        self.mark_dirty();

        if conflict {
            log::info!(
                "Point {} now numbered {}, shifted {} other points",
                id,
                number,
                shifted
            );
            Ok(NumberChange::Cascaded { shifted })
        } else {
            log::debug!("Point {} now numbered {}", id, number);
            Ok(NumberChange::Assigned)
        }
    }

    /// Change the number the sequence starts at. Existing points keep their
    /// numbers until `renumber_all` (or a removal) runs.
    ///
    /// Rejected if the current points could not be renumbered from there.
    pub fn set_starting_number(&mut self, starting_number: u32) -> Result<(), StoreError> {
        Self::validate_sequence(starting_number, self.points.len())?;
        self.starting_number = starting_number;
        Ok(())
    }

    /// Renumber every point as `starting_number + index` in current order.
    pub fn renumber_all(&mut self) -> Result<(), StoreError> {
        Self::validate_sequence(self.starting_number, self.points.len())?;
        self.renumber_sequential();
        self.mark_dirty();
        log::info!(
            "Renumbered {} points starting at {}",
            self.points.len(),
            self.starting_number
        );
        Ok(())
    }

    /// Update title, description and/or image of a point.
    pub fn edit(&mut self, id: &PointId, edit: PointEdit) -> Result<(), StoreError> {
        let point = self.point_mut(id)?;
        edit.apply(point);
        self.mark_dirty();
        Ok(())
    }

    /// Check a set of points against the store invariants.
    ///
    /// Ids and numbers must not repeat, numbers must be in range and every
    /// position must lie inside the image. Order is not checked.
    pub fn validate_points(points: &[Point]) -> Result<(), StoreError> {
        let mut ids = HashSet::with_capacity(points.len());
        let mut numbers = HashSet::with_capacity(points.len());
        for point in points {
            Self::validate_number(point.number)?;
            if !point.position().in_bounds() {
                return Err(StoreError::OutOfBounds {
                    x: point.x,
                    y: point.y,
                });
            }
            if !ids.insert(&point.id) {
                return Err(StoreError::DuplicateId {
                    id: point.id.clone(),
                });
            }
            if !numbers.insert(point.number) {
                return Err(StoreError::DuplicateNumber {
                    number: point.number,
                });
            }
        }
        Ok(())
    }

    /// Replace the whole collection, e.g. with points loaded from a file.
    ///
    /// Rejects invalid input (see [`PointStore::validate_points`]) without
    /// touching the store. The accepted points are sorted by number; file
    /// order is not trusted.
    pub fn replace_all(&mut self, starting_number: u32, points: Vec<Point>) -> Result<(), StoreError> {
        Self::validate_sequence(starting_number, points.len())?;
        Self::validate_points(&points)?;

        let mut points = points;
        points.sort_by_key(|p| p.number);
        for point in &points {
            self.ids.observe(&point.id);
        }

        self.points = points;
        self.starting_number = starting_number;
        self.mark_dirty();
        log::debug!(
            "Replaced store contents with {} points starting at {}",
            self.points.len(),
            starting_number
        );
        Ok(())
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        if !self.points.is_empty() {
            self.mark_dirty();
        }
        self.points.clear();
    }

    fn point_mut(&mut self, id: &PointId) -> Result<&mut Point, StoreError> {
        self.points
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::PointNotFound { id: id.clone() })
    }

    /// Lowest number at or above `from` that no point holds.
    fn first_free_from(&self, from: u32) -> Option<u32> {
        let mut candidate = from;
        for point in self.points.iter().filter(|p| p.number >= from) {
            if point.number != candidate {
                break;
            }
            candidate = candidate.checked_add(1)?;
        }
        Self::validate_number(candidate).ok().map(|()| candidate)
    }

    /// Callers keep `starting_number + len - 1` within range.
    fn renumber_sequential(&mut self) {
        let start = self.starting_number;
        for (index, point) in self.points.iter_mut().enumerate() {
            let offset = u32::try_from(index).unwrap_or(u32::MAX);
            point.number = start.saturating_add(offset);
        }
    }

    /// Panic if the numbering invariants do not hold.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        for pair in self.points.windows(2) {
            assert!(
                pair[0].number < pair[1].number,
                "numbers not strictly ascending: {} then {}",
                pair[0].number,
                pair[1].number
            );
        }
        for point in &self.points {
            assert!(point.position().in_bounds(), "point {} out of bounds", point.id);
            assert!(
                Self::validate_number(point.number).is_ok(),
                "point {} has number {} out of range",
                point.id,
                point.number
            );
        }
        assert!(
            Self::validate_sequence(self.starting_number, self.points.len()).is_ok(),
            "{} points cannot be numbered from {}",
            self.points.len(),
            self.starting_number
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(store: &PointStore) -> Vec<u32> {
        store.iter().map(|p| p.number).collect()
    }

    fn store_with(count: usize, starting_number: u32) -> (PointStore, Vec<PointId>) {
        let mut store = PointStore::with_starting_number(starting_number);
        let ids = (0..count)
            .map(|i| {
                let t = (i as f64 + 1.0) / (count as f64 + 1.0);
                store.add(t, t).unwrap().id.clone()
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn test_add_assigns_sequential_numbers() {
        let (store, ids) = store_with(3, 1);
        assert_eq!(numbers(&store), vec![1, 2, 3]);
        assert_eq!(ids.len(), 3);

        let point = store.get(&ids[0]).unwrap();
        assert!(point.title.is_empty());
        assert!(point.description.is_empty());
        assert!(point.image_data_url.is_none());
    }

    #[test]
    fn test_add_outside_image_is_ignored() {
        let mut store = PointStore::new();
        assert!(store.add(1.2, 0.5).is_none());
        assert!(store.add(0.5, -0.1).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_on_image_edges() {
        let mut store = PointStore::new();
        assert!(store.add(0.0, 0.0).is_some());
        assert!(store.add(1.0, 1.0).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_skips_taken_default_number() {
        let (mut store, ids) = store_with(2, 1);
        // [1, 2] -> [1, 3]; the default for a third point would be 3
        store.set_number(&ids[1], 3).unwrap();
        let added = store.add(0.5, 0.5).unwrap().number;
        assert_eq!(added, 4);
        assert_eq!(numbers(&store), vec![1, 3, 4]);
        store.assert_invariants();
    }

    #[test]
    fn test_add_keeps_order_when_default_is_lower() {
        let (mut store, ids) = store_with(2, 5);
        store.set_starting_number(1).unwrap();
        let added = store.add(0.5, 0.5).unwrap().id.clone();
        assert_eq!(numbers(&store), vec![3, 5, 6]);
        assert_eq!(store.first().unwrap().id, added);
        assert_eq!(store.get(&ids[0]).unwrap().number, 5);
    }

    #[test]
    fn test_remove_renumbers_remaining() {
        let (mut store, ids) = store_with(3, 5);
        assert_eq!(numbers(&store), vec![5, 6, 7]);

        let removed = store.remove(&ids[1]).unwrap();
        assert_eq!(removed.number, 6);
        assert_eq!(numbers(&store), vec![5, 6]);
        assert_eq!(store.points()[0].id, ids[0]);
        assert_eq!(store.points()[1].id, ids[2]);
    }

    #[test]
    fn test_remove_closes_gaps() {
        let (mut store, ids) = store_with(3, 1);
        store.set_number(&ids[2], 10).unwrap();
        assert_eq!(numbers(&store), vec![1, 2, 10]);

        store.remove(&ids[0]);
        assert_eq!(numbers(&store), vec![1, 2]);
    }

    #[test]
    fn test_remove_unknown_id() {
        let (mut store, _) = store_with(2, 1);
        assert!(store.remove(&PointId::new("missing")).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_move_point() {
        let (mut store, ids) = store_with(2, 1);
        store.move_point(&ids[0], 0.9, 0.1).unwrap();
        let point = store.get(&ids[0]).unwrap();
        assert_eq!((point.x, point.y), (0.9, 0.1));
        assert_eq!(numbers(&store), vec![1, 2]);
    }

    #[test]
    fn test_move_point_rejects_out_of_bounds() {
        let (mut store, ids) = store_with(1, 1);
        let before = store.get(&ids[0]).unwrap().position();

        let result = store.move_point(&ids[0], 1.5, 0.5);
        assert!(matches!(result, Err(StoreError::OutOfBounds { .. })));
        assert_eq!(store.get(&ids[0]).unwrap().position(), before);
    }

    #[test]
    fn test_set_number_conflict_cascade() {
        let (mut store, ids) = store_with(3, 1);

        let holder = store.number_conflict(&ids[0], 2).unwrap().map(|p| p.id.clone());
        assert_eq!(holder, Some(ids[1].clone()));

        let change = store.set_number(&ids[0], 2).unwrap();
        assert_eq!(change, NumberChange::Cascaded { shifted: 2 });
        assert_eq!(store.get(&ids[0]).unwrap().number, 2);
        assert_eq!(store.get(&ids[1]).unwrap().number, 3);
        assert_eq!(store.get(&ids[2]).unwrap().number, 4);
        assert_eq!(numbers(&store), vec![2, 3, 4]);
    }

    #[test]
    fn test_set_number_to_lower_taken_number() {
        let (mut store, ids) = store_with(3, 1);
        store.set_number(&ids[2], 1).unwrap();
        assert_eq!(store.get(&ids[2]).unwrap().number, 1);
        assert_eq!(store.get(&ids[0]).unwrap().number, 2);
        assert_eq!(store.get(&ids[1]).unwrap().number, 3);
        assert_eq!(store.first().unwrap().id, ids[2]);
        store.assert_invariants();
    }

    #[test]
    fn test_set_number_free_number() {
        let (mut store, ids) = store_with(3, 1);
        assert!(store.number_conflict(&ids[0], 9).unwrap().is_none());
        assert_eq!(store.set_number(&ids[0], 9).unwrap(), NumberChange::Assigned);
        assert_eq!(numbers(&store), vec![2, 3, 9]);
        assert_eq!(store.points()[2].id, ids[0]);
    }

    #[test]
    fn test_set_number_unchanged() {
        let (mut store, ids) = store_with(2, 1);
        store.clear_dirty();
        assert_eq!(store.set_number(&ids[1], 2).unwrap(), NumberChange::Unchanged);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_set_number_rejects_zero() {
        let (mut store, ids) = store_with(2, 1);
        let result = store.set_number(&ids[0], 0);
        assert!(matches!(result, Err(StoreError::InvalidNumber { number: 0, .. })));
        assert_eq!(numbers(&store), vec![1, 2]);
    }

    #[test]
    fn test_set_number_unknown_point() {
        let (mut store, _) = store_with(1, 1);
        let result = store.set_number(&PointId::new("missing"), 1);
        assert!(matches!(result, Err(StoreError::PointNotFound { .. })));
    }

    #[test]
    fn test_starting_number_and_renumber_all() {
        let (mut store, ids) = store_with(3, 1);
        store.set_number(&ids[1], 7).unwrap();
        assert_eq!(numbers(&store), vec![1, 3, 7]);

        store.set_starting_number(10).unwrap();
        assert_eq!(numbers(&store), vec![1, 3, 7]);

        store.renumber_all().unwrap();
        assert_eq!(numbers(&store), vec![10, 11, 12]);
        assert_eq!(store.points()[2].id, ids[1]);
        assert!(store.set_starting_number(0).is_err());
        assert_eq!(store.starting_number(), 10);
    }

    #[test]
    fn test_starting_number_near_ceiling() {
        let (mut store, _) = store_with(2, 1);
        let result = store.set_starting_number(MAX_POINT_NUMBER);
        assert!(matches!(result, Err(StoreError::InvalidNumber { .. })));
        assert_eq!(store.starting_number(), 1);

        store.set_starting_number(MAX_POINT_NUMBER - 1).unwrap();
        store.renumber_all().unwrap();
        assert_eq!(numbers(&store), vec![MAX_POINT_NUMBER - 1, MAX_POINT_NUMBER]);

        // The sequence is full
        assert!(store.add(0.5, 0.5).is_none());
        assert_eq!(store.len(), 2);
        store.assert_invariants();
    }

    #[test]
    fn test_set_number_cascade_stops_at_ceiling() {
        let (mut store, ids) = store_with(2, 1);
        store.set_number(&ids[1], MAX_POINT_NUMBER).unwrap();
        assert_eq!(numbers(&store), vec![1, MAX_POINT_NUMBER]);

        assert!(matches!(
            store.number_conflict(&ids[0], MAX_POINT_NUMBER),
            Err(StoreError::InvalidNumber { .. })
        ));
        let result = store.set_number(&ids[0], MAX_POINT_NUMBER);
        assert!(matches!(result, Err(StoreError::InvalidNumber { .. })));
        assert_eq!(numbers(&store), vec![1, MAX_POINT_NUMBER]);
        assert_eq!(store.points()[1].id, ids[1]);
        store.assert_invariants();
    }

    #[test]
    fn test_add_below_ceiling_takes_lowest_free_number() {
        let (mut store, ids) = store_with(2, MAX_POINT_NUMBER - 2);
        store.set_number(&ids[0], MAX_POINT_NUMBER).unwrap();
        assert_eq!(numbers(&store), vec![MAX_POINT_NUMBER - 1, MAX_POINT_NUMBER]);

        let added = store.add(0.5, 0.5).unwrap().number;
        assert_eq!(added, MAX_POINT_NUMBER - 2);
        assert_eq!(
            numbers(&store),
            vec![MAX_POINT_NUMBER - 2, MAX_POINT_NUMBER - 1, MAX_POINT_NUMBER]
        );
        store.assert_invariants();
    }

    #[test]
    fn test_edit_point() {
        let (mut store, ids) = store_with(1, 1);
        store
            .edit(&ids[0], PointEdit::new().title("Entrance").description("Main door"))
            .unwrap();
        let point = store.get(&ids[0]).unwrap();
        assert_eq!(point.title, "Entrance");
        assert_eq!(point.description, "Main door");

        let missing = store.edit(&PointId::new("missing"), PointEdit::new().title("x"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_previous_next_without_wraparound() {
        let (store, ids) = store_with(3, 1);
        assert!(store.previous(&ids[0]).is_none());
        assert_eq!(store.next(&ids[0]).unwrap().id, ids[1]);
        assert_eq!(store.previous(&ids[2]).unwrap().id, ids[1]);
        assert!(store.next(&ids[2]).is_none());
        assert_eq!(store.step(&ids[1], Direction::Next).unwrap().id, ids[2]);
    }

    #[test]
    fn test_navigation_follows_number_order() {
        let (mut store, ids) = store_with(3, 1);
        store.set_number(&ids[0], 5).unwrap();
        // order is now ids[1], ids[2], ids[0]
        assert_eq!(store.next(&ids[2]).unwrap().id, ids[0]);
        assert!(store.next(&ids[0]).is_none());
        assert!(store.previous(&ids[1]).is_none());
    }

    #[test]
    fn test_cycle_image_wraps() {
        let (mut store, ids) = store_with(4, 1);
        for id in [&ids[0], &ids[2], &ids[3]] {
            store
                .edit(id, PointEdit::new().image("data:image/png;base64,AA=="))
                .unwrap();
        }

        assert_eq!(store.cycle_image(&ids[0], Direction::Next).unwrap().id, ids[2]);
        assert_eq!(store.cycle_image(&ids[3], Direction::Next).unwrap().id, ids[0]);
        assert_eq!(store.cycle_image(&ids[0], Direction::Previous).unwrap().id, ids[3]);
        assert_eq!(store.cycle_image(&ids[1], Direction::Next).unwrap().id, ids[0]);
    }

    #[test]
    fn test_cycle_image_needs_two_images() {
        let (mut store, ids) = store_with(2, 1);
        assert!(store.cycle_image(&ids[0], Direction::Next).is_none());
        store
            .edit(&ids[0], PointEdit::new().image("data:image/png;base64,AA=="))
            .unwrap();
        assert!(store.cycle_image(&ids[0], Direction::Next).is_none());
    }

    #[test]
    fn test_replace_all_sorts_by_number() {
        let mut store = PointStore::new();
        let points = vec![
            Point::new(PointId::new("c"), 3, Position::new(0.3, 0.3)),
            Point::new(PointId::new("a"), 1, Position::new(0.1, 0.1)),
            Point::new(PointId::new("b"), 2, Position::new(0.2, 0.2)),
        ];
        store.replace_all(1, points).unwrap();
        let ids: Vec<&str> = store.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_replace_all_rejects_invalid_points() {
        let mut store = PointStore::new();
        store.add(0.5, 0.5).unwrap();

        let duplicate_numbers = vec![
            Point::new(PointId::new("a"), 1, Position::new(0.1, 0.1)),
            Point::new(PointId::new("b"), 1, Position::new(0.2, 0.2)),
        ];
        assert!(matches!(
            store.replace_all(1, duplicate_numbers),
            Err(StoreError::DuplicateNumber { number: 1 })
        ));

        let duplicate_ids = vec![
            Point::new(PointId::new("a"), 1, Position::new(0.1, 0.1)),
            Point::new(PointId::new("a"), 2, Position::new(0.2, 0.2)),
        ];
        assert!(matches!(
            store.replace_all(1, duplicate_ids),
            Err(StoreError::DuplicateId { .. })
        ));

        let outside = vec![Point::new(PointId::new("a"), 1, Position::new(1.1, 0.1))];
        assert!(matches!(
            store.replace_all(1, outside),
            Err(StoreError::OutOfBounds { .. })
        ));

        let two = vec![
            Point::new(PointId::new("a"), 1, Position::new(0.1, 0.1)),
            Point::new(PointId::new("b"), 2, Position::new(0.2, 0.2)),
        ];
        assert!(matches!(
            store.replace_all(MAX_POINT_NUMBER, two),
            Err(StoreError::InvalidNumber { .. })
        ));

        // Nothing was replaced
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_new_ids_after_replace_do_not_collide() {
        let mut store = PointStore::new();
        let far_future = PointId::new("99999999999999");
        store
            .replace_all(1, vec![Point::new(far_future.clone(), 1, Position::new(0.5, 0.5))])
            .unwrap();
        let id = store.add(0.1, 0.1).unwrap().id.clone();
        assert_ne!(id, far_future);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_numbering_invariants_hold_under_mixed_operations() {
        let mut store = PointStore::with_starting_number(3);
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next_random = move |bound: u64| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed % bound
        };

        for _ in 0..500 {
            match next_random(4) {
                0 | 1 => {
                    let x = next_random(1000) as f64 / 999.0;
                    let y = next_random(1000) as f64 / 999.0;
                    store.add(x, y);
                }
                2 if !store.is_empty() => {
                    let index = next_random(store.len() as u64) as usize;
                    let id = store.points()[index].id.clone();
                    store.remove(&id);
                }
                _ if !store.is_empty() => {
                    let index = next_random(store.len() as u64) as usize;
                    let id = store.points()[index].id.clone();
                    let number = next_random(store.len() as u64 + 5) as u32 + 1;
                    store.set_number(&id, number).unwrap();
                }
                _ => {}
            }
            store.assert_invariants();
        }
    }
}
