//! Point data model and the store that owns it.

mod point;
mod store;

pub use point::{IdGenerator, Point, PointEdit, PointId, Position};
pub use store::{Direction, NumberChange, PointStore, StoreError};
