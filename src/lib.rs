pub mod context;
pub mod geom;
mod uid;
pub mod urban;
pub mod vecutils;

// Prelude
pub use geom::obb::OrientedBoundingBox;
pub use geom::point::Point;
pub use geom::polyface::Polyface;
pub use geom::polygon::Polygon;
pub use geom::segment::Segment;
pub use geom::triangles::TriangleIndex;
pub use geom::vector::Vector;
pub use uid::UID;
pub use urban::building::{Building, Room};
pub use urban::construction::Construction;
pub use urban::inventory::BuildingInventory;
pub use urban::surface::{BoundaryCondition, Surface, SurfaceKind};
