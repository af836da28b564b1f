//! Triangulated scene used for occlusion queries.

use std::collections::HashSet;

use anyhow::{Result, anyhow};

use crate::Point;
use crate::context::voxel_grid::VoxelGrid;
use crate::geom::bboxes::{are_bboxes_overlapping, bounding_box};
use crate::geom::segment::Segment;
use crate::urban::building::{Building, SceneSource};

/// Number of buildings meshed from each kind of geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneSourceCounts {
    pub merged_facade: usize,
    pub rooms: usize,
    pub extruded_footprint: usize,
}

impl SceneSourceCounts {
    pub fn add(&mut self, source: SceneSource) {
        match source {
            SceneSource::MergedFacade => self.merged_facade += 1,
            SceneSource::Rooms => self.rooms += 1,
            SceneSource::ExtrudedFootprint => self.extruded_footprint += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.merged_facade + self.rooms + self.extruded_footprint
    }
}

/// Immutable triangle soup with a voxel grid index.
///
/// Built once per run and then only read, possibly from many threads.
pub struct SceneMesh {
    triangles: Vec<[Point; 3]>,
    grid: VoxelGrid,
    bounds: (Point, Point),
    sources: SceneSourceCounts,
}

impl SceneMesh {
    pub fn new(triangles: Vec<[Point; 3]>, voxel_size: f64) -> Result<Self> {
        if !(voxel_size > 0.) || !voxel_size.is_finite() {
            return Err(anyhow!("Voxel size must be positive, got {voxel_size}"));
        }
        let grid = VoxelGrid::new(&triangles, voxel_size);
        let vertices: Vec<Point> = triangles.iter().flatten().copied().collect();
        let bounds = bounding_box(&vertices);
        Ok(Self {
            triangles,
            grid,
            bounds,
            sources: SceneSourceCounts::default(),
        })
    }

    /// Scene without geometry. Every ray is unobstructed.
    pub fn empty() -> Self {
        Self {
            triangles: Vec::new(),
            grid: VoxelGrid::new(&[], 1.),
            bounds: (Point::new(0., 0., 0.), Point::new(0., 0., 0.)),
            sources: SceneSourceCounts::default(),
        }
    }

    /// Merges the scene geometry of all `buildings`.
    ///
    /// Each building contributes its merged facade if present, otherwise its
    /// room faces, otherwise its extruded footprint.
    pub fn from_buildings<'a>(
        buildings: impl IntoIterator<Item = &'a Building>,
        voxel_size: f64,
    ) -> Result<Self> {
        let mut triangles = Vec::new();
        let mut sources = SceneSourceCounts::default();
        for b in buildings {
            triangles.extend(b.scene_triangles());
            sources.add(b.scene_source());
        }
        let mut mesh = Self::new(triangles, voxel_size)?;
        mesh.sources = sources;
        Ok(mesh)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn building_count(&self) -> usize {
        self.sources.total()
    }

    pub fn source_counts(&self) -> SceneSourceCounts {
        self.sources
    }

    /// True if any triangle lies strictly between `start` and `end`.
    pub fn ray_intersects(&self, start: Point, end: Point) -> bool {
        if self.triangles.is_empty() {
            return false;
        }
        let (smin, smax) = bounding_box(&[start, end]);
        if !are_bboxes_overlapping(smin, smax, self.bounds.0, self.bounds.1) {
            return false;
        }
        let seg = Segment::new(start, end);
        let mut tested: HashSet<usize> = HashSet::new();
        for cell in self.grid.traverse(&seg) {
            for &idx in self.grid.cell(cell) {
                if tested.insert(idx) && seg.intersect_triangle(&self.triangles[idx]).is_some() {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::polyface::Polyface;
    use crate::urban::building::Room;

    fn wall_triangles(x: f64) -> Vec<[Point; 3]> {
        let a = Point::new(x, -5., -5.);
        let b = Point::new(x, 5., -5.);
        let c = Point::new(x, 5., 5.);
        let d = Point::new(x, -5., 5.);
        vec![[a, b, c], [a, c, d]]
    }

    #[test]
    fn test_empty_scene() {
        let scene = SceneMesh::empty();
        assert!(!scene.ray_intersects(Point::new(0., 0., 0.), Point::new(10., 0., 0.)));
        assert_eq!(scene.triangle_count(), 0);
    }

    #[test]
    fn test_wall_blocks_ray() -> Result<()> {
        let scene = SceneMesh::new(wall_triangles(2.5), 1.)?;
        assert!(scene.ray_intersects(Point::new(0., 0., 0.), Point::new(5., 0., 0.)));
        assert!(scene.ray_intersects(Point::new(5., 0., 0.), Point::new(0., 0., 0.)));
        // Passing beside the wall
        assert!(!scene.ray_intersects(Point::new(0., 6., 0.), Point::new(5., 6., 0.)));
        // Stopping in front of the wall
        assert!(!scene.ray_intersects(Point::new(0., 0., 0.), Point::new(2., 0., 0.)));
        Ok(())
    }

    #[test]
    fn test_end_point_on_wall_is_not_blocked() -> Result<()> {
        let scene = SceneMesh::new(wall_triangles(2.5), 1.)?;
        assert!(!scene.ray_intersects(Point::new(0., 0., 0.), Point::new(2.5, 0., 0.)));
        Ok(())
    }

    #[test]
    fn test_large_voxels_and_long_rays() -> Result<()> {
        let scene = SceneMesh::new(wall_triangles(50.), 7.)?;
        assert!(scene.ray_intersects(Point::new(-100., 1., 2.), Point::new(100., -1., -2.)));
        assert!(!scene.ray_intersects(Point::new(-100., 1., 2.), Point::new(49.9, -1., -2.)));
        Ok(())
    }

    #[test]
    fn test_from_buildings() -> Result<()> {
        let pf = Polyface::from_box(2., 2., 2., Some((10., 0., 0.)), "box")?;
        let b = Building::basic("b", pf)?;
        let scene = SceneMesh::from_buildings([&b], 5.)?;
        assert_eq!(scene.building_count(), 1);
        assert_eq!(scene.source_counts().extruded_footprint, 1);
        assert_eq!(scene.triangle_count(), 12);
        assert!(scene.ray_intersects(Point::new(0., 1., 1.), Point::new(20., 1., 1.)));
        assert!(!scene.ray_intersects(Point::new(0., 1., 1.), Point::new(9., 1., 1.)));
        Ok(())
    }

    #[test]
    fn test_ray_outside_scene_bounds() -> Result<()> {
        let scene = SceneMesh::new(wall_triangles(2.5), 1.)?;
        assert!(!scene.ray_intersects(Point::new(0., 20., 0.), Point::new(5., 20., 0.)));
        Ok(())
    }

    #[test]
    fn test_source_counts() -> Result<()> {
        let pf = Polyface::from_box(2., 2., 2., None, "box")?;
        let room = Room::from_polyface("room", &pf, None)?;
        let modeled = Building::modeled("m", pf.clone(), vec![room.clone()])?;
        let facade = Polyface::from_box(2., 2., 2., Some((10., 0., 0.)), "facade")?;
        let merged = Building::modeled("f", pf.clone(), vec![room])?.with_merged_facade(facade);
        let basic = Building::basic("b", Polyface::from_box(2., 2., 2., Some((20., 0., 0.)), "box")?)?;

        let scene = SceneMesh::from_buildings([&modeled, &merged, &basic], 5.)?;
        let counts = scene.source_counts();
        assert_eq!(counts.merged_facade, 1);
        assert_eq!(counts.rooms, 1);
        assert_eq!(counts.extruded_footprint, 1);
        assert_eq!(scene.building_count(), 3);
        // The merged facade replaces the rooms of "f" in the mesh
        assert!(scene.ray_intersects(Point::new(5., 1., 1.), Point::new(15., 1., 1.)));
        Ok(())
    }

    #[test]
    fn test_invalid_voxel_size() {
        assert!(SceneMesh::new(wall_triangles(0.), 0.).is_err());
        assert!(SceneMesh::new(wall_triangles(0.), f64::NAN).is_err());
    }
}
