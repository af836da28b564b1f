use std::collections::HashMap;

use crate::Point;
use crate::geom::bboxes::bounding_box;
use crate::geom::segment::Segment;

/// Triangles are registered in every cell their padded bounding box touches.
const CELL_PADDING: f64 = 1e-6;

type Cell = (i32, i32, i32);

/// Uniform grid mapping cells to the indices of the triangles they overlap.
pub struct VoxelGrid {
    grid: HashMap<Cell, Vec<usize>>,
    step: f64,
}

impl VoxelGrid {
    pub fn new(triangles: &[[Point; 3]], step: f64) -> Self {
        let mut grid: HashMap<Cell, Vec<usize>> = HashMap::new();

        for (idx, tri) in triangles.iter().enumerate() {
            let (tmin, tmax) = bounding_box(tri);
            let (imin, jmin, kmin) = cell_of(
                Point::new(
                    tmin.x - CELL_PADDING,
                    tmin.y - CELL_PADDING,
                    tmin.z - CELL_PADDING,
                ),
                step,
            );
            let (imax, jmax, kmax) = cell_of(
                Point::new(
                    tmax.x + CELL_PADDING,
                    tmax.y + CELL_PADDING,
                    tmax.z + CELL_PADDING,
                ),
                step,
            );
            for i in imin..=imax {
                for j in jmin..=jmax {
                    for k in kmin..=kmax {
                        grid.entry((i, j, k)).or_default().push(idx);
                    }
                }
            }
        }

        Self { grid, step }
    }

    pub fn num_cells(&self) -> usize {
        self.grid.len()
    }

    /// Triangle indices registered in `cell`.
    pub fn cell(&self, cell: Cell) -> &[usize] {
        self.grid.get(&cell).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Cells crossed by `seg`, from start to end (3D-DDA).
    pub fn traverse(&self, seg: &Segment) -> Vec<Cell> {
        let start = seg.start;
        let dir = seg.vector();
        let mut cell = cell_of(start, self.step);
        let last = cell_of(seg.end, self.step);

        let axis = |p: f64, d: f64, c: i32| -> (i32, f64, f64) {
            if d > 0. {
                let boundary = (c + 1) as f64 * self.step;
                (1, (boundary - p) / d, self.step / d)
            } else if d < 0. {
                let boundary = c as f64 * self.step;
                (-1, (boundary - p) / d, -self.step / d)
            } else {
                (0, f64::INFINITY, f64::INFINITY)
            }
        };
        let (si, mut ti, dti) = axis(start.x, dir.dx, cell.0);
        let (sj, mut tj, dtj) = axis(start.y, dir.dy, cell.1);
        let (sk, mut tk, dtk) = axis(start.z, dir.dz, cell.2);

        let max_steps = ((last.0 - cell.0).abs() + (last.1 - cell.1).abs() + (last.2 - cell.2).abs())
            as usize;
        let mut cells = Vec::with_capacity(max_steps + 1);
        cells.push(cell);
        for _ in 0..max_steps {
            if ti <= tj && ti <= tk {
                if ti > 1. {
                    break;
                }
                cell.0 += si;
                ti += dti;
            } else if tj <= tk {
                if tj > 1. {
                    break;
                }
                cell.1 += sj;
                tj += dtj;
            } else {
                if tk > 1. {
                    break;
                }
                cell.2 += sk;
                tk += dtk;
            }
            cells.push(cell);
        }
        cells
    }
}

fn cell_of(p: Point, step: f64) -> Cell {
    (
        (p.x / step).floor() as i32,
        (p.y / step).floor() as i32,
        (p.z / step).floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> [Point; 3] {
        [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_voxel_grid_basic() {
        let grid = VoxelGrid::new(&[triangle()], 0.5);
        assert!(grid.cell((0, 0, 0)).contains(&0));
        assert!(grid.cell((1, 1, 0)).contains(&0));
        // Padding registers the triangle below z = 0 as well
        assert!(grid.cell((0, 0, -1)).contains(&0));
        assert!(grid.cell((10, 10, 10)).is_empty());
        assert!(grid.num_cells() >= 8);
        assert_eq!(VoxelGrid::new(&[], 0.5).num_cells(), 0);
    }

    #[test]
    fn test_traverse_straight() {
        let grid = VoxelGrid::new(&[], 1.0);
        let seg = Segment::new(Point::new(0.5, 0.5, 0.5), Point::new(3.5, 0.5, 0.5));
        let cells = grid.traverse(&seg);
        assert_eq!(cells, vec![(0, 0, 0), (1, 0, 0), (2, 0, 0), (3, 0, 0)]);
    }

    #[test]
    fn test_traverse_diagonal() {
        let grid = VoxelGrid::new(&[], 1.0);
        let seg = Segment::new(Point::new(0.5, 0.2, 0.5), Point::new(2.5, 1.8, 0.5));
        let cells = grid.traverse(&seg);
        assert_eq!(cells.first(), Some(&(0, 0, 0)));
        assert_eq!(cells.last(), Some(&(2, 1, 0)));
        // Consecutive cells are face neighbors
        for w in cells.windows(2) {
            let d = (w[1].0 - w[0].0).abs() + (w[1].1 - w[0].1).abs() + (w[1].2 - w[0].2).abs();
            assert_eq!(d, 1);
        }
    }

    #[test]
    fn test_traverse_negative_direction() {
        let grid = VoxelGrid::new(&[], 1.0);
        let seg = Segment::new(Point::new(-0.5, 0.5, 0.5), Point::new(-2.5, 0.5, 0.5));
        let cells = grid.traverse(&seg);
        assert_eq!(cells, vec![(-1, 0, 0), (-2, 0, 0), (-3, 0, 0)]);
    }

    #[test]
    fn test_traverse_degenerate_segment() {
        let grid = VoxelGrid::new(&[], 1.0);
        let p = Point::new(0.5, 0.5, 0.5);
        assert_eq!(grid.traverse(&Segment::new(p, p)), vec![(0, 0, 0)]);
    }
}
