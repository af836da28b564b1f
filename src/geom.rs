pub mod bboxes;
pub mod obb;
pub mod point;
pub mod polyface;
pub mod polygon;
pub mod segment;
pub mod triangles;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-10;

/// Approximate equality for scalar geometric quantities.
pub trait IsClose {
    fn is_close(&self, other: f64) -> bool;
}

impl IsClose for f64 {
    fn is_close(&self, other: f64) -> bool {
        (self - other).abs() < EPS
    }
}

/// Rejects empty names and names containing the path separator `/`.
pub fn validate_name(name: &str) -> anyhow::Result<&str> {
    if name.is_empty() {
        return Err(anyhow::anyhow!("Name cannot be empty"));
    }
    if name.contains('/') {
        return Err(anyhow::anyhow!("Name cannot contain '/': {name}"));
    }
    Ok(name)
}
