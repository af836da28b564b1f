pub mod building;
pub mod construction;
pub mod inventory;
pub mod surface;
