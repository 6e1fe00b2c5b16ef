pub mod cen;
pub mod config;
pub mod equipment;
pub mod surfaces;
