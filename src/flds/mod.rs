pub mod field;
pub mod ghosts;
pub mod named;
