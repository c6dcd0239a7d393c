pub mod composite;
pub mod compositor;
pub mod placeholder;
pub mod surface;
