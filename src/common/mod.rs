pub mod dos_path;
pub mod types;
pub mod unicode;
