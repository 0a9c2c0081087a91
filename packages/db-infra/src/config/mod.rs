pub mod data_dir;
pub mod descriptor;
pub mod settings;
