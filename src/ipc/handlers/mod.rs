pub mod core;
pub mod exams;
pub mod plots;
pub mod settings;
pub mod tabular;
