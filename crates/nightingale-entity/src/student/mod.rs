//! Student (student directory) entity.

pub mod model;
pub mod status;

pub use model::Student;
pub use status::AcademicStatus;
