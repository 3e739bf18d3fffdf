//! Business logic services for the Rice Quality Inspection Platform

pub mod inspection;
pub mod result;
pub mod standard;
pub mod storage;

pub use inspection::InspectionService;
pub use result::ResultService;
pub use standard::StandardService;
pub use storage::GrainFileStore;
