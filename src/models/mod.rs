//! Data models for Visitreg

pub mod visit;

// Re-export commonly used types
pub use visit::{
    CreateVisit, NewVisit, PurgeRange, ScanResult, StatusFilter, Visit, VisitChanges,
    VisitFilter, VisitPatch, VisitQuery, VisitStatus,
};
