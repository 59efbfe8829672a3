pub mod capacity;
pub mod consolidation;
pub mod gate;
pub mod leasing;
pub mod loans;
