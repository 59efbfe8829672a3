pub mod capacity;
pub mod car_loan;
pub mod cash_loan;
pub mod consolidation;
pub mod leasing;
pub mod mortgage;
