pub mod mvi;
pub mod reimburse;
