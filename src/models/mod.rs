pub mod observation;
pub mod snapshot;
