pub mod goal;
pub mod replay;
pub mod task;
