pub mod clock;
pub mod reconcile;
pub mod roster;
pub mod service;
