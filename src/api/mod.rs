pub mod attendance;
pub mod cahiers;
pub mod calendar;
pub mod devoir;
pub mod journal;
pub mod materials;
pub mod rapports;
pub mod teachers;
