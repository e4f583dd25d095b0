pub mod attendance;
pub mod cahier;
pub mod calendar;
pub mod devoir;
pub mod journal;
pub mod material;
pub mod notice;
pub mod rapport;
pub mod teacher;
