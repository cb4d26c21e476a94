pub mod player;
pub mod season;
