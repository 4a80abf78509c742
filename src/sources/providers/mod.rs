pub mod github;
pub mod news;
pub mod weather;
