#[path = "../helpers/mod.rs"]
mod helpers;
