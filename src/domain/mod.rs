pub mod analysis;
pub mod classifier;
pub mod commit;
pub mod stat;
pub mod window;
