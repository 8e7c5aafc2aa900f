pub mod analyze;
pub mod daily;
pub mod scan;

#[cfg(test)]
pub mod testing;
