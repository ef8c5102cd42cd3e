pub mod match_result;
pub mod material;
pub mod opportunity;
pub mod profile;
