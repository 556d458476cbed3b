mod configuration;
mod prediction;
mod tensor;

pub use configuration::*;
pub use prediction::*;
pub use tensor::*;
