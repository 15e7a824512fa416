pub mod backend;
pub mod cpu;
pub mod matrix;
#[cfg(feature = "native")]
pub mod native;
pub mod vector;

pub use backend::Backend;
pub use cpu::Cpu;
pub use matrix::Matrix;
#[cfg(feature = "native")]
pub use native::Native;
pub use vector::Vector;
