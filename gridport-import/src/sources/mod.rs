pub mod oculus;

pub use oculus::OculusSource;
