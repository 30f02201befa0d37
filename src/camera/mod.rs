pub mod capture;

pub use capture::{Frame, OpenCvCamera, ThreadedCamera};
