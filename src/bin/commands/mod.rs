mod simq;
pub use simq::*;
