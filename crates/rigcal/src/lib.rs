#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use rigcal_lie as lie;

#[doc(inline)]
pub use rigcal_extrinsics as extrinsics;

#[doc(inline)]
pub use rigcal_io as io;
