pub mod convert;
pub mod payload;

pub use convert::{byte_to_hex, float_to_int15, float_to_uint16, long_to_hex, short_to_hex, Decimals};
pub use payload::{Measurements, PAYLOAD_HEX_SIZE, PAYLOAD_SIZE};
