//! Bencode wire format.
//!
//! ```text
//! value      := integer | bytestring | list | dict
//! integer    := 'i' '-'? digit+ 'e'
//! bytestring := digit+ ':' <N raw bytes>
//! list       := 'l' value* 'e'
//! dict       := 'd' (bytestring value)* 'e'
//! ```

pub mod decode;
pub mod encode;
pub mod primitives;

pub use decode::{decode, decode_slice, decode_with_options, DecodeOptions, Decoder};
pub use encode::{
    encode, encode_record, encode_record_with_options, encode_with_options, to_vec,
    to_vec_with_options, EncodeOptions, Encoder,
};
pub use primitives::{Reader, Writer};
