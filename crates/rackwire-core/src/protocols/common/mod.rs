//! Family-independent decoding helpers.

pub mod error;
pub mod fields;
pub mod reader;
pub mod topic;

pub use error::DecodeError;
pub use fields::{
    hex_upper, ip_to_string, mac_address, parse_ip, signed_fixed_point, tag_id,
    unsigned_fixed_point,
};
pub use reader::FrameReader;
pub use topic::{TopicParts, topic_in_namespace};
