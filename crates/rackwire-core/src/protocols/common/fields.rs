//! Value conventions shared by the device families: fixed-point pairs,
//! dotted IPv4 addresses and hex identifiers.

use std::net::Ipv4Addr;

use super::error::DecodeError;

/// Decode a signed fixed-point pair (integer byte, hundredths byte).
///
/// The integer byte is a two's complement `i8`; the sign applies to the
/// whole value, so `(0xFB, 0x32)` is `-5.50`.
///
/// # Examples
/// ```
/// use rackwire_core::signed_fixed_point;
///
/// assert_eq!(signed_fixed_point(0x1C, 0x30), 28.48);
/// assert_eq!(signed_fixed_point(0xFB, 0x32), -5.5);
/// ```
pub fn signed_fixed_point(int_byte: u8, frac_byte: u8) -> f64 {
    let signed = int_byte as i8 as i16;
    let hundredths = signed.unsigned_abs() as u32 * 100 + frac_byte as u32;
    let magnitude = hundredths as f64 / 100.0;
    if signed < 0 { -magnitude } else { magnitude }
}

/// Decode an unsigned fixed-point pair (integer byte, hundredths byte).
pub fn unsigned_fixed_point(int_byte: u8, frac_byte: u8) -> f64 {
    (int_byte as u32 * 100 + frac_byte as u32) as f64 / 100.0
}

/// Render a 32-bit address in dotted-quad form.
///
/// # Examples
/// ```
/// use rackwire_core::{ip_to_string, parse_ip};
///
/// let text = ip_to_string(0xC0A8_00D3);
/// assert_eq!(text, "192.168.0.211");
/// assert_eq!(parse_ip(&text).unwrap(), 0xC0A8_00D3);
/// ```
pub fn ip_to_string(value: u32) -> String {
    Ipv4Addr::from(value).to_string()
}

/// Parse a dotted-quad address back into its 32-bit value.
pub fn parse_ip(text: &str) -> Result<u32, DecodeError> {
    text.trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| DecodeError::InvalidIp {
            value: text.to_string(),
        })
}

/// Upper-case hex rendering used for raw binary payloads.
pub fn hex_upper(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// RFID tag identifiers are rendered as eight upper-case hex digits.
pub fn tag_id(value: u32) -> String {
    format!("{value:08X}")
}

/// MAC addresses are rendered colon separated, upper case.
pub fn mac_address(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}
