//! MAC address values.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Number of octets in a MAC address.
pub const MAC_LEN: usize = 6;

/// A 6-byte hardware address as reported by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; MAC_LEN]);

impl MacAddress {
    /// Get the raw octets.
    pub fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }

    /// Parse a colon separated address such as `40:91:51:BB:AC:7D`.
    ///
    /// Octets may be one or two hex digits in either case.
    pub fn parse(text: &str) -> Result<MacAddress, ProtocolError> {
        let invalid = || ProtocolError::InvalidMac(text.to_string());

        let mut octets = [0u8; MAC_LEN];
        let mut parts = text.trim().split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            let padded = match part.len() {
                1 => format!("0{}", part),
                2 => part.to_string(),
                _ => return Err(invalid()),
            };
            let decoded = hex::decode(&padded).map_err(|_| invalid())?;
            *octet = decoded[0];
        }

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(MacAddress(octets))
    }
}

impl FromStr for MacAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MacAddress::parse(s)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|b| hex::encode_upper([*b])).collect();
        f.write_str(&parts.join(":"))
    }
}
