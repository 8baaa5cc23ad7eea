//! Sync tags understood by the Gravity firmware.
//!
//! Each group in a sync response starts with a decimal tag code identifying
//! the setting it carries. The numbering is shared with the firmware and must
//! never be changed on one side only.

use std::fmt;

/// Configuration fields reported by the `sync` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Whether channel hopping is on (`0` default, `1` on, `2` off).
    HopOnStatus,
    /// Minimum generated SSID length.
    SsidLenMin,
    /// Maximum generated SSID length.
    SsidLenMax,
    /// Number of SSIDs generated by default.
    SsidDefaultCount,
    /// Current WiFi channel (1-14).
    Channel,
    /// Current MAC address (`AA:BB:CC:DD:EE:FF`).
    Mac,
    /// Number of packets sent per attack burst.
    AttackPackets,
    /// Delay between attack bursts in milliseconds.
    AttackMillis,
    /// Whether the MAC is randomised per packet (`0`/`1`).
    MacRandomise,
    /// Seconds before a captured packet expires.
    PacketExpiry,
    /// Hop mode (`1` sequential, `2` random).
    HopMode,
    /// Whether dictionary words are disabled for SSID generation.
    DictionaryDisabled,
    /// Purge strategy bitmask.
    PurgeStrategy,
    /// Maximum RSSI of entries kept by the RSSI purge.
    PurgeRssiMax,
    /// Minimum age in seconds of entries removed by the age purge.
    PurgeAgeMin,
}

impl Tag {
    /// Every tag in wire order.
    pub const ALL: [Tag; 15] = [
        Tag::HopOnStatus,
        Tag::SsidLenMin,
        Tag::SsidLenMax,
        Tag::SsidDefaultCount,
        Tag::Channel,
        Tag::Mac,
        Tag::AttackPackets,
        Tag::AttackMillis,
        Tag::MacRandomise,
        Tag::PacketExpiry,
        Tag::HopMode,
        Tag::DictionaryDisabled,
        Tag::PurgeStrategy,
        Tag::PurgeRssiMax,
        Tag::PurgeAgeMin,
    ];

    /// Get the numeric wire code for this tag.
    pub fn code(&self) -> u32 {
        match self {
            Tag::HopOnStatus => 0,
            Tag::SsidLenMin => 1,
            Tag::SsidLenMax => 2,
            Tag::SsidDefaultCount => 3,
            Tag::Channel => 4,
            Tag::Mac => 5,
            Tag::AttackPackets => 6,
            Tag::AttackMillis => 7,
            Tag::MacRandomise => 8,
            Tag::PacketExpiry => 9,
            Tag::HopMode => 10,
            Tag::DictionaryDisabled => 11,
            Tag::PurgeStrategy => 12,
            Tag::PurgeRssiMax => 13,
            Tag::PurgeAgeMin => 14,
        }
    }

    /// Look up a tag from its wire code.
    ///
    /// Returns `None` for codes this host does not know about; newer firmware
    /// may report more fields than we mirror.
    pub fn from_code(code: u32) -> Option<Tag> {
        match code {
            0 => Some(Tag::HopOnStatus),
            1 => Some(Tag::SsidLenMin),
            2 => Some(Tag::SsidLenMax),
            3 => Some(Tag::SsidDefaultCount),
            4 => Some(Tag::Channel),
            5 => Some(Tag::Mac),
            6 => Some(Tag::AttackPackets),
            7 => Some(Tag::AttackMillis),
            8 => Some(Tag::MacRandomise),
            9 => Some(Tag::PacketExpiry),
            10 => Some(Tag::HopMode),
            11 => Some(Tag::DictionaryDisabled),
            12 => Some(Tag::PurgeStrategy),
            13 => Some(Tag::PurgeRssiMax),
            14 => Some(Tag::PurgeAgeMin),
            _ => None,
        }
    }

    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::HopOnStatus => "hop_on",
            Tag::SsidLenMin => "ssid_len_min",
            Tag::SsidLenMax => "ssid_len_max",
            Tag::SsidDefaultCount => "ssid_default_count",
            Tag::Channel => "channel",
            Tag::Mac => "mac",
            Tag::AttackPackets => "attack_packets",
            Tag::AttackMillis => "attack_millis",
            Tag::MacRandomise => "mac_rand",
            Tag::PacketExpiry => "packet_expiry",
            Tag::HopMode => "hop_mode",
            Tag::DictionaryDisabled => "dict_disabled",
            Tag::PurgeStrategy => "purge_strategy",
            Tag::PurgeRssiMax => "purge_rssi_max",
            Tag::PurgeAgeMin => "purge_age_min",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
