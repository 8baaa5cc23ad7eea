//! Local mirror of the firmware configuration.
//!
//! The model is created once with defaults, updated only by the dispatcher
//! while a sync is running, and read by the menu layer whenever it renders.

use std::fmt;

use gravity_protocol::{MacAddress, Tag};
use serde::{Serialize, Serializer};

// ============================================================================
// Labels
// ============================================================================

/// Placeholder shown for a value that has not been synced yet.
pub const DEFAULT_LABEL: &str = "Get";

/// A menu option whose text is either the placeholder or a synced value.
///
/// Replacing an override drops the previous string, and the placeholder is a
/// static that is never owned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Label {
    /// Shows [`DEFAULT_LABEL`].
    #[default]
    Default,
    /// Shows a value learned from the firmware.
    Overridden(String),
}

impl Label {
    /// The text to display.
    pub fn as_str(&self) -> &str {
        match self {
            Label::Default => DEFAULT_LABEL,
            Label::Overridden(value) => value,
        }
    }

    /// Whether the placeholder is showing.
    pub fn is_default(&self) -> bool {
        matches!(self, Label::Default)
    }

    /// Install a synced value.
    pub fn set(&mut self, value: impl Into<String>) {
        *self = Label::Overridden(value.into());
    }

    /// Go back to the placeholder.
    pub fn reset(&mut self) {
        *self = Label::Default;
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Enumerated settings
// ============================================================================

/// Channel hopping state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HopStatus {
    /// Firmware default for the running feature.
    #[default]
    Default,
    /// Hopping forced on.
    On,
    /// Hopping forced off.
    Off,
}

impl HopStatus {
    /// Decode the wire value (`0` default, `1` on, `2` off).
    pub fn from_wire(value: u32) -> Option<HopStatus> {
        match value {
            0 => Some(HopStatus::Default),
            1 => Some(HopStatus::On),
            2 => Some(HopStatus::Off),
            _ => None,
        }
    }
}

/// Order in which channels are visited while hopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HopMode {
    /// Channels in ascending order.
    #[default]
    Sequential,
    /// Random channel each hop.
    Random,
}

impl HopMode {
    /// Decode the wire value (`1` sequential, `2` random).
    pub fn from_wire(value: u32) -> Option<HopMode> {
        match value {
            1 => Some(HopMode::Sequential),
            2 => Some(HopMode::Random),
            _ => None,
        }
    }
}

/// Where generated SSIDs come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SsidSource {
    /// Dictionary words.
    #[default]
    Words,
    /// Random characters.
    Characters,
}

impl SsidSource {
    /// Map the firmware's "dictionary disabled" flag.
    pub fn from_dictionary_disabled(disabled: bool) -> SsidSource {
        if disabled {
            SsidSource::Characters
        } else {
            SsidSource::Words
        }
    }
}

/// Decode a `0`/`1` wire flag.
pub fn flag_from_wire(value: u32) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

// ============================================================================
// Purge strategy
// ============================================================================

/// Purge entries older than the minimum age.
pub const PURGE_AGE: u32 = 1;
/// Purge entries weaker than the maximum RSSI.
pub const PURGE_RSSI: u32 = 2;
/// Purge entries the user has not selected.
pub const PURGE_UNSELECTED: u32 = 4;
/// Purge entries without a name.
pub const PURGE_UNNAMED: u32 = 8;

/// Which purge rules are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PurgeStrategy {
    /// Age based purge.
    pub age: bool,
    /// RSSI based purge.
    pub rssi: bool,
    /// Purge unselected entries.
    pub unselected: bool,
    /// Purge unnamed entries.
    pub unnamed: bool,
}

impl PurgeStrategy {
    /// Decode the firmware bitmask. Bits above the four known flags are ignored.
    pub fn from_bits(bits: u32) -> PurgeStrategy {
        PurgeStrategy {
            age: bits & PURGE_AGE != 0,
            rssi: bits & PURGE_RSSI != 0,
            unselected: bits & PURGE_UNSELECTED != 0,
            unnamed: bits & PURGE_UNNAMED != 0,
        }
    }

    /// Encode back to the firmware bitmask.
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.age {
            bits |= PURGE_AGE;
        }
        if self.rssi {
            bits |= PURGE_RSSI;
        }
        if self.unselected {
            bits |= PURGE_UNSELECTED;
        }
        if self.unnamed {
            bits |= PURGE_UNNAMED;
        }
        bits
    }
}

// ============================================================================
// Discrete option lists
// ============================================================================

/// RSSI thresholds offered by the purge menu, ascending.
pub const RSSI_PRESETS: [i32; 12] = [
    -125, -115, -105, -95, -85, -75, -65, -55, -45, -35, -25, -15,
];

/// Age thresholds in seconds offered by the purge menu, ascending.
pub const AGE_PRESETS: [u32; 12] = [5, 10, 20, 30, 60, 90, 120, 300, 600, 1200, 1800, 3600];

/// Index of the largest preset not above `value`, or 0 if every preset is.
pub fn snap_down<T: PartialOrd + Copy>(presets: &[T], value: T) -> usize {
    presets.iter().rposition(|&p| p <= value).unwrap_or(0)
}

/// Index of the smallest preset not below `value`, or 0 if none is.
pub fn snap_up<T: PartialOrd + Copy>(presets: &[T], value: T) -> usize {
    presets.iter().position(|&p| p >= value).unwrap_or(0)
}

// ============================================================================
// Settings model
// ============================================================================

/// The mirrored firmware configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsModel {
    /// Channel hopping state.
    pub hop_status: HopStatus,
    /// Hop order.
    pub hop_mode: HopMode,
    /// Minimum SSID length.
    pub ssid_len_min: Label,
    /// Maximum SSID length.
    pub ssid_len_max: Label,
    /// Default number of generated SSIDs.
    pub ssid_default_count: Label,
    /// WiFi channel (1-14).
    pub channel: u8,
    /// Device MAC address.
    #[serde(serialize_with = "serialize_display")]
    pub mac: MacAddress,
    /// Packets per attack burst.
    pub attack_packets: Label,
    /// Milliseconds between attack bursts.
    pub attack_millis: Label,
    /// Randomise the MAC for every packet.
    pub mac_randomise: bool,
    /// Packet expiry in seconds.
    pub packet_expiry: Label,
    /// SSID generation source.
    pub ssid_source: SsidSource,
    /// Enabled purge rules.
    pub purge: PurgeStrategy,
    /// Selected index into [`RSSI_PRESETS`].
    pub purge_rssi_index: usize,
    /// Selected index into [`AGE_PRESETS`].
    pub purge_age_index: usize,
}

impl Default for SettingsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsModel {
    /// Create a model holding the menu defaults.
    pub fn new() -> Self {
        SettingsModel {
            hop_status: HopStatus::Default,
            hop_mode: HopMode::Sequential,
            ssid_len_min: Label::Default,
            ssid_len_max: Label::Default,
            ssid_default_count: Label::Default,
            channel: 1,
            mac: MacAddress::default(),
            attack_packets: Label::Default,
            attack_millis: Label::Default,
            mac_randomise: false,
            packet_expiry: Label::Default,
            ssid_source: SsidSource::Words,
            purge: PurgeStrategy::default(),
            purge_rssi_index: 0,
            purge_age_index: 0,
        }
    }

    /// The label fed by `tag`, if that tag is shown as a label.
    pub fn label(&self, tag: Tag) -> Option<&Label> {
        match tag {
            Tag::SsidLenMin => Some(&self.ssid_len_min),
            Tag::SsidLenMax => Some(&self.ssid_len_max),
            Tag::SsidDefaultCount => Some(&self.ssid_default_count),
            Tag::AttackPackets => Some(&self.attack_packets),
            Tag::AttackMillis => Some(&self.attack_millis),
            Tag::PacketExpiry => Some(&self.packet_expiry),
            _ => None,
        }
    }

    /// Mutable access to the label fed by `tag`.
    pub fn label_mut(&mut self, tag: Tag) -> Option<&mut Label> {
        match tag {
            Tag::SsidLenMin => Some(&mut self.ssid_len_min),
            Tag::SsidLenMax => Some(&mut self.ssid_len_max),
            Tag::SsidDefaultCount => Some(&mut self.ssid_default_count),
            Tag::AttackPackets => Some(&mut self.attack_packets),
            Tag::AttackMillis => Some(&mut self.attack_millis),
            Tag::PacketExpiry => Some(&mut self.packet_expiry),
            _ => None,
        }
    }

    /// Selected RSSI purge threshold in dBm.
    pub fn purge_rssi_max(&self) -> i32 {
        RSSI_PRESETS
            .get(self.purge_rssi_index)
            .copied()
            .unwrap_or(RSSI_PRESETS[0])
    }

    /// Selected age purge threshold in seconds.
    pub fn purge_age_min(&self) -> u32 {
        AGE_PRESETS
            .get(self.purge_age_index)
            .copied()
            .unwrap_or(AGE_PRESETS[0])
    }

    /// Number of labels showing synced text.
    pub fn overridden_labels(&self) -> usize {
        Tag::ALL
            .into_iter()
            .filter_map(|tag| self.label(tag))
            .filter(|label| !label.is_default())
            .count()
    }

    /// Put every label back to the placeholder, dropping synced strings.
    pub fn release_labels(&mut self) {
        for tag in Tag::ALL {
            if let Some(label) = self.label_mut(tag) {
                label.reset();
            }
        }
    }
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_replacement() {
        let mut label = Label::default();
        assert!(label.is_default());
        assert_eq!(label.as_str(), "Get");

        label.set("8");
        assert_eq!(label, Label::Overridden("8".to_string()));
        label.set("12");
        assert_eq!(label.as_str(), "12");

        label.reset();
        assert_eq!(label.to_string(), "Get");
    }

    #[test]
    fn test_purge_bits() {
        assert_eq!(PurgeStrategy::from_bits(0), PurgeStrategy::default());
        let all = PurgeStrategy::from_bits(15);
        assert!(all.age && all.rssi && all.unselected && all.unnamed);
        assert_eq!(all.bits(), 15);

        let only_rssi = PurgeStrategy::from_bits(PURGE_RSSI);
        assert_eq!(
            only_rssi,
            PurgeStrategy {
                rssi: true,
                ..PurgeStrategy::default()
            }
        );
        assert_eq!(PurgeStrategy::from_bits(16 | PURGE_UNNAMED).bits(), PURGE_UNNAMED);
    }

    #[test]
    fn test_snap_down() {
        assert_eq!(RSSI_PRESETS[snap_down(&RSSI_PRESETS, -100)], -105);
        assert_eq!(RSSI_PRESETS[snap_down(&RSSI_PRESETS, -105)], -105);
        assert_eq!(RSSI_PRESETS[snap_down(&RSSI_PRESETS, 0)], -15);
        assert_eq!(snap_down(&RSSI_PRESETS, -200), 0);
    }

    #[test]
    fn test_snap_up() {
        assert_eq!(AGE_PRESETS[snap_up(&AGE_PRESETS, 15)], 20);
        assert_eq!(AGE_PRESETS[snap_up(&AGE_PRESETS, 60)], 60);
        assert_eq!(AGE_PRESETS[snap_up(&AGE_PRESETS, 0)], 5);
        assert_eq!(snap_up(&AGE_PRESETS, 7200), 0);
    }

    #[test]
    fn test_presets_ascending() {
        assert!(RSSI_PRESETS.windows(2).all(|w| w[0] < w[1]));
        assert!(AGE_PRESETS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_label_lookup_covers_label_tags() {
        let labelled: Vec<Tag> = Tag::ALL
            .iter()
            .copied()
            .filter(|t| SettingsModel::new().label(*t).is_some())
            .collect();
        assert_eq!(
            labelled,
            vec![
                Tag::SsidLenMin,
                Tag::SsidLenMax,
                Tag::SsidDefaultCount,
                Tag::AttackPackets,
                Tag::AttackMillis,
                Tag::PacketExpiry,
            ]
        );
    }

    #[test]
    fn test_release_labels() {
        let mut model = SettingsModel::new();
        model.ssid_len_min.set("8");
        model.packet_expiry.set("30");
        model.channel = 6;
        assert_eq!(model.overridden_labels(), 2);
        model.release_labels();
        assert_eq!(model.overridden_labels(), 0);
        assert!(model.ssid_len_min.is_default());
        assert!(model.packet_expiry.is_default());
        assert_eq!(model.channel, 6);
    }

    #[test]
    fn test_serialize() {
        let mut model = SettingsModel::new();
        model.mac = MacAddress([0x40, 0x91, 0x51, 0xBB, 0xAC, 0x7D]);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["mac"], "40:91:51:BB:AC:7D");
        assert_eq!(json["ssid_len_min"], "Get");
        assert_eq!(json["hop_mode"], "sequential");
    }
}
