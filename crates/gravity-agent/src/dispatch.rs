//! Applying a sync response to the settings model.
//!
//! Each `(tag:value)` group is handled on its own. A group that cannot be
//! scanned, carries an unknown tag, or holds a value its handler refuses is
//! counted and skipped; everything else in the response is still applied.

use gravity_metrics::{metric_defs, SessionLabels};
use gravity_protocol::{
    MacAddress, ProtocolError, ProtocolResult, RawValue, Tag, TokenIter, GROUP_OPEN,
};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{SyncError, SyncResult};
use crate::settings::{
    flag_from_wire, snap_down, snap_up, HopMode, HopStatus, PurgeStrategy, SettingsModel,
    SsidSource, AGE_PRESETS, RSSI_PRESETS,
};

/// Counts from dispatching one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    /// Tokens applied to the model.
    pub applied: usize,
    /// Tokens skipped because of an unknown tag.
    pub unknown_tags: usize,
    /// Groups that could not be scanned.
    pub malformed: usize,
    /// Values a handler refused.
    pub rejected: usize,
}

/// Applies completed sync responses to a [`SettingsModel`].
#[derive(Debug, Clone, Default)]
pub struct SyncDispatcher {
    labels: SessionLabels,
}

impl SyncDispatcher {
    /// Create a dispatcher recording metrics under `labels`.
    pub fn new(labels: SessionLabels) -> Self {
        SyncDispatcher { labels }
    }

    /// Apply every group in `buffer` to `model`.
    ///
    /// Returns [`SyncError::EmptyResponse`] without touching the model when the
    /// buffer holds no group at all.
    pub fn process(&self, buffer: &[u8], model: &mut SettingsModel) -> SyncResult<DispatchSummary> {
        if !buffer.contains(&GROUP_OPEN) {
            return Err(SyncError::EmptyResponse);
        }

        let mut summary = DispatchSummary::default();

        for scanned in TokenIter::new(buffer) {
            let token = match scanned {
                Ok(token) => token,
                Err(e) => {
                    debug!("skipping malformed sync group: {}", e);
                    summary.malformed += 1;
                    continue;
                }
            };

            let Some(tag) = token.tag() else {
                trace!("ignoring unknown sync tag {}", token.code());
                summary.unknown_tags += 1;
                continue;
            };

            match apply(tag, token.value(), model) {
                Ok(()) => {
                    trace!("applied {} = {:?}", tag, token.value().as_str());
                    summary.applied += 1;
                }
                Err(e) => {
                    warn!("keeping previous {}: {}", tag, e);
                    summary.rejected += 1;
                }
            }
        }

        self.record(&summary);
        Ok(summary)
    }

    fn record(&self, summary: &DispatchSummary) {
        let labels = &self.labels;
        metric_defs::TOKENS_APPLIED.counter(labels).increment(summary.applied as u64);
        metric_defs::UNKNOWN_TAGS.counter(labels).increment(summary.unknown_tags as u64);
        metric_defs::MALFORMED_TOKENS.counter(labels).increment(summary.malformed as u64);
        metric_defs::REJECTED_VALUES.counter(labels).increment(summary.rejected as u64);
    }
}

/// Apply one value to the field fed by `tag`.
///
/// On error the model is left exactly as it was.
pub fn apply(tag: Tag, value: RawValue<'_>, model: &mut SettingsModel) -> ProtocolResult<()> {
    match tag {
        Tag::HopOnStatus => {
            model.hop_status = decode(value, HopStatus::from_wire)?;
        }
        Tag::SsidLenMin
        | Tag::SsidLenMax
        | Tag::SsidDefaultCount
        | Tag::AttackPackets
        | Tag::AttackMillis
        | Tag::PacketExpiry => {
            let text = value.as_str()?;
            if let Some(label) = model.label_mut(tag) {
                label.set(text);
            }
        }
        Tag::Channel => {
            model.channel = decode(value, |c: u8| (1..=14).contains(&c).then_some(c))?;
        }
        Tag::Mac => {
            model.mac = MacAddress::parse(value.as_str()?)?;
        }
        Tag::MacRandomise => {
            model.mac_randomise = decode(value, flag_from_wire)?;
        }
        Tag::HopMode => {
            model.hop_mode = decode(value, HopMode::from_wire)?;
        }
        Tag::DictionaryDisabled => {
            let disabled = decode(value, flag_from_wire)?;
            model.ssid_source = SsidSource::from_dictionary_disabled(disabled);
        }
        Tag::PurgeStrategy => {
            model.purge = PurgeStrategy::from_bits(value.parse()?);
        }
        Tag::PurgeRssiMax => {
            model.purge_rssi_index = snap_down(&RSSI_PRESETS, value.parse::<i32>()?);
        }
        Tag::PurgeAgeMin => {
            model.purge_age_index = snap_up(&AGE_PRESETS, value.parse::<u32>()?);
        }
    }
    Ok(())
}

/// Parse a number and map it through `convert`, rejecting unmapped values.
fn decode<N, T>(value: RawValue<'_>, convert: impl FnOnce(N) -> Option<T>) -> ProtocolResult<T>
where
    N: std::str::FromStr,
{
    let number = value.parse::<N>()?;
    convert(number).ok_or_else(|| {
        ProtocolError::InvalidNumber(String::from_utf8_lossy(value.as_bytes()).into_owned())
    })
}
