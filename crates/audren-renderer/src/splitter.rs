//! Splitter destinations: per-destination send volumes with a deferred commit of the previous
//! volumes, and the optional per-destination biquad filters.
//!
//! Destinations live in a fixed-capacity [`SplitterDestinationPool`]; the forward list that
//! chains them is a list of pool indices.

use audren_dsp::BiquadCoefficients;

use crate::behavior::BehaviorInfo;
use crate::{MAX_BIQUAD_FILTERS, MAX_MIX_BUFFERS};

/// Destination id of a destination that is not routed anywhere.
pub const UNUSED_MIX_ID: i32 = i32::MAX;

pub const SPLITTER_SEND_DATA_MAGIC: [u8; 4] = *b"SNDD";

/// Magic that update blobs must carry, as the little-endian `u32` the guest writes.
pub const fn splitter_send_data_magic() -> u32 {
    u32::from_le_bytes(SPLITTER_SEND_DATA_MAGIC)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SplitterBiquadFilter {
    pub enabled: bool,
    pub coefficients: BiquadCoefficients,
}

/// Update blob for one destination, as deserialized from the guest's parameter buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitterDestinationInParameter {
    pub magic: u32,
    pub id: i32,
    pub mix_volumes: [f32; MAX_MIX_BUFFERS],
    pub destination_id: i32,
    pub in_use: bool,
    /// Only honoured when the revision supports explicit resets.
    pub reset_prev_volume: bool,
    /// Current filter layout, present from revision 12.
    pub biquad_filters: Option<[SplitterBiquadFilter; MAX_BIQUAD_FILTERS]>,
    /// Older per-voice fixed-point layout, present in revision 12 blobs.
    pub voice_biquad_filters: Option<[SplitterBiquadFilter; MAX_BIQUAD_FILTERS]>,
}

impl SplitterDestinationInParameter {
    /// Blob for `id` routed to `destination_id` with the correct magic and no filters.
    pub fn new(id: i32, destination_id: i32, mix_volumes: [f32; MAX_MIX_BUFFERS], in_use: bool) -> Self {
        Self {
            magic: splitter_send_data_magic(),
            id,
            mix_volumes,
            destination_id,
            in_use,
            reset_prev_volume: false,
            biquad_filters: None,
            voice_biquad_filters: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SplitterDestinationData {
    id: i32,
    destination_id: i32,
    mix_volumes: [f32; MAX_MIX_BUFFERS],
    prev_mix_volumes: [f32; MAX_MIX_BUFFERS],
    in_use: bool,
    need_update: bool,
    biquad_filters: [SplitterBiquadFilter; MAX_BIQUAD_FILTERS],
    voice_biquad_filters: [SplitterBiquadFilter; MAX_BIQUAD_FILTERS],
    next: Option<usize>,
}

impl SplitterDestinationData {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            destination_id: UNUSED_MIX_ID,
            mix_volumes: [0.0; MAX_MIX_BUFFERS],
            prev_mix_volumes: [0.0; MAX_MIX_BUFFERS],
            in_use: false,
            need_update: false,
            biquad_filters: [SplitterBiquadFilter::default(); MAX_BIQUAD_FILTERS],
            voice_biquad_filters: [SplitterBiquadFilter::default(); MAX_BIQUAD_FILTERS],
            next: None,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn destination_id(&self) -> i32 {
        self.destination_id
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub fn need_update(&self) -> bool {
        self.need_update
    }

    pub fn is_configured(&self) -> bool {
        self.in_use && self.destination_id != UNUSED_MIX_ID
    }

    /// Apply an update blob addressed to this destination.
    ///
    /// Blobs with another id or a bad magic are dropped. Without explicit reset support the
    /// previous volumes are reset when the destination goes from unused to used.
    pub fn update(&mut self, params: &SplitterDestinationInParameter, is_prev_volume_reset_supported: bool) {
        if params.id != self.id || params.magic != splitter_send_data_magic() {
            return;
        }

        self.destination_id = params.destination_id;
        self.mix_volumes = params.mix_volumes;
        if let Some(filters) = params.biquad_filters {
            self.biquad_filters = filters;
        }
        if let Some(filters) = params.voice_biquad_filters {
            self.voice_biquad_filters = filters;
        }

        let reset_prev_volume = if is_prev_volume_reset_supported {
            params.reset_prev_volume
        } else {
            !self.in_use && params.in_use
        };
        if reset_prev_volume {
            self.prev_mix_volumes = self.mix_volumes;
            self.need_update = false;
        }

        self.in_use = params.in_use;
    }

    pub fn mark_as_need_to_update_internal_state(&mut self) {
        self.need_update = true;
    }

    /// Commit this frame's volumes as the previous volumes of the next frame.
    pub fn update_internal_state(&mut self) {
        if self.in_use && self.need_update {
            self.prev_mix_volumes = self.mix_volumes;
        }
        self.need_update = false;
    }

    pub fn mix_volume(&self, index: usize) -> f32 {
        match self.mix_volumes.get(index) {
            Some(&volume) => volume,
            None => {
                tracing::warn!(id = self.id, index, "splitter mix volume index out of range");
                0.0
            }
        }
    }

    pub fn mix_volume_prev(&self, index: usize) -> f32 {
        match self.prev_mix_volumes.get(index) {
            Some(&volume) => volume,
            None => {
                tracing::warn!(id = self.id, index, "splitter previous mix volume index out of range");
                0.0
            }
        }
    }

    pub fn mix_volumes(&self) -> &[f32; MAX_MIX_BUFFERS] {
        &self.mix_volumes
    }

    pub fn mix_volumes_prev(&self) -> &[f32; MAX_MIX_BUFFERS] {
        &self.prev_mix_volumes
    }

    pub fn set_mix_volume(&mut self, index: usize, volume: f32) {
        match self.mix_volumes.get_mut(index) {
            Some(slot) => *slot = volume,
            None => tracing::warn!(id = self.id, index, "splitter mix volume index out of range"),
        }
    }

    pub fn clear_mix_volume(&mut self) {
        self.mix_volumes = [0.0; MAX_MIX_BUFFERS];
    }

    pub fn biquad_filters(&self) -> &[SplitterBiquadFilter; MAX_BIQUAD_FILTERS] {
        &self.biquad_filters
    }

    pub fn voice_biquad_filters(&self) -> &[SplitterBiquadFilter; MAX_BIQUAD_FILTERS] {
        &self.voice_biquad_filters
    }

    /// Enabled filter for `tap`, preferring the current layout over the per-voice one.
    pub fn active_biquad_filter(&self, tap: usize) -> Option<&SplitterBiquadFilter> {
        [self.biquad_filters.get(tap), self.voice_biquad_filters.get(tap)]
            .into_iter()
            .flatten()
            .find(|filter| filter.enabled)
    }

    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub fn set_next(&mut self, next: Option<usize>) {
        self.next = next;
    }
}

/// Fixed-capacity storage for splitter destinations; destination `i` has id `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitterDestinationPool {
    destinations: Vec<SplitterDestinationData>,
}

impl SplitterDestinationPool {
    pub fn new(count: usize) -> Self {
        let destinations = (0..count)
            .map(|i| SplitterDestinationData::new(i as i32))
            .collect();
        Self { destinations }
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SplitterDestinationData> {
        self.destinations.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SplitterDestinationData> {
        self.destinations.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SplitterDestinationData> {
        self.destinations.iter()
    }

    /// Point `from`'s forward link at `to` (or terminate the chain). Returns `false` if either
    /// index is outside the pool.
    pub fn link(&mut self, from: usize, to: Option<usize>) -> bool {
        if to.is_some_and(|to| to >= self.destinations.len()) {
            return false;
        }
        match self.destinations.get_mut(from) {
            Some(destination) => {
                destination.set_next(to);
                true
            }
            None => false,
        }
    }

    /// Walk the forward list from `start`. Stops after `len()` steps so a cyclic chain still
    /// terminates.
    pub fn chain(&self, start: usize) -> impl Iterator<Item = &SplitterDestinationData> + '_ {
        let mut cursor = Some(start);
        std::iter::from_fn(move || {
            let destination = self.destinations.get(cursor?)?;
            cursor = destination.next();
            Some(destination)
        })
        .take(self.destinations.len())
    }

    /// Route an update blob to the destination it names. Unknown ids are dropped.
    ///
    /// Filter sets are ignored when the guest's revision predates splitter biquad filters, and
    /// native-float coefficients are disabled when it predates float coefficient support.
    pub fn update(&mut self, params: &SplitterDestinationInParameter, behavior: &BehaviorInfo) {
        let Some(destination) = usize::try_from(params.id)
            .ok()
            .and_then(|index| self.destinations.get_mut(index))
        else {
            tracing::trace!(id = params.id, "splitter update for unknown destination dropped");
            return;
        };

        let reset_supported = behavior.is_splitter_prev_volume_reset_supported();
        if !behavior.is_splitter_biquad_filter_supported() {
            let params = SplitterDestinationInParameter {
                biquad_filters: None,
                voice_biquad_filters: None,
                ..params.clone()
            };
            destination.update(&params, reset_supported);
        } else if !behavior.is_biquad_filter_float_coefficient_supported() {
            let params = SplitterDestinationInParameter {
                biquad_filters: params.biquad_filters.map(disable_float_filters),
                voice_biquad_filters: params.voice_biquad_filters.map(disable_float_filters),
                ..params.clone()
            };
            destination.update(&params, reset_supported);
        } else {
            destination.update(params, reset_supported);
        }
    }

    pub fn mark_all_as_need_to_update_internal_state(&mut self) {
        for destination in &mut self.destinations {
            destination.mark_as_need_to_update_internal_state();
        }
    }

    /// Per-frame commit of every destination.
    pub fn update_internal_states(&mut self) {
        for destination in &mut self.destinations {
            destination.update_internal_state();
        }
    }
}

fn disable_float_filters(
    filters: [SplitterBiquadFilter; MAX_BIQUAD_FILTERS],
) -> [SplitterBiquadFilter; MAX_BIQUAD_FILTERS] {
    filters.map(|filter| {
        if filter.coefficients.is_float() {
            tracing::debug!("float biquad coefficients unsupported at this revision, filter disabled");
            SplitterBiquadFilter::default()
        } else {
            filter
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_reads_sndd_little_endian() {
        assert_eq!(splitter_send_data_magic().to_le_bytes(), *b"SNDD");
    }

    #[test]
    fn chain_follows_links_and_stops_on_cycles() {
        let mut pool = SplitterDestinationPool::new(4);
        assert!(pool.link(0, Some(2)));
        assert!(pool.link(2, Some(3)));
        assert!(!pool.link(3, Some(4)));
        assert!(!pool.link(9, None));

        let ids: Vec<i32> = pool.chain(0).map(|d| d.id()).collect();
        assert_eq!(ids, vec![0, 2, 3]);

        assert!(pool.link(3, Some(0)));
        assert_eq!(pool.chain(0).count(), 4);
        assert_eq!(pool.chain(7).count(), 0);
    }

    #[test]
    fn out_of_range_volume_reads_return_zero() {
        let mut destination = SplitterDestinationData::new(0);
        destination.set_mix_volume(1, 0.5);
        destination.set_mix_volume(MAX_MIX_BUFFERS, 0.5);
        assert_eq!(destination.mix_volume(1), 0.5);
        assert_eq!(destination.mix_volume(MAX_MIX_BUFFERS), 0.0);
        assert_eq!(destination.mix_volume_prev(MAX_MIX_BUFFERS + 3), 0.0);

        destination.clear_mix_volume();
        assert_eq!(destination.mix_volume(1), 0.0);
    }
}
