use crate::{
    index::StationIndex,
    station::{StationId, StationRecord},
};
use tracing::trace;

/// What a vehicle did at a station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    PlugIn,
    PlugOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StationEvent {
    pub timestamp: i64,
    pub vehicle_id: u32,
    pub station_id: StationId,
    pub action: Action,
}

impl StationEvent {
    pub const fn plug_in(timestamp: i64, vehicle_id: u32, station_id: StationId) -> Self {
        Self {
            timestamp,
            vehicle_id,
            station_id,
            action: Action::PlugIn,
        }
    }

    pub const fn plug_out(timestamp: i64, vehicle_id: u32, station_id: StationId) -> Self {
        Self {
            timestamp,
            vehicle_id,
            station_id,
            action: Action::PlugOut,
        }
    }
}

/// Attributes given to a station the first time an event mentions it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationDefaults {
    pub power_kw: i32,
    pub price_cents: i32,
    pub slots_free: i32,
    pub last_update: i64,
}

impl Default for StationDefaults {
    fn default() -> Self {
        Self {
            power_kw: 50,
            price_cents: 300,
            slots_free: 2,
            last_update: 0,
        }
    }
}

impl From<StationDefaults> for StationRecord {
    fn from(defaults: StationDefaults) -> Self {
        StationRecord::new(
            defaults.power_kw,
            defaults.price_cents,
            defaults.slots_free,
            defaults.last_update,
        )
    }
}

impl StationIndex {
    /// Applies one event and returns the record now stored for its station.
    ///
    /// A plug-in takes a free slot if one is left; a plug-out frees one.
    pub fn apply_event(
        &mut self,
        event: &StationEvent,
        defaults: &StationDefaults,
    ) -> StationRecord {
        let mut record = self
            .find(event.station_id)
            .copied()
            .unwrap_or_else(|| StationRecord::from(*defaults));

        match event.action {
            Action::PlugIn => {
                if record.slots_free > 0 {
                    record.slots_free -= 1;
                }
            }
            Action::PlugOut => record.slots_free = record.slots_free.saturating_add(1),
        }
        record.last_update = event.timestamp;

        trace!(
            station_id = event.station_id,
            vehicle_id = event.vehicle_id,
            action = ?event.action,
            slots_free = record.slots_free,
            "applied event"
        );
        self.insert_or_update(event.station_id, record);
        record
    }

    /// Applies the events in order and returns how many were applied.
    pub fn apply_events<'a, I>(&mut self, events: I, defaults: &StationDefaults) -> usize
    where
        I: IntoIterator<Item = &'a StationEvent>,
    {
        let mut applied = 0;
        for event in events {
            self.apply_event(event, defaults);
            applied += 1;
        }
        applied
    }
}
