//! # Comparison Board
//!
//! The car-comparison page: a few side-by-side slots, each an independent
//! Make → Model → Version cascade.
//!
//! Slots can be removed while their fetches are in flight, which shifts the
//! positions of the slots after them. Tickets are therefore tagged with a
//! stable slot id rather than a position, and a result for a removed slot is
//! reported as stale.

use crate::cascade::{model_tiers, CascadeSelector, FetchOutcome, FetchTicket, TierSpec};
use crate::config::CarlotConfig;
use crate::error::{CarlotError, Result};
use crate::lookup::LookupSource;
use crate::model::{CascadeState, Id, LookupOption};

/// A cascade fetch addressed to one comparison slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTicket {
    pub slot_id: u64,
    pub ticket: FetchTicket,
}

pub struct CompareBoard {
    capacity: usize,
    tiers: Vec<TierSpec>,
    slots: Vec<(u64, CascadeSelector)>,
    next_slot_id: u64,
}

impl CompareBoard {
    pub fn new(capacity: usize) -> Self {
        Self::with_tiers(capacity, model_tiers())
    }

    /// A board holding `max_compare_slots` cars.
    pub fn from_config(config: &CarlotConfig) -> Self {
        Self::new(config.max_compare_slots)
    }

    pub fn with_tiers(capacity: usize, tiers: Vec<TierSpec>) -> Self {
        Self {
            capacity,
            tiers,
            slots: Vec::new(),
            next_slot_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slot(&self, position: usize) -> Option<&CascadeSelector> {
        self.slots.get(position).map(|(_, sel)| sel)
    }

    /// Open a new slot. Returns its position and the initial fetch, if any.
    pub fn add_slot(&mut self) -> Result<(usize, Option<SlotTicket>)> {
        if self.slots.len() >= self.capacity {
            return Err(CarlotError::CompareFull(self.capacity));
        }
        let slot_id = self.next_slot_id;
        self.next_slot_id += 1;

        let mut selector = CascadeSelector::new(self.tiers.clone());
        let ticket = selector
            .start()
            .map(|ticket| SlotTicket { slot_id, ticket });
        self.slots.push((slot_id, selector));
        Ok((self.slots.len() - 1, ticket))
    }

    pub fn remove_slot(&mut self, position: usize) -> Result<()> {
        if position >= self.slots.len() {
            return Err(CarlotError::UnknownSlot(position));
        }
        self.slots.remove(position);
        Ok(())
    }

    pub fn select(
        &mut self,
        position: usize,
        tier: usize,
        id: impl Into<Id>,
    ) -> Result<Option<SlotTicket>> {
        let (slot_id, selector) = self
            .slots
            .get_mut(position)
            .ok_or(CarlotError::UnknownSlot(position))?;
        let slot_id = *slot_id;
        Ok(selector
            .select_tier(tier, id)?
            .map(|ticket| SlotTicket { slot_id, ticket }))
    }

    pub fn apply(
        &mut self,
        ticket: &SlotTicket,
        result: Result<Vec<LookupOption>>,
    ) -> Result<FetchOutcome> {
        match self.slots.iter_mut().find(|(id, _)| *id == ticket.slot_id) {
            Some((_, selector)) => selector.apply(&ticket.ticket, result),
            None => {
                tracing::debug!(slot = ticket.slot_id, "dropping result for removed slot");
                Ok(FetchOutcome::Stale)
            }
        }
    }

    pub async fn load<S: LookupSource + ?Sized>(
        &mut self,
        ticket: SlotTicket,
        source: &S,
    ) -> Result<FetchOutcome> {
        let result = ticket.ticket.run(source).await;
        self.apply(&ticket, result)
    }

    /// At least two slots are fully selected.
    pub fn ready(&self) -> bool {
        self.slots.iter().filter(|(_, s)| s.is_complete()).count() >= 2
    }

    pub fn selections(&self) -> Vec<CascadeState> {
        self.slots.iter().map(|(_, s)| s.state()).collect()
    }
}
