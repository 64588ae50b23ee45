//! # Sell Session
//!
//! One "sell your car" form from mount to submission. The session owns the
//! Year → Make → Model → Version cascade, the free-form detail fields, the
//! selected feature ids, and the wizard step, and mirrors all of it into a
//! draft after every successful change.
//!
//! ## Draft Handling
//!
//! - [`SellSession::open`] reads the draft once. A draft that no longer fits
//!   the form is logged and ignored, and the form starts empty.
//! - Every successful mutation bumps the revision and saves. Rejected
//!   mutations never touch the draft.
//! - [`SellSession::submit`] clears the draft once the listing exists. A
//!   failed submission keeps the form and the draft so the user can retry.
//! - [`SellSession::refresh_from_store`] adopts a draft another tab saved
//!   with a newer revision.
//!
//! Fetching is left to the caller, exactly as with [`CascadeSelector`]:
//! mutating calls return [`FetchTicket`]s, and the async helpers run them
//! against a [`LookupSource`] in one step.

use crate::cascade::{vehicle_tiers, CascadeSelector, FetchOutcome, FetchTicket, TierSpec};
use crate::config::CarlotConfig;
use crate::draft::{Draft, DraftStore, KvBackend};
use crate::error::{CarlotError, FieldError, Result};
use crate::lookup::{FlatLookups, LookupSource};
use crate::model::{Id, LookupKind, LookupOption};
use crate::submission::{submit_listing, ImageUpload, ListingApi, ListingPayload, SubmissionReport};
use crate::wizard::WizardStep;
use std::collections::BTreeMap;

/// Draft group holding the selected feature ids.
const FEATURES_GROUP: &str = "features";

/// What [`SellSession::open`] found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opened {
    pub restored: bool,
    /// Fetches that populate the option lists the form now shows.
    pub tickets: Vec<FetchTicket>,
}

pub struct SellSession<B: KvBackend> {
    cascade: CascadeSelector,
    fields: BTreeMap<String, String>,
    features: Vec<Id>,
    step: WizardStep,
    lookups: FlatLookups,
    drafts: DraftStore<B>,
    draft_key: String,
    revision: u64,
    submitted: Option<Id>,
}

impl<B: KvBackend> SellSession<B> {
    pub fn new(tiers: Vec<TierSpec>, backend: B, draft_key: impl Into<String>) -> Self {
        Self {
            cascade: CascadeSelector::new(tiers),
            fields: BTreeMap::new(),
            features: Vec::new(),
            step: WizardStep::default(),
            lookups: FlatLookups::new(),
            drafts: DraftStore::new(backend),
            draft_key: draft_key.into(),
            revision: 0,
            submitted: None,
        }
    }

    /// The standard vehicle form: years from the config down from `current_year`.
    pub fn from_config(config: &CarlotConfig, current_year: u16, backend: B) -> Self {
        Self::new(
            vehicle_tiers(config.year_options(current_year)),
            backend,
            config.draft_key.clone(),
        )
    }

    pub fn cascade(&self) -> &CascadeSelector {
        &self.cascade
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn features(&self) -> &[Id] {
        &self.features
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn lookups(&self) -> &FlatLookups {
        &self.lookups
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn draft_key(&self) -> &str {
        &self.draft_key
    }

    pub fn drafts(&self) -> &DraftStore<B> {
        &self.drafts
    }

    /// Record id of the submitted listing, once submission succeeded.
    pub fn submitted(&self) -> Option<&Id> {
        self.submitted.as_ref()
    }

    /// Mount the form, restoring the saved draft when there is one.
    pub fn open(&mut self) -> Opened {
        if let Some(draft) = self.drafts.load_draft(&self.draft_key) {
            match self.adopt(draft) {
                Ok(tickets) => {
                    tracing::info!(
                        key = %self.draft_key,
                        revision = self.revision,
                        "restored sell-form draft"
                    );
                    return Opened {
                        restored: true,
                        tickets,
                    };
                }
                Err(err) => {
                    tracing::warn!(key = %self.draft_key, error = %err, "ignoring stale draft");
                }
            }
        }
        Opened {
            restored: false,
            tickets: self.cascade.start().into_iter().collect(),
        }
    }

    /// Adopt a draft saved by another tab if it is newer than ours.
    ///
    /// Returns `None` when there is nothing newer.
    pub fn refresh_from_store(&mut self) -> Result<Option<Vec<FetchTicket>>> {
        match self
            .drafts
            .load_draft_newer_than(&self.draft_key, self.revision)
        {
            Some(draft) => self.adopt(draft).map(Some),
            None => Ok(None),
        }
    }

    pub async fn load_lookups<S: LookupSource + ?Sized>(&mut self, source: &S) -> Vec<CarlotError> {
        self.lookups.load_all(source).await
    }

    pub fn select_tier(&mut self, index: usize, id: impl Into<Id>) -> Result<Option<FetchTicket>> {
        let ticket = self.cascade.select_tier(index, id)?;
        self.autosave();
        Ok(ticket)
    }

    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<LookupOption>>,
    ) -> Result<FetchOutcome> {
        let before = self.cascade.state();
        let outcome = self.cascade.apply(ticket, result)?;
        // A restored selection the backend no longer offers gets cleared.
        if self.cascade.state() != before {
            self.autosave();
        }
        Ok(outcome)
    }

    pub async fn load<S: LookupSource + ?Sized>(
        &mut self,
        ticket: FetchTicket,
        source: &S,
    ) -> Result<FetchOutcome> {
        let result = ticket.run(source).await;
        self.apply(&ticket, result)
    }

    pub async fn select_and_load<S: LookupSource + ?Sized>(
        &mut self,
        index: usize,
        id: impl Into<Id>,
        source: &S,
    ) -> Result<()> {
        if let Some(ticket) = self.select_tier(index, id)? {
            self.load(ticket, source).await?;
        }
        Ok(())
    }

    pub fn retry(&mut self, index: usize) -> Result<Option<FetchTicket>> {
        self.cascade.retry(index)
    }

    /// Set a detail field. A blank value removes it.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.fields.remove(&name);
        } else {
            self.fields.insert(name, value);
        }
        self.autosave();
    }

    /// Flip a feature on or off. Returns whether it is now selected.
    ///
    /// Once the feature list is loaded, only its ids are accepted.
    pub fn toggle_feature(&mut self, id: impl Into<Id>) -> Result<bool> {
        let id = id.into();
        let known = self.lookups.get(LookupKind::Features);
        if !known.is_empty() && !known.iter().any(|opt| opt.id == id) {
            return Err(CarlotError::Validation(vec![FieldError::new(
                FEATURES_GROUP,
                format!("unknown feature {id}"),
            )]));
        }

        let selected = match self.features.iter().position(|f| *f == id) {
            Some(pos) => {
                self.features.remove(pos);
                false
            }
            None => {
                self.features.push(id);
                true
            }
        };
        self.autosave();
        Ok(selected)
    }

    /// Validate the current step and move forward.
    ///
    /// On the last step this only validates.
    pub fn next_step(&mut self) -> Result<WizardStep> {
        self.validate_step(self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
            self.autosave();
        }
        Ok(self.step)
    }

    pub fn back_step(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
            self.autosave();
        }
        self.step
    }

    fn validate_step(&self, step: WizardStep) -> Result<()> {
        match step {
            WizardStep::Vehicle => {
                let missing: Vec<FieldError> = self
                    .cascade
                    .state()
                    .tiers
                    .iter()
                    .filter(|t| !t.is_selected())
                    .map(|t| FieldError::new(t.tier.clone(), "must be selected"))
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(CarlotError::Validation(missing))
                }
            }
            WizardStep::Details => self.payload().map(|_| ()),
            _ => Ok(()),
        }
    }

    /// The create-listing payload for the current form.
    pub fn payload(&self) -> Result<ListingPayload> {
        ListingPayload::from_form(&self.cascade.state(), &self.fields, &self.features)
    }

    /// Validate, create the listing, and upload `images` against it.
    ///
    /// Nothing is sent when validation fails. The draft is cleared only when
    /// the listing was created, even if some images failed.
    pub async fn submit<A: ListingApi + ?Sized>(
        &mut self,
        api: &A,
        images: &[ImageUpload],
    ) -> Result<SubmissionReport> {
        if let Some(record) = &self.submitted {
            return Err(CarlotError::Submission(format!(
                "listing already submitted as {record}"
            )));
        }
        let payload = self.payload()?;
        let report = submit_listing(api, &payload, images).await?;

        self.drafts.clear_draft(&self.draft_key);
        self.submitted = Some(report.record_id.clone());
        tracing::info!(
            record = %report.record_id,
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "listing submitted"
        );
        Ok(report)
    }

    /// Drop the draft and start a blank form.
    pub fn discard(&mut self) -> Option<FetchTicket> {
        self.drafts.clear_draft(&self.draft_key);
        self.fields.clear();
        self.features.clear();
        self.step = WizardStep::default();
        self.revision = 0;
        self.submitted = None;
        self.cascade.reset()
    }

    /// The draft that the next save would write.
    pub fn snapshot(&self) -> Draft {
        let mut draft = Draft::new(self.cascade.state());
        draft.revision = self.revision;
        draft.step = self.step;
        draft.fields = self.fields.clone();
        if !self.features.is_empty() {
            draft
                .selected
                .insert(FEATURES_GROUP.to_string(), self.features.clone());
        }
        draft
    }

    fn adopt(&mut self, mut draft: Draft) -> Result<Vec<FetchTicket>> {
        let tickets = self.cascade.restore(draft.cascade)?;
        self.fields = draft.fields;
        self.features = draft.selected.remove(FEATURES_GROUP).unwrap_or_default();
        self.step = draft.step;
        self.revision = draft.revision;
        Ok(tickets)
    }

    fn autosave(&mut self) {
        if self.submitted.is_some() {
            return;
        }
        self.revision += 1;
        let draft = self.snapshot();
        self.drafts.save_draft(&self.draft_key, &draft);
    }
}
