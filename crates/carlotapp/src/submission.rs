//! # Listing Submission
//!
//! Turns a finished sell form into a listing on the backend.
//!
//! ## Pipeline
//!
//! 1. **Validate** the form locally ([`ListingPayload::from_form`]). Nothing
//!    touches the network until every required field is present and well
//!    formed; all problems are reported together.
//! 2. **Create** the listing ([`ListingApi::create_listing`]). A failure here
//!    aborts with [`CarlotError::Submission`] and the caller keeps the form.
//! 3. **Upload** each image against the new record id. Upload failures are
//!    collected per file and never roll back the listing.

use crate::error::{CarlotError, FieldError, Result};
use crate::model::{CascadeState, Id};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub const REQUIRED_FIELDS: [&str; 5] = ["price", "mileage", "city", "registered_in", "color"];

/// The backend's listing endpoints.
#[async_trait(?Send)]
pub trait ListingApi {
    /// Create the listing and return its record id.
    async fn create_listing(&self, payload: &ListingPayload) -> Result<Id>;

    async fn upload_image(&self, record: &Id, image: &ImageUpload) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Validated body of a create-listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPayload {
    /// Selected id per cascade tier, e.g. `year`, `make`, `model`, `version`.
    pub vehicle: BTreeMap<String, Id>,
    pub price: u64,
    pub mileage: u32,
    pub city: String,
    pub registered_in: String,
    pub color: String,
    /// Every other non-empty form field, passed through untouched.
    pub extra: BTreeMap<String, String>,
    pub features: Vec<Id>,
}

impl ListingPayload {
    /// Validate the form and assemble the payload.
    pub fn from_form(
        cascade: &CascadeState,
        fields: &BTreeMap<String, String>,
        features: &[Id],
    ) -> Result<Self> {
        let mut errors = Vec::new();

        for tier in cascade.tiers.iter().filter(|t| !t.is_selected()) {
            errors.push(FieldError::new(tier.tier.clone(), "must be selected"));
        }
        if cascade.tiers.is_empty() {
            errors.push(FieldError::new("vehicle", "must be selected"));
        }

        let text = |name: &str| -> Option<String> {
            fields
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let mut required = |name: &str| -> Option<String> {
            let value = text(name);
            if value.is_none() {
                errors.push(FieldError::new(name, "is required"));
            }
            value
        };
        let price = required("price");
        let mileage = required("mileage");
        let city = required("city");
        let registered_in = required("registered_in");
        let color = required("color");

        let price = price.and_then(|raw| match parse_whole(&raw) {
            Some(p) if p > 0 => Some(p),
            _ => {
                errors.push(FieldError::new("price", "must be a positive whole number"));
                None
            }
        });
        let mileage = mileage.and_then(|raw| {
            match parse_whole(&raw).and_then(|m| u32::try_from(m).ok()) {
                Some(m) => Some(m),
                None => {
                    errors.push(FieldError::new("mileage", "must be a whole number"));
                    None
                }
            }
        });

        match (price, mileage, city, registered_in, color) {
            (Some(price), Some(mileage), Some(city), Some(registered_in), Some(color))
                if errors.is_empty() =>
            {
                let vehicle = cascade
                    .tiers
                    .iter()
                    .filter_map(|t| t.selected_id.clone().map(|id| (t.tier.clone(), id)))
                    .collect();
                let extra = fields
                    .iter()
                    .filter(|(k, v)| !REQUIRED_FIELDS.contains(&k.as_str()) && !v.trim().is_empty())
                    .map(|(k, v)| (k.clone(), v.trim().to_string()))
                    .collect();

                Ok(Self {
                    vehicle,
                    price,
                    mileage,
                    city,
                    registered_in,
                    color,
                    extra,
                    features: features.to_vec(),
                })
            }
            _ => Err(CarlotError::Validation(errors)),
        }
    }
}

fn parse_whole(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| *c != ',' && *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub file_name: String,
    pub reason: String,
}

/// Outcome of a submission whose listing was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub record_id: Id,
    pub uploaded: Vec<String>,
    pub failed: Vec<UploadFailure>,
}

impl SubmissionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create the listing, then upload `images` against it.
pub async fn submit_listing<A: ListingApi + ?Sized>(
    api: &A,
    payload: &ListingPayload,
    images: &[ImageUpload],
) -> Result<SubmissionReport> {
    let record_id = api
        .create_listing(payload)
        .await
        .map_err(|err| match err {
            CarlotError::Submission(message) => CarlotError::Submission(message),
            other => CarlotError::Submission(other.to_string()),
        })?;
    tracing::debug!(record = %record_id, images = images.len(), "listing created");

    let mut report = SubmissionReport {
        record_id,
        uploaded: Vec::new(),
        failed: Vec::new(),
    };
    for image in images {
        match api.upload_image(&report.record_id, image).await {
            Ok(()) => report.uploaded.push(image.file_name.clone()),
            Err(err) => {
                tracing::warn!(
                    record = %report.record_id,
                    file = %image.file_name,
                    error = %err,
                    "image upload failed"
                );
                report.failed.push(UploadFailure {
                    file_name: image.file_name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// In-memory [`ListingApi`] for tests and demos.
///
/// Hands out sequential record ids starting at `first_id`; uploads of file
/// names registered with [`MemListingApi::fail_upload`] fail.
#[derive(Default)]
pub struct MemListingApi {
    next_id: Cell<u64>,
    reject_create: Cell<bool>,
    failing_uploads: RefCell<Vec<String>>,
    created: RefCell<Vec<(Id, ListingPayload)>>,
    images: RefCell<Vec<(Id, String)>>,
}

impl MemListingApi {
    pub fn new(first_id: u64) -> Self {
        let api = Self::default();
        api.next_id.set(first_id);
        api
    }

    pub fn reject_create(&self, reject: bool) {
        self.reject_create.set(reject);
    }

    pub fn fail_upload(&self, file_name: &str) {
        self.failing_uploads.borrow_mut().push(file_name.to_string());
    }

    pub fn created(&self) -> Vec<(Id, ListingPayload)> {
        self.created.borrow().clone()
    }

    pub fn images_for(&self, record: &Id) -> Vec<String> {
        self.images
            .borrow()
            .iter()
            .filter(|(id, _)| id == record)
            .map(|(_, name)| name.clone())
            .collect()
    }
}

#[async_trait(?Send)]
impl ListingApi for MemListingApi {
    async fn create_listing(&self, payload: &ListingPayload) -> Result<Id> {
        if self.reject_create.get() {
            return Err(CarlotError::Submission("backend rejected listing".to_string()));
        }
        let id = Id::from(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.created.borrow_mut().push((id.clone(), payload.clone()));
        Ok(id)
    }

    async fn upload_image(&self, record: &Id, image: &ImageUpload) -> Result<()> {
        if self.failing_uploads.borrow().contains(&image.file_name) {
            return Err(CarlotError::Store(format!(
                "upload of {} timed out",
                image.file_name
            )));
        }
        self.images
            .borrow_mut()
            .push((record.clone(), image.file_name.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TierSelection;

    fn complete_cascade() -> CascadeState {
        CascadeState {
            tiers: ["year", "make", "model", "version"]
                .iter()
                .enumerate()
                .map(|(i, name)| TierSelection {
                    tier: name.to_string(),
                    selected_id: Some(Id::from(i as u64 + 1)),
                    selected_label: name.to_uppercase(),
                })
                .collect(),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_fields() -> BTreeMap<String, String> {
        fields(&[
            ("price", "2,500,000"),
            ("mileage", "45000"),
            ("city", "Lahore"),
            ("registered_in", "Punjab"),
            ("color", "White"),
            ("description", "  One owner  "),
            ("phone", ""),
        ])
    }

    #[test]
    fn builds_payload_from_valid_form() {
        let payload =
            ListingPayload::from_form(&complete_cascade(), &valid_fields(), &[Id::from("7")])
                .unwrap();
        assert_eq!(payload.price, 2_500_000);
        assert_eq!(payload.mileage, 45_000);
        assert_eq!(payload.vehicle.get("make"), Some(&Id::from("2")));
        assert_eq!(payload.extra.get("description").map(String::as_str), Some("One owner"));
        assert!(!payload.extra.contains_key("phone"));
        assert_eq!(payload.features, vec![Id::from("7")]);
    }

    #[test]
    fn reports_every_problem_at_once() {
        let mut cascade = complete_cascade();
        cascade.tiers[3].selected_id = None;
        let form = fields(&[("price", "0"), ("mileage", "lots"), ("city", " ")]);

        let Err(CarlotError::Validation(errors)) =
            ListingPayload::from_form(&cascade, &form, &[])
        else {
            panic!("expected validation failure");
        };
        let names: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            names,
            vec!["version", "city", "registered_in", "color", "price", "mileage"]
        );
    }

    #[tokio::test]
    async fn partial_upload_keeps_the_listing() {
        let api = MemListingApi::new(42);
        api.fail_upload("rear.jpg");
        let payload =
            ListingPayload::from_form(&complete_cascade(), &valid_fields(), &[]).unwrap();
        let images = vec![
            ImageUpload::new("front.jpg", vec![1]),
            ImageUpload::new("rear.jpg", vec![2]),
            ImageUpload::new("interior.jpg", vec![3]),
        ];

        let report = submit_listing(&api, &payload, &images).await.unwrap();

        assert_eq!(report.record_id, Id::from("42"));
        assert_eq!(report.uploaded, vec!["front.jpg", "interior.jpg"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file_name, "rear.jpg");
        assert!(!report.is_complete());
        assert_eq!(api.created().len(), 1);
        assert_eq!(api.images_for(&Id::from("42")).len(), 2);
    }

    #[tokio::test]
    async fn create_failure_is_a_submission_error() {
        let api = MemListingApi::new(1);
        api.reject_create(true);
        let payload =
            ListingPayload::from_form(&complete_cascade(), &valid_fields(), &[]).unwrap();

        let err = submit_listing(&api, &payload, &[ImageUpload::new("a.jpg", vec![])])
            .await
            .unwrap_err();
        assert!(matches!(err, CarlotError::Submission(_)));
        assert!(api.images_for(&Id::from("1")).is_empty());
    }
}
