//! Shared fixtures for unit tests and, behind the `test_utils` feature, for
//! downstream crates.

use crate::lookup::StaticLookups;
use crate::model::{Id, Listing, LookupKind, LookupOption};

/// A listing with plausible defaults for every field the filters ignore.
pub fn listing(id: u64, make: &str, model: &str, city: &str, price: u64) -> Listing {
    Listing {
        id: Id::from(id),
        title: format!("{make} {model}"),
        make: make.into(),
        model: model.into(),
        version: String::new(),
        city: city.into(),
        province: "Punjab".into(),
        price,
        year: 2020,
        mileage: 40_000,
        engine_capacity: 1300,
        transmission: "Manual".into(),
        color: "White".into(),
        engine_type: "Petrol".into(),
        body_type: "Sedan".into(),
        registered_in: "Lahore".into(),
        featured: false,
    }
}

/// Two makes with one model and one version each, plus a feature list.
///
/// ```text
/// Toyota (1) → Corolla (10) → GLi (100)
/// Honda  (2) → Civic   (20) → RS  (200)
/// ```
pub fn vehicle_lookups() -> StaticLookups {
    StaticLookups::new()
        .with(
            LookupKind::Makes,
            vec![LookupOption::new("1", "Toyota"), LookupOption::new("2", "Honda")],
        )
        .with(
            LookupKind::Models,
            vec![
                LookupOption::new("10", "Corolla").with_parent("1"),
                LookupOption::new("20", "Civic").with_parent("2"),
            ],
        )
        .with(
            LookupKind::Versions,
            vec![
                LookupOption::new("100", "GLi").with_parent("10"),
                LookupOption::new("200", "RS").with_parent("20"),
            ],
        )
        .with(
            LookupKind::Features,
            vec![LookupOption::new("7", "Sunroof"), LookupOption::new("9", "ABS")],
        )
}
