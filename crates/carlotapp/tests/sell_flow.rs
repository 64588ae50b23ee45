//! End-to-end runs of the sell form over an on-disk draft store.

use carlotapp::cascade::{vehicle_tiers, FetchOutcome};
use carlotapp::config::CarlotConfig;
use carlotapp::draft::fs_backend::FsBackend;
use carlotapp::lookup::StaticLookups;
use carlotapp::model::{Id, LookupKind, LookupOption};
use carlotapp::session::SellSession;
use carlotapp::submission::{ImageUpload, MemListingApi};
use carlotapp::wizard::WizardStep;
use tempfile::TempDir;

fn lookups() -> StaticLookups {
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

fn config(dir: &TempDir) -> CarlotConfig {
    CarlotConfig {
        first_year: 2020,
        data_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    }
}

fn open_session(config: &CarlotConfig) -> SellSession<FsBackend> {
    let backend = FsBackend::new(config.data_dir.clone().unwrap());
    SellSession::from_config(config, 2024, backend)
}

#[tokio::test]
async fn test_reload_mid_form_then_submit() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let src = lookups();

    // First visit: pick the car, fill details, leave on the features step.
    {
        let mut session = open_session(&config);
        assert!(!session.open().restored);
        assert_eq!(session.cascade().options(0).len(), 5);

        for (tier, id) in ["2022", "2", "20", "200"].into_iter().enumerate() {
            session.select_and_load(tier, id, &src).await.unwrap();
        }
        session.next_step().unwrap();
        for (name, value) in [
            ("price", "3,150,000"),
            ("mileage", "12000"),
            ("city", "Lahore"),
            ("registered_in", "Islamabad"),
            ("color", "Grey"),
        ] {
            session.set_field(name, value);
        }
        assert_eq!(session.next_step().unwrap(), WizardStep::Features);
        assert!(session.load_lookups(&src).await.is_empty());
        session.toggle_feature("9").unwrap();
    }

    // Second visit: everything comes back from disk.
    let mut session = open_session(&config);
    let opened = session.open();
    assert!(opened.restored);
    for ticket in opened.tickets {
        assert_eq!(
            session.load(ticket, &src).await.unwrap(),
            FetchOutcome::Applied
        );
    }
    assert_eq!(session.step(), WizardStep::Features);
    assert_eq!(session.cascade().state().label("version"), Some("RS"));
    assert_eq!(session.cascade().options(3).len(), 1);
    assert_eq!(session.features(), &[Id::from("9")]);

    // Submit with one image timing out.
    let api = MemListingApi::new(42);
    api.fail_upload("rear.jpg");
    let images = [
        ImageUpload::new("front.jpg", vec![0xff, 0xd8]),
        ImageUpload::new("rear.jpg", vec![0xff, 0xd8]),
    ];
    let report = session.submit(&api, &images).await.unwrap();

    assert_eq!(report.record_id, Id::from("42"));
    assert_eq!(report.uploaded, vec!["front.jpg"]);
    assert_eq!(report.failed[0].file_name, "rear.jpg");

    let created = api.created();
    let (_, payload) = &created[0];
    assert_eq!(payload.price, 3_150_000);
    assert_eq!(payload.vehicle.get("year"), Some(&Id::from("2022")));
    assert_eq!(payload.features, vec![Id::from("9")]);

    // The draft is gone: a third visit starts blank.
    assert!(!dir.path().join("sell-car-draft.json").exists());
    let mut fresh = open_session(&config);
    assert!(!fresh.open().restored);
}

#[tokio::test]
async fn test_catalogue_change_drops_restored_selection() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let src = lookups();

    {
        let mut session = open_session(&config);
        session.open();
        for (tier, id) in ["2021", "1", "10", "100"].into_iter().enumerate() {
            session.select_and_load(tier, id, &src).await.unwrap();
        }
    }

    // The GLi version was withdrawn between visits.
    let changed = StaticLookups::new()
        .with(LookupKind::Makes, vec![LookupOption::new("1", "Toyota")])
        .with(
            LookupKind::Models,
            vec![LookupOption::new("10", "Corolla").with_parent("1")],
        )
        .with(
            LookupKind::Versions,
            vec![LookupOption::new("101", "Altis").with_parent("10")],
        );

    let mut session = open_session(&config);
    let opened = session.open();
    for ticket in opened.tickets {
        session.load(ticket, &changed).await.unwrap();
    }
    let state = session.cascade().state();
    assert_eq!(state.selected("model"), Some(&Id::from("10")));
    assert_eq!(state.selected("version"), None);
    assert!(session.next_step().is_err());
}

#[tokio::test]
async fn test_failed_lookup_can_be_retried() {
    let dir = TempDir::new().unwrap();
    let src = lookups();
    let tiers = vehicle_tiers(vec![LookupOption::new("2024", "2024")]);
    let mut session = SellSession::new(tiers, FsBackend::new(dir.path()), "retry-draft");
    session.open();

    src.fail(LookupKind::Makes);
    assert!(session.select_and_load(0, "2024", &src).await.is_err());
    assert!(session.cascade().options(1).is_empty());

    src.recover(LookupKind::Makes);
    let ticket = session.retry(1).unwrap().unwrap();
    session.load(ticket, &src).await.unwrap();
    assert_eq!(session.cascade().options(1).len(), 2);
}
