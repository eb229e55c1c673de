use biosignal_core::{ConfidenceLevel, Measurement, RawInput};
use measurement_store::{
    FileKeyValueStore, GeoLocation, KeyValueStore, MeasurementStore, Preferences, SavedMeasurement,
    Setting, StoreConfig,
};
use std::sync::Arc;

fn speech_sample() -> SavedMeasurement {
    let input = RawInput::Speech {
        clarity: 0.9,
        volume: 0.7,
        rhythm: 0.85,
    };
    let m = Measurement::new(input, -32.5, ConfidenceLevel::Medium, 1_740_000_000_000);
    SavedMeasurement::now(
        m,
        GeoLocation {
            latitude: 51.5,
            longitude: -0.12,
        },
    )
}

#[test]
fn measurements_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = StoreConfig {
        data_dir: dir.path().join("nested"),
        ..StoreConfig::default()
    };

    let first = speech_sample();
    {
        let kv = FileKeyValueStore::open(cfg.storage_path()).unwrap();
        let store = MeasurementStore::from_config(kv, &cfg);
        store.append(first.clone()).unwrap();
    }

    let kv = FileKeyValueStore::open(cfg.storage_path()).unwrap();
    let store = MeasurementStore::from_config(kv, &cfg);
    assert_eq!(store.get_all(), vec![first]);

    store.clear().unwrap();
    store.clear().unwrap();
    assert!(store.get_all().is_empty());
}

#[test]
fn preferences_share_the_namespace_file() {
    let dir = tempfile::tempdir().unwrap();
    let kv = Arc::new(FileKeyValueStore::open(dir.path().join("storage.json")).unwrap());
    let store = MeasurementStore::new(Arc::clone(&kv));
    let prefs = Preferences::new(Arc::clone(&kv));

    prefs.set_onboarding_complete().unwrap();
    prefs.set(Setting::Notifications, false).unwrap();
    store.append(speech_sample()).unwrap();

    assert!(prefs.has_completed_onboarding());
    assert!(!prefs.load().notifications);
    assert_eq!(store.get_all().len(), 1);

    let text = std::fs::read_to_string(kv.path()).unwrap();
    let namespace: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(namespace["sound_pollution_onboarding_complete"], "true");
    assert_eq!(namespace["@settings_notifications"], "false");
    assert!(namespace["biosignal_measurements"].is_string());
}

#[test]
fn corrupt_namespace_file_is_rebuilt_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "garbage").unwrap();

    let kv = Arc::new(FileKeyValueStore::open(&path).unwrap());
    assert!(kv.get("anything").is_err());

    let store = MeasurementStore::new(Arc::clone(&kv));
    assert!(store.get_all().is_empty());
    assert!(store.append(speech_sample()).is_err());

    kv.set("@settings_darkMode", "true").unwrap();
    assert_eq!(kv.get("@settings_darkMode").unwrap().as_deref(), Some("true"));
    assert_eq!(store.append(speech_sample()).unwrap().len(), 1);
    assert_eq!(store.get_all().len(), 1);
}
