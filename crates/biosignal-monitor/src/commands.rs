use crate::config::MonitorConfig;
use anyhow::{anyhow, Context};
use biosignal_core::{Measurement, MonitoringDomain};
use chrono::{DateTime, Utc};
use clap::ArgMatches;
use measurement_store::{
    filter_by_date_range, filter_by_min_threshold, group_by_category, highest, summarize,
    FileKeyValueStore, GeoLocation, MeasurementStore, Preferences, SavedMeasurement, Setting,
};
use monitor_session::SessionManager;
use prometheus::Registry;
use prometheus_bridge::{exposure_crossed, MonitorMetrics};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

type SharedKv = Arc<FileKeyValueStore>;

/// The persisted namespace: measurements and preferences share one file.
pub struct Storage {
    pub store: MeasurementStore<SharedKv>,
    pub prefs: Preferences<SharedKv>,
}

impl Storage {
    pub fn open(cfg: &MonitorConfig) -> anyhow::Result<Self> {
        let path = cfg.store.storage_path();
        let kv = Arc::new(
            FileKeyValueStore::open(&path)
                .with_context(|| format!("opening storage at {}", path.display()))?,
        );
        Ok(Self {
            store: MeasurementStore::from_config(Arc::clone(&kv), &cfg.store),
            prefs: Preferences::new(kv),
        })
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs a simulated session for `samples` measurements, handing each to
/// `on_measurement`. Returns the last one.
async fn run_session(
    cfg: &MonitorConfig,
    domain: MonitoringDomain,
    samples: u64,
    seed: Option<u64>,
    mut on_measurement: impl FnMut(&Measurement) -> anyhow::Result<()>,
) -> anyhow::Result<Option<Measurement>> {
    let mut manager = SessionManager::simulated(seed.or(cfg.seed));
    let mut session_cfg = cfg.session(domain);
    session_cfg.max_samples = Some(samples);

    let mut session = manager
        .start(domain, &session_cfg)
        .await
        .with_context(|| format!("starting {domain} session"))?;

    let mut last = None;
    while let Some(m) = session.next().await {
        on_measurement(&m)?;
        last = Some(m);
    }
    manager.stop_all().await;
    Ok(last)
}

pub async fn monitor(cfg: &MonitorConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let domain = *args
        .get_one::<MonitoringDomain>("domain")
        .ok_or_else(|| anyhow!("--domain is required"))?;
    let samples = args.get_one::<u64>("samples").copied().unwrap_or(10);
    let seed = args.get_one::<u64>("seed").copied();

    let last = run_session(cfg, domain, samples, seed, |m| {
        println!("{}", serde_json::to_string(m)?);
        Ok(())
    })
    .await?;

    if !args.get_flag("save") {
        return Ok(());
    }
    let measurement = last.context("session ended before producing a measurement")?;
    let location = match (args.get_one::<f64>("lat"), args.get_one::<f64>("lon")) {
        (Some(&latitude), Some(&longitude)) => GeoLocation {
            latitude,
            longitude,
        },
        _ => cfg
            .location
            .context("--save needs --lat/--lon or a location in the config")?,
    };

    let storage = Storage::open(cfg)?;
    let before = storage.store.get_all();
    let after = storage
        .store
        .append(SavedMeasurement::now(measurement, location))
        .context("saving measurement")?;
    info!(%domain, count = after.len(), "measurement saved");

    let metrics = MonitorMetrics::new(&Registry::new())?;
    if exposure_crossed(&metrics, &before, &after) && storage.prefs.get(Setting::Notifications) {
        warn!("saved sound level is above the safe exposure range");
    }
    Ok(())
}

pub fn list(cfg: &MonitorConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let storage = Storage::open(cfg)?;
    let mut list = storage.store.get_all();

    let domain = args.get_one::<MonitoringDomain>("domain").copied();
    if let Some(&min) = args.get_one::<f64>("min") {
        list = filter_by_min_threshold(&list, domain.unwrap_or(MonitoringDomain::Sound), min);
    } else if let Some(domain) = domain {
        list.retain(|m| m.kind() == domain);
    }
    if let (Some(&from), Some(&to)) = (
        args.get_one::<DateTime<Utc>>("from"),
        args.get_one::<DateTime<Utc>>("to"),
    ) {
        list = filter_by_date_range(&list, from, to);
    }
    print_json(&list)
}

pub fn summary(cfg: &MonitorConfig) -> anyhow::Result<()> {
    let storage = Storage::open(cfg)?;
    let list = storage.store.get_all();
    let groups: BTreeMap<String, usize> = group_by_category(&list)
        .into_iter()
        .map(|(name, records)| (name, records.len()))
        .collect();
    print_json(&json!({
        "summary": summarize(&list),
        "highest": highest(&list),
        "groups": groups,
    }))
}

pub fn clear(cfg: &MonitorConfig) -> anyhow::Result<()> {
    Storage::open(cfg)?
        .store
        .clear()
        .context("clearing measurements")
}

pub fn onboarding(cfg: &MonitorConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let prefs = Storage::open(cfg)?.prefs;
    if args.get_flag("complete") {
        prefs.set_onboarding_complete().context("marking onboarding complete")?;
    } else if args.get_flag("reset") {
        prefs.reset_onboarding().context("resetting onboarding")?;
    }
    print_json(&json!({ "onboardingComplete": prefs.has_completed_onboarding() }))
}

pub fn settings(cfg: &MonitorConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let prefs = Storage::open(cfg)?.prefs;
    if let Some(&setting) = args.get_one::<Setting>("toggle") {
        let value = prefs
            .toggle(setting)
            .with_context(|| format!("toggling {setting}"))?;
        info!(%setting, value, "setting changed");
    }
    print_json(&prefs.load())
}

pub async fn metrics(cfg: &MonitorConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let domain = *args
        .get_one::<MonitoringDomain>("domain")
        .ok_or_else(|| anyhow!("--domain is required"))?;
    let samples = args.get_one::<u64>("samples").copied().unwrap_or(10);
    let seed = args.get_one::<u64>("seed").copied();

    let metrics = MonitorMetrics::new(&Registry::new())?;
    run_session(cfg, domain, samples, seed, |m| {
        metrics.observe(m);
        Ok(())
    })
    .await?;
    metrics.observe_store(&Storage::open(cfg)?.store.get_all());
    print!("{}", metrics.render()?);
    Ok(())
}
