use crate::{
    AlwaysGrant, DenyAll, RawSample, Sample, SampleSource, SessionConfig, SessionError,
    SessionManager, SensorResource, SourceProvider,
};
use crate::simulated::{
    gait_stability, mean_abs_deviation, round_tenth, speech_volume, variance, GaitSource,
    RespiratorySource, SpeechSource, StepDetector, TremorSource,
};
use biosignal_core::{ConfidenceLevel, MonitoringDomain, RawInput};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Plays back a fixed list of samples, then keeps warming with zeros.
struct ScriptedSource {
    domain: MonitoringDomain,
    script: VecDeque<Sample>,
    closed: Arc<Mutex<Vec<MonitoringDomain>>>,
}

impl SampleSource for ScriptedSource {
    fn domain(&self) -> MonitoringDomain {
        self.domain
    }

    fn next_sample(&mut self, _now_ms: i64) -> Sample {
        self.script.pop_front().unwrap_or(Sample::Warming(0.0))
    }

    fn close(&mut self) {
        self.closed.lock().unwrap().push(self.domain);
    }
}

#[derive(Default)]
struct ScriptedSources {
    scripts: Mutex<HashMap<MonitoringDomain, Vec<Sample>>>,
    closed: Arc<Mutex<Vec<MonitoringDomain>>>,
    lie_about_domain: bool,
}

impl ScriptedSources {
    fn with(mut self, domain: MonitoringDomain, script: Vec<Sample>) -> Self {
        self.scripts.get_mut().unwrap().insert(domain, script);
        self
    }

    fn closed(&self) -> Vec<MonitoringDomain> {
        self.closed.lock().unwrap().clone()
    }
}

impl SourceProvider for ScriptedSources {
    fn open(&self, domain: MonitoringDomain) -> Result<Box<dyn SampleSource>, SessionError> {
        let script = self.scripts.lock().unwrap().remove(&domain).unwrap_or_default();
        let domain = if self.lie_about_domain {
            MonitoringDomain::Gait
        } else {
            domain
        };
        Ok(Box::new(ScriptedSource {
            domain,
            script: script.into(),
            closed: Arc::clone(&self.closed),
        }))
    }
}

fn sound(db: f64) -> Sample {
    Sample::Ready(RawSample {
        input: RawInput::Sound { db },
        raw_value: db,
    })
}

fn cardiac(heart_rate: i32) -> Sample {
    Sample::Ready(RawSample {
        input: RawInput::Cardiac { heart_rate },
        raw_value: f64::from(heart_rate),
    })
}

fn scripted(sources: ScriptedSources) -> (SessionManager, Arc<ScriptedSources>) {
    let sources = Arc::new(sources);
    let manager = SessionManager::new(Arc::new(AlwaysGrant), sources.clone());
    (manager, sources)
}

#[tokio::test(start_paused = true)]
async fn measurements_arrive_in_order_with_confidence() {
    let (mut manager, _) = scripted(ScriptedSources::default().with(
        MonitoringDomain::Sound,
        vec![sound(70.0), sound(70.0), sound(70.0), sound(95.0)],
    ));
    let mut session = manager
        .start(MonitoringDomain::Sound, &SessionConfig::default())
        .await
        .unwrap();

    let mut got = Vec::new();
    for _ in 0..4 {
        got.push(session.next().await.unwrap());
    }

    assert_eq!(
        got.iter().map(|m| m.raw_value).collect::<Vec<_>>(),
        vec![70.0, 70.0, 70.0, 95.0]
    );
    assert!(got.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(got[0].confidence_level, ConfidenceLevel::Low);
    assert_eq!(got[1].confidence_level, ConfidenceLevel::Low);
    assert_eq!(got[2].confidence_level, ConfidenceLevel::High);
    // [70, 70, 70, 95] has a standard deviation of about 10.8 dB.
    assert_eq!(got[3].confidence_level, ConfidenceLevel::Low);
    assert_eq!(got[3].category().label(), "High");
}

#[tokio::test(start_paused = true)]
async fn cancel_before_first_sample_ends_stream() {
    let (mut manager, sources) = scripted(
        ScriptedSources::default().with(MonitoringDomain::Sound, vec![sound(60.0)]),
    );
    let mut session = manager
        .start(MonitoringDomain::Sound, &SessionConfig::default())
        .await
        .unwrap();

    assert!(session.cancel());
    assert!(!session.cancel());
    assert!(session.next().await.is_none());

    assert!(manager.stop(MonitoringDomain::Sound).await);
    assert_eq!(sources.closed(), vec![MonitoringDomain::Sound]);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_closes_source() {
    let (mut manager, sources) = scripted(
        ScriptedSources::default().with(MonitoringDomain::Cardiac, vec![cardiac(72)]),
    );
    let mut session = manager
        .start(MonitoringDomain::Cardiac, &SessionConfig::default())
        .await
        .unwrap();
    assert!(session.next().await.is_some());

    assert!(manager.stop(MonitoringDomain::Cardiac).await);
    assert_eq!(sources.closed(), vec![MonitoringDomain::Cardiac]);
    assert!(!manager.stop(MonitoringDomain::Cardiac).await);
    assert!(!manager.stop(MonitoringDomain::Speech).await);
    assert!(session.next().await.is_none());
    assert!(manager.active_domains().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_microphone_session_tears_down_the_first() {
    let (mut manager, sources) = scripted(
        ScriptedSources::default().with(MonitoringDomain::Sound, vec![sound(50.0), sound(51.0)]),
    );
    let mut first = manager
        .start(MonitoringDomain::Sound, &SessionConfig::default())
        .await
        .unwrap();
    assert!(first.next().await.is_some());

    let _second = manager
        .start(MonitoringDomain::Respiratory, &SessionConfig::default())
        .await
        .unwrap();

    assert_eq!(sources.closed(), vec![MonitoringDomain::Sound]);
    assert!(first.next().await.is_none());
    assert_eq!(manager.active_domains(), vec![MonitoringDomain::Respiratory]);
}

#[tokio::test(start_paused = true)]
async fn camera_and_microphone_sessions_coexist() {
    let (mut manager, _) = scripted(
        ScriptedSources::default()
            .with(MonitoringDomain::Sound, vec![sound(40.0)])
            .with(MonitoringDomain::Cardiac, vec![cardiac(65)]),
    );
    let mut heart = manager
        .start(MonitoringDomain::Cardiac, &SessionConfig::default())
        .await
        .unwrap();
    let mut noise = manager
        .start(MonitoringDomain::Sound, &SessionConfig::default())
        .await
        .unwrap();

    assert_eq!(heart.next().await.unwrap().domain(), MonitoringDomain::Cardiac);
    assert_eq!(noise.next().await.unwrap().domain(), MonitoringDomain::Sound);
    let mut active = manager.active_domains();
    active.sort();
    assert_eq!(active, vec![MonitoringDomain::Sound, MonitoringDomain::Cardiac]);

    manager.stop_all().await;
    assert!(manager.active_domains().is_empty());
}

#[tokio::test(start_paused = true)]
async fn restarting_a_domain_replaces_its_session() {
    let mut manager = SessionManager::simulated(Some(7));
    let mut first = manager
        .start(MonitoringDomain::Cardiac, &SessionConfig::default())
        .await
        .unwrap();
    let mut second = manager
        .start(MonitoringDomain::Cardiac, &SessionConfig::default())
        .await
        .unwrap();

    assert_ne!(first.id(), second.id());
    assert!(first.next().await.is_none());
    assert!(second.next().await.is_some());
    assert_eq!(manager.active_domains(), vec![MonitoringDomain::Cardiac]);
}

#[tokio::test(start_paused = true)]
async fn denied_permission_blocks_only_guarded_sensors() {
    let mut manager = SessionManager::new(Arc::new(DenyAll), Arc::new(ScriptedSources::default()));

    let err = manager
        .start(MonitoringDomain::Sound, &SessionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::PermissionDenied(SensorResource::Microphone)));
    assert_eq!(err.to_string(), "microphone permission not granted");

    assert!(matches!(
        manager.start(MonitoringDomain::Cardiac, &SessionConfig::default()).await,
        Err(SessionError::PermissionDenied(SensorResource::Camera))
    ));
    assert!(manager
        .start(MonitoringDomain::Tremor, &SessionConfig::default())
        .await
        .is_ok());
    assert_eq!(manager.active_domains(), vec![MonitoringDomain::Tremor]);
}

#[tokio::test(start_paused = true)]
async fn provider_returning_wrong_domain_is_rejected() {
    let sources = ScriptedSources {
        lie_about_domain: true,
        ..ScriptedSources::default()
    };
    let (mut manager, _) = scripted(sources);
    assert!(matches!(
        manager.start(MonitoringDomain::Speech, &SessionConfig::default()).await,
        Err(SessionError::Source { domain: MonitoringDomain::Speech, .. })
    ));
    assert!(manager.active_domains().is_empty());
}

#[tokio::test(start_paused = true)]
async fn warming_samples_feed_the_confidence_window() {
    let steady = Sample::Ready(RawSample {
        input: RawInput::Tremor {
            intensity: 0.03,
            frequency: 5.5,
        },
        raw_value: 1.0,
    });
    let (mut manager, _) = scripted(ScriptedSources::default().with(
        MonitoringDomain::Tremor,
        vec![Sample::Warming(1.0), Sample::Warming(1.0), steady],
    ));
    let mut session = manager
        .start(MonitoringDomain::Tremor, &SessionConfig::default())
        .await
        .unwrap();

    let first = session.next().await.unwrap();
    assert_eq!(first.confidence_level, ConfidenceLevel::High);
    assert_eq!(first.category().description, "Mild Tremor");
}

#[tokio::test(start_paused = true)]
async fn max_samples_ends_the_session() {
    let mut manager = SessionManager::simulated(Some(3));
    let config = SessionConfig {
        max_samples: Some(2),
        ..SessionConfig::default()
    };
    let mut session = manager.start(MonitoringDomain::Speech, &config).await.unwrap();
    assert!(session.next().await.is_some());
    assert!(session.next().await.is_some());
    assert!(session.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn simulated_sources_stay_inside_their_tables() {
    let mut manager = SessionManager::simulated(Some(42));
    for domain in MonitoringDomain::ALL {
        let mut session = manager.start(domain, &SessionConfig::default()).await.unwrap();
        for _ in 0..5 {
            let m = session.next().await.unwrap();
            assert_eq!(m.domain(), domain);
            assert!(domain.table().contains(m.category()), "{domain}: {m:?}");
        }
        assert!(manager.stop(domain).await);
    }
}

#[test]
fn session_config_falls_back_to_domain_defaults() {
    let config = SessionConfig::default();
    assert_eq!(config.interval_ms(MonitoringDomain::Cardiac), 1000);
    assert_eq!(config.interval_ms(MonitoringDomain::Speech), 500);
    assert_eq!(config.window(MonitoringDomain::Gait), 10);

    let config: SessionConfig =
        serde_json::from_str(r#"{ "interval_ms": 0, "window": 500 }"#).unwrap();
    assert_eq!(config.interval_ms(MonitoringDomain::Sound), 1);
    assert_eq!(config.window(MonitoringDomain::Sound), 50);
    assert_eq!(config.channel_capacity, 64);
}

#[test]
fn sensor_resources_per_domain() {
    assert_eq!(SensorResource::for_domain(MonitoringDomain::Speech), SensorResource::Microphone);
    assert_eq!(SensorResource::for_domain(MonitoringDomain::Cardiac), SensorResource::Camera);
    assert_eq!(SensorResource::for_domain(MonitoringDomain::Gait), SensorResource::Motion);
    assert!(!SensorResource::Motion.requires_permission());
}

fn seeded(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn tremor_warms_for_nineteen_samples_then_uses_last_fifty() {
    let mut source = TremorSource::new(seeded(1));
    let mut magnitudes = Vec::new();

    for i in 0..70_i64 {
        let sample = source.next_sample(i * 100);
        match sample {
            Sample::Warming(magnitude) => {
                assert!(i < 19, "still warming at sample {i}");
                magnitudes.push(magnitude);
            }
            Sample::Ready(raw) => {
                assert!(i >= 19, "ready too early at sample {i}");
                magnitudes.push(raw.raw_value);
                let start = magnitudes.len().saturating_sub(50);
                let expected = mean_abs_deviation(magnitudes[start..].iter().copied());
                match raw.input {
                    RawInput::Tremor {
                        intensity,
                        frequency,
                    } => {
                        assert!(approx(intensity, expected), "sample {i}: {intensity} vs {expected}");
                        assert!((5.0..=7.0).contains(&frequency));
                    }
                    other => panic!("unexpected input {other:?}"),
                }
            }
        }
    }
}

#[test]
fn mean_abs_deviation_and_variance() {
    assert!(approx(mean_abs_deviation([1.0, 3.0].into_iter()), 1.0));
    assert!(approx(mean_abs_deviation([2.0, 2.0, 2.0].into_iter()), 0.0));
    assert!(approx(variance([1.0, 2.0, 3.0, 4.0].into_iter()), 1.25));
    assert_eq!(variance([5.0].into_iter()), 0.0);
}

#[test]
fn step_detector_needs_a_rise_from_below_zero() {
    let mut steps = StepDetector::default();
    steps.observe(0.2, 0);
    steps.observe(0.9, 100);
    assert_eq!(steps.step_count(), 0);

    steps.observe(-0.2, 200);
    steps.observe(0.9, 300);
    assert_eq!(steps.step_count(), 1);
    steps.observe(1.0, 400);
    assert_eq!(steps.step_count(), 1);
}

#[test]
fn step_detector_debounces_and_keeps_last_ten() {
    let mut steps = StepDetector::default();
    steps.observe(-0.3, 0);
    steps.observe(0.8, 100);
    steps.observe(-0.3, 200);
    steps.observe(0.8, 300);
    assert_eq!(steps.step_count(), 1, "200 ms apart is one step");
    steps.observe(-0.3, 400);
    steps.observe(0.8, 400);
    assert_eq!(steps.step_count(), 2);
    assert!(approx(steps.steps_per_minute(), 1.0 / 0.3 * 60.0));

    let mut steps = StepDetector::default();
    for k in 0..15_i64 {
        steps.observe(-0.3, k * 500);
        steps.observe(0.8, k * 500 + 100);
    }
    assert_eq!(steps.step_count(), 10);
    // 10 kept steps, 500 ms apart: 9 intervals over 4.5 s.
    assert!(approx(steps.steps_per_minute(), 120.0));
}

#[test]
fn step_detector_with_one_step_has_no_cadence() {
    let mut steps = StepDetector::default();
    assert_eq!(steps.steps_per_minute(), 0.0);
    steps.observe(-1.0, 0);
    steps.observe(1.0, 50);
    assert_eq!(steps.steps_per_minute(), 0.0);
}

#[test]
fn gait_stability_is_clamped() {
    let still = [0.0, 0.0, 0.0];
    assert!(approx(gait_stability(still.into_iter(), still.into_iter()), 1.0));
    let xs = [0.0, 0.2];
    let zs = [0.0, 0.4];
    // var x = 0.01, var z = 0.04
    assert!(approx(gait_stability(xs.into_iter(), zs.into_iter()), 0.95));
    let wild = [-3.0, 3.0];
    assert_eq!(gait_stability(wild.into_iter(), wild.into_iter()), 0.0);
}

#[test]
fn gait_source_warms_then_reports_cadence() {
    let mut source = GaitSource::new(seeded(2));
    let mut last = None;
    for i in 0..60_i64 {
        match source.next_sample(i * 100) {
            Sample::Warming(_) => assert!(i < 19),
            Sample::Ready(raw) => {
                assert!(i >= 19);
                last = Some(raw.input);
            }
        }
    }
    match last {
        Some(RawInput::Gait {
            steps_per_minute,
            symmetry,
            stability,
        }) => {
            assert!(steps_per_minute > 60.0 && steps_per_minute < 160.0, "{steps_per_minute}");
            assert!((0.8..=1.0).contains(&symmetry));
            assert!((0.0..=1.0).contains(&stability));
        }
        other => panic!("unexpected input {other:?}"),
    }
}

#[test]
fn speech_volume_follows_clamped_level() {
    assert!(approx(speech_volume(-40.0, 0.0), 0.8));
    assert!(approx(speech_volume(-70.0, 0.1), 0.5));
    assert!(approx(speech_volume(5.0, 0.0), 0.8));
    assert!(approx(speech_volume(-130.0, 0.05), 0.05));

    let mut source = SpeechSource::new(seeded(3));
    for i in 0..20 {
        let Sample::Ready(raw) = source.next_sample(i * 500) else {
            panic!("speech never warms");
        };
        let RawInput::Speech {
            clarity,
            volume,
            rhythm,
        } = raw.input
        else {
            panic!("unexpected input {:?}", raw.input);
        };
        let base = speech_volume(raw.raw_value, 0.0);
        assert!(volume >= base && volume <= base + 0.2);
        assert!((0.75..=0.95).contains(&clarity));
        assert!((0.7..=1.0).contains(&rhythm));
    }
}

#[test]
fn respiratory_rate_is_rounded_to_a_tenth() {
    assert_eq!(round_tenth(14.26), 14.3);
    assert_eq!(round_tenth(13.94), 13.9);

    let mut source = RespiratorySource::new(seeded(4));
    for i in 0..30_i64 {
        let Sample::Ready(raw) = source.next_sample(i * 1000) else {
            panic!("respiratory never warms");
        };
        let RawInput::Respiratory { breaths_per_minute } = raw.input else {
            panic!("unexpected input {:?}", raw.input);
        };
        let tenths = breaths_per_minute * 10.0;
        assert!((tenths - tenths.round()).abs() < 1e-6, "{breaths_per_minute}");
        assert!((10.0..=18.0).contains(&breaths_per_minute));
        assert!((-48.0..=-42.0).contains(&raw.raw_value));
    }
}
