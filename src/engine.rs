//! Randomized animation of a set of lights.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bridge::BridgeClient;
use crate::config::AnimationConfig;
use crate::errors::{ConfigError, Error};
use crate::history::{Event, EventSink, LogSink, Source};
use crate::runtime;
use crate::transport::Transport;
use crate::types::LightId;

type Result<T> = std::result::Result<T, Error>;

/// Cancellation token for [`AnimationEngine::run`].
///
/// Clones share the same flag. A fresh signal never fires on its own, so
/// `run` animates until someone calls [`StopSignal::stop`].
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a single [`AnimationEngine::run_once`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRun {
    pub effect: String,
    pub ticks: u32,
    /// Color commands sent, `ticks * lights`
    pub updates: usize,
}

/// Totals for a finished [`AnimationEngine::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub iterations: u64,
    pub failures: u64,
}

/// Applies randomly chosen effects to a fixed list of lights.
///
/// Each iteration powers every light on, picks an effect uniformly, picks a
/// duration uniformly from `[min_duration, max_duration]` ticks, and then for
/// every tick walks the lights in order: sample speed, hue, brightness and
/// saturation from the effect, send the color, pause for `speed`
/// microseconds. Commands are awaited one at a time, never in parallel.
pub struct AnimationEngine<T, R = StdRng> {
    bridge: Arc<BridgeClient<T>>,
    config: AnimationConfig,
    lights: Vec<LightId>,
    min_duration: u32,
    max_duration: u32,
    rng: R,
    sink: Arc<dyn EventSink>,
}

impl<T: Transport> AnimationEngine<T, StdRng> {
    /// Build an engine from a JSON animation document.
    ///
    /// Fails with [`ConfigError`] if the document is malformed or violates
    /// the schema, if `lights` is empty, or if `min_duration > max_duration`.
    pub fn new(
        bridge: Arc<BridgeClient<T>>,
        lights: Vec<LightId>,
        config_source: &str,
        min_duration: u32,
        max_duration: u32,
    ) -> Result<Self> {
        let config = AnimationConfig::parse(config_source)?;
        Self::with_config(bridge, lights, config, min_duration, max_duration)
    }

    /// Build an engine from an already validated configuration.
    pub fn with_config(
        bridge: Arc<BridgeClient<T>>,
        lights: Vec<LightId>,
        config: AnimationConfig,
        min_duration: u32,
        max_duration: u32,
    ) -> Result<Self> {
        if lights.is_empty() {
            return Err(ConfigError::NoLights.into());
        }
        if min_duration > max_duration {
            return Err(ConfigError::InvertedDurations {
                min: min_duration,
                max: max_duration,
            }
            .into());
        }

        Ok(AnimationEngine {
            bridge,
            config,
            lights,
            min_duration,
            max_duration,
            rng: StdRng::from_entropy(),
            sink: Arc::new(LogSink),
        })
    }
}

impl<T: Transport, R: Rng> AnimationEngine<T, R> {
    /// Replace the random source, e.g. with a seeded one for reproducible runs.
    pub fn with_rng<R2: Rng>(self, rng: R2) -> AnimationEngine<T, R2> {
        AnimationEngine {
            bridge: self.bridge,
            config: self.config,
            lights: self.lights,
            min_duration: self.min_duration,
            max_duration: self.max_duration,
            rng,
            sink: self.sink,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn lights(&self) -> &[LightId] {
        &self.lights
    }

    pub fn bridge(&self) -> &BridgeClient<T> {
        &self.bridge
    }

    /// Apply one random effect for a random number of ticks.
    ///
    /// The first failing command ends the iteration and is returned as is.
    pub async fn run_once(&mut self) -> Result<EffectRun> {
        for light in &self.lights {
            if let Err(err) = self.bridge.turn_on(light.as_str()).await {
                self.report(format!("power on light {light}: {err}"));
                return Err(err);
            }
        }

        let (name, effect) = self
            .config
            .choose(&mut self.rng)
            .map(|(name, effect)| (name.to_string(), *effect))
            .ok_or(ConfigError::NoEffects)?;
        let ticks = self.rng.gen_range(self.min_duration..=self.max_duration);
        info!(
            "running effect {name:?} for {ticks} ticks on {} lights",
            self.lights.len()
        );

        let mut updates = 0;
        for tick in 0..ticks {
            for light in &self.lights {
                let speed = effect.speed.sample(&mut self.rng);
                let hue = effect.hue.sample(&mut self.rng);
                let bri = effect.bri.sample(&mut self.rng);
                let sat = effect.sat.sample(&mut self.rng);
                self.sink.record(&Event::debug(
                    Source::Engine,
                    format!(
                        "effect {name} tick {tick} light {light}: speed {speed} hue {hue} bri {bri} sat {sat}"
                    ),
                ));

                if let Err(err) = self.bridge.set_color(light.as_str(), hue, bri, sat).await {
                    self.report(format!("effect {name} tick {tick} light {light}: {err}"));
                    return Err(err);
                }
                updates += 1;

                let pause = Duration::from_micros(u64::try_from(speed).unwrap_or(0));
                runtime::sleep(pause).await;
            }
        }

        Ok(EffectRun {
            effect: name,
            ticks,
            updates,
        })
    }

    /// Run effects until `stop` fires.
    ///
    /// A failed iteration is recorded to the sink and the next one starts
    /// right away; no error ends the loop. `stop` is checked before each
    /// iteration.
    pub async fn run(&mut self, stop: &StopSignal) -> RunReport {
        let mut report = RunReport::default();

        while !stop.is_stopped() {
            report.iterations += 1;
            match self.run_once().await {
                Ok(run) => debug!(
                    "iteration {}: {} updates of {:?}",
                    report.iterations, run.updates, run.effect
                ),
                Err(err) => {
                    report.failures += 1;
                    self.sink.record(&Event::error(
                        Source::Engine,
                        format!("iteration {} failed: {err}", report.iterations),
                    ));
                }
            }
        }

        info!(
            "animation stopped after {} iterations ({} failed)",
            report.iterations, report.failures
        );
        report
    }

    fn report(&self, message: String) {
        self.sink.record(&Event::warn(Source::Engine, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeConnection;
    use crate::history::EventHistory;
    use crate::transport::testing::MockTransport;
    use log::Level;
    use serde_json::{Value, json};

    const EFFECTS: &str = r#"{
        "ember": {
            "speed": {"min": 0, "max": 5},
            "hue": {"min": 0, "max": 6000},
            "bri": {"min": 80, "max": 200},
            "sat": {"min": 200, "max": 254}
        },
        "ocean": {
            "speed": {"min": 1, "max": 3},
            "hue": {"min": 40000, "max": 47000},
            "bri": {"min": 10, "max": 20},
            "sat": {"min": 0, "max": 50}
        }
    }"#;

    async fn bridge(mock: &MockTransport) -> Arc<BridgeClient<MockTransport>> {
        let conn = BridgeConnection::new("10.0.0.2", "token").unwrap();
        Arc::new(
            BridgeClient::connect_with_sink(conn, mock.clone(), Arc::new(EventHistory::new()))
                .await
                .unwrap(),
        )
    }

    fn lights(ids: &[&str]) -> Vec<LightId> {
        ids.iter().map(|id| LightId::parse(id).unwrap()).collect()
    }

    fn engine(
        bridge: Arc<BridgeClient<MockTransport>>,
        ids: &[&str],
        min: u32,
        max: u32,
    ) -> AnimationEngine<MockTransport> {
        AnimationEngine::new(bridge, lights(ids), EFFECTS, min, max)
            .unwrap()
            .with_rng(StdRng::seed_from_u64(42))
    }

    fn body_int(body: &Value, key: &str) -> i64 {
        body[key].as_i64().unwrap()
    }

    /// Value following `key` in a per-update debug message.
    fn sampled(message: &str, key: &str) -> i64 {
        let mut words = message.split_whitespace();
        words.find(|word| *word == key).unwrap();
        words.next().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_zero_duration_only_powers_on() {
        let mock = MockTransport::bridge("bridge");
        let mut engine = engine(bridge(&mock).await, &["1", "2"], 0, 0);

        let run = engine.run_once().await.unwrap();

        assert_eq!(run.ticks, 0);
        assert_eq!(run.updates, 0);
        let puts = mock.puts();
        assert_eq!(puts.len(), 2);
        for (put, id) in puts.iter().zip(["1", "2"]) {
            assert_eq!(put.url, format!("http://10.0.0.2/api/token/lights/{id}/state"));
            assert_eq!(put.body, Some(json!({"on": true})));
        }
    }

    #[tokio::test]
    async fn test_single_light_fixed_duration() {
        let mock = MockTransport::bridge("bridge");
        let history = Arc::new(EventHistory::new());
        let mut engine = engine(bridge(&mock).await, &["7"], 3, 3).with_sink(history.clone());

        let run = engine.run_once().await.unwrap();

        assert_eq!(run.ticks, 3);
        assert_eq!(run.updates, 3);
        let effect = *engine.config().get(&run.effect).unwrap();

        let samples: Vec<_> = history
            .entries()
            .into_iter()
            .filter(|entry| entry.level == "DEBUG")
            .collect();
        assert_eq!(samples.len(), 3);
        for (tick, entry) in samples.iter().enumerate() {
            assert!(entry.message.contains(&format!("tick {tick} light 7")));
            assert!(effect.speed.contains(sampled(&entry.message, "speed")));
        }

        let puts = mock.puts();
        assert_eq!(puts.len(), 4);
        assert_eq!(puts[0].body, Some(json!({"on": true})));
        for put in &puts[1..] {
            let body = put.body.as_ref().unwrap();
            assert!(body.get("on").is_none());
            assert!(effect.hue.contains(body_int(body, "hue")));
            assert!(effect.bri.contains(body_int(body, "bri")));
            assert!(effect.sat.contains(body_int(body, "sat")));
        }
    }

    #[tokio::test]
    async fn test_lights_are_updated_in_list_order() {
        let mock = MockTransport::bridge("bridge");
        let mut engine = engine(bridge(&mock).await, &["3", "1", "2"], 2, 2);

        engine.run_once().await.unwrap();

        let order: Vec<String> = mock.puts()[3..]
            .iter()
            .map(|put| put.url.rsplit('/').nth(1).unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["3", "1", "2", "3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_duration_stays_within_bounds() {
        let mock = MockTransport::bridge("bridge");
        let mut engine = engine(bridge(&mock).await, &["1"], 1, 4);

        for _ in 0..10 {
            let run = engine.run_once().await.unwrap();
            assert!((1..=4).contains(&run.ticks));
        }
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let first = MockTransport::bridge("bridge");
        let second = MockTransport::bridge("bridge");
        let mut a = engine(bridge(&first).await, &["1", "2"], 1, 3);
        let mut b = engine(bridge(&second).await, &["1", "2"], 1, 3);

        for _ in 0..3 {
            assert_eq!(a.run_once().await.unwrap(), b.run_once().await.unwrap());
        }
        assert_eq!(first.puts(), second.puts());
    }

    #[tokio::test]
    async fn test_power_on_failure_propagates() {
        let mock = MockTransport::bridge("bridge");
        let history = Arc::new(EventHistory::new());
        let mut engine = engine(bridge(&mock).await, &["1", "2"], 2, 2).with_sink(history.clone());
        mock.reply_status(404);

        let err = engine.run_once().await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(mock.puts().len(), 1);
        assert!(history.entries()[0].message.contains("light 1"));
    }

    #[tokio::test]
    async fn test_color_failure_names_tick_and_light() {
        let mock = MockTransport::bridge("bridge");
        let history = Arc::new(EventHistory::new());
        let mut engine = engine(bridge(&mock).await, &["1", "2"], 3, 3).with_sink(history.clone());
        // connect + 2 power on + 3 colors, then the bridge goes away
        mock.fail_after(6);

        assert!(engine.run_once().await.is_err());

        let failures: Vec<_> = history
            .entries()
            .into_iter()
            .filter(|entry| entry.level == "WARN")
            .collect();
        assert_eq!(failures.len(), 1);
        let message = &failures[0].message;
        assert!(message.contains("tick 1 light 2"), "{message}");
    }

    /// Records like an [`EventHistory`] and fires `stop` after `limit` errors.
    struct StopAfter {
        history: EventHistory,
        stop: StopSignal,
        limit: usize,
    }

    impl EventSink for StopAfter {
        fn record(&self, event: &Event) {
            self.history.record(event);
            if self.history.count(Level::Error) >= self.limit {
                self.stop.stop();
            }
        }
    }

    #[tokio::test]
    async fn test_run_survives_repeated_failures() {
        let mock = MockTransport::bridge("bridge");
        let stop = StopSignal::new();
        let sink = Arc::new(StopAfter {
            history: EventHistory::new(),
            stop: stop.clone(),
            limit: 5,
        });
        let mut engine = engine(bridge(&mock).await, &["1"], 1, 1).with_sink(sink.clone());
        // connect + one full iteration (power on + one color)
        mock.fail_after(3);

        let report = engine.run(&stop).await;

        assert_eq!(report, RunReport { iterations: 6, failures: 5 });
        assert_eq!(sink.history.count(Level::Error), 5);
        assert!(sink.history.last_error().unwrap().contains("iteration 6 failed"));
    }

    #[tokio::test]
    async fn test_run_honours_stop_before_first_iteration() {
        let mock = MockTransport::bridge("bridge");
        let stop = StopSignal::new();
        stop.stop();
        let mut engine = engine(bridge(&mock).await, &["1"], 1, 1);

        assert_eq!(engine.run(&stop).await, RunReport::default());
        assert!(mock.puts().is_empty());
    }

    #[tokio::test]
    async fn test_construction_errors() {
        let mock = MockTransport::bridge("bridge");
        let bridge = bridge(&mock).await;

        let malformed = r#"{"ember": {"speed": {"min": 0, "max": 1},}}"#;
        let err = AnimationEngine::new(bridge.clone(), lights(&["1"]), malformed, 0, 1)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));

        let err = AnimationEngine::new(bridge.clone(), Vec::new(), EFFECTS, 0, 1)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(ConfigError::NoLights)));

        let err = AnimationEngine::new(bridge.clone(), lights(&["1"]), EFFECTS, 5, 4)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvertedDurations { min: 5, max: 4 })
        ));
        assert!(err.is_fatal());

        // only the bridge validation request
        assert_eq!(mock.requests().len(), 1);
    }
}
