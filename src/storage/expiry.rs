//! Background Expiry Sweeper
//!
//! This module implements a background task that periodically removes
//! expired keys. This is the "active expiry" half; "lazy expiry" happens
//! on access inside the keyspace itself.
//!
//! ## Why Do We Need This?
//!
//! Lazy expiry is efficient but has a gap: a key that expires and is
//! never touched again would sit in memory forever. The sweeper closes
//! that gap.
//!
//! ## Design
//!
//! The sweeper runs as a Tokio task and:
//! 1. Sleeps for a configurable interval (default: 100ms)
//! 2. Wakes up and runs one bounded sweep over a slice of the keyspace
//! 3. Logs statistics about what it removed
//!
//! Each sweep is capped in shards visited, entries sampled and wall-clock
//! time, and it only ever takes guards it can grab without waiting, so a
//! busy keyspace never stalls behind its own housekeeping.
//!
//! ## Adaptive Frequency
//!
//! If a large fraction of sampled keys turn out to be expired, the
//! sweeper runs more often. If sweeps keep coming back empty, it backs
//! off to save CPU.

use crate::storage::keyspace::{KeySpace, SweepLimits};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone, Default)]
pub struct ExpiryConfig {
    /// Caps for a single sweep pass.
    pub limits: SweepLimits,

    /// Pacing for the sweep interval.
    pub pacing: SweepPacing,
}

/// How the interval between sweeps adapts to the observed expiry rate.
#[derive(Debug, Clone)]
pub struct SweepPacing {
    /// Base interval between sweeps (default: 100ms)
    pub base_interval: Duration,

    /// Minimum interval between sweeps (default: 10ms)
    pub min_interval: Duration,

    /// Maximum interval between sweeps (default: 1s)
    pub max_interval: Duration,

    /// If this fraction of sampled keys was expired, speed up sweeping
    pub speedup_threshold: f64,

    /// If this fraction of sampled keys was expired, slow down sweeping
    pub slowdown_threshold: f64,
}

impl Default for SweepPacing {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(100),
            min_interval: Duration::from_millis(10),
            max_interval: Duration::from_secs(1),
            speedup_threshold: 0.25,  // Speed up if >25% of samples were expired
            slowdown_threshold: 0.01, // Slow down if <1% of samples were expired
        }
    }
}

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct ExpirySweeper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    /// Starts the expiry sweeper as a background task.
    ///
    /// # Arguments
    ///
    /// * `keyspace` - The keyspace to sweep
    /// * `config` - Configuration for the sweeper
    ///
    /// # Returns
    ///
    /// Returns a handle that can be used to stop the sweeper.
    /// The sweeper will automatically stop when the handle is dropped.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use fieldkv::storage::{KeySpace, ExpirySweeper, ExpiryConfig};
    /// use std::sync::Arc;
    ///
    /// let keyspace = Arc::new(KeySpace::new());
    /// let sweeper = ExpirySweeper::start(keyspace, ExpiryConfig::default());
    ///
    /// // Sweeper runs in the background...
    ///
    /// // Dropping the sweeper will stop it
    /// drop(sweeper);
    /// ```
    pub fn start(keyspace: Arc<KeySpace>, config: ExpiryConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(keyspace, config, shutdown_rx));

        info!("Background expiry sweeper started");

        Self { shutdown_tx }
    }

    /// Stops the expiry sweeper.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        info!("Background expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop(
    keyspace: Arc<KeySpace>,
    config: ExpiryConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut current_interval = config.pacing.base_interval;

    loop {
        // Wait for the interval or shutdown signal
        tokio::select! {
            _ = tokio::time::sleep(current_interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let outcome = keyspace.sweep_expired(&config.limits);

        // Adjust the interval based on how stale the sampled slice was
        if outcome.scanned > 0 {
            let expiry_rate = outcome.removed as f64 / outcome.scanned as f64;

            if expiry_rate > config.pacing.speedup_threshold {
                // Many keys expiring - speed up
                current_interval = (current_interval / 2).max(config.pacing.min_interval);
                debug!(
                    removed = outcome.removed,
                    rate = %format!("{:.2}%", expiry_rate * 100.0),
                    new_interval_ms = current_interval.as_millis(),
                    "High expiry rate, speeding up sweeper"
                );
            } else if expiry_rate < config.pacing.slowdown_threshold && outcome.removed == 0 {
                // Few keys expiring - slow down
                current_interval = (current_interval * 2).min(config.pacing.max_interval);
                trace!(
                    new_interval_ms = current_interval.as_millis(),
                    "Low expiry rate, slowing down sweeper"
                );
            }
        }

        if outcome.removed > 0 {
            debug!(
                removed = outcome.removed,
                scanned = outcome.scanned,
                keys_remaining = keyspace.len(),
                "Expired keys swept out"
            );
        }
    }
}

/// Starts the expiry sweeper with default configuration.
///
/// This is a convenience function for simple use cases.
pub fn start_expiry_sweeper(keyspace: Arc<KeySpace>) -> ExpirySweeper {
    ExpirySweeper::start(keyspace, ExpiryConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::time::Duration;

    fn fast_config() -> ExpiryConfig {
        ExpiryConfig {
            limits: SweepLimits {
                shards_per_sweep: 64,
                samples_per_shard: 1024,
                time_budget: Duration::from_millis(50),
            },
            pacing: SweepPacing {
                base_interval: Duration::from_millis(10),
                ..Default::default()
            },
        }
    }

    fn seed_expiring_keys(keyspace: &KeySpace, count: usize, ttl: Duration) {
        for i in 0..count {
            let key = Bytes::from(format!("key{}", i));
            keyspace
                .hset(key.clone(), vec![(Bytes::from("f"), Bytes::from("v"))])
                .unwrap();
            assert!(keyspace.expire(&key, ttl));
        }
    }

    #[tokio::test]
    async fn test_sweeper_cleans_expired_keys() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("fieldkv=debug")
            .try_init();

        let keyspace = Arc::new(KeySpace::new());

        seed_expiring_keys(&keyspace, 10, Duration::from_millis(50));

        // Add a persistent key
        keyspace
            .hset(
                Bytes::from("persistent"),
                vec![(Bytes::from("f"), Bytes::from("v"))],
            )
            .unwrap();

        assert_eq!(keyspace.len(), 11);

        let _sweeper = ExpirySweeper::start(Arc::clone(&keyspace), fast_config());

        // Wait for keys to expire and be swept
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Only the persistent key should remain
        assert_eq!(keyspace.len(), 1);
        assert!(keyspace.exists(b"persistent"));
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_drop() {
        let keyspace = Arc::new(KeySpace::new());

        {
            let _sweeper = ExpirySweeper::start(Arc::clone(&keyspace), fast_config());
            tokio::time::sleep(Duration::from_millis(50)).await;
            // Sweeper is dropped here
        }

        // Add a short-lived key after the sweeper is stopped
        seed_expiring_keys(&keyspace, 1, Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Nothing swept it, but the lazy check still reports absence
        assert_eq!(keyspace.hget(b"key0", b"f").unwrap(), None);
        assert!(!keyspace.exists(b"key0"));
    }

    #[tokio::test]
    async fn test_sweeper_keeps_live_keys() {
        let keyspace = Arc::new(KeySpace::new());

        for i in 0..50 {
            keyspace
                .hset(
                    Bytes::from(format!("live{}", i)),
                    vec![(Bytes::from("f"), Bytes::from("v"))],
                )
                .unwrap();
        }

        let _sweeper = ExpirySweeper::start(Arc::clone(&keyspace), fast_config());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(keyspace.len(), 50);
    }

    #[tokio::test]
    async fn test_sweeper_adaptive_interval() {
        let keyspace = Arc::new(KeySpace::new());

        // Many short-lived keys to trigger speedup
        seed_expiring_keys(&keyspace, 1000, Duration::from_millis(20));

        let config = ExpiryConfig {
            limits: SweepLimits {
                shards_per_sweep: 64,
                samples_per_shard: 1024,
                time_budget: Duration::from_millis(50),
            },
            pacing: SweepPacing {
                base_interval: Duration::from_millis(50),
                min_interval: Duration::from_millis(5),
                max_interval: Duration::from_secs(1),
                speedup_threshold: 0.1,
                slowdown_threshold: 0.01,
            },
        };

        let _sweeper = ExpirySweeper::start(Arc::clone(&keyspace), config);

        // Wait for the sweeps to churn through everything
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(keyspace.len(), 0);
    }
}
