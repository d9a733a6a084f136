//! Poll scheduler: refreshes all measurement points on a fixed interval.

use evlink_common::Reading;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::point::MeasurementPoint;
use crate::transport::RegisterSource;

/// Shared handle to the most recent snapshot of all point readings.
///
/// The host adapter reads this on its own schedule; the scheduler
/// replaces the contents after every tick.
pub type SnapshotHandle = Arc<RwLock<Vec<Reading>>>;

/// Polls all measurement points of one device sequentially.
///
/// Points share a single Modbus-TCP connection, so refreshes within a
/// tick never run in parallel. Ticks never overlap: if one is still in
/// flight when the interval fires, the next tick is deferred.
pub struct DevicePoller<S: RegisterSource> {
    device_name: String,
    interval: Duration,
    transport: S,
    points: Vec<MeasurementPoint>,
    snapshot: SnapshotHandle,
}

impl<S: RegisterSource> DevicePoller<S> {
    /// Create a poller over a connected transport and a set of points.
    pub fn new(
        device_name: impl Into<String>,
        interval: Duration,
        transport: S,
        points: Vec<MeasurementPoint>,
    ) -> Self {
        Self {
            device_name: device_name.into(),
            interval,
            transport,
            points,
            snapshot: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Handle for host-side consumers of the current readings.
    pub fn snapshot(&self) -> SnapshotHandle {
        Arc::clone(&self.snapshot)
    }

    /// Refresh every point once, in registration order.
    ///
    /// A failing point never blocks the others; its error is recorded on
    /// the point and the tick continues. The snapshot is republished at
    /// the end of the tick.
    pub async fn tick(&mut self) {
        let mut ok = 0usize;
        let mut failed = 0usize;

        for point in &mut self.points {
            point.refresh(&mut self.transport).await;
            if point.last_error().is_some() {
                failed += 1;
            } else {
                ok += 1;
            }
        }

        let readings: Vec<Reading> = self
            .points
            .iter()
            .filter_map(|p| p.reading(&self.device_name))
            .collect();

        if let Ok(mut snapshot) = self.snapshot.write() {
            *snapshot = readings;
        }

        debug!(
            device = %self.device_name,
            ok,
            failed,
            "Poll tick complete"
        );
    }

    /// Run the polling loop until `shutdown` flips to true.
    ///
    /// The first tick fires immediately. Shutdown waits for an in-flight
    /// tick to finish; it never interrupts a read mid-transaction.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> S {
        info!(
            device = %self.device_name,
            interval_secs = self.interval.as_secs(),
            points = self.points.len(),
            "Starting poller"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    // A dropped sender also means shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(device = %self.device_name, "Poller stopped");
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::device::evlink_points;
    use crate::point::tests::FakeSource;
    use crate::point::{DecodeRule, MeasurementPoint};
    use crate::transport::ModbusTransport;
    use evlink_common::error::ReadError;
    use evlink_common::{ReadingValue, tables::FAULT_MAP};

    fn test_points() -> Vec<MeasurementPoint> {
        vec![
            MeasurementPoint::new("power", "Ladeleistung", 3059, 2, DecodeRule::Float32Swapped)
                .unwrap()
                .with_unit("W")
                .with_scale(1000.0)
                .with_decimals(2),
            MeasurementPoint::new("fault", "Fehlerstatus", 3041, 1, DecodeRule::Coded(&FAULT_MAP))
                .unwrap(),
            MeasurementPoint::new("charging_time", "Charging Time", 4007, 1, DecodeRule::Uint16)
                .unwrap()
                .with_unit("s"),
        ]
    }

    #[tokio::test]
    async fn test_tick_refreshes_all_points() {
        let source = FakeSource::new(vec![
            Ok(vec![0x0000, 0x4120]),
            Ok(vec![0]),
            Ok(vec![4711]),
        ]);
        let mut poller = DevicePoller::new(
            "wallbox",
            Duration::from_secs(30),
            source,
            test_points(),
        );

        poller.tick().await;

        let snapshot = poller.snapshot();
        let readings = snapshot.read().unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].value, ReadingValue::Float(10000.0));
        assert_eq!(readings[1].value, ReadingValue::Text("Kein Fehler".into()));
        assert_eq!(readings[2].value, ReadingValue::Integer(4711));
    }

    #[tokio::test]
    async fn test_one_failing_point_does_not_block_the_rest() {
        let source = FakeSource::new(vec![
            Ok(vec![0x0000, 0x4120]),
            Err(ReadError::Protocol(
                "IllegalDataAddress".into(),
            )),
            Ok(vec![4711]),
        ]);
        let mut poller = DevicePoller::new(
            "wallbox",
            Duration::from_secs(30),
            source,
            test_points(),
        );

        poller.tick().await;

        // All three points were attempted.
        assert_eq!(
            poller.transport.reads,
            vec![(3059, 2), (3041, 1), (4007, 1)]
        );

        // The failing point is absent from the snapshot, the others present.
        let snapshot = poller.snapshot();
        let readings = snapshot.read().unwrap();
        assert_eq!(readings.len(), 2);
        assert!(matches!(
            poller.points[1].last_error(),
            Some(ReadError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_values_survive_a_failing_tick() {
        let source = FakeSource::new(vec![
            // Tick 1: all good.
            Ok(vec![0x0000, 0x4120]),
            Ok(vec![0]),
            Ok(vec![100]),
            // Tick 2: everything times out.
            Err(ReadError::Transport("Read timed out".into())),
            Err(ReadError::Transport("Read timed out".into())),
            Err(ReadError::Transport("Read timed out".into())),
        ]);
        let mut poller = DevicePoller::new(
            "wallbox",
            Duration::from_secs(30),
            source,
            test_points(),
        );

        poller.tick().await;
        poller.tick().await;

        // Stale values are still exported after the failed tick.
        let snapshot = poller.snapshot();
        let readings = snapshot.read().unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].value, ReadingValue::Float(10000.0));
        assert!(poller.points.iter().all(|p| p.last_error().is_some()));
    }

    #[tokio::test]
    async fn test_full_register_map_tick() {
        let points = evlink_points().unwrap();
        // Answer every read with zeroed registers of the requested count.
        let responses = points
            .iter()
            .map(|p| Ok(vec![0u16; p.count() as usize]))
            .collect();
        let source = FakeSource::new(responses);
        let mut poller =
            DevicePoller::new("wallbox", Duration::from_secs(30), source, points);

        poller.tick().await;

        let snapshot = poller.snapshot();
        let readings = snapshot.read().unwrap();
        assert_eq!(readings.len(), 15);
    }

    #[tokio::test]
    async fn test_run_shuts_down_gracefully() {
        let source = FakeSource::new(vec![
            Ok(vec![0x0000, 0x4120]),
            Ok(vec![0]),
            Ok(vec![100]),
        ]);
        let poller = DevicePoller::new(
            "wallbox",
            Duration::from_secs(30),
            source,
            test_points(),
        );
        let snapshot = poller.snapshot();

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(poller.run(rx));

        // Give the immediate first tick a chance to complete.
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let source = handle.await.unwrap();
        assert_eq!(source.reads.len(), 3);
        assert_eq!(snapshot.read().unwrap().len(), 3);
    }

    // The poller future is handed to tokio::spawn with the real transport
    // in main, so it must be Send with that concrete type, not just with
    // the scripted source.
    #[tokio::test]
    async fn test_run_over_modbus_transport_is_spawnable() {
        let device = DeviceConfig {
            name: "wallbox".to_string(),
            host: "not an address".to_string(),
            port: 502,
            unit_id: 1,
            poll_interval_secs: 30,
            timeout_ms: 100,
        };
        let transport = ModbusTransport::new(&device);
        let poller = DevicePoller::new(
            "wallbox",
            Duration::from_secs(30),
            transport,
            test_points(),
        );
        let snapshot = poller.snapshot();

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(poller.run(rx));

        // The first tick fails every read (the address never parses) and
        // must still complete without a session.
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let mut transport = handle.await.unwrap();
        assert!(!transport.is_connected());
        assert!(snapshot.read().unwrap().is_empty());
        transport.disconnect().await;
    }
}
