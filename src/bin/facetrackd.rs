//! facetrackd - face-tracking perception daemon
//!
//! This daemon:
//! 1. Subscribes to the camera picture and status topics over MQTT
//! 2. Tracks the latest camera field of view / aspect from status updates
//! 3. Decodes each picture payload and runs face/eye detection on it
//! 4. Computes signed angular offsets for every qualifying face
//! 5. Annotates the frame and persists it to the output artifact path
//! 6. Publishes a capture request on a fixed cadence from its own thread

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rumqttc::v5::{mqttbytes::v5::Packet, mqttbytes::QoS, Client, Event, MqttOptions};

use facetrack::config::{BackendKind, TrackerConfig};
use facetrack::detect::DetectorBackend;
use facetrack::frame::decode_frame;
use facetrack::msg::{parse_status, CAPTURE_REQUEST_PAYLOAD};
use facetrack::{CaptureTrigger, FrameAnalyzer, StatusTracker, StubBackend};

#[derive(Parser, Debug)]
#[command(author, version, about = "Face-tracking perception node")]
struct Args {
    /// Path to the JSON config file.
    #[arg(long, env = "FACETRACK_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = TrackerConfig::load_from(args.config.as_deref())?;
    let (host, port) = cfg.broker_host_port()?;

    let mut backend = build_backend(&cfg)?;
    backend.warm_up()?;
    let mut analyzer = FrameAnalyzer::new(backend, cfg.output_path.clone());
    let status = Arc::new(StatusTracker::new());

    let mut options = MqttOptions::new(&cfg.mqtt.client_id, &host, port);
    options.set_keep_alive(Duration::from_secs(60));
    options.set_clean_start(true);
    let (client, mut connection) = Client::new(options, 10);
    client
        .subscribe(cfg.topics.picture.as_str(), QoS::AtMostOnce)
        .context("subscribe to picture topic")?;
    client
        .subscribe(cfg.topics.status.as_str(), QoS::AtMostOnce)
        .context("subscribe to status topic")?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        let client = client.clone();
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
            let _ = client.disconnect();
        })
        .context("install shutdown handler")?;
    }

    // Capture trigger: independent cadence, no coordination with analysis.
    let trigger_handle = {
        let trigger = CaptureTrigger::new(cfg.capture_interval);
        let trigger_client = client.clone();
        let topic = cfg.topics.take_picture.clone();
        let running = running.clone();
        std::thread::spawn(move || {
            trigger.run(running, move || {
                trigger_client.publish(
                    topic.as_str(),
                    QoS::AtMostOnce,
                    false,
                    CAPTURE_REQUEST_PAYLOAD.to_vec(),
                )?;
                Ok(())
            });
        })
    };

    log::info!(
        "facetrackd running. broker={} backend={} output={}",
        cfg.mqtt.broker_addr,
        analyzer.backend_name(),
        cfg.output_path.display()
    );
    log::info!(
        "topics: picture={} status={} take_picture={} (capture every {}s)",
        cfg.topics.picture,
        cfg.topics.status,
        cfg.topics.take_picture,
        cfg.capture_interval.as_secs()
    );

    for event in connection.iter() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match event {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let topic = String::from_utf8_lossy(&publish.topic).into_owned();
                if topic == cfg.topics.picture {
                    handle_picture(&mut analyzer, &status, &publish.payload);
                } else if topic == cfg.topics.status {
                    handle_status(&status, &publish.payload);
                } else {
                    log::debug!("ignoring publish on unexpected topic {}", topic);
                }
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("mqtt connection error: {}", e);
                std::thread::sleep(Duration::from_secs(1));
            }
        }
    }

    log::info!("shutting down");
    let _ = trigger_handle.join();
    Ok(())
}

fn build_backend(cfg: &TrackerConfig) -> Result<Box<dyn DetectorBackend>> {
    match cfg.backend {
        BackendKind::Stub => Ok(Box::new(StubBackend::new())),
        BackendKind::Cascade => {
            #[cfg(feature = "backend-rustface")]
            {
                return Ok(Box::new(facetrack::detect::CascadeBackend::from_models(
                    &cfg.models.face,
                    &cfg.models.eye,
                )?));
            }
            #[cfg(not(feature = "backend-rustface"))]
            {
                anyhow::bail!(
                    "cascade backend requires the backend-rustface feature (models: {}, {})",
                    cfg.models.face.display(),
                    cfg.models.eye.display()
                )
            }
        }
    }
}

/// One picture delivery: decode, analyze against a status snapshot, log.
///
/// Decode failures and analysis rejections drop the frame; nothing here is
/// allowed to take the daemon down.
fn handle_picture(analyzer: &mut FrameAnalyzer, tracker: &StatusTracker, payload: &[u8]) {
    let mut frame = match decode_frame(payload) {
        Ok(frame) => frame,
        Err(e) => {
            log::error!("picture dropped: {:#}", e);
            return;
        }
    };
    let status = tracker.snapshot();
    log::debug!(
        "analyzing {}x{} frame (fov={:.1} aspect={:.4})",
        frame.width(),
        frame.height(),
        status.fov_degrees,
        status.vertical_aspect
    );
    match analyzer.analyze(&mut frame, status) {
        Ok(reports) if reports.is_empty() => log::debug!("no qualifying face"),
        Ok(reports) => log::info!("{} qualifying face(s) reported", reports.len()),
        Err(e) => log::warn!("frame dropped: {:#}", e),
    }
}

/// One status delivery: parse and apply; invalid updates keep prior state.
fn handle_status(tracker: &StatusTracker, payload: &[u8]) {
    let message = match parse_status(payload) {
        Ok(message) => message,
        Err(e) => {
            log::warn!("status dropped: {:#}", e);
            return;
        }
    };
    if let Err(e) = tracker.update(&message) {
        log::warn!("status update ignored: {}", e);
    }
}
