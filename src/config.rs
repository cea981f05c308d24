use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

const DEFAULT_BROKER_ADDR: &str = "127.0.0.1:1883";
const DEFAULT_CLIENT_ID: &str = "facetrackd";
const DEFAULT_PICTURE_TOPIC: &str = "camera/picture";
const DEFAULT_STATUS_TOPIC: &str = "camera/status";
const DEFAULT_TAKE_PICTURE_TOPIC: &str = "camera/take_picture";
const DEFAULT_FACE_MODEL: &str = "resources/frontal_face.bin";
const DEFAULT_EYE_MODEL: &str = "resources/eye.bin";
const DEFAULT_OUTPUT_PATH: &str = "img.jpg";
const DEFAULT_CAPTURE_INTERVAL_SECS: u64 = 1;
const DEFAULT_BACKEND: &str = "stub";

#[derive(Debug, Deserialize, Default)]
struct TrackerConfigFile {
    mqtt: Option<MqttConfigFile>,
    topics: Option<TopicConfigFile>,
    models: Option<ModelConfigFile>,
    output_path: Option<PathBuf>,
    capture_interval_secs: Option<u64>,
    backend: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct MqttConfigFile {
    broker_addr: Option<String>,
    client_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TopicConfigFile {
    picture: Option<String>,
    status: Option<String>,
    take_picture: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelConfigFile {
    face: Option<PathBuf>,
    eye: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub mqtt: MqttSettings,
    pub topics: TopicSettings,
    pub models: ModelSettings,
    pub output_path: PathBuf,
    pub capture_interval: Duration,
    pub backend: BackendKind,
}

#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub broker_addr: String,
    pub client_id: String,
}

#[derive(Debug, Clone)]
pub struct TopicSettings {
    pub picture: String,
    pub status: String,
    pub take_picture: String,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub face: PathBuf,
    pub eye: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Stub,
    Cascade,
}

impl BackendKind {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "stub" => Ok(BackendKind::Stub),
            "cascade" => Ok(BackendKind::Cascade),
            other => Err(anyhow!("unknown backend {:?}; expected stub or cascade", other)),
        }
    }
}

impl TrackerConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from an explicit config path, falling back to `FACETRACK_CONFIG`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("FACETRACK_CONFIG").ok();
        let config_path = path
            .map(Path::to_path_buf)
            .or_else(|| env_path.map(PathBuf::from));
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: TrackerConfigFile) -> Result<Self> {
        let mqtt = MqttSettings {
            broker_addr: file
                .mqtt
                .as_ref()
                .and_then(|mqtt| mqtt.broker_addr.clone())
                .unwrap_or_else(|| DEFAULT_BROKER_ADDR.to_string()),
            client_id: file
                .mqtt
                .as_ref()
                .and_then(|mqtt| mqtt.client_id.clone())
                .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
        };
        let topics = TopicSettings {
            picture: file
                .topics
                .as_ref()
                .and_then(|topics| topics.picture.clone())
                .unwrap_or_else(|| DEFAULT_PICTURE_TOPIC.to_string()),
            status: file
                .topics
                .as_ref()
                .and_then(|topics| topics.status.clone())
                .unwrap_or_else(|| DEFAULT_STATUS_TOPIC.to_string()),
            take_picture: file
                .topics
                .as_ref()
                .and_then(|topics| topics.take_picture.clone())
                .unwrap_or_else(|| DEFAULT_TAKE_PICTURE_TOPIC.to_string()),
        };
        let models = ModelSettings {
            face: file
                .models
                .as_ref()
                .and_then(|models| models.face.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FACE_MODEL)),
            eye: file
                .models
                .and_then(|models| models.eye)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EYE_MODEL)),
        };
        let output_path = file
            .output_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));
        let capture_interval = Duration::from_secs(
            file.capture_interval_secs
                .unwrap_or(DEFAULT_CAPTURE_INTERVAL_SECS),
        );
        let backend = BackendKind::parse(file.backend.as_deref().unwrap_or(DEFAULT_BACKEND))?;
        Ok(Self {
            mqtt,
            topics,
            models,
            output_path,
            capture_interval,
            backend,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("FACETRACK_BROKER_ADDR") {
            if !addr.trim().is_empty() {
                self.mqtt.broker_addr = addr;
            }
        }
        if let Ok(client_id) = std::env::var("FACETRACK_CLIENT_ID") {
            if !client_id.trim().is_empty() {
                self.mqtt.client_id = client_id;
            }
        }
        if let Ok(path) = std::env::var("FACETRACK_OUTPUT_PATH") {
            if !path.trim().is_empty() {
                self.output_path = PathBuf::from(path);
            }
        }
        if let Ok(backend) = std::env::var("FACETRACK_BACKEND") {
            if !backend.trim().is_empty() {
                self.backend = BackendKind::parse(backend.trim())?;
            }
        }
        if let Ok(interval) = std::env::var("FACETRACK_CAPTURE_INTERVAL_SECS") {
            let seconds: u64 = interval.parse().map_err(|_| {
                anyhow!("FACETRACK_CAPTURE_INTERVAL_SECS must be an integer number of seconds")
            })?;
            self.capture_interval = Duration::from_secs(seconds);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.capture_interval.as_secs() == 0 {
            return Err(anyhow!("capture interval must be greater than zero"));
        }
        for (name, topic) in [
            ("topics.picture", &self.topics.picture),
            ("topics.status", &self.topics.status),
            ("topics.take_picture", &self.topics.take_picture),
        ] {
            if topic.trim().is_empty() {
                return Err(anyhow!("{} must not be empty", name));
            }
        }
        if self.mqtt.broker_addr.trim().is_empty() {
            return Err(anyhow!("mqtt.broker_addr must not be empty"));
        }
        Ok(())
    }

    /// Split the broker address into host and port.
    pub fn broker_host_port(&self) -> Result<(String, u16)> {
        split_host_port(&self.mqtt.broker_addr)
    }
}

fn read_config_file(path: &Path) -> Result<TrackerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn split_host_port(addr: &str) -> Result<(String, u16)> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, rest) = rest
            .split_once(']')
            .ok_or_else(|| anyhow!("invalid broker address: {}", addr))?;
        let port = rest
            .strip_prefix(':')
            .ok_or_else(|| anyhow!("missing broker port in {}", addr))?;
        let port: u16 = port
            .parse()
            .map_err(|_| anyhow!("invalid broker port in {}", addr))?;
        return Ok((host.to_string(), port));
    }

    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("missing broker port in {}", addr))?;
    let port: u16 = port
        .parse()
        .map_err(|_| anyhow!("invalid broker port in {}", addr))?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_host_port_handles_plain_and_bracketed() {
        assert_eq!(
            split_host_port("127.0.0.1:1883").unwrap(),
            ("127.0.0.1".to_string(), 1883)
        );
        assert_eq!(
            split_host_port("[::1]:1883").unwrap(),
            ("::1".to_string(), 1883)
        );
        assert!(split_host_port("nohost").is_err());
        assert!(split_host_port("host:notaport").is_err());
    }

    #[test]
    fn backend_kind_parses_known_names_only() {
        assert_eq!(BackendKind::parse("stub").unwrap(), BackendKind::Stub);
        assert_eq!(BackendKind::parse("cascade").unwrap(), BackendKind::Cascade);
        assert!(BackendKind::parse("onnx").is_err());
    }

    #[test]
    fn defaults_apply_when_file_is_empty() {
        let cfg = TrackerConfig::from_file(TrackerConfigFile::default()).expect("defaults");
        assert_eq!(cfg.mqtt.broker_addr, DEFAULT_BROKER_ADDR);
        assert_eq!(cfg.topics.picture, DEFAULT_PICTURE_TOPIC);
        assert_eq!(cfg.topics.take_picture, DEFAULT_TAKE_PICTURE_TOPIC);
        assert_eq!(cfg.output_path, PathBuf::from("img.jpg"));
        assert_eq!(cfg.capture_interval, Duration::from_secs(1));
        assert_eq!(cfg.backend, BackendKind::Stub);
    }
}
