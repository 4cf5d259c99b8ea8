//! Bridge connection and light control.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use crate::errors::{ConnectionError, Error, TransportError, ValidationError};
use crate::history::{Event, EventSink, LogSink, Source};
use crate::payload::StateUpdate;
use crate::status::{LightDescriptor, bridge_errors};
use crate::transport::Transport;
use crate::types::{ColorCommand, LightId, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// Address and API token of a bridge.
///
/// Addresses without a scheme are taken as plain HTTP, matching how bridges
/// serve their v1 API on the local network.
///
/// # Examples
///
/// ```
/// use hue_animator::BridgeConnection;
///
/// let conn = BridgeConnection::new("192.168.1.2", "s3cr3t").unwrap();
/// assert_eq!(conn.base_url(), "http://192.168.1.2/api/s3cr3t");
///
/// assert!(BridgeConnection::new("", "s3cr3t").is_err());
/// assert!(BridgeConnection::new("192.168.1.2", "").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConnection {
    address: String,
    token: String,
}

impl BridgeConnection {
    pub fn new(address: &str, token: &str) -> std::result::Result<Self, ValidationError> {
        let address = address.trim().trim_end_matches('/');
        let token = token.trim();
        if address.is_empty() {
            return Err(ValidationError::EmptyField("address"));
        }
        if token.is_empty() {
            return Err(ValidationError::EmptyField("token"));
        }

        let address = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        Ok(BridgeConnection {
            address,
            token: token.to_string(),
        })
    }

    /// The bridge address including its scheme.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn base_url(&self) -> String {
        format!("{}/api/{}", self.address, self.token)
    }

    fn config_url(&self) -> String {
        format!("{}/config", self.base_url())
    }

    fn lights_url(&self) -> String {
        format!("{}/lights", self.base_url())
    }

    fn state_url(&self, light: &LightId) -> String {
        format!("{}/lights/{}/state", self.base_url(), light)
    }
}

/// A validated connection to a bridge.
///
/// A client only exists once the bridge has answered `GET /api/{token}/config`
/// with a payload naming itself; it is never re-validated afterwards. Every
/// operation checks its input before any request is made, and every failure
/// is reported to the client's [`EventSink`] before being returned.
///
/// # Example
///
/// ```ignore
/// use hue_animator::{BridgeClient, BridgeConnection, HttpTransport};
///
/// let conn = BridgeConnection::new("192.168.1.2", "s3cr3t")?;
/// let bridge = BridgeClient::connect(conn, HttpTransport::new()?).await?;
/// bridge.set_color("3", 46920, 254, 254).await?;
/// ```
pub struct BridgeClient<T> {
    connection: BridgeConnection,
    transport: T,
    sink: Arc<dyn EventSink>,
    name: String,
}

impl<T> std::fmt::Debug for BridgeClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("address", &self.connection.address)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> BridgeClient<T> {
    /// Validate the bridge and build a client reporting to the `log` facade.
    pub async fn connect(connection: BridgeConnection, transport: T) -> Result<Self> {
        Self::connect_with_sink(connection, transport, Arc::new(LogSink)).await
    }

    /// Validate the bridge and build a client reporting to `sink`.
    pub async fn connect_with_sink(
        connection: BridgeConnection,
        transport: T,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let url = connection.config_url();
        let address = connection.address.clone();

        let config = match transport.get(&url).await {
            Ok(config) => config,
            Err(source) => {
                let err = ConnectionError::Unreachable { address, source };
                sink.record(&Event::error(Source::Bridge, err.to_string()));
                return Err(err.into());
            }
        };

        let Some(name) = config.get("name").map(bridge_name) else {
            let err = ConnectionError::NotIdentified { address };
            sink.record(&Event::error(Source::Bridge, err.to_string()));
            return Err(err.into());
        };

        debug!("connected to bridge {name:?} at {address}");
        Ok(BridgeClient {
            connection,
            transport,
            sink,
            name,
        })
    }

    /// The name the bridge reported for itself.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection(&self) -> &BridgeConnection {
        &self.connection
    }

    pub async fn turn_on(&self, light: &str) -> Result<Value> {
        self.set_power(light, PowerMode::On).await
    }

    pub async fn turn_off(&self, light: &str) -> Result<Value> {
        self.set_power(light, PowerMode::Off).await
    }

    pub async fn set_power(&self, light: &str, power: PowerMode) -> Result<Value> {
        let light = self.validate_light(light)?;
        self.put_state(&light, &StateUpdate::from(power)).await
    }

    /// Set a light's color.
    ///
    /// The light id is checked first, then hue (0-65535), brightness (0-254)
    /// and saturation (0-254); the first failure is returned and no request
    /// is made.
    pub async fn set_color(
        &self,
        light: &str,
        hue: i64,
        brightness: i64,
        saturation: i64,
    ) -> Result<Value> {
        let light = self.validate_light(light)?;
        let color = ColorCommand::new(hue, brightness, saturation)
            .map_err(|e| self.validation_failed(e))?;
        self.put_state(&light, &StateUpdate::from(&color)).await
    }

    /// Send an arbitrary state update.
    pub async fn set_state(&self, light: &str, update: &StateUpdate) -> Result<Value> {
        let light = self.validate_light(light)?;
        self.put_state(&light, update).await
    }

    /// List the lights known to the bridge, keyed by light id.
    pub async fn list_lights(&self) -> Result<BTreeMap<String, LightDescriptor>> {
        let url = self.connection.lights_url();
        let body = self.transport.get(&url).await.map_err(|e| self.failed(e))?;

        serde_json::from_value(body)
            .map_err(|e| self.failed(TransportError::decode("GET", &url, e)))
    }

    async fn put_state(&self, light: &LightId, update: &StateUpdate) -> Result<Value> {
        if !update.is_valid() {
            return Err(self.validation_failed(ValidationError::EmptyUpdate));
        }

        let url = self.connection.state_url(light);
        let body = serde_json::to_value(update)
            .map_err(|e| self.failed(TransportError::encode("PUT", &url, e)))?;
        let response = self
            .transport
            .put(&url, &body)
            .await
            .map_err(|e| self.failed(e))?;

        for api_error in bridge_errors(&response) {
            let message = format!(
                "light {light}: bridge rejected {} ({}): {}",
                api_error.address, api_error.kind, api_error.description
            );
            warn!("{message}");
            self.sink.record(&Event::warn(Source::Bridge, message));
        }

        Ok(response)
    }

    fn validate_light(&self, light: &str) -> Result<LightId> {
        LightId::parse(light).map_err(|e| self.validation_failed(e))
    }

    fn validation_failed(&self, err: ValidationError) -> Error {
        self.sink.record(&Event::error(Source::Bridge, err.to_string()));
        err.into()
    }

    fn failed(&self, err: TransportError) -> Error {
        self.sink.record(&Event::error(Source::Bridge, err.to_string()));
        err.into()
    }
}

fn bridge_name(name: &Value) -> String {
    match name.as_str() {
        Some(name) => name.to_string(),
        None => name.to_string(),
    }
}
