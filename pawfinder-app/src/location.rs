//! Sources for the user's current position.
use async_trait::async_trait;
use pawfinder_common::{Coordinates, LocationError, PawError};
use pawfinder_config::{LocationProviderKind, LocationSettings};
use pawfinder_http::{HttpClient, RequestOpts};
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;

pub const IP_API_BASE: &str = "http://ip-api.com/";

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// One-shot position request.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;

    fn name(&self) -> &'static str;
}

/// Always answers with the same coordinates.
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// No location capability.
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Approximate position from the caller's public IP via ip-api.com.
pub struct IpLocation {
    http: HttpClient,
}

impl IpLocation {
    pub fn new(base: &str) -> Result<Self, PawError> {
        let http = HttpClient::new(base)
            .map_err(|e| PawError::Config(format!("Failed to create location client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl LocationProvider for IpLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let resp: IpApiResponse = self
            .http
            .get_json(
                "json",
                RequestOpts {
                    query: Some(vec![("fields", Cow::Borrowed("status,message,lat,lon"))]),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| LocationError::Failed(e.to_string()))?;

        if resp.status != "success" {
            return Err(LocationError::Failed(
                resp.message.unwrap_or_else(|| resp.status.clone()),
            ));
        }
        match (resp.lat, resp.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Failed("response missing lat/lon".into())),
        }
    }

    fn name(&self) -> &'static str {
        "ip"
    }
}

/// Pick the provider named in configuration. `fixed` needs both coordinates.
pub fn provider_from_settings(
    settings: &LocationSettings,
) -> Result<Arc<dyn LocationProvider>, PawError> {
    match settings.provider {
        LocationProviderKind::None => Ok(Arc::new(NoLocation)),
        LocationProviderKind::Ip => Ok(Arc::new(IpLocation::new(IP_API_BASE)?)),
        LocationProviderKind::Fixed => match (settings.latitude, settings.longitude) {
            (Some(lat), Some(lng)) => Ok(Arc::new(FixedLocation(Coordinates::new(lat, lng)))),
            _ => Err(PawError::Config(
                "location.provider is fixed but location.latitude/longitude are not both set"
                    .into(),
            )),
        },
    }
}
