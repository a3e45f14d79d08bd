//! Registration glue that exposes an analytics client to the rest of an SDK.
//!
//! Handles are passed in already resolved: the caller builds the
//! [`AppHandle`] and [`InstallationsProvider`] and hands them to
//! [`register_analytics`]. The only fallible step left is adapting a client
//! obtained elsewhere through [`AnalyticsInternal::from_lookup`].

mod error;
mod registry;

use log::{debug, trace};
use serde_json::{Map, Value};
use std::sync::Arc;

pub use error::InteropError;
pub use registry::{ComponentVersion, VersionRegistry};

/// Name the analytics component registers under.
pub const ANALYTICS_COMPONENT: &str = "analytics";
/// Version reported for the analytics component.
pub const ANALYTICS_VERSION: &str = env!("CARGO_PKG_VERSION");

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type EventParams = Map<String, Value>;

/// Application the analytics client belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppHandle {
    pub name: String,
    pub app_id: String,
    pub measurement_id: Option<String>,
}

/// Source of the per-installation identity analytics reports against.
pub trait InstallationsProvider: Send + Sync {
    fn installation_id(&self) -> Result<String, BoxError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Apply to every configured property instead of the default one
    pub global: bool,
}

pub trait AnalyticsClient: Send + Sync {
    fn log_event(&self, name: &str, params: &EventParams, options: &CallOptions);
}

/// Builds an analytics client for an app.
pub trait AnalyticsFactory {
    fn create(
        &self,
        app: &AppHandle,
        installations: Arc<dyn InstallationsProvider>,
    ) -> Arc<dyn AnalyticsClient>;
}

impl<F> AnalyticsFactory for F
where
    F: Fn(&AppHandle, Arc<dyn InstallationsProvider>) -> Arc<dyn AnalyticsClient>,
{
    fn create(
        &self,
        app: &AppHandle,
        installations: Arc<dyn InstallationsProvider>,
    ) -> Arc<dyn AnalyticsClient> {
        self(app, installations)
    }
}

/// Creates the public analytics client and records the component version.
pub fn register_analytics<F>(
    registry: &mut VersionRegistry,
    factory: &F,
    app: &AppHandle,
    installations: Arc<dyn InstallationsProvider>,
) -> Arc<dyn AnalyticsClient>
where
    F: AnalyticsFactory + ?Sized,
{
    debug!("Registering {} {} for app '{}'", ANALYTICS_COMPONENT, ANALYTICS_VERSION, app.name);
    let client = factory.create(app, installations);
    registry.register(ANALYTICS_COMPONENT, ANALYTICS_VERSION, None);
    client
}

/// Internal view of the analytics client used by other SDK components.
/// It can only log events.
#[derive(Clone)]
pub struct AnalyticsInternal {
    client: Arc<dyn AnalyticsClient>,
}

impl AnalyticsInternal {
    pub fn new(client: Arc<dyn AnalyticsClient>) -> Self {
        Self { client }
    }

    /// Adapts a client produced by `lookup`. Any lookup failure is reported
    /// as `InteropComponentRegistrationFailed`, keeping the cause.
    pub fn from_lookup<L, E>(lookup: L) -> Result<Self, InteropError>
    where
        L: FnOnce() -> Result<Arc<dyn AnalyticsClient>, E>,
        E: Into<BoxError>,
    {
        lookup()
            .map(Self::new)
            .map_err(|e| InteropError::InteropComponentRegistrationFailed { source: e.into() })
    }

    pub fn log_event(&self, name: &str, params: &EventParams, options: &CallOptions) {
        trace!("Forwarding event '{}' ({} params)", name, params.len());
        self.client.log_event(name, params, options);
    }
}
