//! Device location through GeoClue2 on the system bus.

use super::{Coordinates, Geolocator, LookupError};
use crate::config;
use gio::prelude::*;
use glib::{prelude::ToVariant, Variant};
use std::time::Duration;

const GEOCLUE_NAME: &str = "org.freedesktop.GeoClue2";
const MANAGER_PATH: &str = "/org/freedesktop/GeoClue2/Manager";
const MANAGER_IFACE: &str = "org.freedesktop.GeoClue2.Manager";
const CLIENT_IFACE: &str = "org.freedesktop.GeoClue2.Client";
const LOCATION_IFACE: &str = "org.freedesktop.GeoClue2.Location";

/// GClueAccuracyLevel "city"
const ACCURACY_CITY: u32 = 4;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Where the device position comes from
#[derive(Debug, Clone)]
pub enum DeviceLocator {
    /// Ask GeoClue, waiting at most `timeout` for a fix
    Geoclue { timeout: Duration },
    /// A position pinned in the configuration file
    Fixed(Coordinates),
    /// Geolocation turned off
    Disabled,
}

impl DeviceLocator {
    /// Pick a locator from the `[location]` configuration
    pub fn from_config(location: &crate::user_config::LocationConfig, timeout_secs: u32) -> Self {
        if !location.geolocation {
            return DeviceLocator::Disabled;
        }
        match location.fixed_position() {
            Some((lat, lon)) => DeviceLocator::Fixed(Coordinates::new(lat, lon)),
            None => DeviceLocator::Geoclue {
                timeout: Duration::from_secs(u64::from(timeout_secs)),
            },
        }
    }
}

impl Geolocator for DeviceLocator {
    async fn locate(&self) -> Result<Coordinates, LookupError> {
        match self {
            DeviceLocator::Fixed(at) => Ok(*at),
            DeviceLocator::Disabled => Err(LookupError::Unsupported),
            DeviceLocator::Geoclue { timeout } => {
                match glib::future_with_timeout(*timeout, geoclue_locate()).await {
                    Ok(result) => result,
                    Err(_) => {
                        log::warn!("GeoClue gave no position within {:?}", timeout);
                        Err(LookupError::Unsupported)
                    }
                }
            }
        }
    }
}

fn map_dbus_error(e: glib::Error) -> LookupError {
    if e.matches(gio::DBusError::AccessDenied) {
        LookupError::PermissionDenied
    } else {
        log::debug!("GeoClue error: {}", e);
        LookupError::Unsupported
    }
}

async fn proxy(path: &str, interface: &str) -> Result<gio::DBusProxy, LookupError> {
    gio::DBusProxy::for_bus_future(
        gio::BusType::System,
        gio::DBusProxyFlags::DO_NOT_LOAD_PROPERTIES,
        None,
        GEOCLUE_NAME,
        path,
        interface,
    )
    .await
    .map_err(map_dbus_error)
}

async fn call(proxy: &gio::DBusProxy, method: &str, args: Option<&Variant>) -> Result<Variant, LookupError> {
    proxy
        .call_future(method, args, gio::DBusCallFlags::NONE, -1)
        .await
        .map_err(map_dbus_error)
}

async fn get_property(proxy: &gio::DBusProxy, interface: &str, name: &str) -> Result<Variant, LookupError> {
    let reply = call(
        proxy,
        "org.freedesktop.DBus.Properties.Get",
        Some(&(interface, name).to_variant()),
    )
    .await?;
    reply
        .child_value(0)
        .as_variant()
        .ok_or_else(|| LookupError::Corrupt(format!("{} is not a variant", name)))
}

async fn set_property(proxy: &gio::DBusProxy, interface: &str, name: &str, value: Variant) -> Result<(), LookupError> {
    call(
        proxy,
        "org.freedesktop.DBus.Properties.Set",
        Some(&(interface, name, value).to_variant()),
    )
    .await
    .map(|_| ())
}

fn object_path(value: &Variant) -> Option<String> {
    value.str().map(str::to_string)
}

async fn geoclue_locate() -> Result<Coordinates, LookupError> {
    let manager = proxy(MANAGER_PATH, MANAGER_IFACE).await?;
    let reply = call(&manager, "GetClient", None).await?;
    let client_path = object_path(&reply.child_value(0))
        .ok_or_else(|| LookupError::Corrupt("GetClient returned no path".into()))?;

    let client = proxy(&client_path, CLIENT_IFACE).await?;
    set_property(&client, CLIENT_IFACE, "DesktopId", config::APP_ID.to_variant()).await?;
    set_property(&client, CLIENT_IFACE, "RequestedAccuracyLevel", ACCURACY_CITY.to_variant()).await?;
    call(&client, "Start", None).await?;
    log::debug!("GeoClue client {} started", client_path);

    // "/" until the first fix arrives
    let location_path = loop {
        let value = get_property(&client, CLIENT_IFACE, "Location").await?;
        match object_path(&value) {
            Some(path) if path != "/" => break path,
            _ => glib::timeout_future(POLL_INTERVAL).await,
        }
    };

    let location = proxy(&location_path, LOCATION_IFACE).await?;
    let latitude = get_property(&location, LOCATION_IFACE, "Latitude").await?.get::<f64>();
    let longitude = get_property(&location, LOCATION_IFACE, "Longitude").await?.get::<f64>();

    if let Err(e) = call(&client, "Stop", None).await {
        log::debug!("Failed to stop GeoClue client: {}", e);
    }

    match (latitude, longitude) {
        (Some(lat), Some(lon)) => {
            log::info!("Device located at {:.2}, {:.2}", lat, lon);
            Ok(Coordinates::new(lat, lon))
        }
        _ => Err(LookupError::Corrupt("location without coordinates".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_config::LocationConfig;
    use futures::executor::block_on;

    #[test]
    fn test_fixed_position_from_config() {
        let location = LocationConfig {
            geolocation: true,
            latitude: Some(48.85),
            longitude: Some(2.35),
        };
        let locator = DeviceLocator::from_config(&location, 10);
        assert_eq!(block_on(locator.locate()), Ok(Coordinates::new(48.85, 2.35)));
    }

    #[test]
    fn test_disabled_is_unsupported() {
        let location = LocationConfig {
            geolocation: false,
            latitude: Some(48.85),
            longitude: Some(2.35),
        };
        let locator = DeviceLocator::from_config(&location, 10);
        assert_eq!(block_on(locator.locate()), Err(LookupError::Unsupported));
    }

    #[test]
    fn test_default_uses_geoclue_with_timeout() {
        let locator = DeviceLocator::from_config(&LocationConfig::default(), 7);
        assert!(matches!(
            locator,
            DeviceLocator::Geoclue { timeout } if timeout == Duration::from_secs(7)
        ));
    }

    #[test]
    fn test_object_path_extraction() {
        assert_eq!(
            object_path(&"/org/freedesktop/GeoClue2/Client/1".to_variant()).as_deref(),
            Some("/org/freedesktop/GeoClue2/Client/1")
        );
        assert_eq!(object_path(&42u32.to_variant()), None);
    }
}
