use super::{Resolution, WeatherState};
use gtk4::prelude::*;

const ERROR_ICON: &str = "dialog-warning-symbolic";

/// Text and icon shown for a finished run
#[derive(Debug, PartialEq)]
pub struct CardContent {
    pub icon_name: &'static str,
    pub description: &'static str,
    pub headline: String,
    pub caption: String,
    pub warning: Option<String>,
}

impl CardContent {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        match resolution {
            Resolution::Success(report) | Resolution::Partial(report, _) => CardContent {
                icon_name: report.icon.icon_name(),
                description: report.icon.description(),
                headline: format!("{}°C", report.temperature_c),
                caption: report.city.clone(),
                warning: resolution.message().map(str::to_string),
            },
            Resolution::Failure(message) => CardContent {
                icon_name: ERROR_ICON,
                description: "Unavailable",
                headline: String::new(),
                caption: message.clone(),
                warning: None,
            },
        }
    }
}

/// Weather summary with a spinner while a run is in flight
pub struct WeatherCard {
    stack: gtk4::Stack,
    spinner: gtk4::Spinner,
    icon: gtk4::Image,
    headline: gtk4::Label,
    caption: gtk4::Label,
    warning: gtk4::Label,
}

impl WeatherCard {
    pub fn new() -> Self {
        let stack = gtk4::Stack::new();
        stack.set_transition_type(gtk4::StackTransitionType::Crossfade);
        stack.add_css_class("weather-card");
        stack.set_halign(gtk4::Align::End);
        stack.set_valign(gtk4::Align::Start);

        let spinner = gtk4::Spinner::new();
        spinner.set_size_request(32, 32);
        stack.add_named(&spinner, Some("loading"));

        let content = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);

        let icon = gtk4::Image::from_icon_name("dialog-question-symbolic");
        icon.set_pixel_size(48);
        content.append(&icon);

        let text = gtk4::Box::new(gtk4::Orientation::Vertical, 2);
        text.set_valign(gtk4::Align::Center);

        let headline = gtk4::Label::new(None);
        headline.add_css_class("title-1");
        headline.set_xalign(0.0);
        text.append(&headline);

        let caption = gtk4::Label::new(None);
        caption.set_xalign(0.0);
        caption.set_wrap(true);
        caption.set_max_width_chars(24);
        text.append(&caption);

        let warning = gtk4::Label::new(None);
        warning.add_css_class("caption");
        warning.add_css_class("warning");
        warning.set_xalign(0.0);
        warning.set_visible(false);
        text.append(&warning);

        content.append(&text);
        stack.add_named(&content, Some("ready"));

        let card = Self {
            stack,
            spinner,
            icon,
            headline,
            caption,
            warning,
        };
        card.set_state(&WeatherState::Loading);
        card
    }

    pub fn widget(&self) -> &gtk4::Stack {
        &self.stack
    }

    pub fn set_state(&self, state: &WeatherState) {
        match state {
            WeatherState::Loading => {
                self.spinner.set_spinning(true);
                self.stack.set_visible_child_name("loading");
            }
            WeatherState::Ready(resolution) => {
                let content = CardContent::from_resolution(resolution);
                self.icon.set_icon_name(Some(content.icon_name));
                self.icon.set_tooltip_text(Some(content.description));
                self.headline.set_text(&content.headline);
                self.headline.set_visible(!content.headline.is_empty());
                self.caption.set_text(&content.caption);
                match &content.warning {
                    Some(warning) => {
                        self.warning.set_text(warning);
                        self.warning.set_visible(true);
                    }
                    None => self.warning.set_visible(false),
                }
                self.spinner.set_spinning(false);
                self.stack.set_visible_child_name("ready");
            }
        }
    }
}

impl Default for WeatherCard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{WeatherIcon, WeatherReport};

    fn report() -> WeatherReport {
        WeatherReport {
            temperature_c: -3,
            city: "Reykjavík".to_string(),
            icon: WeatherIcon::Snow,
        }
    }

    #[test]
    fn test_success_content() {
        let content = CardContent::from_resolution(&Resolution::Success(report()));
        assert_eq!(
            content,
            CardContent {
                icon_name: "weather-snow-symbolic",
                description: "Snow",
                headline: "-3°C".to_string(),
                caption: "Reykjavík".to_string(),
                warning: None,
            }
        );
    }

    #[test]
    fn test_partial_content_carries_warning() {
        let content = CardContent::from_resolution(&Resolution::Partial(
            report(),
            "Location permission denied.".to_string(),
        ));
        assert_eq!(content.warning.as_deref(), Some("Location permission denied."));
        assert_eq!(content.headline, "-3°C");
    }

    #[test]
    fn test_failure_content() {
        let content = CardContent::from_resolution(&Resolution::Failure("Failed to fetch weather data.".into()));
        assert_eq!(content.icon_name, ERROR_ICON);
        assert_eq!(content.caption, "Failed to fetch weather data.");
        assert!(content.headline.is_empty());
    }
}
