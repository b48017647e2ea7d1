//! Large two-line clock.

use gtk4::glib;
use gtk4::prelude::*;
use std::time::Duration;

/// Zero-padded hour and minute lines for a 24-hour clock
pub fn clock_lines(hour: i32, minute: i32) -> (String, String) {
    (format!("{:02}", hour), format!("{:02}", minute))
}

pub struct Clock {
    widget: gtk4::Box,
    hours: gtk4::Label,
    minutes: gtk4::Label,
}

impl Clock {
    pub fn new() -> Self {
        let widget = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        widget.add_css_class("clock");
        widget.set_halign(gtk4::Align::Start);

        let hours = gtk4::Label::new(None);
        hours.add_css_class("clock-hours");
        hours.set_xalign(0.0);
        widget.append(&hours);

        let minutes = gtk4::Label::new(None);
        minutes.add_css_class("clock-minutes");
        minutes.set_xalign(0.0);
        widget.append(&minutes);

        let clock = Self {
            widget,
            hours,
            minutes,
        };
        clock.tick();
        clock.start();
        clock
    }

    pub fn widget(&self) -> &gtk4::Box {
        &self.widget
    }

    fn tick(&self) {
        update_labels(&self.hours, &self.minutes);
    }

    fn start(&self) {
        let hours = self.hours.downgrade();
        let minutes = self.minutes.downgrade();
        glib::timeout_add_local(Duration::from_secs(1), move || {
            let (Some(hours), Some(minutes)) = (hours.upgrade(), minutes.upgrade()) else {
                return glib::ControlFlow::Break;
            };
            update_labels(&hours, &minutes);
            glib::ControlFlow::Continue
        });
    }
}

fn update_labels(hours: &gtk4::Label, minutes: &gtk4::Label) {
    let Ok(now) = glib::DateTime::now_local() else {
        return;
    };
    let (h, m) = clock_lines(now.hour(), now.minute());
    if hours.text().as_str() != h {
        hours.set_text(&h);
    }
    if minutes.text().as_str() != m {
        minutes.set_text(&m);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
