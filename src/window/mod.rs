mod imp;

use crate::application::{AppState, StartpageApplication};
use glib::subclass::prelude::*;
use gtk4::prelude::*;
use gtk4::{gio, glib};
use std::rc::Rc;

glib::wrapper! {
    pub struct StartpageWindow(ObjectSubclass<imp::StartpageWindow>)
        @extends libadwaita::ApplicationWindow, gtk4::ApplicationWindow, gtk4::Window, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget, gtk4::Native, gtk4::Root, gtk4::ShortcutManager, gio::ActionGroup, gio::ActionMap;
}

impl StartpageWindow {
    pub fn new(app: &StartpageApplication, state: Rc<AppState>) -> Self {
        let window: Self = glib::Object::builder()
            .property("application", app)
            .build();
        window.imp().setup(state);
        window
    }

    pub fn focus_search(&self) {
        self.imp().focus_search();
    }

    /// Show a transient message at the bottom of the window
    pub fn show_toast(&self, message: &str) {
        self.imp().toast_overlay.add_toast(libadwaita::Toast::new(message));
    }

    /// Open `uri` in the default browser
    pub fn launch_uri(&self, uri: &str) {
        log::info!("Opening {}", uri);
        let launcher = gtk4::UriLauncher::new(uri);
        let window = self.downgrade();
        launcher.launch(Some(self), gio::Cancellable::NONE, move |result| {
            if let Err(e) = result {
                log::warn!("Failed to open link: {}", e);
                if let Some(window) = window.upgrade() {
                    window.show_toast("Could not open link");
                }
            }
        });
    }
}
