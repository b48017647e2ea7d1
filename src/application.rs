use crate::config;
use crate::http::HttpClient;
use crate::preferences::{PreferenceKey, Preferences, PreferencesDialog};
use crate::storage::Store;
use crate::user_config::{self, UserConfig};
use crate::weather::{DeviceLocator, OpenMeteoServices, SystemWeather, WeatherController, WeatherResolver};
use crate::window::StartpageWindow;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{gio, glib};
use libadwaita::prelude::*;
use libadwaita::subclass::prelude::*;
use std::cell::OnceCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Everything the windows share
pub struct AppState {
    pub config: UserConfig,
    pub prefs: Rc<Preferences>,
    pub http: HttpClient,
    pub weather: Rc<SystemWeather>,
}

impl AppState {
    fn load() -> Self {
        let config = UserConfig::load();

        let data_dir = user_config::data_dir().unwrap_or_else(|| {
            log::warn!("No data directory available, using the working directory");
            PathBuf::from(".")
        });
        let store = Store::open(config.storage.backend, &data_dir);
        let prefs = Rc::new(Preferences::load(store));

        let http = HttpClient::new(config.network.timeout_secs);
        let services = OpenMeteoServices::new(http.clone(), config.services.clone());
        let locator = DeviceLocator::from_config(&config.location, config.network.timeout_secs);
        log::debug!("Geolocation via {:?}", locator);
        let weather = WeatherController::new(WeatherResolver::new(services, locator));

        Self {
            config,
            prefs,
            http,
            weather,
        }
    }

    /// Start a weather run for the configured city
    pub fn refresh_weather(&self) {
        let city = self.prefs.user_city();
        glib::spawn_future_local(self.weather.refresh(&city));
    }
}

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct StartpageApplication {
        pub state: OnceCell<Rc<AppState>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for StartpageApplication {
        const NAME: &'static str = "StartpageApplication";
        type Type = super::StartpageApplication;
        type ParentType = libadwaita::Application;
    }

    impl ObjectImpl for StartpageApplication {}

    impl ApplicationImpl for StartpageApplication {
        fn activate(&self) {
            let app = self.obj();

            if let Some(window) = app.active_window() {
                window.present();
                return;
            }

            let Some(state) = self.state.get() else {
                log::error!("Activated before startup completed");
                return;
            };
            let window = StartpageWindow::new(&app, Rc::clone(state));
            window.present();
        }

        fn startup(&self) {
            self.parent_startup();

            let app = self.obj();
            app.load_css();

            let state = Rc::new(AppState::load());

            // A new city means a new weather run
            let state_weak = Rc::downgrade(&state);
            state.prefs.connect_changed(move |key| {
                if key == PreferenceKey::UserCity {
                    if let Some(state) = state_weak.upgrade() {
                        state.refresh_weather();
                    }
                }
            });
            state.refresh_weather();

            if self.state.set(state).is_err() {
                log::warn!("Application state already initialized");
            }

            app.setup_actions();
            app.setup_accels();
        }
    }

    impl GtkApplicationImpl for StartpageApplication {}
    impl AdwApplicationImpl for StartpageApplication {}
}

glib::wrapper! {
    pub struct StartpageApplication(ObjectSubclass<imp::StartpageApplication>)
        @extends libadwaita::Application, gtk4::Application, gio::Application,
        @implements gio::ActionGroup, gio::ActionMap;
}

impl StartpageApplication {
    pub fn new() -> Self {
        glib::Object::builder()
            .property("application-id", config::APP_ID)
            .build()
    }

    pub fn state(&self) -> Option<&Rc<AppState>> {
        self.imp().state.get()
    }

    fn load_css(&self) {
        let Some(display) = gtk4::gdk::Display::default() else {
            log::warn!("No display, skipping CSS");
            return;
        };

        let provider = gtk4::CssProvider::new();
        provider.load_from_string(include_str!("style.css"));
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );

        log::info!("CSS loaded");
    }

    fn main_window(&self) -> Option<StartpageWindow> {
        self.active_window().and_downcast::<StartpageWindow>()
    }

    fn setup_actions(&self) {
        let quit_action = gio::SimpleAction::new("quit", None);
        quit_action.connect_activate(glib::clone!(
            #[weak(rename_to = app)]
            self,
            move |_, _| {
                app.quit();
            }
        ));
        self.add_action(&quit_action);

        let preferences_action = gio::SimpleAction::new("preferences", None);
        preferences_action.connect_activate(glib::clone!(
            #[weak(rename_to = app)]
            self,
            move |_, _| {
                app.show_preferences();
            }
        ));
        self.add_action(&preferences_action);

        let focus_search_action = gio::SimpleAction::new("focus-search", None);
        focus_search_action.connect_activate(glib::clone!(
            #[weak(rename_to = app)]
            self,
            move |_, _| {
                if let Some(window) = app.main_window() {
                    window.focus_search();
                }
            }
        ));
        self.add_action(&focus_search_action);

        let refresh_weather_action = gio::SimpleAction::new("refresh-weather", None);
        refresh_weather_action.connect_activate(glib::clone!(
            #[weak(rename_to = app)]
            self,
            move |_, _| {
                if let Some(state) = app.state() {
                    state.refresh_weather();
                }
            }
        ));
        self.add_action(&refresh_weather_action);

        let about_action = gio::SimpleAction::new("about", None);
        about_action.connect_activate(glib::clone!(
            #[weak(rename_to = app)]
            self,
            move |_, _| {
                app.show_about();
            }
        ));
        self.add_action(&about_action);
    }

    fn setup_accels(&self) {
        self.set_accels_for_action("app.quit", &["<Control>q"]);
        self.set_accels_for_action("app.preferences", &["<Control>comma"]);
        self.set_accels_for_action("app.focus-search", &["<Control>l", "<Control>k"]);
        self.set_accels_for_action("app.refresh-weather", &["F5"]);
    }

    fn show_about(&self) {
        let about = libadwaita::AboutDialog::builder()
            .application_name(config::APP_NAME)
            .version(config::APP_VERSION)
            .application_icon(config::APP_ID)
            .developer_name("myyc")
            .license_type(gtk4::License::Gpl30)
            .website("https://github.com/myyc/startpage")
            .issue_url("https://github.com/myyc/startpage/issues")
            .comments("Clock, weather, search and favorites on a new tab")
            .build();

        if let Some(window) = self.active_window() {
            about.present(Some(&window));
        }
    }

    fn show_preferences(&self) {
        let (Some(window), Some(state)) = (self.active_window(), self.state()) else {
            return;
        };

        let dialog = PreferencesDialog::new(Rc::clone(&state.prefs));
        dialog.present(Some(&window));
    }
}

impl Default for StartpageApplication {
    fn default() -> Self {
        Self::new()
    }
}
