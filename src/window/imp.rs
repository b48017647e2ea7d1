use crate::application::AppState;
use crate::clock::Clock;
use crate::config;
use crate::favorites::{AddFavoriteDialog, FavoritesGrid, FavoritesRegistry};
use crate::image;
use crate::preferences::PreferenceKey;
use crate::search;
use crate::weather::WeatherCard;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::glib;
use libadwaita::prelude::*;
use libadwaita::subclass::prelude::*;
use std::cell::{Cell, OnceCell};
use std::rc::Rc;

/// CSS for the wallpaper blur
pub(super) fn blur_css(px: i32) -> String {
    format!(".wallpaper {{ filter: blur({}px); }}", px)
}

#[derive(Default)]
pub struct StartpageWindow {
    pub state: OnceCell<Rc<AppState>>,

    pub toast_overlay: libadwaita::ToastOverlay,
    pub wallpaper: gtk4::Picture,
    pub search_entry: gtk4::Entry,
    pub blur_provider: gtk4::CssProvider,

    pub clock: OnceCell<Clock>,
    pub weather_card: OnceCell<WeatherCard>,
    pub favorites_grid: OnceCell<Rc<FavoritesGrid>>,

    /// Bumped per wallpaper load; older loads don't overwrite newer ones
    pub wallpaper_generation: Cell<u64>,
}

#[glib::object_subclass]
impl ObjectSubclass for StartpageWindow {
    const NAME: &'static str = "StartpageWindow";
    type Type = super::StartpageWindow;
    type ParentType = libadwaita::ApplicationWindow;
}

impl ObjectImpl for StartpageWindow {
    fn constructed(&self) {
        self.parent_constructed();

        let obj = self.obj();
        obj.set_title(Some(config::APP_NAME));
        obj.set_default_size(config::DEFAULT_WINDOW_WIDTH, config::DEFAULT_WINDOW_HEIGHT);
    }
}

impl WidgetImpl for StartpageWindow {}
impl WindowImpl for StartpageWindow {}
impl ApplicationWindowImpl for StartpageWindow {}
impl AdwApplicationWindowImpl for StartpageWindow {}

impl StartpageWindow {
    /// Build the page once the shared state is known
    pub fn setup(&self, state: Rc<AppState>) {
        let obj = self.obj();

        gtk4::style_context_add_provider_for_display(
            &WidgetExt::display(&*obj),
            &self.blur_provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );

        // Wallpaper below, page content on top
        let overlay = gtk4::Overlay::new();
        self.wallpaper.set_content_fit(gtk4::ContentFit::Cover);
        self.wallpaper.set_can_shrink(true);
        self.wallpaper.add_css_class("wallpaper");
        overlay.set_child(Some(&self.wallpaper));

        let content = gtk4::Box::new(gtk4::Orientation::Vertical, 32);
        content.add_css_class("startpage-content");
        overlay.add_overlay(&content);

        // Top row: clock, weather, settings
        let top = gtk4::Box::new(gtk4::Orientation::Horizontal, 24);
        let clock = Clock::new();
        clock.widget().set_hexpand(true);
        top.append(clock.widget());

        let weather_card = WeatherCard::new();
        weather_card.set_state(&state.weather.state());
        top.append(weather_card.widget());

        let settings_button = gtk4::Button::from_icon_name("emblem-system-symbolic");
        settings_button.add_css_class("flat");
        settings_button.add_css_class("circular");
        settings_button.add_css_class("settings-button");
        settings_button.set_valign(gtk4::Align::Start);
        settings_button.set_tooltip_text(Some("Settings"));
        settings_button.set_action_name(Some("app.preferences"));
        top.append(&settings_button);
        content.append(&top);

        // Search and favorites, centered
        let center = gtk4::Box::new(gtk4::Orientation::Vertical, 32);
        center.set_vexpand(true);
        center.set_valign(gtk4::Align::Center);
        center.set_halign(gtk4::Align::Center);
        center.set_width_request(560);

        self.search_entry.add_css_class("search-entry");
        self.search_entry.set_hexpand(true);
        self.search_entry.set_input_purpose(gtk4::InputPurpose::Url);
        self.search_entry
            .set_primary_icon_name(Some("system-search-symbolic"));
        center.append(&self.search_entry);

        let favorites_grid = FavoritesGrid::new(state.http.clone(), &state.config.services.favicon_url);
        favorites_grid.set_favorites(&FavoritesRegistry::new(&state.prefs).list());
        center.append(favorites_grid.widget());
        content.append(&center);

        self.toast_overlay.set_child(Some(&overlay));
        obj.set_content(Some(&self.toast_overlay));

        let _ = self.clock.set(clock);
        let _ = self.weather_card.set(weather_card);
        let _ = self.favorites_grid.set(Rc::clone(&favorites_grid));
        let _ = self.state.set(Rc::clone(&state));

        self.connect_search();
        self.connect_favorites(&favorites_grid);
        self.connect_state(&state);

        self.apply_blur(state.prefs.blur());
        self.load_wallpaper();
        self.update_search_placeholder();
        self.focus_search();
    }

    fn connect_search(&self) {
        let obj = (*self.obj()).clone();
        self.search_entry.connect_activate(glib::clone!(
            #[weak]
            obj,
            move |entry| {
                let Some(state) = obj.imp().state.get() else {
                    return;
                };
                let Some(url) = search::resolve(&state.prefs.search_engine(), &entry.text()) else {
                    return;
                };
                obj.launch_uri(url.as_str());
                entry.set_text("");
            }
        ));
    }

    fn connect_favorites(&self, grid: &Rc<FavoritesGrid>) {
        let obj = (*self.obj()).clone();

        grid.connect_open(glib::clone!(
            #[weak]
            obj,
            move |url| {
                obj.launch_uri(url);
            }
        ));

        grid.connect_remove(glib::clone!(
            #[weak]
            obj,
            move |id| {
                if let Some(state) = obj.imp().state.get() {
                    FavoritesRegistry::new(&state.prefs).remove(id);
                }
            }
        ));

        grid.connect_add(glib::clone!(
            #[weak]
            obj,
            move || {
                obj.imp().show_add_favorite();
            }
        ));
    }

    fn connect_state(&self, state: &Rc<AppState>) {
        let weak = self.obj().downgrade();
        state.prefs.connect_changed(move |key| {
            if let Some(obj) = weak.upgrade() {
                obj.imp().on_preference_changed(key);
            }
        });

        let weak = self.obj().downgrade();
        state.weather.connect_state_changed(move |weather| {
            if let Some(obj) = weak.upgrade() {
                if let Some(card) = obj.imp().weather_card.get() {
                    card.set_state(weather);
                }
            }
        });
    }

    fn on_preference_changed(&self, key: PreferenceKey) {
        let Some(state) = self.state.get() else {
            return;
        };
        match key {
            PreferenceKey::Favorites => {
                if let Some(grid) = self.favorites_grid.get() {
                    grid.set_favorites(&FavoritesRegistry::new(&state.prefs).list());
                }
            }
            PreferenceKey::Wallpaper => self.load_wallpaper(),
            PreferenceKey::Blur => self.apply_blur(state.prefs.blur()),
            PreferenceKey::SearchEngine => self.update_search_placeholder(),
            // Weather runs are started by the application
            PreferenceKey::UserCity => {}
        }
    }

    fn show_add_favorite(&self) {
        let obj = (*self.obj()).clone();
        let dialog = AddFavoriteDialog::new();
        dialog.present(&obj, glib::clone!(
            #[weak]
            obj,
            move |entry| {
                let Some(state) = obj.imp().state.get() else {
                    return;
                };
                match FavoritesRegistry::new(&state.prefs).add(&entry.name, &entry.url, entry.icon) {
                    Ok(favorite) => log::debug!("Favorite {} added from dialog", favorite.id),
                    Err(e) => obj.show_toast(&e.to_string()),
                }
            }
        ));
    }

    fn apply_blur(&self, px: i32) {
        self.blur_provider.load_from_string(&blur_css(px));
    }

    fn update_search_placeholder(&self) {
        if let Some(state) = self.state.get() {
            let engine = state.prefs.search_engine();
            self.search_entry
                .set_placeholder_text(Some(&format!("Search {} or type a URL", engine.name)));
        }
    }

    fn load_wallpaper(&self) {
        let Some(state) = self.state.get() else {
            return;
        };
        let source = state.prefs.wallpaper();
        let generation = self.wallpaper_generation.get() + 1;
        self.wallpaper_generation.set(generation);

        let http = state.http.clone();
        let obj = (*self.obj()).clone();
        glib::spawn_future_local(glib::clone!(
            #[weak]
            obj,
            async move {
                let result = image::load_texture(&http, &source).await;
                let imp = obj.imp();
                if imp.wallpaper_generation.get() != generation {
                    log::debug!("Dropping superseded wallpaper load");
                    return;
                }
                match result {
                    Ok(texture) => imp.wallpaper.set_paintable(Some(&texture)),
                    Err(e) => {
                        log::warn!("Failed to load wallpaper: {}", e);
                        imp.wallpaper.set_paintable(gtk4::gdk::Paintable::NONE);
                        obj.show_toast("Could not load wallpaper");
                    }
                }
            }
        ));
    }

    pub fn focus_search(&self) {
        self.search_entry.grab_focus();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_css() {
        assert_eq!(blur_css(12), ".wallpaper { filter: blur(12px); }");
        assert_eq!(blur_css(0), ".wallpaper { filter: blur(0px); }");
    }
}
