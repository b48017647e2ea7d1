//! Settings dialog.

use super::{wallpaper_preset_name, Preferences, SearchEngine};
use crate::{config, datauri, favorites};
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{gio, glib};
use libadwaita::prelude::*;
use libadwaita::subclass::prelude::*;
use std::rc::Rc;

/// Index of the "Custom" entry in the wallpaper combo
fn custom_wallpaper_index() -> u32 {
    config::WALLPAPER_PRESETS.len() as u32
}

/// Combo position for the current wallpaper: the matching preset, or
/// "Custom"
fn wallpaper_index(url: &str) -> u32 {
    config::WALLPAPER_PRESETS
        .iter()
        .position(|(_, preset)| *preset == url)
        .map(|i| i as u32)
        .unwrap_or_else(custom_wallpaper_index)
}

fn engine_index(engine: &SearchEngine) -> u32 {
    config::SEARCH_ENGINES
        .iter()
        .position(|(name, _)| *name == engine.name)
        .unwrap_or(0) as u32
}

mod imp {
    use super::*;
    use std::cell::OnceCell;

    #[derive(Default)]
    pub struct PreferencesDialog {
        pub prefs: OnceCell<Rc<Preferences>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PreferencesDialog {
        const NAME: &'static str = "StartpagePreferencesDialog";
        type Type = super::PreferencesDialog;
        type ParentType = libadwaita::PreferencesDialog;
    }

    impl ObjectImpl for PreferencesDialog {}
    impl WidgetImpl for PreferencesDialog {}
    impl AdwDialogImpl for PreferencesDialog {}
    impl PreferencesDialogImpl for PreferencesDialog {}
}

glib::wrapper! {
    pub struct PreferencesDialog(ObjectSubclass<imp::PreferencesDialog>)
        @extends libadwaita::PreferencesDialog, libadwaita::Dialog, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget, gtk4::ShortcutManager;
}

impl PreferencesDialog {
    pub fn new(prefs: Rc<Preferences>) -> Self {
        let obj: Self = glib::Object::builder()
            .property("search-enabled", false)
            .build();
        let _ = obj.imp().prefs.set(prefs);
        obj.build_pages();
        obj
    }

    fn prefs(&self) -> Option<&Rc<Preferences>> {
        self.imp().prefs.get()
    }

    fn build_pages(&self) {
        let Some(prefs) = self.prefs().cloned() else {
            return;
        };

        let page = libadwaita::PreferencesPage::new();
        page.set_title("General");
        page.set_icon_name(Some("preferences-system-symbolic"));

        page.add(&self.build_wallpaper_group(&prefs));
        page.add(&self.build_search_group(&prefs));
        page.add(&self.build_weather_group(&prefs));
        page.add(&self.build_reset_group());

        self.add(&page);
    }

    fn build_wallpaper_group(&self, prefs: &Rc<Preferences>) -> libadwaita::PreferencesGroup {
        let group = libadwaita::PreferencesGroup::new();
        group.set_title("Background");

        // Presets, then "Custom" for anything else
        let mut names: Vec<&str> = config::WALLPAPER_PRESETS.iter().map(|(name, _)| *name).collect();
        names.push("Custom");
        let preset_row = libadwaita::ComboRow::new();
        preset_row.set_title("Wallpaper");
        preset_row.set_model(Some(&gtk4::StringList::new(&names)));
        let current = prefs.wallpaper();
        preset_row.set_selected(wallpaper_index(&current));
        group.add(&preset_row);

        let url_row = libadwaita::EntryRow::new();
        url_row.set_title("Image URL");
        url_row.set_show_apply_button(true);
        url_row.set_input_purpose(gtk4::InputPurpose::Url);
        if wallpaper_preset_name(&current).is_none() && !datauri::is_data_uri(&current) {
            url_row.set_text(&current);
        }
        group.add(&url_row);

        let upload_row = libadwaita::ActionRow::new();
        upload_row.set_title("Upload Image");
        upload_row.set_subtitle("Stored with your preferences");
        let upload_button = gtk4::Button::from_icon_name("document-open-symbolic");
        upload_button.set_valign(gtk4::Align::Center);
        upload_button.add_css_class("flat");
        upload_button.set_tooltip_text(Some("Choose Image"));
        upload_row.add_suffix(&upload_button);
        upload_row.set_activatable_widget(Some(&upload_button));
        group.add(&upload_row);

        let blur_row = libadwaita::SpinRow::with_range(
            f64::from(config::MIN_BLUR),
            f64::from(config::MAX_BLUR),
            1.0,
        );
        blur_row.set_title("Blur");
        blur_row.set_subtitle("Pixels");
        blur_row.set_value(f64::from(prefs.blur()));
        group.add(&blur_row);

        let prefs_for_preset = Rc::clone(prefs);
        preset_row.connect_selected_notify(move |row| {
            let index = row.selected() as usize;
            if let Some((name, url)) = config::WALLPAPER_PRESETS.get(index) {
                log::debug!("Wallpaper preset '{}' selected", name);
                prefs_for_preset.set_wallpaper(url);
            }
        });

        let prefs_for_url = Rc::clone(prefs);
        url_row.connect_apply(glib::clone!(
            #[weak]
            preset_row,
            move |row| {
                let url = row.text();
                if url.trim().is_empty() {
                    return;
                }
                prefs_for_url.set_wallpaper(&url);
                preset_row.set_selected(wallpaper_index(&prefs_for_url.wallpaper()));
            }
        ));

        let prefs_for_upload = Rc::clone(prefs);
        upload_button.connect_clicked(glib::clone!(
            #[weak(rename_to = dialog)]
            self,
            #[weak]
            preset_row,
            move |_| {
                dialog.choose_wallpaper(Rc::clone(&prefs_for_upload), preset_row);
            }
        ));

        let prefs_for_blur = Rc::clone(prefs);
        blur_row.connect_value_notify(move |row| {
            prefs_for_blur.set_blur(row.value().round() as i32);
        });

        group
    }

    fn choose_wallpaper(&self, prefs: Rc<Preferences>, preset_row: libadwaita::ComboRow) {
        let file_dialog = gtk4::FileDialog::builder()
            .title("Choose Wallpaper")
            .default_filter(&favorites::image_filter())
            .modal(true)
            .build();

        let window = self.root().and_downcast::<gtk4::Window>();
        file_dialog.open(window.as_ref(), gio::Cancellable::NONE, move |result| {
            let Some(path) = result.ok().and_then(|file| file.path()) else {
                return;
            };
            match datauri::from_file(&path) {
                Ok(uri) => {
                    log::info!("Wallpaper uploaded from {:?}", path);
                    prefs.set_wallpaper(&uri);
                    preset_row.set_selected(custom_wallpaper_index());
                }
                Err(e) => log::warn!("Failed to read wallpaper {:?}: {}", path, e),
            }
        });
    }

    fn build_search_group(&self, prefs: &Rc<Preferences>) -> libadwaita::PreferencesGroup {
        let group = libadwaita::PreferencesGroup::new();
        group.set_title("Search");

        let names: Vec<&str> = config::SEARCH_ENGINES.iter().map(|(name, _)| *name).collect();
        let engine_row = libadwaita::ComboRow::new();
        engine_row.set_title("Search Engine");
        engine_row.set_model(Some(&gtk4::StringList::new(&names)));
        engine_row.set_selected(engine_index(&prefs.search_engine()));
        group.add(&engine_row);

        let prefs = Rc::clone(prefs);
        engine_row.connect_selected_notify(move |row| {
            let index = row.selected() as usize;
            if let Some(engine) = SearchEngine::catalog().get(index) {
                prefs.set_search_engine(engine);
            }
        });

        group
    }

    fn build_weather_group(&self, prefs: &Rc<Preferences>) -> libadwaita::PreferencesGroup {
        let group = libadwaita::PreferencesGroup::new();
        group.set_title("Weather");
        group.set_description(Some("Leave the city empty to use your current location"));

        let city_row = libadwaita::EntryRow::new();
        city_row.set_title("City");
        city_row.set_show_apply_button(true);
        city_row.set_text(&prefs.user_city());
        group.add(&city_row);

        let prefs = Rc::clone(prefs);
        city_row.connect_apply(move |row| {
            prefs.set_user_city(&row.text());
        });

        group
    }

    fn build_reset_group(&self) -> libadwaita::PreferencesGroup {
        let group = libadwaita::PreferencesGroup::new();

        let reset_row = libadwaita::ActionRow::new();
        reset_row.set_title("Reset to Defaults");
        reset_row.set_subtitle("Favorites, background, search engine and weather city");
        let reset_button = gtk4::Button::with_label("Reset");
        reset_button.set_valign(gtk4::Align::Center);
        reset_button.add_css_class("destructive-action");
        reset_row.add_suffix(&reset_button);
        group.add(&reset_row);

        reset_button.connect_clicked(glib::clone!(
            #[weak(rename_to = dialog)]
            self,
            move |_| {
                dialog.confirm_reset();
            }
        ));

        group
    }

    fn confirm_reset(&self) {
        let confirm = libadwaita::AlertDialog::new(
            Some("Reset Preferences?"),
            Some("All favorites and settings will be restored to their defaults."),
        );
        confirm.add_response("cancel", "Cancel");
        confirm.add_response("reset", "Reset");
        confirm.set_response_appearance("reset", libadwaita::ResponseAppearance::Destructive);
        confirm.set_default_response(Some("cancel"));
        confirm.set_close_response("cancel");

        confirm.connect_response(
            None,
            glib::clone!(
                #[weak(rename_to = dialog)]
                self,
                move |_, response| {
                    if response != "reset" {
                        return;
                    }
                    if let Some(prefs) = dialog.prefs() {
                        prefs.reset();
                    }
                    // Rows would show stale values
                    dialog.close();
                }
            ),
        );

        confirm.present(Some(self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallpaper_index() {
        let (_, coast) = config::WALLPAPER_PRESETS[1];
        assert_eq!(wallpaper_index(coast), 1);
        assert_eq!(wallpaper_index("https://example.com/bg.jpg"), custom_wallpaper_index());
        assert_eq!(wallpaper_index(config::DEFAULT_WALLPAPER), custom_wallpaper_index());
    }

    #[test]
    fn test_engine_index() {
        assert_eq!(engine_index(&SearchEngine::default()), 0);
        assert_eq!(engine_index(&SearchEngine::by_name("Perplexity").unwrap()), 3);
    }
}
