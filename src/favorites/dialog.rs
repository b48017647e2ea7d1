//! Add-favorite dialog.

use crate::datauri;
use gtk4::prelude::*;
use gtk4::{gio, glib};
use libadwaita::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Values entered in the dialog, not yet validated
#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub name: String,
    pub url: String,
    /// Uploaded icon as a `data:` URI
    pub icon: Option<String>,
}

/// Whether the entered values are worth submitting
fn can_submit(name: &str, url: &str) -> bool {
    !name.trim().is_empty() && !url.trim().is_empty()
}

/// Dialog for adding a favorite
pub struct AddFavoriteDialog {
    dialog: libadwaita::AlertDialog,
    name_entry: gtk4::Entry,
    url_entry: gtk4::Entry,
    icon: Rc<RefCell<Option<String>>>,
}

impl AddFavoriteDialog {
    pub fn new() -> Self {
        let dialog = libadwaita::AlertDialog::new(Some("Add Favorite"), None);

        let content = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
        content.set_margin_top(12);
        content.set_margin_bottom(12);
        content.set_margin_start(12);
        content.set_margin_end(12);

        let name_entry = gtk4::Entry::new();
        name_entry.set_placeholder_text(Some("Name"));
        content.append(&name_entry);

        let url_entry = gtk4::Entry::new();
        url_entry.set_placeholder_text(Some("example.com"));
        url_entry.set_input_purpose(gtk4::InputPurpose::Url);
        content.append(&url_entry);

        let icon_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
        let icon_preview = gtk4::Image::from_icon_name("image-x-generic-symbolic");
        icon_preview.set_pixel_size(32);
        icon_box.append(&icon_preview);
        let icon_button = gtk4::Button::with_label("Upload Icon…");
        icon_button.set_hexpand(true);
        icon_box.append(&icon_button);
        content.append(&icon_box);

        dialog.set_extra_child(Some(&content));

        dialog.add_response("cancel", "Cancel");
        dialog.add_response("add", "Add");
        dialog.set_response_appearance("add", libadwaita::ResponseAppearance::Suggested);
        dialog.set_response_enabled("add", false);
        dialog.set_default_response(Some("add"));
        dialog.set_close_response("cancel");

        let update_sensitivity = glib::clone!(
            #[weak]
            dialog,
            #[weak]
            name_entry,
            #[weak]
            url_entry,
            move || {
                dialog.set_response_enabled("add", can_submit(&name_entry.text(), &url_entry.text()));
            }
        );
        let update = Rc::new(update_sensitivity);
        let update_clone = Rc::clone(&update);
        name_entry.connect_changed(move |_| update_clone());
        url_entry.connect_changed(move |_| update());

        let icon = Rc::new(RefCell::new(None));
        let icon_for_upload = Rc::clone(&icon);
        icon_button.connect_clicked(glib::clone!(
            #[weak]
            dialog,
            #[weak]
            icon_preview,
            move |button| {
                choose_icon(&dialog, button, &icon_preview, Rc::clone(&icon_for_upload));
            }
        ));

        Self {
            dialog,
            name_entry,
            url_entry,
            icon,
        }
    }

    /// Present the dialog and call `callback` when the user confirms
    pub fn present<F>(&self, parent: &impl IsA<gtk4::Widget>, callback: F)
    where
        F: Fn(NewFavorite) + 'static,
    {
        let name_entry = self.name_entry.clone();
        let url_entry = self.url_entry.clone();
        let icon = Rc::clone(&self.icon);
        let callback = Rc::new(RefCell::new(Some(callback)));

        self.dialog.connect_response(None, move |_, response| {
            if response != "add" {
                return;
            }
            let favorite = NewFavorite {
                name: name_entry.text().to_string(),
                url: url_entry.text().to_string(),
                icon: icon.borrow_mut().take(),
            };
            if let Some(cb) = callback.borrow_mut().take() {
                cb(favorite);
            }
        });

        self.dialog.present(Some(parent));
        self.name_entry.grab_focus();
    }
}

impl Default for AddFavoriteDialog {
    fn default() -> Self {
        Self::new()
    }
}

/// Image filter shared by icon and wallpaper uploads
pub fn image_filter() -> gtk4::FileFilter {
    let filter = gtk4::FileFilter::new();
    filter.set_name(Some("Images"));
    filter.add_mime_type("image/*");
    filter
}

fn choose_icon(
    dialog: &libadwaita::AlertDialog,
    button: &gtk4::Button,
    preview: &gtk4::Image,
    icon: Rc<RefCell<Option<String>>>,
) {
    let file_dialog = gtk4::FileDialog::builder()
        .title("Choose Icon")
        .default_filter(&image_filter())
        .modal(true)
        .build();

    let window = dialog.root().and_downcast::<gtk4::Window>();
    let button = button.clone();
    let preview = preview.clone();

    file_dialog.open(window.as_ref(), gio::Cancellable::NONE, move |result| {
        let file = match result {
            Ok(file) => file,
            Err(e) => {
                log::debug!("Icon selection cancelled: {}", e);
                return;
            }
        };
        let Some(path) = file.path() else {
            log::warn!("Selected icon has no local path");
            return;
        };

        match datauri::from_file(&path) {
            Ok(uri) => {
                if let Some(name) = path.file_name() {
                    button.set_label(&name.to_string_lossy());
                }
                preview.set_from_file(Some(&path));
                *icon.borrow_mut() = Some(uri);
            }
            Err(e) => {
                log::warn!("Failed to read icon {:?}: {}", path, e);
                button.set_label("Could not read image");
            }
        }
    });
}
