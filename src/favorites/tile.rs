use crate::preferences::Favorite;
use gtk4::glib;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use std::cell::{Cell, RefCell};

pub const PLACEHOLDER_ICON: &str = "web-browser-symbolic";

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct FavoriteTile {
        pub favorite_id: Cell<i64>,
        pub url: RefCell<String>,

        // Child widgets
        pub icon_image: RefCell<Option<gtk4::Image>>,
        pub name_label: RefCell<Option<gtk4::Label>>,
        pub remove_button: RefCell<Option<gtk4::Button>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for FavoriteTile {
        const NAME: &'static str = "StartpageFavoriteTile";
        type Type = super::FavoriteTile;
        type ParentType = gtk4::FlowBoxChild;
    }

    impl ObjectImpl for FavoriteTile {
        fn constructed(&self) {
            self.parent_constructed();

            let obj = self.obj();
            obj.add_css_class("favorite-tile");

            let overlay = gtk4::Overlay::new();
            obj.set_child(Some(&overlay));

            let content_box = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
            content_box.set_margin_top(12);
            content_box.set_margin_bottom(12);
            content_box.set_margin_start(12);
            content_box.set_margin_end(12);
            content_box.set_halign(gtk4::Align::Center);
            overlay.set_child(Some(&content_box));

            let icon_image = gtk4::Image::from_icon_name(PLACEHOLDER_ICON);
            icon_image.set_pixel_size(48);
            icon_image.add_css_class("favorite-icon");
            content_box.append(&icon_image);
            *self.icon_image.borrow_mut() = Some(icon_image);

            let name_label = gtk4::Label::new(None);
            name_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            name_label.set_max_width_chars(10);
            name_label.set_width_chars(10);
            name_label.add_css_class("favorite-name");
            content_box.append(&name_label);
            *self.name_label.borrow_mut() = Some(name_label);

            let remove_button = gtk4::Button::from_icon_name("window-close-symbolic");
            remove_button.add_css_class("flat");
            remove_button.add_css_class("circular");
            remove_button.add_css_class("favorite-remove");
            remove_button.set_halign(gtk4::Align::End);
            remove_button.set_valign(gtk4::Align::Start);
            remove_button.set_tooltip_text(Some("Remove"));
            overlay.add_overlay(&remove_button);
            *self.remove_button.borrow_mut() = Some(remove_button);
        }
    }

    impl WidgetImpl for FavoriteTile {}
    impl FlowBoxChildImpl for FavoriteTile {}
}

glib::wrapper! {
    pub struct FavoriteTile(ObjectSubclass<imp::FavoriteTile>)
        @extends gtk4::FlowBoxChild, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget;
}

impl FavoriteTile {
    pub fn new(favorite: &Favorite) -> Self {
        let obj: Self = glib::Object::new();
        let imp = obj.imp();
        imp.favorite_id.set(favorite.id);
        *imp.url.borrow_mut() = favorite.url.clone();
        if let Some(label) = imp.name_label.borrow().as_ref() {
            label.set_text(&favorite.name);
        }
        obj.set_tooltip_text(Some(&favorite.url));
        obj
    }

    pub fn favorite_id(&self) -> i64 {
        self.imp().favorite_id.get()
    }

    pub fn url(&self) -> String {
        self.imp().url.borrow().clone()
    }

    /// Show `texture`, or the placeholder globe when None
    pub fn set_icon(&self, texture: Option<&gtk4::gdk::Texture>) {
        if let Some(image) = self.imp().icon_image.borrow().as_ref() {
            match texture {
                Some(tex) => image.set_paintable(Some(tex)),
                None => image.set_icon_name(Some(PLACEHOLDER_ICON)),
            }
        }
    }

    pub fn connect_remove_clicked<F: Fn(&Self) + 'static>(&self, f: F) {
        if let Some(button) = self.imp().remove_button.borrow().as_ref() {
            let this = self.downgrade();
            button.connect_clicked(move |_| {
                if let Some(this) = this.upgrade() {
                    f(&this);
                }
            });
        }
    }
}
