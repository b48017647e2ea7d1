use super::tile::FavoriteTile;
use crate::http::HttpClient;
use crate::image;
use crate::preferences::Favorite;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

type UrlCallback = Rc<dyn Fn(&str)>;
type IdCallback = Rc<dyn Fn(i64)>;
type Callback = Rc<dyn Fn()>;

/// Tiles for every favorite plus a trailing "Add New" tile
pub struct FavoritesGrid {
    flow_box: gtk4::FlowBox,
    add_tile: gtk4::FlowBoxChild,
    http: HttpClient,
    favicon_service: String,
    /// Favicons by service URL, kept across rebuilds
    favicons: Rc<RefCell<HashMap<String, gdk::Texture>>>,

    on_open_callbacks: RefCell<Vec<UrlCallback>>,
    on_remove_callbacks: RefCell<Vec<IdCallback>>,
    on_add_callbacks: RefCell<Vec<Callback>>,
}

impl FavoritesGrid {
    pub fn new(http: HttpClient, favicon_service: &str) -> Rc<Self> {
        let flow_box = gtk4::FlowBox::new();
        flow_box.set_selection_mode(gtk4::SelectionMode::None);
        flow_box.set_homogeneous(true);
        flow_box.set_max_children_per_line(6);
        flow_box.set_column_spacing(12);
        flow_box.set_row_spacing(12);
        flow_box.set_halign(gtk4::Align::Center);
        flow_box.set_activate_on_single_click(true);
        flow_box.add_css_class("favorites-grid");

        let add_tile = gtk4::FlowBoxChild::new();
        add_tile.add_css_class("favorite-tile");
        add_tile.add_css_class("favorite-add");
        let add_box = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
        add_box.set_margin_top(12);
        add_box.set_margin_bottom(12);
        add_box.set_margin_start(12);
        add_box.set_margin_end(12);
        let add_icon = gtk4::Image::from_icon_name("list-add-symbolic");
        add_icon.set_pixel_size(48);
        add_box.append(&add_icon);
        add_box.append(&gtk4::Label::new(Some("Add New")));
        add_tile.set_child(Some(&add_box));
        flow_box.append(&add_tile);

        let grid = Rc::new(Self {
            flow_box,
            add_tile,
            http,
            favicon_service: favicon_service.to_string(),
            favicons: Rc::new(RefCell::new(HashMap::new())),
            on_open_callbacks: RefCell::new(Vec::new()),
            on_remove_callbacks: RefCell::new(Vec::new()),
            on_add_callbacks: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&grid);
        grid.flow_box.connect_child_activated(move |_, child| {
            let Some(grid) = weak.upgrade() else {
                return;
            };
            if child == &grid.add_tile {
                grid.emit_add();
            } else if let Some(tile) = child.downcast_ref::<FavoriteTile>() {
                grid.emit_open(&tile.url());
            }
        });

        grid
    }

    pub fn widget(&self) -> &gtk4::FlowBox {
        &self.flow_box
    }

    /// Replace all tiles with `favorites`, in order
    pub fn set_favorites(self: &Rc<Self>, favorites: &[Favorite]) {
        while let Some(child) = self.flow_box.child_at_index(0) {
            if child == self.add_tile {
                break;
            }
            self.flow_box.remove(&child);
        }

        for (position, favorite) in favorites.iter().enumerate() {
            let tile = FavoriteTile::new(favorite);
            let weak: Weak<Self> = Rc::downgrade(self);
            tile.connect_remove_clicked(move |tile| {
                if let Some(grid) = weak.upgrade() {
                    grid.emit_remove(tile.favorite_id());
                }
            });
            self.flow_box.insert(&tile, position as i32);
            self.load_icon(&tile, favorite);
        }
    }

    fn load_icon(&self, tile: &FavoriteTile, favorite: &Favorite) {
        let source = match &favorite.icon {
            Some(icon) => icon.clone(),
            None => match super::favicon_url(&self.favicon_service, &favorite.url) {
                Some(url) => url.to_string(),
                None => return,
            },
        };

        if let Some(texture) = self.favicons.borrow().get(&source) {
            tile.set_icon(Some(texture));
            return;
        }

        let http = self.http.clone();
        let cache = Rc::clone(&self.favicons);
        let is_remote = favorite.icon.is_none();
        glib::spawn_future_local(glib::clone!(
            #[weak]
            tile,
            async move {
                match image::load_texture(&http, &source).await {
                    Ok(texture) => {
                        tile.set_icon(Some(&texture));
                        if is_remote {
                            cache.borrow_mut().insert(source, texture);
                        }
                    }
                    Err(e) => {
                        log::debug!("Icon for {} unavailable: {}", tile.url(), e);
                        tile.set_icon(None);
                    }
                }
            }
        ));
    }

    pub fn connect_open<F: Fn(&str) + 'static>(&self, callback: F) {
        self.on_open_callbacks.borrow_mut().push(Rc::new(callback));
    }

    pub fn connect_remove<F: Fn(i64) + 'static>(&self, callback: F) {
        self.on_remove_callbacks.borrow_mut().push(Rc::new(callback));
    }

    pub fn connect_add<F: Fn() + 'static>(&self, callback: F) {
        self.on_add_callbacks.borrow_mut().push(Rc::new(callback));
    }

    fn emit_open(&self, url: &str) {
        let callbacks: Vec<_> = self.on_open_callbacks.borrow().iter().cloned().collect();
        for callback in callbacks {
            callback(url);
        }
    }

    fn emit_remove(&self, id: i64) {
        let callbacks: Vec<_> = self.on_remove_callbacks.borrow().iter().cloned().collect();
        for callback in callbacks {
            callback(id);
        }
    }

    fn emit_add(&self) {
        let callbacks: Vec<_> = self.on_add_callbacks.borrow().iter().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }
}
