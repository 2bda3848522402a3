//! Dialog window — creation, painting and the modal event loop.
//!
//! Every X resource the dialog allocates is owned by a [`Surface`] whose
//! `Drop` frees it, colormap cells included, so the window disappears on
//! every exit path, including connection errors in the middle of the loop.

use std::fmt::Display;

use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{
    self, AtomEnum, ChangeGCAux, Colormap, CreateGCAux, CreateWindowAux, EventMask, Font,
    Gcontext, PropMode, Rectangle, Window, WindowClass,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::X11Display;
use super::layout::{FontMetrics, Layout, Rect, TextRun, to_latin1};
use crate::backend::BackendError;
use crate::dialog::descriptor::{ButtonKind, DialogDescriptor};
use crate::dialog::result::Activation;

/// Core font every X server ships.
const FONT_NAME: &[u8] = b"fixed";

const WM_CLASS: &[u8] = b"alertbox\0Alertbox\0";

/// Left mouse button.
const POINTER_PRIMARY: u8 = 1;

fn creation<E: Display>(what: &'static str) -> impl FnOnce(E) -> BackendError {
    move |e| BackendError::CreationFailed(format!("{what}: {e}"))
}

/// Pixel values allocated in the screen's default colormap.
struct Palette {
    background: u32,
    foreground: u32,
    button_face: u32,
    button_armed: u32,
    badge: u32,
}

/// X resources owned by one presentation.
struct Surface<'a> {
    conn: &'a RustConnection,
    colormap: Colormap,
    /// Pixels this presentation allocated in `colormap`.
    colors: Vec<u32>,
    font: Option<Font>,
    window: Option<Window>,
    gc: Option<Gcontext>,
}

impl Drop for Surface<'_> {
    fn drop(&mut self) {
        if let Some(gc) = self.gc.take()
            && let Err(e) = xproto::free_gc(self.conn, gc)
        {
            tracing::debug!(error = %e, "free_gc failed");
        }
        if let Some(window) = self.window.take()
            && let Err(e) = xproto::destroy_window(self.conn, window)
        {
            tracing::debug!(error = %e, "destroy_window failed");
        }
        if !self.colors.is_empty()
            && let Err(e) = xproto::free_colors(self.conn, self.colormap, 0, &self.colors)
        {
            tracing::debug!(error = %e, "free_colors failed");
        }
        if let Some(font) = self.font.take()
            && let Err(e) = xproto::close_font(self.conn, font)
        {
            tracing::debug!(error = %e, "close_font failed");
        }
        if let Err(e) = self.conn.flush() {
            tracing::debug!(error = %e, "flush after teardown failed");
        }
    }
}

/// Present `descriptor` in a new window and block until it is dismissed.
pub(super) fn run(
    display: &X11Display,
    descriptor: &DialogDescriptor,
) -> Result<Activation, BackendError> {
    let conn = &display.conn;
    let screen = display.screen();
    let mut surface = Surface {
        conn,
        colormap: screen.default_colormap,
        colors: Vec::new(),
        font: None,
        window: None,
        gc: None,
    };

    // Font and metrics.
    let font = conn.generate_id().map_err(creation("generate_id"))?;
    xproto::open_font(conn, font, FONT_NAME)
        .map_err(creation("open_font"))?
        .check()
        .map_err(creation("open_font"))?;
    surface.font = Some(font);

    let info = xproto::query_font(conn, font)
        .map_err(creation("query_font"))?
        .reply()
        .map_err(creation("query_font reply"))?;
    let metrics = FontMetrics {
        char_width: info.max_bounds.character_width.max(1) as u16,
        ascent: info.font_ascent.max(0) as u16,
        descent: info.font_descent.max(0) as u16,
    };

    let layout = Layout::compute(descriptor, metrics);
    let palette = allocate_palette(display, &layout, &mut surface.colors);

    // Window, centered on the screen.
    let window = conn.generate_id().map_err(creation("generate_id"))?;
    let x = (i32::from(screen.width_in_pixels) - i32::from(layout.width)).max(0) / 2;
    let y = (i32::from(screen.height_in_pixels) - i32::from(layout.height)).max(0) / 2;
    xproto::create_window(
        conn,
        x11rb::COPY_DEPTH_FROM_PARENT,
        window,
        screen.root,
        x as i16,
        y as i16,
        layout.width,
        layout.height,
        0,
        WindowClass::INPUT_OUTPUT,
        x11rb::COPY_FROM_PARENT,
        &CreateWindowAux::new()
            .background_pixel(palette.background)
            .event_mask(
                EventMask::EXPOSURE
                    | EventMask::KEY_PRESS
                    | EventMask::BUTTON_PRESS
                    | EventMask::BUTTON_RELEASE,
            ),
    )
    .map_err(creation("create_window"))?
    .check()
    .map_err(creation("create_window"))?;
    surface.window = Some(window);

    set_hints(display, window, descriptor)?;

    let gc = conn.generate_id().map_err(creation("generate_id"))?;
    xproto::create_gc(
        conn,
        gc,
        window,
        &CreateGCAux::new()
            .foreground(palette.foreground)
            .background(palette.background)
            .font(font)
            .graphics_exposures(0u32),
    )
    .map_err(creation("create_gc"))?;
    surface.gc = Some(gc);

    xproto::map_window(conn, window).map_err(creation("map_window"))?;
    conn.flush().map_err(creation("flush"))?;
    tracing::debug!(window, width = layout.width, height = layout.height, "dialog window mapped");

    let painter = Painter {
        conn,
        window,
        gc,
        palette: &palette,
        layout: &layout,
    };
    event_loop(display, &painter)
}

/// Title, window type, close protocol and class.
fn set_hints(
    display: &X11Display,
    window: Window,
    descriptor: &DialogDescriptor,
) -> Result<(), BackendError> {
    let conn = &display.conn;
    let atoms = &display.atoms;

    if let Some(title) = descriptor.title() {
        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            &to_latin1(title),
        )
        .map_err(creation("set WM_NAME"))?;
        conn.change_property8(
            PropMode::REPLACE,
            window,
            atoms.net_wm_name,
            atoms.utf8_string,
            title.as_bytes(),
        )
        .map_err(creation("set _NET_WM_NAME"))?;
    }

    conn.change_property32(
        PropMode::REPLACE,
        window,
        atoms.wm_protocols,
        AtomEnum::ATOM,
        &[atoms.wm_delete_window],
    )
    .map_err(creation("set WM_PROTOCOLS"))?;
    conn.change_property32(
        PropMode::REPLACE,
        window,
        atoms.net_wm_window_type,
        AtomEnum::ATOM,
        &[atoms.net_wm_window_type_dialog],
    )
    .map_err(creation("set _NET_WM_WINDOW_TYPE"))?;
    conn.change_property8(
        PropMode::REPLACE,
        window,
        AtomEnum::WM_CLASS,
        AtomEnum::STRING,
        WM_CLASS,
    )
    .map_err(creation("set WM_CLASS"))?;

    Ok(())
}

/// Allocate the dialog colors, falling back to the screen's black and
/// white pixels when the colormap is full. Allocated pixels are appended
/// to `owned` so they can be freed with the window.
fn allocate_palette(display: &X11Display, layout: &Layout, owned: &mut Vec<u32>) -> Palette {
    let screen = display.screen();
    let mut alloc = |rgb: (u16, u16, u16), fallback: u32| -> u32 {
        let pixel = match xproto::alloc_color(
            &display.conn,
            screen.default_colormap,
            rgb.0,
            rgb.1,
            rgb.2,
        ) {
            Ok(cookie) => match cookie.reply() {
                Ok(reply) => Some(reply.pixel),
                Err(e) => {
                    tracing::debug!(error = %e, ?rgb, "alloc_color failed");
                    None
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, ?rgb, "alloc_color failed");
                None
            }
        };
        settle(pixel, fallback, owned)
    };

    Palette {
        background: alloc((0xf6f6, 0xf5f5, 0xf4f4), screen.white_pixel),
        foreground: alloc((0x2e2e, 0x3434, 0x3636), screen.black_pixel),
        button_face: alloc((0xe0e0, 0xe0e0, 0xe0e0), screen.white_pixel),
        button_armed: alloc((0xb0b0, 0xb0b0, 0xb0b0), screen.black_pixel),
        badge: layout
            .badge
            .as_ref()
            .map_or(screen.black_pixel, |b| alloc(b.rgb, screen.black_pixel)),
    }
}

/// The pixel to draw with: `allocated` if the server granted one, which
/// is then recorded in `owned`, else the screen's `fallback`.
fn settle(allocated: Option<u32>, fallback: u32, owned: &mut Vec<u32>) -> u32 {
    match allocated {
        Some(pixel) => {
            owned.push(pixel);
            pixel
        }
        None => fallback,
    }
}

/// Draws a computed [`Layout`] into the dialog window.
struct Painter<'a> {
    conn: &'a RustConnection,
    window: Window,
    gc: Gcontext,
    palette: &'a Palette,
    layout: &'a Layout,
}

impl Painter<'_> {
    /// Repaint everything; `armed` is drawn pressed.
    fn paint(&self, armed: Option<ButtonKind>) -> Result<(), BackendError> {
        let p = self.palette;

        if let Some(badge) = &self.layout.badge {
            self.set_colors(p.badge, p.background)?;
            let arc = xproto::Arc {
                x: badge.rect.x,
                y: badge.rect.y,
                width: badge.rect.width,
                height: badge.rect.height,
                angle1: 0,
                angle2: 360 * 64,
            };
            xproto::poly_fill_arc(self.conn, self.window, self.gc, &[arc]).map_err(lost)?;
            self.set_colors(p.background, p.badge)?;
            self.text(&badge.glyph)?;
        }

        self.set_colors(p.foreground, p.background)?;
        for line in &self.layout.lines {
            self.text(line)?;
        }

        for slot in &self.layout.buttons {
            let face = if armed == Some(slot.kind) {
                p.button_armed
            } else {
                p.button_face
            };
            self.set_colors(face, face)?;
            xproto::poly_fill_rectangle(self.conn, self.window, self.gc, &[rect(slot.rect)])
                .map_err(lost)?;
            self.set_colors(p.foreground, face)?;
            let mut border = rect(slot.rect);
            border.width = border.width.saturating_sub(1);
            border.height = border.height.saturating_sub(1);
            xproto::poly_rectangle(self.conn, self.window, self.gc, &[border]).map_err(lost)?;
            self.text(&slot.label)?;
        }

        self.conn.flush().map_err(lost)
    }

    fn set_colors(&self, foreground: u32, background: u32) -> Result<(), BackendError> {
        xproto::change_gc(
            self.conn,
            self.gc,
            &ChangeGCAux::new().foreground(foreground).background(background),
        )
        .map_err(lost)?;
        Ok(())
    }

    fn text(&self, run: &TextRun) -> Result<(), BackendError> {
        xproto::image_text8(self.conn, self.window, self.gc, run.x, run.baseline, &run.text)
            .map_err(lost)?;
        Ok(())
    }
}

fn rect(r: Rect) -> Rectangle {
    Rectangle {
        x: r.x,
        y: r.y,
        width: r.width,
        height: r.height,
    }
}

fn lost<E: Display>(e: E) -> BackendError {
    BackendError::Interrupted(format!("X11 connection lost: {e}"))
}

/// Block on window events until a button is activated or the window is
/// closed.
///
/// A click counts when press and release land on the same button. Return
/// activates the primary button; Escape and the window manager's close
/// request are dismissals.
fn event_loop(display: &X11Display, painter: &Painter<'_>) -> Result<Activation, BackendError> {
    let conn = &display.conn;
    let window = painter.window;
    let mut armed: Option<ButtonKind> = None;

    loop {
        let event = conn.wait_for_event().map_err(lost)?;
        match event {
            Event::Expose(e) if e.window == window && e.count == 0 => painter.paint(armed)?,
            Event::ButtonPress(e) if e.event == window && e.detail == POINTER_PRIMARY => {
                armed = painter.layout.hit(e.event_x, e.event_y);
                if armed.is_some() {
                    painter.paint(armed)?;
                }
            }
            Event::ButtonRelease(e) if e.event == window && e.detail == POINTER_PRIMARY => {
                let released = painter.layout.hit(e.event_x, e.event_y);
                match armed.take() {
                    Some(kind) if released == Some(kind) => return Ok(Activation::Button(kind)),
                    Some(_) => painter.paint(None)?,
                    None => {}
                }
            }
            Event::KeyPress(e) if e.event == window => {
                if display.keys.activate.contains(&e.detail) {
                    return Ok(Activation::Button(ButtonKind::Primary));
                }
                if display.keys.dismiss.contains(&e.detail) {
                    return Ok(Activation::Dismissed);
                }
            }
            Event::ClientMessage(e)
                if e.window == window
                    && e.format == 32
                    && e.type_ == display.atoms.wm_protocols
                    && e.data.as_data32()[0] == display.atoms.wm_delete_window =>
            {
                return Ok(Activation::Dismissed);
            }
            Event::Error(e) => {
                tracing::debug!(error = ?e, "X11 error during dialog");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_allocated_pixels_are_owned() {
        let mut owned = Vec::new();
        assert_eq!(settle(Some(0x00f6f5f4), 0xffffff, &mut owned), 0x00f6f5f4);
        assert_eq!(settle(None, 0xffffff, &mut owned), 0xffffff);
        assert_eq!(settle(Some(0x002e3436), 0, &mut owned), 0x002e3436);
        assert_eq!(owned, vec![0x00f6f5f4, 0x002e3436]);
    }

    #[test]
    fn repeated_allocations_are_each_owned() {
        // The server counts every grant, so each needs its own free.
        let mut owned = Vec::new();
        settle(Some(7), 0, &mut owned);
        settle(Some(7), 0, &mut owned);
        assert_eq!(owned, vec![7, 7]);
    }
}
