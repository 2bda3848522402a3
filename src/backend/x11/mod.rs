//! X11 backend — native dialog windows over the X11 protocol.
//!
//! The display connection is the process-wide bootstrap: it is opened on
//! the first show (or probe) and shared by every later dialog. Atoms and
//! the keycodes the dialog reacts to are resolved once alongside it.
//!
//! Every dialog reads events from that one connection, so presentations
//! are serialized process-wide: a second thread calling `present` waits
//! until the first dialog is dismissed.

pub mod layout;
mod window;

use std::sync::Mutex;

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, Atom, Keycode, Keysym};
use x11rb::rust_connection::RustConnection;

use super::bootstrap::Bootstrap;
use super::{Backend, BackendError};
use crate::dialog::descriptor::DialogDescriptor;
use crate::dialog::result::Activation;

const XK_RETURN: Keysym = 0xff0d;
const XK_KP_ENTER: Keysym = 0xff8d;
const XK_ESCAPE: Keysym = 0xff1b;

static DISPLAY: Bootstrap<X11Display> = Bootstrap::new("x11");

/// Pre-interned atoms for window-manager hints.
struct Atoms {
    wm_protocols: Atom,
    wm_delete_window: Atom,
    net_wm_name: Atom,
    utf8_string: Atom,
    net_wm_window_type: Atom,
    net_wm_window_type_dialog: Atom,
}

/// Keycodes that act on the dialog without the mouse.
struct KeyMap {
    /// Return and keypad Enter.
    activate: Vec<Keycode>,
    /// Escape.
    dismiss: Vec<Keycode>,
}

/// Process-wide X11 connection state.
struct X11Display {
    conn: RustConnection,
    screen_num: usize,
    atoms: Atoms,
    keys: KeyMap,
    /// Held for the whole of a presentation; the event queue is shared.
    presenting: Mutex<()>,
}

impl X11Display {
    /// Connect to the display named by `DISPLAY` and intern atoms.
    fn connect() -> Result<Self, BackendError> {
        let (conn, screen_num) = RustConnection::connect(None)
            .map_err(|e| BackendError::Unavailable(format!("X11 connect failed: {e}")))?;

        let atoms = Atoms {
            wm_protocols: intern(&conn, b"WM_PROTOCOLS")?,
            wm_delete_window: intern(&conn, b"WM_DELETE_WINDOW")?,
            net_wm_name: intern(&conn, b"_NET_WM_NAME")?,
            utf8_string: intern(&conn, b"UTF8_STRING")?,
            net_wm_window_type: intern(&conn, b"_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_dialog: intern(&conn, b"_NET_WM_WINDOW_TYPE_DIALOG")?,
        };

        let keys = KeyMap {
            activate: keysyms_to_keycodes(&conn, &[XK_RETURN, XK_KP_ENTER]),
            dismiss: keysyms_to_keycodes(&conn, &[XK_ESCAPE]),
        };
        tracing::debug!(
            screen = screen_num,
            activate = ?keys.activate,
            dismiss = ?keys.dismiss,
            "X11 display connected"
        );

        Ok(Self {
            conn,
            screen_num,
            atoms,
            keys,
            presenting: Mutex::new(()),
        })
    }

    fn screen(&self) -> &xproto::Screen {
        &self.conn.setup().roots[self.screen_num]
    }
}

fn intern(conn: &RustConnection, name: &[u8]) -> Result<Atom, BackendError> {
    Ok(xproto::intern_atom(conn, false, name)
        .map_err(|e| BackendError::Unavailable(format!("intern_atom: {e}")))?
        .reply()
        .map_err(|e| BackendError::Unavailable(format!("intern_atom reply: {e}")))?
        .atom)
}

/// All keycodes that produce any of `keysyms` in the current keyboard
/// mapping. An unreadable mapping yields no keycodes; the dialog then
/// only responds to the mouse and the window manager.
fn keysyms_to_keycodes(conn: &RustConnection, keysyms: &[Keysym]) -> Vec<Keycode> {
    let setup = conn.setup();
    let min_keycode = setup.min_keycode;
    let count = setup.max_keycode - min_keycode + 1;

    let reply = match xproto::get_keyboard_mapping(conn, min_keycode, count) {
        Ok(cookie) => match cookie.reply() {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "get_keyboard_mapping reply failed");
                return Vec::new();
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "get_keyboard_mapping failed");
            return Vec::new();
        }
    };

    let syms_per_code = reply.keysyms_per_keycode as usize;
    if syms_per_code == 0 {
        return Vec::new();
    }

    reply
        .keysyms
        .chunks(syms_per_code)
        .enumerate()
        .filter(|(_, syms)| syms.iter().any(|s| keysyms.contains(s)))
        .map(|(i, _)| min_keycode + i as u8)
        .collect()
}

/// Run `f` while holding `lock`.
fn exclusive<T>(lock: &Mutex<()>, f: impl FnOnce() -> T) -> T {
    // The guard protects no data, so a poisoned lock is still usable.
    let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
    f()
}

/// X11 implementation of [`Backend`].
///
/// Dialogs are shown one at a time per process; concurrent `present`
/// calls block until the current dialog closes.
#[derive(Debug, Default)]
pub struct X11Backend;

impl X11Backend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for X11Backend {
    fn name(&self) -> &'static str {
        "x11"
    }

    fn probe(&self) -> Result<(), BackendError> {
        DISPLAY.get_or_init(X11Display::connect).map(|_| ())
    }

    fn present(&self, descriptor: &DialogDescriptor) -> Result<Activation, BackendError> {
        let display = DISPLAY.get_or_init(X11Display::connect)?;
        exclusive(&display.presenting, || window::run(display, descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn exclusive_runs_one_caller_at_a_time() {
        let lock = Arc::new(Mutex::new(()));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                thread::spawn(move || {
                    exclusive(&lock, || {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exclusive_survives_a_panicked_holder() {
        let lock = Arc::new(Mutex::new(()));
        let poisoner = Arc::clone(&lock);
        let _ = thread::spawn(move || {
            exclusive::<()>(&poisoner, || panic!("dialog loop panicked"));
        })
        .join();

        assert!(lock.is_poisoned());
        assert_eq!(exclusive(&lock, || 7), 7);
    }
}
