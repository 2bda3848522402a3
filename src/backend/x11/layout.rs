//! Dialog geometry — where text, badge and buttons go.
//!
//! Pure functions of the descriptor and the font metrics, so the window
//! code only has to paint what this module computed and hit-test clicks
//! against it.

use crate::dialog::descriptor::{ButtonKind, Category, DialogDescriptor};

const MARGIN: i32 = 16;
const GAP: i32 = 12;
const BADGE_SIZE: i32 = 32;
const BUTTON_PAD_X: i32 = 12;
const BUTTON_PAD_Y: i32 = 6;
const MIN_BUTTON_WIDTH: i32 = 72;
const MIN_WIDTH: i32 = 240;
const LINE_GAP: i32 = 2;

/// Message text is wrapped to this many characters per line.
pub const WRAP_COLUMNS: usize = 60;

/// Metrics of the (monospaced) core font used for all text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub char_width: u16,
    pub ascent: u16,
    pub descent: u16,
}

impl FontMetrics {
    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * i32::from(self.char_width)
    }

    fn text_height(&self) -> i32 {
        i32::from(self.ascent) + i32::from(self.descent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x: clamp_i16(x),
            y: clamp_i16(y),
            width: clamp_u16(width),
            height: clamp_u16(height),
        }
    }

    pub fn contains(&self, x: i16, y: i16) -> bool {
        let (x, y) = (i32::from(x), i32::from(y));
        let (left, top) = (i32::from(self.x), i32::from(self.y));
        x >= left
            && y >= top
            && x < left + i32::from(self.width)
            && y < top + i32::from(self.height)
    }
}

/// A run of Latin-1 text drawn with its baseline at `(x, baseline)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub x: i16,
    pub baseline: i16,
    pub text: Vec<u8>,
}

impl TextRun {
    fn new(x: i32, baseline: i32, text: &str) -> Self {
        Self {
            x: clamp_i16(x),
            baseline: clamp_i16(baseline),
            text: to_latin1(text),
        }
    }
}

/// Colored circle with a single glyph standing in for a category icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub rect: Rect,
    pub glyph: TextRun,
    /// 16-bit RGB, as X11 `AllocColor` expects.
    pub rgb: (u16, u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSlot {
    pub kind: ButtonKind,
    pub rect: Rect,
    pub label: TextRun,
}

/// Complete geometry of one dialog window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub badge: Option<Badge>,
    pub lines: Vec<TextRun>,
    /// Buttons left to right.
    pub buttons: Vec<ButtonSlot>,
}

impl Layout {
    /// Lay out `descriptor` for a font with `metrics`.
    pub fn compute(descriptor: &DialogDescriptor, metrics: FontMetrics) -> Self {
        let text_height = metrics.text_height();
        let line_height = text_height + LINE_GAP;

        let badge_spec = badge_for(descriptor.category());
        let text_x = if badge_spec.is_some() {
            MARGIN + BADGE_SIZE + GAP
        } else {
            MARGIN
        };

        let wrapped = wrap(descriptor.message(), WRAP_COLUMNS);
        let text_width = wrapped
            .iter()
            .map(|l| metrics.text_width(l))
            .max()
            .unwrap_or(0);
        let lines: Vec<TextRun> = wrapped
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let baseline = MARGIN + i32::from(metrics.ascent) + i as i32 * line_height;
                TextRun::new(text_x, baseline, line)
            })
            .collect();

        let badge_height = if badge_spec.is_some() { BADGE_SIZE } else { 0 };
        let content_height = (wrapped.len() as i32 * line_height).max(badge_height);

        let ordered = visual_order(descriptor);
        let button_height = text_height + 2 * BUTTON_PAD_Y;
        let widths: Vec<i32> = ordered
            .iter()
            .map(|(_, label)| (metrics.text_width(label) + 2 * BUTTON_PAD_X).max(MIN_BUTTON_WIDTH))
            .collect();
        let buttons_width =
            widths.iter().sum::<i32>() + GAP * (widths.len().saturating_sub(1) as i32);

        let width = MIN_WIDTH
            .max(text_x + text_width + MARGIN)
            .max(2 * MARGIN + buttons_width);
        let button_y = MARGIN + content_height + MARGIN;
        let height = button_y + button_height + MARGIN;

        // Right-aligned row, laid out from the right edge.
        let mut right = width - MARGIN;
        let mut buttons: Vec<ButtonSlot> = ordered
            .iter()
            .zip(&widths)
            .rev()
            .map(|((kind, label), &w)| {
                let x = right - w;
                right = x - GAP;
                let label_x = x + (w - metrics.text_width(label)) / 2;
                let baseline = button_y + BUTTON_PAD_Y + i32::from(metrics.ascent);
                ButtonSlot {
                    kind: *kind,
                    rect: Rect::new(x, button_y, w, button_height),
                    label: TextRun::new(label_x, baseline, label),
                }
            })
            .collect();
        buttons.reverse();

        let badge = badge_spec.map(|(glyph, rgb)| {
            let glyph_x = MARGIN + (BADGE_SIZE - i32::from(metrics.char_width)) / 2;
            let glyph_baseline = MARGIN
                + (BADGE_SIZE + i32::from(metrics.ascent) - i32::from(metrics.descent)) / 2;
            Badge {
                rect: Rect::new(MARGIN, MARGIN, BADGE_SIZE, BADGE_SIZE),
                glyph: TextRun::new(glyph_x, glyph_baseline, glyph),
                rgb,
            }
        });

        Self {
            width: clamp_u16(width),
            height: clamp_u16(height),
            badge,
            lines,
            buttons,
        }
    }

    /// The button under `(x, y)`, if any.
    pub fn hit(&self, x: i16, y: i16) -> Option<ButtonKind> {
        self.buttons
            .iter()
            .find(|b| b.rect.contains(x, y))
            .map(|b| b.kind)
    }
}

/// Offered buttons in X11/GTK order: alternate on the left, then cancel,
/// primary rightmost.
pub fn visual_order(descriptor: &DialogDescriptor) -> Vec<(ButtonKind, &str)> {
    [ButtonKind::Alternate, ButtonKind::Cancel, ButtonKind::Primary]
        .into_iter()
        .filter_map(|kind| descriptor.label(kind).map(|label| (kind, label)))
        .collect()
}

/// Glyph and color standing in for each category's icon.
fn badge_for(category: Category) -> Option<(&'static str, (u16, u16, u16))> {
    match category {
        Category::None => None,
        Category::Info => Some(("i", (0x3434, 0x6565, 0xa4a4))),
        Category::Warning => Some(("!", (0xf5f5, 0x7979, 0x0000))),
        Category::Question => Some(("?", (0x4e4e, 0x9a9a, 0x0606))),
        Category::Error => Some(("x", (0xcccc, 0x0000, 0x0000))),
    }
}

/// Greedy word wrap to `columns` characters. Explicit newlines are kept;
/// words longer than a line are split.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > columns {
                if len > 0 {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                let rest = word.split_off(columns);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if len > 0 && len + 1 + word.len() > columns {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            len += word.len();
            line.extend(word);
        }

        lines.push(line);
    }

    lines
}

/// Encode for core-font `ImageText8`; characters outside Latin-1 become `?`.
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn clamp_u16(v: i32) -> u16 {
    v.clamp(0, i32::from(u16::MAX)) as u16
}
