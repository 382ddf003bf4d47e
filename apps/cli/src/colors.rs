//! Terminal palette for CLI output.
//!
//! - Increase/success: Green (#10B981)
//! - Warning: Yellow (#F59E0B)
//! - Decrease/error: Red (#EF4444)
//! - Info: Cyan (#00D9FF)

use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Color as ComfyColor};
use rebalance_core::{Action, TaskUrgency, UrgencyLevel};

pub struct Palette;

impl Palette {
    pub const SUCCESS_RGB: (u8, u8, u8) = (16, 185, 129);
    pub const WARNING_RGB: (u8, u8, u8) = (245, 158, 11);
    pub const ERROR_RGB: (u8, u8, u8) = (239, 68, 68);
    pub const INFO_RGB: (u8, u8, u8) = (0, 217, 255);
    pub const MUTED_RGB: (u8, u8, u8) = (148, 163, 184);

    fn comfy((r, g, b): (u8, u8, u8)) -> ComfyColor {
        ComfyColor::Rgb { r, g, b }
    }

    pub fn action_cell(action: Action) -> Cell {
        let rgb = match action {
            Action::Increase => Self::SUCCESS_RGB,
            Action::Decrease => Self::ERROR_RGB,
            Action::Maintain => Self::MUTED_RGB,
        };
        Cell::new(action.to_string()).fg(Self::comfy(rgb))
    }

    pub fn task_urgency_cell(urgency: TaskUrgency) -> Cell {
        let rgb = match urgency {
            TaskUrgency::High => Self::ERROR_RGB,
            TaskUrgency::Medium => Self::WARNING_RGB,
            TaskUrgency::Low => Self::MUTED_RGB,
        };
        Cell::new(urgency.to_string()).fg(Self::comfy(rgb))
    }

    pub fn urgency_cell(level: UrgencyLevel) -> Cell {
        let rgb = match level {
            UrgencyLevel::Critical | UrgencyLevel::High => Self::ERROR_RGB,
            UrgencyLevel::Medium => Self::WARNING_RGB,
            UrgencyLevel::Low => Self::INFO_RGB,
            UrgencyLevel::None => Self::MUTED_RGB,
        };
        Cell::new(level.to_string()).fg(Self::comfy(rgb))
    }

    /// Signed percentage, green for increases and red for decreases.
    pub fn change_pct_cell(pct: f64) -> Cell {
        let cell = Cell::new(format!("{pct:+.2}%"));
        if pct > 0.0 {
            cell.fg(Self::comfy(Self::SUCCESS_RGB))
        } else if pct < 0.0 {
            cell.fg(Self::comfy(Self::ERROR_RGB))
        } else {
            cell
        }
    }

    pub fn heading(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn check() -> ColoredString {
        "✓".green()
    }

    pub fn warn(text: &str) -> ColoredString {
        let (r, g, b) = Self::WARNING_RGB;
        text.truecolor(r, g, b)
    }
}
