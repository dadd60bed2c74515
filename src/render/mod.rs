//! Rendering: plain-text layout of view trees and the terminal driver.

pub mod driver;
pub mod text;

pub use driver::Driver;
pub use text::{render_lines, render_to_string, Line, RenderOptions};
