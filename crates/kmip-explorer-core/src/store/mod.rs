// ── View-independent explorer state ──
//
// The directory of listed objects and the type filter. Both are plain data
// owned by the UI loop; background tasks never touch them directly.

pub mod directory;
pub mod filter;
pub mod row;

pub use directory::{Directory, DirectoryEvent};
pub use filter::{Category, FilterChange, TypeFilter};
pub use row::{DirectoryRow, RowStyle, format_age, project};
