//! Files written on the user's behalf.
//!
//! # Submodules
//!
//! - [`text`]: saves one rewrite result as a `.txt` download
//! - [`json`]: exports and imports the rewrite history as JSON
//!
//! # Output Structure
//!
//! ```text
//! out_dir/
//! ├── 比亚迪秦l-dm-i正式上市_20250506_143000.txt
//! └── rewrite_history_20250506_143512.json
//! ```

pub mod json;
pub mod text;
