pub mod util;

pub use util::{parse_sides, split_csv};
