#[allow(unused_imports)]
pub mod prelude {
    pub use super::todo::Entity as Todo;
}

pub mod todo;

/// Matches the `VARCHAR(255)` title column.
pub const TITLE_MAX_LEN: usize = 255;
