pub mod layout;
pub mod fit;
pub mod showcase;
