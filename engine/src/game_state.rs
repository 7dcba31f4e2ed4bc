use std::fmt::{Debug, Display};

/// An immutable position. `Display` renders the canonical state string.
pub trait GameState: Clone + Debug + Display {
    fn initial() -> Self;
}
