//! Charts module - scales shared by the views.

mod scales;

pub use scales::{
    category_color, interpolate_blues, QuantileScale, SqrtScale, CONTINENT_PALETTE,
    HAPPINESS_PALETTE,
};
