//! Data-driven styling
//!
//! # Submodules
//! - `expressions` - Zoom and data dependent style expressions
//! - `colors` - Color value parsing
//! - `compiled` - Techniques with their expressions compiled
//! - `priorities` - Theme priority tables

mod colors;
mod compiled;
mod expressions;
mod priorities;

pub use colors::{format_color, parse_color, parse_color_str};
pub use compiled::{CompiledTechnique, ResolvedOrdering};
pub use expressions::{
    CompareOp,
    Expr,
    ExpressionError,
    Interpolation,
    MapEnv,
    MathOp,
    ZOOM_KEY,
};
pub use priorities::{process_priorities, StylePriority, ThemePriorities, RENDER_ORDER_STEP};
