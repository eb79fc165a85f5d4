//! Dynamic style expressions
//!
//! Technique properties may be plain JSON values or expressions that depend on
//! the zoom level and on the map environment:
//! - `["zoom"]`, `["get", name]`, `["has", name]`, `["literal", value]`
//! - `["interpolate", ["linear" | "discrete" | ["exponential", base]], input, stop, value, ...]`
//! - `["step", input, default, stop, value, ...]`
//! - `["match", input, label, value, ..., fallback]`, `["case", cond, value, ..., fallback]`
//! - `["coalesce", ...]`, comparisons, `all` / `any` / `!`, arithmetic, `concat`
//! - the object form `{ "interpolation": "Linear", "zoomLevels": [...], "values": [...] }`
//!
//! Expressions are compiled once into an `Expr` tree and evaluated many times.

use super::colors::{format_color, parse_color};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Environment entry holding the zoom level
pub const ZOOM_KEY: &str = "$zoom";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("operator '{op}' got {actual} arguments")]
    Arity { op: String, actual: usize },
    #[error("invalid stops in '{0}' expression")]
    InvalidStops(String),
    #[error("unsupported interpolation '{0}'")]
    UnsupportedInterpolation(String),
    #[error("operator '{0}' expects a string operand")]
    ExpectedString(String),
}

/// Variables visible to expressions, chained to an optional parent
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    entries: IndexMap<String, Value>,
    parent: Option<Arc<MapEnv>>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: IndexMap<String, Value>) -> Self {
        Self { entries, parent: None }
    }

    pub fn with_parent(entries: IndexMap<String, Value>, parent: Arc<MapEnv>) -> Self {
        Self { entries, parent: Some(parent) }
    }

    /// Environment pinned to a zoom level, falling back to `parent` for everything else
    pub fn with_zoom(zoom: f64, parent: Option<Arc<MapEnv>>) -> Self {
        let mut entries = IndexMap::new();
        entries.insert(ZOOM_KEY.to_string(), Value::from(zoom));
        Self { entries, parent }
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        match self.entries.get(name) {
            Some(value) => Some(value),
            None => self.parent.as_deref().and_then(|parent| parent.lookup(name)),
        }
    }

    pub fn zoom(&self) -> Option<f64> {
        self.lookup(ZOOM_KEY).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolation {
    Discrete,
    Linear,
    Exponential(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Min,
    Max,
    Floor,
    Ceil,
    Abs,
    Sqrt,
}

/// Compiled expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Zoom,
    Get(String),
    Has(String),
    Interpolate {
        mode: Interpolation,
        input: Box<Expr>,
        stops: Vec<(f64, Expr)>,
    },
    Step {
        input: Box<Expr>,
        default: Box<Expr>,
        stops: Vec<(f64, Expr)>,
    },
    Match {
        input: Box<Expr>,
        arms: Vec<(Vec<Value>, Expr)>,
        fallback: Box<Expr>,
    },
    Case {
        branches: Vec<(Expr, Expr)>,
        fallback: Box<Expr>,
    },
    Coalesce(Vec<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    All(Vec<Expr>),
    Any(Vec<Expr>),
    Not(Box<Expr>),
    Math(MathOp, Vec<Expr>),
    Concat(Vec<Expr>),
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Compile a JSON style value
    pub fn compile(value: &Value) -> Result<Expr, ExpressionError> {
        match value {
            Value::Array(items) => match items.first().and_then(Value::as_str) {
                Some(op) => compile_call(op, &items[1..]),
                None => Ok(Expr::Literal(value.clone())),
            },
            Value::Object(map) if map.contains_key("interpolation") => {
                compile_interpolated_property(map)
            }
            _ => Ok(Expr::Literal(value.clone())),
        }
    }

    /// True when the value can change with zoom level or environment
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Expr::Literal(_))
    }

    pub fn evaluate(&self, env: &MapEnv) -> Value {
        match self {
            Expr::Literal(value) => value.clone(),
            Expr::Zoom => env.zoom().map(Value::from).unwrap_or(Value::Null),
            Expr::Get(name) => env.lookup(name).cloned().unwrap_or(Value::Null),
            Expr::Has(name) => Value::Bool(env.lookup(name).is_some()),
            Expr::Interpolate { mode, input, stops } => {
                match input.evaluate(env).as_f64() {
                    Some(x) => interpolate(*mode, x, stops, env),
                    None => Value::Null,
                }
            }
            Expr::Step { input, default, stops } => {
                let Some(x) = input.evaluate(env).as_f64() else {
                    return default.evaluate(env);
                };
                let mut selected: &Expr = default;
                for (stop, output) in stops {
                    if x >= *stop {
                        selected = output;
                    } else {
                        break;
                    }
                }
                selected.evaluate(env)
            }
            Expr::Match { input, arms, fallback } => {
                let value = input.evaluate(env);
                for (labels, output) in arms {
                    if labels.iter().any(|label| values_equal(label, &value)) {
                        return output.evaluate(env);
                    }
                }
                fallback.evaluate(env)
            }
            Expr::Case { branches, fallback } => {
                for (condition, output) in branches {
                    if is_truthy(&condition.evaluate(env)) {
                        return output.evaluate(env);
                    }
                }
                fallback.evaluate(env)
            }
            Expr::Coalesce(items) => items
                .iter()
                .map(|item| item.evaluate(env))
                .find(|value| !value.is_null())
                .unwrap_or(Value::Null),
            Expr::Compare(op, lhs, rhs) => {
                Value::Bool(compare(*op, &lhs.evaluate(env), &rhs.evaluate(env)))
            }
            Expr::All(items) => {
                Value::Bool(items.iter().all(|item| is_truthy(&item.evaluate(env))))
            }
            Expr::Any(items) => {
                Value::Bool(items.iter().any(|item| is_truthy(&item.evaluate(env))))
            }
            Expr::Not(item) => Value::Bool(!is_truthy(&item.evaluate(env))),
            Expr::Math(op, args) => {
                let numbers: Option<Vec<f64>> =
                    args.iter().map(|arg| arg.evaluate(env).as_f64()).collect();
                numbers
                    .and_then(|numbers| apply_math(*op, &numbers))
                    .map(Value::from)
                    .unwrap_or(Value::Null)
            }
            Expr::Concat(items) => {
                let mut text = String::new();
                for item in items {
                    match item.evaluate(env) {
                        Value::String(s) => text.push_str(&s),
                        Value::Null => {}
                        other => text.push_str(&other.to_string()),
                    }
                }
                Value::String(text)
            }
        }
    }

    pub fn evaluate_number(&self, env: &MapEnv) -> Option<f64> {
        self.evaluate(env).as_f64()
    }

    pub fn evaluate_bool(&self, env: &MapEnv) -> Option<bool> {
        self.evaluate(env).as_bool()
    }

    pub fn evaluate_string(&self, env: &MapEnv) -> Option<String> {
        match self.evaluate(env) {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

fn compile_call(op: &str, args: &[Value]) -> Result<Expr, ExpressionError> {
    let arity = |expected: std::ops::RangeInclusive<usize>| {
        if expected.contains(&args.len()) {
            Ok(())
        } else {
            Err(ExpressionError::Arity { op: op.to_string(), actual: args.len() })
        }
    };
    let compile_all =
        |items: &[Value]| items.iter().map(Expr::compile).collect::<Result<Vec<_>, _>>();
    let string_arg = |index: usize| {
        args.get(index)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ExpressionError::ExpectedString(op.to_string()))
    };

    match op {
        "literal" => {
            arity(1..=1)?;
            Ok(Expr::Literal(args[0].clone()))
        }
        "zoom" => {
            arity(0..=0)?;
            Ok(Expr::Zoom)
        }
        "get" => {
            arity(1..=2)?;
            Ok(Expr::Get(string_arg(0)?))
        }
        "has" => {
            arity(1..=2)?;
            Ok(Expr::Has(string_arg(0)?))
        }
        "interpolate" => {
            if args.len() < 4 || (args.len() - 2) % 2 != 0 {
                return Err(ExpressionError::Arity { op: op.to_string(), actual: args.len() });
            }
            let mode = compile_interpolation_mode(&args[0])?;
            let input = Box::new(Expr::compile(&args[1])?);
            let stops = compile_stops(op, &args[2..])?;
            Ok(Expr::Interpolate { mode, input, stops })
        }
        "step" => {
            if args.len() < 2 || (args.len() - 2) % 2 != 0 {
                return Err(ExpressionError::Arity { op: op.to_string(), actual: args.len() });
            }
            let input = Box::new(Expr::compile(&args[0])?);
            let default = Box::new(Expr::compile(&args[1])?);
            let stops = compile_stops(op, &args[2..])?;
            Ok(Expr::Step { input, default, stops })
        }
        "match" => {
            if args.len() < 4 || args.len() % 2 != 0 {
                return Err(ExpressionError::Arity { op: op.to_string(), actual: args.len() });
            }
            let input = Box::new(Expr::compile(&args[0])?);
            let fallback = Box::new(Expr::compile(&args[args.len() - 1])?);
            let mut arms = Vec::new();
            for pair in args[1..args.len() - 1].chunks_exact(2) {
                let labels = match &pair[0] {
                    Value::Array(labels) => labels.clone(),
                    label => vec![label.clone()],
                };
                arms.push((labels, Expr::compile(&pair[1])?));
            }
            Ok(Expr::Match { input, arms, fallback })
        }
        "case" => {
            if args.len() % 2 != 1 {
                return Err(ExpressionError::Arity { op: op.to_string(), actual: args.len() });
            }
            let fallback = Box::new(Expr::compile(&args[args.len() - 1])?);
            let mut branches = Vec::new();
            for pair in args[..args.len() - 1].chunks_exact(2) {
                branches.push((Expr::compile(&pair[0])?, Expr::compile(&pair[1])?));
            }
            Ok(Expr::Case { branches, fallback })
        }
        "coalesce" => Ok(Expr::Coalesce(compile_all(args)?)),
        "==" | "!=" | "<" | "<=" | ">" | ">=" => {
            arity(2..=2)?;
            let compare_op = match op {
                "==" => CompareOp::Eq,
                "!=" => CompareOp::Ne,
                "<" => CompareOp::Lt,
                "<=" => CompareOp::Le,
                ">" => CompareOp::Gt,
                _ => CompareOp::Ge,
            };
            Ok(Expr::Compare(
                compare_op,
                Box::new(Expr::compile(&args[0])?),
                Box::new(Expr::compile(&args[1])?),
            ))
        }
        "all" => Ok(Expr::All(compile_all(args)?)),
        "any" => Ok(Expr::Any(compile_all(args)?)),
        "!" => {
            arity(1..=1)?;
            Ok(Expr::Not(Box::new(Expr::compile(&args[0])?)))
        }
        "+" | "*" | "min" | "max" => {
            arity(1..=usize::MAX)?;
            let math_op = match op {
                "+" => MathOp::Add,
                "*" => MathOp::Mul,
                "min" => MathOp::Min,
                _ => MathOp::Max,
            };
            Ok(Expr::Math(math_op, compile_all(args)?))
        }
        "-" => {
            arity(1..=2)?;
            Ok(Expr::Math(MathOp::Sub, compile_all(args)?))
        }
        "/" | "%" | "^" => {
            arity(2..=2)?;
            let math_op = match op {
                "/" => MathOp::Div,
                "%" => MathOp::Mod,
                _ => MathOp::Pow,
            };
            Ok(Expr::Math(math_op, compile_all(args)?))
        }
        "floor" | "ceil" | "abs" | "sqrt" => {
            arity(1..=1)?;
            let math_op = match op {
                "floor" => MathOp::Floor,
                "ceil" => MathOp::Ceil,
                "abs" => MathOp::Abs,
                _ => MathOp::Sqrt,
            };
            Ok(Expr::Math(math_op, compile_all(args)?))
        }
        "concat" => Ok(Expr::Concat(compile_all(args)?)),
        other => Err(ExpressionError::UnknownOperator(other.to_string())),
    }
}

fn compile_interpolation_mode(value: &Value) -> Result<Interpolation, ExpressionError> {
    let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
    match items.first().and_then(Value::as_str) {
        Some("linear") => Ok(Interpolation::Linear),
        Some("discrete") => Ok(Interpolation::Discrete),
        Some("exponential") => {
            let base = items.get(1).and_then(Value::as_f64).unwrap_or(1.0);
            Ok(Interpolation::Exponential(base))
        }
        _ => Err(ExpressionError::UnsupportedInterpolation(value.to_string())),
    }
}

fn compile_stops(op: &str, pairs: &[Value]) -> Result<Vec<(f64, Expr)>, ExpressionError> {
    let mut stops = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks_exact(2) {
        let stop = pair[0]
            .as_f64()
            .ok_or_else(|| ExpressionError::InvalidStops(op.to_string()))?;
        if let Some((previous, _)) = stops.last() {
            if stop <= *previous {
                return Err(ExpressionError::InvalidStops(op.to_string()));
            }
        }
        stops.push((stop, Expr::compile(&pair[1])?));
    }
    Ok(stops)
}

/// `{ "interpolation": ..., "zoomLevels": [...], "values": [...] }`
fn compile_interpolated_property(map: &Map<String, Value>) -> Result<Expr, ExpressionError> {
    let name = map.get("interpolation").and_then(Value::as_str).unwrap_or("Discrete");
    let mode = match name {
        "Discrete" => Interpolation::Discrete,
        "Linear" => Interpolation::Linear,
        "Exponential" => {
            Interpolation::Exponential(map.get("exponent").and_then(Value::as_f64).unwrap_or(2.0))
        }
        other => return Err(ExpressionError::UnsupportedInterpolation(other.to_string())),
    };
    let zoom_levels = map.get("zoomLevels").and_then(Value::as_array);
    let values = map.get("values").and_then(Value::as_array);
    let (Some(zoom_levels), Some(values)) = (zoom_levels, values) else {
        return Err(ExpressionError::InvalidStops("interpolation".to_string()));
    };
    if zoom_levels.is_empty() || zoom_levels.len() != values.len() {
        return Err(ExpressionError::InvalidStops("interpolation".to_string()));
    }
    let pairs: Vec<Value> = zoom_levels
        .iter()
        .zip(values)
        .flat_map(|(zoom, value)| [zoom.clone(), value.clone()])
        .collect();
    let stops = compile_stops("interpolation", &pairs)?;
    Ok(Expr::Interpolate { mode, input: Box::new(Expr::Zoom), stops })
}

fn interpolate(mode: Interpolation, x: f64, stops: &[(f64, Expr)], env: &MapEnv) -> Value {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Value::Null;
    };
    if x <= first.0 {
        return first.1.evaluate(env);
    }
    if x >= last.0 {
        return last.1.evaluate(env);
    }
    let upper = stops.iter().position(|(stop, _)| *stop > x).unwrap_or(stops.len() - 1);
    let (x0, lo) = &stops[upper - 1];
    let (x1, hi) = &stops[upper];
    let lo = lo.evaluate(env);
    if mode == Interpolation::Discrete {
        return lo;
    }
    let t = match mode {
        Interpolation::Exponential(base) if base != 1.0 => {
            (base.powf(x - x0) - 1.0) / (base.powf(x1 - x0) - 1.0)
        }
        _ => (x - x0) / (x1 - x0),
    };
    let hi = hi.evaluate(env);
    if let (Some(a), Some(b)) = (lo.as_f64(), hi.as_f64()) {
        return Value::from(a + (b - a) * t);
    }
    if let (Some(a), Some(b)) = (parse_color(&lo), parse_color(&hi)) {
        let mut mixed = [0.0f32; 4];
        for i in 0..4 {
            mixed[i] = a[i] + (b[i] - a[i]) * t as f32;
        }
        return Value::String(format_color(mixed));
    }
    lo
}

fn apply_math(op: MathOp, numbers: &[f64]) -> Option<f64> {
    let first = *numbers.first()?;
    let second = numbers.get(1).copied();
    let result = match op {
        MathOp::Add => numbers.iter().sum(),
        MathOp::Mul => numbers.iter().product(),
        MathOp::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
        MathOp::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        MathOp::Sub => match second {
            Some(b) => first - b,
            None => -first,
        },
        MathOp::Div => first / second?,
        MathOp::Mod => first % second?,
        MathOp::Pow => first.powf(second?),
        MathOp::Floor => first.floor(),
        MathOp::Ceil => first.ceil(),
        MathOp::Abs => first.abs(),
        MathOp::Sqrt => first.sqrt(),
    };
    result.is_finite().then_some(result)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare(op: CompareOp, a: &Value, b: &Value) -> bool {
    match op {
        CompareOp::Eq => return values_equal(a, b),
        CompareOp::Ne => return !values_equal(a, b),
        _ => {}
    }
    let ordering = match (a, b) {
        (Value::String(x), Value::String(y)) => x.partial_cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::Le => ordering.is_le(),
        CompareOp::Gt => ordering.is_gt(),
        CompareOp::Ge => ordering.is_ge(),
        CompareOp::Eq | CompareOp::Ne => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn zoom_env(zoom: f64) -> MapEnv {
        MapEnv::with_zoom(zoom, None)
    }

    #[test]
    fn test_literal_passthrough() {
        let expr = Expr::compile(&json!(12.5)).unwrap();
        assert!(!expr.is_dynamic());
        assert_eq!(expr.evaluate_number(&MapEnv::new()), Some(12.5));

        // arrays that do not start with an operator are plain values
        let expr = Expr::compile(&json!([1, 2, 3])).unwrap();
        assert_eq!(expr.evaluate(&MapEnv::new()), json!([1, 2, 3]));
    }

    #[test]
    fn test_linear_interpolation_over_zoom() {
        let expr =
            Expr::compile(&json!(["interpolate", ["linear"], ["zoom"], 10, 2, 14, 10])).unwrap();
        assert_relative_eq!(expr.evaluate_number(&zoom_env(8.0)).unwrap(), 2.0);
        assert_relative_eq!(expr.evaluate_number(&zoom_env(12.0)).unwrap(), 6.0);
        assert_relative_eq!(expr.evaluate_number(&zoom_env(20.0)).unwrap(), 10.0);
    }

    #[test]
    fn test_exponential_interpolation() {
        let expr = Expr::compile(&json!(["interpolate", ["exponential", 2], ["zoom"], 0, 0, 2, 3]))
            .unwrap();
        // (2^1 - 1) / (2^2 - 1) = 1/3
        assert_relative_eq!(expr.evaluate_number(&zoom_env(1.0)).unwrap(), 1.0);
    }

    #[test]
    fn test_step_expression() {
        let expr = Expr::compile(&json!(["step", ["zoom"], 1, 10, 5, 15, 9])).unwrap();
        assert_eq!(expr.evaluate_number(&zoom_env(9.9)), Some(1.0));
        assert_eq!(expr.evaluate_number(&zoom_env(10.0)), Some(5.0));
        assert_eq!(expr.evaluate_number(&zoom_env(16.0)), Some(9.0));
    }

    #[test]
    fn test_interpolated_property_object() {
        let expr = Expr::compile(&json!({
            "interpolation": "Discrete",
            "zoomLevels": [5, 10],
            "values": [100, 200]
        }))
        .unwrap();
        assert_eq!(expr.evaluate_number(&zoom_env(7.5)), Some(100.0));
        assert_eq!(expr.evaluate_number(&zoom_env(10.2)), Some(200.0));
    }

    #[test]
    fn test_match_case_and_get() {
        let mut env = MapEnv::new();
        env.insert("kind", json!("major_road"));
        env.insert("lanes", json!(4));

        let expr = Expr::compile(&json!([
            "match", ["get", "kind"], ["highway", "major_road"], 1, "minor_road", 2, 3
        ]))
        .unwrap();
        assert_eq!(expr.evaluate_number(&env), Some(1.0));

        let expr = Expr::compile(&json!([
            "case", [">=", ["get", "lanes"], 4], "wide", "narrow"
        ]))
        .unwrap();
        assert_eq!(expr.evaluate_string(&env).as_deref(), Some("wide"));
    }

    #[test]
    fn test_env_parent_chain() {
        let mut parent = MapEnv::new();
        parent.insert("$pixelToMeters", json!(2.0));
        let env = MapEnv::with_zoom(11.0, Some(Arc::new(parent)));

        let expr = Expr::compile(&json!(["*", ["zoom"], ["get", "$pixelToMeters"]])).unwrap();
        assert_eq!(expr.evaluate_number(&env), Some(22.0));
    }

    #[test]
    fn test_color_interpolation() {
        let expr = Expr::compile(&json!([
            "interpolate", ["linear"], ["zoom"], 0, "#000000", 10, "#ffffff"
        ]))
        .unwrap();
        let color = parse_color(&expr.evaluate(&zoom_env(5.0))).unwrap();
        assert_relative_eq!(color[0], 0.5, epsilon = 0.01);
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(
            Expr::compile(&json!(["no-such-op", 1])),
            Err(ExpressionError::UnknownOperator("no-such-op".to_string()))
        );
        assert!(matches!(
            Expr::compile(&json!(["interpolate", ["linear"], ["zoom"], 10, 1, 5, 2])),
            Err(ExpressionError::InvalidStops(_))
        ));
        assert!(matches!(
            Expr::compile(&json!(["get", 3])),
            Err(ExpressionError::ExpectedString(_))
        ));
    }
}
