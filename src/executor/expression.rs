use std::cmp::Ordering;

use parquet::record::Field;
use regex::RegexBuilder;
use sqlparser::ast::{
    BinaryOperator, DataType, Expr, Function, FunctionArg, FunctionArgExpr, Ident,
    TrimWhereField, UnaryOperator, Value,
};

use crate::{
    planner::{is_aggregate, OutputSchema},
    storage::Affinity,
    types::{error::Error, Row, TupleValue},
};

const MAX_ROUND_DIGITS: i64 = 30;
const SUBSTR_BOUND: i64 = 1 << 40;

pub struct ExprEvaluator;

impl ExprEvaluator {
    pub fn to_boolean(field: &Field) -> bool {
        match field {
            Field::Bool(b) => *b,
            Field::Int(i) => *i != 0,
            Field::Long(l) => *l != 0,
            Field::Float(f) => *f != 0.0,
            Field::Double(d) => *d != 0.0,
            Field::Str(s) => s.trim().parse::<f64>().map(|n| n != 0.0).unwrap_or(false),
            Field::Null => false,
            _ => false,
        }
    }

    pub fn to_integer(field: &Field) -> Option<i64> {
        match field {
            Field::Bool(b) => Some(i64::from(*b)),
            Field::Int(i) => Some(*i as i64),
            Field::Long(l) => Some(*l),
            Field::Float(f) => Some(*f as i64),
            Field::Double(d) => Some(*d as i64),
            Field::Str(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|d| d as i64))
            }
            _ => None,
        }
    }

    pub fn to_f64(field: &Field) -> Option<f64> {
        match field {
            Field::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Field::Int(i) => Some(*i as f64),
            Field::Long(l) => Some(*l as f64),
            Field::Float(f) => Some(*f as f64),
            Field::Double(d) => Some(*d),
            Field::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    fn is_integral(field: &Field) -> bool {
        matches!(field, Field::Bool(_) | Field::Int(_) | Field::Long(_))
    }

    fn is_numeric(field: &Field) -> bool {
        matches!(
            field,
            Field::Bool(_) | Field::Int(_) | Field::Long(_) | Field::Float(_) | Field::Double(_)
        )
    }

    /// Compares two non-NULL values; numbers order before text.
    /// Returns `None` when either side is NULL.
    pub fn compare(left: &Field, right: &Field) -> Option<Ordering> {
        match (left, right) {
            (Field::Null, _) | (_, Field::Null) => None,
            (Field::Str(l), Field::Str(r)) => Some(l.cmp(r)),
            (l, r) if Self::is_integral(l) && Self::is_integral(r) => {
                Some(Self::to_integer(l)?.cmp(&Self::to_integer(r)?))
            }
            (l, r) if Self::is_numeric(l) && Self::is_numeric(r) => {
                Self::to_f64(l)?.partial_cmp(&Self::to_f64(r)?)
            }
            (l, _) if Self::is_numeric(l) => Some(Ordering::Less),
            (_, r) if Self::is_numeric(r) => Some(Ordering::Greater),
            (l, r) => Some(TupleValue::from(l.clone())
                .to_string()
                .cmp(&TupleValue::from(r.clone()).to_string())),
        }
    }

    /// Total order used by ORDER BY, where NULL is the smallest value.
    pub fn sort_compare(left: &Field, right: &Field) -> Ordering {
        match (left, right) {
            (Field::Null, Field::Null) => Ordering::Equal,
            (Field::Null, _) => Ordering::Less,
            (_, Field::Null) => Ordering::Greater,
            (l, r) => Self::compare(l, r).unwrap_or(Ordering::Equal),
        }
    }

    pub fn evaluate(expr: &Expr, row: &Row, columns: &OutputSchema) -> Result<Field, Error> {
        match expr {
            Expr::Nested(expr) => Self::evaluate(expr, row, columns),
            Expr::UnaryOp { op, expr } => Self::evaluate_unary_op(op, expr, row, columns),
            Expr::BinaryOp { left, op, right } => {
                let left = Self::evaluate(left, row, columns)?;
                let right = Self::evaluate(right, row, columns)?;

                Self::evaluate_binary_op(&left, op, &right)
            }
            Expr::Identifier(ident) => Self::evaluate_identifier(None, ident, row, columns),
            Expr::CompoundIdentifier(idents) => match idents.split_last() {
                Some((column, qualifier)) if !qualifier.is_empty() => {
                    let table = qualifier
                        .iter()
                        .map(|i| i.value.clone())
                        .collect::<Vec<String>>()
                        .join(".");
                    Self::evaluate_identifier(Some(&table), column, row, columns)
                }
                Some((column, _)) => Self::evaluate_identifier(None, column, row, columns),
                None => Err(Error::Expression("empty identifier".to_string())),
            },
            Expr::Value(value) => Self::evaluate_value(value),
            Expr::IsNull(expr) => Ok(Field::Bool(
                Self::evaluate(expr, row, columns)? == Field::Null,
            )),
            Expr::IsNotNull(expr) => Ok(Field::Bool(
                Self::evaluate(expr, row, columns)? != Field::Null,
            )),
            Expr::Between {
                expr,
                negated,
                low,
                high,
            } => {
                let value = Self::evaluate(expr, row, columns)?;
                let low = Self::evaluate(low, row, columns)?;
                let high = Self::evaluate(high, row, columns)?;

                let above = Self::evaluate_binary_op(&value, &BinaryOperator::GtEq, &low)?;
                let below = Self::evaluate_binary_op(&value, &BinaryOperator::LtEq, &high)?;
                let within = Self::evaluate_binary_op(&above, &BinaryOperator::And, &below)?;

                Ok(Self::negate_if(within, *negated))
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                if list.is_empty() {
                    return Ok(Field::Bool(*negated));
                }

                let value = Self::evaluate(expr, row, columns)?;
                if value == Field::Null {
                    return Ok(Field::Null);
                }

                let mut saw_null = false;
                for item in list {
                    let candidate = Self::evaluate(item, row, columns)?;
                    match Self::compare(&value, &candidate) {
                        Some(Ordering::Equal) => return Ok(Field::Bool(!*negated)),
                        None => saw_null = true,
                        _ => {}
                    }
                }

                if saw_null {
                    Ok(Field::Null)
                } else {
                    Ok(Field::Bool(*negated))
                }
            }
            Expr::Like {
                negated,
                expr,
                pattern,
                ..
            }
            | Expr::ILike {
                negated,
                expr,
                pattern,
                ..
            } => {
                let value = Self::evaluate(expr, row, columns)?;
                let pattern = Self::evaluate(pattern, row, columns)?;
                if value == Field::Null || pattern == Field::Null {
                    return Ok(Field::Null);
                }

                let matched = Self::like(
                    &TupleValue::from(value).to_string(),
                    &TupleValue::from(pattern).to_string(),
                )?;
                Ok(Field::Bool(matched != *negated))
            }
            Expr::Cast {
                expr, data_type, ..
            } => {
                let field = Self::evaluate(expr, row, columns)?;
                Caster::cast(&field, data_type)
            }
            Expr::Case {
                operand,
                conditions,
                results,
                else_result,
            } => {
                let operand = match operand {
                    Some(operand) => Some(Self::evaluate(operand, row, columns)?),
                    None => None,
                };

                for (condition, result) in conditions.iter().zip(results.iter()) {
                    let condition = Self::evaluate(condition, row, columns)?;
                    let taken = match &operand {
                        Some(operand) => {
                            Self::compare(operand, &condition) == Some(Ordering::Equal)
                        }
                        None => Self::to_boolean(&condition),
                    };
                    if taken {
                        return Self::evaluate(result, row, columns);
                    }
                }

                match else_result {
                    Some(else_result) => Self::evaluate(else_result, row, columns),
                    None => Ok(Field::Null),
                }
            }
            Expr::Substring {
                expr,
                substring_from,
                substring_for,
                ..
            } => {
                let value = Self::evaluate(expr, row, columns)?;
                let start = match substring_from {
                    Some(start) => Self::evaluate(start, row, columns)?,
                    None => Field::Long(1),
                };
                let length = match substring_for {
                    Some(length) => Some(Self::evaluate(length, row, columns)?),
                    None => None,
                };
                Self::substr(&value, &start, length.as_ref())
            }
            Expr::Trim {
                expr,
                trim_where,
                trim_what,
                ..
            } => {
                let value = Self::evaluate(expr, row, columns)?;
                let what = match trim_what {
                    Some(what) => Self::evaluate(what, row, columns)?,
                    None => Field::Str(" ".to_string()),
                };
                if value == Field::Null || what == Field::Null {
                    return Ok(Field::Null);
                }

                let value = TupleValue::from(value).to_string();
                let what: Vec<char> = TupleValue::from(what).to_string().chars().collect();
                let trimmed = match trim_where {
                    Some(TrimWhereField::Leading) => value.trim_start_matches(&what[..]),
                    Some(TrimWhereField::Trailing) => value.trim_end_matches(&what[..]),
                    _ => value.trim_matches(&what[..]),
                };
                Ok(Field::Str(trimmed.to_string()))
            }
            Expr::Function(function) => Self::evaluate_function(function, row, columns),
            _ => Err(Error::Expression(format!(
                "Unsupported expression: {}",
                expr
            ))),
        }
    }

    fn negate_if(field: Field, negated: bool) -> Field {
        match field {
            Field::Null => Field::Null,
            other if negated => Field::Bool(!Self::to_boolean(&other)),
            other => other,
        }
    }

    pub fn evaluate_identifier(
        table: Option<&str>,
        ident: &Ident,
        row: &Row,
        output_schema: &OutputSchema,
    ) -> Result<Field, Error> {
        match output_schema.resolve_qualified(table, &ident.value) {
            Ok(index) => row
                .get(index)
                .map(|v| v.value.clone())
                .ok_or_else(|| Error::Expression(format!("no such column: {}", ident))),
            // SQLite reads an unresolvable "double quoted" name as a string
            Err(_) if table.is_none() && ident.quote_style == Some('"') => {
                Ok(Field::Str(ident.value.clone()))
            }
            Err(e) => Err(e),
        }
    }

    pub fn evaluate_unary_op(
        op: &UnaryOperator,
        expr: &Expr,
        row: &Row,
        columns: &OutputSchema,
    ) -> Result<Field, Error> {
        let field = Self::evaluate(expr, row, columns)?;
        if field == Field::Null {
            return Ok(Field::Null);
        }

        match op {
            UnaryOperator::Not => Ok(Field::Bool(!Self::to_boolean(&field))),
            UnaryOperator::Plus => Ok(field),
            UnaryOperator::Minus => match field {
                Field::Bool(b) => Ok(Field::Long(-i64::from(b))),
                Field::Int(i) => Ok(Field::Long(-(i as i64))),
                Field::Long(l) => Ok(l
                    .checked_neg()
                    .map(Field::Long)
                    .unwrap_or(Field::Double(-(l as f64)))),
                Field::Float(f) => Ok(Field::Float(-f)),
                Field::Double(d) => Ok(Field::Double(-d)),
                other => Ok(Field::Double(-Self::to_f64(&other).unwrap_or(0.0))),
            },
            _ => Err(Error::Expression(format!(
                "Unsupported unary operation: {} {}",
                op, field
            ))),
        }
    }

    pub fn evaluate_binary_op(
        left: &Field,
        op: &BinaryOperator,
        right: &Field,
    ) -> Result<Field, Error> {
        match op {
            BinaryOperator::And => {
                let left_false = *left != Field::Null && !Self::to_boolean(left);
                let right_false = *right != Field::Null && !Self::to_boolean(right);
                if left_false || right_false {
                    Ok(Field::Bool(false))
                } else if *left == Field::Null || *right == Field::Null {
                    Ok(Field::Null)
                } else {
                    Ok(Field::Bool(true))
                }
            }
            BinaryOperator::Or => {
                if Self::to_boolean(left) || Self::to_boolean(right) {
                    Ok(Field::Bool(true))
                } else if *left == Field::Null || *right == Field::Null {
                    Ok(Field::Null)
                } else {
                    Ok(Field::Bool(false))
                }
            }
            BinaryOperator::Xor => match (left, right) {
                (Field::Null, _) | (_, Field::Null) => Ok(Field::Null),
                (l, r) => Ok(Field::Bool(Self::to_boolean(l) != Self::to_boolean(r))),
            },
            BinaryOperator::Eq => Ok(Self::comparison(left, right, |o| o == Ordering::Equal)),
            BinaryOperator::NotEq => Ok(Self::comparison(left, right, |o| o != Ordering::Equal)),
            BinaryOperator::Lt => Ok(Self::comparison(left, right, |o| o == Ordering::Less)),
            BinaryOperator::LtEq => Ok(Self::comparison(left, right, |o| o != Ordering::Greater)),
            BinaryOperator::Gt => Ok(Self::comparison(left, right, |o| o == Ordering::Greater)),
            BinaryOperator::GtEq => Ok(Self::comparison(left, right, |o| o != Ordering::Less)),
            BinaryOperator::StringConcat => match (left, right) {
                (Field::Null, _) | (_, Field::Null) => Ok(Field::Null),
                (l, r) => Ok(Field::Str(format!(
                    "{}{}",
                    TupleValue::from(l.clone()),
                    TupleValue::from(r.clone())
                ))),
            },
            BinaryOperator::Plus => BinaryOpEvaluator::arithmetic(left, op, right),
            BinaryOperator::Minus => BinaryOpEvaluator::arithmetic(left, op, right),
            BinaryOperator::Multiply => BinaryOpEvaluator::arithmetic(left, op, right),
            BinaryOperator::Divide => BinaryOpEvaluator::arithmetic(left, op, right),
            BinaryOperator::Modulo => BinaryOpEvaluator::arithmetic(left, op, right),
            _ => Err(Error::Expression(format!(
                "Binary operation {} not supported",
                op
            ))),
        }
    }

    fn comparison(left: &Field, right: &Field, accept: impl Fn(Ordering) -> bool) -> Field {
        match Self::compare(left, right) {
            Some(ordering) => Field::Bool(accept(ordering)),
            None => Field::Null,
        }
    }

    // Converts from sqlparser::ast::Value to parquet::record::Field
    pub fn evaluate_value(value: &Value) -> Result<Field, Error> {
        match value {
            Value::Number(n, _b) => {
                if let Ok(l) = n.parse::<i64>() {
                    Ok(Field::Long(l))
                } else if let Ok(d) = n.parse::<f64>() {
                    Ok(Field::Double(d))
                } else {
                    Err(Error::Expression("Unable to parse Number".to_string()))
                }
            }
            Value::Boolean(b) => Ok(Field::Bool(*b)),
            Value::SingleQuotedString(s) => Ok(Field::Str(s.to_string())),
            Value::Null => Ok(Field::Null),
            _ => Err(Error::Expression(format!("Unsupported value: {}", value))),
        }
    }

    fn evaluate_function(
        function: &Function,
        row: &Row,
        columns: &OutputSchema,
    ) -> Result<Field, Error> {
        // aggregates were computed below this expression and are read back by name
        if is_aggregate(function) {
            let index = columns
                .resolve_qualified(None, &function.to_string())
                .map_err(|_| {
                    Error::Expression(format!("misuse of aggregate function {}", function))
                })?;
            return Ok(row[index].value.clone());
        }

        let args = function
            .args
            .iter()
            .map(|arg| match arg {
                FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => Self::evaluate(e, row, columns),
                _ => Err(Error::Expression(format!(
                    "Unsupported argument {} for function {}",
                    arg, function.name
                ))),
            })
            .collect::<Result<Vec<Field>, Error>>()?;

        let name = function.name.to_string().to_lowercase();
        match (name.as_str(), args.as_slice()) {
            ("coalesce" | "ifnull", args) if !args.is_empty() => Ok(args
                .iter()
                .find(|f| **f != Field::Null)
                .cloned()
                .unwrap_or(Field::Null)),
            ("nullif", [left, right]) => match Self::compare(left, right) {
                Some(Ordering::Equal) => Ok(Field::Null),
                _ => Ok(left.clone()),
            },
            // multi-argument min/max are scalar and NULL if any argument is
            ("max" | "min", args) if args.len() > 1 => {
                if args.contains(&Field::Null) {
                    return Ok(Field::Null);
                }
                let wanted = if name == "max" {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
                let mut best = &args[0];
                for candidate in &args[1..] {
                    if Self::sort_compare(candidate, best) == wanted {
                        best = candidate;
                    }
                }
                Ok(best.clone())
            }
            (_, [Field::Null, ..]) => Ok(Field::Null),
            ("substr" | "substring", [value, start]) => Self::substr(value, start, None),
            ("substr" | "substring", [value, start, length]) => {
                Self::substr(value, start, Some(length))
            }
            ("replace", [value, from, to]) => {
                if *from == Field::Null || *to == Field::Null {
                    return Ok(Field::Null);
                }
                let value = TupleValue::from(value.clone()).to_string();
                let from = TupleValue::from(from.clone()).to_string();
                if from.is_empty() {
                    return Ok(Field::Str(value));
                }
                Ok(Field::Str(
                    value.replace(&from, &TupleValue::from(to.clone()).to_string()),
                ))
            }
            ("instr", [haystack, needle]) => {
                if *needle == Field::Null {
                    return Ok(Field::Null);
                }
                let haystack = TupleValue::from(haystack.clone()).to_string();
                let needle = TupleValue::from(needle.clone()).to_string();
                Ok(Field::Long(match haystack.find(&needle) {
                    Some(byte) => haystack[..byte].chars().count() as i64 + 1,
                    None => 0,
                }))
            }
            ("ltrim", [value]) => Ok(Field::Str(
                TupleValue::from(value.clone()).to_string().trim_start_matches(' ').to_string(),
            )),
            ("rtrim", [value]) => Ok(Field::Str(
                TupleValue::from(value.clone()).to_string().trim_end_matches(' ').to_string(),
            )),
            ("upper", [value]) => Ok(Field::Str(
                TupleValue::from(value.clone()).to_string().to_uppercase(),
            )),
            ("lower", [value]) => Ok(Field::Str(
                TupleValue::from(value.clone()).to_string().to_lowercase(),
            )),
            ("length", [value]) => Ok(Field::Long(
                TupleValue::from(value.clone()).to_string().chars().count() as i64,
            )),
            ("abs", [value]) => match value {
                Field::Long(l) => l
                    .checked_abs()
                    .map(Field::Long)
                    .ok_or_else(|| Error::Expression("integer overflow".to_string())),
                Field::Int(i) => Ok(Field::Long((*i as i64).abs())),
                Field::Bool(b) => Ok(Field::Long(i64::from(*b))),
                other => Ok(Field::Double(Self::to_f64(other).unwrap_or(0.0).abs())),
            },
            ("round", [value]) => Ok(Field::Double(Self::to_f64(value).unwrap_or(0.0).round())),
            ("round", [value, digits]) => {
                if *digits == Field::Null {
                    return Ok(Field::Null);
                }
                let digits = Self::to_integer(digits).unwrap_or(0).clamp(0, MAX_ROUND_DIGITS);
                let value = Self::to_f64(value).unwrap_or(0.0);
                let factor = 10f64.powi(digits as i32);
                let scaled = value * factor;
                if !scaled.is_finite() {
                    return Ok(Field::Double(value));
                }
                Ok(Field::Double(scaled.round() / factor))
            }
            _ => Err(Error::Expression(format!(
                "Unsupported function: {}",
                function
            ))),
        }
    }

    /// SUBSTR with 1-based `start`; a negative `start` counts from the end
    /// and a negative `length` takes the characters before `start`.
    fn substr(value: &Field, start: &Field, length: Option<&Field>) -> Result<Field, Error> {
        if *value == Field::Null || *start == Field::Null || length == Some(&Field::Null) {
            return Ok(Field::Null);
        }

        let chars: Vec<char> = TupleValue::from(value.clone()).to_string().chars().collect();
        let len = chars.len() as i64;
        let mut p1 = Self::to_integer(start).unwrap_or(0).clamp(-SUBSTR_BOUND, SUBSTR_BOUND);
        let mut p2 = match length {
            Some(length) => Self::to_integer(length)
                .unwrap_or(0)
                .clamp(-SUBSTR_BOUND, SUBSTR_BOUND),
            None => SUBSTR_BOUND,
        };

        let negative_length = p2 < 0;
        if negative_length {
            p2 = -p2;
        }
        if p1 < 0 {
            p1 += len;
            if p1 < 0 {
                p2 = (p2 + p1).max(0);
                p1 = 0;
            }
        } else if p1 > 0 {
            p1 -= 1;
        } else if p2 > 0 {
            p2 -= 1;
        }
        if negative_length {
            p1 -= p2;
            if p1 < 0 {
                p2 += p1;
                p1 = 0;
            }
        }
        if p1 + p2 > len {
            p2 = (len - p1).max(0);
        }

        Ok(Field::Str(
            chars
                .iter()
                .skip(p1.max(0) as usize)
                .take(p2.max(0) as usize)
                .collect(),
        ))
    }

    /// SQL LIKE: `%` matches any run, `_` a single character. Only ASCII
    /// letters match case-insensitively.
    pub fn like(value: &str, pattern: &str) -> Result<bool, Error> {
        let mut regex = String::from("^");
        for c in pattern.chars() {
            match c {
                '%' => regex.push_str(".*"),
                '_' => regex.push('.'),
                c if c.is_ascii_alphabetic() => {
                    regex.push('[');
                    regex.push(c.to_ascii_lowercase());
                    regex.push(c.to_ascii_uppercase());
                    regex.push(']');
                }
                c => regex.push_str(&regex::escape(&c.to_string())),
            }
        }
        regex.push('$');

        let matcher = RegexBuilder::new(&regex)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| Error::Expression(e.to_string()))?;
        Ok(matcher.is_match(value))
    }
}

pub struct BinaryOpEvaluator;

impl BinaryOpEvaluator {
    fn arithmetic(left: &Field, op: &BinaryOperator, right: &Field) -> Result<Field, Error> {
        if *left == Field::Null || *right == Field::Null {
            return Ok(Field::Null);
        }

        if ExprEvaluator::is_integral(left) && ExprEvaluator::is_integral(right) {
            let l = ExprEvaluator::to_integer(left).unwrap_or(0);
            let r = ExprEvaluator::to_integer(right).unwrap_or(0);

            let result = match op {
                BinaryOperator::Plus => l.checked_add(r),
                BinaryOperator::Minus => l.checked_sub(r),
                BinaryOperator::Multiply => l.checked_mul(r),
                // division by zero yields NULL
                BinaryOperator::Divide if r == 0 => return Ok(Field::Null),
                BinaryOperator::Divide => l.checked_div(r),
                BinaryOperator::Modulo if r == 0 => return Ok(Field::Null),
                BinaryOperator::Modulo => Some(l.wrapping_rem(r)),
                _ => None,
            };

            if let Some(value) = result {
                return Ok(Field::Long(value));
            }
        }

        let l = ExprEvaluator::to_f64(left).unwrap_or(0.0);
        let r = ExprEvaluator::to_f64(right).unwrap_or(0.0);

        match op {
            BinaryOperator::Plus => Ok(Field::Double(l + r)),
            BinaryOperator::Minus => Ok(Field::Double(l - r)),
            BinaryOperator::Multiply => Ok(Field::Double(l * r)),
            BinaryOperator::Divide if r == 0.0 => Ok(Field::Null),
            BinaryOperator::Divide => Ok(Field::Double(l / r)),
            BinaryOperator::Modulo => {
                let (l, r) = (l as i64, r as i64);
                match l.checked_rem(r) {
                    Some(remainder) => Ok(Field::Double(remainder as f64)),
                    None if r == 0 => Ok(Field::Null),
                    // i64::MIN % -1
                    None => Ok(Field::Double(0.0)),
                }
            }
            _ => Err(Error::Expression(format!(
                "Unsupported binary operation: {} {} {}",
                left, op, right
            ))),
        }
    }
}

pub struct Caster {}

impl Caster {
    pub fn cast(field: &Field, data_type: &DataType) -> Result<Field, Error> {
        if *field == Field::Null {
            return Ok(Field::Null);
        }

        match Affinity::from_declared_type(&data_type.to_string()) {
            Affinity::Integer => Ok(Field::Long(ExprEvaluator::to_integer(field).unwrap_or(0))),
            Affinity::Real => Ok(Field::Double(ExprEvaluator::to_f64(field).unwrap_or(0.0))),
            Affinity::Text => Ok(Field::Str(TupleValue::from(field.clone()).to_string())),
            affinity => Ok(affinity.coerce(field.clone())),
        }
    }
}
