//! Condition rules and property-path resolution used by conditional nodes (§4.7).
//!
//! A [`ConditionRule`] owns the path it resolves against its evaluation target, so
//! `rule.evaluate(target)` is a single call: resolve the path, then apply the rule's
//! operator to whatever it found. A [`Combinator`] folds a whole rule list into one
//! boolean (`AND`/`OR`).
//!
//! Two evaluation-target backends exist, selected at the call site via [`EvalTarget`]:
//! a structured JSON value (member access) and a generic `Map<String, Value>` composite
//! for context-stored values that aren't raw JSON (§9 design notes — true struct
//! reflection is out of scope; embedders that need it adapt into the map backend).

use crate::error::{GraphError, Result};
use serde_json::Value;
use std::collections::HashMap;

/// The value a [`ConditionRule`] or [`crate::condition::PropertyPathResolver`] resolves
/// paths against. Holds only references, so it is cheap to pass/copy across a whole
/// rule list.
#[derive(Clone, Copy)]
pub enum EvalTarget<'a> {
    Json(&'a Value),
    Object(&'a HashMap<String, Value>),
}

/// Resolves dot-separated property paths against an [`EvalTarget`].
pub struct PropertyPathResolver;

impl PropertyPathResolver {
    /// Empty path resolves to the target itself. Otherwise each segment must name an
    /// object member (case-insensitive fallback when an exact match is absent); a
    /// missing segment, a `null` intermediate, or a non-object intermediate is a
    /// [`GraphError::Resolution`].
    pub fn resolve(target: EvalTarget, path: &str) -> Result<Value> {
        if path.trim().is_empty() {
            return Ok(match target {
                EvalTarget::Json(value) => value.clone(),
                EvalTarget::Object(map) => {
                    serde_json::to_value(map).unwrap_or(Value::Null)
                }
            });
        }

        let mut segments = path.split('.');
        let mut current = match target {
            EvalTarget::Json(value) => value.clone(),
            EvalTarget::Object(map) => {
                // Unwrap is safe: `path` was checked non-empty above, so split('.')
                // always yields at least one segment.
                let first = segments.next().unwrap();
                lookup_member(map, first)
                    .ok_or_else(|| GraphError::resolution(path, format!("missing segment '{first}'")))?
            }
        };

        for segment in segments {
            current = descend(&current, segment, path)?;
        }
        Ok(current)
    }
}

fn lookup_member(map: &HashMap<String, Value>, key: &str) -> Option<Value> {
    if let Some(v) = map.get(key) {
        return Some(v.clone());
    }
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.clone())
}

fn descend(current: &Value, segment: &str, full_path: &str) -> Result<Value> {
    match current {
        Value::Object(obj) => {
            if let Some(v) = obj.get(segment) {
                return Ok(v.clone());
            }
            obj.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(segment))
                .map(|(_, v)| v.clone())
                .ok_or_else(|| {
                    GraphError::resolution(full_path, format!("missing segment '{segment}'"))
                })
        }
        Value::Null => Err(GraphError::resolution(
            full_path,
            format!("intermediate value is null at segment '{segment}'"),
        )),
        _ => Err(GraphError::resolution(
            full_path,
            format!("cannot traverse into a non-object value at segment '{segment}'"),
        )),
    }
}

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl NumericOp {
    fn apply(self, value: f64, compare_to: f64) -> bool {
        match self {
            NumericOp::Eq => value == compare_to,
            NumericOp::Ne => value != compare_to,
            NumericOp::Gt => value > compare_to,
            NumericOp::Lt => value < compare_to,
            NumericOp::Ge => value >= compare_to,
            NumericOp::Le => value <= compare_to,
        }
    }
}

/// String comparison operators. The `Ci` suffix marks a case-insensitive variant,
/// case-folded via `str::to_lowercase` (a reasonable culture-independent fold for the
/// ASCII/Latin content these rules are expected to see).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOp {
    Eq,
    EqCi,
    Ne,
    NeCi,
    Contains,
    ContainsCi,
    StartsWith,
    StartsWithCi,
    EndsWith,
    EndsWithCi,
    IsEmpty,
    IsNotEmpty,
}

impl StringOp {
    fn apply(self, value: &Value, compare_to: Option<&str>) -> bool {
        if matches!(self, StringOp::IsEmpty | StringOp::IsNotEmpty) {
            let coerced = coerce_to_string(value);
            return match self {
                StringOp::IsEmpty => coerced.is_empty(),
                StringOp::IsNotEmpty => !coerced.is_empty(),
                _ => unreachable!(),
            };
        }

        let (Some(s), Some(cmp)) = (value.as_str(), compare_to) else {
            return false;
        };
        match self {
            StringOp::Eq => s == cmp,
            StringOp::EqCi => s.to_lowercase() == cmp.to_lowercase(),
            StringOp::Ne => s != cmp,
            StringOp::NeCi => s.to_lowercase() != cmp.to_lowercase(),
            StringOp::Contains => s.contains(cmp),
            StringOp::ContainsCi => s.to_lowercase().contains(&cmp.to_lowercase()),
            StringOp::StartsWith => s.starts_with(cmp),
            StringOp::StartsWithCi => s.to_lowercase().starts_with(&cmp.to_lowercase()),
            StringOp::EndsWith => s.ends_with(cmp),
            StringOp::EndsWithCi => s.to_lowercase().ends_with(&cmp.to_lowercase()),
            StringOp::IsEmpty | StringOp::IsNotEmpty => unreachable!(),
        }
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// A single condition: a path to resolve plus the operator/operand to apply to it.
#[derive(Debug, Clone)]
pub enum ConditionRule {
    Numeric {
        path: String,
        op: NumericOp,
        compare_to: f64,
    },
    String {
        path: String,
        op: StringOp,
        compare_to: Option<String>,
    },
}

impl ConditionRule {
    pub fn numeric(path: impl Into<String>, op: NumericOp, compare_to: f64) -> Self {
        Self::Numeric {
            path: path.into(),
            op,
            compare_to,
        }
    }

    pub fn string(path: impl Into<String>, op: StringOp, compare_to: Option<String>) -> Self {
        Self::String {
            path: path.into(),
            op,
            compare_to,
        }
    }

    fn path(&self) -> &str {
        match self {
            ConditionRule::Numeric { path, .. } => path,
            ConditionRule::String { path, .. } => path,
        }
    }

    /// Resolves this rule's path against `target`, then applies its operator. Any
    /// resolution failure or type mismatch (non-numeric value for a numeric rule,
    /// non-string value for anything but `isEmpty`/`isNotEmpty`) evaluates to `false`
    /// rather than propagating an error — condition rules are a closed, total function
    /// from target to bool.
    pub fn evaluate(&self, target: EvalTarget) -> bool {
        let Ok(resolved) = PropertyPathResolver::resolve(target, self.path()) else {
            return false;
        };
        match self {
            ConditionRule::Numeric { op, compare_to, .. } => match value_to_f64(&resolved) {
                Some(n) => op.apply(n, *compare_to),
                None => false,
            },
            ConditionRule::String { op, compare_to, .. } => {
                op.apply(&resolved, compare_to.as_deref())
            }
        }
    }
}

/// Combines a list of [`ConditionRule`]s into a single boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn evaluate(self, rules: &[ConditionRule], target: EvalTarget) -> bool {
        match self {
            Combinator::And => rules.iter().all(|r| r.evaluate(target)),
            Combinator::Or => rules.iter().any(|r| r.evaluate(target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_path_resolves_to_target_itself() {
        let value = json!({"a": 1});
        let resolved = PropertyPathResolver::resolve(EvalTarget::Json(&value), "").unwrap();
        assert_eq!(resolved, value);
    }

    #[test]
    fn dotted_path_traverses_nested_objects() {
        let value = json!({"status": {"code": "active"}});
        let resolved =
            PropertyPathResolver::resolve(EvalTarget::Json(&value), "status.code").unwrap();
        assert_eq!(resolved, json!("active"));
    }

    #[test]
    fn case_insensitive_fallback_matches_member() {
        let value = json!({"Status": "active"});
        let resolved = PropertyPathResolver::resolve(EvalTarget::Json(&value), "status").unwrap();
        assert_eq!(resolved, json!("active"));
    }

    #[test]
    fn missing_segment_is_a_resolution_error() {
        let value = json!({"a": 1});
        let err = PropertyPathResolver::resolve(EvalTarget::Json(&value), "b").unwrap_err();
        assert!(matches!(err, GraphError::Resolution { .. }));
    }

    #[test]
    fn intermediate_null_is_a_resolution_error() {
        let value = json!({"a": null});
        let err = PropertyPathResolver::resolve(EvalTarget::Json(&value), "a.b").unwrap_err();
        assert!(matches!(err, GraphError::Resolution { .. }));
    }

    #[test]
    fn object_backend_resolves_then_continues_as_json() {
        let mut map = HashMap::new();
        map.insert("payload".to_string(), json!({"count": 5}));
        let resolved =
            PropertyPathResolver::resolve(EvalTarget::Object(&map), "payload.count").unwrap();
        assert_eq!(resolved, json!(5));
    }

    #[test]
    fn numeric_rule_evaluates_operator() {
        let value = json!({"count": 10});
        let rule = ConditionRule::numeric("count", NumericOp::Gt, 5.0);
        assert!(rule.evaluate(EvalTarget::Json(&value)));

        let rule = ConditionRule::numeric("count", NumericOp::Lt, 5.0);
        assert!(!rule.evaluate(EvalTarget::Json(&value)));
    }

    #[test]
    fn numeric_rule_on_non_numeric_value_is_false() {
        let value = json!({"count": "not a number"});
        let rule = ConditionRule::numeric("count", NumericOp::Eq, 5.0);
        assert!(!rule.evaluate(EvalTarget::Json(&value)));
    }

    #[test]
    fn string_rule_case_insensitive_equals() {
        let value = json!({"status": "ACTIVE"});
        let rule = ConditionRule::string(
            "status",
            StringOp::EqCi,
            Some("active".to_string()),
        );
        assert!(rule.evaluate(EvalTarget::Json(&value)));
    }

    #[test]
    fn is_empty_treats_null_and_empty_string_as_empty() {
        let value = json!({"name": null});
        let rule = ConditionRule::string("name", StringOp::IsEmpty, None);
        assert!(rule.evaluate(EvalTarget::Json(&value)));

        let value = json!({"name": ""});
        assert!(rule.evaluate(EvalTarget::Json(&value)));

        let value = json!({"name": "present"});
        assert!(!rule.evaluate(EvalTarget::Json(&value)));
    }

    #[test]
    fn combinator_and_requires_all_rules() {
        let value = json!({"count": 10, "status": "active"});
        let rules = vec![
            ConditionRule::numeric("count", NumericOp::Gt, 5.0),
            ConditionRule::string("status", StringOp::Eq, Some("inactive".to_string())),
        ];
        assert!(!Combinator::And.evaluate(&rules, EvalTarget::Json(&value)));
        assert!(Combinator::Or.evaluate(&rules, EvalTarget::Json(&value)));
    }

    #[test]
    fn unresolvable_path_evaluates_false_rather_than_erroring() {
        let value = json!({});
        let rule = ConditionRule::numeric("missing", NumericOp::Eq, 0.0);
        assert!(!rule.evaluate(EvalTarget::Json(&value)));
    }
}
