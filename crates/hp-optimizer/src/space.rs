//! Mapping between the pipeline's parameters and an optimizer's search space.

use std::collections::HashMap;

use hp_types::{validation_error, GreetingStyle, HpResult, PipelineParams};

use crate::search::{ParameterValue, SearchSpace};

/// Search space over the four tunable parameters: greeting_style is categorical,
/// batch_size and repeat_count are integers, delay is a float.
///
/// Grid search varies the last parameter fastest, so greeting_style and
/// batch_size come last: a truncated grid still sees every style and size.
pub fn hello_search_space() -> SearchSpace {
    let styles = GreetingStyle::SEARCHABLE
        .iter()
        .map(|s| serde_json::Value::String(s.as_str().to_string()))
        .collect();

    SearchSpace::new()
        .add_float("delay", 0.1, 1.0)
        .add_int("repeat_count", 1, 5)
        .add_int("batch_size", 1, 6)
        .add_choice("greeting_style", styles)
}

/// Overlay a suggested combination onto `base`.
///
/// Keys that are absent keep the base value; unknown keys are ignored. The result
/// is not validated here, the pipeline does that before running.
pub fn params_from_values(
    values: &HashMap<String, ParameterValue>,
    base: &PipelineParams,
) -> HpResult<PipelineParams> {
    let mut params = base.clone();

    if let Some(value) = values.get("greeting_style") {
        params.greeting_style = GreetingStyle::parse(&value.to_string());
    }
    if let Some(value) = values.get("batch_size") {
        params.batch_size = as_count("batch_size", value)?;
    }
    if let Some(value) = values.get("repeat_count") {
        params.repeat_count = as_count("repeat_count", value)?;
    }
    if let Some(value) = values.get("delay") {
        params.delay = match value {
            ParameterValue::Float(v) => *v,
            ParameterValue::Int(v) => *v as f64,
            ParameterValue::Json(v) => v
                .as_f64()
                .ok_or_else(|| validation_error!("delay must be a number, got {v}"))?,
        };
    }

    Ok(params)
}

fn as_count(name: &str, value: &ParameterValue) -> HpResult<usize> {
    let raw = match value {
        ParameterValue::Int(v) => *v,
        ParameterValue::Json(v) => v
            .as_i64()
            .ok_or_else(|| validation_error!("{name} must be an integer, got {v}"))?,
        ParameterValue::Float(v) => {
            return Err(validation_error!("{name} must be an integer, got {v}"))
        }
    };
    usize::try_from(raw)
        .map_err(|_| validation_error!("{name} must not be negative, got {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{GridSearch, ParameterKind, SearchStrategy};
    use hp_types::HpError;
    use std::collections::HashSet;

    fn kind<'a>(space: &'a SearchSpace, name: &str) -> Option<&'a ParameterKind> {
        space.parameters.iter().find(|p| p.name == name).map(|p| &p.kind)
    }

    #[test]
    fn space_covers_all_tunables() {
        let space = hello_search_space();
        assert_eq!(space.parameters.len(), 4);
        assert!(matches!(
            kind(&space, "greeting_style"),
            Some(ParameterKind::Choice { values }) if values.len() == 3
        ));
        assert!(matches!(
            kind(&space, "batch_size"),
            Some(ParameterKind::IntRange { low: 1, high: 6 })
        ));
        assert!(matches!(
            kind(&space, "repeat_count"),
            Some(ParameterKind::IntRange { low: 1, high: 5 })
        ));
        assert!(matches!(
            kind(&space, "delay"),
            Some(ParameterKind::FloatRange { .. })
        ));
    }

    #[test]
    fn short_grid_sweep_sees_every_style_and_batch_size() {
        let space = hello_search_space();
        assert_eq!(space.grid_size(3), Some(270));

        let mut grid = GridSearch::new(&space, 3);
        let first = grid.suggest(20);

        let styles: HashSet<String> = first
            .iter()
            .map(|combo| combo["greeting_style"].to_string())
            .collect();
        assert_eq!(styles.len(), 3);

        let sizes: HashSet<String> = first
            .iter()
            .map(|combo| combo["batch_size"].to_string())
            .collect();
        assert_eq!(sizes.len(), 6);
    }

    #[test]
    fn overlay_values() {
        let mut values = HashMap::new();
        values.insert(
            "greeting_style".to_string(),
            ParameterValue::Json(serde_json::json!("titlecase")),
        );
        values.insert("batch_size".to_string(), ParameterValue::Int(3));
        values.insert("delay".to_string(), ParameterValue::Float(0.2));

        let base = PipelineParams::new().with_repeat_count(4);
        let params = params_from_values(&values, &base).unwrap();
        assert_eq!(params.greeting_style, GreetingStyle::Titlecase);
        assert_eq!(params.batch_size, 3);
        assert_eq!(params.repeat_count, 4);
        assert_eq!(params.delay, 0.2);
    }

    #[test]
    fn rejects_wrong_kinds() {
        let mut values = HashMap::new();
        values.insert("batch_size".to_string(), ParameterValue::Float(2.5));
        let err = params_from_values(&values, &PipelineParams::new()).unwrap_err();
        assert!(matches!(err, HpError::Validation(_)));

        let mut values = HashMap::new();
        values.insert("repeat_count".to_string(), ParameterValue::Int(-1));
        let err = params_from_values(&values, &PipelineParams::new()).unwrap_err();
        assert!(matches!(err, HpError::Validation(_)));
    }
}
