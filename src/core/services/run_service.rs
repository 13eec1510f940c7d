use super::types::RunOutcome;
use crate::AppError;
use crate::api::resources::Ops;
use crate::utils::variables::flatten_variables;
use serde_json::{Map, Value};

/// Launches task and pipeline runs from their definitions.
///
/// A run request carries the reference to its definition plus the flattened
/// variable map: declared values, overlaid with any `--var` overrides.
pub struct RunService {
    ops: Ops,
}

impl RunService {
    pub fn new(ops: Ops) -> Self {
        Self { ops }
    }

    pub async fn run_task(
        &self,
        namespace: &str,
        task: &str,
        overrides: &[(String, String)],
    ) -> Result<RunOutcome, AppError> {
        let definition = self.ops.tasks().get(namespace, task).await?;
        let payload = run_payload("taskRef", task, &definition, overrides);
        let envelope = self.ops.taskruns().create(namespace, &payload).await?;

        Ok(RunOutcome {
            success: envelope.is_success(),
            message: envelope.message,
        })
    }

    pub async fn run_pipeline(
        &self,
        namespace: &str,
        pipeline: &str,
        overrides: &[(String, String)],
    ) -> Result<RunOutcome, AppError> {
        let definition = self.ops.pipelines().get(namespace, pipeline).await?;
        let payload = run_payload("pipelineRef", pipeline, &definition, overrides);
        let envelope = self.ops.pipelineruns().create(namespace, &payload).await?;

        Ok(RunOutcome {
            success: envelope.is_success(),
            message: envelope.message,
        })
    }
}

/// Build the run-creation payload from the definition's declared variables
/// and the user's overrides. Overrides land in the declaration's `value`
/// slot so they win over defaults when flattened.
fn run_payload(
    ref_key: &str,
    name: &str,
    definition: &Value,
    overrides: &[(String, String)],
) -> Value {
    let mut declared = definition
        .get("spec")
        .and_then(|spec| spec.get("variables"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    for (key, value) in overrides {
        let declaration = declared
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(map) = declaration.as_object_mut() {
            map.insert("value".to_string(), Value::String(value.clone()));
        }
    }

    let variables = flatten_variables(&Value::Object(declared));

    let mut payload = Map::new();
    payload.insert(ref_key.to_string(), Value::String(name.to_string()));
    payload.insert("variables".to_string(), Value::Object(variables));
    Value::Object(payload)
}
